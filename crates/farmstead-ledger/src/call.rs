//! State-changing ledger calls and their receipts.
//!
//! A [`StoreCall`] is submitted to a ledger and answered with an
//! [`OperationHandle`]. The caller then polls for a [`Receipt`] until the
//! [`TxStatus`] is terminal. Nothing a call does is visible through the
//! read operations before it is confirmed.

use chrono::{DateTime, Utc};
use farmstead_types::{CropKind, OperationId, PlayerAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A state-changing request to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreCall {
    /// Plant a crop, buying the seed at its fixed price.
    PlantCrop {
        /// Plot index.
        plot: u32,
        /// Crop to plant.
        crop: CropKind,
    },
    /// Water a planted plot.
    WaterPlot {
        /// Plot index.
        plot: u32,
    },
    /// Harvest a ready plot.
    HarvestCrop {
        /// Plot index.
        plot: u32,
    },
    /// Buy seeds with coins.
    BuySeeds {
        /// Crop whose seeds to buy.
        crop: CropKind,
        /// Number of seeds.
        amount: u32,
    },
    /// Convert a native currency payment into coins.
    BuyCoins {
        /// Payment in native currency units.
        payment: Decimal,
    },
}

impl StoreCall {
    /// The ledger function name of this call.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlantCrop { .. } => "plantCrop",
            Self::WaterPlot { .. } => "waterPlot",
            Self::HarvestCrop { .. } => "harvestCrop",
            Self::BuySeeds { .. } => "buySeeds",
            Self::BuyCoins { .. } => "buyCoins",
        }
    }

    /// The crop this call refers to, if any.
    pub const fn crop(&self) -> Option<CropKind> {
        match self {
            Self::PlantCrop { crop, .. } | Self::BuySeeds { crop, .. } => Some(*crop),
            Self::WaterPlot { .. } | Self::HarvestCrop { .. } | Self::BuyCoins { .. } => None,
        }
    }
}

impl core::fmt::Display for StoreCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PlantCrop { plot, crop } => write!(f, "plantCrop(plot={plot}, crop={crop})"),
            Self::WaterPlot { plot } => write!(f, "waterPlot(plot={plot})"),
            Self::HarvestCrop { plot } => write!(f, "harvestCrop(plot={plot})"),
            Self::BuySeeds { crop, amount } => write!(f, "buySeeds(crop={crop}, amount={amount})"),
            Self::BuyCoins { payment } => write!(f, "buyCoins(payment={payment})"),
        }
    }
}

/// Handle for a submitted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationHandle {
    /// Operation id used to poll for the receipt.
    pub id: OperationId,
    /// Player the call acts for.
    pub address: PlayerAddress,
    /// The submitted call.
    pub call: StoreCall,
    /// When the ledger accepted the submission.
    pub submitted_at: DateTime<Utc>,
}

/// Confirmation status of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TxStatus {
    /// Not yet included.
    Pending,
    /// Applied.
    Confirmed,
    /// Rejected by the ledger; nothing was applied.
    Reverted {
        /// Why the ledger rejected the call.
        reason: String,
    },
}

impl TxStatus {
    /// Whether the status will not change any more.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Current status of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// The operation.
    pub operation_id: OperationId,
    /// Its status, flattened so the receipt reads `{"status": "confirmed"}`.
    #[serde(flatten)]
    pub status: TxStatus,
}
