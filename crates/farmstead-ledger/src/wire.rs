//! JSON bodies exchanged between [`HttpLedger`](crate::HttpLedger) and the
//! gateway routes.

use farmstead_types::{PlayerAddress, PlayerRecord, PlotRecord};
use serde::{Deserialize, Serialize};

use crate::call::{OperationHandle, Receipt, StoreCall};

/// `GET /api/chain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    /// Chain id the gateway's ledger lives on.
    pub chain_id: u64,
}

/// `GET /api/player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// The player record.
    pub player: PlayerRecord,
}

/// `GET /api/plot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotResponse {
    /// The plot record.
    pub plot: PlotRecord,
}

/// `POST /api/tx` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Player the call acts for.
    pub address: PlayerAddress,
    /// The call.
    pub call: StoreCall,
}

/// `POST /api/tx` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    /// Handle of the accepted submission.
    pub operation: OperationHandle,
}

/// `GET /api/tx/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptResponse {
    /// Current receipt.
    pub receipt: Receipt,
}
