//! The farm engine capability shared by the local and remote engines.
//!
//! Callers hold one engine and drive it through [`FarmEngine`]. Every
//! operation returns the engine's current [`FarmView`] after the action, so
//! a caller never has to re-read state to see the effect of a successful
//! call. A rejected call leaves state untouched and returns an
//! [`EngineError`].

use std::future::Future;

use chrono::{DateTime, Utc};
use farmstead_rules::{AchievementStatus, GrowthStage};
use farmstead_types::{
    AchievementKind, CropKind, FarmStatus, InventoryItem, ItemId, OperationId, PlotState,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::EngineError;

/// Which engine produced a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineKind {
    /// Local simulation with a saved snapshot.
    Local,
    /// Remote authoritative ledger.
    Remote,
}

impl core::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// How an engine obtains the seed it plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedPolicy {
    /// Seeds are bought first and planting consumes one from the inventory.
    Inventory,
    /// Planting buys the seed at its fixed price in the same action.
    PurchaseOnPlant,
}

/// A farm the player can act on.
///
/// Async methods are written as `impl Future + Send` so engines can be
/// driven from spawned tasks.
pub trait FarmEngine: Send + Sync {
    /// Which engine this is.
    fn kind(&self) -> EngineKind;

    /// How planting obtains seeds.
    fn seed_policy(&self) -> SeedPolicy;

    /// Current view of the farm.
    fn state(&self) -> impl Future<Output = Result<FarmView, EngineError>> + Send;

    /// Plant `crop` on plot `plot`.
    fn plant(
        &self,
        plot: u32,
        crop: CropKind,
    ) -> impl Future<Output = Result<FarmView, EngineError>> + Send;

    /// Water plot `plot`.
    fn water(&self, plot: u32) -> impl Future<Output = Result<FarmView, EngineError>> + Send;

    /// Harvest plot `plot`.
    fn harvest(&self, plot: u32) -> impl Future<Output = Result<FarmView, EngineError>> + Send;

    /// Buy `quantity` seeds of `crop`.
    fn buy_seeds(
        &self,
        crop: CropKind,
        quantity: u32,
    ) -> impl Future<Output = Result<FarmView, EngineError>> + Send;

    /// Convert a native currency payment into coins.
    fn buy_coins(
        &self,
        payment: Decimal,
    ) -> impl Future<Output = Result<FarmView, EngineError>> + Send;
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Engine-independent snapshot of a farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmView {
    /// Engine that produced the view.
    pub engine: EngineKind,
    /// Player balances and counters.
    pub player: PlayerView,
    /// Every plot, ordered by index.
    pub plots: Vec<PlotView>,
    /// Inventory entries. Empty for engines without an inventory.
    pub inventory: Vec<InventoryItem>,
    /// Every catalog achievement with its status.
    pub achievements: Vec<AchievementStatus>,
    /// The mutating operation still awaiting confirmation, if any.
    pub pending: Option<PendingView>,
    /// When the underlying state was last confirmed.
    pub updated_at: DateTime<Utc>,
}

impl FarmView {
    /// The plot at `index`, if it exists.
    pub fn plot(&self, index: u32) -> Option<&PlotView> {
        self.plots.iter().find(|p| p.index == index)
    }

    /// Quantity of a held inventory item by its display id.
    pub fn quantity(&self, item: ItemId) -> u32 {
        self.inventory
            .iter()
            .find(|i| i.id == item)
            .map_or(0, |i| i.quantity)
    }

    /// Counts of planted, ready and watered plots.
    pub fn status(&self) -> FarmStatus {
        self.plots.iter().fold(FarmStatus::default(), |mut acc, plot| {
            if plot.crop.is_some() {
                acc.planted = acc.planted.saturating_add(1);
            }
            if plot.is_ready {
                acc.ready = acc.ready.saturating_add(1);
            }
            if plot.is_watered {
                acc.watered = acc.watered.saturating_add(1);
            }
            acc
        })
    }

    /// Whether an achievement is unlocked.
    pub fn is_unlocked(&self, kind: AchievementKind) -> bool {
        self.achievements.iter().any(|a| a.kind == kind && a.unlocked)
    }
}

/// Player balances and counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Coin balance.
    pub coins: u64,
    /// Experience points.
    pub experience: u64,
    /// Level.
    pub level: u64,
    /// Successful harvests.
    pub total_harvests: u64,
    /// Crops planted.
    pub total_planted: u64,
}

/// One plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotView {
    /// Plot index.
    pub index: u32,
    /// Lifecycle state.
    pub state: PlotState,
    /// Occupying crop.
    pub crop: Option<CropKind>,
    /// Growth completion percentage in `0..=100`.
    pub progress: Decimal,
    /// Display stage while a crop is present.
    pub stage: Option<GrowthStage>,
    /// Whether the plot has been watered.
    pub is_watered: bool,
    /// Whether the plot has been fertilized.
    pub is_fertilized: bool,
    /// Whether the crop can be harvested now.
    pub is_ready: bool,
}

/// A mutating operation in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingView {
    /// Call name, e.g. `waterPlot`.
    pub call: String,
    /// Ledger operation id once the call has been accepted.
    pub operation_id: Option<OperationId>,
    /// When the call was dispatched.
    pub since: DateTime<Utc>,
}
