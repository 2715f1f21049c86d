//! Core entity structs for the farm simulation.
//!
//! Covers the static crop definition, crop instances, plots, the player,
//! the local [`GameState`] aggregate and the raw records read from the
//! remote ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AchievementKind, CropKind, ItemKind, PlotState, Rarity, Season, Weather};
use crate::ids::{CropId, PlayerId};
use crate::items::ItemId;

// ---------------------------------------------------------------------------
// Crop definitions and instances
// ---------------------------------------------------------------------------

/// Static definition of a crop kind. Loaded once from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CropDefinition {
    /// Which crop this defines.
    pub kind: CropKind,
    /// Display name.
    pub name: String,
    /// Minutes of growth needed to become ready.
    pub growth_time: u32,
    /// Coins received per harvested unit.
    pub sell_price: u64,
    /// Coins paid per seed.
    pub buy_price: u64,
    /// Display glyph.
    pub glyph: String,
    /// Rarity tier.
    pub rarity: Rarity,
}

/// A crop planted on a plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Crop {
    /// Unique crop instance id.
    pub id: CropId,
    /// Which crop was planted.
    pub kind: CropKind,
    /// Accumulated growth in minutes, clamped at the crop's growth time.
    #[ts(as = "String")]
    pub growth: Decimal,
    /// When the crop was planted.
    pub planted_at: DateTime<Utc>,
    /// Whether the crop has been watered.
    pub is_watered: bool,
    /// Whether the crop has been harvested.
    pub is_harvested: bool,
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

/// Grid coordinate of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlotPosition {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// A single farmable cell of the local grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Plot {
    /// Plot id in the form `x-y`.
    pub id: String,
    /// Grid coordinate.
    pub position: PlotPosition,
    /// The occupying crop. `None` means the plot is empty.
    pub crop: Option<Crop>,
    /// Whether the plot has been watered.
    pub is_watered: bool,
    /// Whether the plot has been fertilized.
    pub is_fertilized: bool,
}

impl Plot {
    /// Create an empty plot at the given position.
    pub fn empty(position: PlotPosition) -> Self {
        Self {
            id: format!("{}-{}", position.x, position.y),
            position,
            crop: None,
            is_watered: false,
            is_fertilized: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// An achievement the player has permanently earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UnlockedAchievement {
    /// Which achievement.
    pub kind: AchievementKind,
    /// When it was unlocked.
    pub unlocked_at: DateTime<Utc>,
}

/// Display profile of a local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerProfile {
    /// Handle.
    pub username: String,
    /// Name shown in the header.
    pub display_name: String,
    /// Avatar image URL. Empty when unset.
    pub pfp_url: String,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            username: "farmer".to_owned(),
            display_name: "Farmer".to_owned(),
            pfp_url: String::new(),
        }
    }
}

/// The local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Local profile id.
    pub id: PlayerId,
    /// Display profile.
    pub profile: PlayerProfile,
    /// Coin balance.
    pub coins: u64,
    /// Experience points. Never decreases.
    pub experience: u64,
    /// Level, always `experience / 100 + 1`.
    pub level: u32,
    /// Item quantities keyed by item id.
    #[ts(as = "BTreeMap<String, u32>")]
    pub inventory: BTreeMap<ItemId, u32>,
    /// Last time any plot was watered.
    pub last_watered: Option<DateTime<Utc>>,
    /// Last time any plot was fertilized.
    pub last_fertilized: Option<DateTime<Utc>>,
    /// Permanently unlocked achievements, in unlock order.
    pub achievements: Vec<UnlockedAchievement>,
    /// Number of successful harvests.
    pub total_harvests: u64,
    /// Number of crops planted.
    pub total_planted: u64,
    /// Harvest counts per crop kind.
    pub harvests_by_crop: BTreeMap<CropKind, u64>,
}

impl Player {
    /// Quantity of an item held, zero if absent.
    pub fn quantity(&self, item: ItemId) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    /// Whether an achievement is already in the unlocked list.
    pub fn has_achievement(&self, kind: AchievementKind) -> bool {
        self.achievements.iter().any(|a| a.kind == kind)
    }
}

/// A catalog-enriched inventory entry for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Item id.
    #[ts(as = "String")]
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Item category.
    pub kind: ItemKind,
    /// Quantity held.
    pub quantity: u32,
    /// Display glyph.
    pub glyph: String,
}

// ---------------------------------------------------------------------------
// Local aggregate
// ---------------------------------------------------------------------------

/// The local simulation aggregate. Saved and loaded as one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// The player.
    pub player: Player,
    /// Every plot of the grid, row by row.
    pub farm: Vec<Plot>,
    /// Wall-clock time of the last growth evaluation.
    pub current_time: DateTime<Utc>,
    /// Cosmetic weather.
    pub weather: Weather,
    /// Cosmetic season.
    pub season: Season,
    /// Cosmetic day counter.
    pub day: u32,
}

/// Counts of plots by condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FarmStatus {
    /// Plots holding a crop.
    pub planted: u32,
    /// Plots holding a fully grown crop.
    pub ready: u32,
    /// Plots that have been watered.
    pub watered: u32,
}

// ---------------------------------------------------------------------------
// Remote ledger records
// ---------------------------------------------------------------------------

/// Player record as returned by the remote ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerRecord {
    /// Coin balance.
    pub coins: u64,
    /// Experience points.
    pub experience: u64,
    /// Level.
    pub level: u64,
    /// Number of successful harvests.
    pub total_harvests: u64,
    /// Number of crops planted.
    pub total_planted: u64,
}

/// Plot record as returned by the remote ledger.
///
/// Timestamps are unix seconds. `is_ready` is computed by the ledger and is
/// authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlotRecord {
    /// Ledger crop type code.
    pub crop_type: u8,
    /// Lifecycle state.
    pub state: PlotState,
    /// Unix seconds when planted.
    pub planted_at: u64,
    /// Unix seconds when last watered, zero if never.
    pub last_watered: u64,
    /// Seconds of growth needed.
    pub growth_time: u64,
    /// Whether the plot has been watered.
    pub is_watered: bool,
    /// Whether the crop is ready to harvest.
    pub is_ready: bool,
}

impl PlotRecord {
    /// The occupying crop, if the plot holds one.
    pub const fn crop(&self) -> Option<CropKind> {
        if self.state.is_occupied() {
            CropKind::from_ledger_code(self.crop_type)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plot_uses_xy_id() {
        let plot = Plot::empty(PlotPosition { x: 3, y: 1 });
        assert_eq!(plot.id, "3-1");
        assert!(plot.crop.is_none());
    }

    #[test]
    fn harvested_record_has_no_crop() {
        let record = PlotRecord {
            crop_type: 1,
            state: PlotState::Harvested,
            planted_at: 10,
            last_watered: 0,
            growth_time: 1200,
            is_watered: false,
            is_ready: false,
        };
        assert_eq!(record.crop(), None);

        let growing = PlotRecord {
            state: PlotState::Growing,
            ..record
        };
        assert_eq!(growing.crop(), Some(CropKind::Carrot));
    }

    #[test]
    fn plot_record_uses_camel_case() {
        let json = r#"{"cropType":6,"state":"READY","plantedAt":1,"lastWatered":0,
            "growthTime":18000,"isWatered":true,"isReady":true}"#;
        let record: Result<PlotRecord, _> = serde_json::from_str(json);
        assert_eq!(
            record.ok().and_then(|r| r.crop()),
            Some(CropKind::GoldenApple)
        );
    }
}
