//! Enumeration types for the farm simulation.
//!
//! Crop kinds, rarity tiers, plot lifecycle states, item kinds, cosmetic
//! environment values and the achievement identifiers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a textual identifier does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} identifier {input:?}")]
pub struct UnknownVariant {
    /// What kind of identifier was being parsed.
    pub what: &'static str,
    /// The rejected input.
    pub input: String,
}

// ---------------------------------------------------------------------------
// Crops
// ---------------------------------------------------------------------------

/// A kind of crop that can be planted on a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum CropKind {
    /// Quick common crop, the starter seed.
    Tomato,
    /// The fastest-growing crop.
    Carrot,
    /// Common root crop.
    Potato,
    /// Common grain crop.
    Corn,
    /// Slow common grain crop.
    Wheat,
    /// Rare berry.
    Strawberry,
    /// Rare berry only available in the local simulation.
    Blueberry,
    /// Legendary fruit with a very long growth time.
    GoldenApple,
}

impl CropKind {
    /// Every crop kind in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Tomato,
        Self::Carrot,
        Self::Potato,
        Self::Corn,
        Self::Wheat,
        Self::Strawberry,
        Self::Blueberry,
        Self::GoldenApple,
    ];

    /// The identifier used in item ids and JSON (`tomato`, `goldenApple`).
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tomato => "tomato",
            Self::Carrot => "carrot",
            Self::Potato => "potato",
            Self::Corn => "corn",
            Self::Wheat => "wheat",
            Self::Strawberry => "strawberry",
            Self::Blueberry => "blueberry",
            Self::GoldenApple => "goldenApple",
        }
    }

    /// The numeric crop type used by the remote ledger, if it knows this crop.
    pub const fn ledger_code(self) -> Option<u8> {
        match self {
            Self::Tomato => Some(0),
            Self::Carrot => Some(1),
            Self::Potato => Some(2),
            Self::Corn => Some(3),
            Self::Wheat => Some(4),
            Self::Strawberry => Some(5),
            Self::GoldenApple => Some(6),
            Self::Blueberry => None,
        }
    }

    /// Map a remote ledger crop type code back to a crop kind.
    pub const fn from_ledger_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Tomato),
            1 => Some(Self::Carrot),
            2 => Some(Self::Potato),
            3 => Some(Self::Corn),
            4 => Some(Self::Wheat),
            5 => Some(Self::Strawberry),
            6 => Some(Self::GoldenApple),
            _ => None,
        }
    }
}

impl core::fmt::Display for CropKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CropKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownVariant {
                what: "crop",
                input: s.to_owned(),
            })
    }
}

/// Rarity tier of a crop. Drives the experience awarded on harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Everyday crops.
    Common,
    /// Uncommon crops.
    Rare,
    /// Very uncommon crops.
    Epic,
    /// The rarest crops.
    Legendary,
}

// ---------------------------------------------------------------------------
// Plots
// ---------------------------------------------------------------------------

/// Lifecycle state of a plot.
///
/// `Harvested` only appears on the remote ledger, where a harvested plot is
/// distinct from a never-planted one. Both accept a new planting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum PlotState {
    /// No crop.
    Empty,
    /// Crop planted, no growth accrued yet.
    Planted,
    /// Crop accruing growth.
    Growing,
    /// Crop fully grown and harvestable.
    Ready,
    /// Crop taken; the plot can be replanted.
    Harvested,
}

impl PlotState {
    /// Whether the plot currently holds a crop.
    pub const fn is_occupied(self) -> bool {
        matches!(self, Self::Planted | Self::Growing | Self::Ready)
    }

    /// The numeric state used by the remote ledger.
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Planted => 1,
            Self::Growing => 2,
            Self::Ready => 3,
            Self::Harvested => 4,
        }
    }

    /// Map a remote ledger state code back to a plot state.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Planted),
            2 => Some(Self::Growing),
            3 => Some(Self::Ready),
            4 => Some(Self::Harvested),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Broad category of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// Plantable seeds.
    Seed,
    /// Farming tools.
    Tool,
    /// Harvested produce.
    Crop,
    /// Soil fertilizer.
    Fertilizer,
}

/// A farming tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum ToolKind {
    /// Waters a single plot.
    WateringCan,
    /// Harvests crops.
    Sickle,
    /// Waters several plots at once.
    Sprinkler,
}

impl ToolKind {
    /// Every tool in catalog order.
    pub const ALL: [Self; 3] = [Self::WateringCan, Self::Sickle, Self::Sprinkler];

    /// The item identifier of this tool.
    pub const fn key(self) -> &'static str {
        match self {
            Self::WateringCan => "watering-can",
            Self::Sickle => "sickle",
            Self::Sprinkler => "sprinkler",
        }
    }
}

// ---------------------------------------------------------------------------
// Environment (cosmetic)
// ---------------------------------------------------------------------------

/// Current weather. Displayed only; no rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Clear skies.
    #[default]
    Sunny,
    /// Rain.
    Rainy,
    /// Overcast.
    Cloudy,
}

/// Current season. Displayed only; no rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Spring.
    #[default]
    Spring,
    /// Summer.
    Summer,
    /// Autumn.
    Fall,
    /// Winter.
    Winter,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Identifier of an achievement in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementKind {
    /// Harvest a first crop.
    FirstHarvest,
    /// Harvest 100 crops.
    MasterFarmer,
    /// Hold a million coins.
    Millionaire,
    /// Harvest a legendary crop.
    GoldenHarvest,
    /// Plant 50 crops.
    WaterMaster,
    /// Harvest seven different crop kinds.
    CropCollector,
    /// Reach level 10.
    LegendaryFarmer,
    /// Harvest 10 crops.
    SpeedGrower,
}

/// The player counter an achievement requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementCounter {
    /// Number of successful harvests.
    TotalHarvests,
    /// Current coin balance.
    Coins,
    /// Number of crops planted.
    TotalPlanted,
    /// Current level.
    Level,
    /// Number of legendary crops harvested.
    LegendaryHarvests,
    /// Number of distinct crop kinds harvested at least once.
    DistinctCrops,
}
