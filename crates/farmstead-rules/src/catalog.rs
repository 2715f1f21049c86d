//! Static catalogs: crops, tools and achievements.
//!
//! Growth times are in minutes. Prices are in coins.

use farmstead_types::{
    AchievementCounter, AchievementKind, CropDefinition, CropKind, ItemId, Rarity, ToolKind,
};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Crops
// ---------------------------------------------------------------------------

/// Static numbers for one crop kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSpec {
    /// The crop kind.
    pub kind: CropKind,
    /// Display name.
    pub name: &'static str,
    /// Minutes of growth needed.
    pub growth_time: u32,
    /// Coins per harvested unit.
    pub sell_price: u64,
    /// Coins per seed.
    pub buy_price: u64,
    /// Display glyph.
    pub glyph: &'static str,
    /// Rarity tier.
    pub rarity: Rarity,
}

impl CropSpec {
    /// Owned form for serialization and bindings.
    pub fn to_definition(self) -> CropDefinition {
        CropDefinition {
            kind: self.kind,
            name: self.name.to_owned(),
            growth_time: self.growth_time,
            sell_price: self.sell_price,
            buy_price: self.buy_price,
            glyph: self.glyph.to_owned(),
            rarity: self.rarity,
        }
    }
}

/// Look up the catalog entry for a crop kind.
pub const fn crop(kind: CropKind) -> CropSpec {
    let (name, growth_time, sell_price, buy_price, glyph, rarity) = match kind {
        CropKind::Tomato => ("Tomato", 30, 25, 10, "🍅", Rarity::Common),
        CropKind::Carrot => ("Carrot", 20, 15, 5, "🥕", Rarity::Common),
        CropKind::Potato => ("Potato", 40, 30, 12, "🥔", Rarity::Common),
        CropKind::Corn => ("Corn", 45, 35, 15, "🌽", Rarity::Common),
        CropKind::Wheat => ("Wheat", 60, 50, 20, "🌾", Rarity::Common),
        CropKind::Strawberry => ("Strawberry", 90, 80, 30, "🍓", Rarity::Rare),
        CropKind::Blueberry => ("Blueberry", 120, 120, 45, "🫐", Rarity::Rare),
        CropKind::GoldenApple => ("Golden Apple", 300, 500, 200, "🍎", Rarity::Legendary),
    };
    CropSpec {
        kind,
        name,
        growth_time,
        sell_price,
        buy_price,
        glyph,
        rarity,
    }
}

/// The whole crop catalog in catalog order.
pub fn crop_definitions() -> Vec<CropDefinition> {
    CropKind::ALL
        .into_iter()
        .map(|kind| crop(kind).to_definition())
        .collect()
}

// ---------------------------------------------------------------------------
// Tools and other items
// ---------------------------------------------------------------------------

/// Static numbers for a purchasable non-crop item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    /// Display name.
    pub name: &'static str,
    /// Display glyph.
    pub glyph: &'static str,
    /// Price in coins.
    pub price: u64,
}

/// Look up the catalog entry for a tool.
pub const fn tool(kind: ToolKind) -> ToolSpec {
    match kind {
        ToolKind::WateringCan => ToolSpec {
            name: "Watering Can",
            glyph: "🚿",
            price: 50,
        },
        ToolKind::Sickle => ToolSpec {
            name: "Sickle",
            glyph: "🔪",
            price: 100,
        },
        ToolKind::Sprinkler => ToolSpec {
            name: "Sprinkler",
            glyph: "💧",
            price: 200,
        },
    }
}

/// Catalog entry for fertilizer.
pub const FERTILIZER: ToolSpec = ToolSpec {
    name: "Fertilizer",
    glyph: "💩",
    price: 30,
};

/// Display name of any inventory item.
pub fn item_name(item: ItemId) -> String {
    match item {
        ItemId::Seed(kind) => format!("{} Seeds", crop(kind).name),
        ItemId::Crop(kind) => crop(kind).name.to_owned(),
        ItemId::Tool(kind) => tool(kind).name.to_owned(),
        ItemId::Fertilizer => FERTILIZER.name.to_owned(),
    }
}

/// Display glyph of any inventory item.
pub const fn item_glyph(item: ItemId) -> &'static str {
    match item {
        ItemId::Seed(kind) | ItemId::Crop(kind) => crop(kind).glyph,
        ItemId::Tool(kind) => tool(kind).glyph,
        ItemId::Fertilizer => FERTILIZER.glyph,
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Static definition of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementSpec {
    /// Achievement id.
    pub kind: AchievementKind,
    /// Display name.
    pub name: &'static str,
    /// What the player has to do.
    pub description: &'static str,
    /// Display glyph.
    pub glyph: &'static str,
    /// Counter the requirement is measured against.
    pub counter: AchievementCounter,
    /// Threshold the counter must reach.
    pub requirement: u64,
}

/// Look up the catalog entry for an achievement.
pub const fn achievement(kind: AchievementKind) -> AchievementSpec {
    let (name, description, glyph, counter, requirement) = match kind {
        AchievementKind::FirstHarvest => (
            "First Harvest",
            "Harvest your first crop",
            "🌱",
            AchievementCounter::TotalHarvests,
            1,
        ),
        AchievementKind::MasterFarmer => (
            "Master Farmer",
            "Harvest 100 crops",
            "👨‍🌾",
            AchievementCounter::TotalHarvests,
            100,
        ),
        AchievementKind::Millionaire => (
            "Millionaire",
            "Earn 1,000,000 coins",
            "💰",
            AchievementCounter::Coins,
            1_000_000,
        ),
        AchievementKind::GoldenHarvest => (
            "Golden Harvest",
            "Harvest a legendary crop",
            "⭐",
            AchievementCounter::LegendaryHarvests,
            1,
        ),
        AchievementKind::WaterMaster => (
            "Water Master",
            "Plant 50 crops",
            "💧",
            AchievementCounter::TotalPlanted,
            50,
        ),
        AchievementKind::CropCollector => (
            "Crop Collector",
            "Harvest seven different crops",
            "🌾",
            AchievementCounter::DistinctCrops,
            7,
        ),
        AchievementKind::LegendaryFarmer => (
            "Legendary Farmer",
            "Reach level 10",
            "👑",
            AchievementCounter::Level,
            10,
        ),
        AchievementKind::SpeedGrower => (
            "Speed Grower",
            "Harvest 10 crops",
            "⚡",
            AchievementCounter::TotalHarvests,
            10,
        ),
    };
    AchievementSpec {
        kind,
        name,
        description,
        glyph,
        counter,
        requirement,
    }
}

/// The whole achievement catalog in display order.
pub const ACHIEVEMENTS: [AchievementSpec; 8] = [
    achievement(AchievementKind::FirstHarvest),
    achievement(AchievementKind::MasterFarmer),
    achievement(AchievementKind::Millionaire),
    achievement(AchievementKind::GoldenHarvest),
    achievement(AchievementKind::WaterMaster),
    achievement(AchievementKind::CropCollector),
    achievement(AchievementKind::LegendaryFarmer),
    achievement(AchievementKind::SpeedGrower),
];
