//! Shared type definitions for the Farmstead farm simulation.
//!
//! This crate is the single source of truth for the data model used by both
//! engines. Types defined here flow downstream to `TypeScript` via `ts-rs`
//! for the web mini-app.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the wallet address
//! - [`enums`] -- Crop kinds, rarity, plot states, item kinds, achievements
//! - [`items`] -- Typed inventory item identifiers
//! - [`structs`] -- Crops, plots, the player, the local aggregate, ledger records

pub mod enums;
pub mod ids;
pub mod items;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AchievementCounter, AchievementKind, CropKind, ItemKind, PlotState, Rarity, Season, ToolKind,
    UnknownVariant, Weather,
};
pub use ids::{AddressParseError, CropId, OperationId, PlayerAddress, PlayerId};
pub use items::ItemId;
pub use structs::{
    Crop, CropDefinition, FarmStatus, GameState, InventoryItem, Player, PlayerProfile,
    PlayerRecord, Plot, PlotPosition, PlotRecord, UnlockedAchievement,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes each type (and its dependencies) to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::CropId::export_all();
        let _ = crate::ids::OperationId::export_all();
        let _ = crate::ids::PlayerAddress::export_all();

        // Enums
        let _ = crate::enums::CropKind::export_all();
        let _ = crate::enums::Rarity::export_all();
        let _ = crate::enums::PlotState::export_all();
        let _ = crate::enums::ItemKind::export_all();
        let _ = crate::enums::ToolKind::export_all();
        let _ = crate::enums::Weather::export_all();
        let _ = crate::enums::Season::export_all();
        let _ = crate::enums::AchievementKind::export_all();
        let _ = crate::enums::AchievementCounter::export_all();

        // Structs
        let _ = crate::structs::CropDefinition::export_all();
        let _ = crate::structs::Crop::export_all();
        let _ = crate::structs::PlotPosition::export_all();
        let _ = crate::structs::Plot::export_all();
        let _ = crate::structs::UnlockedAchievement::export_all();
        let _ = crate::structs::PlayerProfile::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::InventoryItem::export_all();
        let _ = crate::structs::GameState::export_all();
        let _ = crate::structs::FarmStatus::export_all();
        let _ = crate::structs::PlayerRecord::export_all();
        let _ = crate::structs::PlotRecord::export_all();
    }
}
