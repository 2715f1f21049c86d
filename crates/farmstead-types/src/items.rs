//! Inventory item identifiers.
//!
//! Items are keyed by a flat string id in snapshots and JSON
//! (`tomato-seed`, `goldenApple-crop`, `watering-can`, `fertilizer`) but are
//! handled as a typed [`ItemId`] everywhere in Rust.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::{CropKind, ItemKind, ToolKind, UnknownVariant};

const SEED_SUFFIX: &str = "-seed";
const CROP_SUFFIX: &str = "-crop";
const FERTILIZER_KEY: &str = "fertilizer";

/// Identifier of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemId {
    /// Seeds for a crop kind.
    Seed(CropKind),
    /// Harvested produce of a crop kind.
    Crop(CropKind),
    /// A tool.
    Tool(ToolKind),
    /// Fertilizer.
    Fertilizer,
}

impl ItemId {
    /// The category this item belongs to.
    pub const fn kind(self) -> ItemKind {
        match self {
            Self::Seed(_) => ItemKind::Seed,
            Self::Crop(_) => ItemKind::Crop,
            Self::Tool(_) => ItemKind::Tool,
            Self::Fertilizer => ItemKind::Fertilizer,
        }
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Seed(kind) => write!(f, "{}{SEED_SUFFIX}", kind.key()),
            Self::Crop(kind) => write!(f, "{}{CROP_SUFFIX}", kind.key()),
            Self::Tool(tool) => f.write_str(tool.key()),
            Self::Fertilizer => f.write_str(FERTILIZER_KEY),
        }
    }
}

impl FromStr for ItemId {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == FERTILIZER_KEY {
            return Ok(Self::Fertilizer);
        }
        if let Some(tool) = ToolKind::ALL.into_iter().find(|tool| tool.key() == s) {
            return Ok(Self::Tool(tool));
        }
        if let Some(crop) = s.strip_suffix(SEED_SUFFIX) {
            return crop.parse().ok().map(Self::Seed).ok_or_else(|| unknown_item(s));
        }
        if let Some(crop) = s.strip_suffix(CROP_SUFFIX) {
            return crop.parse().ok().map(Self::Crop).ok_or_else(|| unknown_item(s));
        }
        Err(unknown_item(s))
    }
}

fn unknown_item(input: &str) -> UnknownVariant {
    UnknownVariant {
        what: "item",
        input: input.to_owned(),
    }
}

impl TryFrom<String> for ItemId {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(item: ItemId) -> Self {
        item.to_string()
    }
}
