//! Pure farm rules shared by the local and remote engines.
//!
//! Nothing in this crate performs I/O or holds state. Engines call into it
//! to validate actions and compute their effects.
//!
//! # Modules
//!
//! - [`catalog`] -- Crop, tool and achievement tables
//! - [`growth`] -- Growth accrual, readiness and display stages
//! - [`economy`] -- Coins, experience, levels and pricing
//! - [`inventory`] -- Checked inventory operations
//! - [`achievements`] -- Achievement evaluation against player counters
//! - [`clock`] -- System and manual time sources
//! - [`error`] -- [`DomainError`]

pub mod achievements;
pub mod catalog;
pub mod clock;
pub mod economy;
pub mod error;
pub mod growth;
pub mod inventory;

pub use achievements::{AchievementStatus, PlayerCounters};
pub use catalog::{AchievementSpec, CropSpec, ToolSpec};
pub use clock::{FarmClock, ManualClock};
pub use error::DomainError;
pub use growth::GrowthStage;
