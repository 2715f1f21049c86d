//! Local simulation engine.
//!
//! - [`farm`] -- [`LocalFarm`], the synchronous state machine
//! - [`actor`] -- [`LocalEngine`], the task that serializes ticks and commands

pub mod actor;
pub mod farm;

pub use actor::LocalEngine;
pub use farm::{LocalFarm, LocalSettings};
