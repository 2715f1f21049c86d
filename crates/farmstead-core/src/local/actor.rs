//! The local engine task.
//!
//! A single task owns the [`LocalFarm`]. Player commands arrive over an
//! mpsc channel and growth ticks come from an interval; `tokio::select!`
//! processes them one at a time, so a tick can never interleave with a
//! command. Growth is accrued before every command as well, and the whole
//! `GameState` is saved after every change.

use std::time::Duration;

use chrono::{DateTime, Utc};
use farmstead_rules::{DomainError, FarmClock};
use farmstead_types::{CropKind, FarmStatus, GameState, PlayerProfile};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::farm::{LocalFarm, LocalSettings};
use crate::config::LocalConfig;
use crate::engine::{EngineKind, FarmEngine, FarmView, SeedPolicy};
use crate::error::EngineError;
use crate::snapshot::SnapshotStore;

/// Depth of the command queue.
const COMMAND_BUFFER: usize = 64;

/// A player action for the engine task.
#[derive(Debug, Clone)]
enum Action {
    State,
    Plant { plot: u32, crop: CropKind },
    Water { plot: u32 },
    Harvest { plot: u32 },
    BuySeeds { crop: CropKind, quantity: u32 },
    SellCrop { crop: CropKind },
    Reset { profile: PlayerProfile },
    UpdateProfile { profile: PlayerProfile },
}

impl Action {
    const fn name(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Plant { .. } => "plant",
            Self::Water { .. } => "water",
            Self::Harvest { .. } => "harvest",
            Self::BuySeeds { .. } => "buy_seeds",
            Self::SellCrop { .. } => "sell_crop",
            Self::Reset { .. } => "reset",
            Self::UpdateProfile { .. } => "update_profile",
        }
    }
}

enum Command {
    Apply {
        action: Action,
        reply: oneshot::Sender<Result<FarmView, EngineError>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running local engine. Clones share the same task.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    commands: mpsc::Sender<Command>,
}

impl LocalEngine {
    /// Load the saved game (or start a new one) and spawn the engine task.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn start(
        config: &LocalConfig,
        store: SnapshotStore,
        clock: FarmClock,
    ) -> Result<Self, EngineError> {
        let settings = LocalSettings::from_config(config)?;
        let now = clock.now();
        let farm = match store.get_json::<GameState>(&config.snapshot_key).await? {
            Some(state) => {
                info!(
                    key = %config.snapshot_key,
                    coins = state.player.coins,
                    "Resumed saved farm"
                );
                LocalFarm::from_state(settings, state)
            }
            None => {
                info!(key = %config.snapshot_key, "No saved farm, starting a new game");
                LocalFarm::new_game(settings, PlayerProfile::default(), now)
            }
        };

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = EngineTask {
            farm,
            store,
            key: config.snapshot_key.clone(),
            clock,
        };
        tokio::spawn(task.run(rx, config.tick_interval()));
        Ok(Self { commands: tx })
    }

    async fn send(&self, action: Action) -> Result<FarmView, EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Apply { action, reply })
            .await
            .map_err(|_closed| EngineError::Stopped)?;
        response.await.map_err(|_dropped| EngineError::Stopped)?
    }

    /// Sell every harvested unit of `crop`.
    pub async fn sell_crop(&self, crop: CropKind) -> Result<FarmView, EngineError> {
        self.send(Action::SellCrop { crop }).await
    }

    /// Start over, keeping unlocked achievements.
    pub async fn reset(&self, profile: PlayerProfile) -> Result<FarmView, EngineError> {
        self.send(Action::Reset { profile }).await
    }

    /// Replace the display profile.
    pub async fn update_profile(&self, profile: PlayerProfile) -> Result<FarmView, EngineError> {
        self.send(Action::UpdateProfile { profile }).await
    }

    /// Counts of planted, ready and watered plots.
    pub async fn farm_status(&self) -> Result<FarmStatus, EngineError> {
        Ok(self.send(Action::State).await?.status())
    }

    /// Save once more and stop the engine task.
    pub async fn shutdown(self) -> Result<(), EngineError> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(Command::Shutdown { reply })
            .await
            .map_err(|_closed| EngineError::Stopped)?;
        done.await.map_err(|_dropped| EngineError::Stopped)
    }
}

impl FarmEngine for LocalEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Local
    }

    fn seed_policy(&self) -> SeedPolicy {
        SeedPolicy::Inventory
    }

    async fn state(&self) -> Result<FarmView, EngineError> {
        self.send(Action::State).await
    }

    async fn plant(&self, plot: u32, crop: CropKind) -> Result<FarmView, EngineError> {
        self.send(Action::Plant { plot, crop }).await
    }

    async fn water(&self, plot: u32) -> Result<FarmView, EngineError> {
        self.send(Action::Water { plot }).await
    }

    async fn harvest(&self, plot: u32) -> Result<FarmView, EngineError> {
        self.send(Action::Harvest { plot }).await
    }

    async fn buy_seeds(&self, crop: CropKind, quantity: u32) -> Result<FarmView, EngineError> {
        self.send(Action::BuySeeds { crop, quantity }).await
    }

    async fn buy_coins(&self, _payment: Decimal) -> Result<FarmView, EngineError> {
        Err(EngineError::Unsupported {
            operation: "buy_coins",
            engine: EngineKind::Local,
        })
    }
}

// ---------------------------------------------------------------------------
// Engine task
// ---------------------------------------------------------------------------

struct EngineTask {
    farm: LocalFarm,
    store: SnapshotStore,
    key: String,
    clock: FarmClock,
}

impl EngineTask {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>, tick: Duration) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(tick_ms = tick.as_millis(), "Local engine running");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Apply { action, reply }) => {
                        let result = self.apply(action).await;
                        // The caller may have given up waiting.
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown { reply }) => {
                        self.save().await;
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.save().await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    let before = self.farm.state().current_time;
                    let now = self.clock.now();
                    self.farm.advance(now);
                    if self.farm.state().current_time != before {
                        debug!(%now, "Growth tick");
                        self.save().await;
                    }
                }
            }
        }
        info!("Local engine stopped");
    }

    async fn apply(&mut self, action: Action) -> Result<FarmView, EngineError> {
        let now = self.clock.now();
        self.farm.advance(now);

        let name = action.name();
        let changed = match self.mutate(action, now) {
            Ok(changed) => changed,
            Err(err) => {
                info!(action = name, error = %err, "Action rejected");
                return Err(err.into());
            }
        };
        if changed {
            debug!(action = name, coins = self.farm.player().coins, "Action applied");
        }
        // Growth may have advanced even for a read.
        self.save().await;
        Ok(self.farm.view())
    }

    fn mutate(&mut self, action: Action, now: DateTime<Utc>) -> Result<bool, DomainError> {
        match action {
            Action::State => return Ok(false),
            Action::Plant { plot, crop } => {
                self.farm.plant(plot, crop, now)?;
                info!(plot, crop = %crop, "Crop planted");
            }
            Action::Water { plot } => {
                self.farm.water(plot, now)?;
                info!(plot, "Plot watered");
            }
            Action::Harvest { plot } => {
                let crop = self.farm.harvest(plot, now)?;
                info!(
                    plot,
                    crop = %crop,
                    coins = self.farm.player().coins,
                    level = self.farm.player().level,
                    "Crop harvested"
                );
            }
            Action::BuySeeds { crop, quantity } => {
                self.farm.buy_seeds(crop, quantity)?;
                info!(crop = %crop, quantity, "Seeds bought");
            }
            Action::SellCrop { crop } => {
                let earned = self.farm.sell_crop(crop, now)?;
                info!(crop = %crop, earned, "Crop sold");
            }
            Action::Reset { profile } => {
                self.farm.reset(profile, now);
                info!("Farm reset");
            }
            Action::UpdateProfile { profile } => self.farm.update_profile(profile),
        }
        Ok(true)
    }

    async fn save(&self) {
        if let Err(e) = self.store.set_json(&self.key, self.farm.state()).await {
            warn!(key = %self.key, error = %e, "Failed to save farm snapshot");
        }
    }
}
