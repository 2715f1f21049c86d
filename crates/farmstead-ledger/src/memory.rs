//! In-process authoritative ledger.
//!
//! [`MemoryLedger`] enforces the same rules as the deployed farming
//! contract: plots are indexed per player, seeds are bought implicitly when
//! planting, readiness is computed from `planted_at` and `growth_time` at
//! read time, and harvest rewards coins and experience by rarity.
//!
//! Submissions are queued as pending and mined the first time they are
//! polled. Tests can hold confirmations to keep an operation in flight,
//! force the next submission to revert, and take reads offline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use farmstead_rules::{DomainError, FarmClock, catalog, economy};
use farmstead_types::{OperationId, PlayerAddress, PlayerRecord, PlotRecord, PlotState};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::call::{OperationHandle, Receipt, StoreCall, TxStatus};
use crate::error::StoreError;

/// Seconds of ledger growth per catalog minute.
const SECONDS_PER_MINUTE: u64 = 60;

/// How long a settled receipt stays readable before it is pruned.
const RECEIPT_RETENTION_SECS: u64 = 3_600;

/// Static parameters of a [`MemoryLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLedgerConfig {
    /// Chain the ledger lives on.
    pub chain_id: u64,
    /// Coins a player holds before their first transaction.
    pub starting_coins: u64,
    /// Number of plots per player.
    pub plot_count: u32,
    /// Coins per native currency unit for `buyCoins`.
    pub coins_per_native_unit: u64,
}

impl Default for MemoryLedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: 10143,
            starting_coins: 100,
            plot_count: 25,
            coins_per_native_unit: economy::DEFAULT_COINS_PER_NATIVE_UNIT,
        }
    }
}

struct Transaction {
    handle: OperationHandle,
    status: TxStatus,
    forced_revert: Option<String>,
    /// Ledger time the status became terminal.
    settled_at: Option<u64>,
}

#[derive(Default)]
struct LedgerState {
    players: BTreeMap<PlayerAddress, PlayerRecord>,
    plots: BTreeMap<(PlayerAddress, u32), PlotRecord>,
    transactions: BTreeMap<OperationId, Transaction>,
    revert_next: Option<String>,
}

/// An in-process ledger with contract semantics.
pub struct MemoryLedger {
    config: MemoryLedgerConfig,
    clock: FarmClock,
    session_chain: AtomicU64,
    holding: AtomicBool,
    reads_offline: AtomicBool,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Create an empty ledger. The session starts on the ledger's chain.
    pub fn new(config: MemoryLedgerConfig, clock: FarmClock) -> Self {
        Self {
            config,
            clock,
            session_chain: AtomicU64::new(config.chain_id),
            holding: AtomicBool::new(false),
            reads_offline: AtomicBool::new(false),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Static parameters.
    pub const fn config(&self) -> &MemoryLedgerConfig {
        &self.config
    }

    /// Chain the current session is connected to.
    pub fn session_chain(&self) -> u64 {
        self.session_chain.load(Ordering::SeqCst)
    }

    /// Point the session at another chain.
    pub fn switch_chain(&self, chain_id: u64) {
        info!(from = self.session_chain(), to = chain_id, "Session chain switched");
        self.session_chain.store(chain_id, Ordering::SeqCst);
    }

    /// Keep every pending operation pending until [`Self::release_confirmations`].
    pub fn hold_confirmations(&self) {
        self.holding.store(true, Ordering::SeqCst);
    }

    /// Let pending operations be mined again.
    pub fn release_confirmations(&self) {
        self.holding.store(false, Ordering::SeqCst);
    }

    /// Make player and plot reads through a backend fail until
    /// [`Self::restore_reads`]. Submissions and receipts keep working.
    pub fn take_reads_offline(&self) {
        self.reads_offline.store(true, Ordering::SeqCst);
    }

    /// Serve reads again.
    pub fn restore_reads(&self) {
        self.reads_offline.store(false, Ordering::SeqCst);
    }

    /// Fail with a transport error while reads are offline.
    pub(crate) fn check_reads(&self, operation: &str) -> Result<(), StoreError> {
        if self.reads_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Transport {
                operation: operation.to_owned(),
                reason: "ledger reads are offline".to_owned(),
            });
        }
        Ok(())
    }

    /// Make the next submitted operation revert with `reason`.
    pub async fn revert_next(&self, reason: impl Into<String>) {
        self.state.lock().await.revert_next = Some(reason.into());
    }

    fn now_secs(&self) -> u64 {
        u64::try_from(self.clock.now().timestamp()).unwrap_or(0)
    }

    fn fresh_player(&self) -> PlayerRecord {
        PlayerRecord {
            coins: self.config.starting_coins,
            level: 1,
            ..PlayerRecord::default()
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Player record. Players without transactions read as fresh players.
    pub async fn get_player(&self, address: &PlayerAddress) -> PlayerRecord {
        let state = self.state.lock().await;
        state
            .players
            .get(address)
            .copied()
            .unwrap_or_else(|| self.fresh_player())
    }

    /// Plot record, or `None` if the plot was never planted.
    pub async fn get_plot(&self, address: &PlayerAddress, plot: u32) -> Option<PlotRecord> {
        let now = self.now_secs();
        let state = self.state.lock().await;
        state
            .plots
            .get(&(address.clone(), plot))
            .map(|record| observe(*record, now))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Queue a call. Rule checks happen when the operation is mined.
    pub async fn submit(
        &self,
        address: &PlayerAddress,
        call: StoreCall,
    ) -> Result<OperationHandle, StoreError> {
        let session = self.session_chain();
        if session != self.config.chain_id {
            return Err(StoreError::WrongChain {
                expected: self.config.chain_id,
                actual: session,
            });
        }
        if let Some(crop) = call.crop().filter(|c| c.ledger_code().is_none()) {
            return Err(StoreError::Unsupported {
                reason: format!("crop {crop} is not available on the ledger"),
            });
        }

        let handle = OperationHandle {
            id: OperationId::new(),
            address: address.clone(),
            call,
            submitted_at: self.clock.now(),
        };

        let now = self.now_secs();
        let mut state = self.state.lock().await;
        prune_settled(&mut state.transactions, now);
        let forced_revert = state.revert_next.take();
        state.transactions.insert(
            handle.id,
            Transaction {
                handle: handle.clone(),
                status: TxStatus::Pending,
                forced_revert,
                settled_at: None,
            },
        );
        info!(
            operation = %handle.id,
            call = %handle.call,
            address = %handle.address,
            "Operation submitted"
        );
        Ok(handle)
    }

    /// Current receipt of an operation, mining it if it is still pending.
    pub async fn poll_transaction(&self, id: OperationId) -> Result<Receipt, StoreError> {
        let now = self.now_secs();
        let mut state = self.state.lock().await;

        let (address, call, forced) = {
            let tx = state.transactions.get(&id).ok_or_else(|| StoreError::NotFound {
                what: format!("operation {id}"),
            })?;
            if tx.status.is_terminal() || self.holding.load(Ordering::SeqCst) {
                return Ok(Receipt {
                    operation_id: id,
                    status: tx.status.clone(),
                });
            }
            (
                tx.handle.address.clone(),
                tx.handle.call.clone(),
                tx.forced_revert.clone(),
            )
        };

        let status = match forced {
            Some(reason) => TxStatus::Reverted { reason },
            None => match self.apply(&mut state, &address, &call, now) {
                Ok(()) => TxStatus::Confirmed,
                Err(err) => TxStatus::Reverted {
                    reason: err.to_string(),
                },
            },
        };

        match &status {
            TxStatus::Confirmed => info!(operation = %id, call = %call, "Operation confirmed"),
            TxStatus::Reverted { reason } => {
                warn!(operation = %id, call = %call, %reason, "Operation reverted");
            }
            TxStatus::Pending => debug!(operation = %id, "Operation still pending"),
        }

        if let Some(tx) = state.transactions.get_mut(&id) {
            tx.status = status.clone();
            tx.settled_at = status.is_terminal().then_some(now);
        }
        Ok(Receipt {
            operation_id: id,
            status,
        })
    }

    /// Execute a call against the state. Nothing is written unless every
    /// check passes.
    fn apply(
        &self,
        state: &mut LedgerState,
        address: &PlayerAddress,
        call: &StoreCall,
        now: u64,
    ) -> Result<(), DomainError> {
        let mut player = state
            .players
            .get(address)
            .copied()
            .unwrap_or_else(|| self.fresh_player());

        let plot_update = match *call {
            StoreCall::PlantCrop { plot, crop } => {
                self.check_plot(plot)?;
                let existing = state
                    .plots
                    .get(&(address.clone(), plot))
                    .map(|r| observe(*r, now));
                if existing.is_some_and(|r| r.state.is_occupied()) {
                    return Err(DomainError::invalid_state(format!("plot {plot} is occupied")));
                }
                let crop_type = crop.ledger_code().ok_or_else(|| {
                    DomainError::invalid_state(format!("crop {crop} is not on the ledger"))
                })?;
                let spec = catalog::crop(crop);
                player.coins = economy::debit(player.coins, spec.buy_price)?;
                player.total_planted = player
                    .total_planted
                    .checked_add(1)
                    .ok_or_else(|| DomainError::overflow("total planted"))?;
                let growth_time = u64::from(spec.growth_time)
                    .checked_mul(SECONDS_PER_MINUTE)
                    .ok_or_else(|| DomainError::overflow("growth time"))?;
                Some((
                    plot,
                    PlotRecord {
                        crop_type,
                        state: PlotState::Planted,
                        planted_at: now,
                        last_watered: 0,
                        growth_time,
                        is_watered: false,
                        is_ready: false,
                    },
                ))
            }
            StoreCall::WaterPlot { plot } => {
                let mut record = occupied_plot(state, address, plot, now)?;
                record.is_watered = true;
                record.last_watered = now;
                Some((plot, record))
            }
            StoreCall::HarvestCrop { plot } => {
                let mut record = occupied_plot(state, address, plot, now)?;
                if !record.is_ready {
                    return Err(DomainError::invalid_state(format!(
                        "crop on plot {plot} is not ready"
                    )));
                }
                let kind = record.crop().ok_or_else(|| {
                    DomainError::invalid_state(format!("unknown crop type {}", record.crop_type))
                })?;
                let spec = catalog::crop(kind);
                player.coins = economy::credit(player.coins, spec.sell_price)?;
                player.experience = player
                    .experience
                    .checked_add(economy::experience_for(spec.rarity))
                    .ok_or_else(|| DomainError::overflow("experience"))?;
                player.level = u64::from(economy::level_for(player.experience)?);
                player.total_harvests = player
                    .total_harvests
                    .checked_add(1)
                    .ok_or_else(|| DomainError::overflow("total harvests"))?;
                record.state = PlotState::Harvested;
                record.is_ready = false;
                record.is_watered = false;
                Some((plot, record))
            }
            StoreCall::BuySeeds { crop, amount } => {
                if amount == 0 {
                    return Err(DomainError::invalid_state("seed amount must be positive"));
                }
                player.coins = economy::debit(player.coins, economy::seed_cost(crop, amount)?)?;
                None
            }
            StoreCall::BuyCoins { payment } => {
                let coins =
                    economy::coins_for_payment(payment, self.config.coins_per_native_unit)?;
                player.coins = economy::credit(player.coins, coins)?;
                None
            }
        };

        state.players.insert(address.clone(), player);
        if let Some((plot, record)) = plot_update {
            state.plots.insert((address.clone(), plot), record);
        }
        Ok(())
    }

    fn check_plot(&self, plot: u32) -> Result<(), DomainError> {
        if plot >= self.config.plot_count {
            return Err(DomainError::invalid_state(format!(
                "plot {plot} is outside the farm (0..{})",
                self.config.plot_count
            )));
        }
        Ok(())
    }
}

/// Drop receipts that settled more than [`RECEIPT_RETENTION_SECS`] ago.
fn prune_settled(transactions: &mut BTreeMap<OperationId, Transaction>, now: u64) {
    let before = transactions.len();
    transactions.retain(|_, tx| {
        tx.settled_at
            .is_none_or(|at| now.saturating_sub(at) < RECEIPT_RETENTION_SECS)
    });
    let pruned = before.saturating_sub(transactions.len());
    if pruned > 0 {
        debug!(pruned, "Pruned settled receipts");
    }
}

/// The plot record if it holds a crop.
fn occupied_plot(
    state: &LedgerState,
    address: &PlayerAddress,
    plot: u32,
    now: u64,
) -> Result<PlotRecord, DomainError> {
    state
        .plots
        .get(&(address.clone(), plot))
        .map(|r| observe(*r, now))
        .filter(|r| r.state.is_occupied())
        .ok_or_else(|| DomainError::invalid_state(format!("plot {plot} has no crop")))
}

/// Derive time-dependent fields of a stored plot record.
fn observe(mut record: PlotRecord, now: u64) -> PlotRecord {
    if !record.state.is_occupied() {
        record.is_ready = false;
        return record;
    }
    let ready_at = record.planted_at.saturating_add(record.growth_time);
    record.is_ready = now >= ready_at;
    record.state = if record.is_ready {
        PlotState::Ready
    } else if now > record.planted_at {
        PlotState::Growing
    } else {
        PlotState::Planted
    };
    record
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeDelta, Utc};
    use farmstead_rules::ManualClock;
    use farmstead_types::CropKind;
    use rust_decimal_macros::dec;

    use super::*;

    fn address() -> PlayerAddress {
        "0x00000000000000000000000000000000000000a1".parse().unwrap()
    }

    fn ledger() -> (MemoryLedger, ManualClock) {
        let clock = ManualClock::starting_at(DateTime::<Utc>::default());
        let ledger = MemoryLedger::new(
            MemoryLedgerConfig::default(),
            FarmClock::Manual(clock.clone()),
        );
        (ledger, clock)
    }

    async fn run(ledger: &MemoryLedger, call: StoreCall) -> TxStatus {
        match ledger.submit(&address(), call).await {
            Ok(handle) => ledger
                .poll_transaction(handle.id)
                .await
                .map(|r| r.status)
                .unwrap_or(TxStatus::Pending),
            Err(err) => TxStatus::Reverted {
                reason: err.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn unknown_player_reads_as_fresh() {
        let (ledger, _) = ledger();
        let player = ledger.get_player(&address()).await;
        assert_eq!(player.coins, 100);
        assert_eq!(player.level, 1);
        assert!(ledger.get_plot(&address(), 0).await.is_none());
    }

    #[tokio::test]
    async fn plant_grow_harvest() {
        let (ledger, clock) = ledger();
        let plant = StoreCall::PlantCrop {
            plot: 3,
            crop: CropKind::Carrot,
        };
        assert_eq!(run(&ledger, plant).await, TxStatus::Confirmed);

        let player = ledger.get_player(&address()).await;
        assert_eq!(player.coins, 95);
        assert_eq!(player.total_planted, 1);

        let early = run(&ledger, StoreCall::HarvestCrop { plot: 3 }).await;
        assert!(matches!(early, TxStatus::Reverted { .. }));

        clock.advance(TimeDelta::minutes(20));
        let plot = ledger.get_plot(&address(), 3).await;
        assert_eq!(plot.map(|p| p.is_ready), Some(true));
        assert_eq!(plot.map(|p| p.state), Some(PlotState::Ready));

        assert_eq!(
            run(&ledger, StoreCall::HarvestCrop { plot: 3 }).await,
            TxStatus::Confirmed
        );
        let player = ledger.get_player(&address()).await;
        assert_eq!(player.coins, 110);
        assert_eq!(player.experience, 10);
        assert_eq!(player.total_harvests, 1);
        let plot = ledger.get_plot(&address(), 3).await;
        assert_eq!(plot.map(|p| p.state), Some(PlotState::Harvested));
    }

    #[tokio::test]
    async fn occupied_plot_reverts_without_charging() {
        let (ledger, _) = ledger();
        let plant = StoreCall::PlantCrop {
            plot: 0,
            crop: CropKind::Tomato,
        };
        assert_eq!(run(&ledger, plant.clone()).await, TxStatus::Confirmed);
        assert!(matches!(run(&ledger, plant).await, TxStatus::Reverted { .. }));
        assert_eq!(ledger.get_player(&address()).await.coins, 90);
    }

    #[tokio::test]
    async fn held_operation_stays_pending() {
        let (ledger, _) = ledger();
        ledger.hold_confirmations();
        let id = ledger
            .submit(&address(), StoreCall::BuyCoins { payment: dec!(1) })
            .await
            .unwrap()
            .id;
        let receipt = ledger.poll_transaction(id).await.unwrap();
        assert_eq!(receipt.status, TxStatus::Pending);
        assert_eq!(ledger.get_player(&address()).await.coins, 100);

        ledger.release_confirmations();
        let receipt = ledger.poll_transaction(id).await.unwrap();
        assert_eq!(receipt.status, TxStatus::Confirmed);
        assert_eq!(ledger.get_player(&address()).await.coins, 150);
    }

    #[tokio::test]
    async fn settled_receipts_are_pruned_after_retention() {
        let (ledger, clock) = ledger();
        let pending_id = {
            ledger.hold_confirmations();
            let id = ledger
                .submit(&address(), StoreCall::BuyCoins { payment: dec!(1) })
                .await
                .unwrap()
                .id;
            ledger.release_confirmations();
            id
        };
        let settled_id = ledger
            .submit(&address(), StoreCall::BuySeeds { crop: CropKind::Carrot, amount: 1 })
            .await
            .unwrap()
            .id;
        assert_eq!(
            ledger.poll_transaction(settled_id).await.unwrap().status,
            TxStatus::Confirmed
        );

        clock.advance(TimeDelta::seconds(i64::try_from(RECEIPT_RETENTION_SECS).unwrap()));
        ledger
            .submit(&address(), StoreCall::WaterPlot { plot: 0 })
            .await
            .unwrap();

        assert!(matches!(
            ledger.poll_transaction(settled_id).await,
            Err(StoreError::NotFound { .. })
        ));
        // Never polled, so never settled.
        assert_eq!(
            ledger.poll_transaction(pending_id).await.unwrap().status,
            TxStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn forced_revert_applies_nothing() {
        let (ledger, _) = ledger();
        ledger.revert_next("user rejected").await;
        let status = run(&ledger, StoreCall::BuyCoins { payment: dec!(2) }).await;
        assert_eq!(
            status,
            TxStatus::Reverted {
                reason: "user rejected".to_owned()
            }
        );
        assert_eq!(ledger.get_player(&address()).await.coins, 100);
    }

    #[tokio::test]
    async fn wrong_chain_and_local_only_crops_are_rejected() {
        let (ledger, _) = ledger();
        ledger.switch_chain(1);
        let result = ledger
            .submit(&address(), StoreCall::WaterPlot { plot: 0 })
            .await;
        assert!(matches!(result, Err(StoreError::WrongChain { .. })));

        ledger.switch_chain(10143);
        let result = ledger
            .submit(
                &address(),
                StoreCall::PlantCrop {
                    plot: 0,
                    crop: CropKind::Blueberry,
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::Unsupported { .. })));
    }
}
