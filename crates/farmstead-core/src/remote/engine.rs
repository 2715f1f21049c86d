//! The remote ledger engine.
//!
//! The ledger is the source of truth. The engine keeps two explicit pieces
//! of state: the last confirmed snapshot of the player and plots, and the
//! one pending operation (if any). A mutating call is validated against the
//! confirmed snapshot, dispatched, awaited until its receipt is terminal,
//! and only then followed by a fresh read. Nothing is ever credited
//! speculatively.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use farmstead_ledger::{HttpLedger, LedgerBackend, StoreCall, TxStatus};
use farmstead_rules::{DomainError, FarmClock, PlayerCounters, achievements, economy, growth};
use farmstead_types::{CropKind, PlayerAddress, PlayerRecord, PlotRecord, PlotState};
use futures::future::join_all;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::flight::{FlightGuard, SingleFlight};
use crate::config::RemoteConfig;
use crate::engine::{EngineKind, FarmEngine, FarmView, PlayerView, PlotView, SeedPolicy};
use crate::error::{EngineError, ExternalError};

/// Progress shown for a crop the ledger does not yet report as ready.
const MAX_UNREADY_PROGRESS: u32 = 99;

/// Parameters of a remote engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Chain the ledger lives on.
    pub chain_id: u64,
    /// Plots per player.
    pub plot_count: u32,
    /// Coins per native currency unit.
    pub coins_per_native_unit: u64,
    /// Background refresh interval.
    pub poll_interval: Duration,
    /// Receipt poll interval while waiting for confirmation.
    pub confirmation_poll_interval: Duration,
    /// Give up waiting for a receipt after this long.
    pub confirmation_timeout: Option<Duration>,
    /// Switch the session to the ledger's chain automatically.
    pub auto_switch_network: bool,
}

impl RemoteSettings {
    /// Settings from the `remote` configuration section.
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            plot_count: config.plot_count,
            coins_per_native_unit: config.coins_per_native_unit,
            poll_interval: config.poll_interval(),
            confirmation_poll_interval: config.confirmation_poll_interval(),
            confirmation_timeout: config.confirmation_timeout(),
            auto_switch_network: config.auto_switch_network,
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self::from_config(&RemoteConfig::default())
    }
}

/// Last state read back from the ledger.
#[derive(Debug, Clone)]
struct Confirmed {
    player: PlayerRecord,
    /// One entry per plot index; `None` for plots never initialized or
    /// whose read failed.
    plots: Vec<Option<PlotRecord>>,
    refreshed_at: DateTime<Utc>,
}

impl Confirmed {
    fn plot(&self, index: u32) -> Option<&PlotRecord> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.plots.get(slot))
            .and_then(Option::as_ref)
    }
}

struct Inner {
    ledger: LedgerBackend,
    address: PlayerAddress,
    settings: RemoteSettings,
    clock: FarmClock,
    confirmed: RwLock<Confirmed>,
    flight: Arc<SingleFlight>,
}

/// A farm backed by a remote ledger. Clones share the same session.
#[derive(Clone)]
pub struct RemoteEngine {
    inner: Arc<Inner>,
}

impl RemoteEngine {
    /// Connect `address` to a ledger and read its current state.
    pub async fn connect(
        ledger: LedgerBackend,
        address: PlayerAddress,
        settings: RemoteSettings,
        clock: FarmClock,
    ) -> Result<Self, EngineError> {
        let (player, plots) = read_all(&ledger, &address, settings.plot_count).await?;
        info!(
            address = %address,
            backend = ledger.name(),
            coins = player.coins,
            "Connected to ledger"
        );
        let refreshed_at = clock.now();
        Ok(Self {
            inner: Arc::new(Inner {
                ledger,
                address,
                settings,
                clock,
                confirmed: RwLock::new(Confirmed {
                    player,
                    plots,
                    refreshed_at,
                }),
                flight: Arc::new(SingleFlight::new()),
            }),
        })
    }

    /// Connect `address` to the gateway named in the `remote` section.
    pub async fn connect_gateway(
        config: &RemoteConfig,
        address: PlayerAddress,
        clock: FarmClock,
    ) -> Result<Self, EngineError> {
        let ledger = LedgerBackend::Http(HttpLedger::new(config.gateway_url.as_str()));
        Self::connect(ledger, address, RemoteSettings::from_config(config), clock).await
    }

    /// Wallet address of this session.
    pub fn address(&self) -> &PlayerAddress {
        &self.inner.address
    }

    /// Whether a mutating call is in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.flight.is_busy()
    }

    /// Re-read the player and every plot from the ledger.
    ///
    /// On failure the cached state is left as it was.
    pub async fn refresh(&self) -> Result<FarmView, EngineError> {
        self.reload().await?;
        self.state().await
    }

    async fn reload(&self) -> Result<(), ExternalError> {
        let inner = &self.inner;
        let (player, plots) =
            read_all(&inner.ledger, &inner.address, inner.settings.plot_count).await?;
        *inner.confirmed.write().await = Confirmed {
            player,
            plots,
            refreshed_at: inner.clock.now(),
        };
        debug!(address = %inner.address, coins = player.coins, "Ledger state refreshed");
        Ok(())
    }

    /// Refresh in the background every poll interval until the handle is
    /// aborted.
    pub fn spawn_poller(&self) -> JoinHandle<()> {
        let engine = self.clone();
        let period = self.inner.settings.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = engine.refresh().await {
                    warn!(address = %engine.inner.address, error = %e, "Background refresh failed");
                }
            }
        })
    }

    // -----------------------------------------------------------------------
    // Mutation pipeline
    // -----------------------------------------------------------------------

    /// Validate, dispatch, await confirmation, then refresh.
    async fn execute<F>(&self, call: StoreCall, validate: F) -> Result<FarmView, EngineError>
    where
        F: FnOnce(&Confirmed) -> Result<(), DomainError> + Send,
    {
        let inner = &self.inner;
        let name = call.name();
        let guard = inner.flight.begin(name, inner.clock.now())?;

        validate(&*inner.confirmed.read().await)?;
        self.ensure_network().await?;

        // Once dispatched, the call settles on its own task that owns the
        // slot, so the session stays busy even if this caller goes away.
        let engine = self.clone();
        let settling = tokio::spawn(async move { engine.settle(call, guard).await });
        settling
            .await
            .map_err(|e| ExternalError::RequestFailed {
                operation: name.to_owned(),
                reason: format!("confirmation task ended: {e}"),
            })??;
        self.state().await
    }

    /// Submit `call`, wait for a terminal receipt and cache the new state.
    ///
    /// `guard` is dropped only after the refreshed state is cached, so the
    /// next call validates against it.
    async fn settle(&self, call: StoreCall, guard: FlightGuard) -> Result<(), EngineError> {
        let inner = &self.inner;
        let name = call.name();

        let handle = inner
            .ledger
            .submit(&inner.address, call)
            .await
            .map_err(|e| ExternalError::from_store(name, e))?;
        guard.accepted(handle.id);
        info!(operation = %handle.id, call = %handle.call, "Awaiting confirmation");

        let receipt = inner
            .ledger
            .wait_for_confirmation(
                handle.id,
                inner.settings.confirmation_poll_interval,
                inner.settings.confirmation_timeout,
            )
            .await
            .map_err(|e| ExternalError::from_store(name, e))?;

        match receipt.status {
            TxStatus::Confirmed => {
                let reloaded = self.reload().await;
                drop(guard);
                reloaded.map_err(|source| {
                    warn!(operation = %handle.id, error = %source, "Confirmed, but refresh failed");
                    EngineError::RefreshFailed {
                        operation: name.to_owned(),
                        operation_id: handle.id,
                        source,
                    }
                })
            }
            TxStatus::Reverted { reason } => {
                warn!(operation = %handle.id, %reason, "Call reverted by ledger");
                Err(ExternalError::RequestFailed {
                    operation: name.to_owned(),
                    reason,
                }
                .into())
            }
            TxStatus::Pending => Err(ExternalError::RequestFailed {
                operation: name.to_owned(),
                reason: "receipt is still pending".to_owned(),
            }
            .into()),
        }
    }

    /// Make sure the session is on the ledger's chain before dispatching.
    async fn ensure_network(&self) -> Result<(), EngineError> {
        let inner = &self.inner;
        let expected = inner.settings.chain_id;
        let actual = inner
            .ledger
            .session_chain()
            .await
            .map_err(|e| ExternalError::from_store("getChain", e))?;
        if actual == expected {
            return Ok(());
        }
        if !inner.settings.auto_switch_network {
            return Err(ExternalError::WrongNetwork { expected, actual }.into());
        }
        info!(from = actual, to = expected, "Switching session network");
        inner
            .ledger
            .switch_chain(expected)
            .await
            .map_err(|e| ExternalError::from_store("switchChain", e))?;
        Ok(())
    }

    fn view_of(&self, confirmed: &Confirmed) -> FarmView {
        let player = confirmed.player;
        let now = self.inner.clock.now();
        FarmView {
            engine: EngineKind::Remote,
            player: PlayerView {
                coins: player.coins,
                experience: player.experience,
                level: player.level,
                total_harvests: player.total_harvests,
                total_planted: player.total_planted,
            },
            plots: confirmed
                .plots
                .iter()
                .zip(0_u32..)
                .map(|(record, index)| plot_view(index, record.as_ref(), now))
                .collect(),
            inventory: Vec::new(),
            achievements: achievements::evaluate(&PlayerCounters::of_record(&player), &[]),
            pending: self.inner.flight.current(),
            updated_at: confirmed.refreshed_at,
        }
    }

    fn check_plot_index(&self, plot: u32) -> Result<(), DomainError> {
        if plot < self.inner.settings.plot_count {
            Ok(())
        } else {
            Err(DomainError::invalid_state(format!("plot {plot} does not exist")))
        }
    }
}

impl FarmEngine for RemoteEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Remote
    }

    fn seed_policy(&self) -> SeedPolicy {
        SeedPolicy::PurchaseOnPlant
    }

    async fn state(&self) -> Result<FarmView, EngineError> {
        Ok(self.view_of(&*self.inner.confirmed.read().await))
    }

    async fn plant(&self, plot: u32, crop: CropKind) -> Result<FarmView, EngineError> {
        self.check_plot_index(plot)?;
        ledger_crop(crop)?;
        self.execute(StoreCall::PlantCrop { plot, crop }, move |confirmed| {
            if confirmed.plot(plot).is_some_and(|r| r.state.is_occupied()) {
                return Err(DomainError::invalid_state(format!(
                    "plot {plot} is already planted"
                )));
            }
            economy::debit(confirmed.player.coins, economy::seed_cost(crop, 1)?).map(|_| ())
        })
        .await
    }

    async fn water(&self, plot: u32) -> Result<FarmView, EngineError> {
        self.check_plot_index(plot)?;
        self.execute(StoreCall::WaterPlot { plot }, move |confirmed| {
            if confirmed.plot(plot).is_some_and(|r| r.state.is_occupied()) {
                Ok(())
            } else {
                Err(DomainError::invalid_state(format!("plot {plot} is empty")))
            }
        })
        .await
    }

    async fn harvest(&self, plot: u32) -> Result<FarmView, EngineError> {
        self.check_plot_index(plot)?;
        self.execute(StoreCall::HarvestCrop { plot }, move |confirmed| {
            if confirmed.plot(plot).is_some_and(|r| r.is_ready) {
                Ok(())
            } else {
                Err(DomainError::invalid_state(format!(
                    "crop on plot {plot} is not ready"
                )))
            }
        })
        .await
    }

    async fn buy_seeds(&self, crop: CropKind, quantity: u32) -> Result<FarmView, EngineError> {
        if quantity == 0 {
            return Err(DomainError::invalid_state("quantity must be at least 1").into());
        }
        ledger_crop(crop)?;
        let call = StoreCall::BuySeeds {
            crop,
            amount: quantity,
        };
        self.execute(call, move |confirmed| {
            economy::debit(confirmed.player.coins, economy::seed_cost(crop, quantity)?).map(|_| ())
        })
        .await
    }

    async fn buy_coins(&self, payment: Decimal) -> Result<FarmView, EngineError> {
        let expected = economy::coins_for_payment(payment, self.inner.settings.coins_per_native_unit)?;
        debug!(%payment, expected, "Buying coins");
        self.execute(StoreCall::BuyCoins { payment }, |_| Ok(())).await
    }
}

/// Reject crops the ledger has no code for before anything is dispatched.
fn ledger_crop(crop: CropKind) -> Result<(), DomainError> {
    if crop.ledger_code().is_some() {
        Ok(())
    } else {
        Err(DomainError::invalid_state(format!(
            "crop {crop} is not available on the ledger"
        )))
    }
}

/// Read the player and every plot concurrently.
///
/// A plot whose read fails is shown as empty; a failed player read fails
/// the whole refresh.
async fn read_all(
    ledger: &LedgerBackend,
    address: &PlayerAddress,
    plot_count: u32,
) -> Result<(PlayerRecord, Vec<Option<PlotRecord>>), ExternalError> {
    let player = ledger
        .get_player(address)
        .await
        .map_err(|e| ExternalError::from_store("getPlayer", e))?;
    let reads = (0..plot_count).map(|plot| async move {
        match ledger.get_plot(address, plot).await {
            Ok(record) => record,
            Err(e) => {
                warn!(plot, error = %e, "Plot read failed, showing it as empty");
                None
            }
        }
    });
    Ok((player, join_all(reads).await))
}

fn plot_view(index: u32, record: Option<&PlotRecord>, now: DateTime<Utc>) -> PlotView {
    let Some(record) = record else {
        return PlotView {
            index,
            state: PlotState::Empty,
            crop: None,
            progress: Decimal::ZERO,
            stage: None,
            is_watered: false,
            is_fertilized: false,
            is_ready: false,
        };
    };
    let crop = record.crop();
    let progress = if record.is_ready {
        Decimal::ONE_HUNDRED
    } else if crop.is_some() {
        display_progress(record, now)
    } else {
        Decimal::ZERO
    };
    PlotView {
        index,
        state: record.state,
        crop,
        progress,
        stage: crop.map(|_| growth::stage(progress, 100)),
        is_watered: record.is_watered,
        is_fertilized: false,
        is_ready: record.is_ready,
    }
}

/// Elapsed share of the growth time, capped below 100 so the display never
/// claims readiness the ledger has not reported.
fn display_progress(record: &PlotRecord, now: DateTime<Utc>) -> Decimal {
    let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
    let elapsed = now_secs.saturating_sub(record.planted_at);
    let cap = Decimal::from(MAX_UNREADY_PROGRESS);
    Decimal::from(elapsed)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(Decimal::from(record.growth_time)))
        .map_or(cap, |pct| pct.round_dp(1).min(cap))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use farmstead_ledger::{MemoryLedger, MemoryLedgerConfig};
    use farmstead_rules::ManualClock;
    use farmstead_types::AchievementKind;
    use rust_decimal_macros::dec;

    use super::*;

    struct Harness {
        engine: RemoteEngine,
        ledger: Arc<MemoryLedger>,
        clock: ManualClock,
    }

    fn address() -> PlayerAddress {
        "0x00000000000000000000000000000000000000c3".parse().unwrap()
    }

    async fn harness_with(settings: RemoteSettings) -> Harness {
        let clock = ManualClock::starting_at(DateTime::<Utc>::default() + TimeDelta::days(1));
        let ledger = Arc::new(MemoryLedger::new(
            MemoryLedgerConfig::default(),
            FarmClock::Manual(clock.clone()),
        ));
        let engine = RemoteEngine::connect(
            LedgerBackend::Memory(Arc::clone(&ledger)),
            address(),
            settings,
            FarmClock::Manual(clock.clone()),
        )
        .await
        .unwrap();
        Harness {
            engine,
            ledger,
            clock,
        }
    }

    async fn harness() -> Harness {
        harness_with(RemoteSettings {
            confirmation_poll_interval: Duration::from_millis(5),
            ..RemoteSettings::default()
        })
        .await
    }

    async fn wait_until_busy(engine: &RemoteEngine) {
        while !engine.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    async fn wait_until_submitted(engine: &RemoteEngine) {
        while engine
            .inner
            .flight
            .current()
            .and_then(|pending| pending.operation_id)
            .is_none()
        {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    async fn wait_until_idle(engine: &RemoteEngine) {
        while engine.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn fresh_player_reads_starting_state() {
        let h = harness().await;
        let view = h.engine.state().await.unwrap();
        assert_eq!(view.engine, EngineKind::Remote);
        assert_eq!(view.player.coins, 100);
        assert_eq!(view.player.level, 1);
        assert_eq!(view.plots.len(), 25);
        assert!(view.plots.iter().all(|p| p.state == PlotState::Empty));
        assert_eq!(h.engine.seed_policy(), SeedPolicy::PurchaseOnPlant);
    }

    #[tokio::test]
    async fn plant_buys_the_seed_and_waits_for_ready() {
        let h = harness().await;
        let view = h.engine.plant(3, CropKind::Carrot).await.unwrap();
        assert_eq!(view.player.coins, 95);
        assert_eq!(view.player.total_planted, 1);
        assert_eq!(view.plot(3).unwrap().crop, Some(CropKind::Carrot));
        assert!(!view.plot(3).unwrap().is_ready);

        let err = h.engine.harvest(3).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain {
                source: DomainError::InvalidState { .. }
            }
        ));

        h.clock.advance(TimeDelta::minutes(20));
        let view = h.engine.refresh().await.unwrap();
        assert!(view.plot(3).unwrap().is_ready);

        let view = h.engine.harvest(3).await.unwrap();
        assert_eq!(view.player.coins, 110);
        assert_eq!(view.player.experience, 10);
        assert_eq!(view.plot(3).unwrap().state, PlotState::Harvested);
        assert!(view.is_unlocked(AchievementKind::FirstHarvest));
    }

    #[tokio::test]
    async fn insufficient_coins_never_dispatch() {
        let h = harness().await;
        h.ledger.switch_chain(1);
        let err = h.engine.plant(0, CropKind::GoldenApple).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain {
                source: DomainError::InsufficientResource { .. }
            }
        ));
        assert!(!h.engine.is_busy());
        assert_eq!(h.ledger.get_player(&address()).await.total_planted, 0);
        assert_eq!(h.ledger.session_chain(), 1);
    }

    #[tokio::test]
    async fn harvested_plot_is_replanted_but_not_harvested_twice() {
        let h = harness().await;
        h.engine.plant(3, CropKind::Carrot).await.unwrap();
        h.clock.advance(TimeDelta::minutes(20));
        h.engine.refresh().await.unwrap();
        let view = h.engine.harvest(3).await.unwrap();
        assert_eq!(view.plot(3).unwrap().state, PlotState::Harvested);
        assert_eq!(view.player.coins, 110);

        let err = h.engine.harvest(3).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Domain {
                source: DomainError::InvalidState { .. }
            }
        ));
        assert_eq!(h.ledger.get_player(&address()).await.total_harvests, 1);

        let view = h.engine.plant(3, CropKind::Tomato).await.unwrap();
        let plot = view.plot(3).unwrap();
        assert_eq!(plot.state, PlotState::Planted);
        assert_eq!(plot.crop, Some(CropKind::Tomato));
        assert_eq!(view.player.coins, 100);
        assert_eq!(view.player.total_planted, 2);
    }

    #[tokio::test]
    async fn second_call_is_rejected_while_first_is_in_flight() {
        let h = harness().await;
        h.engine.plant(0, CropKind::Tomato).await.unwrap();

        h.ledger.hold_confirmations();
        let engine = h.engine.clone();
        let watering = tokio::spawn(async move { engine.water(0).await });
        wait_until_busy(&h.engine).await;

        let pending = h.engine.state().await.unwrap().pending.unwrap();
        assert_eq!(pending.call, "waterPlot");
        let err = h.engine.plant(3, CropKind::Carrot).await.unwrap_err();
        assert!(matches!(err, EngineError::Busy { ref in_flight } if in_flight == "waterPlot"));

        h.ledger.release_confirmations();
        let view = watering.await.unwrap().unwrap();
        assert!(view.plot(0).unwrap().is_watered);
        assert!(view.pending.is_none());
        assert!(!h.engine.is_busy());
    }

    #[tokio::test]
    async fn dropped_caller_keeps_the_session_busy_until_settled() {
        let h = harness().await;
        h.ledger.hold_confirmations();
        let engine = h.engine.clone();
        let buying = tokio::spawn(async move { engine.buy_seeds(CropKind::Tomato, 1).await });
        wait_until_submitted(&h.engine).await;

        buying.abort();
        assert!(buying.await.unwrap_err().is_cancelled());
        assert!(h.engine.is_busy());

        let err = h.engine.buy_seeds(CropKind::Carrot, 1).await.unwrap_err();
        assert!(matches!(err, EngineError::Busy { ref in_flight } if in_flight == "buySeeds"));

        h.ledger.release_confirmations();
        wait_until_idle(&h.engine).await;
        assert_eq!(h.ledger.get_player(&address()).await.coins, 90);
        assert_eq!(h.engine.state().await.unwrap().player.coins, 90);
    }

    #[tokio::test]
    async fn confirmed_call_with_failed_refresh_reports_it_was_applied() {
        let h = harness().await;
        h.ledger.hold_confirmations();
        let engine = h.engine.clone();
        let buying = tokio::spawn(async move { engine.buy_coins(dec!(2)).await });
        wait_until_submitted(&h.engine).await;

        h.ledger.take_reads_offline();
        h.ledger.release_confirmations();
        let err = buying.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            EngineError::RefreshFailed { ref operation, .. } if operation == "buyCoins"
        ));
        assert!(!h.engine.is_busy());
        assert_eq!(h.ledger.get_player(&address()).await.coins, 200);

        h.ledger.restore_reads();
        assert_eq!(h.engine.refresh().await.unwrap().player.coins, 200);
    }

    #[tokio::test]
    async fn coins_are_credited_only_after_confirmation() {
        let h = harness().await;
        h.ledger.hold_confirmations();
        let engine = h.engine.clone();
        let buying = tokio::spawn(async move { engine.buy_coins(dec!(2)).await });
        wait_until_busy(&h.engine).await;
        assert_eq!(h.engine.state().await.unwrap().player.coins, 100);

        h.ledger.release_confirmations();
        let view = buying.await.unwrap().unwrap();
        assert_eq!(view.player.coins, 200);
    }

    #[tokio::test]
    async fn reverted_call_leaves_state_and_clears_busy() {
        let h = harness().await;
        h.ledger.revert_next("user rejected the request").await;
        let err = h.engine.buy_seeds(CropKind::Tomato, 2).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::External {
                source: ExternalError::RequestFailed { ref operation, ref reason },
            } if operation == "buySeeds" && reason == "user rejected the request"
        ));
        assert!(!h.engine.is_busy());
        assert_eq!(h.engine.state().await.unwrap().player.coins, 100);
    }

    #[tokio::test]
    async fn confirmation_timeout_fails_the_call() {
        let h = harness_with(RemoteSettings {
            confirmation_poll_interval: Duration::from_millis(5),
            confirmation_timeout: Some(Duration::from_millis(40)),
            ..RemoteSettings::default()
        })
        .await;
        h.ledger.hold_confirmations();
        let err = h.engine.buy_seeds(CropKind::Carrot, 1).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::External {
                source: ExternalError::RequestFailed { .. }
            }
        ));
        assert!(!h.engine.is_busy());
    }

    #[tokio::test]
    async fn wrong_network_is_switched_or_rejected() {
        let h = harness().await;
        h.ledger.switch_chain(1);
        h.engine.buy_seeds(CropKind::Carrot, 1).await.unwrap();
        assert_eq!(h.ledger.session_chain(), 10143);

        let strict = harness_with(RemoteSettings {
            auto_switch_network: false,
            confirmation_poll_interval: Duration::from_millis(5),
            ..RemoteSettings::default()
        })
        .await;
        strict.ledger.switch_chain(1);
        let err = strict.engine.buy_seeds(CropKind::Carrot, 1).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::External {
                source: ExternalError::WrongNetwork {
                    expected: 10143,
                    actual: 1
                }
            }
        ));
    }

    #[tokio::test]
    async fn local_only_crops_are_rejected() {
        let h = harness().await;
        let err = h.engine.plant(0, CropKind::Blueberry).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain { .. }));
        let err = h.engine.buy_coins(dec!(0)).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain { .. }));
        let err = h.engine.water(25).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn poller_picks_up_ledger_changes() {
        let h = harness_with(RemoteSettings {
            poll_interval: Duration::from_millis(100),
            confirmation_poll_interval: Duration::from_millis(5),
            ..RemoteSettings::default()
        })
        .await;
        let other = RemoteEngine::connect(
            LedgerBackend::Memory(Arc::clone(&h.ledger)),
            address(),
            RemoteSettings {
                confirmation_poll_interval: Duration::from_millis(5),
                ..RemoteSettings::default()
            },
            FarmClock::Manual(h.clock.clone()),
        )
        .await
        .unwrap();
        let poller = h.engine.spawn_poller();
        other.buy_coins(dec!(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(h.engine.state().await.unwrap().player.coins, 150);
        poller.abort();
    }

    #[test]
    fn unready_progress_is_capped() {
        let record = PlotRecord {
            crop_type: 0,
            state: PlotState::Growing,
            planted_at: 0,
            last_watered: 0,
            growth_time: 60,
            is_watered: false,
            is_ready: false,
        };
        let now = DateTime::<Utc>::default() + TimeDelta::minutes(5);
        let view = plot_view(0, Some(&record), now);
        assert_eq!(view.progress, Decimal::from(MAX_UNREADY_PROGRESS));
        assert_eq!(view.crop, Some(CropKind::Tomato));
    }
}
