//! The local farm state machine.
//!
//! [`LocalFarm`] owns a [`GameState`] and applies player actions to it
//! synchronously. Every action validates first and mutates only once all
//! of its effects have been computed, so a rejected action leaves the
//! state exactly as it was.
//!
//! Plots are indexed row by row: `index = y * width + x`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use farmstead_rules::{
    DomainError, PlayerCounters, achievements, catalog, economy, growth, inventory,
};
use farmstead_types::{
    AchievementKind, Crop, CropId, CropKind, FarmStatus, GameState, ItemId, Player, PlayerId,
    PlayerProfile, Plot, PlotPosition, Season, ToolKind, UnlockedAchievement, Weather,
};
use rust_decimal::Decimal;

use crate::config::{ConfigError, LocalConfig};
use crate::engine::{EngineKind, FarmView, PlayerView, PlotView};

/// Parameters for a new local game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSettings {
    /// Plots per row.
    pub grid_width: u32,
    /// Number of rows.
    pub grid_height: u32,
    /// Coins a new player starts with.
    pub starting_coins: u64,
    /// Items a new player starts with.
    pub starting_items: BTreeMap<ItemId, u32>,
}

impl LocalSettings {
    /// Settings from the `local` configuration section.
    pub fn from_config(config: &LocalConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            grid_width: config.grid_width,
            grid_height: config.grid_height,
            starting_coins: config.starting_coins,
            starting_items: config.starting_items()?,
        })
    }
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            grid_width: 5,
            grid_height: 5,
            starting_coins: 100,
            starting_items: BTreeMap::from([
                (ItemId::Seed(CropKind::Tomato), 5),
                (ItemId::Seed(CropKind::Carrot), 3),
                (ItemId::Tool(ToolKind::WateringCan), 1),
            ]),
        }
    }
}

/// The local simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFarm {
    settings: LocalSettings,
    state: GameState,
}

impl LocalFarm {
    /// Start a new game for `profile`.
    pub fn new_game(settings: LocalSettings, profile: PlayerProfile, now: DateTime<Utc>) -> Self {
        let state = fresh_state(&settings, profile, now);
        Self { settings, state }
    }

    /// Resume from a saved state.
    pub const fn from_state(settings: LocalSettings, state: GameState) -> Self {
        Self { settings, state }
    }

    /// The whole aggregate, as saved.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The player.
    pub const fn player(&self) -> &Player {
        &self.state.player
    }

    /// Accrue growth on every crop up to `now`.
    ///
    /// Time never runs backwards: a `now` before the last evaluation is a
    /// no-op.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        let elapsed = growth::elapsed_minutes(self.state.current_time, now);
        if elapsed.is_zero() {
            return;
        }
        for crop in self.state.farm.iter_mut().filter_map(|p| p.crop.as_mut()) {
            growth::advance_crop(crop, elapsed);
        }
        self.state.current_time = now;
    }

    /// Plant one `kind` seed from the inventory on plot `index`.
    pub fn plant(
        &mut self,
        index: u32,
        kind: CropKind,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let slot = self.slot(index)?;
        if self.plot_at(slot)?.crop.is_some() {
            return Err(DomainError::invalid_state(format!(
                "plot {index} is already planted"
            )));
        }

        let player = &mut self.state.player;
        let total_planted = player
            .total_planted
            .checked_add(1)
            .ok_or_else(|| DomainError::overflow("total planted"))?;
        inventory::take_item(&mut player.inventory, ItemId::Seed(kind), 1)?;
        player.total_planted = total_planted;
        achievements::record_unlocks(player, now);

        let plot = self.plot_at_mut(slot)?;
        plot.crop = Some(Crop {
            id: CropId::new(),
            kind,
            growth: Decimal::ZERO,
            planted_at: now,
            is_watered: false,
            is_harvested: false,
        });
        plot.is_watered = false;
        Ok(())
    }

    /// Water plot `index`. Watering is cosmetic and never affects growth.
    pub fn water(&mut self, index: u32, now: DateTime<Utc>) -> Result<(), DomainError> {
        let slot = self.slot(index)?;
        let plot = self.plot_at_mut(slot)?;
        let crop = plot
            .crop
            .as_mut()
            .ok_or_else(|| DomainError::invalid_state(format!("plot {index} is empty")))?;
        crop.is_watered = true;
        plot.is_watered = true;
        self.state.player.last_watered = Some(now);
        Ok(())
    }

    /// Harvest the ready crop on plot `index` and return its kind.
    pub fn harvest(&mut self, index: u32, now: DateTime<Utc>) -> Result<CropKind, DomainError> {
        let slot = self.slot(index)?;
        let crop = self
            .plot_at(slot)?
            .crop
            .as_ref()
            .ok_or_else(|| DomainError::invalid_state(format!("plot {index} is empty")))?;
        if !growth::crop_is_ready(crop) {
            return Err(DomainError::invalid_state(format!(
                "crop on plot {index} is not ready"
            )));
        }
        let kind = crop.kind;
        let spec = catalog::crop(kind);

        let player = &self.state.player;
        let coins = economy::credit(player.coins, spec.sell_price)?;
        let experience = player
            .experience
            .checked_add(economy::experience_for(spec.rarity))
            .ok_or_else(|| DomainError::overflow("experience"))?;
        let level = economy::level_for(experience)?;
        let total_harvests = player
            .total_harvests
            .checked_add(1)
            .ok_or_else(|| DomainError::overflow("total harvests"))?;
        let crop_harvests = player
            .harvests_by_crop
            .get(&kind)
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| DomainError::overflow("harvests by crop"))?;
        let mut items = player.inventory.clone();
        inventory::add_item(&mut items, ItemId::Crop(kind), 1)?;

        let player = &mut self.state.player;
        let first = player.achievements.is_empty();
        player.coins = coins;
        player.experience = experience;
        player.level = level;
        player.total_harvests = total_harvests;
        player.harvests_by_crop.insert(kind, crop_harvests);
        player.inventory = items;
        if first {
            player.achievements.push(UnlockedAchievement {
                kind: AchievementKind::FirstHarvest,
                unlocked_at: now,
            });
        }
        achievements::record_unlocks(player, now);

        let plot = self.plot_at_mut(slot)?;
        plot.crop = None;
        plot.is_watered = false;
        plot.is_fertilized = false;
        Ok(kind)
    }

    /// Buy `quantity` seeds of `kind` with coins.
    pub fn buy_seeds(&mut self, kind: CropKind, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_state("quantity must be at least 1"));
        }
        let player = &mut self.state.player;
        let cost = economy::seed_cost(kind, quantity)?;
        let coins = economy::debit(player.coins, cost)?;
        let mut items = player.inventory.clone();
        inventory::add_item(&mut items, ItemId::Seed(kind), quantity)?;
        player.coins = coins;
        player.inventory = items;
        Ok(())
    }

    /// Sell every harvested unit of `kind`. Returns the coins earned.
    pub fn sell_crop(&mut self, kind: CropKind, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let player = &mut self.state.player;
        let item = ItemId::Crop(kind);
        let held = inventory::quantity(&player.inventory, item);
        if held == 0 {
            return Err(DomainError::InsufficientResource {
                resource: item.to_string(),
                required: 1,
                available: 0,
            });
        }
        let earned = economy::sale_value(kind, held)?;
        let coins = economy::credit(player.coins, earned)?;
        inventory::remove_all(&mut player.inventory, item)?;
        player.coins = coins;
        achievements::record_unlocks(player, now);
        Ok(earned)
    }

    /// Start over with a new farm and player. Unlocked achievements are kept.
    pub fn reset(&mut self, profile: PlayerProfile, now: DateTime<Utc>) {
        let kept = std::mem::take(&mut self.state.player.achievements);
        self.state = fresh_state(&self.settings, profile, now);
        self.state.player.achievements = kept;
    }

    /// Replace the display profile.
    pub fn update_profile(&mut self, profile: PlayerProfile) {
        self.state.player.profile = profile;
    }

    /// Counts of planted, ready and watered plots.
    pub fn farm_status(&self) -> FarmStatus {
        let mut status = FarmStatus::default();
        for plot in &self.state.farm {
            if let Some(crop) = &plot.crop {
                status.planted = status.planted.saturating_add(1);
                if growth::crop_is_ready(crop) {
                    status.ready = status.ready.saturating_add(1);
                }
            }
            if plot.is_watered {
                status.watered = status.watered.saturating_add(1);
            }
        }
        status
    }

    /// Engine-independent view of the farm.
    pub fn view(&self) -> FarmView {
        let player = &self.state.player;
        FarmView {
            engine: EngineKind::Local,
            player: PlayerView {
                coins: player.coins,
                experience: player.experience,
                level: u64::from(player.level),
                total_harvests: player.total_harvests,
                total_planted: player.total_planted,
            },
            plots: self
                .state
                .farm
                .iter()
                .zip(0_u32..)
                .map(|(plot, index)| plot_view(index, plot))
                .collect(),
            inventory: inventory::describe(&player.inventory),
            achievements: achievements::evaluate(
                &PlayerCounters::of_player(player),
                &player.achievements,
            ),
            pending: None,
            updated_at: self.state.current_time,
        }
    }

    // -----------------------------------------------------------------------
    // Plot lookup
    // -----------------------------------------------------------------------

    fn slot(&self, index: u32) -> Result<usize, DomainError> {
        usize::try_from(index)
            .ok()
            .filter(|slot| *slot < self.state.farm.len())
            .ok_or_else(|| DomainError::invalid_state(format!("plot {index} does not exist")))
    }

    fn plot_at(&self, slot: usize) -> Result<&Plot, DomainError> {
        self.state
            .farm
            .get(slot)
            .ok_or_else(|| DomainError::invalid_state(format!("plot {slot} does not exist")))
    }

    fn plot_at_mut(&mut self, slot: usize) -> Result<&mut Plot, DomainError> {
        self.state
            .farm
            .get_mut(slot)
            .ok_or_else(|| DomainError::invalid_state(format!("plot {slot} does not exist")))
    }
}

fn fresh_state(settings: &LocalSettings, profile: PlayerProfile, now: DateTime<Utc>) -> GameState {
    let farm = (0..settings.grid_height)
        .flat_map(|y| (0..settings.grid_width).map(move |x| Plot::empty(PlotPosition { x, y })))
        .collect();
    GameState {
        player: Player {
            id: PlayerId::new(),
            profile,
            coins: settings.starting_coins,
            experience: 0,
            level: 1,
            inventory: settings.starting_items.clone(),
            last_watered: None,
            last_fertilized: None,
            achievements: Vec::new(),
            total_harvests: 0,
            total_planted: 0,
            harvests_by_crop: BTreeMap::new(),
        },
        farm,
        current_time: now,
        weather: Weather::default(),
        season: Season::default(),
        day: 1,
    }
}

fn plot_view(index: u32, plot: &Plot) -> PlotView {
    let crop = plot.crop.as_ref();
    let (progress, stage) = crop.map_or((Decimal::ZERO, None), |c| {
        let growth_time = catalog::crop(c.kind).growth_time;
        (
            growth::progress_percent(c.growth, growth_time),
            Some(growth::stage(c.growth, growth_time)),
        )
    });
    PlotView {
        index,
        state: growth::plot_state(crop),
        crop: crop.map(|c| c.kind),
        progress,
        stage,
        is_watered: plot.is_watered,
        is_fertilized: plot.is_fertilized,
        is_ready: crop.is_some_and(growth::crop_is_ready),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use farmstead_types::PlotState;

    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    fn farm() -> LocalFarm {
        LocalFarm::new_game(LocalSettings::default(), PlayerProfile::default(), start())
    }

    fn rich_farm() -> LocalFarm {
        let settings = LocalSettings {
            starting_coins: 1_000,
            ..LocalSettings::default()
        };
        LocalFarm::new_game(settings, PlayerProfile::default(), start())
    }

    fn minutes(n: i64) -> DateTime<Utc> {
        start() + TimeDelta::minutes(n)
    }

    #[test]
    fn new_game_has_a_full_grid() {
        let farm = farm();
        assert_eq!(farm.state().farm.len(), 25);
        assert_eq!(farm.state().farm.get(7).unwrap().id, "2-1");
        assert_eq!(farm.player().coins, 100);
        assert_eq!(farm.player().quantity(ItemId::Seed(CropKind::Tomato)), 5);
    }

    #[test]
    fn tomato_lifecycle() {
        let mut farm = farm();
        farm.plant(0, CropKind::Tomato, start()).unwrap();
        assert_eq!(farm.player().quantity(ItemId::Seed(CropKind::Tomato)), 4);
        assert_eq!(farm.view().plot(0).unwrap().state, PlotState::Planted);

        farm.advance(minutes(10));
        assert_eq!(farm.view().plot(0).unwrap().state, PlotState::Growing);

        farm.advance(minutes(30));
        assert_eq!(farm.view().plot(0).unwrap().state, PlotState::Ready);

        assert_eq!(farm.harvest(0, minutes(30)).unwrap(), CropKind::Tomato);
        let view = farm.view();
        assert_eq!(view.player.coins, 125);
        assert_eq!(view.player.experience, 10);
        assert_eq!(view.player.total_harvests, 1);
        assert_eq!(view.plot(0).unwrap().state, PlotState::Empty);
        assert_eq!(view.quantity(ItemId::Crop(CropKind::Tomato)), 1);
        assert!(view.is_unlocked(AchievementKind::FirstHarvest));
    }

    #[test]
    fn planting_on_occupied_plot_is_invalid() {
        let mut farm = rich_farm();
        farm.plant(3, CropKind::Carrot, start()).unwrap();
        let before = farm.clone();
        let err = farm.plant(3, CropKind::Tomato, start()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert_eq!(farm, before);
    }

    #[test]
    fn planting_without_seeds_is_insufficient() {
        let mut farm = farm();
        let before = farm.clone();
        let err = farm.plant(0, CropKind::Wheat, start()).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientResource { .. }));
        assert_eq!(farm, before);
    }

    #[test]
    fn last_seed_leaves_a_zero_entry() {
        let mut farm = farm();
        for plot in 0..3 {
            farm.plant(plot, CropKind::Carrot, start()).unwrap();
        }
        assert_eq!(
            farm.player().inventory.get(&ItemId::Seed(CropKind::Carrot)),
            Some(&0)
        );
        assert!(farm.plant(3, CropKind::Carrot, start()).is_err());
    }

    #[test]
    fn harvesting_unready_crop_changes_nothing() {
        let mut farm = farm();
        farm.plant(0, CropKind::Tomato, start()).unwrap();
        farm.advance(minutes(29));
        let before = farm.clone();
        let err = farm.harvest(0, minutes(29)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState { .. }));
        assert_eq!(farm, before);
    }

    #[test]
    fn harvesting_empty_plot_is_invalid() {
        let mut farm = farm();
        assert!(matches!(
            farm.harvest(4, start()),
            Err(DomainError::InvalidState { .. })
        ));
        assert!(matches!(
            farm.water(4, start()),
            Err(DomainError::InvalidState { .. })
        ));
    }

    #[test]
    fn unknown_plot_is_invalid() {
        let mut farm = farm();
        assert!(matches!(
            farm.plant(25, CropKind::Tomato, start()),
            Err(DomainError::InvalidState { .. })
        ));
    }

    #[test]
    fn legendary_harvest_awards_fifty_experience() {
        let mut farm = rich_farm();
        farm.buy_seeds(CropKind::GoldenApple, 1).unwrap();
        farm.plant(0, CropKind::GoldenApple, start()).unwrap();
        farm.advance(minutes(300));
        farm.harvest(0, minutes(300)).unwrap();
        let player = farm.player();
        assert_eq!(player.experience, 50);
        assert_eq!(player.level, 1);
        assert_eq!(player.coins, 1_300);
        assert!(player.has_achievement(AchievementKind::GoldenHarvest));
    }

    #[test]
    fn buy_seeds_debits_exact_cost() {
        let mut farm = farm();
        farm.buy_seeds(CropKind::Carrot, 4).unwrap();
        assert_eq!(farm.player().coins, 80);
        assert_eq!(farm.player().quantity(ItemId::Seed(CropKind::Carrot)), 7);

        let before = farm.clone();
        let err = farm.buy_seeds(CropKind::Wheat, 5).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientResource { .. }));
        assert_eq!(farm, before);
    }

    #[test]
    fn watering_is_cosmetic() {
        let mut dry = farm();
        let mut wet = farm();
        dry.plant(0, CropKind::Tomato, start()).unwrap();
        wet.plant(0, CropKind::Tomato, start()).unwrap();
        wet.water(0, minutes(1)).unwrap();
        dry.advance(minutes(15));
        wet.advance(minutes(15));
        let dry_plot = dry.view().plot(0).unwrap().clone();
        let wet_plot = wet.view().plot(0).unwrap().clone();
        assert_eq!(dry_plot.progress, wet_plot.progress);
        assert!(wet_plot.is_watered);
        assert_eq!(wet.player().last_watered, Some(minutes(1)));
        assert_eq!(wet.farm_status().watered, 1);
    }

    #[test]
    fn growth_never_exceeds_duration_or_runs_backwards() {
        let mut farm = farm();
        farm.plant(0, CropKind::Carrot, start()).unwrap();
        farm.advance(minutes(500));
        farm.advance(minutes(100));
        let crop = farm.state().farm.first().unwrap().crop.clone().unwrap();
        assert_eq!(crop.growth, Decimal::from(20));
        assert_eq!(farm.state().current_time, minutes(500));
    }

    #[test]
    fn sell_crop_clears_the_entry() {
        let mut farm = farm();
        farm.plant(0, CropKind::Tomato, start()).unwrap();
        farm.plant(1, CropKind::Tomato, start()).unwrap();
        farm.advance(minutes(30));
        farm.harvest(0, minutes(30)).unwrap();
        farm.harvest(1, minutes(30)).unwrap();
        assert_eq!(farm.sell_crop(CropKind::Tomato, minutes(31)).unwrap(), 50);
        assert_eq!(farm.player().coins, 200);
        assert!(!farm.player().inventory.contains_key(&ItemId::Crop(CropKind::Tomato)));
        assert!(matches!(
            farm.sell_crop(CropKind::Tomato, minutes(31)),
            Err(DomainError::InsufficientResource { .. })
        ));
    }

    #[test]
    fn first_harvest_survives_reset() {
        let mut farm = farm();
        farm.plant(0, CropKind::Carrot, start()).unwrap();
        farm.advance(minutes(20));
        farm.harvest(0, minutes(20)).unwrap();
        farm.reset(PlayerProfile::default(), minutes(21));

        assert_eq!(farm.player().total_harvests, 0);
        assert_eq!(farm.player().coins, 100);
        let view = farm.view();
        assert!(view.is_unlocked(AchievementKind::FirstHarvest));
        assert!(!view.is_unlocked(AchievementKind::SpeedGrower));
    }

    #[test]
    fn farm_status_counts_plots() {
        let mut farm = farm();
        farm.plant(0, CropKind::Carrot, start()).unwrap();
        farm.plant(1, CropKind::Tomato, start()).unwrap();
        farm.advance(minutes(20));
        let status = farm.farm_status();
        assert_eq!(status.planted, 2);
        assert_eq!(status.ready, 1);
        assert_eq!(status.watered, 0);
    }

    #[test]
    fn update_profile_replaces_profile() {
        let mut farm = farm();
        let profile = PlayerProfile {
            username: "rosa".to_owned(),
            display_name: "Rosa".to_owned(),
            pfp_url: "https://example.com/rosa.png".to_owned(),
        };
        farm.update_profile(profile.clone());
        assert_eq!(farm.player().profile, profile);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut farm = farm();
        farm.plant(0, CropKind::Tomato, start()).unwrap();
        farm.water(0, minutes(2)).unwrap();
        farm.advance(minutes(7));
        let json = serde_json::to_string(farm.state()).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, farm.state());
    }
}
