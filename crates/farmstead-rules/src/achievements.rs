//! Achievement evaluation.
//!
//! Achievements are a pure function of player counters, with one twist:
//! once an achievement is in a player's persisted unlocked list it stays
//! unlocked forever, even if the counters later drop (for example after a
//! farm reset). The persisted list is ground truth for unlocked entries;
//! the counters only decide locked entries and progress towards them.

use chrono::{DateTime, Utc};
use farmstead_types::{
    AchievementCounter, AchievementKind, Player, PlayerRecord, Rarity, UnlockedAchievement,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{self, ACHIEVEMENTS};

/// Snapshot of every counter an achievement can read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCounters {
    /// Successful harvests.
    pub total_harvests: u64,
    /// Coin balance.
    pub coins: u64,
    /// Crops planted.
    pub total_planted: u64,
    /// Current level.
    pub level: u64,
    /// Legendary crops harvested.
    pub legendary_harvests: u64,
    /// Distinct crop kinds harvested at least once.
    pub distinct_crops: u64,
}

impl PlayerCounters {
    /// Counters of a local player.
    pub fn of_player(player: &Player) -> Self {
        let legendary_harvests = player
            .harvests_by_crop
            .iter()
            .filter(|(kind, _)| catalog::crop(**kind).rarity == Rarity::Legendary)
            .fold(0_u64, |acc, (_, n)| acc.saturating_add(*n));
        let distinct_crops = player
            .harvests_by_crop
            .values()
            .filter(|n| **n > 0)
            .fold(0_u64, |acc, _| acc.saturating_add(1));

        Self {
            total_harvests: player.total_harvests,
            coins: player.coins,
            total_planted: player.total_planted,
            level: u64::from(player.level),
            legendary_harvests,
            distinct_crops,
        }
    }

    /// Counters of a remote ledger player. The ledger does not track
    /// per-crop harvests, so those counters read zero.
    pub const fn of_record(record: &PlayerRecord) -> Self {
        Self {
            total_harvests: record.total_harvests,
            coins: record.coins,
            total_planted: record.total_planted,
            level: record.level,
            legendary_harvests: 0,
            distinct_crops: 0,
        }
    }

    /// Current value of one counter.
    pub const fn get(&self, counter: AchievementCounter) -> u64 {
        match counter {
            AchievementCounter::TotalHarvests => self.total_harvests,
            AchievementCounter::Coins => self.coins,
            AchievementCounter::TotalPlanted => self.total_planted,
            AchievementCounter::Level => self.level,
            AchievementCounter::LegendaryHarvests => self.legendary_harvests,
            AchievementCounter::DistinctCrops => self.distinct_crops,
        }
    }
}

/// Evaluated status of one catalog achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    /// Achievement id.
    pub kind: AchievementKind,
    /// Display name.
    pub name: String,
    /// What the player has to do.
    pub description: String,
    /// Display glyph.
    pub glyph: String,
    /// Threshold to reach.
    pub requirement: u64,
    /// Current counter value.
    pub current: u64,
    /// Whether the achievement is unlocked.
    pub unlocked: bool,
    /// When it was unlocked, if it is in the persisted list.
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Progress towards the requirement as a percentage in `0..=100`.
    pub progress: Decimal,
}

fn progress(current: u64, requirement: u64) -> Decimal {
    if requirement == 0 || current >= requirement {
        return Decimal::ONE_HUNDRED;
    }
    Decimal::from(current)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(Decimal::from(requirement)))
        .map_or(Decimal::ZERO, |pct| pct.round_dp(1))
}

/// Evaluate the whole catalog against counters and the persisted list.
pub fn evaluate(
    counters: &PlayerCounters,
    unlocked: &[UnlockedAchievement],
) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|spec| {
            let current = counters.get(spec.counter);
            let persisted = unlocked.iter().find(|u| u.kind == spec.kind);
            let met = current >= spec.requirement;
            AchievementStatus {
                kind: spec.kind,
                name: spec.name.to_owned(),
                description: spec.description.to_owned(),
                glyph: spec.glyph.to_owned(),
                requirement: spec.requirement,
                current,
                unlocked: persisted.is_some() || met,
                unlocked_at: persisted.map(|u| u.unlocked_at),
                progress: if persisted.is_some() {
                    Decimal::ONE_HUNDRED
                } else {
                    progress(current, spec.requirement)
                },
            }
        })
        .collect()
}

/// Catalog achievements whose requirement is met but which are not yet in
/// the persisted list.
pub fn newly_unlocked(
    counters: &PlayerCounters,
    unlocked: &[UnlockedAchievement],
) -> Vec<AchievementKind> {
    ACHIEVEMENTS
        .iter()
        .filter(|spec| counters.get(spec.counter) >= spec.requirement)
        .filter(|spec| !unlocked.iter().any(|u| u.kind == spec.kind))
        .map(|spec| spec.kind)
        .collect()
}

/// Append newly met achievements to the player's persisted list.
///
/// Returns the kinds that were appended. Existing entries are never removed.
pub fn record_unlocks(player: &mut Player, now: DateTime<Utc>) -> Vec<AchievementKind> {
    let counters = PlayerCounters::of_player(player);
    let fresh = newly_unlocked(&counters, &player.achievements);
    player
        .achievements
        .extend(fresh.iter().map(|kind| UnlockedAchievement {
            kind: *kind,
            unlocked_at: now,
        }));
    fresh
}
