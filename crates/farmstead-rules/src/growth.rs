//! Crop growth: time accrual, readiness and display stages.
//!
//! Growth is measured in minutes as a [`Decimal`] so partial minutes from
//! short tick intervals accumulate without drift. Accumulated growth never
//! decreases and never exceeds the crop's growth time. Watering has no
//! effect on growth.

use chrono::{DateTime, Utc};
use farmstead_types::{Crop, PlotState};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog;

/// Milliseconds per minute.
const MS_PER_MINUTE: i64 = 60_000;

/// Minutes elapsed between two instants. Never negative.
pub fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    let ms = to.signed_duration_since(from).num_milliseconds();
    if ms <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(ms)
        .checked_div(Decimal::from(MS_PER_MINUTE))
        .unwrap_or(Decimal::ZERO)
}

/// New accumulated growth after `elapsed` minutes: `min(duration, growth + elapsed)`.
pub fn accrue(growth: Decimal, growth_time: u32, elapsed: Decimal) -> Decimal {
    let duration = Decimal::from(growth_time);
    if elapsed <= Decimal::ZERO || growth >= duration {
        return growth.min(duration);
    }
    growth
        .checked_add(elapsed)
        .map_or(duration, |total| total.min(duration))
}

/// Whether accumulated growth has reached the growth time.
pub fn is_ready(growth: Decimal, growth_time: u32) -> bool {
    growth >= Decimal::from(growth_time)
}

/// Advance a crop by `elapsed` minutes. No-op on harvested crops.
pub fn advance_crop(crop: &mut Crop, elapsed: Decimal) {
    if crop.is_harvested {
        return;
    }
    crop.growth = accrue(crop.growth, catalog::crop(crop.kind).growth_time, elapsed);
}

/// Whether a planted crop can be harvested now.
pub fn crop_is_ready(crop: &Crop) -> bool {
    !crop.is_harvested && is_ready(crop.growth, catalog::crop(crop.kind).growth_time)
}

/// Lifecycle state of a local plot given its crop.
pub fn plot_state(crop: Option<&Crop>) -> PlotState {
    match crop {
        None => PlotState::Empty,
        Some(c) if c.is_harvested => PlotState::Empty,
        Some(c) if crop_is_ready(c) => PlotState::Ready,
        Some(c) if c.growth.is_zero() => PlotState::Planted,
        Some(_) => PlotState::Growing,
    }
}

/// Growth completion as a percentage in `0..=100`.
pub fn progress_percent(growth: Decimal, growth_time: u32) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if growth_time == 0 {
        return hundred;
    }
    growth
        .checked_mul(hundred)
        .and_then(|scaled| scaled.checked_div(Decimal::from(growth_time)))
        .map_or(hundred, |pct| pct.clamp(Decimal::ZERO, hundred))
}

/// Display stage of a growing crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthStage {
    /// Under 25 %.
    Seedling,
    /// Under 50 %.
    Sprout,
    /// Under 75 %.
    Maturing,
    /// Under 100 %.
    NearlyReady,
    /// Fully grown.
    Ready,
}

/// Display stage for the given growth.
pub fn stage(growth: Decimal, growth_time: u32) -> GrowthStage {
    let pct = progress_percent(growth, growth_time);
    if pct < Decimal::from(25) {
        GrowthStage::Seedling
    } else if pct < Decimal::from(50) {
        GrowthStage::Sprout
    } else if pct < Decimal::from(75) {
        GrowthStage::Maturing
    } else if pct < Decimal::ONE_HUNDRED {
        GrowthStage::NearlyReady
    } else {
        GrowthStage::Ready
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use farmstead_types::{CropId, CropKind};
    use rust_decimal_macros::dec;

    use super::*;

    fn tomato(growth: Decimal) -> Crop {
        Crop {
            id: CropId::new(),
            kind: CropKind::Tomato,
            growth,
            planted_at: DateTime::<Utc>::default(),
            is_watered: false,
            is_harvested: false,
        }
    }

    #[test]
    fn elapsed_minutes_from_millis() {
        let start = DateTime::<Utc>::default();
        let later = start + TimeDelta::seconds(90);
        assert_eq!(elapsed_minutes(start, later), dec!(1.5));
        assert_eq!(elapsed_minutes(later, start), Decimal::ZERO);
    }

    #[test]
    fn growth_is_clamped_and_monotonic() {
        let mut growth = Decimal::ZERO;
        for step in [dec!(0.1), dec!(12), dec!(0), dec!(40), dec!(3)] {
            let next = accrue(growth, 30, step);
            assert!(next >= growth);
            assert!(next <= dec!(30));
            growth = next;
        }
        assert_eq!(growth, dec!(30));
        assert!(is_ready(growth, 30));
    }

    #[test]
    fn harvested_crop_does_not_grow() {
        let mut crop = tomato(dec!(5));
        crop.is_harvested = true;
        advance_crop(&mut crop, dec!(10));
        assert_eq!(crop.growth, dec!(5));
    }

    #[test]
    fn plot_state_follows_growth() {
        assert_eq!(plot_state(None), PlotState::Empty);
        assert_eq!(plot_state(Some(&tomato(dec!(0)))), PlotState::Planted);
        assert_eq!(plot_state(Some(&tomato(dec!(12.5)))), PlotState::Growing);
        assert_eq!(plot_state(Some(&tomato(dec!(30)))), PlotState::Ready);
    }

    #[test]
    fn stages_by_percentage() {
        assert_eq!(stage(dec!(0), 100), GrowthStage::Seedling);
        assert_eq!(stage(dec!(25), 100), GrowthStage::Sprout);
        assert_eq!(stage(dec!(60), 100), GrowthStage::Maturing);
        assert_eq!(stage(dec!(99.9), 100), GrowthStage::NearlyReady);
        assert_eq!(stage(dec!(100), 100), GrowthStage::Ready);
        assert_eq!(progress_percent(dec!(15), 30), dec!(50));
    }
}
