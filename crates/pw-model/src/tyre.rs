//! Tyre degradation, grip, and suitability.
//!
//! All temperatures are tyre operating temperatures (°C), not track or air
//! temperatures.  Callers convert with
//! [`TrialWeather::tyre_temp`][crate::TrialWeather::tyre_temp].

use pw_core::TireCompound;

/// Grip lost per °C below the optimal window.
pub const COLD_GRIP_SLOPE: f64 = 0.01;
/// Grip lost per °C above the optimal window.  Overheating costs more.
pub const HOT_GRIP_SLOPE: f64 = 0.015;
/// Lowest grip a cold tyre can fall to.
pub const COLD_GRIP_FLOOR: f64 = 0.7;
/// Lowest grip an overheated tyre can fall to.
pub const HOT_GRIP_FLOOR: f64 = 0.6;

/// Performance threshold above which a compound counts as usable in a
/// condition.
pub const SUITABILITY_THRESHOLD: f64 = 0.5;

/// Dimensionless wear after `lap_on_compound` laps.
///
/// Linear in laps up to the cliff; past `cliff_lap` an extra
/// `rate × (lap − cliff) × cliff_factor` accrues on top.  The cliff term is
/// additive, so the curve is continuous at the boundary and its slope jumps
/// from `rate` to `rate × (1 + cliff_factor)`.
pub fn degradation(compound: &TireCompound, lap_on_compound: u32, track_factor: f64) -> f64 {
    let lap = lap_on_compound as f64;
    let base = compound.degradation_rate * lap * track_factor;

    if lap_on_compound > compound.cliff_lap {
        let laps_over_cliff = (lap_on_compound - compound.cliff_lap) as f64;
        base + compound.degradation_rate * laps_over_cliff * compound.cliff_factor * track_factor
    } else {
        base
    }
}

/// Grip at tyre temperature `temperature`.
///
/// `base_grip` inside `[optimal_temp_min, optimal_temp_max]`; outside, a
/// linear penalty (steeper when hot) clamped at [`COLD_GRIP_FLOOR`] /
/// [`HOT_GRIP_FLOOR`].
pub fn grip_multiplier(compound: &TireCompound, temperature: f64) -> f64 {
    if temperature < compound.optimal_temp_min {
        let penalty = (compound.optimal_temp_min - temperature) * COLD_GRIP_SLOPE;
        (compound.base_grip - penalty).max(COLD_GRIP_FLOOR)
    } else if temperature > compound.optimal_temp_max {
        let penalty = (temperature - compound.optimal_temp_max) * HOT_GRIP_SLOPE;
        (compound.base_grip - penalty).max(HOT_GRIP_FLOOR)
    } else {
        compound.base_grip
    }
}

/// Whether the compound may be fitted at `temperature` on a wet or dry track.
///
/// Used to prune the optimizer's compound choices; the race state machine
/// never calls it.
pub fn is_suitable(compound: &TireCompound, temperature: f64, is_wet: bool) -> bool {
    if is_wet && compound.wet_performance <= SUITABILITY_THRESHOLD {
        return false;
    }
    if !is_wet && compound.dry_performance <= SUITABILITY_THRESHOLD {
        return false;
    }
    (compound.working_range_min..=compound.working_range_max).contains(&temperature)
}

/// `true` for compounds that count toward the dry-race two-compound rule.
#[inline]
pub fn is_dry_capable(compound: &TireCompound) -> bool {
    compound.dry_performance > SUITABILITY_THRESHOLD
}
