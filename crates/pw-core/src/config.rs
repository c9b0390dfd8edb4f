//! Model constants and engine configuration.
//!
//! # Design
//!
//! There is no global settings object.  A [`SimConstants`] value travels
//! inside every race plan, and an [`EngineConfig`] is handed to the
//! evaluator and scheduler at construction.  Both are plain data with a
//! `Default` matching the reference values, so applications typically load
//! one from JSON (with the `serde` feature) or tweak fields in code.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::{CoreError, CoreResult};

// ── SimConstants ──────────────────────────────────────────────────────────────

/// Every constant used by the lap-time, pit-stop and caution models.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConstants {
    /// Seconds added per kilogram of fuel on board.
    pub fuel_effect_per_kg:       f64,
    /// Kilograms burned per lap.
    pub fuel_consumption_per_lap: f64,
    /// Fuel on board at the start, kilograms.
    pub initial_fuel_load:        f64,

    /// Stationary service time bounds, seconds.
    pub pit_stop_time_min:        f64,
    pub pit_stop_time_max:        f64,
    /// Pit-lane transit loss added to every stop, seconds.
    pub pit_loss_base:            f64,

    /// Half-width of the uniform lap-time perturbation, as a fraction of the
    /// circuit's base lap time.  The reference settings carry 0.2 as an
    /// absolute number of seconds; 0.002 × a 90 s lap is roughly the same
    /// spread and scales with the circuit.
    pub lap_time_variation:       f64,

    /// Track temperature at which the car is neither helped nor hurt, °C.
    pub temp_optimal:             f64,
    /// Seconds per °C of distance from `temp_optimal`.
    pub temp_impact_factor:       f64,
    /// Tyre operating temperature = track temperature + this offset, °C.
    pub tyre_temp_offset:         f64,
    /// Half-width of the per-trial track temperature draw, °C.
    pub temp_spread:              f64,
    /// Track temperature drop on a trial that draws rain, °C.
    pub rain_cooling:             f64,

    /// Safety-car deployment probability.  Per green lap, or per race
    /// under [`CautionModel::PerRace`].
    pub safety_car_probability:   f64,
    /// VSC deployment probability, read the same way.
    pub vsc_probability:          f64,
    /// How the two probabilities above are read.
    pub caution_model:            CautionModel,
    /// Lap-time multiplier under the safety car.
    pub safety_car_factor:        f64,
    /// Lap-time multiplier under the VSC.  Smaller than `safety_car_factor`.
    pub vsc_factor:               f64,
    pub safety_car_laps_min:      u32,
    pub safety_car_laps_max:      u32,
    pub vsc_laps_min:             u32,
    pub vsc_laps_max:             u32,

    /// Seconds gained per lap with DRS available.
    pub drs_advantage:            f64,
    /// Fractional lap-time change per unit of grip below 1.0.
    pub grip_time_sensitivity:    f64,
    /// Seconds added per unit of tyre wear.
    pub degradation_time_scale:   f64,
}

impl Default for SimConstants {
    fn default() -> Self {
        Self {
            fuel_effect_per_kg:       0.03,
            fuel_consumption_per_lap: 1.6,
            initial_fuel_load:        110.0,
            pit_stop_time_min:        2.0,
            pit_stop_time_max:        3.5,
            pit_loss_base:            20.0,
            lap_time_variation:       0.002,
            temp_optimal:             25.0,
            temp_impact_factor:       0.002,
            tyre_temp_offset:         70.0,
            temp_spread:              3.0,
            rain_cooling:             6.0,
            safety_car_probability:   0.15,
            vsc_probability:          0.25,
            caution_model:            CautionModel::PerLap,
            safety_car_factor:        1.40,
            vsc_factor:               1.20,
            safety_car_laps_min:      3,
            safety_car_laps_max:      5,
            vsc_laps_min:             1,
            vsc_laps_max:             3,
            drs_advantage:            0.3,
            grip_time_sensitivity:    0.1,
            degradation_time_scale:   1.0,
        }
    }
}

impl SimConstants {
    /// Constants with both caution probabilities forced to zero.
    pub fn without_cautions() -> Self {
        Self { safety_car_probability: 0.0, vsc_probability: 0.0, ..Self::default() }
    }

    /// Per-lap safety-car activation probability for a race of `total_laps`.
    #[inline]
    pub fn safety_car_hazard(&self, total_laps: u32) -> f64 {
        self.caution_model.hazard(self.safety_car_probability, total_laps)
    }

    /// Per-lap VSC activation probability for a race of `total_laps`.
    #[inline]
    pub fn vsc_hazard(&self, total_laps: u32) -> f64 {
        self.caution_model.hazard(self.vsc_probability, total_laps)
    }

    pub fn safety_car_laps(&self) -> RangeInclusive<u32> {
        self.safety_car_laps_min..=self.safety_car_laps_max
    }

    pub fn vsc_laps(&self) -> RangeInclusive<u32> {
        self.vsc_laps_min..=self.vsc_laps_max
    }

    /// Reject constants that would make the models meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        let non_negative = [
            ("fuel_effect_per_kg", self.fuel_effect_per_kg),
            ("fuel_consumption_per_lap", self.fuel_consumption_per_lap),
            ("initial_fuel_load", self.initial_fuel_load),
            ("pit_stop_time_min", self.pit_stop_time_min),
            ("pit_loss_base", self.pit_loss_base),
            ("lap_time_variation", self.lap_time_variation),
            ("temp_impact_factor", self.temp_impact_factor),
            ("temp_spread", self.temp_spread),
            ("rain_cooling", self.rain_cooling),
            ("drs_advantage", self.drs_advantage),
            ("grip_time_sensitivity", self.grip_time_sensitivity),
            ("degradation_time_scale", self.degradation_time_scale),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(CoreError::Config(format!("{field} must be finite and non-negative, got {value}")));
            }
        }
        for (field, value) in [
            ("pit_stop_time_max", self.pit_stop_time_max),
            ("temp_optimal", self.temp_optimal),
            ("tyre_temp_offset", self.tyre_temp_offset),
            ("safety_car_factor", self.safety_car_factor),
            ("vsc_factor", self.vsc_factor),
        ] {
            if !value.is_finite() {
                return Err(CoreError::Config(format!("{field} must be finite, got {value}")));
            }
        }
        if self.pit_stop_time_max < self.pit_stop_time_min {
            return Err(CoreError::Config("pit_stop_time_max is below pit_stop_time_min".into()));
        }
        for (field, p) in [
            ("safety_car_probability", self.safety_car_probability),
            ("vsc_probability", self.vsc_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::Config(format!("{field} must lie in [0, 1], got {p}")));
            }
        }
        if !(self.vsc_factor >= 1.0 && self.safety_car_factor >= self.vsc_factor) {
            return Err(CoreError::Config(format!(
                "caution factors must satisfy 1 <= vsc ({}) <= safety car ({})",
                self.vsc_factor, self.safety_car_factor
            )));
        }
        if self.safety_car_laps_min == 0 || self.safety_car_laps_max < self.safety_car_laps_min {
            return Err(CoreError::Config("safety car duration range is empty".into()));
        }
        if self.vsc_laps_min == 0 || self.vsc_laps_max < self.vsc_laps_min {
            return Err(CoreError::Config("VSC duration range is empty".into()));
        }
        Ok(())
    }
}

/// Meaning of the caution probabilities in [`SimConstants`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CautionModel {
    /// Rolled as-is on every lap without an active caution.
    #[default]
    PerLap,
    /// Chance of at least one deployment over the race; spread into an
    /// equivalent per-lap hazard with [`per_lap_hazard`].
    PerRace,
}

impl CautionModel {
    /// Per-lap roll probability for `probability` over `total_laps`.
    pub fn hazard(self, probability: f64, total_laps: u32) -> f64 {
        match self {
            CautionModel::PerLap => probability.clamp(0.0, 1.0),
            CautionModel::PerRace => per_lap_hazard(probability, total_laps),
        }
    }
}

/// Convert a per-race probability into an equivalent per-lap hazard:
/// `1 − (1 − p)^(1/laps)`, so that the chance of at least one activation over
/// the whole race is `p`.
pub fn per_lap_hazard(per_race: f64, total_laps: u32) -> f64 {
    if per_race <= 0.0 || total_laps == 0 {
        return 0.0;
    }
    if per_race >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - per_race).powf(1.0 / total_laps as f64)
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
///
/// Typically loaded from a JSON file by the hosting application and passed to
/// the scheduler, which forwards the relevant parts to each job.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Master seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Trials per strategy evaluation.
    pub trials: u32,

    /// Jobs allowed to run at once; further jobs queue in arrival order.
    pub max_concurrent_simulations: usize,

    /// Wall-clock budget per job, measured from the moment it starts running.
    pub simulation_timeout_secs: u64,

    /// Maximum number of queued (not yet running) jobs.  `None` = unbounded.
    pub queue_limit: Option<usize>,

    /// Ranked strategies returned by an optimization.
    pub top_n: usize,

    /// Upper bound on pit stops accepted in a strategy (0–3).
    pub max_stops: u32,

    /// Enforce the dry-race two-compound rule.
    pub enforce_dual_compound: bool,

    /// Reject strategies using compounds unsuitable for the race conditions.
    pub enforce_suitability: bool,

    /// Model constants.
    pub constants: SimConstants,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed:                       42,
            trials:                     5,
            max_concurrent_simulations: 10,
            simulation_timeout_secs:    300,
            queue_limit:                None,
            top_n:                      10,
            max_stops:                  3,
            enforce_dual_compound:      true,
            enforce_suitability:        false,
            constants:                  SimConstants::default(),
        }
    }
}

impl EngineConfig {
    /// Largest stop count the search and validation layers understand.
    pub const MAX_SUPPORTED_STOPS: u32 = 3;

    #[inline]
    pub fn simulation_timeout(&self) -> Duration {
        Duration::from_secs(self.simulation_timeout_secs)
    }

    /// Check every field; the first problem found is reported.
    pub fn validate(&self) -> CoreResult<()> {
        if self.trials == 0 {
            return Err(CoreError::Config("trials must be at least 1".into()));
        }
        if self.max_concurrent_simulations == 0 {
            return Err(CoreError::Config("max_concurrent_simulations must be at least 1".into()));
        }
        if self.simulation_timeout_secs == 0 {
            return Err(CoreError::Config("simulation_timeout_secs must be positive".into()));
        }
        if self.queue_limit == Some(0) {
            return Err(CoreError::Config("queue_limit must be positive when set".into()));
        }
        if self.top_n == 0 {
            return Err(CoreError::Config("top_n must be at least 1".into()));
        }
        if self.max_stops > Self::MAX_SUPPORTED_STOPS {
            return Err(CoreError::Config(format!(
                "max_stops {} exceeds the supported maximum of {}",
                self.max_stops,
                Self::MAX_SUPPORTED_STOPS
            )));
        }
        self.constants.validate()
    }
}
