//! One lap's time from tyre, fuel, temperature, DRS, caution and noise.

use pw_core::{Circuit, SimConstants, TireCompound, TrialRng};

use crate::error::finite;
use crate::{ModelResult, degradation, grip_multiplier};

/// Neutralisation in force for a lap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Caution {
    /// Green flag racing.
    #[default]
    None,
    /// Virtual safety car: delta-time restriction, no bunching.
    Vsc,
    /// Full safety car.
    SafetyCar,
}

impl Caution {
    /// Build from the two state flags.  The safety car wins if both are set.
    #[inline]
    pub fn from_flags(safety_car: bool, vsc: bool) -> Self {
        if safety_car {
            Caution::SafetyCar
        } else if vsc {
            Caution::Vsc
        } else {
            Caution::None
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        !matches!(self, Caution::None)
    }

    /// Multiplier applied to the whole lap.
    #[inline]
    pub fn factor(self, constants: &SimConstants) -> f64 {
        match self {
            Caution::None      => 1.0,
            Caution::Vsc       => constants.vsc_factor,
            Caution::SafetyCar => constants.safety_car_factor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Caution::None      => "green",
            Caution::Vsc       => "vsc",
            Caution::SafetyCar => "safety_car",
        }
    }
}

impl std::fmt::Display for Caution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything about the car and track that one lap's time depends on.
#[derive(Clone, Debug)]
pub struct LapInputs<'a> {
    pub circuit:       &'a Circuit,
    pub compound:      &'a TireCompound,
    /// Laps completed on this set (0 on a fresh set).
    pub tire_age_laps: u32,
    pub fuel_load_kg:  f64,
    /// Track temperature for the trial, °C.
    pub track_temp:    f64,
    pub caution:       Caution,
    /// Set on the warm-up laps that follow a pit stop.
    pub warming_up:    bool,
}

/// Every term of a lap time, kept for diagnostics and tests.
///
/// `total = (base + grip_delta + degradation + fuel + temperature − drs
///          + warm_up + variation) × caution_factor`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LapTimeBreakdown {
    pub base:            f64,
    pub grip:            f64,
    pub grip_delta:      f64,
    pub wear:            f64,
    pub degradation:     f64,
    pub fuel:            f64,
    pub temperature:     f64,
    pub drs:             f64,
    pub warm_up:         f64,
    pub variation:       f64,
    pub caution_factor:  f64,
    pub total:           f64,
}

impl LapTimeBreakdown {
    /// Sum of the additive terms, before the caution multiplier.
    #[inline]
    pub fn additive(&self) -> f64 {
        self.base + self.grip_delta + self.degradation + self.fuel + self.temperature - self.drs
            + self.warm_up
            + self.variation
    }
}

/// Compute one lap.
///
/// Draws exactly one value from `rng` (the lap variation) when the variation
/// amplitude is non-zero.  Fails if grip, wear, or the final time is not
/// finite.
pub fn lap_time(
    inputs:    &LapInputs<'_>,
    constants: &SimConstants,
    rng:       &mut TrialRng,
) -> ModelResult<LapTimeBreakdown> {
    let circuit = inputs.circuit;
    let base = circuit.base_lap_time;

    let tyre_temp = inputs.track_temp + constants.tyre_temp_offset;
    let grip = finite("grip multiplier", grip_multiplier(inputs.compound, tyre_temp))?;
    let grip_delta = base * constants.grip_time_sensitivity * (1.0 - grip);

    let wear = finite(
        "tyre degradation",
        degradation(inputs.compound, inputs.tire_age_laps, circuit.tire_wear_factor),
    )?;
    let degradation_s = wear * constants.degradation_time_scale;

    let fuel = constants.fuel_effect_per_kg * inputs.fuel_load_kg;
    let temperature = constants.temp_impact_factor * (inputs.track_temp - constants.temp_optimal).abs();

    let drs = if circuit.drs_zones > 0 && !inputs.caution.is_active() {
        constants.drs_advantage
    } else {
        0.0
    };
    let warm_up = if inputs.warming_up { inputs.compound.warm_up_penalty } else { 0.0 };

    let amplitude = constants.lap_time_variation * base;
    let variation = rng.uniform(-amplitude, amplitude);

    let mut breakdown = LapTimeBreakdown {
        base,
        grip,
        grip_delta,
        wear,
        degradation: degradation_s,
        fuel,
        temperature,
        drs,
        warm_up,
        variation,
        caution_factor: inputs.caution.factor(constants),
        total: 0.0,
    };
    breakdown.total = finite("lap time", breakdown.additive() * breakdown.caution_factor)?;
    Ok(breakdown)
}
