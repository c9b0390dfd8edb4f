//! Per-trial track conditions.
//!
//! Temperature is drawn once when a trial starts and held for the whole
//! race.  A trial first rolls for rain with the circuit's
//! `rain_probability`; the temperature is then `typical_temp` plus a uniform
//! spread that widens with rain likelihood, minus a cooling offset if the
//! trial drew rain.  Rain affects temperature only; the wet/dry race
//! condition is a property of the request, not of the trial.

use pw_core::{Circuit, SimConstants, TrialRng};

/// Conditions fixed for one trial.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialWeather {
    /// Track temperature, °C.
    pub track_temp: f64,
    /// Whether this trial drew a rain shower.
    pub rain:       bool,
}

impl TrialWeather {
    /// Conditions equal to the circuit's typical day, no draw involved.
    pub fn typical(circuit: &Circuit) -> Self {
        TrialWeather { track_temp: circuit.typical_temp, rain: false }
    }

    /// Tyre operating temperature implied by this track temperature.
    #[inline]
    pub fn tyre_temp(&self, constants: &SimConstants) -> f64 {
        self.track_temp + constants.tyre_temp_offset
    }
}

/// Draw the conditions for one trial.  Consumes two values from `rng`
/// (fewer if the spread is zero).
pub fn draw_weather(circuit: &Circuit, constants: &SimConstants, rng: &mut TrialRng) -> TrialWeather {
    let rain = rng.gen_bool(circuit.rain_probability);
    let spread = constants.temp_spread * (1.0 + circuit.rain_probability);
    let mut track_temp = circuit.typical_temp + rng.uniform(-spread, spread);
    if rain {
        track_temp -= constants.rain_cooling;
    }
    TrialWeather { track_temp, rain }
}
