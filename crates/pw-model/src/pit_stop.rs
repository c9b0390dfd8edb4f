//! Pit-stop time cost.
//!
//! The state effect of a stop (new compound, tyre age back to zero, fuel
//! untouched) is applied by the race state machine; this module only prices
//! the stop.

use pw_core::{SimConstants, TrialRng};

/// Time lost to one stop, split into its parts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitStopCost {
    /// Pit-lane transit loss, seconds.
    pub lane_s:    f64,
    /// Stationary service time, seconds.
    pub service_s: f64,
}

impl PitStopCost {
    #[inline]
    pub fn total(&self) -> f64 {
        self.lane_s + self.service_s
    }
}

/// `PIT_LOSS_BASE + uniform(PIT_STOP_TIME_MIN, PIT_STOP_TIME_MAX)`.
///
/// Draws one value from `rng` unless the service window is degenerate.
pub fn pit_stop_cost(constants: &SimConstants, rng: &mut TrialRng) -> PitStopCost {
    PitStopCost {
        lane_s:    constants.pit_loss_base,
        service_s: rng.uniform(constants.pit_stop_time_min, constants.pit_stop_time_max),
    }
}
