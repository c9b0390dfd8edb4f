//! Records produced by one trial.

use pw_core::StrategyId;
use pw_model::{Caution, TrialWeather};

use crate::StopReason;

/// One lap as it was run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LapRecord {
    pub lap:               u32,
    pub lap_time_s:        f64,
    pub compound:          String,
    /// Tyre age and fuel as they were when the lap started.
    pub tire_age_laps:     u32,
    pub fuel_load_kg:      f64,
    pub caution:           Caution,
    /// A stop was taken on this lap.
    pub pit:               bool,
    /// Race time at the end of this lap, stop cost included.
    pub cumulative_time_s: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitStopRecord {
    pub lap:    u32,
    pub cost_s: f64,
    pub from:   String,
    pub to:     String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CautionEvent {
    pub kind:      Caution,
    pub start_lap: u32,
    /// Drawn duration.  May run past the flag if the race ends first.
    pub laps:      u32,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminalStatus {
    Completed,
    Cancelled,
    TimedOut,
}

impl From<StopReason> for TerminalStatus {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Cancelled => TerminalStatus::Cancelled,
            StopReason::TimedOut  => TerminalStatus::TimedOut,
        }
    }
}

/// Outcome of one trial of one strategy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    pub strategy_id:    StrategyId,
    pub strategy_label: String,
    /// Seed of the trial's generator.
    pub seed:           u64,
    pub trial:          u32,
    pub weather:        TrialWeather,
    /// Per-lap records; empty when lap recording is switched off.
    pub laps:           Vec<LapRecord>,
    pub laps_completed: u32,
    pub total_time_s:   f64,
    pub pit_stops:      Vec<PitStopRecord>,
    pub cautions:       Vec<CautionEvent>,
    pub status:         TerminalStatus,
}

impl SimulationResult {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.status == TerminalStatus::Completed
    }
}
