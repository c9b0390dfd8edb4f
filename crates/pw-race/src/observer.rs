//! Race observer trait for tracing, collection, and tests.

use pw_model::TrialWeather;

use crate::{CautionEvent, LapRecord, PitStopRecord, RaceState, SimulationResult};

/// Callbacks invoked by [`RaceStateMachine::run`][crate::RaceStateMachine::run]
/// at key points in the lap loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — pit wall printer
///
/// ```rust,ignore
/// struct PitWall;
///
/// impl RaceObserver for PitWall {
///     fn on_pit_stop(&mut self, stop: &PitStopRecord) {
///         println!("lap {}: {} → {} ({:.1}s)", stop.lap, stop.from, stop.to, stop.cost_s);
///     }
/// }
/// ```
pub trait RaceObserver {
    /// Called once after the trial's weather is drawn, before lap 1.
    fn on_race_start(&mut self, _weather: &TrialWeather) {}

    /// Called at the start of each lap, after the cancellation check.
    fn on_lap_start(&mut self, _lap: u32, _state: &RaceState) {}

    /// Called when a safety car or VSC is deployed.
    fn on_caution(&mut self, _event: &CautionEvent) {}

    /// Called when a stop is taken, before the lap's time is computed.
    fn on_pit_stop(&mut self, _stop: &PitStopRecord) {}

    /// Called after each lap's time is committed.
    fn on_lap_end(&mut self, _lap: &LapRecord) {}

    /// Called once with the final result, whether completed or stopped early.
    fn on_race_end(&mut self, _result: &SimulationResult) {}
}

/// A [`RaceObserver`] that does nothing.
pub struct NoopObserver;

impl RaceObserver for NoopObserver {}
