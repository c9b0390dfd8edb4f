//! The lap loop for one trial.

use pw_core::TrialRng;
use pw_model::{Caution, LapInputs, draw_weather, lap_time, pit_stop_cost};
use tracing::debug;

use crate::{
    CancelToken, CautionEvent, LapRecord, PitStopRecord, RaceError, RaceObserver, RacePlan,
    RaceResult, RaceState, SimulationResult, TerminalStatus,
};

/// Runs one seeded trial of a [`RacePlan`].
///
/// Owns its generator and its [`RaceState`]; borrows the plan read-only, so
/// any number of machines may run the same plan on different threads.
/// Every draw happens in a fixed order (weather, then per lap: caution
/// rolls, stop service time, lap variation), which makes a trial
/// bit-reproducible from its seed.
pub struct RaceStateMachine<'p> {
    plan:        &'p RacePlan,
    rng:         TrialRng,
    trial:       u32,
    record_laps: bool,
}

impl<'p> RaceStateMachine<'p> {
    /// Machine with an explicit generator; reported as trial 0.
    pub fn new(plan: &'p RacePlan, rng: TrialRng) -> Self {
        Self { plan, rng, trial: 0, record_laps: true }
    }

    /// Machine for trial `trial` of a run seeded with `run_seed`.
    pub fn for_trial(plan: &'p RacePlan, run_seed: u64, trial: u32) -> Self {
        Self { plan, rng: TrialRng::new(run_seed, trial), trial, record_laps: true }
    }

    /// Keep or drop per-lap records in the result.  Statistics-only callers
    /// switch them off to avoid the allocation.
    pub fn record_laps(mut self, record: bool) -> Self {
        self.record_laps = record;
        self
    }

    /// Run laps `1..=total_laps`, or until `cancel` says stop.
    ///
    /// A stopped run returns `Ok` with a `Cancelled`/`TimedOut` status and
    /// the laps completed so far.  A non-finite lap term fails the trial
    /// with [`RaceError::Numeric`].
    pub fn run<O: RaceObserver>(mut self, observer: &mut O, cancel: &CancelToken) -> RaceResult<SimulationResult> {
        let plan = self.plan;
        let constants = &plan.constants;
        let total_laps = plan.total_laps();

        let weather = draw_weather(&plan.circuit, constants, &mut self.rng);
        observer.on_race_start(&weather);

        let mut state = RaceState::initial(plan);
        let mut laps = Vec::with_capacity(if self.record_laps { total_laps as usize } else { 0 });
        let mut pit_stops = Vec::with_capacity(plan.stints.len() - 1);
        let mut cautions = Vec::new();
        let mut status = TerminalStatus::Completed;
        let mut laps_completed = 0;

        for lap in 1..=total_laps {
            // ── ⓪ Cooperative stop ────────────────────────────────────────
            if let Some(reason) = cancel.check() {
                status = reason.into();
                debug!(trial = self.trial, lap, ?reason, "trial stopped early");
                break;
            }
            state.current_lap = lap;
            observer.on_lap_start(lap, &state);

            // ── ① Caution rolls ───────────────────────────────────────────
            if !state.caution().is_active() {
                let deployed = if self.rng.gen_bool(plan.safety_car_hazard) {
                    let range = constants.safety_car_laps();
                    Some((Caution::SafetyCar, self.rng.uniform_u32(*range.start(), *range.end())))
                } else if self.rng.gen_bool(plan.vsc_hazard) {
                    let range = constants.vsc_laps();
                    Some((Caution::Vsc, self.rng.uniform_u32(*range.start(), *range.end())))
                } else {
                    None
                };
                if let Some((kind, span)) = deployed {
                    state.start_caution(kind, span);
                    let event = CautionEvent { kind, start_lap: lap, laps: span };
                    debug!(trial = self.trial, lap, %kind, laps = span, "caution deployed");
                    observer.on_caution(&event);
                    cautions.push(event);
                }
            }

            // ── ② Pit stop ────────────────────────────────────────────────
            let pit_lap = match plan.stint_fitted_on(lap) {
                Some(next) => {
                    let to = &plan.stints[next].compound;
                    let cost = pit_stop_cost(constants, &mut self.rng);
                    let stop = PitStopRecord {
                        lap,
                        cost_s: cost.total(),
                        from:   state.current_compound.clone(),
                        to:     to.name.clone(),
                    };
                    state.pit(&to.name);
                    state.cumulative_time_s += stop.cost_s;
                    debug!(trial = self.trial, lap, from = %stop.from, to = %stop.to, cost_s = stop.cost_s, "pit stop");
                    observer.on_pit_stop(&stop);
                    pit_stops.push(stop);
                    true
                }
                None => false,
            };

            // ── ③ Lap time ────────────────────────────────────────────────
            let compound = plan.stints[state.stint_index].compound.as_ref();
            let caution = state.caution();
            let inputs = LapInputs {
                circuit:       plan.circuit.as_ref(),
                compound,
                tire_age_laps: state.tire_age_laps,
                fuel_load_kg:  state.fuel_load_kg,
                track_temp:    weather.track_temp,
                caution,
                warming_up:    state.stint_index > 0 && state.stint_lap < compound.warm_up_laps,
            };
            let breakdown = lap_time(&inputs, constants, &mut self.rng).map_err(|source| {
                RaceError::Numeric { lap, source, state: Box::new(state.clone()) }
            })?;

            let record = LapRecord {
                lap,
                lap_time_s:        breakdown.total,
                compound:          state.current_compound.clone(),
                tire_age_laps:     state.tire_age_laps,
                fuel_load_kg:      state.fuel_load_kg,
                caution,
                pit:               pit_lap,
                cumulative_time_s: state.cumulative_time_s + breakdown.total,
            };

            // ── ④ Consume fuel and tyre ───────────────────────────────────
            state.fuel_load_kg = (state.fuel_load_kg - constants.fuel_consumption_per_lap).max(0.0);
            if !pit_lap {
                state.tire_age_laps += 1;
            }
            state.stint_lap += 1;

            // ── ⑤ Commit ──────────────────────────────────────────────────
            state.cumulative_time_s += breakdown.total;
            state.tick_caution();
            laps_completed = lap;

            observer.on_lap_end(&record);
            if self.record_laps {
                laps.push(record);
            }
        }

        let result = SimulationResult {
            strategy_id:    plan.strategy.id,
            strategy_label: plan.strategy.label(),
            seed:           self.rng.seed(),
            trial:          self.trial,
            weather,
            laps,
            laps_completed,
            total_time_s:   state.cumulative_time_s,
            pit_stops,
            cautions,
            status,
        };
        debug!(
            trial = self.trial,
            strategy = %result.strategy_label,
            total_time_s = result.total_time_s,
            ?status,
            "trial finished"
        );
        observer.on_race_end(&result);
        Ok(result)
    }
}
