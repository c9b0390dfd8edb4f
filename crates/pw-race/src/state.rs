//! Mutable per-trial race state.

use pw_model::Caution;

use crate::RacePlan;

/// Everything that changes from lap to lap within one trial.
///
/// Owned by exactly one [`RaceStateMachine`][crate::RaceStateMachine]; never
/// shared between trials.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceState {
    /// Lap being run (1-based); 0 before the first lap.
    pub current_lap:            u32,
    pub fuel_load_kg:           f64,
    pub current_compound:       String,
    /// Index into the plan's stints.
    pub stint_index:            usize,
    /// Age of the fitted set.  Not advanced on the lap the set was fitted.
    pub tire_age_laps:          u32,
    /// Laps run since the set was fitted, the pit lap included.
    pub stint_lap:              u32,
    pub safety_car_active:      bool,
    pub vsc_active:             bool,
    /// Laps left on the active caution, the current lap included.
    pub caution_laps_remaining: u32,
    pub cumulative_time_s:      f64,
}

impl RaceState {
    /// Grid state: full tank, first stint's compound, no caution.
    pub fn initial(plan: &RacePlan) -> Self {
        RaceState {
            current_lap:            0,
            fuel_load_kg:           plan.constants.initial_fuel_load,
            current_compound:       plan.stints[0].compound.name.clone(),
            stint_index:            0,
            tire_age_laps:          0,
            stint_lap:              0,
            safety_car_active:      false,
            vsc_active:             false,
            caution_laps_remaining: 0,
            cumulative_time_s:      0.0,
        }
    }

    #[inline]
    pub fn caution(&self) -> Caution {
        Caution::from_flags(self.safety_car_active, self.vsc_active)
    }

    /// Fit a new set.  Fuel is untouched; no refuelling.
    pub fn pit(&mut self, compound: &str) {
        self.stint_index += 1;
        self.current_compound.clear();
        self.current_compound.push_str(compound);
        self.tire_age_laps = 0;
        self.stint_lap = 0;
    }

    pub(crate) fn start_caution(&mut self, kind: Caution, laps: u32) {
        self.safety_car_active = kind == Caution::SafetyCar;
        self.vsc_active = kind == Caution::Vsc;
        self.caution_laps_remaining = if kind.is_active() { laps } else { 0 };
    }

    /// Count the just-finished lap off the active caution; clear it at zero.
    pub(crate) fn tick_caution(&mut self) {
        if self.caution_laps_remaining == 0 {
            return;
        }
        self.caution_laps_remaining -= 1;
        if self.caution_laps_remaining == 0 {
            self.safety_car_active = false;
            self.vsc_active = false;
        }
    }
}
