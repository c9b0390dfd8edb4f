//! Fluent builder that validates a [`Strategy`] into a runnable [`RacePlan`].

use std::collections::BTreeSet;
use std::sync::Arc;

use pw_core::{Circuit, CompoundTable, EngineConfig, SimConstants, TireCompound};
use pw_model::{is_dry_capable, is_suitable};

use crate::{RaceError, RaceResult, Strategy};

// ── RacePlan ──────────────────────────────────────────────────────────────────

/// One stint with its compound resolved and its laps placed on the race.
#[derive(Clone, Debug)]
pub struct PlannedStint {
    pub compound: Arc<TireCompound>,
    /// Planned length from the strategy.
    pub laps:     u32,
    /// Lap on which this set is fitted; `None` for the starting set.
    pub pit_lap:  Option<u32>,
}

/// A validated strategy bound to a circuit and a set of constants.
///
/// Immutable and cheap to clone; one plan is shared by every trial that
/// evaluates it, across threads.
#[derive(Clone, Debug)]
pub struct RacePlan {
    pub circuit:   Arc<Circuit>,
    pub strategy:  Strategy,
    pub stints:    Vec<PlannedStint>,
    pub constants: SimConstants,
    pub wet:       bool,
    /// Per-lap activation probabilities, precomputed for this race length.
    pub safety_car_hazard: f64,
    pub vsc_hazard:        f64,
}

impl RacePlan {
    #[inline]
    pub fn total_laps(&self) -> u32 {
        self.circuit.total_laps
    }

    /// Index of the stint whose set is fitted on `lap`, if a stop falls there.
    pub fn stint_fitted_on(&self, lap: u32) -> Option<usize> {
        self.stints.iter().position(|s| s.pit_lap == Some(lap))
    }
}

// ── RaceBuilder ───────────────────────────────────────────────────────────────

/// Fluent builder for [`RacePlan`].
///
/// # Required inputs
///
/// - [`Circuit`] — race length, base lap time, wear factor, …
/// - [`CompoundTable`] — resolves stint compound names
/// - [`Strategy`] — the stints to validate
///
/// # Optional inputs (have defaults)
///
/// | Method                        | Default                         |
/// |-------------------------------|---------------------------------|
/// | `.constants(c)`               | `SimConstants::default()`       |
/// | `.wet(b)`                     | `false` (dry race)              |
/// | `.enforce_dual_compound(b)`   | `true`                          |
/// | `.enforce_suitability(b)`     | `false`                         |
/// | `.max_stops(n)`               | `EngineConfig::MAX_SUPPORTED_STOPS` |
///
/// # Example
///
/// ```rust,ignore
/// let plan = RaceBuilder::new(circuit, &compounds, strategy)
///     .constants(SimConstants::without_cautions())
///     .build()?;
/// ```
pub struct RaceBuilder<'t> {
    circuit:               Arc<Circuit>,
    compounds:             &'t CompoundTable,
    strategy:              Strategy,
    constants:             SimConstants,
    wet:                   bool,
    enforce_dual_compound: bool,
    enforce_suitability:   bool,
    max_stops:             u32,
}

impl<'t> RaceBuilder<'t> {
    pub fn new(circuit: impl Into<Arc<Circuit>>, compounds: &'t CompoundTable, strategy: Strategy) -> Self {
        Self {
            circuit:               circuit.into(),
            compounds,
            strategy,
            constants:             SimConstants::default(),
            wet:                   false,
            enforce_dual_compound: true,
            enforce_suitability:   false,
            max_stops:             EngineConfig::MAX_SUPPORTED_STOPS,
        }
    }

    /// Take constants, stop limit, and rule switches from an engine config.
    pub fn config(mut self, config: &EngineConfig) -> Self {
        self.constants = config.constants.clone();
        self.max_stops = config.max_stops;
        self.enforce_dual_compound = config.enforce_dual_compound;
        self.enforce_suitability = config.enforce_suitability;
        self
    }

    pub fn constants(mut self, constants: SimConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Declare the race wet.  Disables the dry two-compound rule and switches
    /// suitability checks to wet performance.
    pub fn wet(mut self, wet: bool) -> Self {
        self.wet = wet;
        self
    }

    pub fn enforce_dual_compound(mut self, enforce: bool) -> Self {
        self.enforce_dual_compound = enforce;
        self
    }

    pub fn enforce_suitability(mut self, enforce: bool) -> Self {
        self.enforce_suitability = enforce;
        self
    }

    pub fn max_stops(mut self, max_stops: u32) -> Self {
        self.max_stops = max_stops;
        self
    }

    /// Validate every input and return a ready-to-run [`RacePlan`].
    ///
    /// Nothing invalid ever reaches the state machine; all rejections happen
    /// here.
    pub fn build(self) -> RaceResult<RacePlan> {
        self.circuit.validate()?;
        self.constants.validate()?;

        // ── Shape of the strategy ─────────────────────────────────────────
        let stints = &self.strategy.stints;
        if stints.is_empty() {
            return Err(RaceError::EmptyStrategy);
        }
        let stops = self.strategy.pit_stop_count();
        if stops > self.max_stops {
            return Err(RaceError::TooManyStops { stops, max: self.max_stops });
        }
        if let Some(index) = stints.iter().position(|s| s.laps == 0) {
            return Err(RaceError::ZeroLengthStint { index });
        }
        let got = self.strategy.total_laps();
        if got != self.circuit.total_laps {
            return Err(RaceError::StintSumMismatch { expected: self.circuit.total_laps, got });
        }

        // ── Resolve compounds and place pit laps ──────────────────────────
        let mut planned = Vec::with_capacity(stints.len());
        let mut boundary = 0;
        for (i, stint) in stints.iter().enumerate() {
            let compound = self.compounds.resolve(&stint.compound)?;
            let pit_lap = (i > 0).then_some(boundary);
            boundary += stint.laps;
            planned.push(PlannedStint { compound, laps: stint.laps, pit_lap });
        }

        // ── Regulatory and condition rules ────────────────────────────────
        if self.enforce_suitability {
            let tyre_temp = self.circuit.typical_temp + self.constants.tyre_temp_offset;
            if let Some(bad) = planned.iter().find(|s| !is_suitable(&s.compound, tyre_temp, self.wet)) {
                return Err(RaceError::UnsuitableCompound {
                    compound:  bad.compound.name.clone(),
                    condition: if self.wet { "wet" } else { "dry" },
                    tyre_temp,
                });
            }
        }
        if self.enforce_dual_compound && !self.wet {
            let dry: BTreeSet<&str> = planned
                .iter()
                .filter(|s| is_dry_capable(&s.compound))
                .map(|s| s.compound.name.as_str())
                .collect();
            if dry.len() < 2 {
                return Err(RaceError::DualCompoundViolation {
                    compounds: self.strategy.compounds().map(str::to_owned).collect(),
                });
            }
        }

        let total_laps = self.circuit.total_laps;
        Ok(RacePlan {
            safety_car_hazard: self.constants.safety_car_hazard(total_laps),
            vsc_hazard:        self.constants.vsc_hazard(total_laps),
            circuit:           self.circuit,
            strategy:          self.strategy,
            stints:            planned,
            constants:         self.constants,
            wet:               self.wet,
        })
    }
}
