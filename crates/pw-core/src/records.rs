//! Read-only reference records: circuits and tyre compounds.
//!
//! Records are plain values owned by whatever external store supplied them.
//! The engine receives them by value or behind an `Arc`, never mutates them,
//! and shares them across concurrent trials without locking.
//!
//! Every record has a `validate()` that enforces the invariants the engine
//! relies on.  Validation is deliberately narrow: it rejects values that make
//! a run meaningless (zero-length laps, empty working range), not values that
//! are merely unusual.  Non-finite intermediate results produced by odd but
//! accepted data are caught later, per lap, as numeric errors.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{CoreError, CoreResult, TrackType};

// ── Circuit ───────────────────────────────────────────────────────────────────

/// Static description of one circuit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circuit {
    pub name:             String,
    pub country:          String,
    /// Length of one lap in kilometres.  Must be > 0.
    pub lap_distance:     f64,
    /// Race length in laps.  Must be ≥ 1.
    pub total_laps:       u32,
    /// Reference lap time in seconds on a nominal car.  Must be > 0.
    pub base_lap_time:    f64,
    /// Track abrasiveness multiplier passed to the degradation curve.
    pub tire_wear_factor: f64,
    /// Seconds per kilogram of fuel, as published for this circuit.
    pub fuel_effect:      f64,
    /// Published time lost driving through the pit lane, seconds.
    pub pit_loss_time:    f64,
    /// Number of DRS activation zones.  Zero disables the DRS term.
    pub drs_zones:        u32,
    pub track_type:       TrackType,
    /// Typical race-day track temperature, °C.
    pub typical_temp:     f64,
    /// Probability in [0, 1] that a given race sees rain.
    pub rain_probability: f64,
}

impl Circuit {
    /// Create a circuit with the reference defaults for every optional field.
    pub fn new(name: impl Into<String>, lap_distance: f64, total_laps: u32, base_lap_time: f64) -> Self {
        Self {
            name: name.into(),
            country: String::new(),
            lap_distance,
            total_laps,
            base_lap_time,
            tire_wear_factor: 1.0,
            fuel_effect:      0.03,
            pit_loss_time:    22.0,
            drs_zones:        2,
            track_type:       TrackType::Permanent,
            typical_temp:     25.0,
            rain_probability: 0.1,
        }
    }

    /// Race distance in kilometres (`lap_distance × total_laps`).
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.lap_distance * self.total_laps as f64
    }

    /// Average speed over a reference lap, km/h.  Zero for a degenerate record.
    pub fn average_speed_kph(&self) -> f64 {
        if self.base_lap_time > 0.0 {
            self.lap_distance / self.base_lap_time * 3_600.0
        } else {
            0.0
        }
    }

    /// Naive race duration: every lap at the reference time, no stops.
    #[inline]
    pub fn total_race_time_estimate(&self) -> f64 {
        self.base_lap_time * self.total_laps as f64
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.lap_distance > 0.0 && self.lap_distance.is_finite()) {
            return Err(CoreError::circuit(&self.name, format!(
                "lap_distance must be positive, got {}", self.lap_distance
            )));
        }
        if self.total_laps == 0 {
            return Err(CoreError::circuit(&self.name, "total_laps must be at least 1"));
        }
        if !(self.base_lap_time > 0.0 && self.base_lap_time.is_finite()) {
            return Err(CoreError::circuit(&self.name, format!(
                "base_lap_time must be positive, got {}", self.base_lap_time
            )));
        }
        if !(0.0..=1.0).contains(&self.rain_probability) {
            return Err(CoreError::circuit(&self.name, format!(
                "rain_probability must lie in [0, 1], got {}", self.rain_probability
            )));
        }
        Ok(())
    }
}

// ── TireCompound ──────────────────────────────────────────────────────────────

/// Static parameters of one tyre compound.
///
/// Temperatures are tyre operating temperatures in °C.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TireCompound {
    /// Lookup key, e.g. `"C3"`.
    pub name:              String,
    pub display_name:      String,
    /// Grip inside the optimal window.  Must be > 0.
    pub base_grip:         f64,
    /// Wear added per lap on the compound.  Must be ≥ 0.
    pub degradation_rate:  f64,
    /// Nominal stint length in laps.
    pub optimal_life:      u32,
    pub optimal_temp_min:  f64,
    pub optimal_temp_max:  f64,
    pub working_range_min: f64,
    pub working_range_max: f64,
    /// Lap on the compound after which wear accelerates.
    pub cliff_lap:         u32,
    /// Extra wear per lap past the cliff, as a fraction of `degradation_rate`.
    pub cliff_factor:      f64,
    /// Laps after fitting during which the tyre is below temperature.
    pub warm_up_laps:      u32,
    /// Seconds lost on each warm-up lap.
    pub warm_up_penalty:   f64,
    /// Relative performance on a dry track, [0, 1].
    pub dry_performance:   f64,
    /// Relative performance on a wet track, [0, 1].
    pub wet_performance:   f64,
}

impl TireCompound {
    /// Create a dry compound with the reference defaults for every optional
    /// field.  The cliff sits at the end of the compound's optimal life.
    pub fn new(name: impl Into<String>, base_grip: f64, degradation_rate: f64, optimal_life: u32) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            base_grip,
            degradation_rate,
            optimal_life,
            optimal_temp_min:  80.0,
            optimal_temp_max:  110.0,
            working_range_min: 70.0,
            working_range_max: 120.0,
            cliff_lap:         optimal_life,
            cliff_factor:      0.5,
            warm_up_laps:      1,
            warm_up_penalty:   0.5,
            dry_performance:   1.0,
            wet_performance:   0.0,
        }
    }

    /// The standard Pirelli-style range: slicks `C1`–`C5` plus
    /// `INTERMEDIATE` and `WET`.  `None` for any other name.
    pub fn preset(name: &str) -> Option<Self> {
        let compound = match name {
            "C1" => Self::new("C1", 0.92, 0.015, 40).with_display_name("Hard"),
            "C2" => Self::new("C2", 0.95, 0.022, 35).with_display_name("Medium-Hard"),
            "C3" => Self::new("C3", 1.00, 0.030, 30).with_display_name("Medium"),
            "C4" => Self::new("C4", 1.05, 0.040, 25).with_display_name("Soft"),
            "C5" => Self::new("C5", 1.10, 0.055, 20).with_display_name("Super-Soft"),
            "INTERMEDIATE" => Self {
                dry_performance:   0.4,
                wet_performance:   0.8,
                optimal_temp_min:  60.0,
                optimal_temp_max:  95.0,
                working_range_min: 40.0,
                working_range_max: 110.0,
                ..Self::new("INTERMEDIATE", 0.85, 0.025, 30).with_display_name("Intermediate")
            },
            "WET" => Self {
                dry_performance:   0.2,
                wet_performance:   1.0,
                optimal_temp_min:  50.0,
                optimal_temp_max:  90.0,
                working_range_min: 30.0,
                working_range_max: 105.0,
                ..Self::new("WET", 0.75, 0.020, 25).with_display_name("Full Wet")
            },
            _ => return None,
        };
        Some(compound)
    }

    fn with_display_name(mut self, display: &str) -> Self {
        self.display_name = display.to_owned();
        self
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::compound(&self.name, "name must not be empty"));
        }
        if !(self.base_grip > 0.0) {
            return Err(CoreError::compound(&self.name, format!(
                "base_grip must be positive, got {}", self.base_grip
            )));
        }
        if !(self.degradation_rate >= 0.0) {
            return Err(CoreError::compound(&self.name, format!(
                "degradation_rate must be non-negative, got {}", self.degradation_rate
            )));
        }
        // Infinity is allowed: it models a tyre that gives out at the cliff.
        if !(self.cliff_factor >= 0.0) {
            return Err(CoreError::compound(&self.name, format!(
                "cliff_factor must be non-negative, got {}", self.cliff_factor
            )));
        }
        if !(self.working_range_min < self.working_range_max) {
            return Err(CoreError::compound(&self.name, format!(
                "working range [{}, {}] is empty",
                self.working_range_min, self.working_range_max
            )));
        }
        if !(self.optimal_temp_min <= self.optimal_temp_max) {
            return Err(CoreError::compound(&self.name, format!(
                "optimal window [{}, {}] is inverted",
                self.optimal_temp_min, self.optimal_temp_max
            )));
        }
        Ok(())
    }
}

// ── CompoundTable ─────────────────────────────────────────────────────────────

/// Compounds keyed by name.
///
/// Backed by a `BTreeMap` so iteration order is stable; the optimizer
/// enumerates candidates in this order and must be reproducible.
#[derive(Clone, Debug, Default)]
pub struct CompoundTable {
    inner: BTreeMap<String, Arc<TireCompound>>,
}

impl CompoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of every [`TireCompound::preset`].
    pub fn standard() -> Self {
        let mut table = Self::new();
        for name in ["C1", "C2", "C3", "C4", "C5", "INTERMEDIATE", "WET"] {
            if let Some(compound) = TireCompound::preset(name) {
                table.inner.insert(compound.name.clone(), Arc::new(compound));
            }
        }
        table
    }

    /// Build a table from records, validating each one.
    pub fn from_compounds<I>(compounds: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = TireCompound>,
    {
        let mut table = Self::new();
        for compound in compounds {
            table.insert(compound)?;
        }
        Ok(table)
    }

    /// Validate and add a compound.  Names must be unique.
    pub fn insert(&mut self, compound: TireCompound) -> CoreResult<()> {
        compound.validate()?;
        if self.inner.contains_key(&compound.name) {
            return Err(CoreError::DuplicateCompound(compound.name));
        }
        self.inner.insert(compound.name.clone(), Arc::new(compound));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TireCompound>> {
        self.inner.get(name)
    }

    /// Like [`get`][Self::get] but returns a shared handle or an error.
    pub fn resolve(&self, name: &str) -> CoreResult<Arc<TireCompound>> {
        self.inner
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownCompound(name.to_owned()))
    }

    /// Iterate compounds in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TireCompound>> {
        self.inner.values()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
