//! CSV intake of reference records.
//!
//! # Compound CSV format
//!
//! One row per compound.  Only the first four columns are required; blank or
//! missing optional columns take the [`TireCompound::new`] defaults.
//!
//! ```csv
//! name,base_grip,degradation_rate,optimal_life,cliff_lap,cliff_factor,dry_performance,wet_performance
//! C3,1.00,0.030,30,30,0.5,1.0,0.0
//! INTERMEDIATE,0.85,0.025,30,,,0.4,0.8
//! ```
//!
//! Recognised optional columns: `display_name`, `optimal_temp_min`,
//! `optimal_temp_max`, `working_range_min`, `working_range_max`, `cliff_lap`,
//! `cliff_factor`, `warm_up_laps`, `warm_up_penalty`, `dry_performance`,
//! `wet_performance`.
//!
//! # Circuit CSV format
//!
//! ```csv
//! name,lap_distance,total_laps,base_lap_time,typical_temp,rain_probability,track_type
//! Monza,5.793,53,81.0,32,0.1,permanent
//! ```
//!
//! Optional columns: `country`, `tire_wear_factor`, `fuel_effect`,
//! `pit_loss_time`, `drs_zones`, `track_type`, `typical_temp`,
//! `rain_probability`.
//!
//! Every record is validated after parsing; the first invalid row aborts the
//! load.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{Circuit, CompoundTable, CoreError, CoreResult, TireCompound, TrackType};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CompoundRecord {
    name:              String,
    base_grip:         f64,
    degradation_rate:  f64,
    optimal_life:      u32,
    #[serde(default)]
    display_name:      Option<String>,
    #[serde(default)]
    optimal_temp_min:  Option<f64>,
    #[serde(default)]
    optimal_temp_max:  Option<f64>,
    #[serde(default)]
    working_range_min: Option<f64>,
    #[serde(default)]
    working_range_max: Option<f64>,
    #[serde(default)]
    cliff_lap:         Option<u32>,
    #[serde(default)]
    cliff_factor:      Option<f64>,
    #[serde(default)]
    warm_up_laps:      Option<u32>,
    #[serde(default)]
    warm_up_penalty:   Option<f64>,
    #[serde(default)]
    dry_performance:   Option<f64>,
    #[serde(default)]
    wet_performance:   Option<f64>,
}

#[derive(Deserialize)]
struct CircuitRecord {
    name:             String,
    lap_distance:     f64,
    total_laps:       u32,
    base_lap_time:    f64,
    #[serde(default)]
    country:          Option<String>,
    #[serde(default)]
    tire_wear_factor: Option<f64>,
    #[serde(default)]
    fuel_effect:      Option<f64>,
    #[serde(default)]
    pit_loss_time:    Option<f64>,
    #[serde(default)]
    drs_zones:        Option<u32>,
    #[serde(default)]
    track_type:       Option<String>,
    #[serde(default)]
    typical_temp:     Option<f64>,
    #[serde(default)]
    rain_probability: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`CompoundTable`] from a CSV file.
pub fn load_compounds_csv(path: &Path) -> CoreResult<CompoundTable> {
    let file = std::fs::File::open(path).map_err(CoreError::Io)?;
    load_compounds_reader(file)
}

/// Like [`load_compounds_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for records fetched from
/// a service.
pub fn load_compounds_reader<R: Read>(reader: R) -> CoreResult<CompoundTable> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut table = CompoundTable::new();

    for result in csv_reader.deserialize::<CompoundRecord>() {
        let row = result.map_err(|e| CoreError::Parse(e.to_string()))?;
        table.insert(compound_from_record(row))?;
    }

    Ok(table)
}

/// Load every circuit in a CSV file, in file order.
pub fn load_circuits_csv(path: &Path) -> CoreResult<Vec<Circuit>> {
    let file = std::fs::File::open(path).map_err(CoreError::Io)?;
    load_circuits_reader(file)
}

/// Like [`load_circuits_csv`] but accepts any `Read` source.
pub fn load_circuits_reader<R: Read>(reader: R) -> CoreResult<Vec<Circuit>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut circuits = Vec::new();

    for result in csv_reader.deserialize::<CircuitRecord>() {
        let row = result.map_err(|e| CoreError::Parse(e.to_string()))?;
        let circuit = circuit_from_record(row)?;
        circuit.validate()?;
        circuits.push(circuit);
    }

    Ok(circuits)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn compound_from_record(r: CompoundRecord) -> TireCompound {
    let mut c = TireCompound::new(r.name, r.base_grip, r.degradation_rate, r.optimal_life);
    if let Some(v) = r.display_name.filter(|s| !s.is_empty()) { c.display_name = v; }
    if let Some(v) = r.optimal_temp_min  { c.optimal_temp_min = v; }
    if let Some(v) = r.optimal_temp_max  { c.optimal_temp_max = v; }
    if let Some(v) = r.working_range_min { c.working_range_min = v; }
    if let Some(v) = r.working_range_max { c.working_range_max = v; }
    if let Some(v) = r.cliff_lap         { c.cliff_lap = v; }
    if let Some(v) = r.cliff_factor      { c.cliff_factor = v; }
    if let Some(v) = r.warm_up_laps      { c.warm_up_laps = v; }
    if let Some(v) = r.warm_up_penalty   { c.warm_up_penalty = v; }
    if let Some(v) = r.dry_performance   { c.dry_performance = v; }
    if let Some(v) = r.wet_performance   { c.wet_performance = v; }
    c
}

fn circuit_from_record(r: CircuitRecord) -> CoreResult<Circuit> {
    let mut c = Circuit::new(r.name, r.lap_distance, r.total_laps, r.base_lap_time);
    if let Some(v) = r.country          { c.country = v; }
    if let Some(v) = r.tire_wear_factor { c.tire_wear_factor = v; }
    if let Some(v) = r.fuel_effect      { c.fuel_effect = v; }
    if let Some(v) = r.pit_loss_time    { c.pit_loss_time = v; }
    if let Some(v) = r.drs_zones        { c.drs_zones = v; }
    if let Some(v) = r.typical_temp     { c.typical_temp = v; }
    if let Some(v) = r.rain_probability { c.rain_probability = v; }
    if let Some(label) = r.track_type.filter(|s| !s.is_empty()) {
        c.track_type = TrackType::parse(&label).ok_or_else(|| {
            CoreError::Parse(format!(
                "invalid track_type {label:?}: expected \"permanent\", \"street\", or \"hybrid\""
            ))
        })?;
    }
    Ok(c)
}
