//! `pw-core` — foundational types for the `pitwall` race strategy engine.
//!
//! This crate is a dependency of every other `pw-*` crate.  It has no `pw-*`
//! dependencies and few external ones (`rand`, `thiserror`, and `csv`/`serde`
//! for reference-record intake).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `StrategyId`, `JobId`                                     |
//! | [`records`]  | `Circuit`, `TireCompound`, `CompoundTable`                |
//! | [`track`]    | `TrackType` enum                                          |
//! | [`rng`]      | `TrialRng` (per-trial), `derive_seed`                     |
//! | [`config`]   | `SimConstants`, `EngineConfig`                            |
//! | [`loader`]   | CSV intake of compound and circuit records                |
//! | [`error`]    | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod loader;
pub mod records;
pub mod rng;
pub mod track;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CautionModel, EngineConfig, SimConstants};
pub use error::{CoreError, CoreResult};
pub use ids::{JobId, StrategyId};
pub use loader::{load_circuits_csv, load_circuits_reader, load_compounds_csv, load_compounds_reader};
pub use records::{Circuit, CompoundTable, TireCompound};
pub use rng::{TrialRng, derive_seed};
pub use track::TrackType;
