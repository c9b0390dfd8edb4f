//! `pw-model` — the per-lap physics of the pitwall engine.
//!
//! Everything here is a free function over explicit parameter structs: no
//! state, no hidden randomness.  Stochastic terms take a `&mut TrialRng`
//! owned by the calling trial.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`tyre`]      | `degradation`, `grip_multiplier`, `is_suitable`            |
//! | [`lap_time`]  | `Caution`, `LapInputs`, `LapTimeBreakdown`, `lap_time`     |
//! | [`pit_stop`]  | `PitStopCost`, `pit_stop_cost`                             |
//! | [`weather`]   | `TrialWeather`, `draw_weather`                             |
//! | [`error`]     | `ModelError`, `ModelResult<T>`                             |
//!
//! # Lap-time composition
//!
//! ```text
//! additive = base + grip_delta + wear·scale + fuel + |T − T_opt|·k
//!            − drs + warm_up + variation
//! lap      = additive × caution_factor
//! ```
//!
//! The caution factor is applied last so a safety car slows the whole lap,
//! degradation and fuel terms included.

pub mod error;
pub mod lap_time;
pub mod pit_stop;
pub mod tyre;
pub mod weather;

#[cfg(test)]
mod tests;

pub use error::{ModelError, ModelResult};
pub use lap_time::{Caution, LapInputs, LapTimeBreakdown, lap_time};
pub use pit_stop::{PitStopCost, pit_stop_cost};
pub use tyre::{degradation, grip_multiplier, is_dry_capable, is_suitable};
pub use weather::{TrialWeather, draw_weather};
