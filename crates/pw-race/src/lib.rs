//! `pw-race` — one seeded trial of one strategy, lap by lap.
//!
//! # Lap loop
//!
//! ```text
//! draw trial weather (once)
//! for lap in 1..=total_laps:
//!   ⓪ Cancel   — stop cooperatively if the token is cancelled or expired.
//!   ① Caution  — if none active, roll safety car, else VSC, with the
//!                per-lap hazards; an activation lasts a random span of laps.
//!   ② Pit      — on a planned pit lap: add the stop cost, fit the next
//!                stint's compound, reset tyre age.
//!   ③ Lap time — LapTimeModel over the current state.
//!   ④ Consume  — burn fuel; age the tyre unless this was the pit lap.
//!   ⑤ Commit   — accumulate time, count down the caution.
//! ```
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`strategy`]   | `Stint`, `Strategy`                                      |
//! | [`builder`]    | `RaceBuilder` (validation), `RacePlan`, `PlannedStint`   |
//! | [`state`]      | `RaceState`                                              |
//! | [`machine`]    | `RaceStateMachine` — the lap loop                        |
//! | [`observer`]   | `RaceObserver`, `NoopObserver`                           |
//! | [`cancel`]     | `CancelToken`, `StopReason`                              |
//! | [`result`]     | `SimulationResult`, `LapRecord`, `PitStopRecord`, …      |
//! | [`error`]      | `RaceError`, `RaceResult<T>`                             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pw_core::{Circuit, CompoundTable, StrategyId, TrialRng};
//! use pw_race::{CancelToken, NoopObserver, RaceBuilder, RaceStateMachine, Strategy};
//!
//! let strategy = Strategy::from_pairs(StrategyId(0), &[("C3", 30), ("C2", 30)]);
//! let plan = RaceBuilder::new(circuit, &CompoundTable::standard(), strategy).build()?;
//! let result = RaceStateMachine::new(&plan, TrialRng::new(42, 0))
//!     .run(&mut NoopObserver, &CancelToken::new())?;
//! ```

pub mod builder;
pub mod cancel;
pub mod error;
pub mod machine;
pub mod observer;
pub mod result;
pub mod state;
pub mod strategy;


pub use builder::{PlannedStint, RaceBuilder, RacePlan};
pub use cancel::{CancelToken, StopReason};
pub use error::{RaceError, RaceResult};
pub use machine::RaceStateMachine;
pub use observer::{NoopObserver, RaceObserver};
pub use result::{CautionEvent, LapRecord, PitStopRecord, SimulationResult, TerminalStatus};
pub use state::RaceState;
pub use strategy::{Stint, Strategy};
