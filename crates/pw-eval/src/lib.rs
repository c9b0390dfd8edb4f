//! `pw-eval` — score strategies over many seeded trials and search for the
//! best ones.
//!
//! # Common random numbers
//!
//! Trial `k` of every evaluation under run seed `s` draws from
//! `TrialRng::new(s, k)`, whatever strategy it runs.  Two strategies compared
//! under one seed therefore face the same weather and the same caution
//! rolls for as long as their draw sequences line up, which keeps ranking
//! noise well below the raw lap-to-lap variance.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Runs an evaluation's trials on Rayon's thread pool.     |
//! | `serde`    | Serialize/Deserialize on statistics and outcomes.       |
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`stats`]       | `StatsAccumulator`, `StrategyStatistics`              |
//! | [`evaluator`]   | `StrategyEvaluator`, `EvaluatorConfig`, `Evaluation`  |
//! | [`optimizer`]   | `StrategyOptimizer`, `OptimizerConstraints`, …        |
//! | [`error`]       | `EvalError`, `EvalResult<T>`                          |

pub mod error;
pub mod evaluator;
pub mod optimizer;
pub mod stats;

#[cfg(test)]
mod tests;

pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluation, EvaluatorConfig, StrategyEvaluator};
pub use optimizer::{OptimizationOutcome, OptimizerConstraints, RankedStrategy, StrategyOptimizer};
pub use stats::{StatsAccumulator, StrategyStatistics};
