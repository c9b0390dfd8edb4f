//! `pw-sched` — run evaluation and optimization jobs on a bounded pool.
//!
//! # Job lifecycle
//!
//! ```text
//! submit ──► Queued ──► Running ──► Completed
//!   │           │          ├──────► TimedOut   (deadline hit; partial stats)
//!   │           │          ├──────► Cancelled  (cancel while running)
//!   │           │          └──────► Failed     (numeric error or panic)
//!   │           └─────────────────► Cancelled  (cancel while queued)
//!   └─► Err(..)  validation failure or queue full, nothing enqueued
//! ```
//!
//! At most `max_concurrent_simulations` jobs run at once, one per worker
//! thread.  Further jobs wait in a FIFO channel.  A job's deadline is armed
//! when a worker picks it up, so queue time never counts against it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`job`]         | `JobRequest`, `JobTask`, `JobStatus`, `JobReport`, …  |
//! | [`scheduler`]   | `SimulationScheduler`, `JobHandle`                    |
//! | [`error`]       | `SchedError`, `SchedResult<T>`                        |

pub mod error;
pub mod job;
pub mod scheduler;


pub use error::{SchedError, SchedResult};
pub use job::{JobOutput, JobReport, JobRequest, JobStatus, JobTask, NumericFailure};
pub use scheduler::{JobHandle, SimulationScheduler};
