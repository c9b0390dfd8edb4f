use pw_core::CoreError;
use pw_model::ModelError;
use thiserror::Error;

use crate::RaceState;

#[derive(Debug, Error)]
pub enum RaceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("strategy has no stints")]
    EmptyStrategy,

    #[error("stint {index} has zero laps")]
    ZeroLengthStint { index: usize },

    #[error("stint lengths sum to {got} laps but the race is {expected} laps")]
    StintSumMismatch {
        expected: u32,
        got:      u32,
    },

    #[error("{stops} pit stops exceed the configured maximum of {max}")]
    TooManyStops {
        stops: u32,
        max:   u32,
    },

    #[error("a dry race must use at least two distinct dry compounds, strategy uses {compounds:?}")]
    DualCompoundViolation { compounds: Vec<String> },

    #[error("compound {compound:?} is unsuitable for a {condition} race at {tyre_temp:.0} °C tyre temperature")]
    UnsuitableCompound {
        compound:  String,
        condition: &'static str,
        tyre_temp: f64,
    },

    /// A model term went non-finite mid-run.  The state at the start of the
    /// failing lap is kept for diagnosis.
    #[error("numeric failure on lap {lap}: {source}")]
    Numeric {
        lap:    u32,
        source: ModelError,
        state:  Box<RaceState>,
    },
}

pub type RaceResult<T> = Result<T, RaceError>;
