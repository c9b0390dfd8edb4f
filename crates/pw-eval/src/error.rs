use pw_core::CoreError;
use pw_race::RaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Race(#[from] RaceError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid optimizer constraints: {0}")]
    Constraints(String),

    #[error("no compound is suitable for a {condition} race at {tyre_temp:.0} °C tyre temperature")]
    NoSuitableCompounds {
        condition: &'static str,
        tyre_temp: f64,
    },
}

pub type EvalResult<T> = Result<T, EvalError>;
