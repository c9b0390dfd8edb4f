use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A model term evaluated to NaN or ±∞, usually from malformed reference
    /// data that passed record validation.
    #[error("{term} is not finite ({value})")]
    NonFinite {
        term:  &'static str,
        value: f64,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Pass `value` through, or fail naming the offending term.
#[inline]
pub(crate) fn finite(term: &'static str, value: f64) -> ModelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinite { term, value })
    }
}
