//! Error type shared by every kernel in the crate.

use thiserror::Error;

/// Configuration and integration failures.
///
/// Everything except [`SimError::NonFiniteState`] is detected while a
/// structure is being built and means the caller described an impossible
/// scene. `NonFiniteState` is reported by an update that produced NaN or
/// infinity; the state from before the step is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("plane normal cannot be zero")]
    DegenerateNormal,

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("grid must be at least 2x2, got {rows}x{cols}")]
    GridTooSmall { rows: usize, cols: usize },

    #[error("curve needs at least 2 particles, got {0}")]
    CurveTooShort(usize),

    #[error("mass must be positive (or infinite to pin the particle), got {0}")]
    InvalidMass(f64),

    #[error("state dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("state component {index} became non-finite at time {time}")]
    NonFiniteState { index: usize, time: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

/// Rejects parameters that must be strictly positive and finite.
pub(crate) fn require_positive(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

/// Rejects parameters that must be finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

pub(crate) fn require_time_step(dt: f64) -> SimResult<f64> {
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(SimError::InvalidTimeStep(dt))
    }
}

/// Returns the index of the first non-finite component, if any.
pub(crate) fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}
