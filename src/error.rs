//! Errors reported by grid construction and the histogram operators.

use thiserror::Error;

/// Histogram localization errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("cannot normalize a grid whose total mass is not positive and finite")]
    DegenerateNormalization,

    #[error("blurring {0} outside [0, 1]")]
    InvalidBlurParameter(f64),

    #[error("sensor model p_hit and p_miss must be positive and finite")]
    InvalidSensorModel,

    #[error("{positions} positions but {times} timestamps")]
    LengthMismatch { positions: usize, times: usize },

    #[cfg(feature = "simulation")]
    #[error("bad simulation configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
