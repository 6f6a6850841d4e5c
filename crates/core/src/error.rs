//! Setup-time error types
//!
//! Every error in this crate is a configuration error: it is detected while the
//! geometry, decomposition, boundary table or run configuration is being built
//! and it aborts the run. The time-stepping hot path is infallible.

use crate::solver::Side;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by all fallible constructors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Dimensionality outside `1..=3`
    #[error("dimension must be 1, 2 or 3, got {0}")]
    InvalidDimension(usize),

    /// Two inputs disagree on the number of axes
    #[error("{what}: expected {expected} axes, got {actual}")]
    DimensionMismatch {
        /// Which input was inconsistent
        what: &'static str,
        /// Axis count implied by the geometry
        expected: usize,
        /// Axis count actually supplied
        actual: usize,
    },

    /// Cell spacing along an axis is zero, negative or not finite
    #[error("cell size along axis {axis} must be finite and positive, got {value}")]
    NonPositiveCellSize {
        /// Offending axis
        axis: usize,
        /// Computed spacing
        value: f64,
    },

    /// A non-periodic axis has no boundary entry for one side
    #[error("boundary table has no entry for axis {axis} ({side} side)")]
    MissingBoundary {
        /// Offending axis
        axis: usize,
        /// Side without an entry
        side: Side,
    },

    /// Periodic entry on a non-periodic axis, or a non-periodic entry on a periodic axis
    #[error("boundary entry for axis {axis} ({side} side) disagrees with geometry periodicity")]
    PeriodicMismatch {
        /// Offending axis
        axis: usize,
        /// Offending side
        side: Side,
    },

    /// Boundary entry that cannot be applied
    #[error("boundary entry for axis {axis} ({side} side) is invalid: {message}")]
    InvalidBoundaryValue {
        /// Offending axis
        axis: usize,
        /// Offending side
        side: Side,
        /// What is wrong with it
        message: String,
    },

    /// Ghost border too thin for the stencil or too wide for a periodic wrap
    #[error("ghost width {actual} is invalid: {message}")]
    InsufficientGhostWidth {
        /// Requested ghost width
        actual: usize,
        /// Constraint that was violated
        message: String,
    },

    /// Patches overlap, leave gaps, or leave the domain
    #[error("invalid decomposition: {0}")]
    Decomposition(String),

    /// Run parameter out of range
    #[error("parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration
        name: &'static str,
        /// Constraint that was violated
        message: String,
    },

    /// Configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid JSON for [`crate::HeatConfig`]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Convenience constructor for [`ConfigError::InvalidParameter`]
    pub fn parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
