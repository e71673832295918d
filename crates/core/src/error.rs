//! Error types for hunt configuration and reporting.
//!
//! Only recoverable conditions live here. Out-of-bounds lattice access is a
//! programming error and panics at the call site instead.

use thiserror::Error;

/// Errors raised while configuring or reporting on a hunt.
#[derive(Debug, Error)]
pub enum HuntError {
    /// Gate size was zero or negative.
    #[error("Grid size must be greater than 0.")]
    InvalidGateSize(i32),

    /// Gate size would need a lattice larger than the supported cell count.
    #[error("Grid size {gate_size} needs more than the supported {max_cells} lattice cells.")]
    GridTooLarge { gate_size: i32, max_cells: usize },

    /// Seed was negative.
    #[error("Random seed must be non-negative.")]
    NegativeSeed(i64),

    /// Density was negative, NaN or infinite.
    #[error("Density must be a finite, non-negative number (got {0}).")]
    InvalidDensity(f64),

    /// A worker pool of zero threads was requested.
    #[error("Worker count must be greater than 0.")]
    ZeroWorkers,

    /// A sequential cut-off of zero would never reach the base case.
    #[error("Sequential cut-off must be greater than 0.")]
    ZeroCutoff,

    /// The derived number of searches does not fit a climber identifier.
    #[error("Too many searches requested: {0}")]
    TooManySearches(usize),

    /// Climber identifiers start at 1.
    #[error("Climber id must be positive, got {0}")]
    InvalidClimberId(i32),

    /// Climber start cell lies outside the lattice.
    #[error("Climber start ({row}, {col}) lies outside the {rows}x{cols} grid")]
    StartOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The dedicated rayon pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Heat map encoding or file I/O failed.
    #[error("Failed to write heat map: {0}")]
    Image(#[from] image::ImageError),
}
