//! Hunt configuration and lattice constants
//!
//! A [`HuntConfig`] is immutable for the lifetime of a run. It fixes the square
//! real domain, the climber density, the random seed and the parallel
//! execution knobs.

use crate::error::HuntError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Lattice cells per unit of real coordinate, per axis.
pub const RESOLUTION: i32 = 5;

/// Scale used to convert the real-valued field to the fixed-point grid value.
pub const PRECISION: i32 = 10_000;

/// Largest lattice a hunt may allocate (two `i32` words per cell).
pub const MAX_GRID_CELLS: usize = 1 << 28;

/// Climber ranges shorter than this are searched sequentially by the driver.
pub const SEQUENTIAL_CUTOFF: usize = 1600;

/// Axis-aligned real-coordinate rectangle covered by the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    /// Create bounds from explicit limits.
    #[must_use]
    pub const fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Square domain `[-half, +half]²`.
    #[must_use]
    pub fn square(half: f64) -> Self {
        Self::new(-half, half, -half, half)
    }

    /// Width of the domain along x
    #[must_use]
    pub fn x_width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Width of the domain along y
    #[must_use]
    pub fn y_width(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Configuration of a single hunt.
///
/// Deserialising fills missing fields from [`HuntConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    /// Half-side of the square domain; the real domain is `[-gate_size, +gate_size]²`.
    pub gate_size: i32,

    /// Climbers per unit area.
    pub density: f64,

    /// Zero draws from the operating system; any positive value is reproducible.
    pub seed: i64,

    /// Worker threads for the hunt. `None` uses the global rayon pool
    /// (one worker per hardware thread).
    pub workers: Option<usize>,

    /// Sequential cut-off for the fork-join driver.
    pub cutoff: usize,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            gate_size: 10,
            density: 0.25,
            seed: 0,
            workers: None,
            cutoff: SEQUENTIAL_CUTOFF,
        }
    }
}

impl HuntConfig {
    /// Create a configuration with default execution settings.
    ///
    /// # Arguments
    ///
    /// * `gate_size` - Half-side of the square domain
    /// * `density` - Climbers per unit area
    /// * `seed` - RNG seed (0 = nondeterministic)
    #[must_use]
    pub fn new(gate_size: i32, density: f64, seed: i64) -> Self {
        Self {
            gate_size,
            density,
            seed,
            ..Self::default()
        }
    }

    /// Run on a dedicated pool of `workers` threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Override the sequential cut-off.
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Check every field, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns the matching [`HuntError`] variant for a non-positive gate size,
    /// a gate size whose lattice exceeds [`MAX_GRID_CELLS`], a negative or
    /// non-finite density, a negative seed, a zero worker count or a zero
    /// cut-off.
    pub fn validate(&self) -> Result<(), HuntError> {
        if self.gate_size <= 0 {
            return Err(HuntError::InvalidGateSize(self.gate_size));
        }
        match self.lattice_cells() {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(HuntError::GridTooLarge {
                    gate_size: self.gate_size,
                    max_cells: MAX_GRID_CELLS,
                });
            }
        }
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(HuntError::InvalidDensity(self.density));
        }
        if self.seed < 0 {
            return Err(HuntError::NegativeSeed(self.seed));
        }
        if self.workers == Some(0) {
            return Err(HuntError::ZeroWorkers);
        }
        if self.cutoff == 0 {
            return Err(HuntError::ZeroCutoff);
        }
        Ok(())
    }

    /// Cells in the `(2·gate_size·RESOLUTION)²` lattice, or `None` on overflow.
    #[must_use]
    pub fn lattice_cells(&self) -> Option<usize> {
        let gate = usize::try_from(self.gate_size).ok()?;
        let side = gate.checked_mul(2 * RESOLUTION as usize)?;
        side.checked_mul(side)
    }

    /// Real-coordinate domain of the hunt.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::square(f64::from(self.gate_size))
    }

    /// Number of climbers: `round(density · (2·gate_size)² · RESOLUTION)`.
    #[must_use]
    pub fn num_searches(&self) -> usize {
        let side = 2.0 * f64::from(self.gate_size);
        let searches = (self.density * side * side * f64::from(RESOLUTION)).round();
        if searches <= 0.0 {
            0
        } else {
            searches as usize
        }
    }

    /// Random generator for this run.
    ///
    /// Seed 0 draws fresh entropy from the OS; any positive seed yields a
    /// reproducible stream.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        if self.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(self.seed.unsigned_abs())
        }
    }
}
