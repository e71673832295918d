//! Hunt orchestration
//!
//! [`Hunt`] wires the pieces together: it seeds the generator, places the
//! boss, builds the grid, scatters climbers over the lattice, runs the driver
//! and folds the per-climber peaks into a [`HuntReport`].
//!
//! Random draws happen in a fixed order so seeded runs are reproducible:
//! boss x, boss y, then `(row, col)` for each climber in id order.

use crate::climber::Climber;
use crate::config::{Bounds, HuntConfig, PRECISION, RESOLUTION};
use crate::driver::HuntDriver;
use crate::error::HuntError;
use crate::field::ManaField;
use crate::grid::ManaGrid;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// The best peak found by a hunt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestFind {
    /// Fixed-point mana at the peak
    pub mana: i32,
    /// Id of the climber that found it (earliest climber on ties)
    pub climber_id: i32,
    pub row: usize,
    pub col: usize,
    /// Real coordinates of the peak cell
    pub x: f64,
    pub y: f64,
    /// Moves the finder made
    pub steps: u32,
}

/// Statistics and result of a finished hunt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HuntReport {
    pub gate_size: i32,
    pub rows: usize,
    pub cols: usize,
    pub bounds: Bounds,
    pub num_searches: usize,
    /// Wall-clock time of the parallel search and result fold
    pub elapsed: Duration,
    /// Cache-miss evaluations (best-effort)
    pub evaluated: usize,
    /// `evaluated` as a percentage of the lattice
    pub evaluated_percent: f64,
    /// `final_values[i]` is the peak reached by climber `i + 1`
    pub final_values: Vec<i32>,
    pub best: Option<BestFind>,
}

impl HuntReport {
    /// The `Dungeon Master (...) found at: ...` line, if any climber ran.
    #[must_use]
    pub fn master_line(&self) -> Option<String> {
        self.best.map(|best| {
            format!(
                "Dungeon Master (mana {}) found at:  x={:.1} y={:.1}",
                best.mana, best.x, best.y
            )
        })
    }
}

impl fmt::Display for HuntReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds;
        writeln!(f, "\t dungeon size: {},", self.gate_size)?;
        writeln!(f, "\t rows: {}, columns: {}", self.rows, self.cols)?;
        writeln!(
            f,
            "\t x: [{:.6}, {:.6}], y: [{:.6}, {:.6}]",
            b.xmin, b.xmax, b.ymin, b.ymax
        )?;
        writeln!(f, "\t Number searches: {}", self.num_searches)?;
        writeln!(f, "\n\t time: {} ms", self.elapsed.as_millis())?;
        // Halves round up, not to even
        let percent = (self.evaluated_percent + 0.5).floor() as i64;
        writeln!(
            f,
            "\tnumber dungeon grid points evaluated: {}  ({:2}%)",
            self.evaluated, percent
        )?;
        match self.master_line() {
            Some(line) => writeln!(f, "{line}\n"),
            None => writeln!(f, "No searches were run.\n"),
        }
    }
}

/// A configured hunt, ready to run.
#[derive(Debug)]
pub struct Hunt {
    config: HuntConfig,
    grid: ManaGrid,
    climbers: Vec<Climber>,
    driver: HuntDriver,
}

impl Hunt {
    /// Build a hunt, drawing randomness from the generator the config selects.
    ///
    /// # Errors
    ///
    /// Any validation error from [`HuntConfig::validate`], or
    /// [`HuntError::TooManySearches`] if the climber count overflows an id.
    pub fn new(config: HuntConfig) -> Result<Self, HuntError> {
        config.validate()?;
        let mut rng = config.rng();
        Self::with_rng(config, &mut rng)
    }

    /// Build a hunt from an explicit generator.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_rng<R: Rng + ?Sized>(config: HuntConfig, rng: &mut R) -> Result<Self, HuntError> {
        config.validate()?;

        let field = ManaField::random(config.bounds(), rng);
        let grid = ManaGrid::new(field, RESOLUTION, PRECISION);

        let count = config.num_searches();
        let last_id = i32::try_from(count).map_err(|_| HuntError::TooManySearches(count))?;
        let climbers = (1..=last_id)
            .map(|id| {
                let row = rng.random_range(0..grid.rows());
                let col = rng.random_range(0..grid.cols());
                Climber::new(id, row, col, &grid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut driver = HuntDriver::new(config.cutoff)?;
        if let Some(workers) = config.workers {
            driver = driver.with_workers(workers)?;
        }

        info!(
            "Prepared hunt: gate {}, {}x{} grid, {} climbers",
            config.gate_size,
            grid.rows(),
            grid.cols(),
            climbers.len()
        );

        Ok(Self {
            config,
            grid,
            climbers,
            driver,
        })
    }

    #[must_use]
    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &ManaGrid {
        &self.grid
    }

    #[must_use]
    pub fn climbers(&self) -> &[Climber] {
        &self.climbers
    }

    #[must_use]
    pub fn driver(&self) -> HuntDriver {
        self.driver
    }

    /// Run every climber to its peak and summarise.
    ///
    /// The best result is the strictly largest peak; among equal peaks the
    /// climber with the smaller id wins.
    ///
    /// # Errors
    ///
    /// [`HuntError::ThreadPool`] if a dedicated pool was requested and could
    /// not be built.
    pub fn run(&mut self) -> Result<HuntReport, HuntError> {
        let start = Instant::now();
        let final_values = self.driver.hunt(&mut self.climbers, &self.grid)?;

        let top = final_values
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, i32)>, (index, &value)| match best {
                Some((_, top)) if value <= top => best,
                _ => Some((index, value)),
            });
        let elapsed = start.elapsed();

        let best = top.map(|(index, mana)| {
            let finder = &self.climbers[index];
            BestFind {
                mana,
                climber_id: finder.id(),
                row: finder.row(),
                col: finder.col(),
                x: self.grid.x_real(finder.row()),
                y: self.grid.y_real(finder.col()),
                steps: finder.steps(),
            }
        });

        let evaluated = self.grid.evaluated_count();
        info!(
            "Hunt finished in {:?}: {} evaluations, best {:?}",
            elapsed,
            evaluated,
            best.map(|b| b.mana)
        );

        Ok(HuntReport {
            gate_size: self.config.gate_size,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            bounds: self.grid.bounds(),
            num_searches: self.climbers.len(),
            elapsed,
            evaluated,
            evaluated_percent: self.grid.evaluated_fraction() * 100.0,
            final_values,
            best,
        })
    }
}
