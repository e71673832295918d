//! Lock-free memoization lattice over the mana field
//!
//! [`ManaGrid`] samples a [`ManaField`] on an integer lattice and caches each
//! cell's fixed-point value the first time it is needed. The cache is shared
//! by every worker with no locks:
//!
//! - Each cell is a word-sized [`AtomicI32`] accessed with relaxed ordering,
//!   so a reader only ever observes [`UNEVALUATED`] or the final value.
//! - Racing workers may evaluate the same cell twice. Both compute the same
//!   bit pattern from the same pure function, so the store is idempotent.
//! - No happens-before edge is required; a worker that misses another's write
//!   simply recomputes.
//!
//! Storage is row-major: cell `(i, j)` lives at `i * cols + j`.

use crate::config::Bounds;
use crate::field::ManaField;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use tracing::debug;

/// Mana sentinel for a cell that has not been evaluated yet.
pub const UNEVALUATED: i32 = i32::MIN;

/// Visit sentinel for a cell no climber has stepped off.
pub const UNVISITED: i32 = -1;

/// Shared memoization grid.
#[derive(Debug)]
pub struct ManaGrid {
    field: ManaField,
    rows: usize,
    cols: usize,
    precision: i32,
    mana: Vec<AtomicI32>,
    visit: Vec<AtomicI32>,
    evaluated: AtomicUsize,
}

impl ManaGrid {
    /// Create an empty grid covering the field's bounds.
    ///
    /// # Arguments
    ///
    /// * `field` - Field to sample
    /// * `resolution` - Lattice cells per unit of real coordinate
    /// * `precision` - Fixed-point scale applied before truncation
    ///
    /// # Returns
    ///
    /// Grid with `round(x_width · resolution)` rows and
    /// `round(y_width · resolution)` columns, every cell unevaluated
    ///
    /// # Panics
    ///
    /// Panics if the cell count overflows `usize`. [`HuntConfig::validate`]
    /// rejects such gate sizes before a grid is built.
    ///
    /// [`HuntConfig::validate`]: crate::config::HuntConfig::validate
    #[must_use]
    pub fn new(field: ManaField, resolution: i32, precision: i32) -> Self {
        let bounds = field.bounds();
        let rows = lattice_extent(bounds.x_width(), resolution);
        let cols = lattice_extent(bounds.y_width(), resolution);
        let Some(cells) = rows.checked_mul(cols) else {
            panic!("Lattice of {rows}x{cols} cells overflows usize");
        };

        debug!(
            "Allocating {}x{} mana grid ({} cells), boss at ({:.3}, {:.3})",
            rows,
            cols,
            cells,
            field.boss().0,
            field.boss().1
        );

        Self {
            field,
            rows,
            cols,
            precision,
            mana: (0..cells).map(|_| AtomicI32::new(UNEVALUATED)).collect(),
            visit: (0..cells).map(|_| AtomicI32::new(UNVISITED)).collect(),
            evaluated: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn field(&self) -> &ManaField {
        &self.field
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.field.bounds()
    }

    /// Whether `(i, j)` lies on the lattice.
    #[inline]
    #[must_use]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.rows && j < self.cols
    }

    /// Real x coordinate of lattice row `i`.
    #[must_use]
    pub fn x_real(&self, i: usize) -> f64 {
        let bounds = self.field.bounds();
        bounds.xmin + (bounds.x_width() / self.rows as f64) * i as f64
    }

    /// Real y coordinate of lattice column `j`.
    #[must_use]
    pub fn y_real(&self, j: usize) -> f64 {
        let bounds = self.field.bounds();
        bounds.ymin + (bounds.y_width() / self.cols as f64) * j as f64
    }

    /// Fixed-point mana at `(i, j)`, evaluating the field on a cache miss.
    ///
    /// The returned value is always `trunc(precision · f(x_real(i), y_real(j)))`
    /// no matter how many workers race on the cell.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside the lattice.
    #[must_use]
    pub fn get_mana(&self, i: usize, j: usize) -> i32 {
        let slot = &self.mana[self.index_of(i, j)];
        let cached = slot.load(Ordering::Relaxed);
        if cached != UNEVALUATED {
            return cached;
        }

        let value = self.compute(i, j);
        slot.store(value, Ordering::Relaxed);
        self.evaluated.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Cached value at `(i, j)` without evaluating.
    #[must_use]
    pub fn peek(&self, i: usize, j: usize) -> Option<i32> {
        match self.mana[self.index_of(i, j)].load(Ordering::Relaxed) {
            UNEVALUATED => None,
            value => Some(value),
        }
    }

    /// True once any climber has stepped off `(i, j)`.
    #[must_use]
    pub fn visited(&self, i: usize, j: usize) -> bool {
        self.visit[self.index_of(i, j)].load(Ordering::Relaxed) != UNVISITED
    }

    /// Id of the last climber to step off `(i, j)`, if any.
    #[must_use]
    pub fn visitor(&self, i: usize, j: usize) -> Option<i32> {
        match self.visit[self.index_of(i, j)].load(Ordering::Relaxed) {
            UNVISITED => None,
            id => Some(id),
        }
    }

    /// Record `climber_id` on `(i, j)`. Last writer wins.
    pub fn set_visited(&self, i: usize, j: usize, climber_id: i32) {
        self.visit[self.index_of(i, j)].store(climber_id, Ordering::Relaxed);
    }

    /// Number of cache-miss evaluations performed so far.
    #[must_use]
    pub fn evaluated_count(&self) -> usize {
        self.evaluated.load(Ordering::Relaxed)
    }

    /// Number of cells currently holding a value.
    #[must_use]
    pub fn evaluated_cells(&self) -> usize {
        self.mana
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed) != UNEVALUATED)
            .count()
    }

    /// `evaluated_count / (rows · cols)`.
    #[must_use]
    pub fn evaluated_fraction(&self) -> f64 {
        let cells = self.rows * self.cols;
        if cells == 0 {
            return 0.0;
        }
        self.evaluated_count() as f64 / cells as f64
    }

    /// Smallest and largest cached values, or `None` if nothing is cached.
    #[must_use]
    pub fn value_range(&self) -> Option<(i32, i32)> {
        self.mana
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .filter(|&value| value != UNEVALUATED)
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    fn compute(&self, i: usize, j: usize) -> i32 {
        let mana = self.field.evaluate(self.x_real(i), self.y_real(j));
        // Saturating truncation toward zero
        (f64::from(self.precision) * mana) as i32
    }

    #[inline]
    fn index_of(&self, i: usize, j: usize) -> usize {
        assert!(self.contains(i, j), "Coordinates out of bounds");
        i * self.cols + j
    }
}

fn lattice_extent(width: f64, resolution: i32) -> usize {
    let extent = (width * f64::from(resolution)).round();
    if extent <= 0.0 {
        0
    } else {
        extent as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PRECISION, RESOLUTION};
    use approx::assert_relative_eq;
    use std::thread;

    fn small_grid() -> ManaGrid {
        let field = ManaField::new(Bounds::square(1.0), 0.3, -0.4);
        ManaGrid::new(field, RESOLUTION, PRECISION)
    }

    fn expected(grid: &ManaGrid, i: usize, j: usize) -> i32 {
        let mana = grid.field().evaluate(grid.x_real(i), grid.y_real(j));
        (f64::from(PRECISION) * mana).trunc() as i32
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = small_grid();
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 10);
        assert_eq!(grid.evaluated_count(), 0);
        assert_eq!(grid.evaluated_cells(), 0);
        assert!(grid.value_range().is_none());
    }

    #[test]
    fn test_lattice_mapping_divides_by_extent() {
        let grid = small_grid();
        assert_relative_eq!(grid.x_real(0), -1.0);
        assert_relative_eq!(grid.x_real(5), 0.0, epsilon = 1e-12);
        // Divisor is rows, not rows - 1: the last row never reaches xmax
        assert_relative_eq!(grid.x_real(9), 0.8, epsilon = 1e-12);
        assert_relative_eq!(grid.y_real(1), -0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_get_mana_caches() {
        let grid = small_grid();
        let first = grid.get_mana(3, 4);
        assert_eq!(grid.evaluated_count(), 1);

        let second = grid.get_mana(3, 4);
        assert_eq!(first, second);
        assert_eq!(grid.evaluated_count(), 1);
        assert_eq!(grid.peek(3, 4), Some(first));
        assert_eq!(grid.peek(4, 3), None);
        assert_eq!(first, expected(&grid, 3, 4));
    }

    #[test]
    fn test_truncation_toward_zero() {
        let grid = small_grid();
        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                let value = grid.get_mana(i, j);
                let scaled =
                    f64::from(PRECISION) * grid.field().evaluate(grid.x_real(i), grid.y_real(j));
                assert!(f64::from(value).abs() <= scaled.abs());
                assert!((scaled - f64::from(value)).abs() < 1.0);
            }
        }
        assert_eq!(grid.evaluated_cells(), 100);
        assert_eq!(grid.evaluated_count(), 100);
    }

    #[test]
    fn test_visit_tracking() {
        let grid = small_grid();
        assert!(!grid.visited(2, 2));
        assert_eq!(grid.visitor(2, 2), None);

        grid.set_visited(2, 2, 7);
        grid.set_visited(2, 2, 9);
        assert!(grid.visited(2, 2));
        assert_eq!(grid.visitor(2, 2), Some(9));
    }

    #[test]
    fn test_value_range_and_fraction() {
        let grid = small_grid();
        let a = grid.get_mana(0, 0);
        let b = grid.get_mana(9, 9);
        assert_eq!(grid.value_range(), Some((a.min(b), a.max(b))));
        assert_relative_eq!(grid.evaluated_fraction(), 0.02);
    }

    #[test]
    fn test_concurrent_reads_agree() {
        let grid = small_grid();
        let results: Vec<Vec<i32>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let mut seen = Vec::with_capacity(100);
                        for i in 0..grid.rows() {
                            for j in 0..grid.cols() {
                                seen.push(grid.get_mana(i, j));
                            }
                        }
                        seen
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("worker panicked"))
                .collect()
        });

        for seen in &results {
            assert_eq!(seen, &results[0]);
        }
        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                assert_eq!(grid.peek(i, j), Some(expected(&grid, i, j)));
            }
        }
        let count = grid.evaluated_count();
        assert!(count >= grid.evaluated_cells());
        assert!(count <= grid.rows() * grid.cols() * 8);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_out_of_bounds_panics() {
        let grid = small_grid();
        let _ = grid.get_mana(0, 10);
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn test_overflowing_lattice_panics() {
        let field = ManaField::new(Bounds::square(f64::from(i32::MAX)), 0.0, 0.0);
        let _ = ManaGrid::new(field, RESOLUTION, PRECISION);
    }
}
