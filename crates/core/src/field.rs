//! Analytic mana field
//!
//! The field is a pure function of real coordinates, parameterised only by the
//! position of a randomly placed "boss" peak. It layers several smooth
//! trigonometric ridges, a logarithmic trough along `y = 2π` and three
//! boss-centred bumps:
//!
//! - a broad Gaussian shoulder offset by `(+15, -10)` from the boss
//! - a dominant Gaussian (amplitude 8) at the boss itself
//! - a Lorentzian spike (amplitude 2) at the boss
//!
//! Evaluation is deterministic in IEEE-754 double precision, which is what lets
//! the lattice cache tolerate racing writers.

use crate::config::Bounds;
use rand::Rng;
use std::f64::consts::PI;

/// Pure scalar field over the real plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManaField {
    bounds: Bounds,
    boss_x: f64,
    boss_y: f64,
    decay_factor: f64,
}

impl ManaField {
    /// Create a field with the boss at an explicit position.
    ///
    /// # Arguments
    ///
    /// * `bounds` - Real domain the field is sampled over
    /// * `boss_x` - Boss x coordinate
    /// * `boss_y` - Boss y coordinate
    #[must_use]
    pub fn new(bounds: Bounds, boss_x: f64, boss_y: f64) -> Self {
        Self {
            bounds,
            boss_x,
            boss_y,
            decay_factor: 2.0 / (bounds.x_width() * 0.1),
        }
    }

    /// Create a field with the boss drawn uniformly from `bounds`.
    ///
    /// Draws `boss_x` then `boss_y`, in that order, so seeded runs stay
    /// reproducible when climber starts are drawn from the same stream
    /// afterwards.
    pub fn random<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> Self {
        let boss_x = bounds.xmin + bounds.x_width() * rng.random::<f64>();
        let boss_y = bounds.ymin + bounds.y_width() * rng.random::<f64>();
        Self::new(bounds, boss_x, boss_y)
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn boss(&self) -> (f64, f64) {
        (self.boss_x, self.boss_y)
    }

    /// `2 / (x_width · 0.1)`. Exposed for callers; not part of [`Self::evaluate`].
    #[must_use]
    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    /// Mana at real coordinates `(x, y)`.
    #[must_use]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.boss_x;
        let dy = y - self.boss_y;
        let distance_squared = dx * dx + dy * dy;

        let shoulder_x = x - self.boss_x - 15.0;
        let shoulder_y = y - self.boss_y + 10.0;

        2.0 * (x + 0.1 * (y / 5.0).sin() + PI / 2.0).sin()
            * ((y + 0.1 * (x / 5.0).cos() + PI / 2.0) / 2.0).cos()
            + 0.7 * ((x * 0.5) + (y * 0.3) + 0.2 * (x / 6.0).sin() + PI / 2.0).sin()
            + 0.3 * ((x * 1.5) - (y * 0.8) + 0.15 * (y / 4.0).cos()).sin()
            + -0.2 * ((y - PI * 2.0).abs() + 0.1).ln()
            + 0.5 * ((x * y) / 4.0 + 0.05 * x.sin()).sin()
            + 1.5 * ((x + y) / 5.0 + 0.1 * y.sin()).cos()
            + 3.0 * (-0.03 * (shoulder_x * shoulder_x + shoulder_y * shoulder_y)).exp()
            + 8.0 * (-0.01 * distance_squared).exp()
            + 2.0 / (1.0 + 0.05 * distance_squared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field_at_origin() -> ManaField {
        ManaField::new(Bounds::square(10.0), 0.0, 0.0)
    }

    #[test]
    fn test_decay_factor() {
        let field = field_at_origin();
        // 2 / (20 * 0.1)
        assert_relative_eq!(field.decay_factor(), 1.0);
    }

    #[test]
    fn test_evaluate_at_boss_origin() {
        let field = field_at_origin();
        let expected = 2.0 * (PI / 2.0).sin() * ((0.1 + PI / 2.0) / 2.0).cos()
            + 0.7 * (PI / 2.0).sin()
            + 0.3 * 0.15_f64.sin()
            - 0.2 * (2.0 * PI + 0.1).ln()
            + 1.5
            + 3.0 * (-0.03 * (225.0 + 100.0_f64)).exp()
            + 8.0
            + 2.0;
        assert_relative_eq!(field.evaluate(0.0, 0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let field = ManaField::new(Bounds::square(20.0), 3.25, -7.5);
        let a = field.evaluate(1.2, -3.4);
        let b = field.evaluate(1.2, -3.4);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_boss_dominates_far_field() {
        let field = ManaField::new(Bounds::square(20.0), 5.0, 5.0);
        assert!(field.evaluate(5.0, 5.0) > field.evaluate(-15.0, -15.0));
    }

    #[test]
    fn test_log_trough_is_finite() {
        let field = field_at_origin();
        assert!(field.evaluate(0.0, 2.0 * PI).is_finite());
    }

    #[test]
    fn test_random_boss_inside_bounds() {
        let bounds = Bounds::square(4.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let (bx, by) = ManaField::random(bounds, &mut rng).boss();
            assert!((bounds.xmin..bounds.xmax).contains(&bx));
            assert!((bounds.ymin..bounds.ymax).contains(&by));
        }
    }

    #[test]
    fn test_random_draw_order() {
        let bounds = Bounds::new(-2.0, 2.0, -6.0, 6.0);
        let mut rng = StdRng::seed_from_u64(11);
        let field = ManaField::random(bounds, &mut rng);

        let mut replay = StdRng::seed_from_u64(11);
        let ux: f64 = replay.random();
        let uy: f64 = replay.random();
        assert_eq!(field.boss(), (-2.0 + 4.0 * ux, -6.0 + 12.0 * uy));
    }
}
