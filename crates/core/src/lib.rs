//! Dungeon Hunt Core Library
//!
//! A parallel stochastic hill-climbing engine over a 2D scalar "mana" field.
//! A large population of independent climbers is launched from random lattice
//! cells and races, by 8-neighbour steepest ascent, toward the global maximum.
//!
//! ## Architecture
//!
//! - [`field`]: the pure analytic mana function and its randomly placed boss peak
//! - [`grid`]: a shared, lock-free memoization lattice over the field
//! - [`climber`]: the per-climber hill-climb state machine
//! - [`driver`]: fork-join partitioning of climbers across a rayon pool
//! - [`hunt`]: orchestration (seeding, allocation, result folding, statistics)
//! - [`visualise`]: heat-map rendering of the finished lattice
//!
//! The lattice cache deliberately races: every writer of a cell computes the
//! same fixed-point value from the same pure function, so stores are relaxed
//! atomics and no locks are taken on the hot path.

pub mod climber;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod grid;
pub mod hunt;
pub mod visualise;

pub use climber::{next_direction, Climber, Direction, StepOutcome};
pub use config::{
    Bounds, HuntConfig, MAX_GRID_CELLS, PRECISION, RESOLUTION, SEQUENTIAL_CUTOFF,
};
pub use driver::HuntDriver;
pub use error::HuntError;
pub use field::ManaField;
pub use grid::{ManaGrid, UNEVALUATED, UNVISITED};
pub use hunt::{BestFind, Hunt, HuntReport};
pub use visualise::{heat_color, render_heat_map, save_heat_map};
