//! Hill-climb state machine
//!
//! A [`Climber`] walks the lattice by 8-neighbour steepest ascent. Each step
//! reads the current cell, scans the eight neighbours in canonical order and
//! moves to the strictly best one. When no neighbour beats the current cell the
//! climber halts and records the terminal value.
//!
//! Every move strictly increases the climber's reading and the fixed-point
//! domain is finite, so every climber halts.

use crate::error::HuntError;
use crate::grid::ManaGrid;

/// One of the eight compass moves, or no move at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Stay,
    Left,
    Right,
    Up,
    Down,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Neighbour scan order. Earlier entries win ties.
    pub const CANONICAL: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// `(row, col)` delta of this move.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Direction::Stay => (0, 0),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }

    /// Destination of this move from `(row, col)`, if it stays on the grid.
    #[must_use]
    pub fn apply(self, grid: &ManaGrid, row: usize, col: usize) -> Option<(usize, usize)> {
        let (dr, dc) = self.offset();
        let next_row = row.checked_add_signed(dr)?;
        let next_col = col.checked_add_signed(dc)?;
        grid.contains(next_row, next_col).then_some((next_row, next_col))
    }
}

/// Steepest-ascent move from `(row, col)`.
///
/// Returns [`Direction::Stay`] when no in-bounds neighbour is strictly
/// greater than the current cell.
#[must_use]
pub fn next_direction(grid: &ManaGrid, row: usize, col: usize) -> Direction {
    climb_direction(grid, row, col, grid.get_mana(row, col))
}

fn climb_direction(grid: &ManaGrid, row: usize, col: usize, current: i32) -> Direction {
    let mut best = current;
    let mut direction = Direction::Stay;

    for candidate in Direction::CANONICAL {
        if let Some((r, c)) = candidate.apply(grid, row, col) {
            let mana = grid.get_mana(r, c);
            if mana > best {
                best = mana;
                direction = candidate;
            }
        }
    }

    direction
}

/// Result of a single [`Climber::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halt,
}

/// A single hill-climb instance.
///
/// Owned by one worker at a time; the only shared state it touches is the
/// grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Climber {
    id: i32,
    row: usize,
    col: usize,
    steps: u32,
    done: bool,
    final_value: i32,
}

impl Climber {
    /// Place a climber at `(row, col)`.
    ///
    /// # Arguments
    ///
    /// * `id` - Positive identifier, unique within a run
    /// * `row` - Start row
    /// * `col` - Start column
    /// * `grid` - Grid the climber will walk
    ///
    /// # Errors
    ///
    /// [`HuntError::InvalidClimberId`] for a non-positive id and
    /// [`HuntError::StartOutOfBounds`] for a start outside the lattice.
    pub fn new(id: i32, row: usize, col: usize, grid: &ManaGrid) -> Result<Self, HuntError> {
        if id <= 0 {
            return Err(HuntError::InvalidClimberId(id));
        }
        if !grid.contains(row, col) {
            return Err(HuntError::StartOutOfBounds {
                row,
                col,
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        Ok(Self {
            id,
            row,
            col,
            steps: 0,
            done: false,
            final_value: i32::MIN,
        })
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Mana at the terminal cell. Only meaningful once [`Self::is_done`].
    #[must_use]
    pub fn final_value(&self) -> i32 {
        self.final_value
    }

    /// Advance one move.
    ///
    /// Marks the cell being left as visited before moving. On a local
    /// maximum the climber is marked done and its terminal value recorded.
    pub fn step(&mut self, grid: &ManaGrid) -> StepOutcome {
        if self.done {
            return StepOutcome::Halt;
        }

        let current = grid.get_mana(self.row, self.col);
        let direction = climb_direction(grid, self.row, self.col, current);

        let next = match direction {
            Direction::Stay => None,
            moved => moved.apply(grid, self.row, self.col),
        };
        let Some((row, col)) = next else {
            self.done = true;
            self.final_value = current;
            return StepOutcome::Halt;
        };

        grid.set_visited(self.row, self.col, self.id);
        self.row = row;
        self.col = col;
        self.steps += 1;
        StepOutcome::Continue
    }

    /// Climb until a local maximum and return its mana.
    pub fn find_peak(&mut self, grid: &ManaGrid) -> i32 {
        while self.step(grid) == StepOutcome::Continue {}
        self.final_value
    }
}
