// input.rs - Pointer taps to grid cells

use std::time::{Duration, Instant};

use crate::grid::Grid;
use crate::viewport::{Board, MIN_SCALE};

/// Longest press that still counts as a tap rather than a drag or pinch.
pub const DEFAULT_TAP_THRESHOLD: Duration = Duration::from_millis(200);

/// A completed press/release at viewport pixel (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTap {
    pub x: f64,
    pub y: f64,
    pub pressed_at: Instant,
    pub released_at: Instant,
}

impl PointerTap {
    pub fn held_for(&self) -> Duration {
        self.released_at.saturating_duration_since(self.pressed_at)
    }
}

/// Cell under a viewport pixel. May lie outside the world.
///
/// Uses the same `MIN_SCALE` floor as the visible-rect computation.
pub fn map_click_to_cell(x: f64, y: f64, board: Board) -> (i64, i64) {
    let scale = board.scale.max(MIN_SCALE);
    let row = ((y - board.y) / scale).floor() as i64;
    let col = ((x - board.x) / scale).floor() as i64;
    (row, col)
}

/// Flips a cell: alive becomes dead, dead becomes a newborn (age 1).
pub fn toggle_cell(grid: &mut Grid, row: usize, col: usize) {
    let age = if grid.is_alive(row, col) { 0 } else { 1 };
    grid.set_age(row, col, age);
}

#[derive(Debug, Clone, Copy)]
pub struct InputMapper {
    pub tap_threshold: Duration,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self {
            tap_threshold: DEFAULT_TAP_THRESHOLD,
        }
    }
}

impl InputMapper {
    pub fn new(tap_threshold: Duration) -> Self {
        Self { tap_threshold }
    }

    pub fn is_tap(&self, tap: &PointerTap) -> bool {
        tap.held_for() < self.tap_threshold
    }

    /// Toggles the tapped cell and returns it. Long presses and taps that
    /// land outside the world do nothing.
    pub fn handle_tap(&self, grid: &mut Grid, board: Board, tap: &PointerTap) -> Option<(usize, usize)> {
        if !self.is_tap(tap) {
            return None;
        }
        let (row, col) = map_click_to_cell(tap.x, tap.y, board);
        if !grid.contains(row, col) {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        toggle_cell(grid, row, col);
        Some((row, col))
    }
}
