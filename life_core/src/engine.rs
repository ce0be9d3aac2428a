// engine.rs - Generation transitions with age bookkeeping
//
// Both engines read the previous generation and write a separate next
// generation buffer, then swap it into the grid in one go.

use std::ops::{AddAssign, Range};
use std::sync::Arc;

use crate::error::{LifeError, Result};
use crate::grid::{Age, Grid};

/// Outcome counts for one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub births: usize,
    pub deaths: usize,
    pub survivors: usize,
    pub population: usize,
}

impl AddAssign for StepSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.births += rhs.births;
        self.deaths += rhs.deaths;
        self.survivors += rhs.survivors;
        self.population += rhs.population;
    }
}

/// Anything able to move a grid forward by one generation.
pub trait Transition {
    fn advance(&self, grid: &mut Grid) -> Result<StepSummary>;
}

/// Conway's rules with ages: survivors grow one older, births start at 1.
#[inline]
pub fn next_age(age: Age, live_neighbors: u8) -> Age {
    match (age > 0, live_neighbors) {
        (true, 2) | (true, 3) => age.saturating_add(1), // Survival
        (false, 3)            => 1,                     // Birth
        _                     => 0,                     // Death or stays dead
    }
}

/// Living 8-neighbours of a cell. Cells past the edge count as dead.
#[inline]
pub fn live_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let rows = row.saturating_sub(1)..=(row + 1).min(grid.height() - 1);
    let cols = col.saturating_sub(1)..=(col + 1).min(grid.width() - 1);

    let mut count = 0;
    for nr in rows {
        for nc in cols.clone() {
            if (nr, nc) != (row, col) && grid.is_alive(nr, nc) {
                count += 1;
            }
        }
    }
    count
}

/// Computes one row of the next generation into `out`.
fn step_row(grid: &Grid, row: usize, out: &mut [Age]) -> StepSummary {
    let mut summary = StepSummary::default();
    for (col, slot) in out.iter_mut().enumerate() {
        let age = grid.age(row, col);
        let next = next_age(age, live_neighbors(grid, row, col));
        match (age > 0, next > 0) {
            (true, true)   => summary.survivors += 1,
            (false, true)  => summary.births += 1,
            (true, false)  => summary.deaths += 1,
            (false, false) => {}
        }
        if next > 0 {
            summary.population += 1;
        }
        *slot = next;
    }
    summary
}

fn ensure_valid(grid: &Grid) -> Result<()> {
    if grid.width() == 0 || grid.height() == 0 {
        return Err(LifeError::InvalidGrid {
            width: grid.width(),
            height: grid.height(),
        });
    }
    Ok(())
}

/// Plain double-buffered iteration on the caller's thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialEngine;

impl Transition for SequentialEngine {
    fn advance(&self, grid: &mut Grid) -> Result<StepSummary> {
        ensure_valid(grid)?;
        let width = grid.width();
        let mut next = vec![0; grid.len()];
        let mut summary = StepSummary::default();
        for (row, out) in next.chunks_mut(width).enumerate() {
            summary += step_row(grid, row, out);
        }
        grid.replace_ages(next);
        Ok(summary)
    }
}

/// Splits the grid into row bands and runs each band as a cooperative
/// tokio task. Every task reads the same immutable snapshot and returns
/// its own rows, so no two tasks ever write the same cell.
pub struct RowTaskEngine {
    runtime: tokio::runtime::Runtime,
    bands: usize,
}

impl RowTaskEngine {
    pub fn new(bands: usize) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            runtime,
            bands: bands.max(1),
        })
    }

    pub fn bands(&self) -> usize {
        self.bands
    }
}

/// Band coroutine: yields back to the scheduler after every row.
async fn process_band(snapshot: Arc<Grid>, rows: Range<usize>) -> (usize, Vec<Age>, StepSummary) {
    let width = snapshot.width();
    let start = rows.start;
    let mut out = vec![0; rows.len() * width];
    let mut summary = StepSummary::default();
    for (row, slot) in rows.zip(out.chunks_mut(width)) {
        summary += step_row(&snapshot, row, slot);
        tokio::task::yield_now().await;
    }
    (start, out, summary)
}

impl Transition for RowTaskEngine {
    fn advance(&self, grid: &mut Grid) -> Result<StepSummary> {
        ensure_valid(grid)?;
        let width = grid.width();
        let height = grid.height();
        let band_rows = height.div_ceil(self.bands);
        let snapshot = Arc::new(grid.clone());

        let (next, summary) = self.runtime.block_on(async move {
            let mut handles = Vec::with_capacity(self.bands);
            for start in (0..height).step_by(band_rows) {
                let rows = start..(start + band_rows).min(height);
                handles.push(tokio::spawn(process_band(Arc::clone(&snapshot), rows)));
            }

            let mut next = vec![0; width * height];
            let mut summary = StepSummary::default();
            for handle in handles {
                let (start, rows, band) = handle
                    .await
                    .map_err(|err| LifeError::Worker(err.to_string()))?;
                let offset = start * width;
                next[offset..offset + rows.len()].copy_from_slice(&rows);
                summary += band;
            }
            Ok::<_, LifeError>((next, summary))
        })?;

        grid.replace_ages(next);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn advanced(rows: &[[Age; 3]]) -> Grid {
        let mut grid = Grid::from_rows(rows).unwrap();
        SequentialEngine.advance(&mut grid).unwrap();
        grid
    }

    #[test]
    fn golden_three_by_three() {
        let mut grid = Grid::from_rows(&[[1, 1, 0], [0, 1, 2], [0, 0, 0]]).unwrap();
        let summary = SequentialEngine.advance(&mut grid).unwrap();
        let expected = Grid::from_rows(&[[2, 2, 1], [1, 2, 3], [0, 0, 0]]).unwrap();
        assert_eq!(grid, expected);
        assert_eq!(
            summary,
            StepSummary {
                births: 2,
                deaths: 0,
                survivors: 4,
                population: 6
            }
        );
    }

    #[test]
    fn single_cell_world_always_dies() {
        let mut grid = Grid::from_rows(&[[7]]).unwrap();
        SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid.age(0, 0), 0);
        SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid.age(0, 0), 0);
    }

    #[test]
    fn edges_are_not_wrapped() {
        // A toroidal board would give (0,0) three neighbours via wraparound.
        let grid = Grid::from_rows(&[[0, 0, 1], [0, 0, 1], [0, 0, 1]]).unwrap();
        assert_eq!(live_neighbors(&grid, 0, 0), 0);
        assert_eq!(live_neighbors(&grid, 1, 1), 3);
        let next = advanced(&[[0, 0, 1], [0, 0, 1], [0, 0, 1]]);
        assert_eq!(next.row(1), &[0, 1, 2]);
        assert_eq!(next.age(1, 0), 0);
    }

    #[test]
    fn solitude_and_overpopulation() {
        // Centre has 8 neighbours; corners have 3 but are alive with age 4.
        let next = advanced(&[[4, 1, 4], [1, 9, 1], [4, 1, 4]]);
        assert_eq!(next.age(1, 1), 0);
        assert_eq!(next.age(0, 0), 5);
        // Edge midpoints have 5 neighbours.
        assert_eq!(next.age(0, 1), 0);

        let lonely = advanced(&[[0, 0, 0], [0, 12, 0], [0, 0, 0]]);
        assert_eq!(lonely.population(), 0);
    }

    #[test]
    fn blinker_alternates_and_ages_the_pivot() {
        let mut grid = Grid::from_rows(&[[0, 0, 0], [1, 1, 1], [0, 0, 0]]).unwrap();
        SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid, Grid::from_rows(&[[0, 1, 0], [0, 2, 0], [0, 1, 0]]).unwrap());
        SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid, Grid::from_rows(&[[0, 0, 0], [1, 3, 1], [0, 0, 0]]).unwrap());
    }

    #[test]
    fn dead_world_stays_dead() {
        let mut grid = Grid::new(16, 9).unwrap();
        let summary = SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid.population(), 0);
        assert_eq!(summary, StepSummary::default());
    }

    #[test]
    fn ages_saturate_instead_of_wrapping() {
        let mut grid = Grid::from_rows(&[[Age::MAX, Age::MAX], [Age::MAX, 0]]).unwrap();
        SequentialEngine.advance(&mut grid).unwrap();
        assert_eq!(grid.age(0, 0), Age::MAX);
        assert_eq!(grid.age(1, 1), 1);
    }

    #[test]
    fn next_age_rules() {
        assert_eq!(next_age(3, 2), 4);
        assert_eq!(next_age(3, 3), 4);
        assert_eq!(next_age(3, 1), 0);
        assert_eq!(next_age(3, 4), 0);
        assert_eq!(next_age(0, 3), 1);
        assert_eq!(next_age(0, 2), 0);
    }

    #[test]
    fn row_tasks_match_sequential() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sequential = Grid::random(37, 23, 0.4, &mut rng).unwrap();
        let mut banded = sequential.clone();
        let engine = RowTaskEngine::new(4).unwrap();

        for _ in 0..6 {
            let a = SequentialEngine.advance(&mut sequential).unwrap();
            let b = engine.advance(&mut banded).unwrap();
            assert_eq!(a, b);
            assert_eq!(sequential, banded);
        }
    }

    #[test]
    fn more_bands_than_rows() {
        let engine = RowTaskEngine::new(10).unwrap();
        let mut grid = Grid::from_rows(&[[0, 0, 0], [1, 1, 1], [0, 0, 0]]).unwrap();
        engine.advance(&mut grid).unwrap();
        assert_eq!(grid, Grid::from_rows(&[[0, 1, 0], [0, 2, 0], [0, 1, 0]]).unwrap());
    }

    #[test]
    fn alive_matches_positive_age_after_steps() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::random(20, 20, 0.35, &mut rng).unwrap();
        for _ in 0..10 {
            let before = grid.clone();
            SequentialEngine.advance(&mut grid).unwrap();
            for row in 0..grid.height() {
                for col in 0..grid.width() {
                    let age = grid.age(row, col);
                    assert_eq!(grid.is_alive(row, col), age > 0);
                    if age > 1 {
                        assert_eq!(age, before.age(row, col) + 1);
                    }
                }
            }
        }
    }
}
