// grid.rs - Age grid for the Game of Life
//
// Every cell stores an age: 0 is dead, n >= 1 is alive for n consecutive
// generations (the current one included).

use rand::Rng;

use crate::error::{LifeError, Result};

pub type Age = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    ages: Vec<Age>, // Row-major, width * height
}

impl Grid {
    /// Zero-filled (all dead) grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            ages: vec![0; width * height],
        })
    }

    pub fn square(size: usize) -> Result<Self> {
        Self::new(size, size)
    }

    pub fn from_ages(width: usize, height: usize, ages: Vec<Age>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height;
        if ages.len() != expected {
            return Err(LifeError::ShapeMismatch {
                expected,
                actual: ages.len(),
            });
        }
        Ok(Self { width, height, ages })
    }

    /// Builds a grid from nested rows, mostly useful for fixtures.
    pub fn from_rows<const W: usize>(rows: &[[Age; W]]) -> Result<Self> {
        let ages: Vec<Age> = rows.iter().flatten().copied().collect();
        Self::from_ages(W, rows.len(), ages)
    }

    /// Each cell is independently alive with probability `density`; living
    /// cells start at age 1.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        let density = density.clamp(0.0, 1.0);
        for age in grid.ages.iter_mut() {
            *age = if rng.random_bool(density) { 1 } else { 0 };
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    #[inline]
    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    #[inline]
    pub fn age(&self, row: usize, col: usize) -> Age {
        self.ages[self.index(row, col)]
    }

    #[inline]
    pub fn set_age(&mut self, row: usize, col: usize, age: Age) {
        let idx = self.index(row, col);
        self.ages[idx] = age;
    }

    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.age(row, col) > 0
    }

    pub fn ages(&self) -> &[Age] {
        &self.ages
    }

    pub fn row(&self, row: usize) -> &[Age] {
        let start = row * self.width;
        &self.ages[start..start + self.width]
    }

    pub fn clear(&mut self) {
        self.ages.fill(0);
    }

    pub fn population(&self) -> usize {
        self.ages.iter().filter(|&&age| age > 0).count()
    }

    pub fn alive_mask(&self) -> Vec<bool> {
        self.ages.iter().map(|&age| age > 0).collect()
    }

    /// Swaps in a freshly computed generation of the same shape.
    pub(crate) fn replace_ages(&mut self, ages: Vec<Age>) {
        debug_assert_eq!(ages.len(), self.ages.len());
        self.ages = ages;
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LifeError::InvalidGrid { width, height });
    }
    Ok(())
}
