// config.rs - Simulation settings and their defaults

use std::time::Duration;

use crate::color::Palette;
use crate::error::{LifeError, Result};
use crate::input::DEFAULT_TAP_THRESHOLD;
use crate::render::PixelFormat;

pub const DEFAULT_WORLD_SIZE: usize = 200;            // Cells per side
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 20;
pub const DEFAULT_RANDOM_DENSITY: f64 = 1.0 / 3.0;    // ~33% of cells start alive

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub world_size: usize,
    pub frames_per_second: u32,
    pub steps_per_frame: u32,
    pub random_density: f64,
    /// Fixed seed for reproducible randomization; entropy when `None`.
    pub seed: Option<u64>,
    pub palette: Palette,
    pub pixel_format: PixelFormat,
    pub tap_threshold: Duration,
    /// 0 runs the sequential engine, n > 0 splits rows into n concurrent tasks.
    pub row_tasks: usize,
    pub halt_on_cycle: bool,
    pub cycle_history: usize,
    /// Ticks slower than this get their timings logged at warn level.
    pub slow_tick_threshold: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_size: DEFAULT_WORLD_SIZE,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            steps_per_frame: 1,
            random_density: DEFAULT_RANDOM_DENSITY,
            seed: None,
            palette: Palette::default(),
            pixel_format: PixelFormat::Rgb,
            tap_threshold: DEFAULT_TAP_THRESHOLD,
            row_tasks: 0,
            halt_on_cycle: true,
            cycle_history: 10,
            slow_tick_threshold: Duration::from_millis(100),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.world_size == 0 {
            return Err(LifeError::InvalidWorldSize(self.world_size));
        }
        if self.frames_per_second == 0 {
            return Err(LifeError::InvalidConfig("frames_per_second must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.random_density) {
            return Err(LifeError::InvalidConfig(format!(
                "random_density {} is not a probability",
                self.random_density
            )));
        }
        self.palette.validate()
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.frames_per_second.max(1) as u64)
    }
}
