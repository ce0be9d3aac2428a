// simulation.rs - The driver: owns the live grid and sequences
// render -> advance on every tick

use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::engine::{RowTaskEngine, SequentialEngine, StepSummary, Transition};
use crate::error::{LifeError, Result};
use crate::grid::Grid;
use crate::input::{InputMapper, PointerTap};
use crate::patterns::{self, PATTERNS};
use crate::render::{self, FrameEncoder, Placement, RenderFrame, ScreenRect};
use crate::viewport::{self, Board, Viewport, VisibleRect};
use crate::color::Palette;

/// An encoded frame plus what the caller needs to put it on screen.
#[derive(Debug, Clone)]
pub struct EncodedFrame<T> {
    pub output: T,
    pub width: usize,
    pub height: usize,
    pub placement: Placement,
}

impl<T> EncodedFrame<T> {
    pub fn screen_rect(&self, board: Board) -> ScreenRect {
        self.placement.screen_rect(board, self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct TickReport<T> {
    /// `None` when the tick was dropped or nothing was visible.
    pub frame: Option<EncodedFrame<T>>,
    pub steps: u32,
    pub last_step: Option<StepSummary>,
    pub render_time: Duration,
    pub compute_time: Duration,
    pub population: usize,
    pub generation: u64,
    pub halted_on_cycle: bool,
}

impl<T> TickReport<T> {
    fn dropped(population: usize, generation: u64) -> Self {
        Self {
            frame: None,
            steps: 0,
            last_step: None,
            render_time: Duration::ZERO,
            compute_time: Duration::ZERO,
            population,
            generation,
            halted_on_cycle: false,
        }
    }

    pub fn total_time(&self) -> Duration {
        self.render_time + self.compute_time
    }
}

pub struct Simulation {
    config: SimulationConfig,
    grid: Option<Grid>,
    initial: Option<Grid>,  // What restarts go back to
    engine: Box<dyn Transition>,
    input: InputMapper,
    rng: StdRng,

    viewport: Viewport,
    board: Board,
    visible: VisibleRect,

    running: bool,
    paused: bool,
    generation: u64,
    history: VecDeque<u64>,
    dirty: bool,
}

impl Simulation {
    /// A simulation with an empty world of `config.world_size` bound.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut sim = Self::unbound(config)?;
        sim.setup_world()?;
        Ok(sim)
    }

    /// A simulation with no world bound yet. Rendering and stepping report
    /// `MissingGrid` until `setup_world` or `start` binds one.
    pub fn unbound(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let engine: Box<dyn Transition> = if config.row_tasks > 0 {
            Box::new(RowTaskEngine::new(config.row_tasks)?)
        } else {
            Box::new(SequentialEngine)
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let side = config.world_size as f64;

        Ok(Self {
            input: InputMapper::new(config.tap_threshold),
            viewport: Viewport::new(side, side),
            board: Board::default(),
            visible: VisibleRect::full(config.world_size),
            config,
            grid: None,
            initial: None,
            engine,
            rng,
            running: false,
            paused: false,
            generation: 0,
            history: VecDeque::new(),
            dirty: true,
        })
    }

    // World lifecycle

    /// Binds a fresh copy of the initial grid, or an empty one if there is
    /// none or the world size changed since it was made.
    pub fn setup_world(&mut self) -> Result<()> {
        let size = self.config.world_size;
        let initial = match self.initial.take() {
            Some(grid) if grid.width() == size && grid.height() == size => grid,
            _ => Grid::square(size)?,
        };
        self.grid = Some(initial.clone());
        self.initial = Some(initial);
        self.generation = 0;
        self.history.clear();
        self.remember_generation();
        self.dirty = true;
        self.refresh_visible()?;
        info!(world_size = size, population = self.population(), "World set up");
        Ok(())
    }

    /// Drops the live world. The initial grid is kept for the next setup.
    pub fn unbind(&mut self) {
        info!(generation = self.generation, "Unbinding world");
        self.grid = None;
        self.history.clear();
        self.dirty = true;
    }

    pub fn restart(&mut self) -> Result<()> {
        info!("Restarting");
        self.setup_world()
    }

    /// New random initial world, applied immediately.
    pub fn randomize(&mut self) -> Result<()> {
        let size = self.config.world_size;
        let grid = Grid::random(size, size, self.config.random_density, &mut self.rng)?;
        info!(density = self.config.random_density, "Randomized world");
        self.initial = Some(grid);
        self.setup_world()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.initial = Some(Grid::square(self.config.world_size)?);
        info!("Cleared world");
        self.setup_world()
    }

    /// Discards the current world and starts over with an empty one of the
    /// new size, centred in the viewport.
    pub fn resize(&mut self, world_size: usize) -> Result<()> {
        if world_size == 0 {
            return Err(LifeError::InvalidWorldSize(world_size));
        }
        info!(from = self.config.world_size, to = world_size, "Resizing world");
        self.config.world_size = world_size;
        self.initial = None;
        self.setup_world()?;
        self.center_view()
    }

    /// Replaces the world with the indexed pattern, centred.
    pub fn apply_pattern(&mut self, index: usize) -> Result<()> {
        let pattern = PATTERNS
            .get(index)
            .ok_or_else(|| LifeError::InvalidConfig(format!("no pattern #{index}")))?;
        let mut grid = Grid::square(self.config.world_size)?;
        patterns::stamp_centered(&mut grid, pattern);
        info!(pattern = pattern.name, "Applied pattern");
        self.initial = Some(grid);
        self.setup_world()
    }

    // Run state

    pub fn start(&mut self) -> Result<()> {
        if self.grid.is_none() {
            self.setup_world()?;
        }
        info!("Start");
        self.running = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        info!(generation = self.generation, "Stop");
        self.running = false;
        // The last tick advanced past the frame it showed.
        self.dirty = true;
    }

    pub fn set_paused(&mut self, paused: bool) {
        debug!(paused, "Pause toggled");
        self.paused = paused;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_frames_per_second(&mut self, fps: u32) {
        self.config.frames_per_second = fps.max(1);
    }

    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.config.steps_per_frame = steps;
    }

    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        palette.validate()?;
        self.config.palette = palette;
        self.dirty = true;
        Ok(())
    }

    // View geometry

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.refresh_visible()?;
        }
        Ok(())
    }

    /// Takes a settled board snapshot from the pan/zoom widget.
    pub fn set_board(&mut self, board: Board) -> Result<()> {
        if self.board != board {
            self.board = board;
            self.refresh_visible()?;
        }
        Ok(())
    }

    pub fn center_view(&mut self) -> Result<()> {
        self.board = viewport::center_board(self.viewport, self.config.world_size)?;
        self.refresh_visible()
    }

    fn refresh_visible(&mut self) -> Result<()> {
        self.visible = viewport::compute_visible_rect(self.viewport, self.board, self.config.world_size)?;
        self.dirty = true;
        Ok(())
    }

    // Frames and generations

    pub fn render_frame(&mut self) -> Result<RenderFrame> {
        let grid = self.grid.as_ref().ok_or(LifeError::MissingGrid)?;
        let frame = render::render(grid, &self.visible, &self.config.palette, self.config.pixel_format)?;
        self.dirty = false;
        Ok(frame)
    }

    pub fn render<E: FrameEncoder>(&mut self, encoder: &mut E) -> Result<EncodedFrame<E::Output>> {
        let frame = self.render_frame()?;
        Ok(EncodedFrame {
            output: frame.encode_with(encoder),
            width: frame.width,
            height: frame.height,
            placement: frame.placement,
        })
    }

    /// Advances one generation regardless of run state.
    pub fn step(&mut self) -> Result<StepSummary> {
        let grid = self.grid.as_mut().ok_or(LifeError::MissingGrid)?;
        let summary = self.engine.advance(grid)?;
        self.generation += 1;
        self.dirty = true;
        Ok(summary)
    }

    /// One animation tick: render the current generation, then advance
    /// `steps_per_frame` times unless paused. Dropped when not running.
    ///
    /// Generations produced here are left for the next tick to draw, so a
    /// rendered tick leaves the view clean while the run continues.
    pub fn tick<E: FrameEncoder>(&mut self, encoder: &mut E) -> Result<TickReport<E::Output>> {
        if !self.running {
            return Ok(TickReport::dropped(self.population(), self.generation));
        }
        if self.grid.is_none() {
            return Err(LifeError::MissingGrid);
        }

        let started = Instant::now();
        let frame = match self.render(encoder) {
            Ok(frame) => Some(frame),
            Err(err) if err.is_benign() => {
                debug!(%err, "Skipping frame");
                None
            }
            Err(err) => return Err(err),
        };
        let render_time = started.elapsed();

        let compute_started = Instant::now();
        let mut steps = 0;
        let mut last_step = None;
        let mut halted_on_cycle = false;
        if !self.paused {
            for _ in 0..self.config.steps_per_frame {
                last_step = Some(self.step()?);
                steps += 1;
                if self.config.halt_on_cycle && self.detect_cycle() {
                    info!(generation = self.generation, "Cycle detected, stopping");
                    self.running = false;
                    halted_on_cycle = true;
                    break;
                }
            }
        }
        let compute_time = compute_started.elapsed();
        if frame.is_some() && self.running {
            self.dirty = false;
        }

        let report = TickReport {
            frame,
            steps,
            last_step,
            render_time,
            compute_time,
            population: self.population(),
            generation: self.generation,
            halted_on_cycle,
        };
        let total = report.total_time();
        if total > self.config.slow_tick_threshold {
            warn!(
                render_ms = render_time.as_millis() as u64,
                compute_ms = compute_time.as_millis() as u64,
                total_ms = total.as_millis() as u64,
                population = report.population,
                "Slow tick"
            );
        } else {
            debug!(
                render_ms = render_time.as_millis() as u64,
                compute_ms = compute_time.as_millis() as u64,
                population = report.population,
                generation = report.generation,
                "Tick"
            );
        }
        Ok(report)
    }

    /// Toggles the tapped cell using the current board placement.
    pub fn tap(&mut self, tap: &PointerTap) -> Option<(usize, usize)> {
        let grid = self.grid.as_mut()?;
        let cell = self.input.handle_tap(grid, self.board, tap)?;
        debug!(row = cell.0, col = cell.1, "Toggled cell");
        self.history.clear();
        self.dirty = true;
        Some(cell)
    }

    /// Time to wait before the next tick given how long this one took.
    pub fn next_tick_delay(&self, elapsed: Duration) -> Duration {
        self.config.frame_interval().saturating_sub(elapsed)
    }

    // Cycle detection over hashes of the alive mask. Extinct worlds are
    // never reported, so the user can keep drawing into a running board.

    fn hash_grid(&self) -> Option<u64> {
        let grid = self.grid.as_ref()?;
        let mut hasher = DefaultHasher::new();
        grid.alive_mask().hash(&mut hasher);
        Some(hasher.finish())
    }

    fn remember_generation(&mut self) {
        if let Some(hash) = self.hash_grid() {
            self.history.push_back(hash);
            while self.history.len() > self.config.cycle_history.max(1) {
                self.history.pop_front();
            }
        }
    }

    fn detect_cycle(&mut self) -> bool {
        if self.population() == 0 {
            self.history.clear();
            return false;
        }
        match self.hash_grid() {
            Some(hash) if self.history.contains(&hash) => true,
            Some(_) => {
                self.remember_generation();
                false
            }
            None => false,
        }
    }

    // Accessors

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn population(&self) -> usize {
        self.grid.as_ref().map(Grid::population).unwrap_or(0)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn visible_rect(&self) -> VisibleRect {
        self.visible
    }
}
