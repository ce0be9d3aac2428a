// lib.rs - Game of Life with cell ages, rendered through a pannable,
// zoomable viewport
//
// Leaf modules first: grid -> engine; viewport -> render; input toggles
// cells directly. `simulation` owns the single live grid and sequences
// render -> advance on each tick.

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod input;
pub mod patterns;
pub mod render;
pub mod simulation;
pub mod viewport;

pub use color::{Palette, Rgb};
pub use config::SimulationConfig;
pub use engine::{RowTaskEngine, SequentialEngine, StepSummary, Transition};
pub use error::{LifeError, Result};
pub use grid::{Age, Grid};
pub use input::{InputMapper, PointerTap, map_click_to_cell, toggle_cell};
pub use patterns::{PATTERNS, Pattern};
pub use render::{FrameEncoder, MAX_RENDER_PIXELS, PixelFormat, Placement, RenderFrame, ScreenRect};
pub use simulation::{EncodedFrame, Simulation, TickReport};
pub use viewport::{Board, Viewport, VisibleRect, center_board, compute_visible_rect};
