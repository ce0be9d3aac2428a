// error.rs - Error taxonomy shared by every life_core component

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LifeError>;

/// Conditions surfaced to the simulation driver. None of them are fatal to
/// the process; at worst they cost the current tick.
#[derive(Debug, Error)]
pub enum LifeError {
    #[error("invalid grid dimensions {width}x{height}: both must be at least 1")]
    InvalidGrid { width: usize, height: usize },
    #[error("invalid world size {0}: must be greater than zero")]
    InvalidWorldSize(usize),
    #[error("nothing visible: the board is outside the viewport")]
    NothingVisible,
    #[error("no grid is bound")]
    MissingGrid,
    #[error("age buffer holds {actual} cells, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("invalid colour `{0}`: expected #RRGGBB")]
    InvalidColor(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("row task runtime failed to start: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("row task failed: {0}")]
    Worker(String),
}

impl LifeError {
    /// `NothingVisible` only means "skip this frame".
    pub fn is_benign(&self) -> bool {
        matches!(self, LifeError::NothingVisible)
    }
}
