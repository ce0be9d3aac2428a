// viewport.rs - Screen pixels <-> panned/zoomed board <-> grid cells
//
// The board is the whole world drawn at `scale` pixels per cell with its
// top-left corner at (x, y) relative to the viewport origin.

use crate::error::{LifeError, Result};

/// Extra cells kept around the visible area, as a share of the larger
/// viewport side. The board position is only reported once a pan gesture
/// ends, so without this margin the edges clip while the user drags.
pub const PADDING_RATIO: f64 = 0.05;

/// Share of the viewport width a freshly centred world occupies.
pub const CENTERED_FILL: f64 = 0.7;

/// Smallest pixels-per-cell factor accepted from the pan/zoom widget.
pub const MIN_SCALE: f64 = 1e-3;

/// Visible window size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Board placement as reported by the pan/zoom widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Board {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Board {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl Board {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    pub fn panned(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Zooms by `factor` while keeping the screen point (px, py) over the
    /// same board location.
    pub fn zoomed_about(self, px: f64, py: f64, factor: f64) -> Self {
        let scale = (self.scale * factor).max(MIN_SCALE);
        let applied = scale / self.scale;
        Self {
            x: px - (px - self.x) * applied,
            y: py - (py - self.y) * applied,
            scale,
        }
    }

    /// Size of the whole board on screen.
    pub fn extent(&self, world_size: usize) -> f64 {
        world_size as f64 * self.scale
    }
}

/// Cell-index bounds of the visible part of the world, padding included.
/// `bottom`/`right` are exclusive. A board that is entirely off screen
/// yields a non-positive width or height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRect {
    pub top: i64,
    pub left: i64,
    pub bottom: i64,
    pub right: i64,
    pub padding: i64,
}

impl VisibleRect {
    /// The whole world, unpadded.
    pub fn full(world_size: usize) -> Self {
        let size = world_size as i64;
        Self {
            top: 0,
            left: 0,
            bottom: size,
            right: size,
            padding: 0,
        }
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Clamps the rectangle to a `width` x `height` grid.
    pub fn clamped(&self, width: usize, height: usize) -> Self {
        let (w, h) = (width as i64, height as i64);
        Self {
            top: self.top.clamp(0, h),
            left: self.left.clamp(0, w),
            bottom: self.bottom.clamp(0, h),
            right: self.right.clamp(0, w),
            padding: self.padding,
        }
    }
}

/// Works out which cells of a `world_size` square world are on screen.
///
/// Edges round outward (floor for top/left, ceil for bottom/right) so a
/// partially visible cell is always included, then the rectangle grows by
/// the padding margin without leaving the world.
pub fn compute_visible_rect(
    viewport: Viewport,
    board: Board,
    world_size: usize,
) -> Result<VisibleRect> {
    if world_size == 0 {
        return Err(LifeError::InvalidWorldSize(world_size));
    }

    let size = world_size as i64;
    let scale = board.scale.max(MIN_SCALE);
    let extent = world_size as f64 * scale;

    let mut top = 0;
    let mut bottom = size;
    let mut left = 0;
    let mut right = size;

    if board.y < 0.0 {
        top = (-board.y / scale).floor() as i64;
    }
    if board.y + extent > viewport.height {
        bottom = ((viewport.height - board.y) / scale).ceil() as i64;
    }
    if board.x < 0.0 {
        left = (-board.x / scale).floor() as i64;
    }
    if board.x + extent > viewport.width {
        right = ((viewport.width - board.x) / scale).ceil() as i64;
    }

    let padding = (viewport.height.max(viewport.width) / scale * PADDING_RATIO).ceil() as i64;

    top = if top > padding { top - padding } else { 0 };
    bottom = if bottom < size - padding { bottom + padding } else { size };
    left = if left > padding { left - padding } else { 0 };
    right = if right < size - padding { right + padding } else { size };

    Ok(VisibleRect {
        top,
        left,
        bottom,
        right,
        padding,
    })
}

/// Board placement that centres the world horizontally and vertically,
/// filling `CENTERED_FILL` of the viewport width.
pub fn center_board(viewport: Viewport, world_size: usize) -> Result<Board> {
    if world_size == 0 {
        return Err(LifeError::InvalidWorldSize(world_size));
    }
    let size = world_size as f64;
    let scale = (viewport.width / size * CENTERED_FILL).max(MIN_SCALE);
    Ok(Board {
        x: (viewport.width - size * scale) / 2.0,
        y: (viewport.height - size * scale) / 2.0,
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    #[test]
    fn zero_world_is_rejected() {
        let result = compute_visible_rect(Viewport::new(100.0, 100.0), Board::default(), 0);
        assert!(matches!(result, Err(LifeError::InvalidWorldSize(0))));
    }

    #[test]
    fn board_inside_viewport_is_not_cropped() {
        let rect = compute_visible_rect(
            Viewport::new(400.0, 400.0),
            Board::new(10.0, 10.0, 2.0),
            100,
        )
        .unwrap();
        assert_eq!((rect.top, rect.left, rect.bottom, rect.right), (0, 0, 100, 100));
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 100);
    }

    #[test]
    fn partial_view_is_cropped_and_padded() {
        let rect = compute_visible_rect(
            Viewport::new(100.0, 100.0),
            Board::new(-50.0, -30.0, 1.0),
            1000,
        )
        .unwrap();
        assert_eq!(rect.padding, 5);
        assert_eq!((rect.top, rect.bottom), (25, 135));
        assert_eq!((rect.left, rect.right), (45, 155));
    }

    #[test]
    fn zoomed_in_view_uses_cell_units() {
        let rect = compute_visible_rect(
            Viewport::new(200.0, 100.0),
            Board::new(-200.0, -400.0, 4.0),
            500,
        )
        .unwrap();
        // Unpadded: rows 100..125, cols 50..100; padding ceil(2.5) = 3.
        assert_eq!(rect.padding, 3);
        assert_eq!((rect.top, rect.bottom), (97, 128));
        assert_eq!((rect.left, rect.right), (47, 103));
    }

    #[test]
    fn partially_visible_cells_are_kept() {
        let rect = compute_visible_rect(
            Viewport::new(40.0, 40.0),
            Board::new(0.0, -10.5, 4.0),
            1000,
        )
        .unwrap();
        // Row 2 spans screen y -2.5..1.5, so it must stay in.
        assert_eq!(rect.top + rect.padding, 2);
    }

    #[test]
    fn padding_is_clamped_to_the_world() {
        let rect = compute_visible_rect(
            Viewport::new(100.0, 100.0),
            Board::new(-2.0, -2.0, 1.0),
            50,
        )
        .unwrap();
        assert_eq!(rect.top, 0);
        assert_eq!(rect.left, 0);
        assert_eq!(rect.bottom, 50);
        assert_eq!(rect.right, 50);
    }

    #[test]
    fn off_screen_board_is_empty() {
        let viewport = Viewport::new(800.0, 600.0);
        for board in [
            Board::new(0.0, -10_000.0, 1.0),
            Board::new(0.0, 10_000.0, 1.0),
            Board::new(-10_000.0, 0.0, 1.0),
            Board::new(10_000.0, 0.0, 1.0),
        ] {
            let rect = compute_visible_rect(viewport, board, 200).unwrap();
            assert!(rect.is_empty(), "{board:?} gave {rect:?}");
        }
    }

    #[test]
    fn clamped_stays_inside_grid() {
        let rect = VisibleRect {
            top: -4,
            left: 3,
            bottom: 90,
            right: 12,
            padding: 1,
        };
        let clamped = rect.clamped(10, 50);
        assert_eq!((clamped.top, clamped.left, clamped.bottom, clamped.right), (0, 3, 50, 10));
    }

    #[test]
    fn centred_board_fills_seventy_percent() {
        let board = center_board(Viewport::new(1000.0, 800.0), 200).unwrap();
        assert!(approx_eq(board.scale, 3.5));
        assert!(approx_eq(board.x, 150.0));
        assert!(approx_eq(board.y, 50.0));
        let rect = compute_visible_rect(Viewport::new(1000.0, 800.0), board, 200).unwrap();
        assert_eq!(rect.width(), 200);
        assert_eq!(rect.height(), 200);
    }

    #[test]
    fn zoom_keeps_focus_point_fixed() {
        let board = Board::new(20.0, -40.0, 2.0);
        let zoomed = board.zoomed_about(100.0, 60.0, 1.5);
        assert!(approx_eq(zoomed.scale, 3.0));
        // Board location under (100, 60) before and after.
        let before = ((100.0 - board.x) / board.scale, (60.0 - board.y) / board.scale);
        let after = ((100.0 - zoomed.x) / zoomed.scale, (60.0 - zoomed.y) / zoomed.scale);
        assert!(approx_eq(before.0, after.0));
        assert!(approx_eq(before.1, after.1));
    }

    #[test]
    fn pan_moves_only_position() {
        let board = Board::new(1.0, 2.0, 3.0).panned(-5.0, 4.0);
        assert_eq!(board, Board::new(-4.0, 6.0, 3.0));
    }
}
