// pan_zoom.rs - Board placement driven by drag and scroll gestures
//
// `live` follows the pointer every frame; `settled` is what the simulation
// is told about, and only moves once a drag ends (zooms settle at once).

use life_core::Board;

/// Scroll points per e-fold of zoom.
const ZOOM_SENSITIVITY: f32 = 0.002;

#[derive(Debug, Clone, Default)]
pub struct PanZoom {
    live: Board,
    settled: Board,
    panning: bool,
}

impl PanZoom {
    pub fn reset(&mut self, board: Board) {
        self.live = board;
        self.settled = board;
        self.panning = false;
    }

    pub fn live(&self) -> Board {
        self.live
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    pub fn drag(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.live = self.live.panned(dx as f64, dy as f64);
        self.panning = true;
    }

    /// Ends a drag; returns the board to report, if it moved.
    pub fn end_drag(&mut self) -> Option<Board> {
        let was_panning = std::mem::take(&mut self.panning);
        if !was_panning || self.live == self.settled {
            return None;
        }
        self.settled = self.live;
        Some(self.settled)
    }

    /// Zooms about viewport point (x, y) for a vertical scroll amount.
    pub fn scroll_zoom(&mut self, x: f32, y: f32, scroll: f32) -> Board {
        let factor = (scroll * ZOOM_SENSITIVITY).exp() as f64;
        self.live = self.live.zoomed_about(x as f64, y as f64, factor);
        self.settled = self.live;
        self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_settles_only_on_release() {
        let mut pz = PanZoom::default();
        pz.reset(Board::new(10.0, 10.0, 2.0));
        pz.drag(5.0, -3.0);
        pz.drag(5.0, 0.0);
        assert!(pz.is_panning());
        assert_eq!(pz.live(), Board::new(20.0, 7.0, 2.0));
        assert_eq!(pz.end_drag(), Some(Board::new(20.0, 7.0, 2.0)));
        assert_eq!(pz.end_drag(), None);
    }

    #[test]
    fn zero_drag_is_not_a_pan() {
        let mut pz = PanZoom::default();
        pz.drag(0.0, 0.0);
        assert!(!pz.is_panning());
        assert_eq!(pz.end_drag(), None);
    }

    #[test]
    fn scrolling_up_zooms_in() {
        let mut pz = PanZoom::default();
        pz.reset(Board::new(0.0, 0.0, 1.0));
        let board = pz.scroll_zoom(50.0, 50.0, 100.0);
        assert!(board.scale > 1.0);
        assert_eq!(pz.live(), board);
    }
}
