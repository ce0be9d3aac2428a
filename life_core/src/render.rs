// render.rs - Crop, downsample and colorize the visible part of a grid
//
// The output image is never larger than MAX_RENDER_PIXELS. The caller puts
// it back on the board with the frame's placement: translate to
// (left, top) cells, then scale by 1 / downsample_factor.

use crate::color::Palette;
use crate::error::{LifeError, Result};
use crate::grid::Grid;
use crate::viewport::{Board, VisibleRect};

/// Pixel ceiling of the downstream image encoder.
pub const MAX_RENDER_PIXELS: usize = 500 * 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Rgb,
    Luma,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Luma => 1,
        }
    }
}

/// Where the rendered image sits on the board, in cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top: i64,
    pub left: i64,
    pub downsample_factor: f64,
}

impl Placement {
    /// Board cells covered by one image pixel along each axis.
    pub fn scale(&self) -> f64 {
        1.0 / self.downsample_factor
    }

    /// Where a `width` x `height` image with this placement lands on screen
    /// for the given board. Passing the live board (not the one the frame
    /// was cropped for) keeps the image glued to the board mid-pan.
    pub fn screen_rect(&self, board: Board, width: usize, height: usize) -> ScreenRect {
        let cells = self.scale() * board.scale;
        ScreenRect {
            x: board.x + self.left as f64 * board.scale,
            y: board.y + self.top as f64 * board.scale,
            width: width as f64 * cells,
            height: height as f64 * cells,
        }
    }
}

/// On-screen rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub placement: Placement,
}

impl RenderFrame {
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    pub fn downsample_factor(&self) -> f64 {
        self.placement.downsample_factor
    }

    /// Bytes of the pixel at image coordinates (row, col).
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        let channels = self.channels();
        let start = (row * self.width + col) * channels;
        &self.pixels[start..start + channels]
    }

    pub fn screen_rect(&self, board: Board) -> ScreenRect {
        self.placement.screen_rect(board, self.width, self.height)
    }

    pub fn encode_with<E: FrameEncoder>(&self, encoder: &mut E) -> E::Output {
        encoder.encode(self.width, self.height, self.channels(), &self.pixels)
    }
}

/// Turns a raw pixel buffer into whatever the display layer consumes.
pub trait FrameEncoder {
    type Output;
    fn encode(&mut self, width: usize, height: usize, channels: usize, pixels: &[u8]) -> Self::Output;
}

/// Integer decimation step `k` for a `width` x `height` crop.
///
/// Starts from `ceil(sqrt(width * height / MAX_RENDER_PIXELS))` and steps up
/// while the rounded-up output would still exceed the ceiling.
pub fn downsample_step(width: usize, height: usize) -> usize {
    let ratio = (width * height) as f64 / MAX_RENDER_PIXELS as f64;
    let mut k = (ratio.sqrt().ceil() as usize).max(1);
    while width.div_ceil(k) * height.div_ceil(k) > MAX_RENDER_PIXELS {
        k += 1;
    }
    k
}

/// Renders the `visible` part of `grid` into a frame.
///
/// Image pixel (i, j) samples cell (top + i*k, left + j*k), the first cell
/// of the k x k block it stands for.
pub fn render(
    grid: &Grid,
    visible: &VisibleRect,
    palette: &Palette,
    format: PixelFormat,
) -> Result<RenderFrame> {
    if visible.is_empty() {
        return Err(LifeError::NothingVisible);
    }
    let rect = visible.clamped(grid.width(), grid.height());
    if rect.is_empty() {
        return Err(LifeError::NothingVisible);
    }

    let (top, left) = (rect.top as usize, rect.left as usize);
    let (crop_w, crop_h) = (rect.width() as usize, rect.height() as usize);
    let k = downsample_step(crop_w, crop_h);
    let width = crop_w.div_ceil(k);
    let height = crop_h.div_ceil(k);
    let channels = format.channels();

    let mut pixels = vec![0u8; width * height * channels];
    for (i, out_row) in pixels.chunks_mut(width * channels).enumerate() {
        let ages = grid.row(top + i * k);
        for (j, out) in out_row.chunks_mut(channels).enumerate() {
            let age = ages[left + j * k];
            if age == 0 {
                continue;
            }
            let color = palette.colorize(age);
            match format {
                PixelFormat::Rgb  => out.copy_from_slice(&color.0),
                PixelFormat::Luma => out[0] = color.luma(),
            }
        }
    }

    Ok(RenderFrame {
        pixels,
        width,
        height,
        format,
        placement: Placement {
            top: rect.top,
            left: rect.left,
            downsample_factor: 1.0 / k as f64,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    struct Blob;

    impl FrameEncoder for Blob {
        type Output = (usize, usize, usize, usize);
        fn encode(&mut self, width: usize, height: usize, channels: usize, pixels: &[u8]) -> Self::Output {
            (width, height, channels, pixels.len())
        }
    }

    fn palette() -> Palette {
        Palette {
            newborn: Rgb::new(200, 10, 10),
            aged: Rgb::new(0, 0, 100),
            fading_speed: 2.0,
        }
    }

    #[test]
    fn empty_rect_is_nothing_visible() {
        let grid = Grid::square(10).unwrap();
        let rect = VisibleRect {
            top: 50,
            left: 0,
            bottom: 10,
            right: 10,
            padding: 0,
        };
        let err = render(&grid, &rect, &palette(), PixelFormat::Rgb).unwrap_err();
        assert!(matches!(err, LifeError::NothingVisible));
    }

    #[test]
    fn small_crop_is_not_downsampled() {
        let mut grid = Grid::square(8).unwrap();
        grid.set_age(3, 4, 1);
        grid.set_age(5, 2, 40);
        let rect = VisibleRect {
            top: 2,
            left: 1,
            bottom: 7,
            right: 6,
            padding: 0,
        };
        let frame = render(&grid, &rect, &palette(), PixelFormat::Rgb).unwrap();
        assert_eq!((frame.width, frame.height), (5, 5));
        assert_eq!(frame.downsample_factor(), 1.0);
        assert_eq!(frame.pixels.len(), 5 * 5 * 3);
        assert_eq!(frame.pixel(1, 3), &[200, 10, 10]);
        assert_eq!(frame.pixel(3, 1), &palette().colorize(40).0);
        assert_eq!(frame.pixel(0, 0), &[0, 0, 0]);
        assert_eq!(frame.placement.top, 2);
        assert_eq!(frame.placement.left, 1);
    }

    #[test]
    fn large_crop_fits_the_ceiling_and_stays_aligned() {
        let mut grid = Grid::square(1200).unwrap();
        let rect = VisibleRect {
            top: 100,
            left: 50,
            bottom: 1150,
            right: 1100,
            padding: 0,
        };
        // 1050 x 1050 -> k = 3
        grid.set_age(100 + 2 * 3, 50 + 7 * 3, 1);
        grid.set_age(100 + 2 * 3 + 1, 50 + 8 * 3, 1); // not on a sample point
        let frame = render(&grid, &rect, &palette(), PixelFormat::Luma).unwrap();
        assert_eq!((frame.width, frame.height), (350, 350));
        assert!((frame.downsample_factor() - 1.0 / 3.0).abs() < 1e-12);
        assert!(frame.width * frame.height <= MAX_RENDER_PIXELS);
        assert_eq!(frame.pixel(2, 7), &[Rgb::new(200, 10, 10).luma()]);
        assert_eq!(frame.pixel(2, 8), &[0]);
    }

    #[test]
    fn rect_past_the_grid_is_clamped() {
        let mut grid = Grid::new(6, 4).unwrap();
        grid.set_age(3, 5, 2);
        let frame = render(&grid, &VisibleRect::full(10), &palette(), PixelFormat::Rgb).unwrap();
        assert_eq!((frame.width, frame.height), (6, 4));
        assert_ne!(frame.pixel(3, 5), &[0, 0, 0]);
    }

    #[test]
    fn downsample_step_respects_the_ceiling() {
        assert_eq!(downsample_step(1, 1), 1);
        assert_eq!(downsample_step(500, 500), 1);
        assert_eq!(downsample_step(501, 500), 2);
        assert_eq!(downsample_step(1000, 1000), 2);
        // ceil(sqrt(...)) alone gives 2 here, which would render 500 x 501.
        assert_eq!(downsample_step(999, 1001), 3);
        for (w, h) in [(1, 250_001), (4000, 3), (777, 5000), (10_000, 10_000), (2, 2)] {
            let k = downsample_step(w, h);
            assert!(w.div_ceil(k) * h.div_ceil(k) <= MAX_RENDER_PIXELS, "{w}x{h} k={k}");
        }
    }

    #[test]
    fn screen_rect_follows_the_live_board() {
        let grid = Grid::square(1200).unwrap();
        let rect = VisibleRect {
            top: 10,
            left: 20,
            bottom: 1010,
            right: 1020,
            padding: 0,
        };
        let frame = render(&grid, &rect, &palette(), PixelFormat::Rgb).unwrap();
        let placed = frame.screen_rect(Board::new(-5.0, 7.0, 2.0));
        assert_eq!(placed.x, -5.0 + 20.0 * 2.0);
        assert_eq!(placed.y, 7.0 + 10.0 * 2.0);
        assert_eq!(placed.width, 500.0 * 2.0 * 2.0);
        let panned = frame.screen_rect(Board::new(95.0, 7.0, 2.0));
        assert_eq!(panned.x - placed.x, 100.0);
    }

    #[test]
    fn encoder_receives_the_raw_buffer() {
        let grid = Grid::new(3, 2).unwrap();
        let frame = render(&grid, &VisibleRect::full(3), &palette(), PixelFormat::Luma).unwrap();
        assert_eq!(frame.encode_with(&mut Blob), (3, 2, 1, 6));
    }
}
