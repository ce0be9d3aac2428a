// encoder.rs - Hands rendered frames to egui as images

use egui::ColorImage;
use life_core::FrameEncoder;

#[derive(Debug, Default, Clone, Copy)]
pub struct ColorImageEncoder;

impl FrameEncoder for ColorImageEncoder {
    type Output = ColorImage;

    fn encode(&mut self, width: usize, height: usize, channels: usize, pixels: &[u8]) -> ColorImage {
        match channels {
            1 => ColorImage::from_gray([width, height], pixels),
            _ => ColorImage::from_rgb([width, height], pixels),
        }
    }
}
