// color.rs - Colours and the age fade used when colorizing cells

use std::fmt;
use std::str::FromStr;

use crate::error::{LifeError, Result as LifeResult};
use crate::grid::Age;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// `self * ratio + other * (1 - ratio)`, per channel.
    pub fn mix(self, other: Rgb, ratio: f64) -> Rgb {
        let ratio = ratio.clamp(0.0, 1.0);
        let mut out = [0u8; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let value = self.0[i] as f64 * ratio + other.0[i] as f64 * (1.0 - ratio);
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }

    /// Rec.601 luma.
    pub fn luma(self) -> u8 {
        let [r, g, b] = self.0;
        let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
        y.round().clamp(0.0, 255.0) as u8
    }
}

impl FromStr for Rgb {
    type Err = LifeError;

    /// Accepts `#RRGGBB` or `RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LifeError::InvalidColor(s.to_string()));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| LifeError::InvalidColor(s.to_string()))?;
        Ok(Rgb([
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Newborn cells are drawn in `newborn`, and fade toward `aged` as they
/// survive more generations. Higher `fading_speed` fades faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub newborn: Rgb,
    pub aged: Rgb,
    pub fading_speed: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            newborn: Rgb::WHITE,
            aged: Rgb::new(0x19, 0xDA, 0xE0),
            fading_speed: 2.0,
        }
    }
}

impl Palette {
    /// Rejects fading speeds that would make the fade grow or blow up.
    pub fn validate(&self) -> LifeResult<()> {
        if self.fading_speed.is_nan() || self.fading_speed <= 0.0 {
            return Err(LifeError::InvalidConfig(format!(
                "fading_speed {} must be positive",
                self.fading_speed
            )));
        }
        Ok(())
    }

    pub fn fade_constant(&self) -> f64 {
        10.0 / self.fading_speed
    }

    /// Share of `newborn` in a living cell's colour: 1 at age 1, falling
    /// toward 0 as the cell ages. Dead cells get 0.
    pub fn fade_ratio(&self, age: Age) -> f64 {
        if age == 0 {
            return 0.0;
        }
        let k = self.fade_constant();
        if !k.is_finite() {
            return 1.0;
        }
        let elapsed = (age - 1) as f64;
        (1.0 + k) / (elapsed + 1.0 + k)
    }

    /// Display colour for a cell; dead cells are black.
    pub fn colorize(&self, age: Age) -> Rgb {
        if age == 0 {
            return Rgb::BLACK;
        }
        self.newborn.mix(self.aged, self.fade_ratio(age))
    }
}
