use crate::foundation::complex::Complex;
use std::f64::consts::PI;

/// Number of hue sectors on the wheel.
pub const SECTORS: usize = 6;

/// Straight RGB8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color a complex value by its argument only. Magnitude is ignored.
///
/// Non-finite inputs map to the sector-0 color with a zero ramp (pure red).
pub fn hue_color(z: Complex) -> Rgb8 {
    hue_color_from_arg(z.arg())
}

/// Map an angle in `[0, 2π]` onto the six-sector hue wheel.
///
/// `h = θ·3/π` selects the sector and `x = 1 − |h mod 2 − 1|` ramps the varying channel. The
/// sector index is clamped to `[0, 6]`; index 6 (θ exactly 2π) is the wraparound entry and
/// yields the same color as θ = 0.
pub fn hue_color_from_arg(theta: f64) -> Rgb8 {
    let h = theta * (3.0 / PI);
    // `as usize` saturates: NaN and negatives land in sector 0.
    let sector = (h as usize).min(SECTORS);
    let ramp = channel(1.0 - ((h % 2.0) - 1.0).abs());

    match sector {
        0 => Rgb8::new(255, ramp, 0),
        1 => Rgb8::new(ramp, 255, 0),
        2 => Rgb8::new(0, 255, ramp),
        3 => Rgb8::new(0, ramp, 255),
        4 => Rgb8::new(ramp, 0, 255),
        5 => Rgb8::new(255, 0, ramp),
        _ => Rgb8::new(255, 0, 0),
    }
}

fn channel(x: f64) -> u8 {
    (255.0 * x) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
