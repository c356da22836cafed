//! Per-frame animation formulas and the pixel-to-plane mapping.
//!
//! The renderer only sees `(complex coordinate, frame index) -> complex value`; which family of
//! functions is animated is decided by whoever builds the renderer.

use crate::foundation::complex::Complex;
use crate::foundation::core::{Canvas, FrameIndex};
use std::sync::Arc;

/// A pure, time-parameterized complex function evaluated once per pixel.
///
/// Implementations are called concurrently from every render worker and must not keep mutable
/// state.
pub trait Formula: Send + Sync {
    /// Evaluate the function at `z` for animation frame `frame`.
    fn eval(&self, z: Complex, frame: FrameIndex) -> Complex;
}

impl<F> Formula for F
where
    F: Fn(Complex, FrameIndex) -> Complex + Send + Sync,
{
    fn eval(&self, z: Complex, frame: FrameIndex) -> Complex {
        self(z, frame)
    }
}

/// Rational map blended with a power term whose exponent grows with the frame index:
///
/// `f(z) = (z² − 1) · (z + a)^(k·i) / (z² + b)` with `a = −2 − i`, `b = 2 + 2i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RationalPower {
    /// Exponent growth per frame (`k`).
    pub exponent_step: f64,
    /// Offset inside the power term (`a`).
    pub shift: Complex,
    /// Offset in the denominator (`b`).
    pub pole: Complex,
}

impl Default for RationalPower {
    fn default() -> Self {
        Self {
            exponent_step: 0.01,
            shift: Complex::new(-2.0, -1.0),
            pole: Complex::new(2.0, 2.0),
        }
    }
}

impl Formula for RationalPower {
    fn eval(&self, z: Complex, frame: FrameIndex) -> Complex {
        let z2 = z * z;
        let power = (z + self.shift).powf(self.exponent_step * frame.0 as f64);
        (z2 - Complex::ONE) * power / (z2 + self.pole)
    }
}

/// Polynomial blend from `z²` (first frame) towards `z³` (last frame), weighted by `i/N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolynomialBlend {
    /// Total frame count `N` of the animation.
    pub frame_count: u64,
}

impl PolynomialBlend {
    fn weight(self, frame: FrameIndex) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        frame.0 as f64 / self.frame_count as f64
    }
}

impl Formula for PolynomialBlend {
    fn eval(&self, z: Complex, frame: FrameIndex) -> Complex {
        let t = self.weight(frame);
        let z2 = z * z;
        z2 * (1.0 - t) + (z2 * z) * t
    }
}

/// Built-in formula families selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    /// [`RationalPower`] with default constants.
    #[default]
    RationalPower,
    /// [`PolynomialBlend`] over the configured frame count.
    PolynomialBlend,
}

impl FormulaKind {
    /// Instantiate the formula for an animation of `frame_count` frames.
    pub fn build(self, frame_count: u64) -> Arc<dyn Formula> {
        match self {
            Self::RationalPower => Arc::new(RationalPower::default()),
            Self::PolynomialBlend => Arc::new(PolynomialBlend { frame_count }),
        }
    }
}

/// Linear map from raster coordinates to the complex plane, centered on the frame.
///
/// Raster `y` grows downward while the imaginary axis grows upward, so rows are flipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    half_width: f64,
    half_height: f64,
    scale: f64,
}

impl Viewport {
    /// Center the plane's origin on `canvas`, with `scale` complex units per pixel.
    pub fn centered(canvas: Canvas, scale: f64) -> Self {
        Self {
            half_width: f64::from(canvas.width) / 2.0,
            half_height: f64::from(canvas.height) / 2.0,
            scale,
        }
    }

    /// Complex coordinate of pixel `(x, y)`.
    pub fn to_plane(&self, x: u32, y: u32) -> Complex {
        Complex::new(
            (f64::from(x) - self.half_width) * self.scale,
            (self.half_height - f64::from(y)) * self.scale,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/formula.rs"]
mod tests;
