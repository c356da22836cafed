use crate::foundation::error::{ArgandError, ArgandResult};

/// Absolute 0-based frame index within one animation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// A rational number `num/den`, used for frame rates and time bases.
///
/// A time base of `1/60` means one timestamp tick lasts 1/60 s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rational {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be non-zero.
    pub den: u32,
}

impl Rational {
    /// Create a validated rational with both parts non-zero.
    pub fn new(num: u32, den: u32) -> ArgandResult<Self> {
        if den == 0 {
            return Err(ArgandError::validation("rational den must be > 0"));
        }
        if num == 0 {
            return Err(ArgandError::validation("rational num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Swap numerator and denominator (frame rate <-> time base).
    pub fn invert(self) -> Self {
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /// Rescale a timestamp expressed in `self` ticks into `to` ticks.
    ///
    /// Rounds to nearest, ties away from zero. Results outside the `i64` range saturate.
    pub fn rescale(self, ts: i64, to: Rational) -> i64 {
        let num = i128::from(ts) * i128::from(self.num) * i128::from(to.den);
        let den = i128::from(self.den) * i128::from(to.num);
        if den == 0 {
            return ts;
        }
        let q = (num.abs() * 2 + den) / (den * 2);
        let q = if num < 0 { -q } else { q };
        q.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Total pixel count.
    pub fn pixels(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
