//! Complex arithmetic over `f64` pairs.
//!
//! Every operation is a pure function of its inputs. Division by a zero-magnitude value and
//! negative powers of zero produce non-finite components instead of an error; downstream code
//! (the color mapper in particular) must tolerate NaN and infinity.

use std::f64::consts::TAU;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number `re + im·i`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// `0 + 0i`.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// `1 + 0i`.
    pub const ONE: Self = Self::new(1.0, 0.0);
    /// `0 + 1i`.
    pub const I: Self = Self::new(0.0, 1.0);

    /// Build a complex number from its rectangular parts.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Build a complex number from magnitude and angle (radians).
    pub fn from_polar(magnitude: f64, arg: f64) -> Self {
        let (sin, cos) = arg.sin_cos();
        Self::new(magnitude * cos, magnitude * sin)
    }

    /// Euclidean magnitude `|z|`.
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Squared magnitude `|z|²`.
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Argument normalized into `[0, 2π)`.
    ///
    /// Negative `atan2` results are wrapped by adding 2π. For tiny negative angles the sum can
    /// round up to exactly 2π; callers that index by sector must clamp.
    pub fn arg(self) -> f64 {
        let theta = self.im.atan2(self.re);
        if theta < 0.0 { theta + TAU } else { theta }
    }

    /// Multiply both components by a real scalar.
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    /// Real power, evaluated in polar form on the principal branch `[0, 2π)`.
    pub fn powf(self, exp: f64) -> Self {
        Self::from_polar(self.norm().powf(exp), self.arg() * exp)
    }

    /// Integer power by repeated squaring. Negative exponents take the reciprocal.
    pub fn powi(self, exp: i32) -> Self {
        let mut base = self;
        let mut n = exp.unsigned_abs();
        let mut acc = Self::ONE;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc * base;
            }
            base = base * base;
            n >>= 1;
        }
        if exp < 0 { Self::ONE / acc } else { acc }
    }

    /// `e^z`.
    pub fn exp(self) -> Self {
        Self::from_polar(self.re.exp(), self.im)
    }

    /// Complex sine.
    pub fn sin(self) -> Self {
        Self::new(
            self.re.sin() * self.im.cosh(),
            self.re.cos() * self.im.sinh(),
        )
    }

    /// Complex cosine.
    pub fn cos(self) -> Self {
        Self::new(
            self.re.cos() * self.im.cosh(),
            -self.re.sin() * self.im.sinh(),
        )
    }

    /// Return `true` when both components are finite.
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Div for Complex {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let m = rhs.norm_sqr();
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / m,
            (self.im * rhs.re - self.re * rhs.im) / m,
        )
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self::new(re, 0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/complex.rs"]
mod tests;
