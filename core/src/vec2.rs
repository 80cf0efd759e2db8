//! 2D vector math and the rotation-caching `Transform` type.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::constants::PIXELS_PER_UNIT;

/// A two-dimensional vector of 32-bit floats.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The two-dimensional perpendicular dot product: `x1*y2 - y1*x2`.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude_sqr(self) -> f32 {
        self.dot(self)
    }

    pub fn magnitude(self) -> f32 {
        self.magnitude_sqr().sqrt()
    }

    pub fn distance_sqr(self, other: Vec2) -> f32 {
        (other - self).magnitude_sqr()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).magnitude()
    }

    /// Returns a unit vector in the same direction, or `self` unchanged when the
    /// magnitude is zero.
    pub fn normalize(self) -> Vec2 {
        let magnitude = self.magnitude();

        if magnitude > 0.0 {
            self * (1.0 / magnitude)
        } else {
            self
        }
    }

    /// The left unit normal: rotate 90° counter-clockwise, then normalize.
    pub fn left_normal(self) -> Vec2 {
        Vec2::new(-self.y, self.x).normalize()
    }

    /// The right unit normal: rotate 90° clockwise, then normalize.
    pub fn right_normal(self) -> Vec2 {
        Vec2::new(self.y, -self.x).normalize()
    }

    /// Rotates `self` by `angle` radians, computing fresh trig values.
    pub fn rotate(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
        )
    }

    /// Rotates `self` using the cached trig values of `tx`, without translating.
    pub fn rotate_tx(self, tx: Transform) -> Vec2 {
        Vec2::new(
            self.x * tx.cos - self.y * tx.sin,
            self.x * tx.sin + self.y * tx.cos,
        )
    }

    /// Rotates `self` by `tx`'s cached trig values, then translates by `tx.position`.
    pub fn transform(self, tx: Transform) -> Vec2 {
        self.rotate_tx(tx) + tx.position
    }

    /// The signed angle, in radians, from `self` to `other`.
    pub fn angle_between(self, other: Vec2) -> f32 {
        other.y.atan2(other.x) - self.y.atan2(self.x)
    }

    /// Sign of the turn `v1 -> v2 -> v3` makes: positive for counter-clockwise,
    /// negative for clockwise, zero for colinear.
    pub fn counter_clockwise(v1: Vec2, v2: Vec2, v3: Vec2) -> i32 {
        let lhs = (v2.y - v1.y) * (v3.x - v1.x);
        let rhs = (v3.y - v1.y) * (v2.x - v1.x);

        (lhs > rhs) as i32 - (lhs < rhs) as i32
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Converts a pixel-space scalar to simulation units. Returns `0.0` when
/// `PIXELS_PER_UNIT` is not positive (it always is; guarded for symmetry with
/// [`units_to_pixels`]).
pub fn pixels_to_units(pixels: f32) -> f32 {
    if PIXELS_PER_UNIT > 0.0 {
        pixels / PIXELS_PER_UNIT
    } else {
        0.0
    }
}

/// Converts a simulation-unit scalar to pixel space.
pub fn units_to_pixels(units: f32) -> f32 {
    if PIXELS_PER_UNIT > 0.0 {
        units * PIXELS_PER_UNIT
    } else {
        0.0
    }
}

/// Converts a pixel-space vector to simulation units, component-wise.
pub fn vec2_pixels_to_units(pixels: Vec2) -> Vec2 {
    Vec2::new(pixels_to_units(pixels.x), pixels_to_units(pixels.y))
}

/// Converts a simulation-unit vector to pixel space, component-wise.
pub fn vec2_units_to_pixels(units: Vec2) -> Vec2 {
    Vec2::new(units_to_pixels(units.x), units_to_pixels(units.y))
}

/// A rigid 2D transform: position plus an orientation whose sine/cosine are
/// cached at the time `angle` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec2,
    pub sin: f32,
    pub cos: f32,
    pub angle: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            sin: 0.0,
            cos: 1.0,
            angle: 0.0,
        }
    }
}

impl Transform {
    pub fn new(position: Vec2, angle: f32) -> Self {
        let mut tx = Self {
            position,
            sin: 0.0,
            cos: 1.0,
            angle: 0.0,
        };
        tx.set_angle(angle);
        tx
    }

    /// Normalizes `angle` to `[0, 2π)` and refreshes the cached sine/cosine.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = normalize_angle(angle);
        let (sin, cos) = self.angle.sin_cos();
        self.sin = sin;
        self.cos = cos;
    }

    /// Transforms `world` into this frame's local space: the inverse of
    /// [`Vec2::transform`].
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        let delta = world - self.position;
        Vec2::new(
            delta.x * self.cos + delta.y * self.sin,
            -delta.x * self.sin + delta.y * self.cos,
        )
    }

    /// Transforms `local` into world space using this frame's cached rotation
    /// and position. Equivalent to `local.transform(self)`.
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        local.transform(*self)
    }
}

/// Normalizes `angle` to the range `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    angle - TWO_PI * (angle / TWO_PI).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_matches_perpendicular_dot() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert_relative_eq!(a.cross(b), 1.0);
        assert_relative_eq!(b.cross(a), -1.0);
    }

    #[test]
    fn normalize_of_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn left_and_right_normals_are_opposite() {
        let v = Vec2::new(3.0, 4.0);
        let left = v.left_normal();
        let right = v.right_normal();
        assert_relative_eq!(left.x, -right.x, epsilon = 1e-6);
        assert_relative_eq!(left.y, -right.y, epsilon = 1e-6);
    }

    #[test]
    fn set_angle_normalizes_and_caches_trig() {
        let mut tx = Transform::default();
        tx.set_angle(3.0 * std::f32::consts::PI);
        assert!(tx.angle >= 0.0 && tx.angle < std::f32::consts::TAU);
        assert_relative_eq!(tx.sin, tx.angle.sin(), epsilon = 1e-6);
        assert_relative_eq!(tx.cos, tx.angle.cos(), epsilon = 1e-6);
    }

    #[test]
    fn pixels_units_roundtrip() {
        let px = 123.5_f32;
        assert_relative_eq!(units_to_pixels(pixels_to_units(px)), px, epsilon = 1e-3);
    }

    #[test]
    fn counter_clockwise_sign() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(1.0, 1.0);
        assert_eq!(Vec2::counter_clockwise(a, b, c), 1);
        assert_eq!(Vec2::counter_clockwise(a, c, b), -1);
    }

    #[test]
    fn rotate_by_transform_matches_rotate_by_angle() {
        let v = Vec2::new(2.0, 0.0);
        let angle = std::f32::consts::FRAC_PI_2;
        let tx = Transform::new(Vec2::ZERO, angle);
        let a = v.rotate(angle);
        let b = v.rotate_tx(tx);
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
    }
}
