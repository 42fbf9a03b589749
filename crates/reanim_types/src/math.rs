//! 2D affine math and color used by frame transforms.
//!
//! Angles follow the authoring-tool convention: `skew_x` is the angle of the
//! transformed y axis and `skew_y` the angle of the transformed x axis, both in
//! degrees, clockwise in a y-down coordinate system.

use std::ops::Mul;

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

const DET_EPSILON: f32 = 1e-8;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
	a + (b - a) * t
}

/// Wraps an angle delta in degrees into `[-180, 180]`.
///
/// Used to interpolate rotations along the shortest arc.
pub fn wrap_degrees(delta: f32) -> f32 {
	if !delta.is_finite() {
		return 0.0;
	}
	let mut wrapped = delta % 360.0;
	if wrapped > 180.0 {
		wrapped -= 360.0;
	} else if wrapped < -180.0 {
		wrapped += 360.0;
	}
	wrapped
}

/// Interpolates from angle `a` to angle `b` (degrees) along the shortest arc.
#[inline]
pub fn lerp_degrees(a: f32, b: f32, t: f32) -> f32 {
	a + wrap_degrees(b - a) * t
}

/// 2D affine transform on top of [`glam::Affine2`].
///
/// Components follow the authoring-tool naming, column-major:
///
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2D(Affine2);

impl Default for Matrix2D {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// Translation, scale and per-axis angles recovered from a [`Matrix2D`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
	/// x translation
	pub x: f32,
	/// y translation
	pub y: f32,
	/// Length of the first column
	pub scale_x: f32,
	/// Length of the second column
	pub scale_y: f32,
	/// `atan2(-c, d)` in degrees
	pub skew_x: f32,
	/// `atan2(b, a)` in degrees
	pub skew_y: f32,
}

impl Decomposed {
	/// The single rotation angle of the transform, in degrees.
	pub fn rotation(&self) -> f32 {
		self.skew_x
	}
}

impl Matrix2D {
	/// The identity transform.
	pub const IDENTITY: Self = Self(Affine2::IDENTITY);

	/// Creates a matrix from its six components.
	pub fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
		Self(Affine2::from_cols_array(&[a, b, c, d, tx, ty]))
	}

	/// Pure translation.
	pub fn translation(x: f32, y: f32) -> Self {
		Self(Affine2::from_translation(Vec2::new(x, y)))
	}

	/// Pure scale.
	pub fn scale(sx: f32, sy: f32) -> Self {
		Self(Affine2::from_scale(Vec2::new(sx, sy)))
	}

	/// Pure rotation by `degrees`.
	pub fn rotation(degrees: f32) -> Self {
		Self(Affine2::from_angle(degrees.to_radians()))
	}

	/// Builds a matrix from translation, scale and per-axis angles.
	///
	/// This is the exact inverse of [`Matrix2D::decompose`].
	pub fn from_parts(x: f32, y: f32, scale_x: f32, scale_y: f32, skew_x: f32, skew_y: f32) -> Self {
		let (sin_x, cos_x) = skew_x.to_radians().sin_cos();
		let (sin_y, cos_y) = skew_y.to_radians().sin_cos();
		Self::new(scale_x * cos_y, scale_x * sin_y, -scale_y * sin_x, scale_y * cos_x, x, y)
	}

	/// Translation + uniform scale + rotation, the shape used for attachment offsets.
	pub fn from_offset(x: f32, y: f32, scale: f32, rotation: f32) -> Self {
		Self::from_parts(x, y, scale, scale, rotation, rotation)
	}

	/// The six components as `[a, b, c, d, tx, ty]`.
	pub fn to_array(&self) -> [f32; 6] {
		self.0.to_cols_array()
	}

	/// Splits the matrix into translation, column lengths and per-axis angles.
	pub fn decompose(&self) -> Decomposed {
		let [a, b, c, d, tx, ty] = self.to_array();
		Decomposed {
			x: tx,
			y: ty,
			scale_x: a.hypot(b),
			scale_y: c.hypot(d),
			skew_x: (-c).atan2(d).to_degrees(),
			skew_y: b.atan2(a).to_degrees(),
		}
	}

	/// Replaces the translation, keeping the linear part.
	pub fn set_translation(&mut self, x: f32, y: f32) {
		self.0.translation = Vec2::new(x, y);
	}

	/// Transforms a point.
	pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
		self.0.transform_point2(Vec2::new(x, y)).into()
	}

	/// Returns the inverse, or `None` for a degenerate matrix.
	pub fn inverse(&self) -> Option<Self> {
		if self.0.matrix2.determinant().abs() < DET_EPSILON {
			return None;
		}
		Some(Self(self.0.inverse()))
	}
}

impl Mul for Matrix2D {
	type Output = Matrix2D;

	/// `parent * child`: applies `rhs` first, then `self`.
	fn mul(self, rhs: Matrix2D) -> Matrix2D {
		Self(self.0 * rhs.0)
	}
}

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
	/// Red
	pub r: u8,
	/// Green
	pub g: u8,
	/// Blue
	pub b: u8,
	/// Alpha
	pub a: u8,
}

impl Default for Color {
	fn default() -> Self {
		Self::WHITE
	}
}

impl Color {
	/// Opaque white, the neutral element of [`Color::multiply`].
	pub const WHITE: Self = Self::new(255, 255, 255, 255);

	/// Opaque black.
	pub const BLACK: Self = Self::new(0, 0, 0, 255);

	/// Creates a color from its channels.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Channel-wise multiplication, treating 255 as 1.0.
	pub fn multiply(self, other: Color) -> Color {
		fn mul(x: u8, y: u8) -> u8 {
			((u16::from(x) * u16::from(y) + 127) / 255) as u8
		}
		Color::new(mul(self.r, other.r), mul(self.g, other.g), mul(self.b, other.b), mul(self.a, other.a))
	}

	/// Returns the color with its alpha scaled by `factor` (clamped to `[0, 1]`).
	pub fn scale_alpha(self, factor: f32) -> Color {
		let a = (f32::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
		Color {
			a,
			..self
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn approx(a: f32, b: f32) -> bool {
		(a - b).abs() < 1e-4
	}

	#[test]
	fn test_wrap_degrees_takes_shortest_arc() {
		assert!(approx(wrap_degrees(350.0), -10.0));
		assert!(approx(wrap_degrees(-350.0), 10.0));
		assert!(approx(wrap_degrees(180.0), 180.0));
		assert!(approx(wrap_degrees(725.0), 5.0));
		assert!(approx(wrap_degrees(f32::NAN), 0.0));
	}

	#[test]
	fn test_lerp_degrees_crosses_zero() {
		assert!(approx(lerp_degrees(350.0, 10.0, 0.5), 360.0));
		assert!(approx(lerp_degrees(10.0, 350.0, 0.5), 0.0));
	}

	#[test]
	fn test_decompose_rotation_matrix() {
		let m = Matrix2D::rotation(30.0);
		let parts = m.decompose();
		assert!(approx(parts.scale_x, 1.0));
		assert!(approx(parts.scale_y, 1.0));
		assert!(approx(parts.rotation(), 30.0));
		assert!(approx(parts.skew_y, 30.0));
	}

	fn assert_matrix(actual: Matrix2D, expected: [f32; 6]) {
		for (got, want) in actual.to_array().into_iter().zip(expected) {
			assert!(approx(got, want), "{actual:?} != {expected:?}");
		}
	}

	#[test]
	fn test_from_parts_roundtrips_mirror() {
		let m = Matrix2D::new(-2.0, 0.0, 0.0, 1.5, 10.0, -4.0);
		let p = m.decompose();
		let rebuilt = Matrix2D::from_parts(p.x, p.y, p.scale_x, p.scale_y, p.skew_x, p.skew_y);
		assert_matrix(rebuilt, m.to_array());
	}

	#[test]
	fn test_mul_applies_child_first() {
		let parent = Matrix2D::translation(100.0, 0.0);
		let child = Matrix2D::scale(2.0, 2.0);
		let (x, y) = (parent * child).transform_point(1.0, 1.0);
		assert!(approx(x, 102.0));
		assert!(approx(y, 2.0));
	}

	#[test]
	fn test_rotation_matches_from_parts() {
		assert_matrix(Matrix2D::rotation(90.0), Matrix2D::from_offset(0.0, 0.0, 1.0, 90.0).to_array());
		assert_matrix(Matrix2D::rotation(90.0), [0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
	}

	#[test]
	fn test_inverse() {
		let m = Matrix2D::from_parts(5.0, 7.0, 2.0, 3.0, 20.0, 20.0);
		let inv = m.inverse().unwrap();
		assert_matrix(m * inv, Matrix2D::IDENTITY.to_array());
		assert!(Matrix2D::scale(0.0, 1.0).inverse().is_none());
	}

	#[test]
	fn test_set_translation_keeps_linear_part() {
		let mut m = Matrix2D::from_offset(1.0, 2.0, 2.0, 0.0);
		m.set_translation(30.0, 40.0);
		assert_matrix(m, [2.0, 0.0, 0.0, 2.0, 30.0, 40.0]);
	}

	#[test]
	fn test_color_multiply() {
		let half = Color::new(128, 255, 0, 255);
		assert_eq!(Color::WHITE.multiply(half), half);
		assert_eq!(half.multiply(Color::BLACK), Color::new(0, 0, 0, 255));
		assert_eq!(Color::WHITE.scale_alpha(0.5).a, 128);
	}
}
