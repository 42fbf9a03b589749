//! Per-frame transform sample.

use serde::{Deserialize, Serialize};

use crate::math::{Matrix2D, lerp, lerp_degrees};

/// `vis_flag` value for a frame that is drawn normally.
pub const VIS_SHOWN: i32 = 0;

/// `vis_flag` value for a hole frame that must not be drawn.
pub const VIS_HIDDEN: i32 = 1;

/// One sample of one track at one frame index.
///
/// Rotation is carried as two independent per-axis angles (`skew_x`, `skew_y`),
/// exactly as the timeline formats encode it. See [`crate::math`] for the angle
/// convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTransform {
	/// x translation
	pub x: f32,
	/// y translation
	pub y: f32,
	/// Angle of the y axis, degrees
	pub skew_x: f32,
	/// Angle of the x axis, degrees
	pub skew_y: f32,
	/// Horizontal scale
	pub scale_x: f32,
	/// Vertical scale
	pub scale_y: f32,
	/// Opacity in `[0, 1]`
	pub alpha: f32,
	/// `0` draws the frame, any other value hides it
	pub vis_flag: i32,
	/// Logical image name; empty means none / inherit
	pub image_ref: String,
}

impl Default for FrameTransform {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl FrameTransform {
	/// Engine defaults, used for the first frame of every track.
	pub const DEFAULT: Self = Self {
		x: 0.0,
		y: 0.0,
		skew_x: 0.0,
		skew_y: 0.0,
		scale_x: 1.0,
		scale_y: 1.0,
		alpha: 1.0,
		vis_flag: VIS_SHOWN,
		image_ref: String::new(),
	};

	/// A default transform flagged as a hole frame.
	pub fn hidden() -> Self {
		Self {
			vis_flag: VIS_HIDDEN,
			..Self::DEFAULT
		}
	}

	/// The same pose flagged as a hole frame.
	pub fn to_hidden(&self) -> Self {
		Self {
			vis_flag: VIS_HIDDEN,
			..self.clone()
		}
	}

	/// Returns `true` if the frame may be composited into a draw call.
	pub fn is_visible(&self) -> bool {
		self.vis_flag == VIS_SHOWN
	}

	/// Returns `true` if the frame references an image.
	pub fn has_image(&self) -> bool {
		!self.image_ref.is_empty()
	}

	/// Local affine matrix of this frame.
	pub fn to_matrix(&self) -> Matrix2D {
		Matrix2D::from_parts(self.x, self.y, self.scale_x, self.scale_y, self.skew_x, self.skew_y)
	}

	/// Builds a transform from an affine matrix and an alpha multiplier.
	///
	/// Alpha is clamped into `[0, 1]`.
	pub fn from_matrix(matrix: &Matrix2D, alpha: f32) -> Self {
		let parts = matrix.decompose();
		Self {
			x: parts.x,
			y: parts.y,
			skew_x: parts.skew_x,
			skew_y: parts.skew_y,
			scale_x: parts.scale_x,
			scale_y: parts.scale_y,
			alpha: if alpha.is_finite() {
				alpha.clamp(0.0, 1.0)
			} else {
				1.0
			},
			vis_flag: VIS_SHOWN,
			image_ref: String::new(),
		}
	}

	/// Interpolates the numeric fields towards `to` by `frac`.
	///
	/// Position, scale and alpha are linear. Angles follow the shortest arc, so the
	/// result never swings more than 180 degrees between two keyframes.
	/// `vis_flag` and `image_ref` are taken from `self`.
	pub fn interpolate(&self, to: &FrameTransform, frac: f32) -> FrameTransform {
		FrameTransform {
			x: lerp(self.x, to.x, frac),
			y: lerp(self.y, to.y, frac),
			skew_x: lerp_degrees(self.skew_x, to.skew_x, frac),
			skew_y: lerp_degrees(self.skew_y, to.skew_y, frac),
			scale_x: lerp(self.scale_x, to.scale_x, frac),
			scale_y: lerp(self.scale_y, to.scale_y, frac),
			alpha: lerp(self.alpha, to.alpha, frac),
			vis_flag: self.vis_flag,
			image_ref: self.image_ref.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let t = FrameTransform::default();
		assert_eq!((t.scale_x, t.scale_y, t.alpha), (1.0, 1.0, 1.0));
		assert!(t.is_visible());
		assert!(!t.has_image());
		assert!(!FrameTransform::hidden().is_visible());

		let posed = FrameTransform {
			x: 4.0,
			image_ref: "IMAGE_HEAD".to_string(),
			..FrameTransform::DEFAULT
		};
		let hole = posed.to_hidden();
		assert!(!hole.is_visible());
		assert_eq!((hole.x, hole.image_ref.as_str()), (4.0, "IMAGE_HEAD"));
	}

	#[test]
	fn test_interpolate_wraps_angles() {
		let a = FrameTransform {
			skew_x: 170.0,
			skew_y: -170.0,
			..FrameTransform::DEFAULT
		};
		let b = FrameTransform {
			skew_x: -170.0,
			skew_y: 170.0,
			x: 10.0,
			..FrameTransform::DEFAULT
		};
		let mid = a.interpolate(&b, 0.5);
		assert!((mid.skew_x - 180.0).abs() < 1e-4);
		assert!((mid.skew_y + 180.0).abs() < 1e-4);
		assert!((mid.x - 5.0).abs() < 1e-4);
	}

	#[test]
	fn test_matrix_roundtrip() {
		let t = FrameTransform {
			x: 3.0,
			y: -2.0,
			skew_x: 45.0,
			skew_y: 45.0,
			scale_x: 2.0,
			scale_y: 0.5,
			alpha: 0.25,
			..FrameTransform::DEFAULT
		};
		let back = FrameTransform::from_matrix(&t.to_matrix(), t.alpha);
		for (l, r) in [
			(back.x, t.x),
			(back.y, t.y),
			(back.skew_x, t.skew_x),
			(back.skew_y, t.skew_y),
			(back.scale_x, t.scale_x),
			(back.scale_y, t.scale_y),
			(back.alpha, t.alpha),
		] {
			assert!((l - r).abs() < 1e-4, "{l} != {r}");
		}
	}

	#[test]
	fn test_from_matrix_clamps_alpha() {
		assert_eq!(FrameTransform::from_matrix(&Matrix2D::IDENTITY, 3.0).alpha, 1.0);
		assert_eq!(FrameTransform::from_matrix(&Matrix2D::IDENTITY, -1.0).alpha, 0.0);
	}
}
