//! Per-track runtime state layered over the shared definition.

use std::{
	cell::RefCell,
	fmt,
	rc::{Rc, Weak},
};

use reanim_types::math::Matrix2D;

use super::Animator;

/// Runtime overrides for one track of one animator.
///
/// The definition itself is never touched; everything an animator changes about a
/// track lives here.
#[derive(Clone)]
pub struct TrackOverride {
	/// `false` hides the track regardless of its frames
	pub visible: bool,
	/// Replaces the image of every frame when set
	pub image: Option<String>,
	/// Child animator drawn on top of this track
	pub child: Option<Weak<RefCell<Animator>>>,
	/// Transform of the child relative to the track
	pub child_matrix: Option<Matrix2D>,
	/// Added to the track's x position
	pub offset_x: f32,
	/// Added to the track's y position
	pub offset_y: f32,
}

impl Default for TrackOverride {
	fn default() -> Self {
		Self {
			visible: true,
			image: None,
			child: None,
			child_matrix: None,
			offset_x: 0.0,
			offset_y: 0.0,
		}
	}
}

impl fmt::Debug for TrackOverride {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackOverride")
			.field("visible", &self.visible)
			.field("image", &self.image)
			.field("child", &self.child.as_ref().map(|child| child.strong_count() > 0))
			.field("child_matrix", &self.child_matrix)
			.field("offset_x", &self.offset_x)
			.field("offset_y", &self.offset_y)
			.finish()
	}
}

impl TrackOverride {
	/// The attached child, if it is still alive.
	pub fn child(&self) -> Option<Rc<RefCell<Animator>>> {
		self.child.as_ref().and_then(Weak::upgrade)
	}
}
