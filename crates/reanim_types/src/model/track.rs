//! Named frame sequences.

use serde::{Deserialize, Serialize};

use super::transform::FrameTransform;

/// Inclusive frame window `[begin, end]` with `begin <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameRange {
	begin: u32,
	end: u32,
}

impl FrameRange {
	/// Creates a range, swapping the bounds if they are reversed.
	pub fn new(begin: u32, end: u32) -> Self {
		if begin <= end {
			Self {
				begin,
				end,
			}
		} else {
			Self {
				begin: end,
				end: begin,
			}
		}
	}

	/// First frame index.
	pub fn begin(&self) -> u32 {
		self.begin
	}

	/// Last frame index (inclusive).
	pub fn end(&self) -> u32 {
		self.end
	}

	/// Number of frames covered by the range.
	pub fn len(&self) -> u32 {
		self.end - self.begin + 1
	}

	/// A range always covers at least one frame.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Returns `true` if `frame` lies inside the range.
	pub fn contains(&self, frame: u32) -> bool {
		(self.begin..=self.end).contains(&frame)
	}
}

impl From<(u32, u32)> for FrameRange {
	fn from((begin, end): (u32, u32)) -> Self {
		Self::new(begin, end)
	}
}

/// An ordered, named sequence of frame transforms.
///
/// Names are not unique inside a definition: mirrored parts (left/right eye)
/// commonly share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
	name: String,
	frames: Vec<FrameTransform>,
	available: bool,
}

impl Track {
	/// Creates an empty, available track.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			frames: Vec::new(),
			available: true,
		}
	}

	/// Creates a track from a frame list.
	pub fn with_frames(name: impl Into<String>, frames: Vec<FrameTransform>) -> Self {
		Self {
			name: name.into(),
			frames,
			available: true,
		}
	}

	/// Builder-style availability toggle.
	pub fn with_available(mut self, available: bool) -> Self {
		self.available = available;
		self
	}

	/// Track name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// All frames in order.
	pub fn frames(&self) -> &[FrameTransform] {
		&self.frames
	}

	/// Frame at `index`.
	pub fn frame(&self, index: usize) -> Option<&FrameTransform> {
		self.frames.get(index)
	}

	/// Number of frames.
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Returns `true` if the track has no frames.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// Soft-disable flag; unavailable tracks are never drawn.
	pub fn is_available(&self) -> bool {
		self.available
	}

	/// Appends a frame.
	pub fn push(&mut self, frame: FrameTransform) {
		self.frames.push(frame);
	}

	/// Pads the track with hole frames up to `len` frames.
	///
	/// Padding holds the pose of the last frame.
	pub fn pad_hidden(&mut self, len: usize) {
		if self.frames.len() < len {
			let hole = self.frames.last().map_or_else(FrameTransform::hidden, FrameTransform::to_hidden);
			self.frames.resize(len, hole);
		}
	}

	/// Window spanned by the visible frames of this track.
	///
	/// From the first visible frame to the last visible frame. A track without any
	/// visible frame spans all of its frames; an empty track has no range.
	pub fn visible_range(&self) -> Option<FrameRange> {
		if self.frames.is_empty() {
			return None;
		}
		let first = self.frames.iter().position(FrameTransform::is_visible);
		let last = self.frames.iter().rposition(FrameTransform::is_visible);
		let (begin, end) = match (first, last) {
			(Some(first), Some(last)) => (first, last),
			_ => (0, self.frames.len() - 1),
		};
		Some(FrameRange::new(begin as u32, end as u32))
	}
}
