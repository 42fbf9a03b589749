//! The immutable, shared result of loading one animation asset.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::track::{FrameRange, Track};

/// Frame rate used when a document does not specify one.
pub const DEFAULT_FPS: f32 = 12.0;

/// Parsed animation: a frame rate and an ordered list of tracks.
///
/// Definitions are never mutated after construction. Playback instances share
/// them behind an [`std::sync::Arc`] and keep all their mutable state elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
	fps: f32,
	tracks: Vec<Track>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	size: Option<(f32, f32)>,
}

impl Default for AnimationDefinition {
	fn default() -> Self {
		Self::new(DEFAULT_FPS, Vec::new())
	}
}

impl AnimationDefinition {
	/// Creates a definition. A non-positive or non-finite `fps` falls back to
	/// [`DEFAULT_FPS`].
	pub fn new(fps: f32, tracks: Vec<Track>) -> Self {
		let fps = if fps.is_finite() && fps > 0.0 {
			fps
		} else {
			DEFAULT_FPS
		};
		Self {
			fps,
			tracks,
			size: None,
		}
	}

	/// Attaches the authored document size.
	pub fn with_size(mut self, width: f32, height: f32) -> Self {
		self.size = Some((width, height));
		self
	}

	/// Frames per second.
	pub fn fps(&self) -> f32 {
		self.fps
	}

	/// Authored document size, when the source format carries one.
	pub fn size(&self) -> Option<(f32, f32)> {
		self.size
	}

	/// All tracks in draw order.
	pub fn tracks(&self) -> &[Track] {
		&self.tracks
	}

	/// Track at `index`.
	pub fn track(&self, index: usize) -> Option<&Track> {
		self.tracks.get(index)
	}

	/// Number of tracks.
	pub fn track_count(&self) -> usize {
		self.tracks.len()
	}

	/// Frame count of the definition (the longest track).
	pub fn frame_count(&self) -> usize {
		self.tracks.iter().map(Track::len).max().unwrap_or(0)
	}

	/// Index of the first track named `name`.
	pub fn track_index(&self, name: &str) -> Option<usize> {
		self.tracks.iter().position(|track| track.name() == name)
	}

	/// Indices of every track named `name`, in order.
	pub fn track_indices(&self, name: &str) -> Vec<usize> {
		self.tracks
			.iter()
			.enumerate()
			.filter(|(_, track)| track.name() == name)
			.map(|(idx, _)| idx)
			.collect()
	}

	/// Frame window of the first track named `name`.
	///
	/// See [`Track::visible_range`]. Returns `None` for an unknown name.
	pub fn track_range(&self, name: &str) -> Option<FrameRange> {
		self.track_index(name).and_then(|idx| self.tracks[idx].visible_range())
	}

	/// Every distinct image name referenced by any frame.
	pub fn image_refs(&self) -> BTreeSet<&str> {
		self.tracks
			.iter()
			.flat_map(|track| track.frames().iter())
			.filter(|frame| frame.has_image())
			.map(|frame| frame.image_ref.as_str())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::FrameTransform;

	fn sample() -> AnimationDefinition {
		let eye = |image: &str| {
			Track::with_frames(
				"eye",
				vec![FrameTransform {
					image_ref: image.to_string(),
					..FrameTransform::DEFAULT
				}],
			)
		};
		AnimationDefinition::new(
			24.0,
			vec![
				Track::with_frames("body", vec![FrameTransform::DEFAULT; 5]),
				eye("IMAGE_EYE_L"),
				eye("IMAGE_EYE_R"),
			],
		)
	}

	#[test]
	fn test_lookup_by_name() {
		let def = sample();
		assert_eq!(def.track_index("eye"), Some(1));
		assert_eq!(def.track_indices("eye"), vec![1, 2]);
		assert_eq!(def.track_index("missing"), None);
		assert!(def.track_indices("missing").is_empty());
	}

	#[test]
	fn test_frame_count_and_range() {
		let def = sample();
		assert_eq!(def.frame_count(), 5);
		assert_eq!(def.track_range("body"), Some(FrameRange::new(0, 4)));
		assert_eq!(def.track_range("missing"), None);
	}

	#[test]
	fn test_invalid_fps_falls_back() {
		assert_eq!(AnimationDefinition::new(0.0, Vec::new()).fps(), DEFAULT_FPS);
		assert_eq!(AnimationDefinition::new(f32::NAN, Vec::new()).fps(), DEFAULT_FPS);
	}

	#[test]
	fn test_image_refs() {
		let def = sample();
		let images: Vec<&str> = def.image_refs().into_iter().collect();
		assert_eq!(images, vec!["IMAGE_EYE_L", "IMAGE_EYE_R"]);
	}

	#[test]
	fn test_serde_roundtrip() {
		let def = sample().with_size(320.0, 240.0);
		let json = serde_json::to_string(&def).unwrap();
		let back: AnimationDefinition = serde_json::from_str(&json).unwrap();
		assert_eq!(back, def);
	}
}
