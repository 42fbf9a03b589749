//! Playback configuration.

use serde::{Deserialize, Serialize};

/// Limits and defaults for animators and attachment systems.
///
/// # Examples
///
/// ```
/// use reanim_player::PlayerConfig;
///
/// let config = PlayerConfig::default();
/// assert_eq!(config.max_effects, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
	/// Maximum number of effects one attachment holds
	pub max_effects: usize,
	/// Blend window, in frames, used when a range switch does not name one
	pub default_blend_frames: f32,
	/// Nesting limit for attached child animators and nested attachments
	pub max_attach_depth: usize,
}

impl Default for PlayerConfig {
	fn default() -> Self {
		Self {
			max_effects: 32,
			default_blend_frames: 0.0,
			max_attach_depth: 16,
		}
	}
}
