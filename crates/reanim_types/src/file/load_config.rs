//! Load configuration shared by both timeline parsers.

use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_FPS;

/// Configuration for loading animation definitions.
///
/// Controls defaults that the documents may omit, where the authoring parser
/// looks for bitmaps, and how large a document may grow before the tag reader
/// gives up.
///
/// # Presets
///
/// - `default()`: 12 fps, `LIBRARY` directory, 200 000 elements
/// - `lenient()`: 2 000 000 elements for very long exports
/// - `strict()`: 20 000 elements, exact-case library lookups only
///
/// # Examples
///
/// ```
/// use reanim_types::file::LoadConfig;
///
/// let config = LoadConfig::default();
/// assert_eq!(config.default_fps, 12.0);
///
/// let config = LoadConfig::lenient();
/// assert!(config.max_elements > LoadConfig::default().max_elements);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
	/// Frame rate used when a document does not declare one
	pub default_fps: f32,
	/// Name of the authoring manifest document inside the base directory
	pub manifest_name: String,
	/// Name of the bitmap library directory (matched ignoring case)
	pub library_dir_name: String,
	/// Directories probed for bitmaps, relative to the library directory
	pub candidate_dirs: Vec<String>,
	/// Extensions probed after the bare name
	pub image_extensions: Vec<String>,
	/// Retry bitmap lookups with the lower-cased name
	pub lowercase_fallback: bool,
	/// Upper bound on the number of elements in one document
	pub max_elements: usize,
}

impl Default for LoadConfig {
	fn default() -> Self {
		Self {
			default_fps: DEFAULT_FPS,
			manifest_name: "DOMDocument.xml".to_string(),
			library_dir_name: "LIBRARY".to_string(),
			candidate_dirs: ["", "bitmaps", "images", ".."].map(String::from).to_vec(),
			image_extensions: [".png", ".jpg", ".jpeg", ".bmp", ".tga"].map(String::from).to_vec(),
			lowercase_fallback: true,
			max_elements: 200_000,
		}
	}
}

impl LoadConfig {
	/// Higher element limit for very long documents.
	pub fn lenient() -> Self {
		Self {
			max_elements: 2_000_000,
			..Self::default()
		}
	}

	/// Low element limit and no lower-case bitmap retries.
	pub fn strict() -> Self {
		Self {
			lowercase_fallback: false,
			max_elements: 20_000,
			..Self::default()
		}
	}
}
