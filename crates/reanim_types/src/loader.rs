//! Cached loading of animation definitions.

use std::{
	collections::{BTreeSet, HashMap},
	sync::Arc,
};

use log::{debug, info};
use reanim_vfs::{FileSource, normalize};

use crate::{
	error::{AnimError, Format},
	file::{LoadConfig, authoring, flat},
	model::AnimationDefinition,
};

/// Loads definitions from a [`FileSource`] and shares them between animators.
///
/// Each path is parsed once; later loads of the same path return the cached
/// [`Arc`]. The loader also accumulates the image names referenced by everything
/// it has loaded, so a renderer can batch-load them.
///
/// # Examples
///
/// ```
/// use reanim_types::loader::DefinitionLoader;
/// use reanim_vfs::MemorySource;
///
/// let source = MemorySource::new()
///     .with_file("zombie.reanim", "<fps>12</fps><track><name>head</name><t><i>IMAGE_HEAD</i></t></track>");
/// let mut loader = DefinitionLoader::new(source);
///
/// let first = loader.load("zombie.reanim").unwrap();
/// let second = loader.load("zombie.reanim").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert!(loader.images_used().contains("IMAGE_HEAD"));
/// ```
pub struct DefinitionLoader<S> {
	source: S,
	config: LoadConfig,
	images_used: BTreeSet<String>,
	cache: HashMap<String, Arc<AnimationDefinition>>,
}

impl<S: FileSource> DefinitionLoader<S> {
	/// Creates a loader with the default configuration.
	pub fn new(source: S) -> Self {
		Self::with_config(source, LoadConfig::default())
	}

	/// Creates a loader with an explicit configuration.
	pub fn with_config(source: S, config: LoadConfig) -> Self {
		Self {
			source,
			config,
			images_used: BTreeSet::new(),
			cache: HashMap::new(),
		}
	}

	/// The asset source.
	pub fn source(&self) -> &S {
		&self.source
	}

	/// The load configuration.
	pub fn config(&self) -> &LoadConfig {
		&self.config
	}

	/// Loads `path`, picking the format from what the path names.
	///
	/// A directory is read as an authoring export, anything else as a flat
	/// timeline document.
	///
	/// # Errors
	///
	/// Returns the parser's error. Nothing is cached for a failed load.
	pub fn load(&mut self, path: &str) -> Result<Arc<AnimationDefinition>, AnimError> {
		if self.source.is_dir(path) {
			self.load_authoring(path)
		} else {
			self.load_flat(path)
		}
	}

	/// Loads a flat timeline document.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or parsed.
	pub fn load_flat(&mut self, path: &str) -> Result<Arc<AnimationDefinition>, AnimError> {
		let key = normalize(path);
		if let Some(hit) = self.cache.get(&key) {
			debug!("definition cache hit: {key}");
			return Ok(Arc::clone(hit));
		}

		let text = self
			.source
			.read_to_string(&key)
			.map_err(|e| AnimError::io(Format::Flat, &key, e))?;
		let definition = flat::parse(&text, &self.config, &mut self.images_used)?;
		Ok(self.insert(key, definition))
	}

	/// Loads an authoring export directory.
	///
	/// # Errors
	///
	/// Returns an error if the manifest cannot be read or parsed.
	pub fn load_authoring(&mut self, dir: &str) -> Result<Arc<AnimationDefinition>, AnimError> {
		let key = normalize(dir);
		if let Some(hit) = self.cache.get(&key) {
			debug!("definition cache hit: {key}");
			return Ok(Arc::clone(hit));
		}

		let definition = authoring::parse(&self.source, &key, &self.config, &mut self.images_used)?;
		Ok(self.insert(key, definition))
	}

	fn insert(&mut self, key: String, definition: AnimationDefinition) -> Arc<AnimationDefinition> {
		info!(
			"loaded '{key}': {} tracks, {} frames at {} fps",
			definition.track_count(),
			definition.frame_count(),
			definition.fps()
		);
		let shared = Arc::new(definition);
		self.cache.insert(key, Arc::clone(&shared));
		shared
	}

	/// Returns the cached definition for `path`, if it was loaded before.
	pub fn cached(&self, path: &str) -> Option<Arc<AnimationDefinition>> {
		self.cache.get(&normalize(path)).cloned()
	}

	/// Drops the cached definition for `path`. Animators holding it keep their copy.
	pub fn evict(&mut self, path: &str) -> bool {
		self.cache.remove(&normalize(path)).is_some()
	}

	/// Drops every cached definition.
	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	/// Number of cached definitions.
	pub fn cache_len(&self) -> usize {
		self.cache.len()
	}

	/// Image names referenced by everything loaded so far.
	pub fn images_used(&self) -> &BTreeSet<String> {
		&self.images_used
	}

	/// Takes the accumulated image names, leaving the set empty.
	pub fn take_images_used(&mut self) -> BTreeSet<String> {
		std::mem::take(&mut self.images_used)
	}
}
