//! Bitmap resolution for authoring exports.

use std::collections::HashMap;

use log::{debug, warn};
use reanim_vfs::{FileSource, join};

use crate::file::{LoadConfig, xml};

/// Symbols nested deeper than this are not followed.
const MAX_SYMBOL_DEPTH: usize = 8;

/// State threaded through one authoring load.
///
/// Holds everything the parser would otherwise keep in globals: the asset source,
/// the base directory of the export, the library directory found inside it, the
/// explicit bitmap manifest and a cache of resolved names. A fresh context is built
/// per load, so concurrent or repeated loads cannot interfere.
pub struct ParseContext<'a> {
	source: &'a dyn FileSource,
	config: &'a LoadConfig,
	base_dir: String,
	library_dir: Option<String>,
	manifest: HashMap<String, String>,
	resolved: HashMap<String, Option<String>>,
}

impl<'a> ParseContext<'a> {
	/// Creates a context for the export rooted at `base_dir`.
	pub fn new(source: &'a dyn FileSource, config: &'a LoadConfig, base_dir: &str) -> Self {
		let library_dir = source.find_child_ignore_case(base_dir, &config.library_dir_name);
		if library_dir.is_none() {
			debug!("authoring timeline: no {} directory under '{base_dir}'", config.library_dir_name);
		}
		Self {
			source,
			config,
			base_dir: base_dir.to_string(),
			library_dir,
			manifest: HashMap::new(),
			resolved: HashMap::new(),
		}
	}

	/// Library directory, if the export has one.
	pub fn library_dir(&self) -> Option<&str> {
		self.library_dir.as_deref()
	}

	/// Configuration of the load.
	pub fn config(&self) -> &LoadConfig {
		self.config
	}

	/// Registers the `DOMBitmapItem` entries of a `<media>` element.
	///
	/// Each item maps its library name (with and without extension) to its
	/// `href`, relative to the library directory.
	pub fn register_manifest(&mut self, media: &xml::Element) {
		for item in media.children_named("DOMBitmapItem") {
			let Some(name) = item.attr("name") else {
				continue;
			};
			let href = item.attr("href").unwrap_or(name).to_string();
			if let Some((stem, _)) = name.rsplit_once('.') {
				self.manifest.entry(stem.to_string()).or_insert_with(|| href.clone());
			}
			self.manifest.insert(name.to_string(), href);
		}
	}

	/// Resolves a library item name to a bitmap path inside the source.
	///
	/// Lookup order: the explicit manifest, then every candidate directory with
	/// the bare name and each configured extension, then the same with the
	/// lower-cased name, and finally symbol indirection (a symbol document in the
	/// library that places a bitmap). The first match wins. A miss is cached and
	/// returns `None`.
	pub fn resolve(&mut self, item_name: &str) -> Option<String> {
		if let Some(hit) = self.resolved.get(item_name) {
			return hit.clone();
		}
		let found = self.resolve_at_depth(item_name, 0);
		match &found {
			Some(path) => debug!("authoring timeline: '{item_name}' -> '{path}'"),
			None => warn!("authoring timeline: bitmap '{item_name}' not found, frames using it are skipped"),
		}
		self.resolved.insert(item_name.to_string(), found.clone());
		found
	}

	/// Every bitmap path resolved so far.
	pub fn resolved_paths(&self) -> impl Iterator<Item = &str> {
		self.resolved.values().filter_map(|path| path.as_deref())
	}

	fn resolve_at_depth(&self, name: &str, depth: usize) -> Option<String> {
		if let Some(path) = self.from_manifest(name) {
			return Some(path);
		}
		if let Some(path) = self.probe(name) {
			return Some(path);
		}
		if self.config.lowercase_fallback {
			let lower = name.to_lowercase();
			if lower != name {
				if let Some(path) = self.probe(&lower) {
					return Some(path);
				}
			}
		}
		if depth < MAX_SYMBOL_DEPTH {
			return self.symbol_bitmap(name, depth);
		}
		None
	}

	fn library_or_base(&self) -> &str {
		self.library_dir.as_deref().unwrap_or(&self.base_dir)
	}

	fn from_manifest(&self, name: &str) -> Option<String> {
		let href = self.manifest.get(name)?;
		[join(self.library_or_base(), href), join(&self.base_dir, href)]
			.into_iter()
			.find(|path| self.source.exists(path))
	}

	fn probe(&self, name: &str) -> Option<String> {
		let root = self.library_or_base();
		for dir in &self.config.candidate_dirs {
			let dir = join(root, dir);
			let bare = std::iter::once("");
			for ext in bare.chain(self.config.image_extensions.iter().map(String::as_str)) {
				let path = join(&dir, &format!("{name}{ext}"));
				if self.source.exists(&path) {
					return Some(path);
				}
			}
		}
		None
	}

	/// Follows a symbol document to the first bitmap it places.
	fn symbol_bitmap(&self, name: &str, depth: usize) -> Option<String> {
		let library = self.library_dir.as_deref()?;
		let path = self.source.find_child_ignore_case(library, &format!("{name}.xml"))?;
		let text = self.source.read_to_string(&path).ok()?;
		let root = match xml::parse(&text, self.config.max_elements) {
			Ok(root) => root,
			Err(err) => {
				warn!("authoring timeline: cannot read symbol '{path}': {err}");
				return None;
			}
		};

		let instance = find_descendant(&root, &["DOMBitmapInstance", "DOMSymbolInstance"])?;
		let inner = instance.attr("libraryItemName")?;
		if inner == name {
			return None;
		}
		self.resolve_at_depth(inner, depth + 1)
	}
}

/// Depth-first search for the first element whose name is in `names`.
pub(crate) fn find_descendant<'e>(element: &'e xml::Element, names: &[&str]) -> Option<&'e xml::Element> {
	for child in element.children() {
		if names.contains(&child.name()) {
			return Some(child);
		}
		if let Some(found) = find_descendant(child, names) {
			return Some(found);
		}
	}
	None
}
