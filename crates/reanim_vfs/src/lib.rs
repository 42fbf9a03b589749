//! Read-only asset access for `reanim-rs`.
//!
//! The timeline parsers never touch the file system directly. They read through a
//! [`FileSource`], which lets the same loader run against a directory on disk
//! ([`DiskSource`]) or against assets embedded in memory ([`MemorySource`]).
//!
//! Paths handed to a source are always relative to the source root and use `/`
//! as separator. Both implementations normalise `\` to `/` and collapse `.` / `..`
//! components before lookup.
//!
//! # Examples
//!
//! ```
//! use reanim_vfs::{FileSource, MemorySource};
//!
//! let mut source = MemorySource::new();
//! source.insert("zombie/DOMDocument.xml", b"<DOMDocument/>".to_vec());
//!
//! assert!(source.exists("zombie/DOMDocument.xml"));
//! assert_eq!(source.list_dir("zombie").unwrap(), vec!["DOMDocument.xml".to_string()]);
//! ```

use std::{
	collections::BTreeMap,
	io,
	path::{Path, PathBuf},
};

/// Read-only access to animation assets.
pub trait FileSource {
	/// Reads the whole file at `path`.
	fn read(&self, path: &str) -> io::Result<Vec<u8>>;

	/// Returns `true` if `path` names an existing file.
	fn exists(&self, path: &str) -> bool;

	/// Returns `true` if `path` names an existing directory.
	fn is_dir(&self, path: &str) -> bool;

	/// Lists the entry names (files and directories) directly under `path`.
	fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;

	/// Reads the file at `path` as UTF-8 text.
	///
	/// A UTF-8 byte order mark is stripped.
	fn read_to_string(&self, path: &str) -> io::Result<String> {
		let bytes = self.read(path)?;
		let text = String::from_utf8(bytes)
			.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
		Ok(match text.strip_prefix('\u{feff}') {
			Some(stripped) => stripped.to_string(),
			None => text,
		})
	}

	/// Finds the entry under `dir` whose name equals `name` ignoring ASCII case.
	///
	/// An exact match wins over a case-insensitive one. Returns the joined path.
	fn find_child_ignore_case(&self, dir: &str, name: &str) -> Option<String> {
		let entries = self.list_dir(dir).ok()?;
		let found = entries
			.iter()
			.find(|entry| entry.as_str() == name)
			.or_else(|| entries.iter().find(|entry| entry.eq_ignore_ascii_case(name)))?;
		Some(join(dir, found))
	}
}

/// Joins two relative source paths with `/` and normalises the result.
pub fn join(base: &str, child: &str) -> String {
	if base.is_empty() {
		return normalize(child);
	}
	if child.is_empty() {
		return normalize(base);
	}
	normalize(&format!("{base}/{child}"))
}

/// Normalises a relative source path.
///
/// Backslashes become `/`, empty and `.` components are dropped and `..` pops the
/// previous component (never above the root).
pub fn normalize(path: &str) -> String {
	let mut parts: Vec<&str> = Vec::new();
	for component in path.split(['/', '\\']) {
		match component {
			"" | "." => {}
			".." => {
				parts.pop();
			}
			other => parts.push(other),
		}
	}
	parts.join("/")
}

/// Returns the parent directory of a relative source path (`""` for top-level entries).
pub fn parent(path: &str) -> String {
	let normalized = normalize(path);
	match normalized.rfind('/') {
		Some(idx) => normalized[..idx].to_string(),
		None => String::new(),
	}
}

/// A [`FileSource`] rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskSource {
	root: PathBuf,
}

impl DiskSource {
	/// Creates a source that resolves every path relative to `root`.
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
		}
	}

	/// Returns the root directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &str) -> PathBuf {
		let normalized = normalize(path);
		if normalized.is_empty() {
			self.root.clone()
		} else {
			self.root.join(normalized)
		}
	}
}

impl FileSource for DiskSource {
	fn read(&self, path: &str) -> io::Result<Vec<u8>> {
		let full = self.resolve(path);
		log::trace!("reading {}", full.display());
		std::fs::read(full)
	}

	fn exists(&self, path: &str) -> bool {
		self.resolve(path).is_file()
	}

	fn is_dir(&self, path: &str) -> bool {
		self.resolve(path).is_dir()
	}

	fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
		let mut names = Vec::new();
		for entry in std::fs::read_dir(self.resolve(path))? {
			let entry = entry?;
			if let Some(name) = entry.file_name().to_str() {
				names.push(name.to_string());
			}
		}
		names.sort();
		Ok(names)
	}
}

/// An in-memory [`FileSource`].
///
/// Directories exist implicitly as prefixes of inserted files.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts (or replaces) a file.
	pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
		self.files.insert(normalize(path), data.into());
	}

	/// Builder-style [`MemorySource::insert`].
	pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
		self.insert(path, data);
		self
	}

	/// Number of files held.
	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Returns `true` when no file has been inserted.
	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}
}

impl FileSource for MemorySource {
	fn read(&self, path: &str) -> io::Result<Vec<u8>> {
		self.files.get(&normalize(path)).cloned().ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
		})
	}

	fn exists(&self, path: &str) -> bool {
		self.files.contains_key(&normalize(path))
	}

	fn is_dir(&self, path: &str) -> bool {
		let dir = normalize(path);
		if dir.is_empty() {
			return true;
		}
		let prefix = format!("{dir}/");
		self.files.keys().any(|key| key.starts_with(&prefix))
	}

	fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
		let dir = normalize(path);
		let prefix = if dir.is_empty() {
			String::new()
		} else {
			format!("{dir}/")
		};

		let mut names: Vec<String> = self
			.files
			.keys()
			.filter_map(|key| key.strip_prefix(prefix.as_str()))
			.filter_map(|rest| rest.split('/').next())
			.map(str::to_string)
			.collect();
		names.sort();
		names.dedup();

		if names.is_empty() && !dir.is_empty() {
			return Err(io::Error::new(
				io::ErrorKind::NotFound,
				format!("no such directory: {path}"),
			));
		}
		Ok(names)
	}
}
