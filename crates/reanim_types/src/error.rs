//! Error types for animation loading.

use std::fmt;

use thiserror::Error;

/// Source format an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
	/// Flat tag-per-track timeline (`.reanim` style)
	Flat,
	/// Authoring-tool export directory (`DOMDocument.xml` + `LIBRARY/`)
	Authoring,
	/// Generic tag/XML syntax, before a specific format is known
	Xml,
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Flat => write!(f, "flat timeline"),
			Self::Authoring => write!(f, "authoring timeline"),
			Self::Xml => write!(f, "xml"),
		}
	}
}

/// Errors that can occur while loading an animation definition.
///
/// A load that returns an error publishes nothing. Recoverable problems inside a
/// document (one malformed frame run, one unreadable property) are logged and
/// skipped instead of being reported here.
#[derive(Debug, Error)]
pub enum AnimError {
	/// The asset could not be read
	#[error("{format}: cannot read '{path}': {source}")]
	Io {
		/// Format being loaded
		format: Format,
		/// Path that failed
		path: String,
		/// Underlying I/O error
		#[source]
		source: std::io::Error,
	},

	/// The document is not well-formed
	#[error("{format}: syntax error at line {line}: {message}")]
	Syntax {
		/// Format being loaded
		format: Format,
		/// 1-based line of the offending token
		line: usize,
		/// Human readable description
		message: String,
	},

	/// A required element is absent
	#[error("{format}: missing required element <{element}>")]
	MissingElement {
		/// Format being loaded
		format: Format,
		/// Element name
		element: String,
	},

	/// A required value could not be interpreted
	#[error("{format}: invalid value '{value}' for {field}")]
	InvalidValue {
		/// Format being loaded
		format: Format,
		/// Field or attribute name
		field: String,
		/// Raw value found in the document
		value: String,
	},

	/// The document exceeds the configured element limit
	#[error("{format}: document exceeds the limit of {limit} elements")]
	TooLarge {
		/// Format being loaded
		format: Format,
		/// Configured limit
		limit: usize,
	},
}

impl AnimError {
	/// Creates an I/O error for `path`.
	pub fn io(format: Format, path: impl Into<String>, source: std::io::Error) -> Self {
		Self::Io {
			format,
			path: path.into(),
			source,
		}
	}

	/// Creates a syntax error at `line`.
	pub fn syntax(format: Format, line: usize, message: impl Into<String>) -> Self {
		Self::Syntax {
			format,
			line,
			message: message.into(),
		}
	}

	/// Creates a missing element error.
	pub fn missing(format: Format, element: impl Into<String>) -> Self {
		Self::MissingElement {
			format,
			element: element.into(),
		}
	}

	/// Creates an invalid value error.
	pub fn invalid(format: Format, field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::InvalidValue {
			format,
			field: field.into(),
			value: value.into(),
		}
	}

	/// Returns the format the error belongs to.
	pub fn format(&self) -> Format {
		match self {
			Self::Io {
				format,
				..
			}
			| Self::Syntax {
				format,
				..
			}
			| Self::MissingElement {
				format,
				..
			}
			| Self::InvalidValue {
				format,
				..
			}
			| Self::TooLarge {
				format,
				..
			} => *format,
		}
	}

	/// Re-tags an error raised by the generic tag reader with the concrete format.
	pub fn in_format(self, format: Format) -> Self {
		match self {
			Self::Io {
				path,
				source,
				..
			} => Self::Io {
				format,
				path,
				source,
			},
			Self::Syntax {
				line,
				message,
				..
			} => Self::Syntax {
				format,
				line,
				message,
			},
			Self::MissingElement {
				element,
				..
			} => Self::MissingElement {
				format,
				element,
			},
			Self::InvalidValue {
				field,
				value,
				..
			} => Self::InvalidValue {
				format,
				field,
				value,
			},
			Self::TooLarge {
				limit,
				..
			} => Self::TooLarge {
				format,
				limit,
			},
		}
	}
}
