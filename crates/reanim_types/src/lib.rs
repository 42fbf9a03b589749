//! This crate provides the data model and timeline file formats for the `reanim-rs` project.
//!
//! # File Formats
//!
//! - **Flat timeline**: one delta-encoded text document per animation (`<fps>`, `<track>`, `<t>`)
//! - **Authoring timeline**: an XFL-style export directory (`DOMDocument.xml` + bitmap library)
//!
//! Both formats load into the same immutable [`AnimationDefinition`](model::AnimationDefinition),
//! which animators share through an [`Arc`](std::sync::Arc).
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```
//! use reanim_types::prelude::*;
//! use reanim_vfs::MemorySource;
//!
//! let source = MemorySource::new()
//!     .with_file("idle.reanim", "<fps>12</fps><track><name>body</name><t/><t><x>4</x></t></track>");
//! let mut loader = DefinitionLoader::new(source);
//! let def = loader.load("idle.reanim").unwrap();
//! assert_eq!(def.frame_count(), 2);
//! ```
//!
//! Or use explicit paths:
//!
//! ```
//! use std::collections::BTreeSet;
//! use reanim_types::file::{LoadConfig, flat};
//!
//! let mut images = BTreeSet::new();
//! let def = flat::parse("<fps>30</fps>", &LoadConfig::default(), &mut images).unwrap();
//! assert_eq!(def.track_count(), 0);
//! ```

pub mod error;
pub mod file;
pub mod loader;
pub mod math;
pub mod model;

/// `use reanim_types::prelude::*;` to import commonly used items.
pub mod prelude;
