#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `reanim-rs` is a track-based 2D animation engine: it loads flat and
//! authoring-tool timelines, plays them back with interpolation and loop
//! policies, and composes independent animators into attachment graphs.
//!
//! ```
//! use reanim_rs::prelude::*;
//!
//! let source = MemorySource::new().with_file(
//!     "blink.reanim",
//!     "<fps>12</fps><track><name>eye</name><t><i>IMAGE_EYE</i></t><t><f>1</f></t></track>",
//! );
//! let mut loader = DefinitionLoader::new(source);
//! let mut animator = Animator::new(loader.load("blink.reanim").unwrap());
//!
//! let mut commands = Vec::new();
//! animator.draw(&Matrix2D::IDENTITY, &mut commands);
//! assert_eq!(commands.len(), 1);
//! ```
pub use reanim_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use reanim_dylib;
