//! Prelude module for `reanim_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use reanim_internal::prelude::*;
//!
//! let source = MemorySource::new()
//!     .with_file("walk.reanim", "<fps>12</fps><track><name>leg</name><t/><t><kx>15</kx></t></track>");
//! let mut loader = DefinitionLoader::new(source);
//! let def = loader.load("walk.reanim").unwrap();
//!
//! let mut animator = Animator::new(def);
//! assert!(animator.play_track("leg", LoopPolicy::Repeat, None));
//! ```

// Re-export everything from the member preludes
#[doc(inline)]
pub use reanim_player::prelude::*;
#[doc(inline)]
pub use reanim_types::prelude::*;
#[doc(inline)]
pub use reanim_vfs::{DiskSource, FileSource, MemorySource};

// Re-export the member crates for advanced usage
#[doc(inline)]
pub use reanim_player;
#[doc(inline)]
pub use reanim_types;
