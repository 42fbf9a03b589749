//! This module is separated into its own crate to enable simple dynamic linking for `reanim-rs`, and should not be used directly.

/// `use reanim_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export the member crates for convenience
pub use reanim_player;
pub use reanim_types;
pub use reanim_vfs;

// Re-export commonly used types at crate root
pub use reanim_player::{Animator, AttachmentSystem, LoopPolicy};
pub use reanim_types::{error::AnimError, loader::DefinitionLoader, model::AnimationDefinition};
pub use reanim_vfs::{DiskSource, FileSource, MemorySource};
