//! Prelude module for `reanim_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```
//! use reanim_types::prelude::*;
//!
//! let frame = FrameTransform::hidden();
//! assert_eq!(frame.vis_flag, VIS_HIDDEN);
//! ```

// Errors
#[doc(inline)]
pub use crate::error::{AnimError, Format};

// Loading
#[doc(inline)]
pub use crate::file::LoadConfig;
#[doc(inline)]
pub use crate::loader::DefinitionLoader;

// Math
#[doc(inline)]
pub use crate::math::{Color, Decomposed, Matrix2D, lerp, lerp_degrees, wrap_degrees};

// Model
#[doc(inline)]
pub use crate::model::{
	AnimationDefinition, DEFAULT_FPS, FrameRange, FrameTransform, Track, VIS_HIDDEN, VIS_SHOWN,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
