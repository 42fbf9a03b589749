//! Animation data model: frame transforms, tracks and definitions.

mod definition;
mod track;
mod transform;

pub use definition::{AnimationDefinition, DEFAULT_FPS};
pub use track::{FrameRange, Track};
pub use transform::{FrameTransform, VIS_HIDDEN, VIS_SHOWN};
