//! Playback and composition for the `reanim-rs` project.
//!
//! - [`Animator`]: one playback cursor over a shared
//!   [`AnimationDefinition`](reanim_types::model::AnimationDefinition), with loop
//!   policies, range switching, a blend window, per-track overrides and frame hooks
//! - [`AttachmentSystem`]: named attachments composing animators (and each other)
//!   with offset transforms and cascading visibility, alpha and color
//! - [`RenderSink`]: where draw commands go
//!
//! Everything here is single threaded and frame stepped: call `update` once per
//! tick for every live animator or attachment, then `draw`.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use reanim_player::prelude::*;
//! use reanim_types::model::{AnimationDefinition, FrameTransform, Track};
//!
//! let frames = vec![FrameTransform { image_ref: "IMAGE_BODY".into(), ..FrameTransform::DEFAULT }; 4];
//! let def = Arc::new(AnimationDefinition::new(12.0, vec![Track::with_frames("body", frames)]));
//!
//! let mut animator = Animator::new(def);
//! animator.play(LoopPolicy::Repeat);
//! animator.update(0.1);
//!
//! let mut commands = Vec::new();
//! animator.draw(&Matrix2D::IDENTITY, &mut commands);
//! assert_eq!(commands[0].image_ref, "IMAGE_BODY");
//! ```

pub mod animator;
pub mod attachment;
mod config;
pub mod render;

pub use animator::{Animator, HookId, LoopPolicy, TrackOverride};
pub use attachment::{Attachment, AttachmentId, AttachmentSystem, Effect, EffectFlags, EffectSlot};
pub use config::PlayerConfig;
pub use render::{CountingSink, DrawCommand, RenderSink};

/// `use reanim_player::prelude::*;` to import commonly used items.
pub mod prelude;
