//! Prelude module for `reanim_player`.

#[doc(inline)]
pub use crate::{
	Animator, Attachment, AttachmentId, AttachmentSystem, DrawCommand, Effect, EffectFlags, HookId,
	LoopPolicy, PlayerConfig, RenderSink, TrackOverride,
};

// Math types used by the drawing API
#[doc(inline)]
pub use reanim_types::math::{Color, Matrix2D};
