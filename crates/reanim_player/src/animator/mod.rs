//! Playback of one animation definition.
//!
//! An [`Animator`] is one independent cursor over a shared
//! [`AnimationDefinition`]. Many animators may play the same definition; each
//! owns its cursor, loop policy and per-track overrides and never writes to the
//! definition.
//!
//! # Playback State
//!
//! ```text
//! Stopped --play(Repeat|Once|OnceThenSwitch)--> Playing
//! Playing --pause()/stop()--------------------> Stopped
//! Playing(Once) --reaches frame_end-----------> Stopped (finished)
//! Playing(OnceThenSwitch(t)) --reaches end----> Playing(Repeat) over range of `t`
//! ```
//!
//! # Blend Window
//!
//! [`Animator::play_track`] can open a blend window of N frames. While it is open
//! the cursor does not advance and the pose is held on the frame that was showing
//! when the switch happened; only `vis_flag` and `image_ref` already come from the
//! destination frame. When the window closes the pose cuts to the new range.

mod hooks;
mod overrides;

use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

use log::{debug, warn};
use reanim_types::{
	math::{Color, Matrix2D},
	model::{AnimationDefinition, FrameRange, FrameTransform},
};

pub use self::{hooks::HookId, overrides::TrackOverride};
use self::hooks::{Crossing, FrameHooks};
use crate::{
	attachment::AttachmentId,
	config::PlayerConfig,
	render::{DrawCommand, RenderSink},
};

/// What happens when the cursor reaches the end of the active range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoopPolicy {
	/// Not playing; the pose is held where it is
	#[default]
	None,
	/// Wrap back to the start of the range
	Repeat,
	/// Stop on the last frame of the range
	Once,
	/// Play the range once, then loop over the range of the named track
	OnceThenSwitch(String),
}

/// Alpha and color inherited from whatever draws an animator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tint {
	alpha: f32,
	color: Color,
}

impl Tint {
	const NEUTRAL: Self = Self {
		alpha: 1.0,
		color: Color::WHITE,
	};
}

enum Step {
	Advance,
	Wrap,
	Finish,
	Switch(String),
}

/// Playback cursor over a shared animation definition.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reanim_player::{Animator, LoopPolicy};
/// use reanim_types::model::{AnimationDefinition, FrameTransform, Track};
///
/// let frames = [0.0, 10.0, 20.0]
///     .map(|x| FrameTransform { x, ..FrameTransform::DEFAULT })
///     .to_vec();
/// let def = Arc::new(AnimationDefinition::new(12.0, vec![Track::with_frames("body", frames)]));
///
/// let mut animator = Animator::new(def);
/// animator.play(LoopPolicy::Repeat);
/// animator.update(1.0 / 12.0);
///
/// let pose = animator.interpolated_transform(0).unwrap();
/// assert!((pose.x - 10.0).abs() < 1e-3);
/// ```
pub struct Animator {
	definition: Arc<AnimationDefinition>,
	fps: f32,
	speed: f32,
	current_frame: f32,
	frame_begin: f32,
	frame_end: f32,
	policy: LoopPolicy,
	playing: bool,
	finished: bool,
	pass_start: bool,
	blend_counter: f32,
	blend_counter_max: f32,
	blend_source_frame: u32,
	default_blend_frames: f32,
	max_attach_depth: usize,
	overrides: Vec<TrackOverride>,
	hooks: FrameHooks,
	alpha: f32,
	color: Option<Color>,
	visible: bool,
	alive: bool,
	attached_to: Option<AttachmentId>,
}

impl fmt::Debug for Animator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Animator")
			.field("tracks", &self.definition.track_count())
			.field("fps", &self.fps)
			.field("speed", &self.speed)
			.field("current_frame", &self.current_frame)
			.field("frame_range", &(self.frame_begin, self.frame_end))
			.field("policy", &self.policy)
			.field("playing", &self.playing)
			.field("pass_start", &self.pass_start)
			.field("blend_counter", &self.blend_counter)
			.field("hooks", &self.hooks)
			.field("alpha", &self.alpha)
			.field("color", &self.color)
			.field("visible", &self.visible)
			.field("alive", &self.alive)
			.field("attached_to", &self.attached_to)
			.finish()
	}
}

impl Animator {
	/// Creates a stopped animator over the whole definition.
	pub fn new(definition: Arc<AnimationDefinition>) -> Self {
		Self::with_config(definition, &PlayerConfig::default())
	}

	/// Creates a stopped animator using the limits and defaults of `config`.
	pub fn with_config(definition: Arc<AnimationDefinition>, config: &PlayerConfig) -> Self {
		let mut animator = Self {
			definition: Arc::clone(&definition),
			fps: definition.fps(),
			speed: 1.0,
			current_frame: 0.0,
			frame_begin: 0.0,
			frame_end: 0.0,
			policy: LoopPolicy::None,
			playing: false,
			finished: false,
			pass_start: true,
			blend_counter: 0.0,
			blend_counter_max: 0.0,
			blend_source_frame: 0,
			default_blend_frames: config.default_blend_frames,
			max_attach_depth: config.max_attach_depth,
			overrides: Vec::new(),
			hooks: FrameHooks::default(),
			alpha: 1.0,
			color: None,
			visible: true,
			alive: true,
			attached_to: None,
		};
		animator.init(definition);
		animator
	}

	/// Wraps the animator for sharing with attachments and parent animators.
	pub fn into_shared(self) -> Rc<RefCell<Self>> {
		Rc::new(RefCell::new(self))
	}

	/// Replaces the definition.
	///
	/// Rebuilds the per-track overrides, resets the range to the whole definition,
	/// takes the definition's frame rate and stops playback. Frame hooks are kept.
	pub fn init(&mut self, definition: Arc<AnimationDefinition>) {
		self.overrides = vec![TrackOverride::default(); definition.track_count()];
		self.fps = definition.fps();
		self.frame_begin = 0.0;
		self.frame_end = definition.frame_count().saturating_sub(1) as f32;
		self.current_frame = 0.0;
		self.policy = LoopPolicy::None;
		self.playing = false;
		self.finished = false;
		self.pass_start = true;
		self.clear_blend();
		self.definition = definition;
	}

	/// The shared definition.
	pub fn definition(&self) -> &Arc<AnimationDefinition> {
		&self.definition
	}

	/// Number of tracks.
	pub fn track_count(&self) -> usize {
		self.definition.track_count()
	}

	/// Number of frames of the longest track.
	pub fn total_frames(&self) -> usize {
		self.definition.frame_count()
	}

	/// Playback frame rate.
	pub fn fps(&self) -> f32 {
		self.fps
	}

	/// Overrides the frame rate taken from the definition. Non-positive values are ignored.
	pub fn set_fps(&mut self, fps: f32) {
		if fps.is_finite() && fps > 0.0 {
			self.fps = fps;
		}
	}

	/// Multiplier on frame advance.
	pub fn speed(&self) -> f32 {
		self.speed
	}

	/// Sets the speed multiplier. Negative and non-finite values are ignored.
	pub fn set_speed(&mut self, speed: f32) {
		if speed.is_finite() && speed >= 0.0 {
			self.speed = speed;
		}
	}

	/// The sub-frame cursor.
	pub fn current_frame(&self) -> f32 {
		self.current_frame
	}

	/// Active playback window, inclusive on both ends.
	pub fn frame_range(&self) -> (f32, f32) {
		(self.frame_begin, self.frame_end)
	}

	/// Current loop policy.
	pub fn loop_policy(&self) -> &LoopPolicy {
		&self.policy
	}

	/// Returns `true` while the cursor advances on [`update`](Self::update).
	pub fn is_playing(&self) -> bool {
		self.playing
	}

	/// Returns `true` once a [`LoopPolicy::Once`] run reached the end of its range.
	pub fn is_finished(&self) -> bool {
		self.finished
	}

	/// Returns `true` while a blend window is open.
	pub fn is_blending(&self) -> bool {
		self.blend_counter > 0.0
	}

	/// Frames left in the blend window.
	pub fn blend_counter(&self) -> f32 {
		self.blend_counter
	}

	/// Progress of the blend window in `[0, 1]`; `1` when no window is open.
	pub fn blend_progress(&self) -> f32 {
		if self.blend_counter_max > 0.0 {
			1.0 - self.blend_counter / self.blend_counter_max
		} else {
			1.0
		}
	}

	fn last_frame(&self) -> f32 {
		self.definition.frame_count().saturating_sub(1) as f32
	}

	fn clear_blend(&mut self) {
		self.blend_counter = 0.0;
		self.blend_counter_max = 0.0;
		self.blend_source_frame = 0;
	}

	/// Sets the loop policy and starts playing.
	///
	/// [`LoopPolicy::None`] leaves the animator stopped. With the cursor on the
	/// first frame of the range, that frame's hooks fire on the next update.
	pub fn play(&mut self, policy: LoopPolicy) {
		self.playing = policy != LoopPolicy::None;
		self.finished = false;
		self.pass_start = self.current_frame <= self.frame_begin;
		self.policy = policy;
	}

	/// Resumes playback with the current policy.
	pub fn resume(&mut self) {
		if self.policy != LoopPolicy::None && self.alive {
			self.playing = true;
		}
	}

	/// Stops advancing without moving the cursor.
	pub fn pause(&mut self) {
		self.playing = false;
	}

	/// Stops advancing and rewinds to the start of the range.
	pub fn stop(&mut self) {
		self.playing = false;
		self.finished = false;
		self.current_frame = self.frame_begin;
		self.pass_start = true;
		self.clear_blend();
	}

	/// Moves the cursor, clamped into the active range. Frame hooks do not fire.
	pub fn seek(&mut self, frame: f32) {
		if frame.is_finite() {
			self.current_frame = frame.clamp(self.frame_begin, self.frame_end);
			self.pass_start = false;
		}
	}

	/// Redefines the active window.
	///
	/// Both ends are clamped to the definition and swapped if reversed. The cursor
	/// is only moved as far as needed to stay inside the new window.
	pub fn set_frame_range(&mut self, begin: f32, end: f32) {
		if !begin.is_finite() || !end.is_finite() {
			return;
		}
		let last = self.last_frame();
		let (begin, end) = (begin.clamp(0.0, last), end.clamp(0.0, last));
		let (begin, end) = if begin <= end {
			(begin, end)
		} else {
			(end, begin)
		};
		self.frame_begin = begin;
		self.frame_end = end;
		self.current_frame = self.current_frame.clamp(begin, end);
	}

	fn apply_range(&mut self, range: FrameRange) {
		self.set_frame_range(range.begin() as f32, range.end() as f32);
	}

	/// Sets the active window to the visible span of the track named `name`.
	///
	/// Returns `false` and changes nothing if no track has that name.
	pub fn set_frame_range_by_track_name(&mut self, name: &str) -> bool {
		match self.definition.track_range(name) {
			Some(range) => {
				self.apply_range(range);
				true
			}
			None => {
				warn!("animator: no track named '{name}'");
				false
			}
		}
	}

	/// Switches to the range of track `name`, rewinds to its start and plays it.
	///
	/// `blend_frames` opens a blend window (see the module docs); `None` uses the
	/// configured default. Returns `false` and changes nothing if no track has that
	/// name.
	pub fn play_track(&mut self, name: &str, policy: LoopPolicy, blend_frames: Option<f32>) -> bool {
		let Some(range) = self.definition.track_range(name) else {
			warn!("animator: no track named '{name}'");
			return false;
		};

		let blend = blend_frames.unwrap_or(self.default_blend_frames);
		if blend.is_finite() && blend > 0.0 {
			self.blend_source_frame = self.current_frame.floor().max(0.0) as u32;
			self.blend_counter = blend;
			self.blend_counter_max = blend;
		} else {
			self.clear_blend();
		}

		self.apply_range(range);
		self.current_frame = self.frame_begin;
		self.play(policy);
		debug!("animator: playing '{name}' over {}..={} (blend {blend})", range.begin(), range.end());
		true
	}

	/// Advances playback by `dt` seconds.
	///
	/// Does nothing unless playing. While a blend window is open only the window
	/// counts down. Otherwise the cursor moves by `dt * fps * speed` frames, the
	/// loop policy is applied at the end of the range, and every frame hook whose
	/// frame was passed fires once.
	pub fn update(&mut self, dt: f32) {
		if !self.playing || !self.alive {
			return;
		}
		let advance = dt * self.fps * self.speed;
		if !advance.is_finite() || advance <= 0.0 {
			return;
		}

		if self.blend_counter > 0.0 {
			self.blend_counter = (self.blend_counter - advance).max(0.0);
			if self.blend_counter == 0.0 {
				self.blend_counter_max = 0.0;
				debug!("animator: blend window closed at frame {}", self.current_frame);
			}
			return;
		}

		let previous = self.current_frame;
		let end = self.frame_end;
		let mut next = previous + advance;
		let step = match &self.policy {
			LoopPolicy::Repeat if next > end => Step::Wrap,
			LoopPolicy::Once if next >= end => Step::Finish,
			LoopPolicy::OnceThenSwitch(target) if next >= end => Step::Switch(target.clone()),
			_ => Step::Advance,
		};

		let mut crossing = Crossing {
			from: previous,
			from_inclusive: self.pass_start,
			to: next,
			wrap: None,
		};
		self.pass_start = false;
		match step {
			Step::Advance => {}
			Step::Wrap => {
				let len = end - self.frame_begin;
				next = if len > 0.0 {
					self.frame_begin + (next - self.frame_begin).rem_euclid(len)
				} else {
					self.frame_begin
				};
				crossing.to = next;
				crossing.wrap = Some((end, self.frame_begin));
			}
			Step::Finish => {
				next = end;
				crossing.to = end;
				self.playing = false;
				self.finished = true;
			}
			Step::Switch(target) => {
				crossing.to = end;
				match self.definition.track_range(&target) {
					Some(range) => {
						self.apply_range(range);
						next = self.frame_begin;
						self.policy = LoopPolicy::Repeat;
						self.pass_start = true;
						debug!("animator: switched to '{target}' over {}..={}", range.begin(), range.end());
					}
					None => {
						warn!("animator: switch target '{target}' not found, stopping");
						next = end;
						self.policy = LoopPolicy::Once;
						self.playing = false;
						self.finished = true;
					}
				}
			}
		}

		self.current_frame = next.clamp(self.frame_begin, self.frame_end);
		self.hooks.fire(crossing);
	}

	/// Samples track `index` at the cursor.
	///
	/// Position, scale and alpha are linear between `floor(cursor)` and the next
	/// frame of the track; angles take the shortest arc. Inside a blend window the
	/// numeric fields come from the held source frame while `vis_flag` and
	/// `image_ref` come from the destination frame. Overrides are not applied.
	///
	/// Returns `None` for an unknown index or an empty track.
	pub fn interpolated_transform(&self, index: usize) -> Option<FrameTransform> {
		let frames = self.definition.track(index)?.frames();
		let last = frames.len().checked_sub(1)?;

		let position = if self.is_blending() {
			self.blend_source_frame as f32
		} else {
			self.current_frame
		};
		let floor = position.floor().max(0.0);
		let i = (floor as usize).min(last);
		let j = (i + 1).min(last);
		let frac = if i == j {
			0.0
		} else {
			(position - floor).clamp(0.0, 1.0)
		};

		let mut sample = frames[i].interpolate(&frames[j], frac);
		if self.is_blending() {
			let destination = &frames[(self.current_frame.floor().max(0.0) as usize).min(last)];
			sample.vis_flag = destination.vis_flag;
			sample.image_ref = destination.image_ref.clone();
		}
		Some(sample)
	}

	/// Samples the first track named `name`.
	pub fn interpolated_transform_by_name(&self, name: &str) -> Option<FrameTransform> {
		self.interpolated_transform(self.definition.track_index(name)?)
	}

	/// Samples track `index` and applies its overrides (offset and image).
	pub fn track_transform(&self, index: usize) -> Option<FrameTransform> {
		let mut sample = self.interpolated_transform(index)?;
		let overrides = self.overrides.get(index)?;
		sample.x += overrides.offset_x;
		sample.y += overrides.offset_y;
		if let Some(image) = &overrides.image {
			sample.image_ref.clone_from(image);
		}
		Some(sample)
	}

	/// World matrix of track `index` under `parent`, for placing external objects on a track.
	pub fn track_world_matrix(&self, index: usize, parent: &Matrix2D) -> Option<Matrix2D> {
		self.track_transform(index).map(|sample| *parent * sample.to_matrix())
	}

	/// Overrides of track `index`.
	pub fn track_override(&self, index: usize) -> Option<&TrackOverride> {
		self.overrides.get(index)
	}

	/// Mutable overrides of track `index`.
	pub fn track_override_mut(&mut self, index: usize) -> Option<&mut TrackOverride> {
		self.overrides.get_mut(index)
	}

	fn each_named(&mut self, name: &str, mut apply: impl FnMut(&mut TrackOverride)) -> usize {
		let indices = self.definition.track_indices(name);
		for &index in &indices {
			if let Some(overrides) = self.overrides.get_mut(index) {
				apply(overrides);
			}
		}
		indices.len()
	}

	/// Shows or hides track `index`. Returns `false` for an unknown index.
	pub fn set_track_visible(&mut self, index: usize, visible: bool) -> bool {
		self.track_override_mut(index).map(|o| o.visible = visible).is_some()
	}

	/// Shows or hides every track named `name`. Returns the number of tracks changed.
	pub fn set_track_visible_by_name(&mut self, name: &str, visible: bool) -> usize {
		self.each_named(name, |o| o.visible = visible)
	}

	/// Replaces (or with `None`, restores) the image of track `index`.
	pub fn set_track_image(&mut self, index: usize, image: Option<&str>) -> bool {
		self.track_override_mut(index).map(|o| o.image = image.map(str::to_string)).is_some()
	}

	/// Replaces the image of every track named `name`.
	pub fn set_track_image_by_name(&mut self, name: &str, image: Option<&str>) -> usize {
		self.each_named(name, |o| o.image = image.map(str::to_string))
	}

	/// Offsets track `index` by `(x, y)`.
	pub fn set_track_offset(&mut self, index: usize, x: f32, y: f32) -> bool {
		self.track_override_mut(index)
			.map(|o| {
				o.offset_x = x;
				o.offset_y = y;
			})
			.is_some()
	}

	/// Offsets every track named `name` by `(x, y)`.
	pub fn set_track_offset_by_name(&mut self, name: &str, x: f32, y: f32) -> usize {
		self.each_named(name, |o| {
			o.offset_x = x;
			o.offset_y = y;
		})
	}

	/// Attaches `child` to track `index`, drawn with `track_world * matrix`.
	///
	/// Only a weak reference is kept. Returns `false` for an unknown index or when
	/// `child` is this animator.
	pub fn attach_child(&mut self, index: usize, child: &Rc<RefCell<Animator>>, matrix: Matrix2D) -> bool {
		if std::ptr::eq(child.as_ptr().cast_const(), &*self) {
			warn!("animator: cannot attach an animator to itself");
			return false;
		}
		self.track_override_mut(index)
			.map(|o| {
				o.child = Some(Rc::downgrade(child));
				o.child_matrix = Some(matrix);
			})
			.is_some()
	}

	/// Attaches `child` to every track named `name`.
	pub fn attach_child_by_name(&mut self, name: &str, child: &Rc<RefCell<Animator>>, matrix: Matrix2D) -> usize {
		if std::ptr::eq(child.as_ptr().cast_const(), &*self) {
			warn!("animator: cannot attach an animator to itself");
			return 0;
		}
		self.each_named(name, |o| {
			o.child = Some(Rc::downgrade(child));
			o.child_matrix = Some(matrix);
		})
	}

	/// Removes the child of track `index`. Returns `true` if one was attached.
	pub fn detach_child(&mut self, index: usize) -> bool {
		let Some(overrides) = self.track_override_mut(index) else {
			return false;
		};
		overrides.child_matrix = None;
		overrides.child.take().is_some()
	}

	/// Registers `callback` for integer frame `frame`.
	///
	/// It fires at most once per update, when the cursor passes `frame` while
	/// playing. Seeking and stopping do not fire it.
	pub fn on_frame(&mut self, frame: u32, callback: impl FnMut(u32) + 'static) -> HookId {
		self.hooks.add(frame, Box::new(callback))
	}

	/// Unregisters a frame hook. Returns `false` if it was already gone.
	pub fn remove_hook(&mut self, id: HookId) -> bool {
		self.hooks.remove(id)
	}

	/// Unregisters every frame hook.
	pub fn clear_hooks(&mut self) {
		self.hooks.clear();
	}

	/// Number of registered frame hooks.
	pub fn hook_count(&self) -> usize {
		self.hooks.len()
	}

	/// Animator-wide opacity multiplier.
	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	/// Sets the opacity multiplier, clamped into `[0, 1]`.
	pub fn set_alpha(&mut self, alpha: f32) {
		if alpha.is_finite() {
			self.alpha = alpha.clamp(0.0, 1.0);
		}
	}

	/// Color override, if any.
	pub fn color(&self) -> Option<Color> {
		self.color
	}

	/// Sets or clears the color override.
	pub fn override_color(&mut self, color: Option<Color>) {
		self.color = color;
	}

	/// Returns `true` unless the whole animator is hidden.
	pub fn is_visible(&self) -> bool {
		self.visible
	}

	/// Shows or hides the whole animator.
	pub fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
	}

	/// Returns `false` once [`die`](Self::die) was called.
	pub fn is_alive(&self) -> bool {
		self.alive
	}

	/// Stops the animator for good. Attachments drop dead animators on their next update.
	pub fn die(&mut self) {
		self.alive = false;
		self.playing = false;
	}

	/// The attachment holding this animator, if any.
	pub fn attached_to(&self) -> Option<AttachmentId> {
		self.attached_to
	}

	pub(crate) fn set_attached_to(&mut self, attachment: Option<AttachmentId>) {
		self.attached_to = attachment;
	}

	/// Emits a draw command for every visible track with an image, then draws
	/// attached children on top of their tracks.
	///
	/// Returns the number of commands emitted, children included.
	pub fn draw(&self, parent: &Matrix2D, sink: &mut dyn RenderSink) -> usize {
		self.draw_tinted(parent, sink, Tint::NEUTRAL, 0)
	}

	fn draw_tinted(&self, parent: &Matrix2D, sink: &mut dyn RenderSink, inherited: Tint, depth: usize) -> usize {
		if !self.alive || !self.visible {
			return 0;
		}
		if depth > self.max_attach_depth {
			warn!("animator: child nesting deeper than {}, not drawn", self.max_attach_depth);
			return 0;
		}

		let tint = Tint {
			alpha: inherited.alpha * self.alpha,
			color: self.color.map_or(inherited.color, |color| color.multiply(inherited.color)),
		};
		let mut drawn = 0;
		for (index, track) in self.definition.tracks().iter().enumerate() {
			let Some(overrides) = self.overrides.get(index) else {
				continue;
			};
			if !track.is_available() || !overrides.visible {
				continue;
			}
			let Some(sample) = self.track_transform(index) else {
				continue;
			};
			if !sample.is_visible() {
				continue;
			}

			let world = *parent * sample.to_matrix();
			if sample.has_image() {
				sink.draw(DrawCommand::from_world(&sample.image_ref, &world, sample.alpha * tint.alpha, tint.color, true));
				drawn += 1;
			}
			if let Some(child) = overrides.child() {
				let placement = world * overrides.child_matrix.unwrap_or(Matrix2D::IDENTITY);
				match child.try_borrow() {
					Ok(child) => drawn += child.draw_tinted(&placement, sink, tint, depth + 1),
					Err(_) => warn!("animator: child on track {index} is borrowed, not drawn"),
				}
			}
		}
		drawn
	}

	/// One command per track that has an image, hidden ones included with
	/// `visible == false`. Children are not included.
	pub fn pose(&self, parent: &Matrix2D) -> Vec<DrawCommand> {
		let color = self.color.unwrap_or(Color::WHITE);
		self.definition
			.tracks()
			.iter()
			.enumerate()
			.filter_map(|(index, track)| {
				let sample = self.track_transform(index)?;
				if !sample.has_image() {
					return None;
				}
				let shown = self.alive
					&& self.visible && track.is_available()
					&& self.overrides[index].visible
					&& sample.is_visible();
				let world = *parent * sample.to_matrix();
				Some(DrawCommand::from_world(&sample.image_ref, &world, sample.alpha * self.alpha, color, shown))
			})
			.collect()
	}
}
