//! Attachment graphs.
//!
//! An [`AttachmentSystem`] owns named [`Attachment`]s. Each attachment holds a
//! bounded list of effects (animators, or other attachments) placed with their own
//! offset transform. Drawing composes `parent * attachment.transform * offset`;
//! visibility, alpha and color cascade from an attachment down to its effects
//! unless an effect opts out through its [`EffectFlags`].
//!
//! An effect belongs to at most one attachment at a time. Ownership only points
//! down: an animator stores the [`AttachmentId`] of its holder, never a pointer
//! to it.
//!
//! Every operation reports failure through its return value and leaves the
//! system unchanged when it fails.

use std::{
	cell::RefCell,
	collections::HashMap,
	fmt,
	rc::Rc,
	sync::atomic::{AtomicU64, Ordering},
};

use log::{debug, warn};
use reanim_types::math::{Color, Matrix2D};

use crate::{animator::Animator, config::PlayerConfig, render::RenderSink};

static NEXT_ATTACHMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of an attachment, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(u64);

impl AttachmentId {
	fn next() -> Self {
		Self(NEXT_ATTACHMENT_ID.fetch_add(1, Ordering::Relaxed))
	}

	/// Raw value of the identifier.
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for AttachmentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Something an attachment can hold.
#[derive(Debug, Clone)]
pub enum Effect {
	/// A playing animator
	Animator(Rc<RefCell<Animator>>),
	/// Another attachment of the same system, forming a tree
	Attachment(AttachmentId),
}

impl Effect {
	/// Returns `true` if both values name the same effect.
	pub fn same(&self, other: &Effect) -> bool {
		match (self, other) {
			(Self::Animator(a), Self::Animator(b)) => Rc::ptr_eq(a, b),
			(Self::Attachment(a), Self::Attachment(b)) => a == b,
			_ => false,
		}
	}
}

impl From<Rc<RefCell<Animator>>> for Effect {
	fn from(animator: Rc<RefCell<Animator>>) -> Self {
		Self::Animator(animator)
	}
}

impl From<AttachmentId> for Effect {
	fn from(id: AttachmentId) -> Self {
		Self::Attachment(id)
	}
}

/// Per-effect behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectFlags {
	/// Skip drawing while the holding attachment is hidden
	pub dont_draw_if_parent_hidden: bool,
	/// Ignore color and alpha cascades
	pub dont_propagate_color: bool,
	/// Place the effect relative to the attachment (otherwise the offset is absolute)
	pub inherit_transform: bool,
	/// Follow visibility cascades
	pub inherit_visibility: bool,
}

impl Default for EffectFlags {
	fn default() -> Self {
		Self {
			dont_draw_if_parent_hidden: false,
			dont_propagate_color: false,
			inherit_transform: true,
			inherit_visibility: true,
		}
	}
}

/// One entry of an attachment's effect list.
#[derive(Debug, Clone)]
pub struct EffectSlot {
	effect: Effect,
	offset: Matrix2D,
	flags: EffectFlags,
}

impl EffectSlot {
	/// The effect.
	pub fn effect(&self) -> &Effect {
		&self.effect
	}

	/// Offset transform relative to the attachment.
	pub fn offset(&self) -> &Matrix2D {
		&self.offset
	}

	/// Behaviour switches.
	pub fn flags(&self) -> EffectFlags {
		self.flags
	}
}

/// A named node of an attachment graph.
#[derive(Debug)]
pub struct Attachment {
	id: AttachmentId,
	name: String,
	effects: Vec<EffectSlot>,
	transform: Matrix2D,
	parent: Option<AttachmentId>,
	alive: bool,
	visible: bool,
	alpha: f32,
	color: Option<Color>,
}

impl Attachment {
	fn new(id: AttachmentId, name: String) -> Self {
		Self {
			id,
			name,
			effects: Vec::new(),
			transform: Matrix2D::IDENTITY,
			parent: None,
			alive: true,
			visible: true,
			alpha: 1.0,
			color: None,
		}
	}

	/// Identifier.
	pub fn id(&self) -> AttachmentId {
		self.id
	}

	/// Unique name within the owning system.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Held effects, in draw order.
	pub fn effects(&self) -> &[EffectSlot] {
		&self.effects
	}

	/// Number of held effects.
	pub fn effect_count(&self) -> usize {
		self.effects.len()
	}

	/// Local transform.
	pub fn transform(&self) -> &Matrix2D {
		&self.transform
	}

	/// The attachment holding this one, if any.
	pub fn parent(&self) -> Option<AttachmentId> {
		self.parent
	}

	/// Returns `true` if another attachment holds this one.
	pub fn is_attached(&self) -> bool {
		self.parent.is_some()
	}

	/// Returns `false` once the attachment died.
	pub fn is_alive(&self) -> bool {
		self.alive
	}

	/// Visibility flag.
	pub fn is_visible(&self) -> bool {
		self.visible
	}

	/// Alpha multiplied into held animators when drawing.
	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	/// Color override, if any.
	pub fn color(&self) -> Option<Color> {
		self.color
	}
}

/// Receiver of a cascade: the attachment itself, a nested attachment, or an animator.
enum Target<'a> {
	Attachment(&'a mut Attachment),
	Animator(&'a mut Animator),
}

/// Owner of every attachment of one scene.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use reanim_player::{Animator, AttachmentSystem, Effect};
/// use reanim_types::model::AnimationDefinition;
///
/// let def = Arc::new(AnimationDefinition::new(12.0, Vec::new()));
/// let head = Animator::new(def).into_shared();
///
/// let mut system = AttachmentSystem::new();
/// let neck = system.create_attachment(Some("neck")).unwrap();
/// assert!(system.add_effect(neck, Effect::Animator(head.clone()), 0.0, -20.0, 1.0, 0.0));
/// assert_eq!(head.borrow().attached_to(), Some(neck));
///
/// // an effect lives in one attachment at a time
/// let other = system.create_attachment(None).unwrap();
/// assert!(!system.add_effect(other, Effect::Animator(head), 0.0, 0.0, 1.0, 0.0));
/// ```
#[derive(Debug, Default)]
pub struct AttachmentSystem {
	config: PlayerConfig,
	attachments: HashMap<AttachmentId, Attachment>,
	names: HashMap<String, AttachmentId>,
	auto_names: u64,
}

impl AttachmentSystem {
	/// Creates an empty system with the default limits.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty system with explicit limits.
	pub fn with_config(config: PlayerConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	/// Limits in use.
	pub fn config(&self) -> &PlayerConfig {
		&self.config
	}

	/// Number of attachments, dead ones not yet purged included.
	pub fn len(&self) -> usize {
		self.attachments.len()
	}

	/// Returns `true` if the system holds no attachment.
	pub fn is_empty(&self) -> bool {
		self.attachments.is_empty()
	}

	/// Creates an attachment.
	///
	/// Without a name a unique one is generated. Returns `None` if `name` is
	/// already taken.
	pub fn create_attachment(&mut self, name: Option<&str>) -> Option<AttachmentId> {
		let name = match name {
			Some(name) if self.names.contains_key(name) => {
				warn!("attachment '{name}' already exists");
				return None;
			}
			Some(name) => name.to_string(),
			None => loop {
				self.auto_names += 1;
				let candidate = format!("attachment#{}", self.auto_names);
				if !self.names.contains_key(&candidate) {
					break candidate;
				}
			},
		};

		let id = AttachmentId::next();
		debug!("created attachment '{name}' {id}");
		self.names.insert(name.clone(), id);
		self.attachments.insert(id, Attachment::new(id, name));
		Some(id)
	}

	/// Looks up an attachment.
	pub fn get(&self, id: AttachmentId) -> Option<&Attachment> {
		self.attachments.get(&id)
	}

	/// Finds an attachment by name.
	pub fn find(&self, name: &str) -> Option<AttachmentId> {
		self.names.get(name).copied()
	}

	/// Every attachment id, in creation order.
	pub fn ids(&self) -> Vec<AttachmentId> {
		let mut ids: Vec<_> = self.attachments.keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	fn roots(&self) -> Vec<AttachmentId> {
		let mut roots: Vec<_> = self
			.attachments
			.values()
			.filter(|attachment| attachment.parent.is_none())
			.map(|attachment| attachment.id)
			.collect();
		roots.sort_unstable();
		roots
	}

	/// Number of effects held by `id`; `0` for an unknown id.
	pub fn effect_count(&self, id: AttachmentId) -> usize {
		self.attachments.get(&id).map_or(0, Attachment::effect_count)
	}

	/// Sets the local transform.
	pub fn set_transform(&mut self, id: AttachmentId, transform: Matrix2D) -> bool {
		self.attachments.get_mut(&id).map(|a| a.transform = transform).is_some()
	}

	/// Moves the attachment, keeping the rest of its transform.
	pub fn set_position(&mut self, id: AttachmentId, x: f32, y: f32) -> bool {
		self.attachments
			.get_mut(&id)
			.map(|a| a.transform.set_translation(x, y))
			.is_some()
	}

	/// Returns `true` if `candidate` is `id` or one of its ancestors.
	fn is_ancestor_or_self(&self, candidate: AttachmentId, id: AttachmentId) -> bool {
		let mut current = Some(id);
		for _ in 0..=self.attachments.len() {
			match current {
				Some(node) if node == candidate => return true,
				Some(node) => current = self.attachments.get(&node).and_then(|a| a.parent),
				None => return false,
			}
		}
		true
	}

	/// Adds `effect` with an offset of translation, uniform scale and rotation.
	///
	/// See [`add_effect_with`](Self::add_effect_with).
	pub fn add_effect(
		&mut self,
		id: AttachmentId,
		effect: Effect,
		x: f32,
		y: f32,
		scale: f32,
		rotation: f32,
	) -> bool {
		self.add_effect_with(id, effect, Matrix2D::from_offset(x, y, scale, rotation), EffectFlags::default())
	}

	/// Adds `effect` with an explicit offset transform and flags.
	///
	/// Fails when the attachment is unknown, dead or full, when the effect is
	/// dead or already attached somewhere, or when a nested attachment would form
	/// a cycle.
	pub fn add_effect_with(&mut self, id: AttachmentId, effect: Effect, offset: Matrix2D, flags: EffectFlags) -> bool {
		let Some(attachment) = self.attachments.get(&id) else {
			warn!("add_effect: unknown attachment {id}");
			return false;
		};
		if !attachment.alive {
			warn!("add_effect: attachment '{}' is dead", attachment.name);
			return false;
		}
		if attachment.effects.len() >= self.config.max_effects {
			warn!("add_effect: attachment '{}' already holds {} effects", attachment.name, self.config.max_effects);
			return false;
		}

		match &effect {
			Effect::Animator(animator) => {
				let Ok(animator) = animator.try_borrow() else {
					warn!("add_effect: animator is borrowed");
					return false;
				};
				if !animator.is_alive() {
					warn!("add_effect: animator is dead");
					return false;
				}
				if let Some(owner) = animator.attached_to() {
					warn!("add_effect: animator already attached to {owner}");
					return false;
				}
			}
			Effect::Attachment(child) => {
				if self.is_ancestor_or_self(*child, id) {
					warn!("add_effect: attaching {child} under {id} would form a cycle");
					return false;
				}
				match self.attachments.get(child) {
					Some(nested) if nested.alive && nested.parent.is_none() => {}
					Some(nested) => {
						warn!("add_effect: attachment '{}' is dead or already attached", nested.name);
						return false;
					}
					None => {
						warn!("add_effect: unknown attachment {child}");
						return false;
					}
				}
			}
		}

		match &effect {
			Effect::Animator(animator) => animator.borrow_mut().set_attached_to(Some(id)),
			Effect::Attachment(child) => {
				if let Some(nested) = self.attachments.get_mut(child) {
					nested.parent = Some(id);
				}
			}
		}
		if let Some(attachment) = self.attachments.get_mut(&id) {
			attachment.effects.push(EffectSlot {
				effect,
				offset,
				flags,
			});
		}
		true
	}

	/// Clears the back-reference of an effect that `id` no longer holds.
	fn release(&mut self, id: AttachmentId, effect: &Effect) {
		match effect {
			Effect::Animator(animator) => match animator.try_borrow_mut() {
				Ok(mut animator) if animator.attached_to() == Some(id) => animator.set_attached_to(None),
				Ok(_) => {}
				Err(_) => warn!("release: animator is borrowed, back-reference kept"),
			},
			Effect::Attachment(child) => {
				if let Some(nested) = self.attachments.get_mut(child) {
					if nested.parent == Some(id) {
						nested.parent = None;
					}
				}
			}
		}
	}

	/// Removes the effect at `index`. The effect itself keeps playing.
	pub fn remove_effect_at(&mut self, id: AttachmentId, index: usize) -> bool {
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return false;
		};
		if index >= attachment.effects.len() {
			return false;
		}
		let slot = attachment.effects.remove(index);
		self.release(id, &slot.effect);
		true
	}

	/// Removes `effect`. Returns `false` if `id` does not hold it.
	pub fn remove_effect(&mut self, id: AttachmentId, effect: &Effect) -> bool {
		let index = self
			.attachments
			.get(&id)
			.and_then(|attachment| attachment.effects.iter().position(|slot| slot.effect.same(effect)));
		match index {
			Some(index) => self.remove_effect_at(id, index),
			None => false,
		}
	}

	/// Removes every effect without touching their state beyond the back-reference.
	pub fn remove_all_effects(&mut self, id: AttachmentId) -> bool {
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return false;
		};
		let effects = std::mem::take(&mut attachment.effects);
		for slot in &effects {
			self.release(id, &slot.effect);
		}
		true
	}

	fn holds(&self, id: AttachmentId, effect: &Effect) -> bool {
		match effect {
			Effect::Animator(animator) => animator
				.try_borrow()
				.is_ok_and(|animator| animator.is_alive() && animator.attached_to() == Some(id)),
			Effect::Attachment(child) => self
				.attachments
				.get(child)
				.is_some_and(|nested| nested.alive && nested.parent == Some(id)),
		}
	}

	/// Drops dead or foreign effects, then advances every remaining one by `dt`.
	pub fn update(&mut self, id: AttachmentId, dt: f32) {
		self.update_at_depth(id, dt, 0);
	}

	fn update_at_depth(&mut self, id: AttachmentId, dt: f32, depth: usize) {
		if depth > self.config.max_attach_depth {
			warn!("update: attachments nested deeper than {}", self.config.max_attach_depth);
			return;
		}
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return;
		};
		if !attachment.alive {
			return;
		}

		let (kept, dropped): (Vec<_>, Vec<_>) =
			std::mem::take(&mut attachment.effects).into_iter().partition(|slot| self.holds(id, &slot.effect));
		for slot in &dropped {
			debug!("update: {id} dropped {:?}", slot.effect);
			self.release(id, &slot.effect);
		}

		let mut nested = Vec::new();
		for slot in &kept {
			match &slot.effect {
				Effect::Animator(animator) => match animator.try_borrow_mut() {
					Ok(mut animator) => animator.update(dt),
					Err(_) => warn!("update: animator in {id} is borrowed, skipped"),
				},
				Effect::Attachment(child) => nested.push(*child),
			}
		}
		if let Some(attachment) = self.attachments.get_mut(&id) {
			attachment.effects = kept;
		}
		for child in nested {
			self.update_at_depth(child, dt, depth + 1);
		}
	}

	/// Drops dead attachments, then updates every top-level attachment (nested ones
	/// are reached through their parents).
	pub fn update_all(&mut self, dt: f32) {
		let dead: Vec<_> = self
			.attachments
			.values()
			.filter(|attachment| !attachment.alive)
			.map(|attachment| attachment.id)
			.collect();
		for id in dead {
			self.forget(id);
		}
		for id in self.roots() {
			self.update(id, dt);
		}
	}

	/// Draws attachment `id` under `parent`.
	///
	/// Each effect is placed at `parent * transform * offset` (or `offset` alone
	/// when it does not inherit the transform). The attachment's alpha is
	/// multiplied into each animator for that one draw call only. Returns the
	/// number of commands emitted.
	pub fn draw(&self, id: AttachmentId, parent: &Matrix2D, sink: &mut dyn RenderSink) -> usize {
		self.draw_at_depth(id, parent, sink, 0)
	}

	/// Draws every top-level attachment.
	pub fn draw_all(&self, parent: &Matrix2D, sink: &mut dyn RenderSink) -> usize {
		let mut drawn = 0;
		for id in self.roots() {
			drawn += self.draw(id, parent, sink);
		}
		drawn
	}

	fn draw_at_depth(&self, id: AttachmentId, parent: &Matrix2D, sink: &mut dyn RenderSink, depth: usize) -> usize {
		if depth > self.config.max_attach_depth {
			warn!("draw: attachments nested deeper than {}", self.config.max_attach_depth);
			return 0;
		}
		let Some(attachment) = self.attachments.get(&id) else {
			return 0;
		};
		if !attachment.alive {
			return 0;
		}

		let world = *parent * attachment.transform;
		let mut drawn = 0;
		for slot in &attachment.effects {
			if slot.flags.dont_draw_if_parent_hidden && !attachment.visible {
				continue;
			}
			let placement = if slot.flags.inherit_transform {
				world * slot.offset
			} else {
				slot.offset
			};

			match &slot.effect {
				Effect::Animator(animator) => {
					let Ok(mut animator) = animator.try_borrow_mut() else {
						warn!("draw: animator in {id} is borrowed, skipped");
						continue;
					};
					if animator.attached_to() != Some(id) {
						continue;
					}
					let own = animator.alpha();
					animator.set_alpha(own * attachment.alpha);
					drawn += animator.draw(&placement, sink);
					animator.set_alpha(own);
				}
				Effect::Attachment(child) => {
					if self.attachments.get(child).is_some_and(|nested| nested.parent == Some(id)) {
						drawn += self.draw_at_depth(*child, &placement, sink, depth + 1);
					}
				}
			}
		}
		drawn
	}

	/// Applies `apply` to `id`, then to every effect that does not opt out,
	/// descending into nested attachments.
	fn cascade(
		&mut self,
		id: AttachmentId,
		depth: usize,
		opts_out: fn(&EffectFlags) -> bool,
		apply: &mut dyn FnMut(Target<'_>),
	) -> bool {
		if depth > self.config.max_attach_depth {
			warn!("cascade: attachments nested deeper than {}", self.config.max_attach_depth);
			return false;
		}
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return false;
		};
		apply(Target::Attachment(&mut *attachment));

		let targets: Vec<Effect> = attachment
			.effects
			.iter()
			.filter(|slot| !opts_out(&slot.flags))
			.map(|slot| slot.effect.clone())
			.collect();
		for effect in targets {
			match effect {
				Effect::Animator(animator) => match animator.try_borrow_mut() {
					Ok(mut animator) => apply(Target::Animator(&mut *animator)),
					Err(_) => warn!("cascade: animator in {id} is borrowed, skipped"),
				},
				Effect::Attachment(child) => {
					self.cascade(child, depth + 1, opts_out, apply);
				}
			}
		}
		true
	}

	/// Sets (or clears) the color override of `id` and of every effect that
	/// does not opt out of color propagation.
	pub fn override_color(&mut self, id: AttachmentId, color: Option<Color>) -> bool {
		self.cascade(id, 0, |flags| flags.dont_propagate_color, &mut |target| match target {
			Target::Attachment(attachment) => attachment.color = color,
			Target::Animator(animator) => animator.override_color(color),
		})
	}

	/// Pushes the current color override of `id` down to its effects again, for
	/// effects added after the override was set.
	pub fn propagate_color(&mut self, id: AttachmentId) -> bool {
		match self.attachments.get(&id) {
			Some(attachment) => {
				let color = attachment.color;
				self.override_color(id, color)
			}
			None => false,
		}
	}

	/// Sets the alpha of `id` and of nested attachments that do not opt out.
	///
	/// Animators keep their own alpha; the attachment's is multiplied in when
	/// drawing.
	pub fn set_alpha(&mut self, id: AttachmentId, alpha: f32) -> bool {
		if !alpha.is_finite() {
			return false;
		}
		let alpha = alpha.clamp(0.0, 1.0);
		self.cascade(id, 0, |flags| flags.dont_propagate_color, &mut |target| {
			if let Target::Attachment(attachment) = target {
				attachment.alpha = alpha;
			}
		})
	}

	/// Shows or hides `id` and every effect that inherits visibility.
	pub fn set_visible(&mut self, id: AttachmentId, visible: bool) -> bool {
		self.cascade(id, 0, |flags| !flags.inherit_visibility, &mut |target| match target {
			Target::Attachment(attachment) => attachment.visible = visible,
			Target::Animator(animator) => animator.set_visible(visible),
		})
	}

	/// Kills `id` and, recursively, every effect it holds, then empties its list.
	///
	/// Calling it again has no further effect.
	pub fn die(&mut self, id: AttachmentId) {
		self.die_at_depth(id, 0);
	}

	fn die_at_depth(&mut self, id: AttachmentId, depth: usize) {
		if depth > self.config.max_attach_depth {
			warn!("die: attachments nested deeper than {}", self.config.max_attach_depth);
			return;
		}
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return;
		};
		if attachment.alive {
			debug!("attachment '{}' {id} died", attachment.name);
		}
		attachment.alive = false;
		let effects = std::mem::take(&mut attachment.effects);
		for slot in effects {
			match &slot.effect {
				Effect::Animator(animator) => match animator.try_borrow_mut() {
					Ok(mut animator) => animator.die(),
					Err(_) => warn!("die: animator in {id} is borrowed, left alive"),
				},
				Effect::Attachment(child) => self.die_at_depth(*child, depth + 1),
			}
			self.release(id, &slot.effect);
		}
	}

	/// Detaches every effect of `id`, recursively through nested attachments,
	/// without killing anything.
	///
	/// Calling it again has no further effect.
	pub fn detach(&mut self, id: AttachmentId) {
		self.detach_at_depth(id, 0);
	}

	fn detach_at_depth(&mut self, id: AttachmentId, depth: usize) {
		if depth > self.config.max_attach_depth {
			warn!("detach: attachments nested deeper than {}", self.config.max_attach_depth);
			return;
		}
		let Some(attachment) = self.attachments.get_mut(&id) else {
			return;
		};
		let effects = std::mem::take(&mut attachment.effects);
		for slot in effects {
			self.release(id, &slot.effect);
			if let Effect::Attachment(child) = slot.effect {
				self.detach_at_depth(child, depth + 1);
			}
		}
	}

	/// Kills and drops the attachment called `name`.
	pub fn remove(&mut self, name: &str) -> bool {
		match self.find(name) {
			Some(id) => self.remove_attachment(id),
			None => false,
		}
	}

	/// Kills and drops attachment `id`, unlinking it from its parent.
	pub fn remove_attachment(&mut self, id: AttachmentId) -> bool {
		let Some(parent) = self.attachments.get(&id).map(|attachment| attachment.parent) else {
			return false;
		};
		self.die(id);
		if let Some(parent) = parent {
			self.remove_effect(parent, &Effect::Attachment(id));
		}
		self.forget(id);
		true
	}

	fn forget(&mut self, id: AttachmentId) {
		if let Some(attachment) = self.attachments.remove(&id) {
			self.names.remove(&attachment.name);
			debug!("dropped attachment '{}' {id}", attachment.name);
		}
	}
}
