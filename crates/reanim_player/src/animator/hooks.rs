//! Frame-indexed callbacks.

use std::fmt;

use log::trace;

/// Tolerance for float cursors that land just short of an integer frame.
const FRAME_EPSILON: f32 = 1e-4;

/// Handle returned by [`Animator::on_frame`](super::Animator::on_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// The part of the frame axis the cursor moved through during one update.
///
/// `from` is exclusive unless `from_inclusive` is set, which is the case for the
/// first update of a pass. `to` is inclusive. A wrap adds the tail of the range up
/// to `end` before continuing at `begin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Crossing {
	pub from: f32,
	pub from_inclusive: bool,
	pub to: f32,
	pub wrap: Option<(f32, f32)>,
}

impl Crossing {
	fn contains(&self, frame: u32) -> bool {
		let f = frame as f32;
		let after_from = if self.from_inclusive {
			f >= self.from - FRAME_EPSILON
		} else {
			f > self.from + FRAME_EPSILON
		};
		let to = self.to + FRAME_EPSILON;
		match self.wrap {
			None => after_from && f <= to,
			Some((end, begin)) => (after_from && f <= end + FRAME_EPSILON) || (f >= begin && f <= to),
		}
	}
}

struct Hook {
	id: HookId,
	frame: u32,
	callback: Box<dyn FnMut(u32)>,
}

/// Callbacks bound to integer frame indices.
#[derive(Default)]
pub(crate) struct FrameHooks {
	next_id: u64,
	hooks: Vec<Hook>,
}

impl fmt::Debug for FrameHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.hooks.iter().map(|hook| (hook.id, hook.frame))).finish()
	}
}

impl FrameHooks {
	pub fn add(&mut self, frame: u32, callback: Box<dyn FnMut(u32)>) -> HookId {
		let id = HookId(self.next_id);
		self.next_id += 1;
		self.hooks.push(Hook {
			id,
			frame,
			callback,
		});
		id
	}

	pub fn remove(&mut self, id: HookId) -> bool {
		let before = self.hooks.len();
		self.hooks.retain(|hook| hook.id != id);
		self.hooks.len() != before
	}

	pub fn clear(&mut self) {
		self.hooks.clear();
	}

	pub fn len(&self) -> usize {
		self.hooks.len()
	}

	/// Fires every hook whose frame lies in `crossing`, each at most once.
	pub fn fire(&mut self, crossing: Crossing) -> usize {
		let mut fired = 0;
		for hook in &mut self.hooks {
			if crossing.contains(hook.frame) {
				trace!("frame hook {:?} at frame {}", hook.id, hook.frame);
				(hook.callback)(hook.frame);
				fired += 1;
			}
		}
		fired
	}
}
