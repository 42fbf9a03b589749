use std::{cell::Cell, rc::Rc};

use reanim_rs::prelude::*;

use crate::{approx, loader};

#[test_log::test]
fn test_repeat_scenario() {
	let mut loader = loader();
	let def = loader.load("reanim/Simple.reanim").unwrap();
	let mut animator = Animator::new(def);
	animator.play(LoopPolicy::Repeat);

	animator.update(1.0 / 12.0);
	assert!(approx(animator.current_frame(), 1.0));
	assert!(approx(animator.interpolated_transform(0).unwrap().x, 10.0));

	animator.update(2.0 / 12.0);
	assert!(approx(animator.current_frame(), 1.0));
	assert!(approx(animator.interpolated_transform(0).unwrap().x, 10.0));
}

#[test_log::test]
fn test_track_ranges() {
	let mut loader = loader();
	let def = loader.load("reanim/Zombie.reanim").unwrap();
	assert_eq!(def.track_range("anim_attack"), Some(FrameRange::new(0, 3)));
	assert_eq!(def.track_range("anim_idle"), Some(FrameRange::new(4, 7)));
	assert_eq!(def.track_range("anim_missing"), None);
	assert!(loader.images_used().contains("IMAGE_BODY"));
}

#[test_log::test]
fn test_unknown_track_is_a_noop() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	animator.set_frame_range(2.0, 5.0);
	assert!(!animator.set_frame_range_by_track_name("anim_missing"));
	assert!(!animator.play_track("anim_missing", LoopPolicy::Repeat, None));
	assert_eq!(animator.frame_range(), (2.0, 5.0));
	assert!(!animator.is_playing());
}

#[test_log::test]
fn test_once_then_switch() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	assert!(animator.play_track("anim_attack", LoopPolicy::OnceThenSwitch("anim_idle".to_string()), None));
	assert_eq!(animator.frame_range(), (0.0, 3.0));

	animator.update(0.25);
	assert_eq!(*animator.loop_policy(), LoopPolicy::Repeat);
	assert_eq!(animator.frame_range(), (4.0, 7.0));
	assert_eq!(animator.current_frame(), 4.0);
	assert!(animator.is_playing());

	for _ in 0..20 {
		animator.update(0.05);
		assert!((4.0..=7.0).contains(&animator.current_frame()));
	}
}

#[test_log::test]
fn test_once_finishes_and_stays() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	animator.play_track("anim_attack", LoopPolicy::Once, None);
	for _ in 0..10 {
		animator.update(0.1);
	}
	assert_eq!(animator.current_frame(), 3.0);
	assert!(!animator.is_playing());
	assert!(animator.is_finished());
	assert!(approx(animator.interpolated_transform_by_name("body").unwrap().x, 3.0));
}

#[test_log::test]
fn test_frame_hook_fires_once_per_pass() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	let fired = Rc::new(Cell::new(0));
	let counter = Rc::clone(&fired);
	let hook = animator.on_frame(2, move |frame| {
		assert_eq!(frame, 2);
		counter.set(counter.get() + 1);
	});

	animator.play_track("anim_attack", LoopPolicy::Repeat, None);
	// 1/48 s is a quarter frame at 12 fps
	for _ in 0..12 {
		animator.update(1.0 / 48.0);
	}
	assert_eq!(fired.get(), 1);

	// wrap around the 0..=3 range and pass frame 2 again
	for _ in 0..12 {
		animator.update(1.0 / 48.0);
	}
	assert_eq!(fired.get(), 2);

	// seeking does not fire
	animator.seek(2.0);
	assert_eq!(fired.get(), 2);

	assert!(animator.remove_hook(hook));
	for _ in 0..24 {
		animator.update(1.0 / 48.0);
	}
	assert_eq!(fired.get(), 2);
}

#[test_log::test]
fn test_range_start_hooks_fire_on_first_pass() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	let spawned = Rc::new(Cell::new(0));
	let idled = Rc::new(Cell::new(0));
	let spawn = Rc::clone(&spawned);
	animator.on_frame(0, move |_| spawn.set(spawn.get() + 1));
	let idle = Rc::clone(&idled);
	animator.on_frame(4, move |_| idle.set(idle.get() + 1));

	animator.play_track("anim_attack", LoopPolicy::Once, None);
	for _ in 0..8 {
		animator.update(1.0 / 12.0);
	}
	assert!(animator.is_finished());
	assert_eq!(spawned.get(), 1);

	// the switch target's first frame counts as the start of a pass too
	animator.play_track("anim_attack", LoopPolicy::OnceThenSwitch("anim_idle".to_string()), None);
	animator.update(0.25);
	assert_eq!(spawned.get(), 2);
	assert_eq!(idled.get(), 0);
	animator.update(1.0 / 12.0);
	assert_eq!(idled.get(), 1);
}

#[test_log::test]
fn test_blend_holds_then_cuts() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	animator.play_track("anim_idle", LoopPolicy::Repeat, None);
	animator.update(1.5 / 12.0);
	assert!(approx(animator.current_frame(), 5.5));

	assert!(animator.play_track("anim_attack", LoopPolicy::Repeat, Some(2.0)));
	assert!(animator.is_blending());
	assert_eq!(animator.current_frame(), 0.0);
	// pose held on the frame showing at the switch
	assert!(approx(animator.interpolated_transform_by_name("body").unwrap().x, 5.0));

	animator.update(1.0 / 12.0);
	assert!(animator.is_blending());
	assert!(approx(animator.blend_progress(), 0.5));
	assert!(approx(animator.interpolated_transform_by_name("body").unwrap().x, 5.0));

	animator.update(1.0 / 12.0);
	assert!(!animator.is_blending());
	assert_eq!(animator.current_frame(), 0.0);
	assert!(approx(animator.interpolated_transform_by_name("body").unwrap().x, 0.0));
}

#[test_log::test]
fn test_flat_writer_reloads() {
	let mut loader = loader();
	let def = loader.load("reanim/Zombie.reanim").unwrap();
	let text = file::flat::to_string(&def);

	let mut images = std::collections::BTreeSet::new();
	let back = file::flat::parse(&text, &LoadConfig::default(), &mut images).unwrap();
	assert_eq!(back, *def);
}
