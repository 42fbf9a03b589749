use std::{rc::Rc, sync::Arc};

use reanim_rs::prelude::*;

use crate::{approx, loader};

#[test_log::test]
fn test_animators_share_definition_but_not_state() {
	let mut loader = loader();
	let def = loader.load("reanim/Zombie.reanim").unwrap();
	let mut walking = Animator::new(Arc::clone(&def));
	let mut standing = Animator::new(loader.load("reanim/Zombie.reanim").unwrap());
	assert!(Arc::ptr_eq(walking.definition(), standing.definition()));

	walking.play(LoopPolicy::Repeat);
	walking.update(3.0 / 12.0);
	standing.set_track_offset_by_name("body", 0.0, 5.0);

	assert!(approx(walking.current_frame(), 3.0));
	assert_eq!(standing.current_frame(), 0.0);
	assert_eq!(walking.track_transform(2).unwrap().y, 0.0);
	assert_eq!(standing.track_transform(2).unwrap().y, 5.0);
	// the definition itself is untouched
	assert_eq!(def.track(2).unwrap().frames()[0].y, 0.0);
}

#[test_log::test]
fn test_child_animator_follows_track() {
	let mut loader = loader();
	let def = loader.load("reanim/Zombie.reanim").unwrap();
	let parent = Animator::new(Arc::clone(&def)).into_shared();
	let child = Animator::new(def).into_shared();
	child.borrow_mut().seek(2.0);

	assert_eq!(parent.borrow_mut().attach_child_by_name("body", &child, Matrix2D::translation(0.0, -10.0)), 1);
	parent.borrow_mut().seek(1.0);

	let mut sink = Vec::new();
	assert_eq!(parent.borrow().draw(&Matrix2D::IDENTITY, &mut sink), 2);
	assert_eq!((sink[0].x, sink[0].y), (1.0, 0.0));
	assert!(approx(sink[1].x, 3.0));
	assert!(approx(sink[1].y, -10.0));

	// only a weak reference is kept
	drop(child);
	sink.clear();
	assert_eq!(parent.borrow().draw(&Matrix2D::IDENTITY, &mut sink), 1);
}

#[test_log::test]
fn test_attachment_drives_its_effects() {
	let mut loader = loader();
	let def = loader.load("reanim/Zombie.reanim").unwrap();
	let zombie = Animator::new(def).into_shared();
	zombie.borrow_mut().play_track("anim_idle", LoopPolicy::Repeat, None);

	let mut system = AttachmentSystem::new();
	let hand = system.create_attachment(Some("hand")).unwrap();
	system.set_position(hand, 100.0, 50.0);
	assert!(system.add_effect(hand, Effect::Animator(Rc::clone(&zombie)), 0.0, 0.0, 1.0, 0.0));

	system.update_all(1.0 / 12.0);
	assert!(approx(zombie.borrow().current_frame(), 5.0));

	system.set_alpha(hand, 0.5);
	let mut sink = Vec::new();
	assert_eq!(system.draw_all(&Matrix2D::IDENTITY, &mut sink), 1);
	assert!(approx(sink[0].x, 105.0));
	assert!(approx(sink[0].y, 50.0));
	assert!(approx(sink[0].alpha, 0.5));
	assert_eq!(zombie.borrow().alpha(), 1.0);

	assert!(system.remove("hand"));
	assert!(!zombie.borrow().is_alive());
	system.update_all(1.0 / 12.0);
	assert!(system.is_empty());
}
