//! Benchmark helper utilities for reanim-rs
//!
//! Generates synthetic timelines so the benchmarks do not depend on game assets.
//! The shapes mimic typical character exports: a few dozen tracks, most of them
//! keyed on every frame, a handful of sub-animation marker tracks.

use std::{fmt::Write as _, sync::Arc};

use reanim_types::model::{AnimationDefinition, FrameTransform, Track, VIS_HIDDEN};

/// Generates a flat timeline document with `tracks` body tracks of `frames` frames each.
///
/// Two marker tracks (`anim_first`, `anim_second`) split the timeline in halves.
pub fn generate_flat_document(tracks: usize, frames: usize) -> String {
	let mut out = String::from("<fps>12</fps>\n");
	let half = frames / 2;

	for (name, visible) in [("anim_first", 0..half), ("anim_second", half..frames)] {
		let _ = write!(out, "<track><name>{name}</name>");
		let mut previous = None;
		for frame in 0..frames {
			let flag = if visible.contains(&frame) { 0 } else { VIS_HIDDEN };
			if previous == Some(flag) {
				out.push_str("<t/>");
			} else {
				let _ = write!(out, "<t><f>{flag}</f></t>");
			}
			previous = Some(flag);
		}
		out.push_str("</track>\n");
	}

	for track in 0..tracks {
		let _ = write!(out, "<track><name>part_{track}</name>");
		for frame in 0..frames {
			let t = frame as f32;
			let _ = write!(out, "<t><x>{}</x><y>{}</y><kx>{}</kx><ky>{}</ky>", t * 1.5, track as f32 * 4.0, t * 7.0, t * 7.0);
			if frame == 0 {
				let _ = write!(out, "<i>IMAGE_PART_{track}</i>");
			}
			out.push_str("</t>");
		}
		out.push_str("</track>\n");
	}
	out
}

/// Builds the same shape as [`generate_flat_document`] directly in memory.
pub fn generate_definition(tracks: usize, frames: usize) -> Arc<AnimationDefinition> {
	let half = frames / 2;
	let marker = |name: &str, visible: std::ops::Range<usize>| {
		let frames = (0..frames)
			.map(|frame| {
				if visible.contains(&frame) {
					FrameTransform::DEFAULT
				} else {
					FrameTransform::hidden()
				}
			})
			.collect();
		Track::with_frames(name, frames)
	};

	let mut all = vec![marker("anim_first", 0..half), marker("anim_second", half..frames)];
	for track in 0..tracks {
		let frames = (0..frames)
			.map(|frame| {
				let t = frame as f32;
				FrameTransform {
					x: t * 1.5,
					y: track as f32 * 4.0,
					skew_x: t * 7.0,
					skew_y: t * 7.0,
					image_ref: format!("IMAGE_PART_{track}"),
					..FrameTransform::DEFAULT
				}
			})
			.collect();
		all.push(Track::with_frames(format!("part_{track}"), frames));
	}
	Arc::new(AnimationDefinition::new(12.0, all))
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use reanim_types::file::{LoadConfig, flat};

	use super::*;

	#[test]
	fn test_generated_document_matches_definition() {
		let text = generate_flat_document(4, 10);
		let mut images = BTreeSet::new();
		let parsed = flat::parse(&text, &LoadConfig::default(), &mut images).unwrap();
		assert_eq!(parsed, *generate_definition(4, 10));
		assert_eq!(images.len(), 4);
	}
}
