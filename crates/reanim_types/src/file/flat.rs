//! Flat timeline format (`.reanim` style) reader and writer.
//!
//! # Document Structure
//!
//! ```text
//! <fps>12</fps>
//! <track>
//!   <name>anim_idle</name>
//!   <t><f>-1</f></t>
//!   <t><f>0</f><x>10.5</x><i>IMAGE_HEAD</i></t>
//!   <t><x>11</x></t>
//! </track>
//! ```
//!
//! One `fps` value, then any number of `track` blocks. A track has a `name` and
//! an ordered list of frame entries (`<t>`, or `<frame>`). Each frame entry
//! carries any subset of these properties:
//!
//! ```text
//! Tag  Field       Default
//! ---  ----------  -------
//! x    x           0
//! y    y           0
//! kx   skew_x      0
//! ky   skew_y      0
//! sx   scale_x     1
//! sy   scale_y     1
//! a    alpha       1
//! f    vis_flag    0
//! i    image_ref   ""
//! ```
//!
//! Properties are delta encoded: an omitted property keeps the value of the
//! previous frame of the same track. Only the first frame of a track starts from
//! the defaults.
//!
//! # Error Handling
//!
//! Malformed markup or an unreadable `fps` value fails the whole load. Inside a
//! frame, a property whose value cannot be parsed is skipped with a warning and
//! the inherited value is kept.

use std::{collections::BTreeSet, fmt::Write as _};

use log::{debug, warn};

use crate::{
	error::{AnimError, Format},
	file::{LoadConfig, xml},
	model::{AnimationDefinition, FrameTransform, Track},
};

/// Tag names accepted as frame entries.
pub const FRAME_TAGS: [&str; 2] = ["t", "frame"];

/// Parses a flat timeline document.
///
/// Every image name referenced through an `i` property is added to `images_used`
/// so the caller can batch-resolve them.
///
/// # Errors
///
/// Returns an error for malformed markup or an unreadable `fps` value. No
/// partial definition is produced.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use reanim_types::file::{LoadConfig, flat};
///
/// let doc = "<fps>12</fps><track><name>A</name><t><x>1</x></t><t><y>2</y></t></track>";
/// let mut images = BTreeSet::new();
/// let def = flat::parse(doc, &LoadConfig::default(), &mut images).unwrap();
///
/// let frames = def.track(0).unwrap().frames();
/// assert_eq!((frames[1].x, frames[1].y), (1.0, 2.0));
/// ```
pub fn parse(
	text: &str,
	config: &LoadConfig,
	images_used: &mut BTreeSet<String>,
) -> Result<AnimationDefinition, AnimError> {
	let root = xml::parse(text, config.max_elements).map_err(|e| e.in_format(Format::Flat))?;

	let fps = match root.child("fps") {
		Some(node) => node
			.text()
			.parse::<f32>()
			.ok()
			.filter(|fps| fps.is_finite() && *fps > 0.0)
			.ok_or_else(|| AnimError::invalid(Format::Flat, "fps", node.text()))?,
		None => config.default_fps,
	};

	let mut tracks = Vec::new();
	for node in root.children_named("track") {
		tracks.push(parse_track(node, images_used));
	}

	debug!("parsed flat timeline: {} tracks at {} fps", tracks.len(), fps);
	Ok(AnimationDefinition::new(fps, tracks))
}

fn parse_track(node: &xml::Element, images_used: &mut BTreeSet<String>) -> Track {
	let name = match node.child_text("name") {
		Some(name) => name.to_string(),
		None => {
			warn!("flat timeline: track at line {} has no <name>", node.line());
			String::new()
		}
	};

	let mut track = Track::new(name);
	let mut current = FrameTransform::DEFAULT;
	for entry in node.children().iter().filter(|c| FRAME_TAGS.contains(&c.name())) {
		apply_properties(&mut current, entry, track.name());
		if current.has_image() {
			images_used.insert(current.image_ref.clone());
		}
		track.push(current.clone());
	}
	track
}

fn apply_properties(frame: &mut FrameTransform, entry: &xml::Element, track: &str) {
	for prop in entry.children() {
		let value = prop.text();
		let slot = match prop.name() {
			"x" => &mut frame.x,
			"y" => &mut frame.y,
			"kx" => &mut frame.skew_x,
			"ky" => &mut frame.skew_y,
			"sx" => &mut frame.scale_x,
			"sy" => &mut frame.scale_y,
			"a" => &mut frame.alpha,
			"f" => {
				match parse_flag(value) {
					Some(flag) => frame.vis_flag = flag,
					None => warn!(
						"flat timeline: track '{track}' line {}: bad <f> value '{value}'",
						prop.line()
					),
				}
				continue;
			}
			"i" => {
				frame.image_ref = value.to_string();
				continue;
			}
			other => {
				debug!("flat timeline: ignoring unknown property <{other}> in track '{track}'");
				continue;
			}
		};

		match value.parse::<f32>() {
			Ok(parsed) if parsed.is_finite() => *slot = parsed,
			_ => warn!(
				"flat timeline: track '{track}' line {}: bad <{}> value '{value}'",
				prop.line(),
				prop.name()
			),
		}
	}
}

fn parse_flag(value: &str) -> Option<i32> {
	value.parse::<i32>().ok().or_else(|| {
		// Some exporters write the flag as a float
		value.parse::<f32>().ok().filter(|v| v.is_finite()).map(|v| v as i32)
	})
}

/// Serialises a definition as a delta-encoded flat timeline document.
///
/// Only properties that differ from the previous frame (or from the defaults, for
/// a track's first frame) are written, so `parse(to_string(def))` reproduces the
/// frames of `def`.
pub fn to_string(definition: &AnimationDefinition) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "<fps>{}</fps>", definition.fps());

	for track in definition.tracks() {
		out.push_str("<track>\n");
		let _ = writeln!(out, "<name>{}</name>", xml::escape(track.name()));

		let mut previous = FrameTransform::DEFAULT;
		for frame in track.frames() {
			out.push_str("<t>");
			write_delta(&mut out, &previous, frame);
			out.push_str("</t>\n");
			previous = frame.clone();
		}
		out.push_str("</track>\n");
	}
	out
}

fn write_delta(out: &mut String, previous: &FrameTransform, frame: &FrameTransform) {
	let floats = [
		("x", previous.x, frame.x),
		("y", previous.y, frame.y),
		("kx", previous.skew_x, frame.skew_x),
		("ky", previous.skew_y, frame.skew_y),
		("sx", previous.scale_x, frame.scale_x),
		("sy", previous.scale_y, frame.scale_y),
		("a", previous.alpha, frame.alpha),
	];
	for (tag, before, after) in floats {
		if before != after {
			let _ = write!(out, "<{tag}>{after}</{tag}>");
		}
	}
	if previous.vis_flag != frame.vis_flag {
		let _ = write!(out, "<f>{}</f>", frame.vis_flag);
	}
	if previous.image_ref != frame.image_ref {
		let _ = write!(out, "<i>{}</i>", xml::escape(&frame.image_ref));
	}
}
