//! Authoring timeline (XFL-style export directory) reader.
//!
//! # Directory Layout
//!
//! ```text
//! <base>/DOMDocument.xml      timeline manifest
//! <base>/LIBRARY/...          bitmaps, symbol documents
//! ```
//!
//! # Document Structure
//!
//! ```text
//! <DOMDocument frameRate="24" width="550" height="400">
//!   <media><DOMBitmapItem name="head.png" href="head.png"/></media>
//!   <timelines><DOMTimeline name="Scene 1"><layers>
//!     <DOMLayer name="head">
//!       <frames>
//!         <DOMFrame index="0" duration="5" keyMode="9728">
//!           <elements>
//!             <DOMSymbolInstance libraryItemName="head">
//!               <matrix><Matrix a="1" d="1" tx="10" ty="20"/></matrix>
//!               <color><Color alphaMultiplier="0.5"/></color>
//!             </DOMSymbolInstance>
//!           </elements>
//!         </DOMFrame>
//!       </frames>
//!     </DOMLayer>
//!   </layers></DOMTimeline></timelines>
//! </DOMDocument>
//! ```
//!
//! Every layer becomes one track. Layers are listed top-most first, so the track
//! order is reversed to get back-to-front drawing. A frame run fills the frames
//! `[index, index + duration)` with the transform of its first usable element;
//! runs without one, and gaps between runs, become hidden frames. All tracks are
//! padded with hidden frames to the longest layer.
//!
//! The element matrix is decomposed with `skew_x = atan2(-c, d)` and
//! `skew_y = atan2(b, a)`, the same convention as the flat format.

mod resolve;

use std::{collections::BTreeSet, io};

use log::{debug, warn};
use reanim_vfs::{FileSource, join, normalize};

pub use self::resolve::ParseContext;
use crate::{
	error::{AnimError, Format},
	file::{LoadConfig, xml},
	math::Matrix2D,
	model::{AnimationDefinition, FrameTransform, Track},
};

/// Stage size used when the document does not declare one.
pub const DEFAULT_STAGE_SIZE: (f32, f32) = (550.0, 400.0);

/// Element kinds that can carry a frame transform.
const ELEMENT_TAGS: [&str; 2] = ["DOMSymbolInstance", "DOMBitmapInstance"];

/// Layer types that never produce a track.
const SKIPPED_LAYER_TYPES: [&str; 3] = ["folder", "guide", "mask"];

/// Parses the authoring export rooted at `base_dir`.
///
/// The manifest name is taken from `config` and matched ignoring case. Every
/// resolved bitmap path is added to `images_used`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, is not well formed, or lacks
/// the `DOMDocument` / `DOMTimeline` elements. Problems inside a single element
/// (bad matrix, unresolvable bitmap) are logged and tolerated.
pub fn parse(
	source: &dyn FileSource,
	base_dir: &str,
	config: &LoadConfig,
	images_used: &mut BTreeSet<String>,
) -> Result<AnimationDefinition, AnimError> {
	let base_dir = normalize(base_dir);
	let manifest = source
		.find_child_ignore_case(&base_dir, &config.manifest_name)
		.ok_or_else(|| {
			AnimError::io(
				Format::Authoring,
				join(&base_dir, &config.manifest_name),
				io::Error::new(io::ErrorKind::NotFound, "manifest not found"),
			)
		})?;
	let text = source
		.read_to_string(&manifest)
		.map_err(|e| AnimError::io(Format::Authoring, &manifest, e))?;

	let mut ctx = ParseContext::new(source, config, &base_dir);
	let definition = parse_document(&mut ctx, &text)?;
	images_used.extend(ctx.resolved_paths().map(str::to_string));
	Ok(definition)
}

/// Parses a manifest document that has already been read.
///
/// Bitmap references are resolved through `ctx`.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_document(ctx: &mut ParseContext<'_>, text: &str) -> Result<AnimationDefinition, AnimError> {
	let root = xml::parse(text, ctx.config().max_elements).map_err(|e| e.in_format(Format::Authoring))?;
	let document = root
		.child("DOMDocument")
		.ok_or_else(|| AnimError::missing(Format::Authoring, "DOMDocument"))?;

	let fps = match document.attr("frameRate") {
		Some(raw) => parse_number(raw)
			.filter(|fps| *fps > 0.0)
			.ok_or_else(|| AnimError::invalid(Format::Authoring, "frameRate", raw))?,
		None => ctx.config().default_fps,
	};
	let width = number_attr(document, "width", DEFAULT_STAGE_SIZE.0)?;
	let height = number_attr(document, "height", DEFAULT_STAGE_SIZE.1)?;

	if let Some(media) = document.child("media") {
		ctx.register_manifest(media);
	}

	let timeline = document
		.descend(&["timelines", "DOMTimeline"])
		.ok_or_else(|| AnimError::missing(Format::Authoring, "DOMTimeline"))?;

	let mut tracks = Vec::new();
	if let Some(layers) = timeline.child("layers") {
		for layer in layers.children_named("DOMLayer") {
			if let Some(track) = parse_layer(ctx, layer) {
				tracks.push(track);
			}
		}
	}

	let frame_count = tracks.iter().map(Track::len).max().unwrap_or(0);
	for track in &mut tracks {
		track.pad_hidden(frame_count);
	}
	tracks.reverse();

	debug!(
		"parsed authoring timeline '{}': {} tracks, {} frames at {} fps",
		timeline.attr("name").unwrap_or_default(),
		tracks.len(),
		frame_count,
		fps
	);
	Ok(AnimationDefinition::new(fps, tracks).with_size(width, height))
}

fn parse_layer(ctx: &mut ParseContext<'_>, layer: &xml::Element) -> Option<Track> {
	let name = layer.attr("name").unwrap_or_default();
	if let Some(kind) = layer.attr("layerType").filter(|kind| SKIPPED_LAYER_TYPES.contains(kind)) {
		debug!("authoring timeline: skipping {kind} layer '{name}'");
		return None;
	}

	let limit = ctx.config().max_elements;
	let mut frames: Vec<FrameTransform> = Vec::new();
	for run in layer.descend(&["frames"]).into_iter().flat_map(|f| f.children_named("DOMFrame")) {
		let Some((index, duration)) = run_span(run) else {
			warn!("authoring timeline: layer '{name}' line {}: bad frame span, run skipped", run.line());
			continue;
		};
		let end = index.saturating_add(duration);
		if end > limit {
			warn!("authoring timeline: layer '{name}' line {}: run ends past frame {limit}", run.line());
			continue;
		}

		let sample = run_sample(ctx, run, name);
		if frames.len() < end {
			let hole = frames.last().map_or_else(FrameTransform::hidden, FrameTransform::to_hidden);
			frames.resize(end, hole);
		}
		let sample = sample.unwrap_or_else(|| match index.checked_sub(1).and_then(|previous| frames.get(previous)) {
			Some(previous) => previous.to_hidden(),
			None => FrameTransform::hidden(),
		});
		for slot in &mut frames[index..end] {
			*slot = sample.clone();
		}
	}

	let available = layer.attr("visible") != Some("false");
	Some(Track::with_frames(name, frames).with_available(available))
}

/// `(index, duration)` of a frame run. A missing duration means one frame.
fn run_span(run: &xml::Element) -> Option<(usize, usize)> {
	let index = run.attr("index")?.trim().parse::<usize>().ok()?;
	let duration = match run.attr("duration") {
		Some(raw) => raw.trim().parse::<usize>().ok()?,
		None => 1,
	};
	Some((index, duration.max(1)))
}

/// Transform of the first usable element of a run; `None` for an empty run.
fn run_sample(ctx: &mut ParseContext<'_>, run: &xml::Element, layer: &str) -> Option<FrameTransform> {
	let elements = run.child("elements")?;
	for element in elements.children().iter().filter(|e| ELEMENT_TAGS.contains(&e.name())) {
		match element_transform(ctx, element) {
			Ok(sample) => return Some(sample),
			Err(err) => warn!("authoring timeline: layer '{layer}' line {}: {err}, element skipped", element.line()),
		}
	}
	None
}

fn element_transform(ctx: &mut ParseContext<'_>, element: &xml::Element) -> Result<FrameTransform, AnimError> {
	let matrix = match element.descend(&["matrix", "Matrix"]) {
		Some(node) => read_matrix(node)?,
		None => Matrix2D::IDENTITY,
	};
	let alpha = match element.descend(&["color", "Color"]) {
		Some(node) => number_attr(node, "alphaMultiplier", 1.0)?,
		None => 1.0,
	};

	let mut sample = FrameTransform::from_matrix(&matrix, alpha);
	if let Some(item) = element.attr("libraryItemName") {
		if let Some(path) = ctx.resolve(item) {
			sample.image_ref = path;
		}
	}
	Ok(sample)
}

fn read_matrix(node: &xml::Element) -> Result<Matrix2D, AnimError> {
	Ok(Matrix2D::new(
		number_attr(node, "a", 1.0)?,
		number_attr(node, "b", 0.0)?,
		number_attr(node, "c", 0.0)?,
		number_attr(node, "d", 1.0)?,
		number_attr(node, "tx", 0.0)?,
		number_attr(node, "ty", 0.0)?,
	))
}

fn number_attr(node: &xml::Element, name: &str, default: f32) -> Result<f32, AnimError> {
	match node.attr(name) {
		Some(raw) => parse_number(raw).ok_or_else(|| AnimError::invalid(Format::Authoring, name, raw)),
		None => Ok(default),
	}
}

fn parse_number(raw: &str) -> Option<f32> {
	raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}
