use reanim_rs::prelude::*;

use crate::approx;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DOMDocument xmlns="http://ns.adobe.com/xfl/2008/" frameRate="24">
  <media>
    <DOMBitmapItem name="Head.png" href="parts/head_v2.png"/>
  </media>
  <timelines>
    <DOMTimeline name="Scene 1">
      <layers>
        <DOMLayer name="hat">
          <frames>
            <DOMFrame index="0" duration="4">
              <elements>
                <DOMSymbolInstance libraryItemName="hat_symbol">
                  <matrix><Matrix tx="0" ty="-30"/></matrix>
                </DOMSymbolInstance>
              </elements>
            </DOMFrame>
          </frames>
        </DOMLayer>
        <DOMLayer name="head">
          <frames>
            <DOMFrame index="0" duration="2">
              <elements>
                <DOMBitmapInstance libraryItemName="Head">
                  <matrix><Matrix tx="10" ty="20"/></matrix>
                  <color><Color alphaMultiplier="0.5"/></color>
                </DOMBitmapInstance>
              </elements>
            </DOMFrame>
            <DOMFrame index="2" duration="2">
              <elements>
                <DOMBitmapInstance libraryItemName="Head">
                  <matrix><Matrix tx="30" ty="20"/></matrix>
                </DOMBitmapInstance>
              </elements>
            </DOMFrame>
          </frames>
        </DOMLayer>
        <DOMLayer name="shadow">
          <frames>
            <DOMFrame index="0">
              <elements>
                <DOMBitmapInstance libraryItemName="missing_shadow"/>
              </elements>
            </DOMFrame>
          </frames>
        </DOMLayer>
        <DOMLayer name="guides" layerType="guide">
          <frames><DOMFrame index="0" duration="4"><elements/></DOMFrame></frames>
        </DOMLayer>
      </layers>
    </DOMTimeline>
  </timelines>
</DOMDocument>"#;

const HAT_SYMBOL: &str = r#"<DOMSymbolItem name="hat_symbol">
  <timeline><DOMTimeline name="hat_symbol"><layers><DOMLayer name="Layer 1"><frames>
    <DOMFrame index="0"><elements><DOMBitmapInstance libraryItemName="Hat"/></elements></DOMFrame>
  </frames></DOMLayer></layers></DOMTimeline></timeline>
</DOMSymbolItem>"#;

fn loader() -> DefinitionLoader<MemorySource> {
	let source = MemorySource::new()
		.with_file("zombie/DOMDocument.xml", DOCUMENT)
		.with_file("zombie/LIBRARY/parts/head_v2.png", vec![0u8])
		.with_file("zombie/LIBRARY/hat.png", vec![0u8])
		.with_file("zombie/LIBRARY/hat_symbol.xml", HAT_SYMBOL);
	DefinitionLoader::new(source)
}

#[test_log::test]
fn test_layers_become_tracks_back_to_front() {
	let mut loader = loader();
	let def = loader.load("zombie").unwrap();

	assert_eq!(def.fps(), 24.0);
	assert_eq!(def.size(), Some((550.0, 400.0)));
	let names: Vec<&str> = def.tracks().iter().map(Track::name).collect();
	assert_eq!(names, ["shadow", "head", "hat"]);
	assert!(def.tracks().iter().all(|track| track.len() == 4));
}

#[test_log::test]
fn test_bitmaps_resolve_through_manifest_and_symbols() {
	let mut loader = loader();
	let def = loader.load("zombie").unwrap();

	let head = def.track(def.track_index("head").unwrap()).unwrap();
	assert_eq!(head.frames()[0].image_ref, "zombie/LIBRARY/parts/head_v2.png");
	let hat = def.track(def.track_index("hat").unwrap()).unwrap();
	assert_eq!(hat.frames()[3].image_ref, "zombie/LIBRARY/hat.png");

	let images = loader.images_used();
	assert!(images.contains("zombie/LIBRARY/parts/head_v2.png"));
	assert!(images.contains("zombie/LIBRARY/hat.png"));
	assert_eq!(images.len(), 2);
}

#[test_log::test]
fn test_unresolved_bitmap_is_not_drawn() {
	let mut loader = loader();
	let animator = Animator::new(loader.load("zombie").unwrap());

	let mut sink = Vec::new();
	assert_eq!(animator.draw(&Matrix2D::IDENTITY, &mut sink), 2);
	let images: Vec<&str> = sink.iter().map(|command| command.image_ref.as_str()).collect();
	assert_eq!(images, ["zombie/LIBRARY/parts/head_v2.png", "zombie/LIBRARY/hat.png"]);
	assert!(approx(sink[0].alpha, 0.5));
}

#[test_log::test]
fn test_runs_hold_between_keys() {
	let mut loader = loader();
	let mut animator = Animator::new(loader.load("zombie").unwrap());
	animator.play(LoopPolicy::Once);

	// 1/24 s is one frame at 24 fps
	animator.update(1.0 / 24.0);
	let head = animator.interpolated_transform_by_name("head").unwrap();
	assert!(approx(head.x, 10.0));
	assert!(approx(head.y, 20.0));

	animator.update(0.5 / 24.0);
	let head = animator.interpolated_transform_by_name("head").unwrap();
	assert!(approx(head.x, 20.0));
	assert!(approx(head.alpha, 0.75));

	animator.update(1.0);
	assert!(animator.is_finished());
	assert!(approx(animator.interpolated_transform_by_name("head").unwrap().x, 30.0));
}

#[test_log::test]
fn test_missing_manifest_is_an_error() {
	let mut loader = DefinitionLoader::new(MemorySource::new().with_file("empty/LIBRARY/a.png", vec![0u8]));
	let err = loader.load("empty").unwrap_err();
	assert_eq!(err.format(), Format::Authoring);
	assert_eq!(loader.cache_len(), 0);
}
