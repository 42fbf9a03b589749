//! Playback tests for `reanim-rs`: timelines are loaded from in-memory assets and
//! driven through animators and attachment systems.

mod authoring;
mod composition;
mod flat;

use reanim_rs::prelude::*;

/// Flat timeline with a `body` track (x = frame index) and two sub-animation
/// marker tracks: `anim_attack` visible on frames 0..=3, `anim_idle` on 4..=7.
pub(crate) const ZOMBIE: &str = "<?xml version=\"1.0\"?>
<!-- exported -->
<fps>12</fps>
<track><name>anim_attack</name>
  <t><f>0</f></t><t/><t/><t/><t><f>-1</f></t><t/><t/><t/>
</track>
<track><name>anim_idle</name>
  <t><f>-1</f></t><t/><t/><t/><t><f>0</f></t><t/><t/><t/>
</track>
<track><name>body</name>
  <t><x>0</x><i>IMAGE_BODY</i></t><t><x>1</x></t><t><x>2</x></t><t><x>3</x></t>
  <t><x>4</x></t><t><x>5</x></t><t><x>6</x></t><t><x>7</x></t>
</track>";

pub(crate) fn loader() -> DefinitionLoader<MemorySource> {
	let source = MemorySource::new()
		.with_file("reanim/Zombie.reanim", ZOMBIE)
		.with_file(
			"reanim/Simple.reanim",
			"<fps>12</fps><track><name>body</name><t><x>0</x></t><t><x>10</x></t><t><x>20</x></t></track>",
		);
	DefinitionLoader::new(source)
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
	(a - b).abs() < 1e-3
}
