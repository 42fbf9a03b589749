//! Benchmark suite for timeline parsing and playback
//!
//! Measures the flat timeline reader, per-frame animator work (advance, sample,
//! draw) and a full attachment system tick.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use reanim_benches::{generate_definition, generate_flat_document};
use reanim_player::{Animator, AttachmentSystem, CountingSink, Effect, LoopPolicy};
use reanim_types::{
	file::{LoadConfig, flat},
	math::Matrix2D,
};
use std::{collections::BTreeSet, hint::black_box, sync::Arc};

/// Benchmark parsing flat documents of growing size
fn bench_parse_flat(c: &mut Criterion) {
	let mut group = c.benchmark_group("flat_parse");
	let config = LoadConfig::lenient();

	for (tracks, frames) in [(8, 30), (32, 120), (64, 400)] {
		let text = generate_flat_document(tracks, frames);
		group.throughput(Throughput::Bytes(text.len() as u64));
		group.bench_with_input(BenchmarkId::new("parse", format!("{tracks}x{frames}")), &text, |b, text| {
			b.iter(|| {
				let mut images = BTreeSet::new();
				let result = flat::parse(black_box(text), &config, &mut images);
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark one animator tick: advance, then sample every track
fn bench_update_and_sample(c: &mut Criterion) {
	let mut group = c.benchmark_group("animator_tick");
	let definition = generate_definition(32, 120);
	let tracks = definition.track_count();

	let mut animator = Animator::new(definition);
	animator.play_track("anim_first", LoopPolicy::Repeat, None);

	group.throughput(Throughput::Elements(tracks as u64));
	group.bench_function("update_sample", |b| {
		b.iter(|| {
			animator.update(black_box(1.0 / 60.0));
			for index in 0..tracks {
				black_box(animator.interpolated_transform(index));
			}
		});
	});

	group.bench_function("draw", |b| {
		let mut sink = CountingSink::default();
		b.iter(|| black_box(animator.draw(&Matrix2D::IDENTITY, &mut sink)));
	});

	group.finish();
}

/// Benchmark a full attachment system tick with every slot in use
fn bench_attachment_tick(c: &mut Criterion) {
	let mut group = c.benchmark_group("attachment_tick");
	let definition = generate_definition(16, 60);

	let mut system = AttachmentSystem::new();
	let Some(id) = system.create_attachment(Some("root")) else {
		eprintln!("Warning: could not create attachment");
		return;
	};
	let slots = system.config().max_effects;
	for _ in 0..slots {
		let animator = Animator::new(Arc::clone(&definition)).into_shared();
		animator.borrow_mut().play(LoopPolicy::Repeat);
		system.add_effect(id, Effect::Animator(animator), 0.0, 0.0, 1.0, 0.0);
	}

	group.throughput(Throughput::Elements(slots as u64));
	group.bench_function("update_draw", |b| {
		let mut sink = CountingSink::default();
		b.iter(|| {
			system.update_all(black_box(1.0 / 60.0));
			black_box(system.draw_all(&Matrix2D::IDENTITY, &mut sink))
		});
	});

	group.finish();
}

criterion_group!(benches, bench_parse_flat, bench_update_and_sample, bench_attachment_tick);

criterion_main!(benches);
