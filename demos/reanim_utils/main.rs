//! Timeline inspection utility.
//!
//! Provides three subcommands:
//! - `inspect`: load one timeline (flat document or authoring export directory)
//!   and print its tracks, optionally as JSON.
//! - `play`: drive an animator over a timeline for a number of ticks and print
//!   what would be drawn.
//! - `validate`: scan a directory and load every timeline found under it.
//!
//! Load settings come from an optional TOML file (`--config`) and `REANIM__*`
//! environment variables, e.g. `REANIM__MAX_ELEMENTS=500000`.

use std::{
	cell::RefCell,
	path::{Path, PathBuf},
	rc::Rc,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use reanim_rs::prelude::*;
use walkdir::WalkDir;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let config = load_config(cli.config.as_deref())?;
	match cli.command {
		Command::Inspect(opts) => run_inspect(opts, config),
		Command::Play(opts) => run_play(opts, config),
		Command::Validate(opts) => run_validate(opts, config),
	}
}

#[derive(Parser)]
#[command(name = "reanim_utils")]
#[command(author = "reanim-rs project")]
#[command(version)]
#[command(about = "Inspect, play and validate track-based animation timelines", long_about = None)]
struct Cli {
	/// TOML file with load settings
	#[arg(short, long, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print the tracks of one timeline
	Inspect(InspectArgs),
	/// Play a timeline and print the draw commands of each tick
	Play(PlayArgs),
	/// Load every timeline under a directory
	Validate(ValidateArgs),
}

#[derive(Args)]
struct InspectArgs {
	/// Flat timeline file or authoring export directory
	#[arg(value_name = "PATH")]
	path: PathBuf,

	/// Dump the whole definition as JSON
	#[arg(long, default_value_t = false)]
	json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
	Repeat,
	Once,
}

impl From<Policy> for LoopPolicy {
	fn from(policy: Policy) -> Self {
		match policy {
			Policy::Repeat => LoopPolicy::Repeat,
			Policy::Once => LoopPolicy::Once,
		}
	}
}

#[derive(Args)]
struct PlayArgs {
	/// Flat timeline file or authoring export directory
	#[arg(value_name = "PATH")]
	path: PathBuf,

	/// Play only the range of this track
	#[arg(short, long, value_name = "NAME")]
	track: Option<String>,

	/// Loop over the range of this track once the first pass ends
	#[arg(long, value_name = "NAME", requires = "track")]
	then: Option<String>,

	/// What happens at the end of the range
	#[arg(short, long, value_enum, default_value = "repeat")]
	policy: Policy,

	/// Number of ticks to run
	#[arg(short, long, value_name = "COUNT", default_value_t = 24)]
	frames: usize,

	/// Seconds per tick
	#[arg(long, value_name = "SECONDS", default_value_t = 1.0 / 30.0)]
	dt: f32,

	/// Print every draw command instead of a count
	#[arg(short, long, default_value_t = false)]
	verbose: bool,
}

#[derive(Args)]
struct ValidateArgs {
	/// Directory to scan
	#[arg(value_name = "DIR")]
	root: PathBuf,

	/// Recurse into sub-directories while scanning
	#[arg(short, long, default_value_t = false)]
	recursive: bool,

	/// File extension of flat timelines
	#[arg(long, value_name = "EXT", default_value = "reanim")]
	extension: String,
}

fn load_config(path: Option<&Path>) -> Result<LoadConfig> {
	let mut builder = config::Config::builder();
	if let Some(path) = path {
		if !path.is_file() {
			bail!("Config file {} does not exist", path.display());
		}
		builder = builder.add_source(config::File::from(path));
	}
	let settings = builder
		.add_source(config::Environment::with_prefix("REANIM").prefix_separator("__").separator("__").try_parsing(true))
		.build()
		.context("Failed to read load settings")?;
	let config: LoadConfig = settings.try_deserialize().context("Invalid load settings")?;
	debug!("load settings: {config:?}");
	Ok(config)
}

/// Splits a path into a disk source rooted at its parent and the name inside it.
fn open(path: &Path, config: LoadConfig) -> Result<(DefinitionLoader<DiskSource>, String)> {
	if !path.exists() {
		bail!("{} does not exist", path.display());
	}
	let root = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
	let name = path
		.file_name()
		.and_then(|name| name.to_str())
		.with_context(|| format!("{} has no usable file name", path.display()))?
		.to_string();
	Ok((DefinitionLoader::with_config(DiskSource::new(root), config), name))
}

fn run_inspect(args: InspectArgs, config: LoadConfig) -> Result<()> {
	let (mut loader, name) = open(&args.path, config)?;
	let def = loader.load(&name).with_context(|| format!("Failed to load {}", args.path.display()))?;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&*def)?);
		return Ok(());
	}

	println!("File: {}", args.path.display());
	println!("Frame rate: {} fps | frames: {} | tracks: {}", def.fps(), def.frame_count(), def.track_count());
	if let Some((width, height)) = def.size() {
		println!("Stage: {width} x {height}");
	}
	for (index, track) in def.tracks().iter().enumerate() {
		let range = match track.visible_range() {
			Some(range) => format!("{}..={}", range.begin(), range.end()),
			None => "never visible".to_string(),
		};
		let images: Vec<&str> = track
			.frames()
			.iter()
			.map(|frame| frame.image_ref.as_str())
			.filter(|image| !image.is_empty())
			.collect::<std::collections::BTreeSet<_>>()
			.into_iter()
			.collect();
		println!(
			"  [{index:>3}] {:<24} {range:<16} {}{}",
			track.name(),
			images.join(", "),
			if track.is_available() {
				""
			} else {
				" (hidden layer)"
			}
		);
	}
	println!("Images used: {}", loader.images_used().len());
	Ok(())
}

fn run_play(args: PlayArgs, config: LoadConfig) -> Result<()> {
	if !(args.dt.is_finite() && args.dt > 0.0) {
		bail!("dt must be a positive number of seconds");
	}
	let (mut loader, name) = open(&args.path, config)?;
	let def = loader.load(&name).with_context(|| format!("Failed to load {}", args.path.display()))?;

	let mut animator = Animator::new(def);
	let policy = match args.then {
		Some(target) => LoopPolicy::OnceThenSwitch(target),
		None => args.policy.into(),
	};
	match &args.track {
		Some(track) => {
			if !animator.play_track(track, policy, None) {
				bail!("No track named '{track}'");
			}
		}
		None => animator.play(policy),
	}

	let passes = Rc::new(RefCell::new(0usize));
	let (begin, _) = animator.frame_range();
	let counter = Rc::clone(&passes);
	animator.on_frame(begin as u32, move |_| *counter.borrow_mut() += 1);

	for tick in 0..args.frames {
		animator.update(args.dt);
		let commands = animator.pose(&Matrix2D::IDENTITY);
		let shown = commands.iter().filter(|command| command.visible).count();
		println!("tick {tick:>4} frame {:>8.3} draws {shown}", animator.current_frame());
		if args.verbose {
			for command in commands.iter().filter(|command| command.visible) {
				println!(
					"    {:<32} ({:>8.2}, {:>8.2}) scale ({:.2}, {:.2}) rot {:>7.2} alpha {:.2}",
					command.image_ref, command.x, command.y, command.scale_x, command.scale_y, command.rotation, command.alpha
				);
			}
		}
		if animator.is_finished() {
			info!("finished after {} ticks", tick + 1);
			break;
		}
	}
	info!("range start passed {} times", passes.borrow());
	Ok(())
}

fn run_validate(args: ValidateArgs, config: LoadConfig) -> Result<()> {
	if !args.root.is_dir() {
		bail!("{} is not a directory", args.root.display());
	}

	let targets = collect_timelines(&args.root, args.recursive, &args.extension, &config.manifest_name);
	if targets.is_empty() {
		println!("No timelines found under {}", args.root.display());
		return Ok(());
	}

	let mut loader = DefinitionLoader::with_config(DiskSource::new(&args.root), config);
	let mut failed = 0usize;
	for target in &targets {
		match loader.load(target) {
			Ok(def) => println!("✓ {target} - {} tracks, {} frames", def.track_count(), def.frame_count()),
			Err(err) => {
				failed += 1;
				println!("✗ {target} - {err}");
			}
		}
	}

	println!("\n{} timelines, {} failed, {} images referenced", targets.len(), failed, loader.images_used().len());
	if failed > 0 {
		bail!("Validation finished with errors (see summary)");
	}
	Ok(())
}

/// Flat documents by extension and export directories by their manifest, relative to `root`.
fn collect_timelines(root: &Path, recursive: bool, extension: &str, manifest: &str) -> Vec<String> {
	let max_depth = if recursive {
		usize::MAX
	} else {
		2
	};
	let mut found = Vec::new();

	for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
		let entry = match entry {
			Ok(entry) => entry,
			Err(err) => {
				warn!("{err}");
				continue;
			}
		};
		if !entry.file_type().is_file() {
			continue;
		}

		let path = entry.path();
		let target = if path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.eq_ignore_ascii_case(manifest)) {
			path.parent()
		} else if path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(extension)) {
			Some(path)
		} else {
			None
		};
		let Some(relative) = target.and_then(|target| target.strip_prefix(root).ok()) else {
			continue;
		};
		let relative = relative.to_string_lossy().replace('\\', "/");
		if !relative.is_empty() {
			found.push(relative);
		}
	}

	found.sort();
	found.dedup();
	found
}
