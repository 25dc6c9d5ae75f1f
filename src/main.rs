//! Lantern entry point
//!
//! Runs the simulation headless: loads a level, drives the player with a
//! scripted input and reports what happened.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use lantern::sim::{GameEvent, GameState, KeyColor, TickInput, tick};
use lantern::{CheckpointMeta, Level, LevelSequence, Settings};

const FRAME_DT: f32 = 1.0 / 60.0;

const DEMO_LEVEL: &str = "\
################################
#..............................#
#..............................#
#...........o.........vvv......#
#..P...o........C..............#
#.....r....#..........o.....R.A#
#======~~=====^^===============#
################################";

/// Headless runner for Lantern levels
#[derive(Parser, Debug)]
#[command(name = "lantern")]
#[command(about = "Run a Lantern level headless and report the outcome", long_about = None)]
#[command(version)]
struct Cli {
    /// Level text file (defaults to the built-in demo level)
    level: Option<PathBuf>,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Checkpoint metadata JSON file
    #[arg(long)]
    meta: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value = "600")]
    frames: u32,

    /// On completion, continue with the next map (map1 -> map2 -> map3) from
    /// the level file's directory
    #[arg(long)]
    chain: bool,
}

#[derive(Debug, Default)]
struct Tally {
    jumps: u32,
    landings: u32,
    doors_opened: usize,
    levels_completed: u32,
}

fn load_level(path: &Path, meta: Option<&Path>) -> Result<Level> {
    let mut level = Level::load(path)?;
    if let Some(meta) = meta {
        let metas = CheckpointMeta::load_list(meta)?;
        let applied = level.apply_checkpoint_meta(&metas);
        log::info!("Applied {}/{} checkpoint entries", applied, metas.len());
    }
    Ok(level)
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let level = match &cli.level {
        Some(path) => load_level(path, cli.meta.as_deref())?,
        None => Level::parse("demo", DEMO_LEVEL)?,
    };
    let level_dir = cli
        .level
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);
    let sequence = LevelSequence::default();

    let mut state = GameState::new(level, settings);
    let mut tally = Tally::default();
    let mut frames_run = 0;

    // Hold right, hop whenever there is ground underfoot
    for frame in 0..cli.frames {
        let input = TickInput {
            right: true,
            jump: state.player.grounded,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        frames_run = frame + 1;

        for event in &state.events {
            log::debug!("frame {}: {:?}", frame, event);
            match event {
                GameEvent::Jumped { .. } => tally.jumps += 1,
                GameEvent::Landed { .. } => tally.landings += 1,
                GameEvent::DoorsOpened { count, .. } => tally.doors_opened += count,
                GameEvent::LevelComplete { .. } => tally.levels_completed += 1,
                _ => {}
            }
        }

        if !state.level_complete {
            continue;
        }
        let next_path = match (&level_dir, cli.chain) {
            (Some(dir), true) => sequence
                .next_after(&state.level.name)
                .map(|name| LevelSequence::path_for(dir, name)),
            _ => None,
        };
        let Some(path) = next_path else {
            break;
        };
        state.load_level(load_level(&path, None)?);
    }

    print_summary(&state, &tally, frames_run);
    Ok(())
}

fn print_summary(state: &GameState, tally: &Tally, frames_run: u32) {
    let stats = &state.stats;
    log::info!(
        "Ran {} frames of '{}' ({} jumps, {} landings)",
        frames_run,
        state.level.name,
        tally.jumps,
        tally.landings
    );

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for obj in state.world.objects() {
        *kinds.entry(obj.kind.name()).or_insert(0) += 1;
    }
    let kinds: Vec<String> = kinds.iter().map(|(k, n)| format!("{n} {k}")).collect();
    let keys: Vec<String> = KeyColor::ALL
        .iter()
        .map(|&c| format!("{} {}", stats.keys_of(c), c.as_str()))
        .collect();

    println!("level:       {}", state.level.name);
    println!("objects:     {}", kinds.join(", "));
    println!("frames:      {}", frames_run);
    println!(
        "position:    ({:.1}, {:.1}){}",
        state.player.pos.x,
        state.player.pos.y,
        if state.player.grounded { " grounded" } else { "" }
    );
    println!(
        "complete:    {} ({} levels finished)",
        state.level_complete, tally.levels_completed
    );
    println!("time:        {:.2}s", stats.time);
    println!("deaths:      {}", stats.deaths);
    println!(
        "coins:       {} ({} left)",
        stats.coins,
        state.entities.coins_remaining()
    );
    println!(
        "keys:        {} ({}; {} doors opened)",
        stats.keys_total,
        keys.join(", "),
        tally.doors_opened
    );
    println!(
        "checkpoint:  {}",
        state
            .checkpoint
            .as_ref()
            .map_or("none", |cp| cp.name.as_str())
    );
    println!("visible:     {} tiles", state.visible.len());
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Lantern (headless) starting...");
    run(Cli::parse())
}
