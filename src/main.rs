//! Headless simulation
//!
//! Loads a map (or builds a walled arena), moves a scripted player around it
//! and lets the enemies chase. Everything interesting is logged; set
//! `RUST_LOG=debug` to see state transitions and re-plans.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ashvale::prelude::*;
use clap::Parser;
use log::{debug, info};

const TICK: f32 = 1.0 / 60.0;

/// Run the enemy AI without a window
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON or JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map number to start on; a generated arena is used when omitted
    #[arg(short, long)]
    map: Option<u32>,

    /// Ticks to simulate at 60 Hz
    #[arg(short, long, default_value_t = 3600)]
    ticks: u32,

    /// RNG seed for spawns and stuck escapes
    #[arg(short, long)]
    seed: Option<u64>,

    /// Swing at anything in reach
    #[arg(short, long)]
    fight: bool,
}

/// Open field with a blocked border and a row of pillars
fn arena(width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height);
    grid.block_border();
    let (w, h) = (width as i32, height as i32);
    for x in (6..w - 6).step_by(8) {
        for y in h / 3..h / 3 + 4 {
            grid.set_passable(x, y, false);
        }
    }
    grid
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::EnemySpawned { .. }
        | GameEvent::DetectionBegan { .. }
        | GameEvent::DetectionEnded { .. }
        | GameEvent::PlayerHealed { .. } => debug!("{event:?}"),
        _ => info!("{event:?}"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut level = match args.map {
        Some(index) => {
            config.first_map = index;
            Level::load(config).with_context(|| format!("failed to load map {index}"))?
        }
        None => {
            let grid = arena(config.map_width, config.map_height);
            Level::with_grid(config, grid, 1)
        }
    };

    let mut music = level.music_cue();
    let mut ticks_run = 0;
    for tick in 0..args.ticks {
        let size = level.grid().pixel_size();
        let center = size * 0.5;
        let radius = size.min_element() * 0.3;
        let angle = tick as f32 * TICK * 0.4;
        level
            .player_mut()
            .set_position(center + radius * Vec2::new(angle.cos(), angle.sin()));
        if args.fight {
            level.player_mut().swing();
        }

        level.tick(TICK);
        ticks_run = tick + 1;

        let mut cleared = false;
        for event in level.events().iter() {
            log_event(event);
            cleared |= matches!(event, GameEvent::LevelCleared { .. });
        }
        if level.music_cue() != music {
            music = level.music_cue();
            info!("Music: {}", music.track());
        }

        if level.is_game_over() {
            info!("Game over");
            break;
        }
        if cleared {
            if args.map.is_none() {
                info!("Arena cleared");
                break;
            }
            match level.advance() {
                Ok(()) => {}
                Err(MapError::NotFound { .. }) => {
                    info!("To be continued...");
                    break;
                }
                Err(err) => return Err(err).context("failed to load the next map"),
            }
        }
    }

    info!(
        "Ran {ticks_run} ticks: map {}, score {}, health {}/{}, {} enemies left",
        level.current_map_index(),
        level.player().score(),
        level.player().health(),
        level.player().max_health(),
        level.enemy_count()
    );
    Ok(())
}
