//! Lantern Climb headless runner
//!
//! Plays a scripted session against the sandbox world and logs the outcome.
//!
//! Usage: `lantern-climb [--endless] [catalog.json] [tuning.json]`

use std::process;

use glam::Vec2;

use lantern_climb::consts::*;
use lantern_climb::sim::{GameMode, GamePhase, GameState, LevelCatalog, SandboxWorld, TickInput, tick};
use lantern_climb::{ScoreBoard, Settings, Tuning};

/// Simulated seconds before the runner gives up
const MAX_SECONDS: f32 = 120.0;
/// Seconds spent on the game-over screen before pressing continue
const CONTINUE_DELAY: f32 = 1.5;

const SETTINGS_PATH: &str = "lantern-climb-settings.json";
const SCORES_PATH: &str = "lantern-climb-scores.json";

fn main() {
    env_logger::init();

    let mut mode = GameMode::Climb;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--endless" {
            mode = GameMode::Endless;
        } else {
            paths.push(arg);
        }
    }

    let catalog = match paths.first() {
        Some(path) => match LevelCatalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to load catalog: {e}");
                process::exit(1);
            }
        },
        None => LevelCatalog::demo(),
    };
    let tuning = paths.get(1).map(Tuning::load).unwrap_or_default();

    let mut state = match GameState::new(SandboxWorld::new(), catalog, tuning) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid catalog: {e}");
            process::exit(1);
        }
    };
    state.settings = Settings::load(SETTINGS_PATH);
    state.scores = ScoreBoard::load(SCORES_PATH);

    log::info!("Lantern Climb (headless) starting in {mode:?} mode");
    if let Err(e) = run(&mut state, mode) {
        log::error!("Session aborted: {e}");
        process::exit(1);
    }

    log::info!(
        "Ended in {:?} after {:.1}s: score {}, best {}, {} levels spawned, {} runs recorded",
        state.lifecycle.phase(),
        state.frames as f32 * FIXED_DT,
        state.session.score(),
        state.scores.best,
        state.director.levels_spawned,
        state.scores.runs.len(),
    );

    // Record the unfinished run the way a timeout restart would
    state.restart();
    if let Err(e) = state.scores.save(SCORES_PATH) {
        log::warn!("Could not save high scores: {e}");
    }
    if let Err(e) = state.settings.save(SETTINGS_PATH) {
        log::warn!("Could not save settings: {e}");
    }
}

fn run(state: &mut GameState<SandboxWorld>, mode: GameMode) -> Result<(), lantern_climb::sim::SpawnError> {
    let mut input = TickInput {
        start: Some(mode),
        ..Default::default()
    };
    let mut game_over_time = 0.0;
    let mut time = 0.0;

    while time < MAX_SECONDS {
        // Sweep the avatar across the lower half of the screen
        input.pointer = Some(Vec2::new((time * 1.3).sin() * 8.0, -6.0 + (time * 0.7).cos()));

        if state.lifecycle.is_game_over() {
            game_over_time += FIXED_DT;
            input.continue_pressed = game_over_time >= CONTINUE_DELAY;
        } else {
            game_over_time = 0.0;
            input.continue_pressed = false;
        }

        tick(state, &input, FIXED_DT)?;
        input.start = None;
        time += FIXED_DT;

        if state.lifecycle.phase() == GamePhase::Finished && !state.session.is_scoring() {
            break;
        }
    }
    Ok(())
}
