//! Two-phase game loop
//!
//! Each frame runs the variable-step frame phase for every entity, then as
//! many fixed physics steps as the accumulated time allows.

use glam::Vec2;

use super::error::SpawnError;
use super::events::GameSignal;
use super::lifecycle::GameMode;
use super::state::GameState;
use super::world::World;
use crate::consts::*;
use crate::session::SessionEvent;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in world space
    pub pointer: Option<Vec2>,
    /// Start button (Climb) or endless button pressed
    pub start: Option<GameMode>,
    /// Continue button pressed
    pub continue_pressed: bool,
    /// UI buttons (sound, bonus, claim, close)
    pub ui: Vec<GameSignal>,
}

/// Accumulates frame time into fixed steps
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    /// Number of fixed steps due after a frame of `dt` seconds
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= FIXED_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= FIXED_DT;
            substeps += 1;
        }
        substeps
    }
}

/// Run one frame: frame phase, then the fixed steps it owes.
/// Returns the number of fixed steps run.
pub fn tick<W: World>(state: &mut GameState<W>, input: &TickInput, dt: f32) -> Result<u32, SpawnError> {
    frame_tick(state, input, dt)?;

    let steps = state.stepper.advance(dt);
    for _ in 0..steps {
        fixed_tick(state, FIXED_DT)?;
    }
    Ok(steps)
}

/// Variable-rate phase: input, scenery, despawns, level progression, UI tasks
pub fn frame_tick<W: World>(state: &mut GameState<W>, input: &TickInput, dt: f32) -> Result<(), SpawnError> {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    for &signal in &input.ui {
        state.lifecycle.emit(signal);
    }
    if let Some(mode) = input.start {
        state.start(mode)?;
    }
    if input.continue_pressed {
        state.continue_play()?;
    }

    let is_game_over = state.lifecycle.is_game_over();
    if let Some(player) = &mut state.player {
        player.frame_tick(&mut state.world, input.pointer, is_game_over);
    }

    state
        .director
        .frame_tick(&mut state.world, &mut state.lifecycle, dt)?;
    if state.director.take_finish_settled() {
        state.session.on_congrats();
    }
    state.dispatch_signals()?;

    let is_game_over = state.lifecycle.is_game_over();
    if let Some(SessionEvent::RestartRequested) = state.session.poll(dt, is_game_over) {
        state.restart();
    }
    state.scores.observe(state.session.score());

    state.frames += 1;
    Ok(())
}

/// Fixed-rate phase: scripted motion, physics step, contact routing
pub fn fixed_tick<W: World>(state: &mut GameState<W>, dt: f32) -> Result<(), SpawnError> {
    let is_game_over = state.lifecycle.is_game_over();
    state.director.fixed_tick(&mut state.world, is_game_over, dt);

    for contact in state.world.step(dt) {
        state.handle_contact(contact);
    }
    state.dispatch_signals()?;

    state.time_ticks += 1;
    Ok(())
}
