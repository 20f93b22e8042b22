//! Global game-over / continue / finish state
//!
//! The lifecycle owns the only shared flags in the simulation. Transitions
//! queue their signal; the owning [`GameState`](super::GameState) drains the
//! queue, routes each signal to the core components, then publishes it on the
//! [`EventBus`] for outside listeners.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, GameSignal};

/// Session progression style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Ordered levels, ends in `Finished`
    Climb,
    /// Random non-repeating levels, never finishes
    Endless,
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing moves
    Title,
    /// Active gameplay
    Playing,
    /// Attempt failed, waiting for continue
    GameOver,
    /// Climb catalog exhausted
    Finished,
}

#[derive(Debug)]
pub struct GameLifecycle {
    phase: GamePhase,
    mode: Option<GameMode>,
    is_game_over: bool,
    is_game_finished: bool,
    outbox: Vec<GameSignal>,
    pub bus: EventBus,
}

impl Default for GameLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLifecycle {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Title,
            mode: None,
            is_game_over: false,
            is_game_finished: false,
            outbox: Vec::new(),
            bus: EventBus::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn is_game_finished(&self) -> bool {
        self.is_game_finished
    }

    /// Title → Playing
    pub fn start(&mut self, mode: GameMode) -> bool {
        if self.phase != GamePhase::Title {
            log::warn!("Ignoring start({mode:?}) in {:?}", self.phase);
            return false;
        }
        self.phase = GamePhase::Playing;
        self.mode = Some(mode);
        log::info!("Session started in {mode:?} mode");
        self.outbox.push(match mode {
            GameMode::Climb => GameSignal::Start,
            GameMode::Endless => GameSignal::EndlessStart,
        });
        true
    }

    /// Playing → GameOver. Repeated reports are ignored.
    pub fn report_collision(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.is_game_over {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.is_game_over = true;
        log::info!("Game over");
        self.outbox.push(GameSignal::GameOver);
        true
    }

    /// GameOver → Playing
    pub fn continue_play(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.is_game_over = false;
        self.is_game_finished = false;
        log::info!("Continuing");
        self.outbox.push(GameSignal::Continue);
        true
    }

    /// Playing → Finished (terminal)
    pub fn finish(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Finished;
        self.is_game_finished = true;
        log::info!("All levels cleared");
        self.outbox.push(GameSignal::Finish);
        true
    }

    /// Back to the title screen, as a scene reload would
    pub fn reset(&mut self) {
        self.phase = GamePhase::Title;
        self.mode = None;
        self.is_game_over = false;
        self.is_game_finished = false;
        self.outbox.clear();
    }

    /// Queue a UI signal. Lifecycle signals can only come from transitions.
    pub fn emit(&mut self, signal: GameSignal) -> bool {
        if signal.is_lifecycle() {
            log::warn!("{signal:?} can only be raised by a lifecycle transition");
            return false;
        }
        self.outbox.push(signal);
        true
    }

    /// Drain queued signals in the order they were raised
    pub fn take_signals(&mut self) -> Vec<GameSignal> {
        std::mem::take(&mut self.outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameLifecycle {
        let mut lifecycle = GameLifecycle::new();
        assert!(lifecycle.start(GameMode::Climb));
        lifecycle.take_signals();
        lifecycle
    }

    #[test]
    fn test_game_over_is_idempotent() {
        let mut lifecycle = playing();
        assert!(lifecycle.report_collision());
        assert!(!lifecycle.report_collision());
        assert_eq!(lifecycle.take_signals(), vec![GameSignal::GameOver]);
        assert!(lifecycle.is_game_over());
    }

    #[test]
    fn test_continue_resets_flags() {
        let mut lifecycle = playing();
        assert!(!lifecycle.continue_play());
        lifecycle.report_collision();
        assert!(lifecycle.continue_play());
        assert_eq!(lifecycle.phase(), GamePhase::Playing);
        assert!(!lifecycle.is_game_over());
        assert!(!lifecycle.is_game_finished());
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut lifecycle = playing();
        assert!(lifecycle.finish());
        assert!(!lifecycle.report_collision());
        assert!(!lifecycle.continue_play());
        assert!(!lifecycle.finish());
        assert_eq!(lifecycle.take_signals(), vec![GameSignal::Finish]);

        lifecycle.reset();
        assert_eq!(lifecycle.phase(), GamePhase::Title);
        assert!(lifecycle.start(GameMode::Endless));
        assert_eq!(lifecycle.take_signals(), vec![GameSignal::EndlessStart]);
    }

    #[test]
    fn test_emit_rejects_lifecycle_signals() {
        let mut lifecycle = GameLifecycle::new();
        assert!(!lifecycle.emit(GameSignal::GameOver));
        assert!(lifecycle.emit(GameSignal::SoundToggle));
        assert_eq!(lifecycle.take_signals(), vec![GameSignal::SoundToggle]);
    }
}
