//! Session state
//!
//! Everything one play session owns lives here, including the host world.
//! Signals raised by lifecycle transitions are routed to the core components
//! first (director, obstacles, avatar, session tasks) and then published to
//! outside listeners on the event bus.

use super::avatar::{Lantern, PlayerAvatar};
use super::catalog::LevelCatalog;
use super::director::LevelDirector;
use super::error::{CatalogError, SpawnError};
use super::events::GameSignal;
use super::lifecycle::{GameLifecycle, GameMode};
use super::tick::FixedStepper;
use super::world::{Contact, World};
use crate::highscores::{RunRecord, ScoreBoard};
use crate::session::Session;
use crate::settings::{Settings, Tuning};

#[derive(Debug)]
pub struct GameState<W: World> {
    pub world: W,
    pub lifecycle: GameLifecycle,
    pub director: LevelDirector,
    pub player: Option<PlayerAvatar>,
    pub lantern: Option<Lantern>,
    pub session: Session,
    pub settings: Settings,
    pub scores: ScoreBoard,
    pub tuning: Tuning,
    pub(crate) stepper: FixedStepper,
    /// Fixed physics steps run
    pub time_ticks: u64,
    /// Frames run
    pub frames: u64,
}

impl<W: World> GameState<W> {
    /// Validate the catalog and sit on the title screen
    pub fn new(world: W, catalog: LevelCatalog, tuning: Tuning) -> Result<Self, CatalogError> {
        let director = LevelDirector::new(catalog, tuning.seed, tuning.backdrop_speed)?;
        Ok(Self {
            world,
            lifecycle: GameLifecycle::new(),
            director,
            player: None,
            lantern: None,
            session: Session::new(&tuning),
            settings: Settings::default(),
            scores: ScoreBoard::new(),
            tuning,
            stepper: FixedStepper::default(),
            time_ticks: 0,
            frames: 0,
        })
    }

    /// Title → Playing: spawn the avatar, lantern and first level
    pub fn start(&mut self, mode: GameMode) -> Result<(), SpawnError> {
        if !self.lifecycle.start(mode) {
            return Ok(());
        }

        let scenery = &self.director.catalog().scenery;
        self.player = Some(PlayerAvatar::spawn(&mut self.world, &scenery.player));
        self.lantern = Some(Lantern::spawn(&mut self.world, &scenery.lantern));

        self.director.spawn_intro(&mut self.world);
        self.director.set_game_mode(mode);
        self.director.start_first_level(&mut self.world)?;
        self.dispatch_signals()
    }

    /// GameOver → Playing
    pub fn continue_play(&mut self) -> Result<(), SpawnError> {
        if self.lifecycle.continue_play() {
            self.dispatch_signals()?;
        }
        Ok(())
    }

    /// Tear the session down to the title screen, as a scene reload would
    pub fn restart(&mut self) {
        if let Some(mode) = self.lifecycle.mode() {
            let level = match mode {
                GameMode::Climb => self.current_level() as u32,
                GameMode::Endless => self.director.levels_spawned,
            };
            let record = RunRecord {
                score: self.session.score(),
                mode,
                level,
            };
            if let Some(rank) = self.scores.add_run(record) {
                log::info!("Run ranked #{rank}");
            }
        }

        self.director.clear(&mut self.world);
        if let Some(player) = self.player.take() {
            self.world.destroy(player.handle);
        }
        if let Some(lantern) = self.lantern.take() {
            self.world.destroy(lantern.handle);
        }
        self.lifecycle.reset();
        self.session = Session::new(&self.tuning);
        log::info!("Session reset to title");
    }

    /// Route a physics contact to whoever cares about it
    pub fn handle_contact(&mut self, contact: Contact) {
        let is_game_over = self.lifecycle.is_game_over();
        let player = self.player.as_ref().map(|p| p.handle);
        let lantern = self.lantern.as_ref().map(|l| l.handle);

        for (body, other) in [(contact.a, contact.b), (contact.b, contact.a)] {
            let Some(index) = self.director.obstacle_index(body) else {
                continue;
            };

            // The lantern is a trigger: it reports but never collides
            if Some(other) == lantern {
                let moving = self.director.obstacles()[index].is_moving();
                if let Some(lantern) = &self.lantern {
                    lantern.on_obstacle_contact(moving, &mut self.lifecycle);
                }
                continue;
            }

            self.director.obstacles_mut()[index].on_collision(&mut self.world, is_game_over);

            if Some(other) == player && self.tuning.player_contact_is_fatal {
                if let Some(player) = &mut self.player {
                    player.on_obstacle_contact(&mut self.lifecycle);
                }
            }
        }
    }

    /// Deliver queued signals until none remain
    pub fn dispatch_signals(&mut self) -> Result<(), SpawnError> {
        loop {
            let signals = self.lifecycle.take_signals();
            if signals.is_empty() {
                return Ok(());
            }
            for signal in signals {
                self.route(signal)?;
                self.lifecycle.bus.publish(signal);
            }
        }
    }

    fn route(&mut self, signal: GameSignal) -> Result<(), SpawnError> {
        match signal {
            GameSignal::GameOver => {
                self.director.on_game_over(&mut self.world);
                if let Some(player) = &mut self.player {
                    player.on_game_over(&mut self.world);
                }
                if let Some(lantern) = &self.lantern {
                    lantern.on_game_over(&mut self.world);
                }
            }
            GameSignal::Continue => {
                self.director.on_continue(&mut self.world)?;
                if let Some(player) = &mut self.player {
                    player.on_continue(&mut self.world);
                }
                if let Some(lantern) = &self.lantern {
                    lantern.on_continue(&mut self.world);
                }
            }
            GameSignal::Finish => self.director.on_finish(&mut self.world),
            GameSignal::SoundToggle => self.settings.toggle_sound(),
            _ => {}
        }
        self.session.on_signal(signal);
        Ok(())
    }

    /// Climb level shown to the player (1-based, capped once finished)
    pub fn current_level(&self) -> usize {
        (self.director.index() + 1).min(self.director.catalog().len())
    }

    /// "Level: n/N" tracker text
    pub fn level_tracker_text(&self) -> String {
        format!("Level: {}/{}", self.current_level(), self.director.catalog().len())
    }
}
