//! Level progression and spawn scheduling
//!
//! The director spawns one level at a time. A level is considered done once
//! its background has scrolled below [`BACKGROUND_BOUNDARY_Y`], so progression
//! speed follows scroll speed and stops whenever the scene is frozen.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::catalog::LevelCatalog;
use super::error::{CatalogError, SpawnError};
use super::lifecycle::{GameLifecycle, GameMode, GamePhase};
use super::motion::Obstacle;
use super::world::{Handle, World};
use crate::consts::*;

/// Scrolling scenery roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropKind {
    Intro,
    Cloud,
    Background,
    /// Orbit center, scrolls with its level
    Anchor,
    /// Spawned once the climb is complete, settles at the top of the screen
    Finish,
}

#[derive(Debug, Clone, Copy)]
struct Backdrop {
    handle: Handle,
    kind: BackdropKind,
    scrolling: bool,
}

#[derive(Debug)]
pub struct LevelDirector {
    catalog: LevelCatalog,
    mode: GameMode,
    /// Current level (Climb)
    index: usize,
    /// Previous random pick (Endless)
    last_random: Option<usize>,
    rng: Pcg32,
    backdrop_speed: f32,
    background: Option<Handle>,
    cloud: Option<Handle>,
    label: Option<Handle>,
    finish_backdrop: Option<Handle>,
    backdrops: Vec<Backdrop>,
    obstacles: Vec<Obstacle>,
    finish_settled: bool,
    /// Levels spawned this session
    pub levels_spawned: u32,
}

impl LevelDirector {
    pub fn new(catalog: LevelCatalog, seed: u64, backdrop_speed: f32) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            catalog,
            mode: GameMode::Climb,
            index: 0,
            last_random: None,
            rng: Pcg32::seed_from_u64(seed),
            backdrop_speed,
            background: None,
            cloud: None,
            label: None,
            finish_backdrop: None,
            backdrops: Vec::new(),
            obstacles: Vec::new(),
            finish_settled: false,
            levels_spawned: 0,
        })
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_game_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn last_random(&self) -> Option<usize> {
        self.last_random
    }

    pub fn background(&self) -> Option<Handle> {
        self.background
    }

    pub fn label(&self) -> Option<Handle> {
        self.label
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn obstacle_index(&self, handle: Handle) -> Option<usize> {
        self.obstacles.iter().position(|o| o.handle == handle)
    }

    /// Level 0, progression reset
    pub fn start_first_level<W: World>(&mut self, world: &mut W) -> Result<(), SpawnError> {
        self.index = 0;
        if self.mode == GameMode::Endless {
            // The opening level counts as the previous pick
            self.last_random = Some(0);
        }
        self.spawn_level(world, 0)?;
        Ok(())
    }

    /// Uniform pick that never repeats the previous one
    pub fn random_level_index(&mut self) -> usize {
        let len = self.catalog.len();
        if len <= 1 {
            self.last_random = Some(0);
            return 0;
        }
        loop {
            let pick = self.rng.random_range(0..len);
            if Some(pick) != self.last_random {
                self.last_random = Some(pick);
                return pick;
            }
        }
    }

    /// Spawn every element of a level. Returns false if the index is out of range.
    pub fn spawn_level<W: World>(&mut self, world: &mut W, index: usize) -> Result<bool, SpawnError> {
        let Some(level) = self.catalog.levels.get(index) else {
            log::warn!("No level {index}, catalog has {}", self.catalog.len());
            return Ok(false);
        };

        if let Some(cloud) = &self.catalog.scenery.cloud {
            let handle = world.spawn(cloud, CLOUD_POSITION, 0.0);
            self.cloud = Some(handle);
            self.backdrops.push(Backdrop {
                handle,
                kind: BackdropKind::Cloud,
                scrolling: true,
            });
        }

        let background = world.spawn(&level.background, level.background_position, 0.0);
        self.background = Some(background);
        self.backdrops.push(Backdrop {
            handle: background,
            kind: BackdropKind::Background,
            scrolling: true,
        });

        if let Some(previous) = self.label.take() {
            world.destroy(previous);
        }
        self.label = Some(world.spawn_text(&level.label, &level.display_text));

        for (wave_index, wave) in level.waves.iter().enumerate() {
            let Some(descriptor) = wave.obstacle() else {
                if wave.count > 0 {
                    log::warn!("Level {index} wave {wave_index} has no obstacle descriptor");
                }
                continue;
            };
            for position in wave.spawn_positions() {
                let obstacle = Obstacle::spawn(world, descriptor, position, wave.rotation)?;
                if let Some(anchor) = obstacle.anchor() {
                    self.backdrops.push(Backdrop {
                        handle: anchor,
                        kind: BackdropKind::Anchor,
                        scrolling: true,
                    });
                }
                self.obstacles.push(obstacle);
            }
        }

        self.levels_spawned += 1;
        log::info!(
            "Spawned {} ({} obstacles)",
            level.display_text,
            level.obstacle_count()
        );
        Ok(true)
    }

    /// Scenery shown when a session starts or resumes
    pub fn spawn_intro<W: World>(&mut self, world: &mut W) {
        let handle = world.spawn(&self.catalog.scenery.intro, INTRO_POSITION, 0.0);
        self.backdrops.push(Backdrop {
            handle,
            kind: BackdropKind::Intro,
            scrolling: true,
        });
    }

    /// Whether the current background has scrolled past the spawn trigger
    pub fn background_past_boundary<W: World>(&self, world: &W) -> bool {
        self.background
            .and_then(|h| world.position(h))
            .is_some_and(|pos| pos.y < BACKGROUND_BOUNDARY_Y)
    }

    /// Advance progression once the current level has scrolled by
    pub fn on_background_past_boundary<W: World>(
        &mut self,
        world: &mut W,
        lifecycle: &mut GameLifecycle,
    ) -> Result<(), SpawnError> {
        match self.mode {
            GameMode::Climb => {
                if self.index < self.catalog.len() {
                    self.index += 1;
                    self.spawn_level(world, self.index)?;
                } else {
                    lifecycle.finish();
                }
            }
            GameMode::Endless => {
                let index = self.random_level_index();
                self.spawn_level(world, index)?;
            }
        }
        Ok(())
    }

    /// Throw away the failed level and respawn
    pub fn on_continue<W: World>(&mut self, world: &mut W) -> Result<(), SpawnError> {
        self.destroy_current_level(world);

        match self.mode {
            GameMode::Climb => {
                self.index = self.index.saturating_sub(1);
                self.spawn_level(world, self.index)?;
            }
            GameMode::Endless => {
                let index = self.random_level_index();
                self.spawn_level(world, index)?;
            }
        }

        self.spawn_intro(world);
        Ok(())
    }

    pub fn on_game_over<W: World>(&mut self, world: &mut W) {
        for obstacle in &mut self.obstacles {
            obstacle.on_game_over(world);
        }
    }

    pub fn on_finish<W: World>(&mut self, world: &mut W) {
        let handle = world.spawn(
            &self.catalog.scenery.finish_backdrop,
            FINISH_BACKDROP_POSITION,
            0.0,
        );
        self.finish_backdrop = Some(handle);
        self.backdrops.push(Backdrop {
            handle,
            kind: BackdropKind::Finish,
            scrolling: true,
        });
    }

    /// True once, when the finish backdrop comes to rest
    pub fn take_finish_settled(&mut self) -> bool {
        std::mem::take(&mut self.finish_settled)
    }

    /// Per-frame work: scroll scenery, despawn, progress levels
    pub fn frame_tick<W: World>(
        &mut self,
        world: &mut W,
        lifecycle: &mut GameLifecycle,
        dt: f32,
    ) -> Result<(), SpawnError> {
        if !lifecycle.is_game_over() {
            self.scroll_backdrops(world, dt);
        }

        // Progress before despawning so a long frame cannot lose the background
        let in_session = matches!(lifecycle.phase(), GamePhase::Playing | GamePhase::GameOver);
        if in_session && !lifecycle.is_game_finished() && self.background_past_boundary(world) {
            self.on_background_past_boundary(world, lifecycle)?;
        }

        self.obstacles.retain(|obstacle| {
            if obstacle.is_out_of_bounds(world) {
                log::debug!("{} left the playfield", obstacle.name);
                obstacle.destroy(world);
                return false;
            }
            world.is_alive(obstacle.handle)
        });

        // The current background drives progression until the climb is over
        let keep = if lifecycle.is_game_finished() {
            None
        } else {
            self.background
        };
        self.backdrops.retain(|backdrop| {
            let below = world
                .position(backdrop.handle)
                .is_some_and(|pos| pos.y < BACKDROP_DESPAWN_Y);
            let exempt = backdrop.kind == BackdropKind::Finish || Some(backdrop.handle) == keep;
            if below && !exempt {
                world.destroy(backdrop.handle);
                return false;
            }
            world.is_alive(backdrop.handle)
        });
        Ok(())
    }

    /// Per-physics-step work: scripted obstacle motion
    pub fn fixed_tick<W: World>(&mut self, world: &mut W, is_game_over: bool, dt: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.fixed_tick(world, is_game_over, dt);
        }
    }

    /// Remove every spawned element and reset progression
    pub fn clear<W: World>(&mut self, world: &mut W) {
        self.destroy_current_level(world);
        for backdrop in self.backdrops.drain(..) {
            world.destroy(backdrop.handle);
        }
        self.index = 0;
        self.last_random = None;
        self.finish_settled = false;
        self.levels_spawned = 0;
    }

    fn scroll_backdrops<W: World>(&mut self, world: &mut W, dt: f32) {
        let delta = Vec2::new(0.0, -self.backdrop_speed * dt);
        for backdrop in self.backdrops.iter_mut().filter(|b| b.scrolling) {
            world.translate(backdrop.handle, delta);
            if backdrop.kind == BackdropKind::Finish
                && world
                    .position(backdrop.handle)
                    .is_some_and(|pos| pos.y <= FINISH_BACKDROP_STOP_Y)
            {
                backdrop.scrolling = false;
                self.finish_settled = true;
            }
        }
    }

    fn destroy_current_level<W: World>(&mut self, world: &mut W) {
        for handle in [
            self.cloud.take(),
            self.background.take(),
            self.label.take(),
            self.finish_backdrop.take(),
        ]
        .into_iter()
        .flatten()
        {
            world.destroy(handle);
        }
        for obstacle in self.obstacles.drain(..) {
            obstacle.destroy(world);
        }
        self.backdrops.retain(|b| world.is_alive(b.handle));
    }
}
