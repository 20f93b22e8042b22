//! Lantern Climb - level orchestration and obstacle motion core
//!
//! Core modules:
//! - `sim`: Engine-independent simulation (levels, obstacles, lifecycle)
//! - `session`: Per-frame cooperative tasks (score, death timer, fades)
//! - `highscores`: Score bookkeeping with JSON persistence
//! - `settings`: Player preferences and data-driven tuning

pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::ScoreBoard;
pub use settings::{Settings, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed physics timestep (50 Hz, the host engine default)
    pub const FIXED_DT: f32 = 1.0 / 50.0;
    /// Maximum fixed steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the stepper
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Obstacle despawn rectangle
    pub const ABOVE_BOUNDARY: f32 = 7.5;
    pub const BELOW_BOUNDARY: f32 = -20.0;
    pub const LEFT_BOUNDARY: f32 = -11.0;
    pub const RIGHT_BOUNDARY: f32 = 11.0;
    /// Orbiting obstacles only check a lower bound
    pub const ORBIT_BELOW_BOUNDARY: f32 = -20.0;

    /// Once the level background scrolls below this, the next level spawns
    pub const BACKGROUND_BOUNDARY_Y: f32 = -28.0;
    /// Scrolling backdrops are removed below this
    pub const BACKDROP_DESPAWN_Y: f32 = -50.0;
    /// The finish backdrop stops scrolling here
    pub const FINISH_BACKDROP_STOP_Y: f32 = 0.0;

    /// Launch obstacles trigger when this close to their launch altitude
    pub const LAUNCH_EPSILON: f32 = 0.1;

    /// Fixed spawn points
    pub const CLOUD_POSITION: Vec2 = Vec2::new(0.0, 7.0);
    pub const INTRO_POSITION: Vec2 = Vec2::new(0.0, -1.0);
    pub const FINISH_BACKDROP_POSITION: Vec2 = Vec2::new(0.0, 13.0);
    pub const PLAYER_START: Vec2 = Vec2::ZERO;
    pub const LANTERN_POSITION: Vec2 = Vec2::new(0.0, -3.4);

    /// Gravity applied by the sandbox world (units/s²)
    pub const GRAVITY: f32 = -9.81;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
