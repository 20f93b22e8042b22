//! Player avatar and the lantern it protects

use glam::Vec2;

use super::catalog::Descriptor;
use super::lifecycle::GameLifecycle;
use super::world::{Handle, World};
use crate::consts::{LANTERN_POSITION, PLAYER_START};

/// Pointer-following body
#[derive(Debug, Clone)]
pub struct PlayerAvatar {
    pub handle: Handle,
    has_reported: bool,
}

impl PlayerAvatar {
    pub fn spawn<W: World>(world: &mut W, descriptor: &Descriptor) -> Self {
        let handle = world.spawn(descriptor, PLAYER_START, 0.0);
        world.set_gravity_scale(handle, 0.0);
        Self {
            handle,
            has_reported: false,
        }
    }

    /// Follow the pointer while the game is live
    pub fn frame_tick<W: World>(&mut self, world: &mut W, pointer: Option<Vec2>, is_game_over: bool) {
        if is_game_over {
            return;
        }
        if let Some(target) = pointer {
            world.set_kinematic_position(self.handle, target);
        }
    }

    /// Touching an obstacle ends the attempt, reported only once
    pub fn on_obstacle_contact(&mut self, lifecycle: &mut GameLifecycle) -> bool {
        if self.has_reported {
            return false;
        }
        self.has_reported = true;
        lifecycle.report_collision()
    }

    pub fn has_reported(&self) -> bool {
        self.has_reported
    }

    /// Rest and hide until continue
    pub fn on_game_over<W: World>(&mut self, world: &mut W) {
        world.set_velocity(self.handle, Vec2::ZERO);
        world.set_enabled(self.handle, false);
    }

    /// Back to the start position, ready to report again
    pub fn on_continue<W: World>(&mut self, world: &mut W) {
        self.has_reported = false;
        world.set_kinematic_position(self.handle, PLAYER_START);
        world.set_enabled(self.handle, true);
    }
}

/// Static body that ends the attempt when a falling obstacle reaches it
#[derive(Debug, Clone)]
pub struct Lantern {
    pub handle: Handle,
}

impl Lantern {
    pub fn spawn<W: World>(world: &mut W, descriptor: &Descriptor) -> Self {
        let handle = world.spawn(descriptor, LANTERN_POSITION, 0.0);
        world.set_gravity_scale(handle, 0.0);
        Self { handle }
    }

    /// Only translating obstacles put the flame out
    pub fn on_obstacle_contact(&self, obstacle_is_moving: bool, lifecycle: &mut GameLifecycle) -> bool {
        if !obstacle_is_moving || lifecycle.is_game_over() {
            return false;
        }
        lifecycle.report_collision()
    }

    pub fn on_game_over<W: World>(&self, world: &mut W) {
        world.set_enabled(self.handle, false);
    }

    pub fn on_continue<W: World>(&self, world: &mut W) {
        world.set_kinematic_position(self.handle, LANTERN_POSITION);
        world.set_enabled(self.handle, true);
    }
}
