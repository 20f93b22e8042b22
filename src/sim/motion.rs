//! Per-obstacle motion state machine
//!
//! Each obstacle carries one [`MotionProfile`]: scripted kinematic movement,
//! a one-shot launch into dynamic physics, self rotation, or an orbit around
//! an anchor. Scripted motion stops for good after the first collision or
//! while the game is over; from then on only physics moves the body.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary::BoundaryCategory;
use super::catalog::Descriptor;
use super::error::SpawnError;
use super::world::{Handle, World};
use crate::consts::LAUNCH_EPSILON;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Translating obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveType {
    StaticDown,
    StaticLeft,
    StaticRight,
    LaunchDownLeft,
    LaunchDownRight,
    LaunchDownMiddle,
}

impl MoveType {
    /// Scripted direction for static variants, launch direction otherwise
    pub fn direction(self) -> Vec2 {
        match self {
            MoveType::StaticDown | MoveType::LaunchDownMiddle => Vec2::NEG_Y,
            MoveType::StaticLeft | MoveType::LaunchDownLeft => Vec2::NEG_X,
            MoveType::StaticRight | MoveType::LaunchDownRight => Vec2::X,
        }
    }

    pub fn is_launch(self) -> bool {
        matches!(
            self,
            MoveType::LaunchDownLeft | MoveType::LaunchDownRight | MoveType::LaunchDownMiddle
        )
    }

    pub fn boundary(self) -> BoundaryCategory {
        match self {
            MoveType::StaticLeft => BoundaryCategory::LeftSweeping,
            MoveType::StaticRight => BoundaryCategory::RightSweeping,
            _ => BoundaryCategory::DownFalling,
        }
    }
}

/// Rotating obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateType {
    SelfRotate,
    OrbitRotate,
}

fn default_move_speed() -> f32 {
    5.0
}

fn default_launch_speed() -> f32 {
    7.5
}

fn default_launch_y() -> f32 {
    3.5
}

fn default_rotate_speed() -> f32 {
    750f32.to_radians()
}

/// Authored motion for an obstacle descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MotionSpec {
    /// Never moves on its own
    Inert,
    Move {
        move_type: MoveType,
        /// Scripted speed (units/s)
        #[serde(default = "default_move_speed")]
        speed: f32,
        /// Impulse magnitude for launch variants
        #[serde(default = "default_launch_speed")]
        launch_speed: f32,
        /// Altitude at which launch variants fire
        #[serde(default = "default_launch_y")]
        launch_y: f32,
    },
    Rotate {
        rotate_type: RotateType,
        /// Angular speed (radians/s)
        #[serde(default = "default_rotate_speed")]
        speed: f32,
        /// Orbit center relative to the spawn position
        #[serde(default)]
        anchor_offset: Option<Vec2>,
    },
}

impl MotionSpec {
    pub fn static_move(move_type: MoveType, speed: f32) -> Self {
        MotionSpec::Move {
            move_type,
            speed,
            launch_speed: default_launch_speed(),
            launch_y: default_launch_y(),
        }
    }

    pub fn launch(move_type: MoveType, speed: f32, launch_speed: f32, launch_y: f32) -> Self {
        MotionSpec::Move {
            move_type,
            speed,
            launch_speed,
            launch_y,
        }
    }

    pub fn self_rotate(speed: f32) -> Self {
        MotionSpec::Rotate {
            rotate_type: RotateType::SelfRotate,
            speed,
            anchor_offset: None,
        }
    }

    pub fn orbit(speed: f32, anchor_offset: Vec2) -> Self {
        MotionSpec::Rotate {
            rotate_type: RotateType::OrbitRotate,
            speed,
            anchor_offset: Some(anchor_offset),
        }
    }

    /// Check that this spec can be turned into a profile
    pub fn validate(&self, name: &str) -> Result<(), SpawnError> {
        match self {
            MotionSpec::Rotate {
                rotate_type: RotateType::OrbitRotate,
                anchor_offset: None,
                ..
            } => Err(SpawnError::MissingAnchor(name.to_owned())),
            _ => Ok(()),
        }
    }
}

/// Orbit parameters. Radius and phase are sampled once at spawn; the center
/// follows the anchor body every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub anchor: Handle,
    /// Last known anchor position
    pub center: Vec2,
    pub radius: f32,
    pub start_angle: f32,
    /// Accumulated angle since spawn
    pub angle: f32,
    pub angular_speed: f32,
}

impl Orbit {
    fn around(anchor: Handle, center: Vec2, position: Vec2, angular_speed: f32) -> Self {
        // atan2(dy, dx) so the first step continues from the spawn point
        let (radius, start_angle) = cartesian_to_polar(position - center);
        Self {
            anchor,
            center,
            radius,
            start_angle,
            angle: 0.0,
            angular_speed,
        }
    }

    /// Point on the circle for the current accumulated angle
    pub fn point(&self) -> Vec2 {
        self.center + polar_to_cartesian(self.radius, self.angle + self.start_angle)
    }
}

/// Runtime motion state of one obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    Inert,
    Static {
        direction: Vec2,
        speed: f32,
    },
    Launch {
        direction: Vec2,
        speed: f32,
        launch_speed: f32,
        launch_y: f32,
        has_launched: bool,
    },
    SelfRotate {
        angular_speed: f32,
    },
    Orbit(Orbit),
}

impl MotionProfile {
    /// Build the runtime profile. Orbits spawn their anchor body here.
    fn from_spec<W: World>(world: &mut W, name: &str, spec: &MotionSpec, position: Vec2) -> Self {
        match *spec {
            MotionSpec::Inert => MotionProfile::Inert,
            MotionSpec::Move {
                move_type,
                speed,
                launch_speed,
                launch_y,
            } => {
                if move_type.is_launch() {
                    MotionProfile::Launch {
                        direction: move_type.direction(),
                        speed,
                        launch_speed,
                        launch_y,
                        has_launched: false,
                    }
                } else {
                    MotionProfile::Static {
                        direction: move_type.direction(),
                        speed,
                    }
                }
            }
            MotionSpec::Rotate {
                rotate_type: RotateType::SelfRotate,
                speed,
                ..
            } => MotionProfile::SelfRotate {
                angular_speed: speed,
            },
            MotionSpec::Rotate {
                rotate_type: RotateType::OrbitRotate,
                speed,
                anchor_offset,
            } => {
                let center = position + anchor_offset.unwrap_or(Vec2::ZERO);
                let anchor = world.spawn(&Descriptor::scenery(format!("{name}_anchor")), center, 0.0);
                MotionProfile::Orbit(Orbit::around(anchor, center, position, speed))
            }
        }
    }

    fn is_rotating(&self) -> bool {
        matches!(self, MotionProfile::SelfRotate { .. } | MotionProfile::Orbit(_))
    }
}

/// A spawned obstacle and its motion state
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub handle: Handle,
    pub name: String,
    pub profile: MotionProfile,
    pub has_collided: bool,
    boundary: Option<BoundaryCategory>,
}

impl Obstacle {
    /// Instantiate an obstacle. Fails if the descriptor has no usable motion.
    pub fn spawn<W: World>(
        world: &mut W,
        descriptor: &Descriptor,
        position: Vec2,
        rotation: f32,
    ) -> Result<Self, SpawnError> {
        let spec = descriptor
            .motion
            .as_ref()
            .ok_or_else(|| SpawnError::MissingMotion(descriptor.name.clone()))?;
        spec.validate(&descriptor.name)?;

        let boundary = match spec {
            MotionSpec::Move { move_type, .. } => Some(move_type.boundary()),
            MotionSpec::Rotate { .. } => Some(BoundaryCategory::Orbit),
            MotionSpec::Inert => None,
        };

        let handle = world.spawn(descriptor, position, rotation);
        world.set_gravity_scale(handle, 0.0);

        let profile = MotionProfile::from_spec(world, &descriptor.name, spec, position);
        if let MotionProfile::SelfRotate { angular_speed } = profile {
            world.set_angular_velocity(handle, angular_speed);
        }

        Ok(Self {
            handle,
            name: descriptor.name.clone(),
            profile,
            has_collided: false,
            boundary,
        })
    }

    /// Advance scripted motion by one physics step
    pub fn fixed_tick<W: World>(&mut self, world: &mut W, is_game_over: bool, dt: f32) {
        if is_game_over || self.has_collided {
            return;
        }

        match &mut self.profile {
            MotionProfile::Static { direction, speed } => {
                step_kinematic(world, self.handle, *direction, *speed, dt);
            }
            MotionProfile::Launch {
                direction,
                speed,
                launch_speed,
                launch_y,
                has_launched,
            } => {
                if *has_launched {
                    return;
                }
                let Some(pos) = world.position(self.handle) else {
                    return;
                };
                if (pos.y - *launch_y).abs() > LAUNCH_EPSILON {
                    step_kinematic(world, self.handle, Vec2::NEG_Y, *speed, dt);
                } else {
                    *has_launched = true;
                    // Scripted velocity must not fight the impulse
                    world.set_velocity(self.handle, Vec2::ZERO);
                    world.set_gravity_scale(self.handle, 1.0);
                    world.apply_impulse(self.handle, *direction, *launch_speed);
                    log::debug!("{} launched at y={:.2}", self.name, pos.y);
                }
            }
            MotionProfile::Orbit(orbit) => {
                if let Some(center) = world.position(orbit.anchor) {
                    orbit.center = center;
                }
                orbit.angle += orbit.angular_speed * dt;
                world.set_kinematic_position(self.handle, orbit.point());
            }
            MotionProfile::Inert | MotionProfile::SelfRotate { .. } => {}
        }
    }

    /// First contact stops scripted motion and hands the body to physics
    pub fn on_collision<W: World>(&mut self, world: &mut W, is_game_over: bool) {
        if self.has_collided {
            return;
        }
        self.has_collided = true;

        if let MotionProfile::SelfRotate { .. } = self.profile {
            world.set_angular_velocity(self.handle, 0.0);
        }
        // A frozen scene stays frozen
        if !is_game_over && !matches!(self.profile, MotionProfile::Inert) {
            world.set_gravity_scale(self.handle, 1.0);
        }
    }

    /// Stop every form of motion
    pub fn on_game_over<W: World>(&mut self, world: &mut W) {
        match &mut self.profile {
            MotionProfile::Static { speed, .. } | MotionProfile::Launch { speed, .. } => {
                *speed = 0.0;
            }
            MotionProfile::SelfRotate { angular_speed } => *angular_speed = 0.0,
            MotionProfile::Orbit(orbit) => orbit.angular_speed = 0.0,
            MotionProfile::Inert => {}
        }
        world.set_velocity(self.handle, Vec2::ZERO);
        world.set_angular_velocity(self.handle, 0.0);
        world.set_gravity_scale(self.handle, 0.0);
    }

    /// Body the orbit circles around, if any
    pub fn anchor(&self) -> Option<Handle> {
        match self.profile {
            MotionProfile::Orbit(orbit) => Some(orbit.anchor),
            _ => None,
        }
    }

    /// Remove the body and its anchor from the world
    pub fn destroy<W: World>(&self, world: &mut W) {
        world.destroy(self.handle);
        if let Some(anchor) = self.anchor() {
            world.destroy(anchor);
        }
    }

    /// Whether the body has left its despawn rectangle
    pub fn is_out_of_bounds<W: World>(&self, world: &W) -> bool {
        match (self.boundary, world.position(self.handle)) {
            (Some(boundary), Some(pos)) => boundary.is_out_of_bounds(pos),
            _ => false,
        }
    }

    /// Configured scripted speed (linear or angular)
    pub fn speed(&self) -> f32 {
        match self.profile {
            MotionProfile::Static { speed, .. } | MotionProfile::Launch { speed, .. } => speed,
            MotionProfile::SelfRotate { angular_speed } => angular_speed,
            MotionProfile::Orbit(orbit) => orbit.angular_speed,
            MotionProfile::Inert => 0.0,
        }
    }

    pub fn has_launched(&self) -> bool {
        matches!(
            self.profile,
            MotionProfile::Launch {
                has_launched: true,
                ..
            }
        )
    }

    /// Translating (non-rotating, non-inert) obstacle
    pub fn is_moving(&self) -> bool {
        matches!(
            self.profile,
            MotionProfile::Static { .. } | MotionProfile::Launch { .. }
        )
    }

    pub fn is_rotating(&self) -> bool {
        self.profile.is_rotating()
    }
}

fn step_kinematic<W: World>(world: &mut W, handle: Handle, direction: Vec2, speed: f32, dt: f32) {
    if let Some(pos) = world.position(handle) {
        world.set_kinematic_position(handle, pos + direction * speed * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BELOW_BOUNDARY, FIXED_DT};
    use crate::sim::world::SandboxWorld;

    fn obstacle_with(spec: MotionSpec) -> Descriptor {
        Descriptor::new("rock").with_radius(0.5).with_motion(spec)
    }

    fn spawn(world: &mut SandboxWorld, spec: MotionSpec, pos: Vec2) -> Obstacle {
        Obstacle::spawn(world, &obstacle_with(spec), pos, 0.0).expect("valid obstacle")
    }

    #[test]
    fn test_spawn_requires_motion() {
        let mut world = SandboxWorld::new();
        let err = Obstacle::spawn(&mut world, &Descriptor::new("bare"), Vec2::ZERO, 0.0)
            .expect_err("missing motion");
        assert_eq!(err, SpawnError::MissingMotion("bare".into()));
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    fn test_orbit_requires_anchor() {
        let mut world = SandboxWorld::new();
        let spec = MotionSpec::Rotate {
            rotate_type: RotateType::OrbitRotate,
            speed: 1.0,
            anchor_offset: None,
        };
        let err = Obstacle::spawn(&mut world, &obstacle_with(spec), Vec2::ZERO, 0.0)
            .expect_err("missing anchor");
        assert_eq!(err, SpawnError::MissingAnchor("rock".into()));
    }

    #[test]
    fn test_static_moves_kinematically() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::static_move(MoveType::StaticLeft, 5.0),
            Vec2::ZERO,
        );

        rock.fixed_tick(&mut world, false, FIXED_DT);
        let pos = world.position(rock.handle).unwrap();
        assert!((pos.x + 5.0 * FIXED_DT).abs() < 1e-6);
        assert_eq!(pos.y, 0.0);
    }

    #[test]
    fn test_collision_stops_scripted_motion() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::static_move(MoveType::StaticDown, 5.0),
            Vec2::ZERO,
        );
        rock.on_collision(&mut world, false);
        let writes = world.kinematic_writes;

        rock.fixed_tick(&mut world, false, FIXED_DT);
        assert_eq!(world.kinematic_writes, writes);
        assert_eq!(world.body(rock.handle).unwrap().gravity_scale, 1.0);
    }

    #[test]
    fn test_launch_fires_exactly_once() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::launch(MoveType::LaunchDownRight, 5.0, 7.5, 3.5),
            Vec2::new(0.0, 6.0),
        );

        for _ in 0..200 {
            rock.fixed_tick(&mut world, false, FIXED_DT);
            // Keep it parked near the launch altitude
            world.set_velocity(rock.handle, Vec2::ZERO);
            world.set_kinematic_position(rock.handle, Vec2::new(0.0, 3.5));
        }

        assert!(rock.has_launched());
        assert_eq!(world.impulses.len(), 1);
        assert_eq!(world.impulses[0], (rock.handle, Vec2::new(7.5, 0.0)));
    }

    #[test]
    fn test_launch_falls_until_altitude() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::launch(MoveType::LaunchDownMiddle, 5.0, 7.5, 3.5),
            Vec2::new(0.0, 6.0),
        );

        let mut ticks = 0;
        while !rock.has_launched() && ticks < 100 {
            rock.fixed_tick(&mut world, false, FIXED_DT);
            world.step(FIXED_DT);
            ticks += 1;
        }

        assert!(rock.has_launched());
        assert_eq!(world.impulses[0].1, Vec2::new(0.0, -7.5));
        // 2.5 units at 0.1 per tick, triggered within the epsilon window
        assert!((24..=26).contains(&ticks), "launched after {ticks} ticks");
    }

    #[test]
    fn test_self_rotate_stops_on_collision() {
        let mut world = SandboxWorld::new();
        let mut wheel = spawn(&mut world, MotionSpec::self_rotate(3.0), Vec2::ZERO);
        assert_eq!(world.body(wheel.handle).unwrap().angular_vel, 3.0);

        wheel.on_collision(&mut world, false);
        assert_eq!(world.body(wheel.handle).unwrap().angular_vel, 0.0);
        assert_eq!(world.body(wheel.handle).unwrap().gravity_scale, 1.0);

        // A falling wheel leaves through the bottom
        world.set_kinematic_position(wheel.handle, Vec2::new(0.0, -20.5));
        assert!(wheel.is_out_of_bounds(&world));
    }

    #[test]
    fn test_orbit_keeps_fixed_radius() {
        let mut world = SandboxWorld::new();
        let start = Vec2::new(2.0, 1.0);
        let offset = Vec2::new(-2.0, 0.0);
        let mut moon = spawn(&mut world, MotionSpec::orbit(2.0, offset), start);
        let center = start + offset;

        for _ in 0..123 {
            moon.fixed_tick(&mut world, false, FIXED_DT);
            let pos = world.position(moon.handle).unwrap();
            assert!((pos.distance(center) - 2.0).abs() < 1e-4);
        }

        assert_eq!(moon.anchor().and_then(|a| world.position(a)), Some(center));

        // Phase is preserved: a quarter turn from the start point
        let mut quarter = spawn(&mut world, MotionSpec::orbit(1.0, offset), start);
        quarter.fixed_tick(&mut world, false, std::f32::consts::FRAC_PI_2);
        let pos = world.position(quarter.handle).unwrap();
        assert!(pos.distance(Vec2::new(0.0, 3.0)) < 1e-4);
    }

    #[test]
    fn test_orbit_follows_moving_anchor() {
        let mut world = SandboxWorld::new();
        let start = Vec2::new(1.0, 4.0);
        let mut moon = spawn(&mut world, MotionSpec::orbit(2.0, Vec2::new(-1.0, 0.0)), start);
        let anchor = moon.anchor().unwrap();
        assert_eq!(world.count_named("rock_anchor"), 1);

        for _ in 0..50 {
            world.translate(anchor, Vec2::new(0.0, -0.2));
            moon.fixed_tick(&mut world, false, FIXED_DT);
            let center = world.position(anchor).unwrap();
            let pos = world.position(moon.handle).unwrap();
            assert!((pos.distance(center) - 1.0).abs() < 1e-4);
        }
        // The anchor fell 10 units and took the moon with it
        assert!(world.position(moon.handle).unwrap().y < -4.0);

        moon.destroy(&mut world);
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    fn test_game_over_freezes_everything() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::static_move(MoveType::StaticDown, 5.0),
            Vec2::ZERO,
        );
        let mut wheel = spawn(&mut world, MotionSpec::self_rotate(3.0), Vec2::new(3.0, 0.0));
        world.set_velocity(rock.handle, Vec2::new(1.0, -4.0));

        rock.on_game_over(&mut world);
        wheel.on_game_over(&mut world);
        let writes = world.kinematic_writes;
        rock.fixed_tick(&mut world, true, FIXED_DT);
        wheel.fixed_tick(&mut world, true, FIXED_DT);
        world.step(FIXED_DT);

        assert_eq!(rock.speed(), 0.0);
        assert_eq!(wheel.speed(), 0.0);
        assert_eq!(world.body(wheel.handle).unwrap().angular_vel, 0.0);
        assert_eq!(world.position(rock.handle), Some(Vec2::ZERO));
        assert_eq!(world.kinematic_writes, writes);
    }

    #[test]
    fn test_despawn_exactly_past_lower_bound() {
        let mut world = SandboxWorld::new();
        let mut rock = spawn(
            &mut world,
            MotionSpec::static_move(MoveType::StaticDown, 5.0),
            Vec2::ZERO,
        );

        loop {
            rock.fixed_tick(&mut world, false, FIXED_DT);
            let y = world.position(rock.handle).unwrap().y;
            if y < BELOW_BOUNDARY {
                assert!(rock.is_out_of_bounds(&world));
                break;
            }
            assert!(!rock.is_out_of_bounds(&world), "despawned early at y={y}");
        }
    }

    #[test]
    fn test_motion_spec_json_defaults() {
        let spec: MotionSpec =
            serde_json::from_str(r#"{"kind":"Move","move_type":"LaunchDownLeft"}"#).unwrap();
        assert_eq!(
            spec,
            MotionSpec::launch(MoveType::LaunchDownLeft, 5.0, 7.5, 3.5)
        );
    }
}
