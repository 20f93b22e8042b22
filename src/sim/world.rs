//! Host engine primitives
//!
//! The simulation never owns bodies directly. It asks a [`World`] to spawn,
//! move and destroy them, the way scripts talk to an engine's scene graph and
//! physics. [`SandboxWorld`] is a small in-memory implementation used by the
//! headless binary and the tests.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::Descriptor;
use crate::consts::GRAVITY;

/// Opaque handle to a spawned body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub u32);

/// How the physics step treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Integrated by physics (velocity, gravity, impulses)
    #[default]
    Dynamic,
    /// Only moved by explicit position writes
    Kinematic,
    /// Never moves
    Static,
}

/// A new contact between two bodies, reported once when they start touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: Handle,
    pub b: Handle,
}

impl Contact {
    /// The body on the other side of the contact from `handle`
    pub fn other(&self, handle: Handle) -> Option<Handle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Spawn, destroy and rigid-body primitives supplied by the host
pub trait World {
    /// Instantiate a body from a descriptor
    fn spawn(&mut self, descriptor: &Descriptor, position: Vec2, rotation: f32) -> Handle;

    /// Instantiate a UI text element (level label)
    fn spawn_text(&mut self, descriptor: &Descriptor, text: &str) -> Handle;

    /// Remove a body. Destroying a dead handle is a no-op.
    fn destroy(&mut self, handle: Handle);

    fn is_alive(&self, handle: Handle) -> bool;

    /// Current world position, `None` once destroyed
    fn position(&self, handle: Handle) -> Option<Vec2>;

    /// Move a body to an absolute position during the next physics step
    fn set_kinematic_position(&mut self, handle: Handle, position: Vec2);

    /// Shift a body by `delta` (transform translation, no physics)
    fn translate(&mut self, handle: Handle, delta: Vec2);

    fn set_velocity(&mut self, handle: Handle, velocity: Vec2);

    fn set_angular_velocity(&mut self, handle: Handle, angular_velocity: f32);

    fn apply_impulse(&mut self, handle: Handle, direction: Vec2, magnitude: f32);

    fn set_gravity_scale(&mut self, handle: Handle, scale: f32);

    /// Hide a body. Disabled bodies keep their state but neither move nor touch.
    fn set_enabled(&mut self, handle: Handle, enabled: bool);

    /// Advance physics by one fixed step and return contacts that began during it
    fn step(&mut self, dt: f32) -> Vec<Contact>;
}

/// A body in the sandbox
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub body_type: BodyType,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub angular_vel: f32,
    pub gravity_scale: f32,
    /// Contact radius (0 = no contacts)
    pub radius: f32,
    /// Label text for UI elements
    pub text: Option<String>,
    pub enabled: bool,
}

/// Minimal deterministic world: Euler integration and circle contacts
#[derive(Debug, Default)]
pub struct SandboxWorld {
    bodies: BTreeMap<Handle, Body>,
    touching: BTreeSet<(Handle, Handle)>,
    next_id: u32,
    /// Number of `set_kinematic_position` calls on live bodies
    pub kinematic_writes: u64,
    /// Every impulse applied, in order
    pub impulses: Vec<(Handle, Vec2)>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, handle: Handle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_mut(&mut self, handle: Handle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    /// Live bodies spawned from a descriptor with this name
    pub fn count_named(&self, name: &str) -> usize {
        self.bodies.values().filter(|b| b.name == name).count()
    }

    pub fn live_count(&self) -> usize {
        self.bodies.len()
    }

    fn insert(&mut self, body: Body) -> Handle {
        self.next_id += 1;
        let handle = Handle(self.next_id);
        self.bodies.insert(handle, body);
        handle
    }
}

impl World for SandboxWorld {
    fn spawn(&mut self, descriptor: &Descriptor, position: Vec2, rotation: f32) -> Handle {
        self.insert(Body {
            name: descriptor.name.clone(),
            body_type: descriptor.body,
            pos: position,
            vel: Vec2::ZERO,
            rotation,
            angular_vel: 0.0,
            gravity_scale: 1.0,
            radius: descriptor.radius,
            text: None,
            enabled: true,
        })
    }

    fn spawn_text(&mut self, descriptor: &Descriptor, text: &str) -> Handle {
        self.insert(Body {
            name: descriptor.name.clone(),
            body_type: BodyType::Static,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            gravity_scale: 0.0,
            radius: 0.0,
            text: Some(text.to_owned()),
            enabled: true,
        })
    }

    fn destroy(&mut self, handle: Handle) {
        if self.bodies.remove(&handle).is_some() {
            self.touching.retain(|&(a, b)| a != handle && b != handle);
        }
    }

    fn is_alive(&self, handle: Handle) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn position(&self, handle: Handle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn set_kinematic_position(&mut self, handle: Handle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos = position;
            self.kinematic_writes += 1;
        }
    }

    fn translate(&mut self, handle: Handle, delta: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.pos += delta;
        }
    }

    fn set_velocity(&mut self, handle: Handle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.vel = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: Handle, angular_velocity: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.angular_vel = angular_velocity;
        }
    }

    fn apply_impulse(&mut self, handle: Handle, direction: Vec2, magnitude: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            // Unit mass
            let impulse = direction * magnitude;
            body.vel += impulse;
            self.impulses.push((handle, impulse));
        }
    }

    fn set_gravity_scale(&mut self, handle: Handle, scale: f32) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.gravity_scale = scale;
        }
    }

    fn set_enabled(&mut self, handle: Handle, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.enabled = enabled;
        }
    }

    fn step(&mut self, dt: f32) -> Vec<Contact> {
        for body in self.bodies.values_mut() {
            if body.body_type != BodyType::Dynamic || !body.enabled {
                continue;
            }
            body.vel.y += GRAVITY * body.gravity_scale * dt;
            body.pos += body.vel * dt;
            body.rotation += body.angular_vel * dt;
        }

        // Broad phase is a plain pair scan; scenes hold a few dozen bodies
        let colliders: Vec<(Handle, Vec2, f32, BodyType)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.radius > 0.0 && b.enabled)
            .map(|(h, b)| (*h, b.pos, b.radius, b.body_type))
            .collect();

        let mut now_touching = BTreeSet::new();
        let mut began = Vec::new();
        for (i, &(ha, pa, ra, ta)) in colliders.iter().enumerate() {
            for &(hb, pb, rb, tb) in &colliders[i + 1..] {
                if ta == BodyType::Static && tb == BodyType::Static {
                    continue;
                }
                if pa.distance(pb) < ra + rb {
                    now_touching.insert((ha, hb));
                    if !self.touching.contains(&(ha, hb)) {
                        began.push(Contact { a: ha, b: hb });
                    }
                }
            }
        }
        self.touching = now_touching;
        began
    }
}
