//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by handle)
//! - Bodies are only touched through the [`World`] trait

pub mod avatar;
pub mod boundary;
pub mod catalog;
pub mod director;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod motion;
pub mod state;
pub mod tick;
pub mod world;

pub use avatar::{Lantern, PlayerAvatar};
pub use boundary::BoundaryCategory;
pub use catalog::{Descriptor, LevelCatalog, LevelConfig, Scenery, WaveConfig};
pub use director::{BackdropKind, LevelDirector};
pub use error::{CatalogError, SpawnError};
pub use events::{EventBus, GameSignal, SubscriptionId};
pub use lifecycle::{GameLifecycle, GameMode, GamePhase};
pub use motion::{MotionProfile, MotionSpec, MoveType, Obstacle, Orbit, RotateType};
pub use state::GameState;
pub use tick::{FixedStepper, TickInput, fixed_tick, frame_tick, tick};
pub use world::{BodyType, Contact, Handle, SandboxWorld, World};
