//! Level configuration data
//!
//! A catalog is authored as JSON: scenery descriptors shared by every level
//! plus an ordered list of levels, each made of obstacle waves.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::motion::{MotionSpec, MoveType};
use super::world::BodyType;

fn default_radius() -> f32 {
    0.5
}

/// Prefab-like description of something the world can spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    /// Contact radius (0 = never collides)
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub body: BodyType,
    /// Required for obstacles
    #[serde(default)]
    pub motion: Option<MotionSpec>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            radius: default_radius(),
            body: BodyType::Dynamic,
            motion: None,
        }
    }

    /// Non-colliding kinematic backdrop or label
    pub fn scenery(name: impl Into<String>) -> Self {
        Self {
            radius: 0.0,
            body: BodyType::Kinematic,
            ..Self::new(name)
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_body(mut self, body: BodyType) -> Self {
        self.body = body;
        self
    }

    pub fn with_motion(mut self, motion: MotionSpec) -> Self {
        self.motion = Some(motion);
        self
    }
}

/// A line of identical obstacles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Only the first entry is ever spawned
    pub obstacles: Vec<Descriptor>,
    pub count: u32,
    pub position: Vec2,
    /// Rotation in radians
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub horizontal_spacing: f32,
    #[serde(default)]
    pub vertical_spacing: f32,
}

impl WaveConfig {
    /// The descriptor every obstacle of the wave is spawned from
    pub fn obstacle(&self) -> Option<&Descriptor> {
        self.obstacles.first()
    }

    /// Spawn position of the `i`-th obstacle
    pub fn spawn_position(&self, i: u32) -> Vec2 {
        let i = i as f32;
        self.position + Vec2::new(i * self.horizontal_spacing, i * self.vertical_spacing)
    }

    pub fn spawn_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.count).map(|i| self.spawn_position(i))
    }
}

/// One authored level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub background: Descriptor,
    pub background_position: Vec2,
    pub label: Descriptor,
    pub display_text: String,
    #[serde(default)]
    pub waves: Vec<WaveConfig>,
}

impl LevelConfig {
    pub fn obstacle_count(&self) -> u32 {
        self.waves.iter().map(|w| w.count).sum()
    }
}

/// Descriptors shared across levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenery {
    /// Optional decor spawned with each level
    #[serde(default)]
    pub cloud: Option<Descriptor>,
    pub intro: Descriptor,
    pub finish_backdrop: Descriptor,
    pub player: Descriptor,
    pub lantern: Descriptor,
}

impl Default for Scenery {
    fn default() -> Self {
        Self {
            cloud: Some(Descriptor::scenery("cloud")),
            intro: Descriptor::scenery("intro"),
            finish_backdrop: Descriptor::scenery("space"),
            player: Descriptor::new("player")
                .with_radius(0.6)
                .with_body(BodyType::Kinematic),
            lantern: Descriptor::new("lantern")
                .with_radius(0.4)
                .with_body(BodyType::Static),
        }
    }
}

/// Every level of a session, in Climb order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub scenery: Scenery,
    pub levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self {
            scenery: Scenery::default(),
            levels,
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&LevelConfig> {
        self.levels.get(index)
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        log::info!("Loaded {} levels from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Reject catalogs that would fail at spawn time
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (level, config) in self.levels.iter().enumerate() {
            for (wave, wave_config) in config.waves.iter().enumerate() {
                if wave_config.count == 0 {
                    continue;
                }
                let Some(obstacle) = wave_config.obstacle() else {
                    return Err(CatalogError::MissingObstacle {
                        level,
                        wave,
                        count: wave_config.count,
                    });
                };
                let checked = match &obstacle.motion {
                    Some(motion) => motion.validate(&obstacle.name),
                    None => Err(super::error::SpawnError::MissingMotion(
                        obstacle.name.clone(),
                    )),
                };
                checked.map_err(|source| CatalogError::InvalidObstacle {
                    level,
                    wave,
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Small built-in catalog used by the demo binary
    pub fn demo() -> Self {
        let rock = Descriptor::new("rock")
            .with_radius(0.5)
            .with_motion(MotionSpec::static_move(MoveType::StaticDown, 5.0));
        let sweeper = Descriptor::new("sweeper")
            .with_radius(0.4)
            .with_motion(MotionSpec::static_move(MoveType::StaticLeft, 4.0));
        let comet = Descriptor::new("comet")
            .with_radius(0.5)
            .with_motion(MotionSpec::launch(MoveType::LaunchDownRight, 5.0, 7.5, 3.5));
        let wheel = Descriptor::new("wheel")
            .with_radius(0.8)
            .with_motion(MotionSpec::self_rotate(750f32.to_radians()));
        let moon = Descriptor::new("moon")
            .with_radius(0.4)
            .with_motion(MotionSpec::orbit(2.0, Vec2::new(-2.0, 0.0)));

        let wave = |descriptor: &Descriptor, count, position, spacing: Vec2| WaveConfig {
            obstacles: vec![descriptor.clone()],
            count,
            position,
            rotation: 0.0,
            horizontal_spacing: spacing.x,
            vertical_spacing: spacing.y,
        };

        let level = |n: usize, waves: Vec<WaveConfig>| LevelConfig {
            background: Descriptor::scenery(format!("background_{n}")),
            background_position: Vec2::new(0.0, 20.0),
            label: Descriptor::scenery("level_label"),
            display_text: format!("Level {n}"),
            waves,
        };

        Self::new(vec![
            level(
                1,
                vec![wave(&rock, 3, Vec2::new(-4.0, 10.0), Vec2::new(4.0, 3.0))],
            ),
            level(
                2,
                vec![
                    wave(&sweeper, 4, Vec2::new(12.0, 4.0), Vec2::new(2.5, 0.0)),
                    wave(&comet, 2, Vec2::new(-3.0, 12.0), Vec2::new(0.0, 6.0)),
                ],
            ),
            level(
                3,
                vec![
                    wave(&wheel, 2, Vec2::new(-5.0, 6.0), Vec2::new(10.0, 0.0)),
                    wave(&moon, 1, Vec2::new(2.0, 4.0), Vec2::ZERO),
                ],
            ),
        ])
    }
}
