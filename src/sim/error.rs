//! Error types for level data and spawning.

use thiserror::Error;

/// Errors raised while loading or validating a level catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed.
    #[error("Parse error in level catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A catalog needs at least one level.
    #[error("Level catalog is empty")]
    Empty,

    /// A wave asks for obstacles but names no descriptor.
    #[error("Level {level} wave {wave}: {count} obstacles requested but no descriptor given")]
    MissingObstacle { level: usize, wave: usize, count: u32 },

    /// The wave's obstacle descriptor cannot be spawned.
    #[error("Level {level} wave {wave}: {source}")]
    InvalidObstacle {
        level: usize,
        wave: usize,
        #[source]
        source: SpawnError,
    },
}

/// Errors raised when an obstacle descriptor is not fully authored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    /// Obstacles need a motion profile, even an inert one.
    #[error("Obstacle '{0}' has no motion profile")]
    MissingMotion(String),

    /// Orbiting obstacles need an anchor to circle around.
    #[error("Orbiting obstacle '{0}' has no anchor")]
    MissingAnchor(String),
}
