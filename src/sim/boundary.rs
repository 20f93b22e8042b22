//! Out-of-bounds rules for obstacles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which despawn rectangle an obstacle uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCategory {
    /// Falls down (static down and every launch variant)
    DownFalling,
    /// Sweeps toward the left edge
    LeftSweeping,
    /// Sweeps toward the right edge
    RightSweeping,
    /// Rotating obstacles (orbit and self-rotate) only check the bottom
    Orbit,
}

impl BoundaryCategory {
    /// True once `pos` has left the playfield for this category
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        match self {
            BoundaryCategory::DownFalling => {
                pos.y < BELOW_BOUNDARY || pos.x < LEFT_BOUNDARY || pos.x > RIGHT_BOUNDARY
            }
            BoundaryCategory::LeftSweeping => {
                pos.y > ABOVE_BOUNDARY || pos.y < BELOW_BOUNDARY || pos.x < LEFT_BOUNDARY
            }
            BoundaryCategory::RightSweeping => {
                pos.y > ABOVE_BOUNDARY || pos.y < BELOW_BOUNDARY || pos.x > RIGHT_BOUNDARY
            }
            BoundaryCategory::Orbit => pos.y < ORBIT_BELOW_BOUNDARY,
        }
    }
}
