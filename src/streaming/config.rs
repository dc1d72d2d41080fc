//! Streaming configuration (per-planet tunables).

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Tunables for the surface streamer.
///
/// Budgets are per `update` call and bound the rendering thread's worst-case
/// cost regardless of how much background work completed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// Load radius around the viewer, in chunk units (Euclidean).
    pub load_radius: i32,
    /// Max load requests handed to the background pool per update.
    pub max_dispatch_per_update: usize,
    /// Max geometry builds per update.
    pub max_builds_per_update: usize,
    /// Max vegetation (and, separately, structure) passes per update.
    pub max_placements_per_update: usize,
    /// Seconds a chunk may sit outside the desired set before disposal.
    pub eviction_grace: f32,
    /// Background worker count for heightfield generation.
    pub workers: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            load_radius: 4,
            max_dispatch_per_update: 2,
            max_builds_per_update: 2,
            max_placements_per_update: 1,
            eviction_grace: 3.0,
            workers: 2,
        }
    }
}

impl StreamerConfig {
    /// Reject configurations that would stall or livelock the streamer.
    pub fn validate(&self) -> Result<()> {
        if self.load_radius < 1 {
            return Err(Error::Config("load_radius must be at least 1".into()));
        }
        if self.max_dispatch_per_update == 0 || self.max_builds_per_update == 0 {
            return Err(Error::Config("per-update budgets must be nonzero".into()));
        }
        if self.workers == 0 {
            return Err(Error::Config("worker count must be nonzero".into()));
        }
        if !self.eviction_grace.is_finite() || self.eviction_grace < 0.0 {
            return Err(Error::Config("eviction_grace must be a non-negative number".into()));
        }
        Ok(())
    }
}
