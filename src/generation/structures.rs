//! Default structure pass: rare, flat-ground building sites.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::placement::{hash_cell, HeightSampler, Placement, PlacementGenerator};
use crate::chunk::ChunkKey;
use crate::terrain::profile::Archetype;

/// Half-extent of a structure footprint, meters.
const FOOTPRINT: f32 = 4.0;

/// Maximum elevation spread across the footprint for a viable site.
const MAX_UNEVENNESS: f32 = 2.0;

/// Deterministic structure placement: at most one candidate per chunk,
/// gated by a per-archetype probability and a flat-ground check over the
/// footprint corners.
pub struct StructureScatter {
    seed: u32,
}

impl StructureScatter {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn chance(archetype: Archetype) -> f32 {
        match archetype {
            Archetype::EarthLike => 0.15,
            Archetype::Desert => 0.10,
            Archetype::Rocky => 0.12,
            Archetype::Ice => 0.05,
            Archetype::Volcanic => 0.08,
        }
    }
}

impl PlacementGenerator for StructureScatter {
    fn generate(
        &self,
        key: ChunkKey,
        chunk_world_size: f32,
        archetype: Archetype,
        height_at: &HeightSampler,
    ) -> Vec<Placement> {
        if hash_cell(key.x(), key.z(), self.seed) >= Self::chance(archetype) {
            return Vec::new();
        }

        // Candidate site somewhere in the chunk interior
        let origin = key.world_origin();
        let margin = FOOTPRINT;
        let span = chunk_world_size - 2.0 * margin;
        let x = origin.x + margin + hash_cell(key.x(), key.z(), self.seed.wrapping_add(1)) * span;
        let z = origin.z + margin + hash_cell(key.x(), key.z(), self.seed.wrapping_add(2)) * span;

        // The footprint must be close to level
        let center = height_at(x, z);
        let corners = [
            height_at(x - FOOTPRINT, z - FOOTPRINT),
            height_at(x + FOOTPRINT, z - FOOTPRINT),
            height_at(x - FOOTPRINT, z + FOOTPRINT),
            height_at(x + FOOTPRINT, z + FOOTPRINT),
        ];
        let min = corners.iter().copied().fold(center, f32::min);
        let max = corners.iter().copied().fold(center, f32::max);
        if max - min > MAX_UNEVENNESS {
            return Vec::new();
        }

        let quarter_turns = (hash_cell(key.x(), key.z(), self.seed.wrapping_add(3)) * 4.0) as u32;
        vec![Placement {
            position: Vec3::new(x, center, z),
            yaw: quarter_turns as f32 * FRAC_PI_2,
            scale: 1.0,
            variant: (hash_cell(key.x(), key.z(), self.seed.wrapping_add(4)) * 8.0) as u32,
        }]
    }
}
