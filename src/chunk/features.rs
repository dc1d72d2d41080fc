//! Intrinsic terrain features — rocks, cacti, ice shards scattered directly
//! from a chunk's own heightfield during the geometry build.
//!
//! These are terrain dressing for archetypes where such props are part of the
//! surface itself, independent of the separately-streamed vegetation and
//! structure passes. Placement is a pure function of (chunk, seed).

use std::f32::consts::TAU;

use glam::Vec3;

use super::{ChunkKey, CELL_SIZE, CHUNK_RESOLUTION};
use crate::terrain::heightfield::Heightfield;
use crate::terrain::profile::{FeatureKind, TerrainProfile};

/// Grid cells between scatter candidates.
const CANDIDATE_STRIDE: usize = 4;

/// Slope (rise over run) above which features are skipped.
const MAX_SLOPE: f32 = 0.8;

/// One placed feature instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureInstance {
    pub kind: FeatureKind,
    /// World-space position on the terrain surface.
    pub position: Vec3,
    /// Rotation around the up axis, radians.
    pub yaw: f32,
    pub scale: f32,
}

/// Integer hash producing a value in [0, 1].
fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
    let mut h = (ix as u32)
        .wrapping_mul(374761393)
        .wrapping_add((iz as u32).wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1274126177));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h ^= h >> 16;
    (h & 0x7FFF_FFFF) as f32 / 0x7FFF_FFFF_u32 as f32
}

/// Scatter features over a chunk's heightfield.
///
/// Candidates sit on a sparse sub-grid; each rolls a hash keyed by its world
/// cell coordinates, so the result is deterministic and independent of the
/// order chunks are generated in. Steep cells are skipped.
pub fn scatter_features(
    key: ChunkKey,
    heightfield: &Heightfield,
    profile: &TerrainProfile,
    seed: u32,
) -> Vec<FeatureInstance> {
    if !profile.has_intrinsic_features() {
        return Vec::new();
    }

    let origin = key.world_origin();
    let cells = CHUNK_RESOLUTION - 1;
    let mut out = Vec::new();

    for iz in (0..cells).step_by(CANDIDATE_STRIDE) {
        for ix in (0..cells).step_by(CANDIDATE_STRIDE) {
            // World cell coordinates keep the hash chunk-independent
            let wx_cell = key.x() * cells as i32 + ix as i32;
            let wz_cell = key.z() * cells as i32 + iz as i32;

            let roll = hash_2d(wx_cell, wz_cell, seed);
            if roll >= profile.feature_density {
                continue;
            }

            if cell_slope(heightfield, ix, iz) > MAX_SLOPE {
                continue;
            }

            // Jitter within the candidate cell, elevation from the field
            let jx = hash_2d(wx_cell, wz_cell, seed.wrapping_add(1)) * CANDIDATE_STRIDE as f32;
            let jz = hash_2d(wx_cell, wz_cell, seed.wrapping_add(2)) * CANDIDATE_STRIDE as f32;
            let lx = (ix as f32 + jx).min(cells as f32);
            let lz = (iz as f32 + jz).min(cells as f32);
            let elevation = heightfield.sample_bilinear(lx, lz);

            let pick = hash_2d(wx_cell, wz_cell, seed.wrapping_add(3));
            let kind = profile.features[(pick * profile.features.len() as f32) as usize % profile.features.len()];

            out.push(FeatureInstance {
                kind,
                position: Vec3::new(
                    origin.x + lx * CELL_SIZE,
                    elevation,
                    origin.z + lz * CELL_SIZE,
                ),
                yaw: hash_2d(wx_cell, wz_cell, seed.wrapping_add(4)) * TAU,
                scale: 0.7 + hash_2d(wx_cell, wz_cell, seed.wrapping_add(5)) * 0.6,
            });
        }
    }

    out
}

/// Local slope magnitude from finite differences at a grid cell.
fn cell_slope(heightfield: &Heightfield, ix: usize, iz: usize) -> f32 {
    let dx = heightfield.get(ix + 1, iz) - heightfield.get(ix, iz);
    let dz = heightfield.get(ix, iz + 1) - heightfield.get(ix, iz);
    (dx * dx + dz * dz).sqrt() / CELL_SIZE
}
