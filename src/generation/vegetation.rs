//! Default vegetation pass: hash-scattered plants with per-archetype density.

use std::f32::consts::TAU;

use glam::Vec3;

use super::placement::{hash_cell, HeightSampler, Placement, PlacementGenerator};
use crate::chunk::ChunkKey;
use crate::terrain::profile::Archetype;

/// Slope (rise over run) above which nothing grows.
const MAX_SLOPE: f32 = 0.7;

/// Deterministic vegetation scatter.
///
/// Candidates lie on a world-aligned grid so density is uniform regardless of
/// chunk boundaries; each candidate rolls a hash keyed by its world cell.
pub struct VegetationScatter {
    seed: u32,
    /// Meters between candidate points.
    stride: f32,
}

impl VegetationScatter {
    pub fn new(seed: u32) -> Self {
        Self { seed, stride: 4.0 }
    }

    /// Fraction of candidate cells that sprout, per archetype.
    fn density(archetype: Archetype) -> f32 {
        match archetype {
            Archetype::EarthLike => 0.35,
            Archetype::Desert => 0.04,
            Archetype::Rocky => 0.08,
            Archetype::Ice => 0.0,
            Archetype::Volcanic => 0.02,
        }
    }
}

impl PlacementGenerator for VegetationScatter {
    fn generate(
        &self,
        key: ChunkKey,
        chunk_world_size: f32,
        archetype: Archetype,
        height_at: &HeightSampler,
    ) -> Vec<Placement> {
        let density = Self::density(archetype);
        if density <= 0.0 {
            return Vec::new();
        }

        let origin = key.world_origin();
        let steps = (chunk_world_size / self.stride) as i32;
        let mut out = Vec::new();

        for gz in 0..steps {
            for gx in 0..steps {
                let x = origin.x + (gx as f32 + 0.5) * self.stride;
                let z = origin.z + (gz as f32 + 0.5) * self.stride;
                let cx = (x / self.stride).floor() as i32;
                let cz = (z / self.stride).floor() as i32;

                if hash_cell(cx, cz, self.seed) >= density {
                    continue;
                }

                // Reject steep ground
                let eps = 0.5;
                let dh_dx = (height_at(x + eps, z) - height_at(x - eps, z)) / (2.0 * eps);
                let dh_dz = (height_at(x, z + eps) - height_at(x, z - eps)) / (2.0 * eps);
                if (dh_dx * dh_dx + dh_dz * dh_dz).sqrt() > MAX_SLOPE {
                    continue;
                }

                out.push(Placement {
                    position: Vec3::new(x, height_at(x, z), z),
                    yaw: hash_cell(cx, cz, self.seed.wrapping_add(1)) * TAU,
                    scale: 0.6 + hash_cell(cx, cz, self.seed.wrapping_add(2)) * 0.8,
                    variant: (hash_cell(cx, cz, self.seed.wrapping_add(3)) * 4.0) as u32,
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::CHUNK_WORLD_SIZE;

    fn flat_sampler(height: f32) -> impl Fn(f32, f32) -> f32 {
        move |_, _| height
    }

    #[test]
    fn test_deterministic() {
        let r#gen = VegetationScatter::new(42);
        let sampler = flat_sampler(2.0);
        let a = r#gen.generate(ChunkKey::new(1, 1), CHUNK_WORLD_SIZE, Archetype::EarthLike, &sampler);
        let b = r#gen.generate(ChunkKey::new(1, 1), CHUNK_WORLD_SIZE, Archetype::EarthLike, &sampler);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_ice_is_barren() {
        let r#gen = VegetationScatter::new(42);
        let sampler = flat_sampler(0.0);
        let out = r#gen.generate(ChunkKey::new(0, 0), CHUNK_WORLD_SIZE, Archetype::Ice, &sampler);
        assert!(out.is_empty());
    }

    #[test]
    fn test_placements_on_surface() {
        let r#gen = VegetationScatter::new(42);
        let sampler = flat_sampler(12.5);
        let key = ChunkKey::new(-2, 4);
        let origin = key.world_origin();
        for p in r#gen.generate(key, CHUNK_WORLD_SIZE, Archetype::EarthLike, &sampler) {
            assert_eq!(p.position.y, 12.5);
            assert!(p.position.x >= origin.x && p.position.x <= origin.x + CHUNK_WORLD_SIZE);
            assert!(p.position.z >= origin.z && p.position.z <= origin.z + CHUNK_WORLD_SIZE);
            assert!(p.variant < 4);
        }
    }

    #[test]
    fn test_steep_slopes_rejected() {
        let r#gen = VegetationScatter::new(42);
        // 45-degree-plus wall everywhere
        let sampler = |x: f32, _: f32| x * 5.0;
        let out = r#gen.generate(ChunkKey::new(0, 0), CHUNK_WORLD_SIZE, Archetype::EarthLike, &sampler);
        assert!(out.is_empty());
    }

    #[test]
    fn test_desert_sparser_than_earthlike() {
        let r#gen = VegetationScatter::new(42);
        let sampler = flat_sampler(0.0);
        let lush = r#gen.generate(ChunkKey::new(0, 0), CHUNK_WORLD_SIZE, Archetype::EarthLike, &sampler);
        let sparse = r#gen.generate(ChunkKey::new(0, 0), CHUNK_WORLD_SIZE, Archetype::Desert, &sampler);
        assert!(sparse.len() < lush.len());
    }
}
