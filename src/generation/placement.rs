//! Placement interface for chunk-chained procedural passes.
//!
//! Vegetation and structure generators are pure functions of
//! (chunk, chunk size, archetype, height sampler). They run on the rendering
//! thread after a chunk's geometry is built and take no part in the
//! background concurrency model.

use glam::Vec3;

use crate::chunk::ChunkKey;
use crate::terrain::profile::Archetype;

/// Height-sampling callback: `(world_x, world_z) -> elevation`.
pub type HeightSampler<'a> = dyn Fn(f32, f32) -> f32 + 'a;

/// One placed prop (a plant, a ruin, ...). What the variant index means is up
/// to the consumer's mesh library.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// World-space position on the terrain surface.
    pub position: Vec3,
    /// Rotation around the up axis, radians.
    pub yaw: f32,
    pub scale: f32,
    pub variant: u32,
}

/// A deterministic placement pass invoked once per chunk after its geometry
/// is built.
pub trait PlacementGenerator {
    fn generate(
        &self,
        key: ChunkKey,
        chunk_world_size: f32,
        archetype: Archetype,
        height_at: &HeightSampler,
    ) -> Vec<Placement>;
}

/// Adapter running a plain function as a [`PlacementGenerator`], for callers
/// whose passes are free closures rather than types.
pub struct PlacementFn<F>(pub F);

impl<F> PlacementGenerator for PlacementFn<F>
where
    F: Fn(ChunkKey, f32, Archetype, &HeightSampler) -> Vec<Placement>,
{
    fn generate(
        &self,
        key: ChunkKey,
        chunk_world_size: f32,
        archetype: Archetype,
        height_at: &HeightSampler,
    ) -> Vec<Placement> {
        (self.0)(key, chunk_world_size, archetype, height_at)
    }
}

/// Integer hash producing a value in [0, 1), keyed by a world cell and seed.
pub(crate) fn hash_cell(ix: i32, iz: i32, seed: u32) -> f32 {
    let mut h = (ix as u32)
        .wrapping_mul(0x9E3779B1)
        .wrapping_add((iz as u32).wrapping_mul(0x85EBCA77))
        .wrapping_add(seed.wrapping_mul(0xC2B2AE3D));
    h = (h ^ (h >> 15)).wrapping_mul(0x2C1B3C6D);
    h ^= h >> 12;
    (h & 0x00FF_FFFF) as f32 / 0x0100_0000 as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_cell_range_and_determinism() {
        for i in -50..50 {
            let v = hash_cell(i, -i * 3, 42);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, hash_cell(i, -i * 3, 42));
        }
    }

    #[test]
    fn test_hash_cell_varies_with_inputs() {
        let base = hash_cell(10, 20, 42);
        assert_ne!(base, hash_cell(11, 20, 42));
        assert_ne!(base, hash_cell(10, 21, 42));
        assert_ne!(base, hash_cell(10, 20, 43));
    }

    #[test]
    fn test_placement_fn_adapts_closure() {
        let r#gen = PlacementFn(|key: ChunkKey, size: f32, _: Archetype, height_at: &HeightSampler| {
            let origin = key.world_origin();
            let x = origin.x + size * 0.5;
            let z = origin.z + size * 0.5;
            vec![Placement {
                position: Vec3::new(x, height_at(x, z), z),
                yaw: 0.0,
                scale: 1.0,
                variant: 0,
            }]
        });

        let sampler = |_: f32, _: f32| 9.0;
        let out = r#gen.generate(ChunkKey::new(0, 0), 64.0, Archetype::EarthLike, &sampler);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].position.y, 9.0);
    }
}
