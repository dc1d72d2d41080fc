//! Noise-based heightfield generation.
//!
//! Elevation is a pure function of world coordinates, the world seed, and an
//! archetype profile: a normalized fBm base shape, plateau compression of
//! small deviations, ridged mountains gated by a coarse mask channel, and a
//! high-frequency detail term. Sampling always uses world-space coordinates,
//! which is what makes adjacent chunks tile seamlessly.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::heightfield::Heightfield;
use super::profile::TerrainProfile;
use crate::chunk::{ChunkKey, CELL_SIZE, CHUNK_RESOLUTION};

/// Octaves summed for the ridged mountain contribution.
const RIDGE_OCTAVES: u32 = 3;

/// Deterministic heightfield generator for one planet.
///
/// Holds no mutable state: the same instance may be shared across worker
/// threads, and concurrent generation is order-independent by construction.
pub struct HeightfieldGenerator {
    profile: TerrainProfile,
    seed: u32,
    base: Fbm<Perlin>,
    mountain_mask: Perlin,
    ridge: Perlin,
    detail: Perlin,
}

impl HeightfieldGenerator {
    /// Create a generator for the given world seed and archetype profile.
    pub fn new(seed: u32, profile: TerrainProfile) -> Self {
        let base = Fbm::<Perlin>::new(seed)
            .set_octaves(profile.octaves)
            .set_persistence(profile.persistence as f64)
            .set_lacunarity(profile.lacunarity as f64);

        Self {
            base,
            mountain_mask: Perlin::new(seed.wrapping_add(1013)),
            ridge: Perlin::new(seed.wrapping_add(2027)),
            detail: Perlin::new(seed.wrapping_add(3041)),
            profile,
            seed,
        }
    }

    /// The profile this generator was built with.
    pub fn profile(&self) -> &TerrainProfile {
        &self.profile
    }

    /// World seed this generator was built with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Elevation at a world position.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let p = &self.profile;

        let nx = (x / p.base_scale) as f64;
        let nz = (z / p.base_scale) as f64;
        let base = self.base.get([nx, nz]) as f32;
        let shaped = plateau_shape(base, p.plateau_threshold, p.plateau_exponent);

        let mx = (x / p.mountain_scale) as f64;
        let mz = (z / p.mountain_scale) as f64;
        let mask = self.mountain_mask.get([mx, mz]) as f32;
        let mountains = if mask > p.mountain_threshold {
            let blend = (mask - p.mountain_threshold) / (1.0 - p.mountain_threshold);
            self.ridged(x, z) * blend * p.mountain_strength
        } else {
            0.0
        };

        let dx = (x / p.detail_scale) as f64;
        let dz = (z / p.detail_scale) as f64;
        let detail = self.detail.get([dx, dz]) as f32 * p.detail_strength;

        (shaped + mountains + detail) * p.height_scale
    }

    /// Ridged multi-octave noise in [0, 1]: absolute-value-inverted, squared,
    /// amplitude-normalized.
    fn ridged(&self, x: f32, z: f32) -> f32 {
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut sum = 0.0f32;
        let mut total = 0.0f32;

        for _ in 0..RIDGE_OCTAVES {
            let nx = (x * frequency / self.profile.ridge_scale) as f64;
            let nz = (z * frequency / self.profile.ridge_scale) as f64;
            let n = self.ridge.get([nx, nz]) as f32;
            let r = 1.0 - n.abs();
            sum += r * r * amplitude;
            total += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        sum / total
    }

    /// Generate the heightfield for one chunk, sampling at world-space grid
    /// positions so shared edges of adjacent chunks evaluate identically.
    pub fn generate(&self, key: ChunkKey) -> Heightfield {
        let origin = key.world_origin();
        Heightfield::from_fn(CHUNK_RESOLUTION, |ix, iz| {
            let wx = origin.x + ix as f32 * CELL_SIZE;
            let wz = origin.z + iz as f32 * CELL_SIZE;
            self.height_at(wx, wz)
        })
    }
}

/// Compress deviations below `threshold` toward zero while leaving larger
/// ones untouched. Continuous at the threshold; preserves sign.
fn plateau_shape(n: f32, threshold: f32, exponent: f32) -> f32 {
    let a = n.abs();
    if threshold <= 0.0 || a >= threshold {
        return n;
    }
    (threshold * (a / threshold).powf(exponent)).copysign(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::profile::Archetype;

    fn generator(seed: u32) -> HeightfieldGenerator {
        HeightfieldGenerator::new(seed, Archetype::EarthLike.profile())
    }

    #[test]
    fn test_height_at_deterministic() {
        let g = generator(42);
        for (x, z) in [(0.0, 0.0), (123.5, -87.25), (-4000.0, 9000.0)] {
            assert_eq!(g.height_at(x, z), g.height_at(x, z));
        }
    }

    #[test]
    fn test_generate_byte_identical() {
        let g = generator(42);
        let key = ChunkKey::new(-3, 7);
        let a = g.generate(key);
        let b = g.generate(key);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_differ() {
        let a = generator(1).height_at(50.0, 50.0);
        let b = generator(2).height_at(50.0, 50.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_archetypes_differ() {
        let a = HeightfieldGenerator::new(7, Archetype::Desert.profile());
        let b = HeightfieldGenerator::new(7, Archetype::Volcanic.profile());
        assert_ne!(a.height_at(100.0, 100.0), b.height_at(100.0, 100.0));
    }

    #[test]
    fn test_adjacent_chunks_share_edge() {
        let g = generator(42);
        let left = g.generate(ChunkKey::new(0, 0));
        let right = g.generate(ChunkKey::new(1, 0));
        let last = CHUNK_RESOLUTION - 1;
        for iz in 0..CHUNK_RESOLUTION {
            assert_eq!(
                left.get(last, iz),
                right.get(0, iz),
                "seam mismatch at row {iz}"
            );
        }
    }

    #[test]
    fn test_adjacent_chunks_share_edge_north_south() {
        let g = HeightfieldGenerator::new(42, Archetype::Rocky.profile());
        let near = g.generate(ChunkKey::new(-2, -1));
        let far = g.generate(ChunkKey::new(-2, 0));
        let last = CHUNK_RESOLUTION - 1;
        for ix in 0..CHUNK_RESOLUTION {
            assert_eq!(near.get(ix, last), far.get(ix, 0));
        }
    }

    #[test]
    fn test_height_bounded_by_scale() {
        let g = generator(42);
        let p = g.profile().clone();
        // shaped + mountains + detail is bounded; generous envelope (fBm can
        // overshoot [-1, 1] slightly)
        let bound = (1.5 + p.mountain_strength + p.detail_strength) * p.height_scale;
        for i in 0..200 {
            let x = i as f32 * 37.7 - 3000.0;
            let z = i as f32 * -91.3 + 1500.0;
            assert!(g.height_at(x, z).abs() <= bound);
        }
    }

    #[test]
    fn test_plateau_shape_compresses_small() {
        // Below threshold: magnitude shrinks; above: untouched
        assert!(plateau_shape(0.1, 0.4, 2.0).abs() < 0.1);
        assert_eq!(plateau_shape(0.6, 0.4, 2.0), 0.6);
        assert_eq!(plateau_shape(-0.6, 0.4, 2.0), -0.6);
        // Sign preserved
        assert!(plateau_shape(-0.1, 0.4, 2.0) < 0.0);
        // Continuous at the threshold
        let at = plateau_shape(0.4, 0.4, 2.0);
        assert!((at - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_ridged_in_unit_range() {
        let g = generator(42);
        for i in 0..100 {
            let r = g.ridged(i as f32 * 13.3, i as f32 * -7.1);
            assert!((0.0..=1.0).contains(&r), "ridged out of range: {r}");
        }
    }

    #[test]
    fn test_mountains_are_sparse() {
        // Most of the surface should see no ridged contribution at all
        let g = generator(42);
        let p = g.profile();
        let mut gated = 0;
        let total = 400;
        for i in 0..total {
            let x = (i % 20) as f32 * 512.0;
            let z = (i / 20) as f32 * 512.0;
            let mask = g.mountain_mask.get([(x / p.mountain_scale) as f64, (z / p.mountain_scale) as f64]) as f32;
            if mask > p.mountain_threshold {
                gated += 1;
            }
        }
        assert!(gated < total / 3, "mountain mask gates too often: {gated}/{total}");
    }
}
