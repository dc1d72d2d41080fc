//! Chunks: square terrain tiles identified by grid coordinates.
//!
//! A chunk owns one heightfield and, once built, its renderable geometry.
//! Heightfields arrive from background workers; geometry is derived on the
//! rendering thread only (see `streaming::manager`).

pub mod features;
pub mod mesh;

use glam::Vec3;

use crate::generation::placement::Placement;
use crate::math::Aabb;
use crate::terrain::heightfield::Heightfield;
use crate::terrain::profile::TerrainProfile;
use features::FeatureInstance;
use mesh::ChunkMesh;

/// Samples per chunk side.
pub const CHUNK_RESOLUTION: usize = 65;

/// World-space spacing between adjacent samples (meters).
pub const CELL_SIZE: f32 = 1.0;

/// World-space side length of a chunk. One cell fewer than the sample count:
/// the last sample row/column of a chunk coincides with the first of its
/// neighbor, so chunks tile without gaps.
pub const CHUNK_WORLD_SIZE: f32 = (CHUNK_RESOLUTION as f32 - 1.0) * CELL_SIZE;

/// Chunk-grid coordinate packed into a single 64-bit identifier
/// (x in the high 32 bits, z in the low 32). The packed value is stable for
/// the chunk's lifetime and is the sole map key used throughout the streamer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(u64);

impl ChunkKey {
    /// Pack signed grid coordinates into a key.
    pub fn new(x: i32, z: i32) -> Self {
        Self(((x as u32 as u64) << 32) | (z as u32 as u64))
    }

    /// Grid x coordinate.
    pub fn x(self) -> i32 {
        (self.0 >> 32) as u32 as i32
    }

    /// Grid z coordinate.
    pub fn z(self) -> i32 {
        self.0 as u32 as i32
    }

    /// The raw packed identifier.
    pub fn packed(self) -> u64 {
        self.0
    }

    /// Chunk containing a world position.
    pub fn from_world_pos(pos: Vec3) -> Self {
        Self::new(
            (pos.x / CHUNK_WORLD_SIZE).floor() as i32,
            (pos.z / CHUNK_WORLD_SIZE).floor() as i32,
        )
    }

    /// World-space origin (minimum corner) of this chunk.
    pub fn world_origin(self) -> Vec3 {
        Vec3::new(
            self.x() as f32 * CHUNK_WORLD_SIZE,
            0.0,
            self.z() as f32 * CHUNK_WORLD_SIZE,
        )
    }

    /// Euclidean distance to another key, in chunk units.
    pub fn distance_to(self, other: ChunkKey) -> f32 {
        let dx = (self.x() - other.x()) as f32;
        let dz = (self.z() - other.z()) as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

impl std::fmt::Debug for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChunkKey({}, {})", self.x(), self.z())
    }
}

/// One resident terrain tile: a heightfield plus geometry derived from it.
pub struct Chunk {
    key: ChunkKey,
    heightfield: Heightfield,
    mesh: Option<ChunkMesh>,
    features: Vec<FeatureInstance>,
    vegetation: Vec<Placement>,
    structures: Vec<Placement>,
}

impl Chunk {
    /// Take ownership of a freshly generated heightfield.
    pub fn new(key: ChunkKey, heightfield: Heightfield) -> Self {
        Self {
            key,
            heightfield,
            mesh: None,
            features: Vec::new(),
            vegetation: Vec::new(),
            structures: Vec::new(),
        }
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    pub fn heightfield(&self) -> &Heightfield {
        &self.heightfield
    }

    /// Whether geometry has been built.
    pub fn is_built(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    pub fn features(&self) -> &[FeatureInstance] {
        &self.features
    }

    pub fn vegetation(&self) -> &[Placement] {
        &self.vegetation
    }

    pub fn structures(&self) -> &[Placement] {
        &self.structures
    }

    pub fn set_vegetation(&mut self, placements: Vec<Placement>) {
        self.vegetation = placements;
    }

    pub fn set_structures(&mut self, placements: Vec<Placement>) {
        self.structures = placements;
    }

    /// Build renderable geometry from the heightfield, plus intrinsic
    /// features for archetypes that carry them.
    ///
    /// Must only be called from the rendering thread (the streamer enforces
    /// this by being `!Send`). Idempotent: a second call is a no-op.
    pub fn build_geometry(&mut self, profile: &TerrainProfile, seed: u32) {
        if self.mesh.is_some() {
            return;
        }
        self.mesh = Some(mesh::build_chunk_mesh(self.key, &self.heightfield, profile));
        if profile.has_intrinsic_features() {
            self.features = features::scatter_features(self.key, &self.heightfield, profile, seed);
        }
    }

    /// Bilinearly interpolated elevation at a world position. Positions
    /// outside this chunk's footprint clamp to its border.
    pub fn height_at_world(&self, world_x: f32, world_z: f32) -> f32 {
        let origin = self.key.world_origin();
        self.heightfield.sample_bilinear(
            (world_x - origin.x) / CELL_SIZE,
            (world_z - origin.z) / CELL_SIZE,
        )
    }

    /// World-space bounds: the chunk footprint spanning its elevation range.
    pub fn bounds(&self) -> Aabb {
        let origin = self.key.world_origin();
        let (min_y, max_y) = self.heightfield.min_max();
        Aabb::terrain_column(origin.x, origin.z, CHUNK_WORLD_SIZE, min_y, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::profile::Archetype;

    #[test]
    fn test_key_pack_roundtrip() {
        for (x, z) in [(0, 0), (1, -1), (-1000, 1000), (i32::MIN, i32::MAX)] {
            let key = ChunkKey::new(x, z);
            assert_eq!(key.x(), x);
            assert_eq!(key.z(), z);
        }
    }

    #[test]
    fn test_keys_unique() {
        // Sign handling: (-1, 0) and (0, -1) must not collide
        assert_ne!(ChunkKey::new(-1, 0), ChunkKey::new(0, -1));
        assert_ne!(ChunkKey::new(-1, 0).packed(), ChunkKey::new(0, -1).packed());
    }

    #[test]
    fn test_from_world_pos() {
        let s = CHUNK_WORLD_SIZE;
        assert_eq!(ChunkKey::from_world_pos(Vec3::new(s * 0.5, 0.0, s * 0.5)), ChunkKey::new(0, 0));
        assert_eq!(ChunkKey::from_world_pos(Vec3::new(s, 0.0, 0.0)), ChunkKey::new(1, 0));
        assert_eq!(ChunkKey::from_world_pos(Vec3::new(-0.1, 0.0, -0.1)), ChunkKey::new(-1, -1));
    }

    #[test]
    fn test_world_origin() {
        let key = ChunkKey::new(2, -3);
        let origin = key.world_origin();
        assert_eq!(origin.x, 2.0 * CHUNK_WORLD_SIZE);
        assert_eq!(origin.z, -3.0 * CHUNK_WORLD_SIZE);
        assert_eq!(ChunkKey::from_world_pos(origin), key);
    }

    #[test]
    fn test_distance_to() {
        let a = ChunkKey::new(0, 0);
        assert_eq!(a.distance_to(ChunkKey::new(3, 4)), 5.0);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_build_geometry_idempotent() {
        let profile = Archetype::Desert.profile();
        let hf = Heightfield::flat(CHUNK_RESOLUTION, 5.0);
        let mut chunk = Chunk::new(ChunkKey::new(0, 0), hf);

        assert!(!chunk.is_built());
        chunk.build_geometry(&profile, 42);
        assert!(chunk.is_built());

        let vertices_before = chunk.mesh().unwrap().vertices.len();
        let features_before = chunk.features().len();
        chunk.build_geometry(&profile, 42);
        assert_eq!(chunk.mesh().unwrap().vertices.len(), vertices_before);
        assert_eq!(chunk.features().len(), features_before);
    }

    #[test]
    fn test_height_at_world() {
        let hf = Heightfield::from_fn(CHUNK_RESOLUTION, |ix, _| ix as f32);
        let key = ChunkKey::new(1, 0);
        let chunk = Chunk::new(key, hf);

        let origin = key.world_origin();
        assert_eq!(chunk.height_at_world(origin.x, origin.z), 0.0);
        assert_eq!(chunk.height_at_world(origin.x + 10.0, origin.z), 10.0);
        assert!((chunk.height_at_world(origin.x + 10.5, origin.z) - 10.5).abs() < 1e-4);
    }

    #[test]
    fn test_bounds_span_elevation_range() {
        let hf = Heightfield::from_fn(CHUNK_RESOLUTION, |ix, _| ix as f32 - 30.0);
        let chunk = Chunk::new(ChunkKey::new(0, 0), hf);
        let bounds = chunk.bounds();
        assert_eq!(bounds.min.y, -30.0);
        assert_eq!(bounds.max.y, (CHUNK_RESOLUTION - 1) as f32 - 30.0);
        assert_eq!(bounds.size().x, CHUNK_WORLD_SIZE);
    }
}
