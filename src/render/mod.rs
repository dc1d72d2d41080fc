//! Render hand-off seam.
//!
//! This crate produces plain CPU-side geometry; the embedding renderer owns
//! the graphics API. The streamer walks visible built chunks on the rendering
//! thread and forwards their draw data through a [`RenderSink`]. Only that
//! thread may construct GPU-resident buffers, so sink implementations can
//! upload directly.

use crate::chunk::features::FeatureInstance;
use crate::chunk::mesh::ChunkMesh;
use crate::chunk::ChunkKey;
use crate::generation::placement::Placement;

/// Receiver for one frame's draw submissions.
///
/// Methods are only invoked with non-empty data, once per visible chunk per
/// `render` call.
pub trait RenderSink {
    /// Terrain surface geometry for one chunk.
    fn draw_terrain(&mut self, key: ChunkKey, mesh: &ChunkMesh);

    /// Intrinsic terrain features (rocks, cacti, ...).
    fn draw_features(&mut self, key: ChunkKey, features: &[FeatureInstance]);

    /// Vegetation instances from the post-build placement pass.
    fn draw_vegetation(&mut self, key: ChunkKey, placements: &[Placement]);

    /// Structure instances from the post-build placement pass.
    fn draw_structures(&mut self, key: ChunkKey, placements: &[Placement]);
}

/// Sink that counts submissions; used by the soak binary and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawStats {
    pub chunks: usize,
    pub triangles: usize,
    pub features: usize,
    pub vegetation: usize,
    pub structures: usize,
}

impl DrawStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl RenderSink for DrawStats {
    fn draw_terrain(&mut self, _key: ChunkKey, mesh: &ChunkMesh) {
        self.chunks += 1;
        self.triangles += mesh.triangle_count();
    }

    fn draw_features(&mut self, _key: ChunkKey, features: &[FeatureInstance]) {
        self.features += features.len();
    }

    fn draw_vegetation(&mut self, _key: ChunkKey, placements: &[Placement]) {
        self.vegetation += placements.len();
    }

    fn draw_structures(&mut self, _key: ChunkKey, placements: &[Placement]) {
        self.structures += placements.len();
    }
}
