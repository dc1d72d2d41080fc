//! Chunk geometry: heightfield grid to renderable vertex/index buffers.
//!
//! Output is plain CPU data in GPU-uploadable layout. Texture coordinates
//! tile across world space, and normals are estimated from axis-neighbor
//! elevation differences, so seams between adjacent chunks line up.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::{ChunkKey, CELL_SIZE};
use crate::terrain::heightfield::Heightfield;
use crate::terrain::profile::TerrainProfile;

/// World-space meters per texture repeat.
const UV_TILE: f32 = 16.0;

/// One terrain vertex, ready for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Coarse biome shading from normalized elevation; independent of any
    /// surface texture.
    pub tint: [f32; 3],
}

/// Geometry buffers for one chunk.
pub struct ChunkMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the render mesh for one chunk: a vertex per heightfield sample, the
/// regular grid triangulated as two triangles per cell with consistent
/// winding (counter-clockwise seen from above).
pub fn build_chunk_mesh(key: ChunkKey, heightfield: &Heightfield, profile: &TerrainProfile) -> ChunkMesh {
    let resolution = heightfield.resolution();
    let origin = key.world_origin();

    let mut vertices = Vec::with_capacity(resolution * resolution);
    for iz in 0..resolution {
        for ix in 0..resolution {
            let elevation = heightfield.get(ix, iz);
            let wx = origin.x + ix as f32 * CELL_SIZE;
            let wz = origin.z + iz as f32 * CELL_SIZE;

            vertices.push(TerrainVertex {
                position: [wx, elevation, wz],
                normal: vertex_normal(heightfield, ix, iz).to_array(),
                uv: [wx / UV_TILE, wz / UV_TILE],
                tint: elevation_tint(elevation, profile),
            });
        }
    }

    let cells = resolution - 1;
    let mut indices = Vec::with_capacity(cells * cells * 6);
    for iz in 0..cells {
        for ix in 0..cells {
            let v00 = (iz * resolution + ix) as u32;
            let v10 = v00 + 1;
            let v01 = v00 + resolution as u32;
            let v11 = v01 + 1;
            indices.extend_from_slice(&[v00, v01, v10, v10, v01, v11]);
        }
    }

    ChunkMesh { vertices, indices }
}

/// Normal from central differences of the four axis-neighboring samples,
/// falling back to one-sided differences at the grid border.
fn vertex_normal(heightfield: &Heightfield, ix: usize, iz: usize) -> Vec3 {
    let last = heightfield.resolution() - 1;
    let x0 = ix.saturating_sub(1);
    let x1 = (ix + 1).min(last);
    let z0 = iz.saturating_sub(1);
    let z1 = (iz + 1).min(last);

    let dh_dx = (heightfield.get(x1, iz) - heightfield.get(x0, iz)) / ((x1 - x0) as f32 * CELL_SIZE);
    let dh_dz = (heightfield.get(ix, z1) - heightfield.get(ix, z0)) / ((z1 - z0) as f32 * CELL_SIZE);

    Vec3::new(-dh_dx, 1.0, -dh_dz).normalize()
}

/// Tint from elevation normalized against the profile's height scale, so the
/// ramp is consistent across chunk boundaries.
fn elevation_tint(elevation: f32, profile: &TerrainProfile) -> [f32; 3] {
    let t = (elevation / profile.height_scale * 0.5 + 0.5).clamp(0.0, 1.0);
    let low = Vec3::from_array(profile.low_tint);
    let high = Vec3::from_array(profile.high_tint);
    low.lerp(high, t).to_array()
}
