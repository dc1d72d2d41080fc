//! View frustum for chunk culling

use crate::core::types::{Mat4, Vec3, Vec4};
use super::aabb::Aabb;

/// View frustum as six clip planes in `ax + by + cz + d = 0` form, each
/// stored as a normalized `Vec4` (xyz = plane normal, w = distance).
///
/// Plane order: near, far, left, right, top, bottom.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    /// (Gribb-Hartmann row combinations).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let planes = [
            Self::normalize(r3 + r2), // near
            Self::normalize(r3 - r2), // far
            Self::normalize(r3 + r0), // left
            Self::normalize(r3 - r0), // right
            Self::normalize(r3 - r1), // top
            Self::normalize(r3 + r1), // bottom
        ];

        Self { planes }
    }

    fn normalize(plane: Vec4) -> Vec4 {
        plane / plane.truncate().length()
    }

    fn signed_distance(plane: Vec4, point: Vec3) -> f32 {
        plane.truncate().dot(point) + plane.w
    }

    /// Check if point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|&p| Self::signed_distance(p, point) >= 0.0)
    }

    /// Conservative AABB-vs-frustum test. For each plane, tests the box
    /// corner furthest along the plane normal; a box is rejected only when
    /// that corner is behind some plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for &plane in &self.planes {
            let n = plane.truncate();
            let p = Vec3::select(n.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if Self::signed_distance(plane, p) < 0.0 {
                return false;
            }
        }
        true
    }
}
