//! Math utilities: bounding volumes and culling

pub mod aabb;
pub mod frustum;

pub use aabb::Aabb;
pub use frustum::Frustum;
