//! Procedural terrain: archetype profiles, heightfields, and generation

pub mod generator;
pub mod heightfield;
pub mod profile;

pub use generator::HeightfieldGenerator;
pub use heightfield::Heightfield;
pub use profile::{Archetype, FeatureKind, TerrainProfile};
