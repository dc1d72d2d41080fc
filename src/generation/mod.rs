//! Chunk-chained procedural passes: placement interface and the default
//! vegetation/structure generators.

pub mod placement;
pub mod structures;
pub mod vegetation;

pub use placement::{HeightSampler, Placement, PlacementFn, PlacementGenerator};
pub use structures::StructureScatter;
pub use vegetation::VegetationScatter;
