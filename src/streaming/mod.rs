//! Dynamic chunk streaming around a moving viewpoint

pub mod config;
pub mod loader;
pub mod manager;
pub mod priority;

pub use config::StreamerConfig;
pub use loader::{GenerationOutcome, GenerationPool};
pub use manager::{SurfaceStreamer, FALLBACK_HEIGHT};
pub use priority::{desired_keys, LoadRequest, RequestQueue};
