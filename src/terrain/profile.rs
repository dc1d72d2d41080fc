//! Terrain archetypes and their immutable noise profiles.
//!
//! An archetype fixes the character of a planet's surface (desert, ice,
//! volcanic, ...). All archetypes share one generation algorithm; they differ
//! only in profile values. Profiles are plain data, safe to share across
//! threads, and serde-serializable so planets can be data-driven.

use serde::{Deserialize, Serialize};

/// Decorative feature kinds that some archetypes scatter directly from the
/// heightfield during the geometry build (terrain dressing, not streamed
/// separately).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Boulder,
    Cactus,
    IceShard,
    LavaVent,
}

/// Named terrain archetype, one per planet class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    EarthLike,
    Desert,
    Rocky,
    Ice,
    Volcanic,
}

impl Archetype {
    /// All archetypes, for iteration in tools and benches.
    pub const ALL: [Archetype; 5] = [
        Archetype::EarthLike,
        Archetype::Desert,
        Archetype::Rocky,
        Archetype::Ice,
        Archetype::Volcanic,
    ];

    /// The noise profile for this archetype.
    pub fn profile(self) -> TerrainProfile {
        match self {
            Archetype::EarthLike => TerrainProfile {
                archetype: self,
                octaves: 5,
                base_scale: 160.0,
                lacunarity: 2.0,
                persistence: 0.5,
                height_scale: 48.0,
                plateau_threshold: 0.35,
                plateau_exponent: 2.2,
                mountain_threshold: 0.55,
                mountain_strength: 1.4,
                mountain_scale: 900.0,
                ridge_scale: 220.0,
                detail_scale: 9.0,
                detail_strength: 0.015,
                low_tint: [0.24, 0.46, 0.20],
                high_tint: [0.92, 0.94, 0.96],
                features: vec![],
                feature_density: 0.0,
            },
            Archetype::Desert => TerrainProfile {
                archetype: self,
                octaves: 4,
                base_scale: 220.0,
                lacunarity: 2.1,
                persistence: 0.45,
                height_scale: 30.0,
                plateau_threshold: 0.5,
                plateau_exponent: 2.8,
                mountain_threshold: 0.65,
                mountain_strength: 1.1,
                mountain_scale: 1100.0,
                ridge_scale: 260.0,
                detail_scale: 6.0,
                detail_strength: 0.03,
                low_tint: [0.82, 0.68, 0.44],
                high_tint: [0.65, 0.48, 0.30],
                features: vec![FeatureKind::Cactus, FeatureKind::Boulder],
                feature_density: 0.08,
            },
            Archetype::Rocky => TerrainProfile {
                archetype: self,
                octaves: 6,
                base_scale: 120.0,
                lacunarity: 2.2,
                persistence: 0.55,
                height_scale: 64.0,
                plateau_threshold: 0.25,
                plateau_exponent: 1.8,
                mountain_threshold: 0.45,
                mountain_strength: 1.8,
                mountain_scale: 700.0,
                ridge_scale: 180.0,
                detail_scale: 7.0,
                detail_strength: 0.04,
                low_tint: [0.42, 0.38, 0.34],
                high_tint: [0.70, 0.68, 0.65],
                features: vec![FeatureKind::Boulder],
                feature_density: 0.12,
            },
            Archetype::Ice => TerrainProfile {
                archetype: self,
                octaves: 4,
                base_scale: 200.0,
                lacunarity: 1.9,
                persistence: 0.5,
                height_scale: 36.0,
                plateau_threshold: 0.45,
                plateau_exponent: 3.0,
                mountain_threshold: 0.6,
                mountain_strength: 1.3,
                mountain_scale: 1000.0,
                ridge_scale: 240.0,
                detail_scale: 5.0,
                detail_strength: 0.02,
                low_tint: [0.78, 0.86, 0.92],
                high_tint: [0.95, 0.97, 1.0],
                features: vec![FeatureKind::IceShard],
                feature_density: 0.05,
            },
            Archetype::Volcanic => TerrainProfile {
                archetype: self,
                octaves: 5,
                base_scale: 140.0,
                lacunarity: 2.3,
                persistence: 0.52,
                height_scale: 56.0,
                plateau_threshold: 0.3,
                plateau_exponent: 2.0,
                mountain_threshold: 0.4,
                mountain_strength: 2.0,
                mountain_scale: 650.0,
                ridge_scale: 160.0,
                detail_scale: 8.0,
                detail_strength: 0.05,
                low_tint: [0.18, 0.14, 0.13],
                high_tint: [0.55, 0.22, 0.12],
                features: vec![FeatureKind::Boulder, FeatureKind::LavaVent],
                feature_density: 0.1,
            },
        }
    }
}

/// Immutable noise profile for one terrain archetype.
///
/// Never mutated after construction; the generator holds it by value and the
/// same instance parameterizes every chunk of a planet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainProfile {
    /// Archetype this profile belongs to.
    pub archetype: Archetype,
    /// fBm octave count for the base shape.
    pub octaves: usize,
    /// Horizontal scale of the base noise in world units (larger = smoother).
    pub base_scale: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude decay per octave.
    pub persistence: f32,
    /// Vertical scale: normalized noise maps to [-height_scale, height_scale].
    pub height_scale: f32,
    /// Normalized deviations below this are compressed toward flat plateaus.
    pub plateau_threshold: f32,
    /// Compression exponent for sub-threshold deviations (>1 flattens).
    pub plateau_exponent: f32,
    /// Coarse mask value above which ridged mountains blend in.
    pub mountain_threshold: f32,
    /// Amplitude of the ridged contribution relative to the base shape.
    pub mountain_strength: f32,
    /// Horizontal scale of the coarse mountain mask in world units.
    pub mountain_scale: f32,
    /// Horizontal scale of the ridged noise itself in world units.
    pub ridge_scale: f32,
    /// Horizontal scale of the high-frequency detail term.
    pub detail_scale: f32,
    /// Amplitude of the detail term (normalized units).
    pub detail_strength: f32,
    /// Vertex tint at the lowest elevations (linear RGB).
    pub low_tint: [f32; 3],
    /// Vertex tint at the highest elevations (linear RGB).
    pub high_tint: [f32; 3],
    /// Feature kinds scattered as part of the terrain itself.
    pub features: Vec<FeatureKind>,
    /// Per-candidate-cell probability for intrinsic features.
    pub feature_density: f32,
}

impl TerrainProfile {
    /// Whether this archetype scatters intrinsic terrain features.
    pub fn has_intrinsic_features(&self) -> bool {
        !self.features.is_empty() && self.feature_density > 0.0
    }
}
