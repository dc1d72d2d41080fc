//! Fixed-resolution elevation grid for one chunk.
//!
//! A heightfield is produced exactly once, on a background task, and is
//! immutable from the moment it is handed to its owning chunk. Coordinates
//! here are grid-local (cell units); conversion from world space is the
//! chunk's job.

use std::f32::consts::PI;

/// Square grid of elevation samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    resolution: usize,
    samples: Vec<f32>,
}

impl Heightfield {
    /// Create a heightfield from a sample closure called once per grid point.
    pub fn from_fn(resolution: usize, mut sample: impl FnMut(usize, usize) -> f32) -> Self {
        let mut samples = Vec::with_capacity(resolution * resolution);
        for iz in 0..resolution {
            for ix in 0..resolution {
                samples.push(sample(ix, iz));
            }
        }
        Self { resolution, samples }
    }

    /// Create a flat heightfield at the given elevation.
    pub fn flat(resolution: usize, elevation: f32) -> Self {
        Self {
            resolution,
            samples: vec![elevation; resolution * resolution],
        }
    }

    /// Samples per side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Elevation at a grid point. Indices are clamped to the valid range.
    pub fn get(&self, ix: usize, iz: usize) -> f32 {
        let ix = ix.min(self.resolution - 1);
        let iz = iz.min(self.resolution - 1);
        self.samples[iz * self.resolution + ix]
    }

    /// Bilinearly interpolated elevation at a grid-local position in cell
    /// units. Positions outside the grid clamp to the border, so the field is
    /// defined (and continuous) everywhere.
    pub fn sample_bilinear(&self, x: f32, z: f32) -> f32 {
        let max = (self.resolution - 1) as f32;
        let x = x.clamp(0.0, max);
        let z = z.clamp(0.0, max);

        let ix = x.floor() as usize;
        let iz = z.floor() as usize;
        let fx = x - ix as f32;
        let fz = z - iz as f32;

        let h00 = self.get(ix, iz);
        let h10 = self.get(ix + 1, iz);
        let h01 = self.get(ix, iz + 1);
        let h11 = self.get(ix + 1, iz + 1);

        let a = h00 + (h10 - h00) * fx;
        let b = h01 + (h11 - h01) * fx;
        a + (b - a) * fz
    }

    /// Minimum and maximum elevation over the whole grid.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &h in &self.samples {
            min = min.min(h);
            max = max.max(h);
        }
        (min, max)
    }

    /// Carve a circular crater centered at (`cx`, `cz`) in cell units.
    ///
    /// Inside `radius` the elevation is pulled down toward a parabolic bowl of
    /// the given `depth`; a sinusoidal rim rises just past the radius. Used
    /// for one-off set-piece terrain, not the streaming path.
    pub fn carve_crater(&mut self, cx: f32, cz: f32, radius: f32, depth: f32) {
        let rim_width = radius * 0.4;
        let rim_height = depth * 0.25;

        for iz in 0..self.resolution {
            for ix in 0..self.resolution {
                let dx = ix as f32 - cx;
                let dz = iz as f32 - cz;
                let d = (dx * dx + dz * dz).sqrt();

                let idx = iz * self.resolution + ix;
                if d < radius {
                    // Bowl: deepest at the center, zero at the radius
                    let t = d / radius;
                    let bowl = depth * (1.0 - t * t);
                    self.samples[idx] -= bowl;
                } else if d < radius + rim_width {
                    // Raised rim falling off sinusoidally
                    let t = (d - radius) / rim_width;
                    self.samples[idx] += rim_height * (PI * t).sin().max(0.0) * (1.0 - t);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(resolution: usize) -> Heightfield {
        Heightfield::from_fn(resolution, |ix, iz| ix as f32 + iz as f32 * 10.0)
    }

    #[test]
    fn test_grid_point_exact() {
        let hf = ramp(9);
        // Sampling exactly at a grid point reproduces the stored elevation
        assert_eq!(hf.sample_bilinear(3.0, 5.0), hf.get(3, 5));
        assert_eq!(hf.sample_bilinear(0.0, 0.0), hf.get(0, 0));
        assert_eq!(hf.sample_bilinear(8.0, 8.0), hf.get(8, 8));
    }

    #[test]
    fn test_bilinear_between_points() {
        let hf = ramp(9);
        // Linear field: interpolation reproduces the analytic value
        let h = hf.sample_bilinear(2.5, 4.25);
        assert!((h - (2.5 + 42.5)).abs() < 1e-4);
    }

    #[test]
    fn test_bilinear_continuity() {
        let hf = ramp(9);
        // Small input deltas produce small output deltas
        let eps = 1e-3;
        let base = hf.sample_bilinear(3.7, 2.2);
        let dx = hf.sample_bilinear(3.7 + eps, 2.2);
        let dz = hf.sample_bilinear(3.7, 2.2 + eps);
        assert!((dx - base).abs() < 0.1);
        assert!((dz - base).abs() < 0.1);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let hf = ramp(9);
        assert_eq!(hf.sample_bilinear(-5.0, -5.0), hf.get(0, 0));
        assert_eq!(hf.sample_bilinear(100.0, 100.0), hf.get(8, 8));
    }

    #[test]
    fn test_min_max() {
        let hf = ramp(5);
        let (min, max) = hf.min_max();
        assert_eq!(min, 0.0);
        assert_eq!(max, 4.0 + 40.0);
    }

    #[test]
    fn test_crater_bowl_and_rim() {
        let mut hf = Heightfield::flat(33, 10.0);
        hf.carve_crater(16.0, 16.0, 6.0, 8.0);

        // Center pulled down by the full depth
        assert!((hf.get(16, 16) - 2.0).abs() < 1e-4);
        // Just past the radius the rim rises above the original surface
        assert!(hf.get(16 + 7, 16) > 10.0);
        // Far away the surface is untouched
        assert_eq!(hf.get(0, 0), 10.0);
    }
}
