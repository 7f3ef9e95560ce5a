//! Robust depth of an image region.
//!
//! Detected target outlines tend to include background and edge pixels whose
//! depth is unreliable or missing. The sampler therefore shrinks the quad
//! toward its centroid, rasterizes it on the depth grid and averages the
//! non-zero samples inside.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DepthMapView, ImageQuad, QuadMask};

/// Shrink ratio applied to detected quads before sampling depth.
pub const DEFAULT_SHRINK_RATIO: f32 = 0.3;

/// Result of sampling a region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionDepthSample {
    /// Mean of the valid samples in raw depth units, truncated; `0` when none.
    pub raw_depth: u16,
    /// Number of covered pixels with a non-zero sample.
    pub valid_samples: usize,
    /// Number of pixels covered by the rasterized region.
    pub covered_pixels: usize,
}

impl RegionDepthSample {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.raw_depth != 0
    }
}

/// Shrink `quad` by `shrink_ratio` and average the valid depth inside it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(depth, quad), fields(width = depth.width, height = depth.height))
)]
pub fn sample_region_depth(
    depth: &DepthMapView<'_>,
    quad: &ImageQuad,
    shrink_ratio: f32,
) -> RegionDepthSample {
    accumulate(depth, &quad.shrink(shrink_ratio))
}

/// Mean of the non-zero depth samples inside `quad` (no shrinking), or `0`.
pub fn average_depth_in_quad(depth: &DepthMapView<'_>, quad: &ImageQuad) -> u16 {
    accumulate(depth, quad).raw_depth
}

fn accumulate(depth: &DepthMapView<'_>, quad: &ImageQuad) -> RegionDepthSample {
    let mask = QuadMask::rasterize(&quad.rounded(), depth.width, depth.height);

    let mut sum = 0u64;
    let mut samples = 0usize;
    let mut covered = 0usize;
    for (x, y) in mask.pixels() {
        covered += 1;
        let d = depth.get(x, y);
        if d == 0 {
            continue;
        }
        sum += d as u64;
        samples += 1;
    }

    let raw_depth = if samples == 0 {
        0
    } else {
        (sum / samples as u64) as u16
    };
    RegionDepthSample {
        raw_depth,
        valid_samples: samples,
        covered_pixels: covered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DepthMap;
    use nalgebra::Point2;

    fn rect_quad(x0: f32, y0: f32, x1: f32, y1: f32) -> ImageQuad {
        ImageQuad::new([
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    #[test]
    fn uniform_region_returns_its_depth() {
        let depth = DepthMap::filled(300, 300, 2000, 0.001);
        let sample = sample_region_depth(&depth.view(), &rect_quad(100.0, 100.0, 200.0, 200.0), 0.3);
        assert_eq!(sample.raw_depth, 2000);
        // shrunk to [115, 185]^2 inclusive
        assert_eq!(sample.covered_pixels, 71 * 71);
        assert_eq!(sample.valid_samples, 71 * 71);
        assert!(sample.is_resolved());
    }

    #[test]
    fn corner_order_does_not_change_the_sample() {
        let depth = DepthMap::filled(300, 300, 2000, 0.001);
        let ring = rect_quad(100.0, 100.0, 200.0, 200.0);
        let [a, b, c, d] = ring.vertices;
        let crossed = ImageQuad::new([a, b, d, c]);
        let expected = sample_region_depth(&depth.view(), &ring, 0.3);
        assert_eq!(sample_region_depth(&depth.view(), &crossed, 0.3), expected);
        assert_eq!(expected.raw_depth, 2000);
        assert_eq!(expected.covered_pixels, 71 * 71);
    }

    #[test]
    fn invalid_samples_are_ignored() {
        let mut depth = DepthMap::filled(40, 40, 0, 0.001);
        // Checkerboard of 1000 / 0 with a few 3000 samples on the valid cells.
        for y in 10..=20 {
            for x in 10..=20 {
                if (x + y) % 2 == 0 {
                    depth.set(x, y, if x == 14 { 3000 } else { 1000 });
                }
            }
        }
        let quad = rect_quad(10.0, 10.0, 20.0, 20.0);

        let mut sum = 0u64;
        let mut n = 0u64;
        for y in 10..=20 {
            for x in 10..=20 {
                let d = depth.get(x, y);
                if d != 0 {
                    sum += d as u64;
                    n += 1;
                }
            }
        }
        assert_eq!(average_depth_in_quad(&depth.view(), &quad), (sum / n) as u16);
        let sample = sample_region_depth(&depth.view(), &quad, 0.0);
        assert_eq!(sample.valid_samples as u64, n);
        assert_eq!(sample.covered_pixels, 121);
    }

    #[test]
    fn all_zero_region_yields_sentinel() {
        let depth = DepthMap::filled(64, 64, 0, 0.001);
        let sample = sample_region_depth(&depth.view(), &rect_quad(5.0, 5.0, 50.0, 40.0), 0.3);
        assert_eq!(sample.raw_depth, 0);
        assert_eq!(sample.valid_samples, 0);
        assert!(sample.covered_pixels > 0);
        assert!(!sample.is_resolved());
    }

    #[test]
    fn mean_is_truncated() {
        let mut depth = DepthMap::filled(4, 4, 0, 0.001);
        depth.set(1, 1, 1000);
        depth.set(2, 1, 1001);
        let quad = rect_quad(0.0, 0.0, 3.0, 3.0);
        assert_eq!(average_depth_in_quad(&depth.view(), &quad), 1000);
    }

    #[test]
    fn shrinking_excludes_background_ring() {
        // Target at 800 surrounded by a far wall at 4000 inside the quad border.
        let mut depth = DepthMap::filled(100, 100, 4000, 0.001);
        for y in 25..=75 {
            for x in 25..=75 {
                depth.set(x, y, 800);
            }
        }
        let quad = rect_quad(20.0, 20.0, 80.0, 80.0);
        assert!(average_depth_in_quad(&depth.view(), &quad) > 800);
        assert_eq!(sample_region_depth(&depth.view(), &quad, 0.3).raw_depth, 800);
    }

    #[test]
    fn partially_visible_quad_is_clamped() {
        let depth = DepthMap::filled(50, 50, 1200, 0.001);
        let sample = sample_region_depth(&depth.view(), &rect_quad(-40.0, -40.0, 20.0, 20.0), 0.3);
        assert_eq!(sample.raw_depth, 1200);
        assert!(sample.covered_pixels > 0);
    }

    #[test]
    fn off_frame_quad_yields_sentinel() {
        let depth = DepthMap::filled(50, 50, 1200, 0.001);
        let sample = sample_region_depth(&depth.view(), &rect_quad(60.0, 60.0, 90.0, 90.0), 0.3);
        assert_eq!(sample, RegionDepthSample::default());
    }

    #[test]
    fn zero_area_quad_yields_sentinel() {
        let depth = DepthMap::filled(50, 50, 1200, 0.001);
        let line = ImageQuad::new([
            Point2::new(10.0, 10.0),
            Point2::new(30.0, 10.0),
            Point2::new(30.0, 10.0),
            Point2::new(10.0, 10.0),
        ]);
        assert_eq!(sample_region_depth(&depth.view(), &line, 0.3).raw_depth, 0);
    }
}
