//! Baseline color-dominance quad detector.
//!
//! Marks pixels whose target channel is bright and clearly dominates the other
//! two, then takes the extreme marked pixels along both image diagonals as the
//! quad corners (top-left, top-right, bottom-right, bottom-left). Good enough
//! for a single lit plate on a dark background; real armor detectors plug in
//! through [`QuadDetector`].

use armor_locate_core::{ImageQuad, RgbImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{QuadDetection, QuadDetector, TargetColor};

/// Thresholds for [`ColorThresholdDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholdParams {
    /// Minimal value of the target channel.
    pub min_intensity: u8,
    /// Minimal lead of the target channel over both other channels.
    pub min_margin: u8,
    /// Fewer marked pixels than this means no detection.
    pub min_pixels: usize,
}

impl Default for ColorThresholdParams {
    fn default() -> Self {
        Self {
            min_intensity: 150,
            min_margin: 60,
            min_pixels: 30,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ColorThresholdDetector {
    params: ColorThresholdParams,
}

#[derive(Clone, Copy)]
struct Extreme {
    key: i32,
    at: (i32, i32),
}

impl ColorThresholdDetector {
    pub fn new(params: ColorThresholdParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ColorThresholdParams {
        &self.params
    }

    #[inline]
    fn is_target(&self, rgb: [u8; 3], target: TargetColor) -> bool {
        let (c, o1, o2) = target.channels();
        let v = rgb[c];
        let other = rgb[o1].max(rgb[o2]);
        v >= self.params.min_intensity && v.saturating_sub(other) >= self.params.min_margin
    }
}

impl QuadDetector for ColorThresholdDetector {
    fn detect(&mut self, image: &RgbImageView<'_>, target: TargetColor) -> Option<QuadDetection> {
        // Diagonal keys: s = x + y (min: top-left, max: bottom-right),
        // d = x - y (max: top-right, min: bottom-left).
        let mut min_s: Option<Extreme> = None;
        let mut max_s: Option<Extreme> = None;
        let mut min_d: Option<Extreme> = None;
        let mut max_d: Option<Extreme> = None;
        let mut count = 0usize;

        for y in 0..image.height as i32 {
            for x in 0..image.width as i32 {
                if !self.is_target(image.pixel(x, y), target) {
                    continue;
                }
                count += 1;
                let (s, d) = (x + y, x - y);
                update(&mut min_s, s, (x, y), |new, old| new < old);
                update(&mut max_s, s, (x, y), |new, old| new > old);
                update(&mut min_d, d, (x, y), |new, old| new < old);
                update(&mut max_d, d, (x, y), |new, old| new > old);
            }
        }

        if count < self.params.min_pixels.max(1) {
            log::trace!("color threshold: {count} {target} pixels, below minimum");
            return None;
        }

        let corner = |e: Option<Extreme>| e.map(|e| Point2::new(e.at.0 as f32, e.at.1 as f32));
        let quad = ImageQuad::new([
            corner(min_s)?,
            corner(max_d)?,
            corner(max_s)?,
            corner(min_d)?,
        ]);
        Some(QuadDetection {
            quad,
            color: target,
        })
    }
}

#[inline]
fn update(slot: &mut Option<Extreme>, key: i32, at: (i32, i32), better: impl Fn(i32, i32) -> bool) {
    match slot {
        Some(e) if !better(key, e.key) => {}
        _ => *slot = Some(Extreme { key, at }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armor_locate_core::RgbImage;

    fn scene(color: [u8; 3], x0: usize, y0: usize, x1: usize, y1: usize) -> RgbImage {
        let mut img = RgbImage::filled(64, 48, [20, 20, 25]);
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, color);
            }
        }
        img
    }

    #[test]
    fn finds_red_rectangle_corners() {
        let img = scene([230, 40, 50], 10, 12, 40, 30);
        let mut det = ColorThresholdDetector::default();
        let found = det.detect(&img.view(), TargetColor::Red).expect("red plate");
        assert_eq!(found.color, TargetColor::Red);
        assert_eq!(
            found.quad.vertices,
            [
                Point2::new(10.0, 12.0),
                Point2::new(40.0, 12.0),
                Point2::new(40.0, 30.0),
                Point2::new(10.0, 30.0),
            ]
        );
    }

    #[test]
    fn ignores_other_color() {
        let img = scene([40, 60, 240], 10, 12, 40, 30);
        let mut det = ColorThresholdDetector::default();
        assert!(det.detect(&img.view(), TargetColor::Red).is_none());
        assert!(det.detect(&img.view(), TargetColor::Blue).is_some());
    }

    #[test]
    fn white_light_is_not_a_target() {
        let img = scene([250, 250, 250], 5, 5, 30, 30);
        let mut det = ColorThresholdDetector::default();
        assert!(det.detect(&img.view(), TargetColor::Red).is_none());
        assert!(det.detect(&img.view(), TargetColor::Blue).is_none());
    }

    #[test]
    fn tiny_blobs_are_rejected() {
        let img = scene([230, 40, 50], 10, 10, 13, 13);
        let mut det = ColorThresholdDetector::default();
        assert!(det.detect(&img.view(), TargetColor::Red).is_none());
    }
}
