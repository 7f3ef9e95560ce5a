use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Four ordered image-space vertices of a detected region.
///
/// The order is whatever the detector emitted and is preserved; it does not
/// matter for centroid or area computations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageQuad {
    pub vertices: [Point2<f32>; 4],
}

impl ImageQuad {
    pub fn new(vertices: [Point2<f32>; 4]) -> Self {
        Self { vertices }
    }

    /// Mean of the four vertices.
    pub fn centroid(&self) -> Point2<f32> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }

    /// Scale every vertex toward the centroid by `1 - ratio`.
    ///
    /// The centroid is preserved and the area scales by `(1 - ratio)^2`.
    pub fn shrink(&self, ratio: f32) -> Self {
        let c = self.centroid();
        let scale = 1.0 - ratio;
        Self {
            vertices: self.vertices.map(|p| c + (p - c) * scale),
        }
    }

    /// Vertices sorted by angle around the centroid, forming a simple ring
    /// whatever order the detector emitted them in.
    pub fn ring_ordered(&self) -> [Point2<f32>; 4] {
        let c = self.centroid();
        let mut ring = self.vertices;
        ring.sort_by(|a, b| {
            let ta = (a.y - c.y).atan2(a.x - c.x);
            let tb = (b.y - c.y).atan2(b.x - c.x);
            ta.total_cmp(&tb)
        });
        ring
    }

    /// Unsigned polygon area (shoelace over [`Self::ring_ordered`], anchored at
    /// the first vertex).
    pub fn area(&self) -> f32 {
        let [a, b, c, d] = self.ring_ordered();
        let (ab, ac, ad) = (b - a, c - a, d - a);
        let twice = ab.perp(&ac) + ac.perp(&ad);
        twice.abs() * 0.5
    }

    /// Vertices rounded to the nearest integer pixel.
    pub fn rounded(&self) -> [Point2<i32>; 4] {
        self.vertices
            .map(|p| Point2::new(p.x.round() as i32, p.y.round() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn skewed() -> ImageQuad {
        ImageQuad::new([
            Point2::new(412.3, 205.8),
            Point2::new(498.1, 219.4),
            Point2::new(490.7, 262.2),
            Point2::new(405.9, 250.6),
        ])
    }

    #[test]
    fn shrink_preserves_centroid() {
        let q = skewed();
        let c = q.centroid();
        for r in [0.0, 0.1, 0.3, 0.75, 0.99] {
            let s = q.shrink(r).centroid();
            assert_abs_diff_eq!(s.x, c.x, epsilon = 1e-3);
            assert_abs_diff_eq!(s.y, c.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn shrink_scales_area_quadratically() {
        let q = skewed();
        let area = q.area();
        let mut prev = f32::INFINITY;
        for r in [0.0, 0.2, 0.3, 0.5, 0.8] {
            let shrunk = q.shrink(r).area();
            let expected = (1.0 - r) * (1.0 - r) * area;
            assert_relative_eq!(shrunk, expected, max_relative = 1e-4);
            assert!(shrunk < prev, "area must strictly decrease with ratio");
            prev = shrunk;
        }
    }

    #[test]
    fn area_is_orientation_independent() {
        let q = skewed();
        let mut rev = q.vertices;
        rev.reverse();
        assert_relative_eq!(ImageQuad::new(rev).area(), q.area(), max_relative = 1e-5);
    }

    #[test]
    fn area_ignores_corner_order() {
        let q = skewed();
        let [a, b, c, d] = q.vertices;
        let crossed = ImageQuad::new([a, b, d, c]);
        assert_relative_eq!(crossed.area(), q.area(), max_relative = 1e-5);

        let square = ImageQuad::new([
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 100.0),
            Point2::new(100.0, 200.0),
            Point2::new(200.0, 200.0),
        ]);
        assert_relative_eq!(square.area(), 10000.0, max_relative = 1e-6);
    }

    #[test]
    fn rounding_goes_to_nearest() {
        let q = ImageQuad::new([
            Point2::new(1.4, 1.6),
            Point2::new(10.5, 2.49),
            Point2::new(-0.6, 7.5),
            Point2::new(3.0, -2.51),
        ]);
        assert_eq!(
            q.rounded(),
            [
                Point2::new(1, 2),
                Point2::new(11, 2),
                Point2::new(-1, 8),
                Point2::new(3, -3)
            ]
        );
    }
}
