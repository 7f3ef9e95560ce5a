//! Integer-grid rasterization of quadrilaterals.
//!
//! Coverage is decided per pixel with an exact point-in-polygon test on the
//! rounded vertices: a pixel is covered if it lies strictly inside (crossing
//! number) or on an edge. This fills convex and near-convex quads including
//! their boundary, and does not depend on any image library.

use nalgebra::Point2;

/// Inclusive pixel rectangle `[x0, x1] x [y0, y1]`. Empty when `x0 > x1` or `y0 > y1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    /// Bounding box of `points`, clamped to `[0, width-1] x [0, height-1]`.
    pub fn clamped_bounds(points: &[Point2<i32>], width: usize, height: usize) -> Self {
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;
        let mut rect = PixelRect {
            x0: i32::MAX,
            y0: i32::MAX,
            x1: i32::MIN,
            y1: i32::MIN,
        };
        for p in points {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        PixelRect {
            x0: rect.x0.max(0),
            y0: rect.y0.max(0),
            x1: rect.x1.min(max_x),
            y1: rect.y1.min(max_y),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }

    #[inline]
    pub fn width(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.x1 - self.x0 + 1) as usize
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.y1 - self.y0 + 1) as usize
        }
    }
}

/// Coverage mask of a quad over its clamped bounding box.
#[derive(Clone, Debug)]
pub struct QuadMask {
    rect: PixelRect,
    covered: Vec<bool>, // row-major over `rect`
}

impl QuadMask {
    /// Rasterize `vertices` over a `width x height` grid.
    ///
    /// Vertices may come in any order; they are walked in angular order
    /// around their centroid. A polygon with zero area covers nothing.
    pub fn rasterize(vertices: &[Point2<i32>; 4], width: usize, height: usize) -> Self {
        let rect = PixelRect::clamped_bounds(vertices, width, height);
        let ring = ring_order(vertices);
        if rect.is_empty() || twice_area(&ring) == 0 {
            return Self {
                rect,
                covered: Vec::new(),
            };
        }

        let (w, h) = (rect.width(), rect.height());
        let mut covered = vec![false; w * h];
        for (row, y) in (rect.y0..=rect.y1).enumerate() {
            for (col, x) in (rect.x0..=rect.x1).enumerate() {
                covered[row * w + col] = contains(&ring, x, y);
            }
        }
        Self { rect, covered }
    }

    /// Clamped bounding box the mask was evaluated on.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Whether pixel `(x, y)` is covered.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        if self.covered.is_empty()
            || x < self.rect.x0
            || x > self.rect.x1
            || y < self.rect.y0
            || y > self.rect.y1
        {
            return false;
        }
        let idx = (y - self.rect.y0) as usize * self.rect.width() + (x - self.rect.x0) as usize;
        self.covered[idx]
    }

    /// Iterate covered pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let w = self.rect.width().max(1);
        let (x0, y0) = (self.rect.x0, self.rect.y0);
        self.covered
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(move |(i, _)| (x0 + (i % w) as i32, y0 + (i / w) as i32))
    }

    /// Number of covered pixels.
    pub fn count(&self) -> usize {
        self.covered.iter().filter(|&&c| c).count()
    }
}

/// Sort vertices by angle around their centroid so the ring never self-crosses.
fn ring_order(v: &[Point2<i32>; 4]) -> [Point2<i32>; 4] {
    let cx = v.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
    let cy = v.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;
    let mut ring = *v;
    ring.sort_by(|a, b| {
        let ta = (a.y as f64 - cy).atan2(a.x as f64 - cx);
        let tb = (b.y as f64 - cy).atan2(b.x as f64 - cx);
        ta.total_cmp(&tb)
    });
    ring
}

fn twice_area(v: &[Point2<i32>; 4]) -> i64 {
    let mut acc = 0i64;
    for i in 0..4 {
        let a = v[i];
        let b = v[(i + 1) % 4];
        acc += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    acc.abs()
}

fn on_segment(a: Point2<i32>, b: Point2<i32>, x: i32, y: i32) -> bool {
    let (ax, ay, bx, by) = (a.x as i64, a.y as i64, b.x as i64, b.y as i64);
    let (px, py) = (x as i64, y as i64);
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    cross == 0 && px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
}

/// Edge-inclusive point-in-polygon test on an integer grid.
fn contains(v: &[Point2<i32>; 4], x: i32, y: i32) -> bool {
    let mut inside = false;
    for i in 0..4 {
        let a = v[i];
        let b = v[(i + 1) % 4];
        if on_segment(a, b, x, y) {
            return true;
        }
        if (a.y > y) != (b.y > y) {
            // x coordinate of the edge at row y, compared without division.
            let lhs = (x as i64 - a.x as i64) * (b.y as i64 - a.y as i64);
            let rhs = (b.x as i64 - a.x as i64) * (y as i64 - a.y as i64);
            let crosses = if b.y > a.y { lhs < rhs } else { lhs > rhs };
            if crosses {
                inside = !inside;
            }
        }
    }
    inside
}
