//! Depth maps: row-major `u16` samples plus a meters-per-unit scale.
//!
//! A sample of `0` means the sensor could not resolve that pixel. It is never
//! a distance.

#[derive(Clone, Copy, Debug)]
pub struct DepthMapView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u16], // row-major, len = w*h
    /// Meters per raw depth unit.
    pub depth_units: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
    pub depth_units: f32,
}

impl<'a> DepthMapView<'a> {
    /// Raw sample at `(x, y)`, or `0` outside the map.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u16 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    #[inline]
    pub fn to_meters(&self, raw: u16) -> f64 {
        raw as f64 * self.depth_units as f64
    }
}

impl DepthMap {
    /// Wrap a buffer. Returns `None` if `data.len() != width * height`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u16>, depth_units: f32) -> Option<Self> {
        (width.checked_mul(height)? == data.len()).then_some(Self {
            width,
            height,
            data,
            depth_units,
        })
    }

    /// Map with every sample set to `raw`.
    pub fn filled(width: usize, height: usize, raw: u16, depth_units: f32) -> Self {
        Self {
            width,
            height,
            data: vec![raw; width * height],
            depth_units,
        }
    }

    pub fn view(&self) -> DepthMapView<'_> {
        DepthMapView {
            width: self.width,
            height: self.height,
            data: &self.data,
            depth_units: self.depth_units,
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u16 {
        self.view().get(x, y)
    }

    /// Set the sample at `(x, y)`; out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, raw: u16) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = raw;
        }
    }

    #[inline]
    pub fn to_meters(&self, raw: u16) -> f64 {
        self.view().to_meters(raw)
    }
}
