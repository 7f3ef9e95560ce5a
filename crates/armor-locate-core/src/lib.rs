//! Core geometry for depth-based localization of planar targets.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any camera SDK, detector or image library: frames are plain
//! row-major buffers, and the camera model is an explicit pinhole plus a
//! distortion model selected by tag.
//!
//! The two building blocks are:
//! - [`sample_region_depth`]: a robust depth estimate over a (shrunk) image
//!   quadrilateral, ignoring invalid (zero) depth samples;
//! - [`CameraIntrinsics::deproject_pixel_to_point`]: pixel + depth to a 3D
//!   point in the camera frame (X right, Y down, Z forward).
//!
//! ```
//! use armor_locate_core::{sample_region_depth, CameraIntrinsics, DepthMap, ImageQuad};
//! use nalgebra::Point2;
//!
//! let depth = DepthMap::filled(320, 240, 1500, 0.001);
//! let quad = ImageQuad::new([
//!     Point2::new(100.0, 80.0),
//!     Point2::new(180.0, 80.0),
//!     Point2::new(180.0, 140.0),
//!     Point2::new(100.0, 140.0),
//! ]);
//! let sample = sample_region_depth(&depth.view(), &quad, 0.3);
//! assert_eq!(sample.raw_depth, 1500);
//!
//! let k = CameraIntrinsics::pinhole(320, 240, 300.0, 300.0, 160.0, 120.0);
//! let distance = depth.to_meters(sample.raw_depth);
//! let p = k.deproject_pixel_to_point(quad.centroid().cast::<f64>(), distance).unwrap();
//! assert!((p.z - 1.5).abs() < 1e-6);
//! ```

mod camera;
mod depth;
mod distortion;
mod image;
mod logger;
mod quad;
mod raster;
mod region_depth;

pub use camera::{CameraError, CameraIntrinsics};
pub use depth::{DepthMap, DepthMapView};
pub use distortion::{DistortionModel, UndistortConfig};
pub use image::{RgbImage, RgbImageView};
pub use quad::ImageQuad;
pub use raster::{PixelRect, QuadMask};
pub use region_depth::{
    average_depth_in_quad, sample_region_depth, RegionDepthSample, DEFAULT_SHRINK_RATIO,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
