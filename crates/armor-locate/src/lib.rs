//! Metric 3D localization of a detected armor plate.
//!
//! Each cycle pulls one aligned color + depth frame pair, asks a 2D detector
//! for the target quadrilateral, estimates the target's depth from the
//! (shrunk) quad and deprojects the quad centroid into the color camera frame.
//! Cycles are independent: a missing quad or unresolved depth simply yields no
//! detection for that frame.
//!
//! This crate provides:
//! - the collaborator seams: [`FrameSource`] and [`QuadDetector`];
//! - the orchestrator, [`Localizer`], with [`Localizer::run_one_cycle`];
//! - a baseline [`ColorThresholdDetector`];
//! - (feature `image`) [`replay::ReplayFrameSource`] for recorded sequences;
//! - JSON config and per-cycle reports in [`io`].
//!
//! ## Quickstart
//!
//! ```
//! use armor_locate::core::{CameraIntrinsics, DepthMap, ImageQuad, RgbImage, RgbImageView};
//! use armor_locate::{
//!     FramePair, FrameQueue, Localizer, LocalizerParams, QuadDetection, TargetColor,
//! };
//! use nalgebra::Point2;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let intrinsics = CameraIntrinsics::pinhole(320, 240, 300.0, 300.0, 160.0, 120.0);
//! let frames = FramePair::new(
//!     0,
//!     RgbImage::filled(320, 240, [0, 0, 0]),
//!     DepthMap::filled(320, 240, 1500, 0.001),
//! )?;
//! let mut source = FrameQueue::new(intrinsics, vec![frames]);
//!
//! fn fixed_detector(
//!     quad: ImageQuad,
//! ) -> impl FnMut(&RgbImageView<'_>, TargetColor) -> Option<QuadDetection> {
//!     move |_, color| Some(QuadDetection { quad, color })
//! }
//! let mut detector = fixed_detector(ImageQuad::new([
//!     Point2::new(140.0, 100.0),
//!     Point2::new(180.0, 100.0),
//!     Point2::new(180.0, 140.0),
//!     Point2::new(140.0, 140.0),
//! ]));
//!
//! let localizer = Localizer::from_source(&source, LocalizerParams::default())?;
//! let cycle = localizer.run_one_cycle(&mut source, &mut detector)?;
//! let found = cycle.detection().expect("target localized");
//! assert!((found.distance - 1.5).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```

pub use armor_locate_core as core;

mod color;
mod color_threshold;
mod detector;
mod frame;
pub mod io;
mod localizer;

#[cfg(feature = "image")]
pub mod replay;

pub use color::TargetColor;
pub use color_threshold::{ColorThresholdDetector, ColorThresholdParams};
pub use detector::{QuadDetection, QuadDetector};
pub use frame::{FramePair, FrameQueue, FrameSource, FrameSourceError};
pub use localizer::{
    CycleResult, Localization, LocalizeError, LocalizedDetection, Localizer, LocalizerParams,
    MissReason,
};
