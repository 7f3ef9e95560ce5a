//! Per-cycle 3D localization.
//!
//! This module wires together frame acquisition, 2D quad detection, region
//! depth sampling and centroid deprojection.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::LocalizeError;
pub use params::LocalizerParams;
pub use pipeline::Localizer;
pub use result::{CycleResult, Localization, LocalizedDetection, MissReason};
