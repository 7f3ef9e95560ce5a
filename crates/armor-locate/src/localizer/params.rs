use armor_locate_core::{UndistortConfig, DEFAULT_SHRINK_RATIO};
use serde::{Deserialize, Serialize};

use super::LocalizeError;
use crate::TargetColor;

/// Configuration for the [`super::Localizer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerParams {
    /// Color requested from the 2D detector.
    pub target_color: TargetColor,
    /// Fraction of the centroid-to-vertex distance removed before sampling
    /// depth. `0.3` keeps the inner 70 % of the outline.
    pub shrink_ratio: f32,
    /// Iteration settings for inverting lens distortion.
    pub undistort: UndistortConfig,
}

impl Default for LocalizerParams {
    fn default() -> Self {
        Self {
            target_color: TargetColor::default(),
            shrink_ratio: DEFAULT_SHRINK_RATIO,
            undistort: UndistortConfig::default(),
        }
    }
}

impl LocalizerParams {
    pub fn validate(&self) -> Result<(), LocalizeError> {
        if !(self.shrink_ratio.is_finite() && (0.0..1.0).contains(&self.shrink_ratio)) {
            return Err(LocalizeError::InvalidParams {
                reason: "shrink_ratio must be in [0, 1)",
            });
        }
        if self.undistort.max_iters == 0 {
            return Err(LocalizeError::InvalidParams {
                reason: "undistort.max_iters must be positive",
            });
        }
        if !(self.undistort.eps.is_finite() && self.undistort.eps > 0.0) {
            return Err(LocalizeError::InvalidParams {
                reason: "undistort.eps must be positive",
            });
        }
        Ok(())
    }
}
