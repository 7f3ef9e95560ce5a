use armor_locate_core::{ImageQuad, RgbImageView};
use serde::{Deserialize, Serialize};

use crate::TargetColor;

/// A single 2D detection: the target outline and its color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadDetection {
    pub quad: ImageQuad,
    pub color: TargetColor,
}

/// 2D target detector.
///
/// Each call is treated as independent by the localizer, even if the
/// implementation keeps state between frames.
pub trait QuadDetector {
    fn detect(&mut self, image: &RgbImageView<'_>, target: TargetColor) -> Option<QuadDetection>;
}

impl<F> QuadDetector for F
where
    F: FnMut(&RgbImageView<'_>, TargetColor) -> Option<QuadDetection>,
{
    fn detect(&mut self, image: &RgbImageView<'_>, target: TargetColor) -> Option<QuadDetection> {
        self(image, target)
    }
}
