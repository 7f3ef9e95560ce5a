use std::fmt;

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::{FramePair, TargetColor};

/// Why a cycle produced no detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// The detector found no quad of the requested color.
    NoTarget,
    /// No valid depth sample inside the shrunk quad.
    DepthUnresolved,
    /// The centroid could not be mapped back through the lens model.
    DeprojectionFailed,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissReason::NoTarget => "no target",
            MissReason::DepthUnresolved => "depth unresolved",
            MissReason::DeprojectionFailed => "deprojection failed",
        })
    }
}

/// A target localized in the color camera frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizedDetection {
    pub color: TargetColor,
    /// Detected outline rounded to integer pixels (not shrunk).
    pub vertices: [Point2<i32>; 4],
    /// Region depth in raw sensor units.
    pub raw_depth: u16,
    /// Region depth in meters; equals `position.z`.
    pub distance: f64,
    /// Deprojected quad centroid, meters.
    pub position: Point3<f64>,
}

/// Two-line caption: distance, then the camera-frame position.
impl fmt::Display for LocalizedDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance: {:.2}m\n({:.2},{:.2},{:.2})",
            self.distance, self.position.x, self.position.y, self.position.z
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Localization {
    Detected(LocalizedDetection),
    Missed(MissReason),
}

/// Output of one localization cycle.
#[derive(Clone, Debug)]
pub struct CycleResult {
    /// The frames the cycle ran on, kept for display and recording.
    pub frames: FramePair,
    pub outcome: Localization,
}

impl CycleResult {
    #[inline]
    pub fn detected(&self) -> bool {
        matches!(self.outcome, Localization::Detected(_))
    }

    pub fn detection(&self) -> Option<&LocalizedDetection> {
        match &self.outcome {
            Localization::Detected(d) => Some(d),
            Localization::Missed(_) => None,
        }
    }

    pub fn miss(&self) -> Option<MissReason> {
        match self.outcome {
            Localization::Detected(_) => None,
            Localization::Missed(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_has_two_decimals() {
        let det = LocalizedDetection {
            color: TargetColor::Blue,
            vertices: [Point2::new(0, 0); 4],
            raw_depth: 2346,
            distance: 2.346,
            position: Point3::new(-0.1, 0.256, 2.346),
        };
        assert_eq!(det.to_string(), "distance: 2.35m\n(-0.10,0.26,2.35)");
    }

    #[test]
    fn miss_reason_serializes_snake_case() {
        let s = serde_json::to_string(&MissReason::DepthUnresolved).unwrap();
        assert_eq!(s, "\"depth_unresolved\"");
    }
}
