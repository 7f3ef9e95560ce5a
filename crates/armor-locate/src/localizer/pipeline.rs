use armor_locate_core::{sample_region_depth, CameraIntrinsics, DepthMapView};
#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{CycleResult, Localization, LocalizeError, LocalizedDetection, LocalizerParams, MissReason};
use crate::{FrameSource, FrameSourceError, QuadDetection, QuadDetector};

/// Turns 2D quad detections into metric 3D positions.
///
/// Holds the color stream intrinsics (fixed for the session) and the
/// localization parameters. Cycles share no state.
#[derive(Clone, Debug)]
pub struct Localizer {
    intrinsics: CameraIntrinsics,
    params: LocalizerParams,
}

impl Localizer {
    /// Create a localizer, rejecting unusable intrinsics or parameters.
    pub fn new(intrinsics: CameraIntrinsics, params: LocalizerParams) -> Result<Self, LocalizeError> {
        intrinsics.validate()?;
        params.validate()?;
        Ok(Self { intrinsics, params })
    }

    /// Create a localizer for the color stream of `source`.
    pub fn from_source<S: FrameSource + ?Sized>(
        source: &S,
        params: LocalizerParams,
    ) -> Result<Self, LocalizeError> {
        Self::new(source.color_intrinsics(), params)
    }

    #[inline]
    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    #[inline]
    pub fn params(&self) -> &LocalizerParams {
        &self.params
    }

    /// Localize one detection against the aligned depth frame.
    ///
    /// Depth is averaged over the shrunk quad; the centroid of the *detected*
    /// quad is deprojected at that depth.
    pub fn localize(&self, depth: &DepthMapView<'_>, detection: &QuadDetection) -> Localization {
        let sample = sample_region_depth(depth, &detection.quad, self.params.shrink_ratio);
        if !sample.is_resolved() {
            log::debug!(
                "no valid depth in region ({} covered pixels)",
                sample.covered_pixels
            );
            return Localization::Missed(MissReason::DepthUnresolved);
        }

        let distance = depth.to_meters(sample.raw_depth);
        if !(distance.is_finite() && distance > 0.0) {
            log::warn!("region depth {} converts to {distance} m", sample.raw_depth);
            return Localization::Missed(MissReason::DepthUnresolved);
        }

        let centroid = detection.quad.centroid().cast::<f64>();
        let position = match self.intrinsics.deproject_pixel_to_point_with(
            centroid,
            distance,
            self.params.undistort,
        ) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("deprojection of ({:.1}, {:.1}) failed: {err}", centroid.x, centroid.y);
                return Localization::Missed(MissReason::DeprojectionFailed);
            }
        };

        log::debug!(
            "raw depth {} from {}/{} samples -> {distance:.3} m",
            sample.raw_depth,
            sample.valid_samples,
            sample.covered_pixels
        );

        Localization::Detected(LocalizedDetection {
            color: detection.color,
            vertices: detection.quad.rounded(),
            raw_depth: sample.raw_depth,
            distance,
            position,
        })
    }

    /// Pull one frame pair, detect, and localize.
    ///
    /// Frame source failures (including `Exhausted`) are returned as errors;
    /// a missing quad or unresolved depth is a regular [`Localization::Missed`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, source, detector), fields(color = %self.params.target_color))
    )]
    pub fn run_one_cycle<S, D>(
        &self,
        source: &mut S,
        detector: &mut D,
    ) -> Result<CycleResult, LocalizeError>
    where
        S: FrameSource + ?Sized,
        D: QuadDetector + ?Sized,
    {
        let frames = source.next_aligned_pair()?;
        let expected = (self.intrinsics.width as usize, self.intrinsics.height as usize);
        if (frames.color.width, frames.color.height) != expected {
            return Err(FrameSourceError::ResolutionMismatch {
                index: frames.index,
                stream: "color",
                expected_width: expected.0,
                expected_height: expected.1,
                width: frames.color.width,
                height: frames.color.height,
            }
            .into());
        }

        let outcome = match detector.detect(&frames.color.view(), self.params.target_color) {
            Some(detection) => self.localize(&frames.depth.view(), &detection),
            None => Localization::Missed(MissReason::NoTarget),
        };

        match &outcome {
            Localization::Detected(found) => log::info!(
                "frame {}: {} target at {:.2} m ({:.3}, {:.3}, {:.3})",
                frames.index,
                found.color,
                found.distance,
                found.position.x,
                found.position.y,
                found.position.z
            ),
            Localization::Missed(reason) => log::debug!("frame {}: {reason}", frames.index),
        }

        Ok(CycleResult { frames, outcome })
    }
}
