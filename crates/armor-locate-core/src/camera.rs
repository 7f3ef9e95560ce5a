//! Camera intrinsic model: pinhole projection plus a tagged distortion model.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::distortion::{DistortionModel, UndistortConfig};

/// Errors raised by the camera model.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("invalid camera intrinsics: {reason}")]
    InvalidIntrinsics { reason: &'static str },
    #[error("distortion model {model:?} does not support deprojection")]
    UnsupportedModel { model: DistortionModel },
    #[error("distortion inversion did not produce a finite point")]
    UndistortFailed,
}

/// Intrinsics of a calibrated color stream.
///
/// The camera frame is X right, Y down, Z forward. `fx`, `fy`, `cx`, `cy` are
/// in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub width: u32,
    pub height: u32,
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    #[serde(default)]
    pub model: DistortionModel,
    /// Model coefficients, see [`DistortionModel`] for the layout.
    #[serde(default)]
    pub coeffs: [f64; 5],
}

impl CameraIntrinsics {
    /// Distortion-free intrinsics.
    pub fn pinhole(width: u32, height: u32, fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            model: DistortionModel::None,
            coeffs: [0.0; 5],
        }
    }

    /// Attach a distortion model.
    pub fn with_distortion(mut self, model: DistortionModel, coeffs: [f64; 5]) -> Self {
        self.model = model;
        self.coeffs = coeffs;
        self
    }

    /// Check that the model can be used for deprojection.
    pub fn validate(&self) -> Result<(), CameraError> {
        if !(self.fx.is_finite() && self.fy.is_finite()) {
            return Err(CameraError::InvalidIntrinsics {
                reason: "focal length is not finite",
            });
        }
        if self.fx.abs() < 1e-12 || self.fy.abs() < 1e-12 {
            return Err(CameraError::InvalidIntrinsics {
                reason: "focal length is zero",
            });
        }
        if !(self.cx.is_finite() && self.cy.is_finite()) {
            return Err(CameraError::InvalidIntrinsics {
                reason: "principal point is not finite",
            });
        }
        if self.coeffs.iter().any(|c| !c.is_finite()) {
            return Err(CameraError::InvalidIntrinsics {
                reason: "distortion coefficient is not finite",
            });
        }
        if !self.model.can_deproject() {
            return Err(CameraError::UnsupportedModel { model: self.model });
        }
        Ok(())
    }

    #[inline]
    pub fn pixel_to_normalized(&self, pixel: Point2<f64>) -> [f64; 2] {
        [(pixel.x - self.cx) / self.fx, (pixel.y - self.cy) / self.fy]
    }

    #[inline]
    pub fn normalized_to_pixel(&self, xy: [f64; 2]) -> Point2<f64> {
        Point2::new(xy[0] * self.fx + self.cx, xy[1] * self.fy + self.cy)
    }

    /// Project a camera-frame point (`z > 0`) to an observed pixel.
    pub fn project_point(&self, point: Point3<f64>) -> Point2<f64> {
        let xy = [point.x / point.z, point.y / point.z];
        self.normalized_to_pixel(self.model.distort(&self.coeffs, xy))
    }

    /// Back-project a pixel at depth `depth` (meters along +Z, not ray length).
    ///
    /// `depth` must be positive and finite; the caller establishes this.
    pub fn deproject_pixel_to_point(
        &self,
        pixel: Point2<f64>,
        depth: f64,
    ) -> Result<Point3<f64>, CameraError> {
        self.deproject_pixel_to_point_with(pixel, depth, UndistortConfig::default())
    }

    /// Like [`Self::deproject_pixel_to_point`] with explicit inversion settings.
    pub fn deproject_pixel_to_point_with(
        &self,
        pixel: Point2<f64>,
        depth: f64,
        cfg: UndistortConfig,
    ) -> Result<Point3<f64>, CameraError> {
        debug_assert!(
            depth.is_finite() && depth > 0.0,
            "deprojection depth must be positive, got {depth}"
        );
        if !self.model.can_deproject() {
            return Err(CameraError::UnsupportedModel { model: self.model });
        }
        let [x, y] = self
            .model
            .undistort(&self.coeffs, self.pixel_to_normalized(pixel), cfg)
            .ok_or(CameraError::UndistortFailed)?;
        Ok(Point3::new(x * depth, y * depth, depth))
    }
}
