//! Lens distortion models keyed by tag.
//!
//! All models act on normalized pinhole coordinates `(x, y) = ((u - cx) / fx,
//! (v - cy) / fy)`. `distort` is the forward model (ideal -> observed),
//! `undistort` its inverse. Coefficients are stored in a flat `[f64; 5]`
//! whose meaning depends on the model:
//!
//! | model | coefficients |
//! |---|---|
//! | `BrownConrady`, `InverseBrownConrady`, `ModifiedBrownConrady` | `[k1, k2, p1, p2, k3]` |
//! | `KannalaBrandt4` | `[k1, k2, k3, k4, -]` |
//! | `FTheta` | `[omega, -, -, -, -]` |

use serde::{Deserialize, Serialize};

/// Distortion model tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionModel {
    /// Ideal pinhole, coefficients ignored.
    #[default]
    None,
    /// Radial-tangential model with tangential terms evaluated on the ideal point.
    BrownConrady,
    /// Radial-tangential model with tangential terms evaluated after radial scaling.
    InverseBrownConrady,
    /// Same forward mapping as `InverseBrownConrady`, but declared forward-only:
    /// streams tagged with it cannot be deprojected.
    ModifiedBrownConrady,
    /// Equidistant fisheye, `theta_d = theta (1 + k1 theta^2 + .. + k4 theta^8)`.
    KannalaBrandt4,
    /// Single-parameter field-of-view model.
    FTheta,
}

/// Settings of the iterative distortion inversion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UndistortConfig {
    /// Maximum fixed-point / Newton iterations.
    pub max_iters: usize,
    /// Stop once the update norm falls below this threshold.
    pub eps: f64,
}

impl Default for UndistortConfig {
    fn default() -> Self {
        Self {
            max_iters: 20,
            eps: 1e-12,
        }
    }
}

const TINY_RADIUS: f64 = 1e-12;

impl DistortionModel {
    /// Whether observed pixels of this model can be mapped back to rays.
    pub fn can_deproject(self) -> bool {
        !matches!(self, DistortionModel::ModifiedBrownConrady)
    }

    /// Apply the forward model to normalized coordinates.
    pub fn distort(self, coeffs: &[f64; 5], xy: [f64; 2]) -> [f64; 2] {
        let [x, y] = xy;
        match self {
            DistortionModel::None => xy,
            DistortionModel::BrownConrady => {
                let [k1, k2, p1, p2, k3] = *coeffs;
                let r2 = x * x + y * y;
                let radial = 1.0 + r2 * (k1 + r2 * (k2 + r2 * k3));
                [
                    x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
                    y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
                ]
            }
            DistortionModel::InverseBrownConrady | DistortionModel::ModifiedBrownConrady => {
                let r2 = x * x + y * y;
                let radial = 1.0 + r2 * (coeffs[0] + r2 * (coeffs[1] + r2 * coeffs[4]));
                let [tx, ty] = scaled_tangential(coeffs, x * radial, y * radial, r2);
                [x * radial + tx, y * radial + ty]
            }
            DistortionModel::KannalaBrandt4 => {
                let r = x.hypot(y);
                if r < TINY_RADIUS {
                    return xy;
                }
                let theta = r.atan();
                let scale = kb4_theta_d(coeffs, theta) / r;
                [x * scale, y * scale]
            }
            DistortionModel::FTheta => {
                let omega = coeffs[0];
                let r = x.hypot(y);
                if r < TINY_RADIUS || omega.abs() < TINY_RADIUS {
                    return xy;
                }
                let rd = (2.0 * r * (omega / 2.0).tan()).atan() / omega;
                [x * rd / r, y * rd / r]
            }
        }
    }

    /// Invert the forward model. Returns `None` for forward-only models or when
    /// the iteration leaves the finite domain.
    pub fn undistort(self, coeffs: &[f64; 5], xy: [f64; 2], cfg: UndistortConfig) -> Option<[f64; 2]> {
        let out = match self {
            DistortionModel::None => xy,
            DistortionModel::ModifiedBrownConrady => return None,
            DistortionModel::BrownConrady => undistort_brown_conrady(coeffs, xy, cfg)?,
            DistortionModel::InverseBrownConrady => undistort_scaled_tangential(coeffs, xy, cfg)?,
            DistortionModel::KannalaBrandt4 => undistort_kb4(coeffs, xy, cfg)?,
            DistortionModel::FTheta => {
                let omega = coeffs[0];
                let rd = xy[0].hypot(xy[1]);
                if rd < TINY_RADIUS || omega.abs() < TINY_RADIUS {
                    xy
                } else {
                    let r = (omega * rd).tan() / (2.0 * (omega / 2.0).tan());
                    [xy[0] * r / rd, xy[1] * r / rd]
                }
            }
        };
        (out[0].is_finite() && out[1].is_finite()).then_some(out)
    }
}

#[inline]
fn radial_factor(coeffs: &[f64; 5], r2: f64) -> f64 {
    1.0 + r2 * (coeffs[0] + r2 * (coeffs[1] + r2 * coeffs[4]))
}

#[inline]
fn scaled_tangential(coeffs: &[f64; 5], xs: f64, ys: f64, r2: f64) -> [f64; 2] {
    let (p1, p2) = (coeffs[2], coeffs[3]);
    [
        2.0 * p1 * xs * ys + p2 * (r2 + 2.0 * xs * xs),
        2.0 * p2 * xs * ys + p1 * (r2 + 2.0 * ys * ys),
    ]
}

#[inline]
fn kb4_theta_d(coeffs: &[f64; 5], theta: f64) -> f64 {
    let t2 = theta * theta;
    theta * (1.0 + t2 * (coeffs[0] + t2 * (coeffs[1] + t2 * (coeffs[2] + t2 * coeffs[3]))))
}

fn undistort_brown_conrady(coeffs: &[f64; 5], xd: [f64; 2], cfg: UndistortConfig) -> Option<[f64; 2]> {
    let (p1, p2) = (coeffs[2], coeffs[3]);
    fixed_point(xd, cfg, |x, y| {
        let r2 = x * x + y * y;
        let radial = radial_factor(coeffs, r2);
        if !radial.is_finite() || radial.abs() < TINY_RADIUS {
            return None;
        }
        let tx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let ty = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
        Some([(xd[0] - tx) / radial, (xd[1] - ty) / radial])
    })
}

fn undistort_scaled_tangential(
    coeffs: &[f64; 5],
    xd: [f64; 2],
    cfg: UndistortConfig,
) -> Option<[f64; 2]> {
    fixed_point(xd, cfg, |x, y| {
        let r2 = x * x + y * y;
        let radial = radial_factor(coeffs, r2);
        if !radial.is_finite() || radial.abs() < TINY_RADIUS {
            return None;
        }
        let [tx, ty] = scaled_tangential(coeffs, x * radial, y * radial, r2);
        Some([(xd[0] - tx) / radial, (xd[1] - ty) / radial])
    })
}

fn undistort_kb4(coeffs: &[f64; 5], xd: [f64; 2], cfg: UndistortConfig) -> Option<[f64; 2]> {
    let rd = xd[0].hypot(xd[1]);
    if rd < TINY_RADIUS {
        return Some(xd);
    }

    // Newton on theta_d(theta) = rd.
    let mut theta = rd;
    for _ in 0..cfg.max_iters.max(1) {
        let t2 = theta * theta;
        let f = kb4_theta_d(coeffs, theta) - rd;
        let df = 1.0
            + t2 * (3.0 * coeffs[0]
                + t2 * (5.0 * coeffs[1] + t2 * (7.0 * coeffs[2] + t2 * 9.0 * coeffs[3])));
        if !df.is_finite() || df.abs() < TINY_RADIUS {
            return None;
        }
        let step = f / df;
        theta -= step;
        if step.abs() <= cfg.eps.max(0.0) {
            break;
        }
    }

    let r = theta.tan();
    Some([xd[0] * r / rd, xd[1] * r / rd])
}

fn fixed_point(
    start: [f64; 2],
    cfg: UndistortConfig,
    mut update: impl FnMut(f64, f64) -> Option<[f64; 2]>,
) -> Option<[f64; 2]> {
    let [mut x, mut y] = start;
    for _ in 0..cfg.max_iters.max(1) {
        let [x_next, y_next] = update(x, y)?;
        if !x_next.is_finite() || !y_next.is_finite() {
            return None;
        }
        let step = (x_next - x).hypot(y_next - y);
        x = x_next;
        y = y_next;
        if step <= cfg.eps.max(0.0) {
            break;
        }
    }
    Some([x, y])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [[f64; 2]; 5] = [
        [0.0, 0.0],
        [0.12, -0.08],
        [-0.25, 0.18],
        [0.31, 0.27],
        [-0.05, -0.33],
    ];

    fn assert_round_trip(model: DistortionModel, coeffs: [f64; 5], tol: f64) {
        for p in SAMPLES {
            let d = model.distort(&coeffs, p);
            let u = model
                .undistort(&coeffs, d, UndistortConfig::default())
                .expect("invertible");
            assert!(
                (u[0] - p[0]).abs() < tol && (u[1] - p[1]).abs() < tol,
                "{model:?}: expected ({:.9},{:.9}) got ({:.9},{:.9})",
                p[0],
                p[1],
                u[0],
                u[1]
            );
        }
    }

    #[test]
    fn none_is_identity() {
        let coeffs = [0.3, -0.1, 0.01, 0.02, 0.5];
        for p in SAMPLES {
            assert_eq!(DistortionModel::None.distort(&coeffs, p), p);
        }
    }

    #[test]
    fn brown_conrady_round_trips() {
        assert_round_trip(
            DistortionModel::BrownConrady,
            [-0.12, 0.03, 0.001, -0.0008, 0.0],
            1e-8,
        );
    }

    #[test]
    fn inverse_brown_conrady_round_trips() {
        assert_round_trip(
            DistortionModel::InverseBrownConrady,
            [0.05, -0.02, 0.0015, 0.0007, 0.001],
            1e-8,
        );
    }

    #[test]
    fn kannala_brandt_round_trips() {
        assert_round_trip(
            DistortionModel::KannalaBrandt4,
            [-0.01, 0.004, -0.002, 0.0005, 0.0],
            1e-9,
        );
    }

    #[test]
    fn ftheta_round_trips() {
        assert_round_trip(DistortionModel::FTheta, [0.92, 0.0, 0.0, 0.0, 0.0], 1e-9);
    }

    #[test]
    fn modified_brown_conrady_is_forward_only() {
        let model = DistortionModel::ModifiedBrownConrady;
        assert!(!model.can_deproject());
        assert!(model
            .undistort(&[0.1, 0.0, 0.0, 0.0, 0.0], [0.1, 0.1], UndistortConfig::default())
            .is_none());
    }

    #[test]
    fn barrel_distortion_pulls_points_inward() {
        let d = DistortionModel::BrownConrady.distort(&[-0.2, 0.0, 0.0, 0.0, 0.0], [0.3, 0.0]);
        assert!(d[0] < 0.3);
        assert_eq!(d[1], 0.0);
    }

    #[test]
    fn model_tags_use_snake_case() {
        let json = serde_json::to_string(&DistortionModel::KannalaBrandt4).unwrap();
        assert_eq!(json, "\"kannala_brandt4\"");
        let back: DistortionModel = serde_json::from_str("\"inverse_brown_conrady\"").unwrap();
        assert_eq!(back, DistortionModel::InverseBrownConrady);
    }
}
