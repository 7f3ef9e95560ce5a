use armor_locate_core::CameraError;

use crate::FrameSourceError;

/// Errors returned by the localizer.
///
/// Per-frame misses (no quad, no valid depth) are not errors; see
/// [`super::MissReason`].
#[derive(thiserror::Error, Debug)]
pub enum LocalizeError {
    #[error("invalid localizer parameters: {reason}")]
    InvalidParams { reason: &'static str },
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    FrameSource(#[from] FrameSourceError),
}

impl LocalizeError {
    /// `true` when the frame source simply ran out of frames.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, LocalizeError::FrameSource(FrameSourceError::Exhausted))
    }
}
