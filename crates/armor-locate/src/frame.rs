//! Frame source seam: aligned color + depth frame pairs.

use std::collections::VecDeque;

use armor_locate_core::{CameraIntrinsics, DepthMap, RgbImage};

/// Errors reported by a frame source. Any variant except `Exhausted` is fatal
/// to the polling loop.
#[derive(thiserror::Error, Debug)]
pub enum FrameSourceError {
    #[error("frame source exhausted")]
    Exhausted,
    #[error("camera disconnected: {0}")]
    Disconnected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(
        "frame {index}: expected {expected_width}x{expected_height}, got {width}x{height} ({stream})"
    )]
    ResolutionMismatch {
        index: u64,
        stream: &'static str,
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    #[error("frame {index}: {reason}")]
    InvalidFrame { index: u64, reason: String },
}

/// One color frame and the depth frame aligned onto its pixel grid.
#[derive(Clone, Debug)]
pub struct FramePair {
    pub index: u64,
    pub color: RgbImage,
    pub depth: DepthMap,
}

impl FramePair {
    /// Pair two frames, checking that the depth grid matches the color grid 1:1
    /// and carries a usable unit scale.
    pub fn new(index: u64, color: RgbImage, depth: DepthMap) -> Result<Self, FrameSourceError> {
        if color.width != depth.width || color.height != depth.height {
            return Err(FrameSourceError::ResolutionMismatch {
                index,
                stream: "depth",
                expected_width: color.width,
                expected_height: color.height,
                width: depth.width,
                height: depth.height,
            });
        }
        if !(depth.depth_units.is_finite() && depth.depth_units > 0.0) {
            return Err(FrameSourceError::InvalidFrame {
                index,
                reason: format!("depth units must be positive, got {}", depth.depth_units),
            });
        }
        Ok(Self {
            index,
            color,
            depth,
        })
    }
}

/// A camera pipeline delivering aligned frame pairs.
pub trait FrameSource {
    /// Intrinsics of the color stream; constant for the lifetime of the source.
    fn color_intrinsics(&self) -> CameraIntrinsics;

    /// Block until the next aligned pair is available.
    fn next_aligned_pair(&mut self) -> Result<FramePair, FrameSourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn color_intrinsics(&self) -> CameraIntrinsics {
        (**self).color_intrinsics()
    }

    fn next_aligned_pair(&mut self) -> Result<FramePair, FrameSourceError> {
        (**self).next_aligned_pair()
    }
}

/// In-memory source yielding a fixed list of frames, then `Exhausted`.
#[derive(Clone, Debug)]
pub struct FrameQueue {
    intrinsics: CameraIntrinsics,
    frames: VecDeque<FramePair>,
}

impl FrameQueue {
    pub fn new(intrinsics: CameraIntrinsics, frames: impl IntoIterator<Item = FramePair>) -> Self {
        Self {
            intrinsics,
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frames: FramePair) {
        self.frames.push_back(frames);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for FrameQueue {
    fn color_intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    fn next_aligned_pair(&mut self) -> Result<FramePair, FrameSourceError> {
        self.frames.pop_front().ok_or(FrameSourceError::Exhausted)
    }
}
