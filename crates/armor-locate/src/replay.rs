//! Recorded sequences as a [`FrameSource`].
//!
//! A sequence is a JSON manifest next to its frames:
//!
//! ```json
//! {
//!   "intrinsics": { "width": 640, "height": 480, "fx": 615.0, "fy": 615.0, "cx": 320.0, "cy": 240.0 },
//!   "depth_units": 0.001,
//!   "frames": [ { "color": "color_0000.png", "depth": "depth_0000.png" } ]
//! }
//! ```
//!
//! Color frames are any 8-bit image the `image` crate decodes; depth frames
//! must be 16-bit grayscale PNGs already aligned to the color grid. Relative paths
//! resolve against the manifest directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use armor_locate_core::{CameraIntrinsics, DepthMap, RgbImage};
use image::{DynamicImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::{FramePair, FrameSource, FrameSourceError};

/// One recorded frame pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub color: String,
    pub depth: String,
}

/// Description of a recorded sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayManifest {
    pub intrinsics: CameraIntrinsics,
    /// Meters per raw depth unit.
    pub depth_units: f32,
    pub frames: Vec<ReplayFrame>,
}

impl ReplayManifest {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, FrameSourceError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), FrameSourceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Plays back a recorded sequence frame by frame, then reports `Exhausted`.
#[derive(Debug)]
pub struct ReplayFrameSource {
    manifest: ReplayManifest,
    root: PathBuf,
    next: usize,
}

impl ReplayFrameSource {
    /// Open the manifest at `path`. Frames are decoded lazily.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameSourceError> {
        let path = path.as_ref();
        let manifest = ReplayManifest::load_json(path)?;
        if !(manifest.depth_units.is_finite() && manifest.depth_units > 0.0) {
            return Err(FrameSourceError::InvalidFrame {
                index: 0,
                reason: format!("manifest depth_units must be positive, got {}", manifest.depth_units),
            });
        }
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        log::debug!(
            "replay {}: {} frames, {}x{}",
            path.display(),
            manifest.frames.len(),
            manifest.intrinsics.width,
            manifest.intrinsics.height
        );
        Ok(Self {
            manifest,
            root,
            next: 0,
        })
    }

    pub fn manifest(&self) -> &ReplayManifest {
        &self.manifest
    }

    /// Total number of frames in the sequence.
    pub fn len(&self) -> usize {
        self.manifest.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.frames.is_empty()
    }

    fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn load_pair(&self, index: usize) -> Result<FramePair, FrameSourceError> {
        let entry = &self.manifest.frames[index];
        let index = index as u64;
        let expected = (
            self.manifest.intrinsics.width as usize,
            self.manifest.intrinsics.height as usize,
        );

        let color = image::open(self.resolve(&entry.color))?.to_rgb8();
        let (w, h) = (color.width() as usize, color.height() as usize);
        check_size(index, "color", expected, (w, h))?;
        let color = RgbImage::from_raw(w, h, color.into_raw()).ok_or_else(|| {
            FrameSourceError::InvalidFrame {
                index,
                reason: "color buffer size mismatch".to_string(),
            }
        })?;

        let depth = match image::open(self.resolve(&entry.depth))? {
            DynamicImage::ImageLuma16(buf) => buf,
            other => {
                return Err(FrameSourceError::InvalidFrame {
                    index,
                    reason: format!(
                        "depth frame must be 16-bit grayscale, got {:?}",
                        other.color()
                    ),
                })
            }
        };
        let (w, h) = (depth.width() as usize, depth.height() as usize);
        check_size(index, "depth", expected, (w, h))?;
        let depth = DepthMap::from_raw(w, h, depth.into_raw(), self.manifest.depth_units)
            .ok_or_else(|| FrameSourceError::InvalidFrame {
                index,
                reason: "depth buffer size mismatch".to_string(),
            })?;

        FramePair::new(index, color, depth)
    }
}

fn check_size(
    index: u64,
    stream: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
) -> Result<(), FrameSourceError> {
    if expected == got {
        return Ok(());
    }
    Err(FrameSourceError::ResolutionMismatch {
        index,
        stream,
        expected_width: expected.0,
        expected_height: expected.1,
        width: got.0,
        height: got.1,
    })
}

impl FrameSource for ReplayFrameSource {
    fn color_intrinsics(&self) -> CameraIntrinsics {
        self.manifest.intrinsics
    }

    fn next_aligned_pair(&mut self) -> Result<FramePair, FrameSourceError> {
        if self.next >= self.manifest.frames.len() {
            return Err(FrameSourceError::Exhausted);
        }
        let pair = self.load_pair(self.next)?;
        self.next += 1;
        Ok(pair)
    }
}

/// Write `frames` as `{stem}_color.png` / `{stem}_depth.png` under `dir` and
/// return the manifest entry (paths relative to `dir`).
pub fn save_frame_pair(
    dir: impl AsRef<Path>,
    stem: &str,
    frames: &FramePair,
) -> Result<ReplayFrame, FrameSourceError> {
    let dir = dir.as_ref();
    let entry = ReplayFrame {
        color: format!("{stem}_color.png"),
        depth: format!("{stem}_depth.png"),
    };
    let invalid = |reason: &str| FrameSourceError::InvalidFrame {
        index: frames.index,
        reason: reason.to_string(),
    };

    let color = image::RgbImage::from_raw(
        frames.color.width as u32,
        frames.color.height as u32,
        frames.color.data.clone(),
    )
    .ok_or_else(|| invalid("color buffer size mismatch"))?;
    color.save(dir.join(&entry.color))?;

    let depth: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(
        frames.depth.width as u32,
        frames.depth.height as u32,
        frames.depth.data.clone(),
    )
    .ok_or_else(|| invalid("depth buffer size mismatch"))?;
    depth.save(dir.join(&entry.depth))?;

    Ok(entry)
}
