//! JSON configuration and report helpers for armor localization.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    ColorThresholdParams, CycleResult, LocalizedDetection, LocalizerParams, MissReason,
};

#[derive(thiserror::Error, Debug)]
pub enum LocalizeIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for the `armor-locate` runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizeConfig {
    /// Replay manifest to read frames from.
    #[serde(default)]
    pub sequence_path: Option<String>,
    #[serde(default)]
    pub localizer: LocalizerParams,
    #[serde(default)]
    pub detector: ColorThresholdParams,
    /// JSON-lines report written one line per cycle.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Stop after this many cycles.
    #[serde(default)]
    pub max_cycles: Option<usize>,
}

impl LocalizeConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LocalizeIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), LocalizeIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the report path, if reports are requested.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(PathBuf::from)
    }
}

/// Serializable summary of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub frame_index: u64,
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miss: Option<MissReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<LocalizedDetection>,
}

impl CycleReport {
    /// One compact JSON object, without a trailing newline.
    pub fn to_json_line(&self) -> Result<String, LocalizeIoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON-lines report.
    pub fn read_json_lines(path: impl AsRef<Path>) -> Result<Vec<Self>, LocalizeIoError> {
        let raw = fs::read_to_string(path)?;
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(LocalizeIoError::from))
            .collect()
    }
}

impl From<&CycleResult> for CycleReport {
    fn from(cycle: &CycleResult) -> Self {
        Self {
            frame_index: cycle.frames.index,
            detected: cycle.detected(),
            miss: cycle.miss(),
            detection: cycle.detection().cloned(),
        }
    }
}
