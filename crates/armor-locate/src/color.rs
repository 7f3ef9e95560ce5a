use std::fmt;

use serde::{Deserialize, Serialize};

/// Armor light color to look for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TargetColor {
    #[default]
    Red,
    Blue,
}

impl TargetColor {
    /// `(dominant, other, other)` channel indices into an RGB triple.
    pub(crate) fn channels(self) -> (usize, usize, usize) {
        match self {
            TargetColor::Red => (0, 1, 2),
            TargetColor::Blue => (2, 0, 1),
        }
    }
}

impl fmt::Display for TargetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetColor::Red => f.write_str("RED"),
            TargetColor::Blue => f.write_str("BLUE"),
        }
    }
}
