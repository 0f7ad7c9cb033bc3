//! Quality mode definitions shared by all pipelines.
//!
//! A quality mode trades processing time against output quality. It drives
//! the x264 encode settings, the identity-matching thresholds of the face
//! tracker, and the strength of the local unsharp enhancer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quality mode for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// Fastest processing, loosest matching, hardest compression.
    Fast,

    /// Default trade-off.
    #[default]
    Balanced,

    /// Slowest processing, strictest matching, lightest compression.
    Best,
}

/// x264 settings derived from a quality mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeQuality {
    /// Constant rate factor (lower = better)
    pub crf: u8,
    /// x264 speed preset
    pub preset: &'static str,
}

impl QualityMode {
    /// All available quality modes.
    pub const ALL: &'static [QualityMode] =
        &[QualityMode::Fast, QualityMode::Balanced, QualityMode::Best];

    /// Returns the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityMode::Fast => "fast",
            QualityMode::Balanced => "balanced",
            QualityMode::Best => "best",
        }
    }

    /// x264 encode settings for this mode.
    pub fn encode_quality(&self) -> EncodeQuality {
        match self {
            QualityMode::Fast => EncodeQuality {
                crf: 28,
                preset: "veryfast",
            },
            QualityMode::Balanced => EncodeQuality {
                crf: 23,
                preset: "fast",
            },
            QualityMode::Best => EncodeQuality {
                crf: 18,
                preset: "slow",
            },
        }
    }

    /// Minimum embedding match score for assigning a detection to a track.
    pub fn embed_match_threshold(&self) -> f32 {
        match self {
            QualityMode::Fast => 0.45,
            QualityMode::Balanced => 0.60,
            QualityMode::Best => 0.65,
        }
    }

    /// Minimum spatial match score for the IoU fallback.
    pub fn spatial_match_threshold(&self) -> f32 {
        match self {
            QualityMode::Fast => 0.30,
            QualityMode::Balanced => 0.35,
            QualityMode::Best => 0.40,
        }
    }

    /// Maximum embeddings stored per track gallery.
    pub fn gallery_cap(&self) -> usize {
        match self {
            QualityMode::Fast => 5,
            QualityMode::Balanced => 6,
            QualityMode::Best => 8,
        }
    }

    /// Sharpening amount for the local unsharp enhancer.
    pub fn unsharp_strength(&self) -> f32 {
        match self {
            QualityMode::Fast => 1.0,
            QualityMode::Balanced => 1.5,
            QualityMode::Best => 2.0,
        }
    }
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown quality mode.
#[derive(Debug, Error)]
#[error("unknown quality mode: {0}")]
pub struct ParseQualityModeError(String);

impl FromStr for QualityMode {
    type Err = ParseQualityModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(QualityMode::Fast),
            "balanced" => Ok(QualityMode::Balanced),
            "best" => Ok(QualityMode::Best),
            other => Err(ParseQualityModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced() {
        assert_eq!(QualityMode::default(), QualityMode::Balanced);
    }

    #[test]
    fn test_encode_quality_table() {
        assert_eq!(QualityMode::Best.encode_quality().crf, 18);
        assert_eq!(QualityMode::Best.encode_quality().preset, "slow");
        assert_eq!(QualityMode::Balanced.encode_quality().crf, 23);
        assert_eq!(QualityMode::Balanced.encode_quality().preset, "fast");
        assert_eq!(QualityMode::Fast.encode_quality().crf, 28);
        assert_eq!(QualityMode::Fast.encode_quality().preset, "veryfast");
    }

    #[test]
    fn test_thresholds_tighten_with_quality() {
        for pair in QualityMode::ALL.windows(2) {
            assert!(pair[0].embed_match_threshold() < pair[1].embed_match_threshold());
            assert!(pair[0].spatial_match_threshold() < pair[1].spatial_match_threshold());
            assert!(pair[0].gallery_cap() <= pair[1].gallery_cap());
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let m: QualityMode = serde_json::from_str("\"best\"").unwrap();
        assert_eq!(m, QualityMode::Best);
        assert_eq!(serde_json::to_string(&QualityMode::Fast).unwrap(), "\"fast\"");
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("ultra".parse::<QualityMode>().is_err());
        assert_eq!("balanced".parse::<QualityMode>().unwrap(), QualityMode::Balanced);
    }
}
