#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LocalizeError, LocalizeResult};

/// Fewest correspondences a homography can be solved from
pub const MIN_SAMPLE: usize = 4;

/// RANSAC and acceptance settings of the localizer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocalizerConfig {
    /// Maximum forward reprojection error of an inlier, in scene pixels
    pub reproj_threshold: f64,
    pub max_iterations: usize,
    /// Probability of drawing at least one all-inlier sample, drives early stop
    pub confidence: f64,
    /// Matches required before estimating; values below 4 act as 4
    pub min_matches: usize,
    pub seed: u64,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            reproj_threshold: 3.0,
            max_iterations: 2000,
            confidence: 0.995,
            min_matches: MIN_SAMPLE,
            seed: 0x5eed_1a7e,
        }
    }
}

impl LocalizerConfig {
    /// Effective match count required by [`crate::Localizer::localize`]
    pub fn required_matches(&self) -> usize {
        self.min_matches.max(MIN_SAMPLE)
    }

    pub fn validate(&self) -> LocalizeResult<()> {
        if !self.reproj_threshold.is_finite() || self.reproj_threshold <= 0.0 {
            return Err(LocalizeError::InvalidConfig(format!(
                "reproj_threshold must be finite and > 0, got {}",
                self.reproj_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(LocalizeError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(LocalizeError::InvalidConfig(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}
