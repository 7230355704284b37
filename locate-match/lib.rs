//! Brute-force descriptor matching.
//!
//! Every query descriptor is compared against every train descriptor by
//! Hamming distance. [`BruteForceMatcher::match_descriptors`] keeps a query's
//! nearest neighbour only when it is clearly better than the second nearest
//! (Lowe's ratio test).

pub mod error;
pub mod matcher;

pub use error::{MatchError, MatchResult};
pub use matcher::{match_descriptors, BruteForceMatcher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Matcher configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatcherConfig {
    /// Nearest neighbour accepted only if `best < ratio * second`
    pub ratio: f32,
    /// Also require the query to be the nearest neighbour of its train descriptor
    pub cross_check: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ratio: 0.75,
            cross_check: false,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> MatchResult<()> {
        if !self.ratio.is_finite() || self.ratio <= 0.0 || self.ratio > 1.0 {
            return Err(MatchError::InvalidRatio(self.ratio));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatcherConfig::default();
        assert_eq!(cfg.ratio, 0.75);
        assert!(!cfg.cross_check);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn ratio_must_be_in_unit_interval() {
        for ratio in [0.0, -0.5, 1.5, f32::NAN] {
            let cfg = MatcherConfig {
                ratio,
                ..MatcherConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(MatchError::InvalidRatio(_))));
        }
        let one = MatcherConfig {
            ratio: 1.0,
            ..MatcherConfig::default()
        };
        assert!(one.validate().is_ok());
    }
}
