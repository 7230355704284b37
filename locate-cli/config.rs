use locate_core::ExtractorConfig;
use locate_fast::validate_config;
use locate_homography::LocalizerConfig;
use locate_match::MatcherConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

use crate::error::ConfigError;

/// Settings of every pipeline stage
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub extractor: ExtractorConfig,
    pub matcher: MatcherConfig,
    pub localizer: LocalizerConfig,
}

impl PipelineConfig {
    /// Check all stages
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(&self.extractor)
            .map_err(|e| ConfigError::Invalid(format!("extractor: {e}")))?;
        self.matcher
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("matcher: {e}")))?;
        self.localizer
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("localizer: {e}")))?;
        Ok(())
    }

    /// Generate a one-line summary of the configuration
    pub fn summary(&self) -> String {
        let e = &self.extractor;
        format!(
            "threshold={}, levels={}x{:.2}, patch={}, max_features={}, ratio={:.2}, cross_check={}, ransac={:.1}px/{}",
            e.fast_threshold,
            e.n_levels,
            e.scale_factor,
            e.patch_size,
            e.max_features,
            self.matcher.ratio,
            self.matcher.cross_check,
            self.localizer.reproj_threshold,
            self.localizer.max_iterations
        )
    }
}

#[cfg(feature = "serde")]
impl PipelineConfig {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a `.json` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;
        match format {
            Format::Json => Self::from_json(&content),
            Format::Toml => Self::from_toml(&content),
        }
    }

    /// Write to a `.json` or `.toml` file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = match Format::of(path)? {
            Format::Json => self.to_json()?,
            Format::Toml => self.to_toml()?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
enum Format {
    Json,
    Toml,
}

#[cfg(feature = "serde")]
impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}
