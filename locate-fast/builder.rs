use locate_core::{ExtractorConfig, ScoreType};

use crate::detector::{validate_config, FastDetector};
use crate::error::FastResult;

/// Fluent builder for an [`ExtractorConfig`]
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    config: ExtractorConfig,
}

impl ExtractorBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Set the FAST contrast threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.fast_threshold = threshold;
        self
    }

    /// Set the number of pyramid levels
    pub fn levels(mut self, n_levels: usize) -> Self {
        self.config.n_levels = n_levels;
        self
    }

    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.config.scale_factor = scale_factor;
        self
    }

    /// Set the patch size used for orientation and descriptors
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.config.patch_size = patch_size;
        self
    }

    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    pub fn score(mut self, score: ScoreType) -> Self {
        self.config.score = score;
        self
    }

    /// Set the smoothing applied before descriptor sampling (0 disables it)
    pub fn blur_sigma(mut self, sigma: f32) -> Self {
        self.config.blur_sigma = sigma;
        self
    }

    /// Set the number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Few, strong features on a short pyramid
    pub fn preset_fast(mut self) -> Self {
        self.config.fast_threshold = 30;
        self.config.n_levels = 4;
        self.config.max_features = 300;
        self.config.score = ScoreType::Fast;
        self
    }

    /// The documented defaults
    pub fn preset_balanced(mut self) -> Self {
        let n_threads = self.config.n_threads;
        self.config = ExtractorConfig {
            n_threads,
            ..ExtractorConfig::default()
        };
        self
    }

    /// Low threshold, fine scale steps and Harris ranking
    pub fn preset_precise(mut self) -> Self {
        self.config.fast_threshold = 12;
        self.config.n_levels = 12;
        self.config.scale_factor = 1.15;
        self.config.max_features = 1500;
        self.config.score = ScoreType::Harris;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> FastResult<ExtractorConfig> {
        validate_config(&self.config)?;
        Ok(self.config)
    }

    /// Validate and build a detector
    pub fn build_detector(self) -> FastResult<FastDetector> {
        FastDetector::new(self.config)
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        let c = &self.config;
        format!(
            "Extractor: threshold={}, levels={}, scale_factor={:.2}, patch={}, max_features={}, score={:?}, blur_sigma={:.1}, threads={}",
            c.fast_threshold,
            c.n_levels,
            c.scale_factor,
            c.patch_size,
            c.max_features,
            c.score,
            c.blur_sigma,
            c.n_threads
        )
    }
}
