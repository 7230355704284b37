use image::GrayImage;
use locate_core::{ExtractorConfig, Keypoint};
use log::debug;
use rayon::prelude::*;

use crate::corner_detection::CornerDetector;
use crate::error::{FastError, FastResult};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::{PyramidKeypoint, ScaleLevel};

/// Check an extractor configuration without building a detector
pub fn validate_config(cfg: &ExtractorConfig) -> FastResult<()> {
    // 0 would detect everything, >127 could overflow the u8 contrast test
    if cfg.fast_threshold == 0 || cfg.fast_threshold > 127 {
        return Err(FastError::InvalidThreshold(cfg.fast_threshold));
    }
    if cfg.patch_size % 2 == 0 || cfg.patch_size < 7 {
        return Err(FastError::InvalidPatchSize(cfg.patch_size));
    }
    if !cfg.scale_factor.is_finite() || cfg.scale_factor <= 1.0 {
        return Err(FastError::InvalidScaleFactor(cfg.scale_factor));
    }
    if cfg.n_levels == 0 || cfg.n_levels > 32 {
        return Err(FastError::InvalidLevelCount(cfg.n_levels));
    }
    if !cfg.blur_sigma.is_finite() || cfg.blur_sigma < 0.0 {
        return Err(FastError::InvalidBlurSigma(cfg.blur_sigma));
    }
    if cfg.max_features == 0 {
        return Err(FastError::InvalidMaxFeatures);
    }
    Ok(())
}

/// Multi-scale FAST corner detector.
///
/// Holds only its configuration, so one detector serves images of any size.
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: ExtractorConfig,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: ExtractorConfig) -> FastResult<Self> {
        validate_config(&cfg)?;
        Ok(Self { cfg })
    }

    /// Get detector configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.cfg
    }

    /// Smallest level side that still leaves pixels to test
    pub fn min_level_size(&self) -> usize {
        2 * self.cfg.border() + 1
    }

    /// Scale levels used for an image of the given size
    pub fn scale_levels(&self, width: usize, height: usize) -> Vec<ScaleLevel> {
        ImagePyramid::generate_scale_levels(
            width,
            height,
            self.cfg.n_levels,
            self.cfg.scale_factor,
            self.min_level_size(),
        )
    }

    pub fn build_pyramid(&self, img: &GrayImage) -> FastResult<ImagePyramid> {
        let expected_len = img.width() as usize * img.height() as usize;
        if img.as_raw().len() != expected_len {
            return Err(FastError::InvalidImageData {
                expected_len,
                actual_len: img.as_raw().len(),
            });
        }
        let levels = self.scale_levels(img.width() as usize, img.height() as usize);
        Ok(ImagePyramid::build(img, &levels))
    }

    /// Detect keypoints on every pyramid level.
    ///
    /// Results are merged across levels, ordered strongest first (ties broken
    /// by level, then row, then column) and capped at `max_features`.
    pub fn detect_in_pyramid(&self, pyramid: &ImagePyramid) -> Vec<PyramidKeypoint> {
        let (base_w, base_h) = pyramid.base_dimensions();
        let border = self.cfg.border();

        let per_level: Vec<Vec<PyramidKeypoint>> = pyramid
            .levels()
            .par_iter()
            .map(|(scale_level, level_img)| {
                let corners = CornerDetector::detect(
                    level_img,
                    border,
                    self.cfg.fast_threshold,
                    self.cfg.score,
                );
                let kept = KeypointRefinement::non_maximum_suppression(
                    &corners,
                    scale_level.width,
                    scale_level.height,
                );

                kept.into_iter()
                    .map(|c| {
                        let (x, y) = scale_level.to_base(c.x, c.y, (base_w, base_h));
                        PyramidKeypoint {
                            keypoint: Keypoint {
                                x,
                                y,
                                size: self.cfg.patch_size as f32 * scale_level.scale,
                                angle: KeypointRefinement::compute_orientation(
                                    level_img,
                                    c.x,
                                    c.y,
                                    self.cfg.patch_size,
                                ),
                                response: c.response,
                                octave: scale_level.level as u8,
                            },
                            level_x: c.x,
                            level_y: c.y,
                        }
                    })
                    .collect()
            })
            .collect();

        let mut all: Vec<PyramidKeypoint> = per_level.into_iter().flatten().collect();
        let detected = all.len();
        all.sort_by(|a, b| {
            b.keypoint
                .response
                .total_cmp(&a.keypoint.response)
                .then(a.keypoint.octave.cmp(&b.keypoint.octave))
                .then(a.level_y.cmp(&b.level_y))
                .then(a.level_x.cmp(&b.level_x))
        });
        all.truncate(self.cfg.max_features);

        debug!(
            "FAST: {} levels, {} corners after NMS, {} kept",
            pyramid.len(),
            detected,
            all.len()
        );
        all
    }

    /// Detect keypoints in level-0 coordinates
    pub fn detect_keypoints(&self, img: &GrayImage) -> FastResult<Vec<Keypoint>> {
        let pyramid = self.build_pyramid(img)?;
        Ok(self
            .detect_in_pyramid(&pyramid)
            .into_iter()
            .map(|pk| pk.keypoint)
            .collect())
    }
}
