use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::types::ScaleLevel;

/// Image pyramid for multi-scale feature detection
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<(ScaleLevel, GrayImage)>,
}

impl ImagePyramid {
    /// Generate scale levels for an image of the given size.
    ///
    /// Level `k` is the input shrunk by `scale_factor^k`. Generation stops
    /// after `n_levels` levels or as soon as a level has a side shorter than
    /// `min_size`, whichever comes first.
    pub fn generate_scale_levels(
        width: usize,
        height: usize,
        n_levels: usize,
        scale_factor: f32,
        min_size: usize,
    ) -> Vec<ScaleLevel> {
        let mut levels = Vec::with_capacity(n_levels);
        let mut current_scale = 1.0f32;

        for level in 0..n_levels {
            let scaled_width = ((width as f32) / current_scale).round() as usize;
            let scaled_height = ((height as f32) / current_scale).round() as usize;

            if scaled_width < min_size || scaled_height < min_size {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });

            current_scale *= scale_factor;
        }

        levels
    }

    /// Build the pyramid; every level is resampled from the base image
    pub fn build(img: &GrayImage, scale_levels: &[ScaleLevel]) -> Self {
        let levels = scale_levels
            .iter()
            .map(|scale_level| {
                let level_img = if scale_level.level == 0 {
                    img.clone()
                } else {
                    imageops::resize(
                        img,
                        scale_level.width as u32,
                        scale_level.height as u32,
                        FilterType::Triangle,
                    )
                };
                (*scale_level, level_img)
            })
            .collect();

        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&(ScaleLevel, GrayImage)> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[(ScaleLevel, GrayImage)] {
        &self.levels
    }

    /// Width and height of the base level, (0, 0) for an empty pyramid
    pub fn base_dimensions(&self) -> (usize, usize) {
        self.levels
            .first()
            .map(|(s, _)| (s.width, s.height))
            .unwrap_or((0, 0))
    }
}
