use image::GrayImage;
use locate_brief::BriefGenerator;
use locate_core::{Descriptor, ExtractorConfig, Features, Keypoint};
use locate_fast::{FastDetector, FastError, PyramidKeypoint};
use log::{debug, warn};

/// FAST keypoints plus rotated BRIEF descriptors
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    detector: FastDetector,
    brief: BriefGenerator,
}

impl FeatureExtractor {
    pub fn new(cfg: ExtractorConfig) -> Result<Self, FastError> {
        let brief = BriefGenerator::new(cfg.patch_size, cfg.blur_sigma);
        let detector = FastDetector::new(cfg)?;
        Ok(Self { detector, brief })
    }

    pub fn config(&self) -> &ExtractorConfig {
        self.detector.config()
    }

    /// Detect and describe keypoints of one image.
    ///
    /// Each descriptor is sampled on the smoothed pyramid level its keypoint
    /// was found on. Blank images and images smaller than the detection
    /// border yield empty features.
    pub fn extract(&self, img: &GrayImage) -> Result<Features, FastError> {
        let pyramid = self.detector.build_pyramid(img)?;
        let detected = self.detector.detect_in_pyramid(&pyramid);
        if detected.is_empty() {
            warn!(
                "no keypoints found in {}x{} image",
                img.width(),
                img.height()
            );
            return Ok(Features::default());
        }

        let mut descriptors = vec![[0u8; 32]; detected.len()];
        for (level, (_, level_img)) in pyramid.levels().iter().enumerate() {
            let (indices, level_kps): (Vec<usize>, Vec<Keypoint>) = detected
                .iter()
                .enumerate()
                .filter(|(_, pk)| pk.level() == level)
                .map(|(i, pk)| (i, in_level_coordinates(pk)))
                .unzip();
            if level_kps.is_empty() {
                continue;
            }
            let smoothed = self.brief.smooth(level_img);
            let described: Vec<Descriptor> = self.brief.generate_descriptors(&smoothed, &level_kps);
            for (i, d) in indices.into_iter().zip(described) {
                descriptors[i] = d;
            }
        }

        debug!(
            "extracted {} features over {} levels",
            detected.len(),
            pyramid.len()
        );
        Ok(Features::from_pairs(
            detected.into_iter().map(|pk| pk.keypoint).zip(descriptors),
        ))
    }
}

fn in_level_coordinates(pk: &PyramidKeypoint) -> Keypoint {
    Keypoint {
        x: pk.level_x as f32,
        y: pk.level_y as f32,
        ..pk.keypoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn cells(width: u32, height: u32) -> GrayImage {
        const PALETTE: [u8; 5] = [20, 70, 120, 170, 220];
        GrayImage::from_fn(width, height, |x, y| {
            let (i, j) = (x / 10, y / 10);
            Luma([PALETTE[((i * 7 + j * 13 + i * j * 3) % 5) as usize]])
        })
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(ExtractorConfig {
            n_threads: 1,
            ..ExtractorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn blank_image_has_no_features() {
        let features = extractor()
            .extract(&GrayImage::from_pixel(200, 200, Luma([128])))
            .unwrap();
        assert!(features.is_empty());
        assert!(extractor().extract(&GrayImage::new(10, 10)).unwrap().is_empty());
    }

    #[test]
    fn features_are_aligned_and_capped() {
        let ex = FeatureExtractor::new(ExtractorConfig {
            max_features: 40,
            n_threads: 1,
            ..ExtractorConfig::default()
        })
        .unwrap();
        let features = ex.extract(&cells(240, 200)).unwrap();
        assert_eq!(features.len(), 40);
        assert_eq!(features.keypoints().len(), features.descriptors().len());
        for kp in features.keypoints() {
            assert!(kp.x >= 0.0 && kp.x < 240.0);
            assert!(kp.y >= 0.0 && kp.y < 200.0);
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = cells(160, 160);
        let a = extractor().extract(&img).unwrap();
        let b = extractor().extract(&img).unwrap();
        assert_eq!(a.keypoints(), b.keypoints());
        assert_eq!(a.descriptors(), b.descriptors());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ExtractorConfig {
            fast_threshold: 0,
            ..ExtractorConfig::default()
        };
        assert_eq!(
            FeatureExtractor::new(cfg).unwrap_err(),
            FastError::InvalidThreshold(0)
        );
    }
}
