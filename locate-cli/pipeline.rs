use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use locate_core::init_thread_pool;
use locate_homography::{Localizer, SceneCorners};
use locate_match::BruteForceMatcher;
use log::{debug, info, warn};
use nalgebra::Point2;

use crate::config::PipelineConfig;
use crate::error::{ConfigError, LocateError, LocateResult};
use crate::extractor::FeatureExtractor;
use crate::loader::{load_rgb, save_rgb, to_gray};

/// Radius of the center marker, in pixels
pub const MARKER_RADIUS: i32 = 10;
pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Outcome of one successful localization
#[derive(Debug, Clone)]
pub struct Detection {
    pub corners: SceneCorners,
    pub center: Point2<f64>,
    pub target_keypoints: usize,
    pub scene_keypoints: usize,
    pub matches: usize,
    pub inliers: usize,
}

/// Input and output paths of a run
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub target: PathBuf,
    pub frame: PathBuf,
    pub output: PathBuf,
}

/// Extract, match and localize with fixed settings
#[derive(Debug, Clone)]
pub struct Locator {
    extractor: FeatureExtractor,
    matcher: BruteForceMatcher,
    localizer: Localizer,
}

impl Locator {
    /// Validate `cfg` and build every stage.
    ///
    /// Work runs on the current rayon pool; `extractor.n_threads` is only
    /// applied by [`run`], which sizes the global pool.
    pub fn new(cfg: PipelineConfig) -> LocateResult<Self> {
        cfg.validate()?;
        let invalid = |e: &dyn std::fmt::Display| ConfigError::Invalid(e.to_string());
        Ok(Self {
            extractor: FeatureExtractor::new(cfg.extractor).map_err(|e| invalid(&e))?,
            matcher: BruteForceMatcher::new(cfg.matcher).map_err(|e| invalid(&e))?,
            localizer: Localizer::new(cfg.localizer)?,
        })
    }

    /// Find `target` inside `scene`
    pub fn locate(&self, target: &RgbImage, scene: &RgbImage) -> LocateResult<Detection> {
        let extract = |img: &RgbImage, name: &str| {
            self.extractor
                .extract(&to_gray(img))
                .map_err(|source| LocateError::FeatureExtraction {
                    image: name.to_string(),
                    source,
                })
        };
        let target_features = extract(target, "target")?;
        let scene_features = extract(scene, "scene")?;
        debug!(
            "features: {} in target, {} in scene",
            target_features.len(),
            scene_features.len()
        );

        let matches = self
            .matcher
            .match_descriptors(target_features.descriptors(), scene_features.descriptors());

        let localization = self.localizer.localize(
            target_features.keypoints(),
            scene_features.keypoints(),
            &matches,
            target.dimensions(),
        )?;

        Ok(Detection {
            corners: localization.corners,
            center: localization.center,
            target_keypoints: target_features.len(),
            scene_keypoints: scene_features.len(),
            matches: matches.len(),
            inliers: localization.inlier_count,
        })
    }
}

/// Filled red circle at the rounded center; parts outside the image are clipped
pub fn draw_marker(img: &mut RgbImage, center: Point2<f64>) {
    if !(center.x.is_finite() && center.y.is_finite()) {
        return;
    }
    let margin = (MARKER_RADIUS + 1) as f64;
    let x = center.x.round().clamp(-margin, img.width() as f64 + margin) as i32;
    let y = center.y.round().clamp(-margin, img.height() as f64 + margin) as i32;
    draw_filled_circle_mut(img, (x, y), MARKER_RADIUS, MARKER_COLOR);
}

/// Load both images, locate the target, mark its center and write the scene.
///
/// Nothing is written unless every earlier stage succeeded. The global
/// rayon pool is sized from the first call's `extractor.n_threads`; later
/// calls reuse it.
pub fn run(args: &RunArgs, cfg: PipelineConfig) -> LocateResult<Detection> {
    let n_threads = cfg.extractor.n_threads;
    let locator = Locator::new(cfg)?;
    if !init_thread_pool(n_threads) {
        warn!("global thread pool already exists, n_threads = {n_threads} is not applied");
    }
    let target = load_rgb(&args.target)?;
    let mut scene = load_rgb(&args.frame)?;

    let detection = locator.locate(&target, &scene)?;
    info!(
        "target found at ({:.2}, {:.2}): {} matches, {} inliers",
        detection.center.x, detection.center.y, detection.matches, detection.inliers
    );

    draw_marker(&mut scene, detection.center);
    save_rgb(&scene, &args.output)?;
    Ok(detection)
}
