use locate_core::{Keypoint, Match};
use log::{debug, warn};
use nalgebra::{Point2, Vector2};

use crate::config::LocalizerConfig;
use crate::error::{LocalizeError, LocalizeResult};
use crate::homography::Homography;
use crate::ransac::estimate_ransac;

/// The target's bounding box mapped into the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCorners {
    pub top_left: Point2<f64>,
    pub top_right: Point2<f64>,
    pub bottom_right: Point2<f64>,
    pub bottom_left: Point2<f64>,
}

impl SceneCorners {
    /// Corners in clockwise order starting at the top-left one
    pub fn as_array(&self) -> [Point2<f64>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Arithmetic mean of the four corners
    pub fn center(&self) -> Point2<f64> {
        let sum = self
            .as_array()
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }
}

/// Where the target was found
#[derive(Debug, Clone)]
pub struct Localization {
    /// Target-to-scene transform
    pub homography: Homography,
    pub corners: SceneCorners,
    pub center: Point2<f64>,
    /// Inlier flag per match, in match order
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
}

/// Map the corners `(0,0) (w,0) (w,h) (0,h)` of a `width` x `height` target
pub fn project_corners(h: &Homography, (width, height): (u32, u32)) -> LocalizeResult<SceneCorners> {
    let (w, ht) = (width as f64, height as f64);
    let map = |x: f64, y: f64| {
        h.apply(Point2::new(x, y)).ok_or_else(|| {
            LocalizeError::Degenerate(format!("target corner ({x}, {y}) maps to infinity"))
        })
    };
    Ok(SceneCorners {
        top_left: map(0.0, 0.0)?,
        top_right: map(w, 0.0)?,
        bottom_right: map(w, ht)?,
        bottom_left: map(0.0, ht)?,
    })
}

/// Estimates where a target image lies in a scene from matched keypoints
#[derive(Debug, Clone)]
pub struct Localizer {
    cfg: LocalizerConfig,
}

impl Localizer {
    pub fn new(cfg: LocalizerConfig) -> LocalizeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.cfg
    }

    /// Locate the target in the scene.
    ///
    /// `matches` pair target keypoints (`query_idx`) with scene keypoints
    /// (`train_idx`); `target_size` is the target image's width and height.
    pub fn localize(
        &self,
        target_kps: &[Keypoint],
        scene_kps: &[Keypoint],
        matches: &[Match],
        target_size: (u32, u32),
    ) -> LocalizeResult<Localization> {
        let required = self.cfg.required_matches();
        if matches.len() < required {
            return Err(LocalizeError::TooFewMatches {
                found: matches.len(),
                required,
            });
        }

        let mut src = Vec::with_capacity(matches.len());
        let mut dst = Vec::with_capacity(matches.len());
        for (index, m) in matches.iter().enumerate() {
            match (target_kps.get(m.query_idx), scene_kps.get(m.train_idx)) {
                (Some(t), Some(s)) => {
                    src.push(Point2::new(t.x as f64, t.y as f64));
                    dst.push(Point2::new(s.x as f64, s.y as f64));
                }
                _ => {
                    return Err(LocalizeError::InvalidMatchIndex {
                        index,
                        query_idx: m.query_idx,
                        train_idx: m.train_idx,
                    })
                }
            }
        }

        let fit = estimate_ransac(&src, &dst, &self.cfg)?;
        if fit.inlier_count * 4 < matches.len() {
            warn!(
                "only {} of {} matches agree on the homography",
                fit.inlier_count,
                matches.len()
            );
        }

        let corners = project_corners(&fit.homography, target_size)?;
        let center = corners.center();
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(LocalizeError::Degenerate("center is not finite".to_string()));
        }
        debug!(
            "localized {}x{} target: center ({:.2}, {:.2}), {}/{} inliers",
            target_size.0,
            target_size.1,
            center.x,
            center.y,
            fit.inlier_count,
            matches.len()
        );

        Ok(Localization {
            homography: fit.homography,
            corners,
            center,
            inliers: fit.inliers,
            inlier_count: fit.inlier_count,
        })
    }
}

/// One-shot localization with an explicit configuration
pub fn localize(
    target_kps: &[Keypoint],
    scene_kps: &[Keypoint],
    matches: &[Match],
    target_size: (u32, u32),
    cfg: &LocalizerConfig,
) -> LocalizeResult<Localization> {
    Localizer::new(cfg.clone())?.localize(target_kps, scene_kps, matches, target_size)
}
