use image::GrayImage;

use crate::types::ScoredKeypoint;

/// Keypoint suppression and orientation computation
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// 3x3 non-maximum suppression on one level.
    ///
    /// A corner survives when no 8-neighbour scores higher. Among equal
    /// neighbours the first one in row-major order wins, so a plateau keeps
    /// exactly one point.
    pub fn non_maximum_suppression(
        keypoints: &[ScoredKeypoint],
        width: usize,
        height: usize,
    ) -> Vec<ScoredKeypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0f32; width * height];
        for kp in keypoints {
            scores[kp.y * width + kp.x] = kp.response;
        }

        keypoints
            .iter()
            .filter(|kp| {
                let own = kp.response;
                let idx = kp.y * width + kp.x;
                for ny in kp.y.saturating_sub(1)..=(kp.y + 1).min(height - 1) {
                    for nx in kp.x.saturating_sub(1)..=(kp.x + 1).min(width - 1) {
                        let n_idx = ny * width + nx;
                        if n_idx == idx {
                            continue;
                        }
                        let other = scores[n_idx];
                        if other > own || (other == own && n_idx < idx) {
                            return false;
                        }
                    }
                }
                true
            })
            .copied()
            .collect()
    }

    /// Orientation by intensity centroid over a disc of radius `patch_size / 2`.
    ///
    /// Returns the angle in radians of the vector from (x, y) to the
    /// intensity centroid, 0 for a flat patch. Pixels outside the image are
    /// skipped.
    pub fn compute_orientation(img: &GrayImage, x: usize, y: usize, patch_size: usize) -> f32 {
        let width = img.width() as i64;
        let height = img.height() as i64;
        let data = img.as_raw();
        let half = (patch_size / 2) as i64;
        let radius_sq = half * half;
        let (cx, cy) = (x as i64, y as i64);

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= height {
                continue;
            }
            for dx in -half..=half {
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                let xx = cx + dx;
                if xx < 0 || xx >= width {
                    continue;
                }
                let val = data[(yy * width + xx) as usize] as i64;
                m10 += dx * val;
                m01 += dy * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }
}
