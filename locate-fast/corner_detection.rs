use image::GrayImage;
use locate_core::ScoreType;
use rayon::prelude::*;

use crate::types::{CornerType, ScoredKeypoint};
use crate::utils::has_consecutive_bits;

/// Contiguous arc length required by the FAST-9/16 segment test
const ARC_LENGTH: usize = 9;

/// Corner detection algorithms (FAST segment test, FAST and Harris scores)
pub struct CornerDetector;

impl CornerDetector {
    /// FAST circle offsets for corner detection, in circle order
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Detect and score corners on one level image.
    ///
    /// Only pixels at least `border` away from every edge are tested. Rows are
    /// processed in parallel; the output is in row-major order.
    pub fn detect(
        img: &GrayImage,
        border: usize,
        threshold: u8,
        score: ScoreType,
    ) -> Vec<ScoredKeypoint> {
        let width = img.width() as usize;
        let height = img.height() as usize;
        let border = border.max(3);
        if width <= 2 * border || height <= 2 * border {
            return Vec::new();
        }
        let data = img.as_raw();

        (border..height - border)
            .into_par_iter()
            .flat_map_iter(|y| {
                (border..width - border).filter_map(move |x| {
                    match Self::segment_test(data, width, x, y, threshold) {
                        CornerType::None => None,
                        _ => {
                            let response = match score {
                                ScoreType::Fast => {
                                    Self::compute_intensity_response(data, width, x, y, threshold)
                                }
                                ScoreType::Harris => {
                                    Self::compute_harris_response(data, width, height, x, y)
                                }
                            };
                            Some(ScoredKeypoint { x, y, response })
                        }
                    }
                })
            })
            .collect()
    }

    /// FAST-9/16 segment test at (x, y); caller guarantees a 3 pixel margin
    pub(crate) fn segment_test(
        data: &[u8],
        width: usize,
        x: usize,
        y: usize,
        threshold: u8,
    ) -> CornerType {
        let center = data[y * width + x] as i32;
        let t = threshold as i32;
        let at = |i: usize| {
            let (dx, dy) = Self::FAST_OFFSETS[i];
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            data[py * width + px] as i32
        };

        // Any 9-pixel arc covers at least two of the four cardinal pixels
        let cardinals = [at(0), at(4), at(8), at(12)];
        let bright = cardinals.iter().filter(|&&p| p > center + t).count();
        let dark = cardinals.iter().filter(|&&p| p < center - t).count();
        if bright < 2 && dark < 2 {
            return CornerType::None;
        }

        let mut bright_mask = 0u16;
        let mut dark_mask = 0u16;
        for i in 0..16 {
            let p = at(i);
            if p > center + t {
                bright_mask |= 1 << i;
            } else if p < center - t {
                dark_mask |= 1 << i;
            }
        }

        if has_consecutive_bits(bright_mask, ARC_LENGTH) {
            CornerType::Bright
        } else if has_consecutive_bits(dark_mask, ARC_LENGTH) {
            CornerType::Dark
        } else {
            CornerType::None
        }
    }

    /// Mean squared contrast of the circle pixels beyond the threshold
    fn compute_intensity_response(
        data: &[u8],
        width: usize,
        x: usize,
        y: usize,
        threshold: u8,
    ) -> f32 {
        let center = data[y * width + x] as f32;
        let mut sum_diff = 0.0f32;
        let mut count = 0;

        for &(dx, dy) in Self::FAST_OFFSETS.iter() {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let diff = (center - data[py * width + px] as f32).abs();
            if diff > threshold as f32 {
                sum_diff += diff * diff;
                count += 1;
            }
        }

        if count > 0 {
            sum_diff / count as f32
        } else {
            0.0
        }
    }

    /// Harris corner response at a pixel: det(M) - k * trace(M)^2 over a 5x5 window
    pub fn compute_harris_response(
        data: &[u8],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
    ) -> f32 {
        if x < 3 || y < 3 || x + 3 >= width || y + 3 >= height {
            return 0.0;
        }

        let mut ixx = 0.0f64;
        let mut ixy = 0.0f64;
        let mut iyy = 0.0f64;

        for ny in y - 2..=y + 2 {
            for nx in x - 2..=x + 2 {
                let (gx, gy) = Self::compute_gradients(data, width, nx, ny);
                ixx += (gx * gx) as f64;
                ixy += (gx * gy) as f64;
                iyy += (gy * gy) as f64;
            }
        }

        let k = 0.04f64;
        let det = ixx * iyy - ixy * ixy;
        let trace = ixx + iyy;
        let harris_response = det - k * trace * trace;

        if harris_response > 0.0 {
            harris_response as f32
        } else {
            0.0
        }
    }

    /// Sobel gradients, scaled by 1/8; caller guarantees a 1 pixel margin
    fn compute_gradients(data: &[u8], width: usize, x: usize, y: usize) -> (f32, f32) {
        let p = |xx: usize, yy: usize| data[yy * width + xx] as f32;

        let gx = p(x + 1, y - 1) + 2.0 * p(x + 1, y) + p(x + 1, y + 1)
            - p(x - 1, y - 1)
            - 2.0 * p(x - 1, y)
            - p(x - 1, y + 1);

        let gy = p(x - 1, y + 1) + 2.0 * p(x, y + 1) + p(x + 1, y + 1)
            - p(x - 1, y - 1)
            - 2.0 * p(x, y - 1)
            - p(x + 1, y - 1);

        (gx / 8.0, gy / 8.0)
    }
}
