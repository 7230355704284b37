//! Rotated BRIEF descriptors.
//!
//! A descriptor is 256 intensity comparisons between point pairs drawn once
//! from a fixed-seed generator inside the keypoint's patch disc. The pairs
//! are rotated by the keypoint orientation and sampled bilinearly on a
//! smoothed copy of the level image.

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use locate_core::{Descriptor, Keypoint};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

const DESCRIPTOR_SIZE: usize = 32;

/// Number of point-pair comparisons, one bit each
pub const DESCRIPTOR_BITS: usize = DESCRIPTOR_SIZE * 8;

/// Seed of the sampling pattern; changing it invalidates stored descriptors
const PATTERN_SEED: u64 = 0x0b1e_f5ee_d000_0256;

/// One comparison: offsets (dx1, dy1) and (dx2, dy2) relative to the keypoint
type PointPair = (i32, i32, i32, i32);

#[derive(Debug, Clone)]
pub struct BriefGenerator {
    pairs: Vec<PointPair>,
    blur_sigma: f32,
}

impl BriefGenerator {
    /// Build the sampling pattern for `patch_size` patches.
    ///
    /// Every offset lies within a disc of radius `patch_size / 2`, so the
    /// pattern stays inside the patch at any rotation.
    pub fn new(patch_size: usize, blur_sigma: f32) -> Self {
        Self {
            pairs: Self::sampling_pattern(patch_size),
            blur_sigma,
        }
    }

    fn sampling_pattern(patch_size: usize) -> Vec<PointPair> {
        let half = (patch_size / 2).max(1) as i32;
        let radius_sq = half * half;
        let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
        let mut point = move || loop {
            let dx = rng.gen_range(-half..=half);
            let dy = rng.gen_range(-half..=half);
            if dx * dx + dy * dy <= radius_sq {
                return (dx, dy);
            }
        };

        let mut pairs = Vec::with_capacity(DESCRIPTOR_BITS);
        while pairs.len() < DESCRIPTOR_BITS {
            let (dx1, dy1) = point();
            let (dx2, dy2) = point();
            if (dx1, dy1) != (dx2, dy2) {
                pairs.push((dx1, dy1, dx2, dy2));
            }
        }
        pairs
    }

    pub fn pairs(&self) -> &[PointPair] {
        &self.pairs
    }

    /// Smoothed copy of a level image, or a plain copy when smoothing is off
    pub fn smooth(&self, img: &GrayImage) -> GrayImage {
        if self.blur_sigma > 0.0 && img.width() > 0 && img.height() > 0 {
            gaussian_blur_f32(img, self.blur_sigma)
        } else {
            img.clone()
        }
    }

    /// Describe keypoints given in the coordinates of `img`.
    ///
    /// `img` is expected to be already smoothed (see [`Self::smooth`]); the
    /// output is index-aligned with `kps`.
    pub fn generate_descriptors(&self, img: &GrayImage, kps: &[Keypoint]) -> Vec<Descriptor> {
        trace!(
            "BRIEF: describing {} keypoints on a {}x{} image",
            kps.len(),
            img.width(),
            img.height()
        );
        kps.par_iter().map(|kp| self.describe(img, kp)).collect()
    }

    fn describe(&self, img: &GrayImage, kp: &Keypoint) -> Descriptor {
        let (s, c) = kp.angle.sin_cos();
        let (cx, cy) = (kp.x, kp.y);
        let rotate = |dx: i32, dy: i32| {
            let (dx, dy) = (dx as f32, dy as f32);
            (cx + c * dx - s * dy, cy + s * dx + c * dy)
        };

        let mut d = [0u8; DESCRIPTOR_SIZE];
        for (i, &(dx1, dy1, dx2, dy2)) in self.pairs.iter().enumerate() {
            let (x1, y1) = rotate(dx1, dy1);
            let (x2, y2) = rotate(dx2, dy2);
            let bit = (bilinear_sample(img, x1, y1) < bilinear_sample(img, x2, y2)) as u8;
            d[i / 8] |= bit << (i % 8);
        }
        d
    }
}

/// Bilinear interpolation for subpixel sampling, clamped at the image edge
fn bilinear_sample(img: &GrayImage, x: f32, y: f32) -> f32 {
    let w = img.width() as usize;
    let h = img.height() as usize;
    let data = img.as_raw();

    let x0 = x.floor();
    let y0 = y.floor();
    if x0 < 0.0 || y0 < 0.0 || x0 + 1.0 >= w as f32 || y0 + 1.0 >= h as f32 {
        let cx = x.round().clamp(0.0, (w - 1) as f32) as usize;
        let cy = y.round().clamp(0.0, (h - 1) as f32) as usize;
        return data[cy * w + cx] as f32;
    }

    let dx = x - x0;
    let dy = y - y0;
    let (x0, y0) = (x0 as usize, y0 as usize);

    let p00 = data[y0 * w + x0] as f32;
    let p10 = data[y0 * w + x0 + 1] as f32;
    let p01 = data[(y0 + 1) * w + x0] as f32;
    let p11 = data[(y0 + 1) * w + x0 + 1] as f32;

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

/// Number of differing bits between two descriptors
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}
