#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key-point ≙ FAST corner + orientation (radians), in level-0 pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the described patch, in level-0 pixels
    pub size: f32,
    pub angle: f32,
    pub response: f32,
    /// Pyramid level the keypoint was detected on
    pub octave: u8,
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

/// Keypoints of one image with their index-aligned descriptors.
///
/// The two sequences always have the same length; the constructors refuse
/// anything else.
#[derive(Debug, Clone, Default)]
pub struct Features {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl Features {
    /// Pair up keypoints and descriptors; `None` if their lengths differ.
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> Option<Self> {
        if keypoints.len() != descriptors.len() {
            return None;
        }
        Some(Self {
            keypoints,
            descriptors,
        })
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Keypoint, Descriptor)>,
    {
        let (keypoints, descriptors) = pairs.into_iter().unzip();
        Self {
            keypoints,
            descriptors,
        }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn into_parts(self) -> (Vec<Keypoint>, Vec<Descriptor>) {
        (self.keypoints, self.descriptors)
    }
}

/// Correspondence between a query (target) descriptor and a train (scene) descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    /// Hamming distance between the two descriptors
    pub distance: u32,
}

/// Corner score used to rank FAST detections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScoreType {
    /// Mean squared contrast of the circle pixels that pass the segment test
    #[default]
    Fast,
    /// Harris corner measure over a 5x5 gradient window
    Harris,
}

/// Feature extractor configuration.
///
/// Defaults follow the usual ORB settings: FAST threshold 20, 8 pyramid
/// levels at a 1.2 scale step, 31 pixel patches and at most 500 features.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtractorConfig {
    /// Contrast threshold of the FAST segment test (1-127)
    pub fast_threshold: u8,
    /// Number of pyramid levels, level 0 included
    pub n_levels: usize,
    /// Size ratio between two consecutive pyramid levels (> 1)
    pub scale_factor: f32,
    /// Odd side of the oriented patch used for orientation and descriptors
    pub patch_size: usize,
    /// Maximum number of keypoints kept per image, strongest first
    pub max_features: usize,
    pub score: ScoreType,
    /// Gaussian sigma applied before descriptor sampling, 0 disables smoothing
    pub blur_sigma: f32,
    pub n_threads: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            n_levels: 8,
            scale_factor: 1.2,
            patch_size: 31,
            max_features: 500,
            score: ScoreType::Fast,
            blur_sigma: 2.0,
            n_threads: num_cpus::get().max(1),
        }
    }
}

impl ExtractorConfig {
    /// Radius of the smoothing kernel support, in pixels
    pub fn blur_radius(&self) -> usize {
        if self.blur_sigma > 0.0 {
            (3.0 * self.blur_sigma).ceil() as usize
        } else {
            0
        }
    }

    /// Distance from the image edge below which no keypoint is detected.
    ///
    /// Every pixel read while scoring, orienting or describing a keypoint
    /// (smoothing support included) lies inside the image.
    pub fn border(&self) -> usize {
        let half = self.patch_size / 2;
        (half + self.blur_radius() + 1).max(4)
    }
}

/// Initialize the global Rayon pool with the specified number of threads.
///
/// Returns `false` when a global pool already exists; it is reused as is.
pub fn init_thread_pool(n_threads: usize) -> bool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .is_ok()
}
