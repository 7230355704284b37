//! Locate a planar target image inside a scene image.
//!
//! The pipeline extracts oriented FAST keypoints with rotated BRIEF
//! descriptors from both images, matches them by Hamming distance with a
//! ratio test, fits a target-to-scene homography with RANSAC and projects
//! the target's center into the scene.

pub mod config;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{ConfigError, LocateError, LocateResult};
pub use extractor::FeatureExtractor;
pub use loader::{load_rgb, save_rgb, to_gray};
pub use pipeline::{draw_marker, run, Detection, Locator, RunArgs, MARKER_COLOR, MARKER_RADIUS};

pub use locate_core::{ExtractorConfig, Features, Keypoint, Match, ScoreType};
pub use locate_homography::{LocalizerConfig, SceneCorners};
pub use locate_match::MatcherConfig;
