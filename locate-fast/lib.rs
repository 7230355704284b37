//! Multi-scale FAST keypoint detection.
//!
//! The detector builds an image pyramid, runs the FAST-9/16 segment test on
//! every level, keeps 3x3 local maxima of the corner score and orients each
//! survivor by its intensity centroid.

pub mod builder;
pub mod corner_detection;
pub mod detector;
pub mod error;
pub mod pyramid;
pub mod refinement;
pub mod types;
pub mod utils;

pub use builder::ExtractorBuilder;
pub use detector::{validate_config, FastDetector};
pub use error::{FastError, FastResult};
pub use pyramid::ImagePyramid;
pub use types::{PyramidKeypoint, ScaleLevel, ScoredKeypoint};
