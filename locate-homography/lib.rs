//! Target localization from matched keypoints.
//!
//! A homography from target to scene is estimated with RANSAC over minimal
//! four-point samples and refit on its inliers with the normalized DLT. The
//! target's bounding box is then projected into the scene and the mean of
//! the projected corners taken as the target's center.

pub mod config;
pub mod error;
pub mod homography;
pub mod localize;
pub mod ransac;

pub use config::LocalizerConfig;
pub use error::{LocalizeError, LocalizeResult};
pub use homography::{estimate_dlt, estimate_four_point, Homography};
pub use localize::{localize, project_corners, Localization, Localizer, SceneCorners};
pub use ransac::{estimate_ransac, RansacOutcome};
