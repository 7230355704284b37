use std::path::PathBuf;

use locate_fast::FastError;
use locate_homography::LocalizeError;
use thiserror::Error;

/// Configuration file and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[cfg(feature = "serde")]
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Invalid(String),
}

/// Pipeline failure, one variant per stage
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("failed to load image {}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write image {}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("feature extraction failed on {image}")]
    FeatureExtraction {
        image: String,
        #[source]
        source: FastError,
    },
    #[error("cannot localize target: {found} matches, at least {required} needed")]
    Localization { found: usize, required: usize },
    #[error("homography is degenerate: {reason}")]
    HomographyDegenerate { reason: String },
    #[error("localization failed")]
    Localize(#[source] LocalizeError),
    #[error("invalid configuration")]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to read configuration {}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

impl From<LocalizeError> for LocateError {
    fn from(err: LocalizeError) -> Self {
        match err {
            LocalizeError::TooFewMatches { found, required } => {
                LocateError::Localization { found, required }
            }
            LocalizeError::Degenerate(reason) => LocateError::HomographyDegenerate { reason },
            LocalizeError::InvalidConfig(msg) => {
                LocateError::InvalidConfig(ConfigError::Invalid(msg))
            }
            other => LocateError::Localize(other),
        }
    }
}

pub type LocateResult<T> = Result<T, LocateError>;
