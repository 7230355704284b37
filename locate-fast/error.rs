use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FastError {
    #[error("invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("invalid patch size {0} (must be odd and at least 7)")]
    InvalidPatchSize(usize),
    #[error("invalid scale factor {0} (must be finite and > 1)")]
    InvalidScaleFactor(f32),
    #[error("invalid pyramid level count {0} (must be 1-32)")]
    InvalidLevelCount(usize),
    #[error("invalid blur sigma {0} (must be finite and >= 0)")]
    InvalidBlurSigma(f32),
    #[error("max_features must be > 0")]
    InvalidMaxFeatures,
    #[error("image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
}

pub type FastResult<T> = Result<T, FastError>;
