use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("invalid ratio {0} (must be in (0, 1])")]
    InvalidRatio(f32),
    #[error("k must be at least 1")]
    InvalidK,
}

pub type MatchResult<T> = Result<T, MatchError>;
