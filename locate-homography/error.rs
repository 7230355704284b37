use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocalizeError {
    #[error("too few matches: found {found}, need at least {required}")]
    TooFewMatches { found: usize, required: usize },
    #[error("match {index} refers to keypoints ({query_idx}, {train_idx}) that do not exist")]
    InvalidMatchIndex {
        index: usize,
        query_idx: usize,
        train_idx: usize,
    },
    #[error("degenerate homography: {0}")]
    Degenerate(String),
    #[error("invalid localizer configuration: {0}")]
    InvalidConfig(String),
}

pub type LocalizeResult<T> = Result<T, LocalizeError>;
