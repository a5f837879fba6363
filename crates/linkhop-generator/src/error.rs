use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),
    #[error("invalid code length {0}; expected at least 1")]
    InvalidLength(usize),
}
