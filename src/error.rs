use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SubreviewError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no subtitle at {time}s")]
    NotFound { time: f64 },
    #[error("no {kind} with id '{id}'")]
    UnknownId { kind: &'static str, id: String },
    #[error("{0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SubreviewError>;
