use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("interaction checker unavailable: {0}")]
    CheckerUnavailable(String),

    #[error("diet plan generation failed: {0}")]
    GenerationFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("determinism violation: {0}")]
    DeterminismViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("time format error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

pub type CoreResult<T> = Result<T, CoreError>;
