/// Domain-specific error types for the backtest engine.
///
/// Malformed configuration and shape disagreements are rejected eagerly, at
/// the entry of a call, before any computation starts. Numeric degeneracies
/// with a defined sentinel (zero standard deviation, zero drawdown) are NOT
/// errors -- each metric resolves them locally to 0.0 or a documented ±inf.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("numeric failure: {0}")]
    Numeric(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
