use crate::cash_call::CashCallStatus;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(String),
    // deliberately carries no reason; denial messages must not reveal
    // whether (or why) a record exists
    #[error("operation not permitted")]
    Forbidden,
    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition {
        from: CashCallStatus,
        to: CashCallStatus,
    },
    #[error("cash call not found")]
    NotFound,
    #[error("record store failure: {0}")]
    Store(#[from] sled::Error),
    #[error("codec failure: {0}")]
    Codec(String),
}

impl From<minicbor::decode::Error> for EngineError {
    fn from(err: minicbor::decode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for EngineError {
    fn from(err: minicbor::encode::Error<E>) -> Self {
        Self::Codec(err.to_string())
    }
}
