use thiserror::Error;

/// The metric source could not produce a value for a block.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    #[error("value {0} does not fit in 128 bits")]
    Overflow(String),

    #[error("degenerate pool: {0}")]
    Degenerate(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cToken market: {0}")]
pub struct UnknownCToken(pub String);
