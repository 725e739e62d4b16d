use thiserror::Error;

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FeltError {
    #[error("Empty field element token")]
    Empty,

    /// The token is neither a decimal nor a `0x`-prefixed hexadecimal number.
    #[error("Invalid field element token '{token}'")]
    InvalidDigit { token: String },
}

pub type FeltResult<T> = Result<T, FeltError>;
