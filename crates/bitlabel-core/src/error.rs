//! Typed errors for identifier and format parsing

use thiserror::Error;

/// Errors raised while interpreting caller-supplied strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A recognized modifier prefix whose remainder is not a
    /// non-negative integer.
    #[error("invalid modifier segment \"{0}\": expected a non-negative integer suffix")]
    InvalidModifier(String),
    /// An output format string other than `bbox` or `center`.
    #[error("unknown output format \"{0}\"")]
    UnknownFormat(String),
}
