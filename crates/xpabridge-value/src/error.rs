use crate::types::TypeCode;

/// Errors from host value conversion and marshaling.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A byte length that is negative or inconsistent with its source.
    #[error("invalid string length {0}")]
    InvalidLength(i64),

    /// An array type with no binary representation.
    #[error("invalid array type {0}")]
    Unsupported(TypeCode),
}

pub type Result<T> = std::result::Result<T, ValueError>;
