use xpabridge_value::ValueError;

/// Errors surfaced to the host command layer.
///
/// Every variant aborts the current command; no partial result object is
/// ever returned once an error path is taken.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Wrong arity or argument shape for a command or query.
    #[error("{0}")]
    Argument(String),

    /// The persistent connection could not be established or torn down.
    #[error("{0}")]
    Connection(String),

    /// A reply index outside [1, count] after negative-index adjustment.
    #[error("index {index} out of range for {count} replies")]
    Index { index: i64, count: usize },

    /// An array whose element type has no binary representation.
    #[error("{0}")]
    Type(String),

    /// A scatter target whose byte size differs from the payload length.
    #[error("array size is {actual} bytes, payload is {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An unknown by-name query on a reply result.
    #[error("unknown member '{0}'")]
    Attribute(String),

    /// A pending host abort honored before mutating shared state.
    #[error("interrupted")]
    Interrupted,
}

impl From<ValueError> for BridgeError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::InvalidLength(_) => BridgeError::Argument(err.to_string()),
            ValueError::Unsupported(_) => BridgeError::Type(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use xpabridge_value::TypeCode;

    #[test]
    fn value_errors_map_onto_the_taxonomy() {
        let arg: BridgeError = ValueError::InvalidLength(-2).into();
        assert!(matches!(arg, BridgeError::Argument(_)));

        let ty: BridgeError = ValueError::Unsupported(TypeCode::String).into();
        assert!(matches!(ty, BridgeError::Type(_)));
    }

    #[test]
    fn display_forms() {
        let err = BridgeError::Index { index: -4, count: 3 };
        assert_eq!(err.to_string(), "index -4 out of range for 3 replies");

        let err = BridgeError::SizeMismatch { expected: 32, actual: 16 };
        assert_eq!(err.to_string(), "array size is 16 bytes, payload is 32");
    }
}
