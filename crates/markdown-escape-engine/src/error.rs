use thiserror::Error;

/// Errors raised while resolving an escaper for a (context, dialect) pair.
///
/// The character-level algorithms themselves never fail; these only come
/// out of [`EscaperFactory::create_escaper`](crate::EscaperFactory::create_escaper).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("No escaper available for context \"{context}\"")]
    UnsupportedContext { context: String },

    #[error("Dialect \"{dialect}\" is not supported by escaper for context \"{context}\"")]
    UnsupportedDialect { dialect: String, context: String },

    /// URL decomposition failed after the text passed the validity check.
    /// The URL escaper degrades to returning its input; this never reaches callers.
    #[error("Malformed {context} input: {reason}")]
    MalformedInput { context: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_context_message() {
        let err = EscapeError::UnsupportedContext {
            context: "unsupported".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No escaper available for context \"unsupported\""
        );
    }

    #[test]
    fn unsupported_dialect_message() {
        let err = EscapeError::UnsupportedDialect {
            dialect: "commonmark".to_string(),
            context: "test_context".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Dialect \"commonmark\" is not supported by escaper for context \"test_context\""
        );
    }
}
