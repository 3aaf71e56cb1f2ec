use thiserror::Error;

/// Every way an evaluation can fail.
///
/// None of these are retried: the pipeline stops at the first fault and hands
/// it back to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No grammar rule matches the input at `position` (byte offset in the
    /// preprocessed expression).
    #[error("EXPRESSION Tokenize Error at position {position}")]
    Tokenize { position: usize },

    #[error("Parentheses error: {0}")]
    Parentheses(String),

    #[error("Unknown function or constant: {0}")]
    UnknownSymbol(String),

    /// Stack underflow or leftover operands in the evaluator.
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// Runtime numeric faults: division by zero, empty expression, math domain.
    #[error("{0}")]
    Arithmetic(String),

    #[error("Module not found: {0}")]
    Import(String),

    /// Operand or argument of the wrong kind or count.
    #[error("Type error: {0}")]
    Type(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

impl Error {
    pub fn division_by_zero() -> Self {
        Error::Arithmetic("Division by zero".to_string())
    }

    pub fn empty_expression() -> Self {
        Error::Arithmetic("Empty EXPRESSION".to_string())
    }

    pub fn domain() -> Self {
        Error::Arithmetic("math domain error".to_string())
    }

    pub fn calculation() -> Self {
        Error::Calculation("malformed expression".to_string())
    }

    pub fn type_error<M: Into<String>>(message: M) -> Self {
        Error::Type(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_cli_output() {
        assert_eq!(Error::division_by_zero().to_string(), "Division by zero");
        assert_eq!(Error::empty_expression().to_string(), "Empty EXPRESSION");
        assert_eq!(
            Error::Tokenize { position: 3 }.to_string(),
            "EXPRESSION Tokenize Error at position 3"
        );
        assert_eq!(Error::Import("nope".into()).to_string(), "Module not found: nope");
        assert_eq!(Error::domain().to_string(), "math domain error");
    }
}
