use crate::functions::Arity;
use thiserror::Error;

/// Error type for the mathparse crate
///
/// `ParseError` is the only variant produced while compiling an expression.
/// All the others come from evaluation, and leave the compiled expression
/// usable for the next call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Error while parsing an expression, with the byte offset in the input
    #[error("ParseError at position {position}: {message}")]
    ParseError {
        /// What went wrong
        message: String,
        /// Byte offset of the offending input
        position: usize,
    },
    /// Unknown variable during evaluation
    #[error("NameError: name '{0}' is not defined")]
    NameError(String),
    /// Call to a function that is not registered at evaluation time
    #[error("NameError: function '{0}' is not defined")]
    UnknownFunction(String),
    /// Call with the wrong number of arguments
    #[error("ArityError: {function}() takes {expected} argument(s), {found} given")]
    ArityError {
        /// Name of the called function
        function: String,
        /// What the registered function accepts
        expected: Arity,
        /// How many arguments the call site passed
        found: usize,
    },
    /// Operand or argument of the wrong type
    #[error("TypeError: {0}")]
    TypeError(String),
    /// Failure reported by a registered function
    #[error("FunctionError: {function}: {message}")]
    FunctionError {
        /// Name of the failing function
        function: String,
        /// The message returned by the function
        message: String,
    },
}

impl Error {
    pub(crate) fn parse<S: Into<String>>(message: S, position: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            position,
        }
    }

    /// Get the position of a parse error in the input, if this is one
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match *self {
            Self::ParseError { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Check if this error was raised while compiling, rather than evaluating
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::parse("unexpected ')'", 4).to_string(),
            "ParseError at position 4: unexpected ')'"
        );
        assert_eq!(
            Error::NameError("z".into()).to_string(),
            "NameError: name 'z' is not defined"
        );
        assert_eq!(
            Error::ArityError {
                function: "pow".into(),
                expected: Arity::Exact(2),
                found: 1
            }
            .to_string(),
            "ArityError: pow() takes exactly 2 argument(s), 1 given"
        );
    }

    #[test]
    fn position() {
        assert_eq!(Error::parse("oops", 7).position(), Some(7));
        assert!(Error::parse("oops", 7).is_parse_error());
        assert_eq!(Error::TypeError("oops".into()).position(), None);
        assert!(!Error::UnknownFunction("f".into()).is_parse_error());
    }
}
