//! Crate-wide error type.
//!
//! Every failure a query can produce is a deterministic, compile-time
//! validation failure surfaced to the caller; nothing is retried or
//! silently recovered (the `$top` ceiling is a clamp, not an error).

use thiserror::Error;

/// Errors produced while parsing and compiling a query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed query-string syntax.
    #[error("Syntax error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },

    /// Property name not found on the entity type being navigated.
    #[error("Entity type '{entity_type}' has no property '{name}'")]
    UnknownProperty { entity_type: String, name: String },

    /// Function name not present in the function table.
    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Query option keyword not recognized.
    #[error("Unknown query option '{name}'")]
    UnknownOption { name: String },

    /// Illegal property nesting, e.g. a sub-property beneath a property
    /// that carries no embedded document.
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// More than one nested options block on a single expand segment.
    #[error("Expand segment '{segment}' has multiple nested option blocks")]
    MultipleSubqueries { segment: String },

    /// Identified path syntax (`Things(5)`, `values[0]`) used where only
    /// plain paths are legal ($select, $orderby).
    #[error("Identified path segment '{segment}' is not allowed here")]
    IdentifiedPathNotAllowed { segment: String },

    /// No allowed type binding satisfies a function's operands, or no
    /// representable cast exists for a requested output type.
    #[error("Type mismatch in '{function}': {message}")]
    TypeMismatch { function: String, message: String },

    /// Structurally valid but semantically undefined operator combination.
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    /// A literal token whose text does not match any supported form.
    #[error("Invalid literal '{literal}': {message}")]
    InvalidLiteral { literal: String, message: String },

    /// Entity model definition problems caught at finalize time.
    #[error("Invalid model: {message}")]
    InvalidModel { message: String },

    /// Unknown entity type requested from the model.
    #[error("Unknown entity type '{name}'")]
    UnknownEntityType { name: String },
}

impl Error {
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Error::InvalidPath {
            message: message.into(),
        }
    }

    pub fn type_mismatch(function: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            message: message.into(),
        }
    }

    pub fn invalid_literal(literal: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidLiteral {
            literal: literal.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownProperty {
            entity_type: "Thing".into(),
            name: "bogus".into(),
        };
        assert_eq!(err.to_string(), "Entity type 'Thing' has no property 'bogus'");

        let err = Error::UnknownOption {
            name: "$frobnicate".into(),
        };
        assert!(err.to_string().contains("$frobnicate"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            Error::invalid_path("x"),
            Error::InvalidPath { .. }
        ));
        assert!(matches!(
            Error::unsupported("x"),
            Error::UnsupportedOperation { .. }
        ));
    }
}
