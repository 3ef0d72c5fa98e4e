//! Error types for JSON++ parsing and stringifying.
//!
//! Every failure is fatal to the call that produced it. There is no partial
//! document on error and nothing is retried internally.
//!
//! ## Error Categories
//!
//! - **Structural**: malformed bracket shape, wrong pair arity, invalid root
//! - **Unknown value**: a scalar token matches none of the literal forms
//! - **Lambda syntax**: an arrow split whose left side is not `( ... )`
//! - **Linking**: a reference target or an intermediate path member is missing
//! - **Construction**: a registered type rejected its constructor arguments
//!
//! ## Examples
//!
//! ```rust
//! use serde_jsonpp::{parse, ErrorKind};
//!
//! let err = parse("{\"a\":/\"missing\"}").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Linking);
//! assert!(err.to_string().starts_with("Linking failed"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors of the parse and stringify engine.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed bracket, array or object shape
    #[error("Invalid JSON++: {msg} in `{context}`")]
    Structural { msg: String, context: String },

    /// A scalar token that matches no literal form
    #[error("Unknown JSON++ value: `{0}`")]
    UnknownValue(String),

    /// An arrow split whose parameter side is not parenthesized
    #[error("Invalid JSON++ lambda value: {msg} in `{context}`")]
    LambdaSyntax { msg: String, context: String },

    /// Reference resolution failure
    #[error("Linking failed: path `{path}` {reason}")]
    Linking { path: String, reason: String },

    /// A registry factory refused its arguments
    #[error("Construction of `{tag}` failed: {msg}")]
    Construction { tag: String, msg: String },

    /// Unsupported type for the serde bridge
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Reading input or writing output failed
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

/// The coarse category of an [`Error`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    UnknownValue,
    LambdaSyntax,
    Linking,
    Construction,
    Serde,
    Io,
}

impl Error {
    /// Creates a structural error, quoting the offending text.
    ///
    /// Long context is shortened so messages stay readable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::Error;
    ///
    /// let err = Error::structural("expected 2 parts", "\"a\":1:2");
    /// assert!(err.to_string().contains("expected 2 parts"));
    /// ```
    pub fn structural(msg: &str, context: &str) -> Self {
        Error::Structural {
            msg: msg.to_string(),
            context: excerpt(context),
        }
    }

    /// Creates an unknown value error for an unrecognized scalar token.
    pub fn unknown_value(token: &str) -> Self {
        Error::UnknownValue(excerpt(token))
    }

    /// Creates a lambda syntax error.
    pub fn lambda_syntax(msg: &str, context: &str) -> Self {
        Error::LambdaSyntax {
            msg: msg.to_string(),
            context: excerpt(context),
        }
    }

    /// Creates a linking error naming the path that could not be linked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_jsonpp::Error;
    ///
    /// let err = Error::linking("/\"a\"[3]", "does not exist");
    /// assert_eq!(err.to_string(), "Linking failed: path `/\"a\"[3]` does not exist");
    /// ```
    pub fn linking(path: &str, reason: &str) -> Self {
        Error::Linking {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a construction error for a registered type.
    pub fn construction<T: fmt::Display>(tag: &str, msg: T) -> Self {
        Error::Construction {
            tag: tag.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an unsupported type error for the serde bridge.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates an I/O error.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Structural { .. } => ErrorKind::Structural,
            Error::UnknownValue(_) => ErrorKind::UnknownValue,
            Error::LambdaSyntax { .. } => ErrorKind::LambdaSyntax,
            Error::Linking { .. } => ErrorKind::Linking,
            Error::Construction { .. } => ErrorKind::Construction,
            Error::UnsupportedType(_) | Error::Custom(_) => ErrorKind::Serde,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

const EXCERPT_LIMIT: usize = 60;

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_LIMIT {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(EXCERPT_LIMIT).collect();
        format!("{}...", head)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
