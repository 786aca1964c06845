//! Error types for XML <-> JSON conversion.

use thiserror::Error;

/// Result type alias for quarto-xml-json operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding or encoding a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The leading `<?xml ...?>` declaration is missing or incomplete.
    #[error("Invalid XML declaration: {reason}")]
    InvalidDeclaration { reason: String },

    /// The `<!DOCTYPE ...>` block is missing or one of its fields can't be read.
    #[error("Invalid DOCTYPE: {reason}")]
    InvalidDoctype { reason: String },

    /// Malformed markup reported by the XML reader.
    #[error("XML syntax error: {message}{}", line_suffix(.line))]
    Tokenizer {
        message: String,
        /// 1-based line where the reader stopped, when known.
        line: Option<usize>,
    },

    /// The event stream did not describe a single well-formed tree.
    #[error("Invalid document structure: {message}")]
    Structure { message: String },

    /// A JSON value that has no XML counterpart.
    #[error("Invalid value at '{path}': {message}")]
    InvalidValue { path: String, message: String },

    /// A reserved key set that could collide with element or attribute names.
    #[error("Invalid reserved keys: {message}")]
    InvalidKeys { message: String },

    /// The XML writer failed.
    #[error("XML writer error: {message}")]
    Serializer { message: String },
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

impl Error {
    /// Stable short code for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidDeclaration { .. } => "XJ-1",
            Error::InvalidDoctype { .. } => "XJ-2",
            Error::Tokenizer { .. } => "XJ-3",
            Error::Structure { .. } => "XJ-4",
            Error::InvalidValue { .. } => "XJ-5",
            Error::InvalidKeys { .. } => "XJ-6",
            Error::Serializer { .. } => "XJ-7",
        }
    }

    pub(crate) fn declaration(reason: impl Into<String>) -> Self {
        Error::InvalidDeclaration {
            reason: reason.into(),
        }
    }

    pub(crate) fn doctype(reason: impl Into<String>) -> Self {
        Error::InvalidDoctype {
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Error::Structure {
            message: message.into(),
        }
    }

    pub(crate) fn serializer(err: impl std::fmt::Display) -> Self {
        Error::Serializer {
            message: err.to_string(),
        }
    }

    pub(crate) fn invalid_value(path: &[&str], message: impl Into<String>) -> Self {
        Error::InvalidValue {
            path: path.join("/"),
            message: message.into(),
        }
    }
}
