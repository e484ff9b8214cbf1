//! Error types for the message content model.
//!
//! This module defines the error taxonomy shared by the [`Message`] accessors
//! and the built-in codecs:
//!
//! - [`MessageError::UnrecognizedFormat`]: codec resolution failed for the
//!   active format identifier
//! - [`MessageError::Codec`]: an individual formatter/parser rejected its input
//! - [`MessageError::InvalidHeader`]: a raw header pair could not be
//!   normalized into the header collection
//!
//! [`Message`]: crate::message::Message

use std::fmt;

use thiserror::Error;

/// The direction of a codec lookup or invocation.
///
/// A format identifier resolves independently per direction: a format may have
/// a parser but no formatter (the built-in `xml` format is parse-only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Serializing structured data into raw content.
    Format,
    /// Deserializing raw content into structured data.
    Parse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Format => f.write_str("formatter"),
            Direction::Parse => f.write_str("parser"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("no {direction} registered for format: {format}")]
    UnrecognizedFormat { direction: Direction, format: String },

    #[error("{format} codec failure: {reason}")]
    Codec { format: String, reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },
}

impl MessageError {
    pub fn unrecognized_format<S: Into<String>>(direction: Direction, format: S) -> Self {
        Self::UnrecognizedFormat { direction, format: format.into() }
    }

    pub fn codec<S: ToString>(format: &str, reason: S) -> Self {
        Self::Codec { format: format.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_header<S: ToString>(reason: S) -> Self {
        Self::InvalidHeader { reason: reason.to_string() }
    }

    /// Returns true if this error is a codec-resolution failure.
    pub fn is_unrecognized_format(&self) -> bool {
        matches!(self, Self::UnrecognizedFormat { .. })
    }
}
