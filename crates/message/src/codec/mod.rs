//! Body codecs and the built-in codec tables.
//!
//! A codec is selected by a *format identifier*, a plain string key carried on
//! the message. The two directions are independent capabilities:
//!
//! - [`Formatter`]: serializes the message's structured data into raw content
//! - [`Parser`]: deserializes the message's raw content into structured data
//!
//! Both receive the whole [`Message`] rather than the bare value, so a codec
//! may consult headers (a content-type charset hint, for example) in addition
//! to the body side it transforms.
//!
//! Resolution consults the message's per-instance override tables first and
//! falls back to the built-in tables in this module; an identifier found in
//! neither is an [`UnrecognizedFormat`] error. The built-in `xml` format is
//! parse-only.
//!
//! [`Message`]: crate::message::Message
//! [`UnrecognizedFormat`]: crate::error::MessageError::UnrecognizedFormat

use std::fmt;
use std::sync::Arc;

use crate::error::MessageError;
use crate::message::{Fields, Message};

mod json;
mod urlencoded;
mod xml;

pub use json::{JsonFormatter, JsonParser};
pub use urlencoded::{UrlEncodedFormatter, UrlEncodedParser};
pub use xml::XmlParser;

/// Format identifier for `application/x-www-form-urlencoded` style bodies.
pub const URLENCODED: &str = "urlencoded";

/// Format identifier for JSON bodies.
pub const JSON: &str = "json";

/// Format identifier for XML bodies (parse direction only by default).
pub const XML: &str = "xml";

/// Serializes a message's structured data into raw content.
///
/// Implementations must succeed for any mapping of string-keyed
/// scalar/sequence values; only genuinely unrepresentable input may fail.
pub trait Formatter: fmt::Debug + Send + Sync {
    fn format(&self, message: &Message) -> Result<String, MessageError>;
}

/// Deserializes a message's raw content into structured data.
///
/// Empty or benignly unparseable content yields an empty mapping; structurally
/// invalid input (malformed JSON/XML) is a codec error.
pub trait Parser: fmt::Debug + Send + Sync {
    fn parse(&self, message: &Message) -> Result<Fields, MessageError>;
}

/// Built-in formatter table.
pub(crate) fn builtin_formatter(format: &str) -> Option<Arc<dyn Formatter>> {
    match format {
        URLENCODED => Some(Arc::new(UrlEncodedFormatter)),
        JSON => Some(Arc::new(JsonFormatter)),
        _ => None,
    }
}

/// Built-in parser table.
pub(crate) fn builtin_parser(format: &str) -> Option<Arc<dyn Parser>> {
    match format {
        URLENCODED => Some(Arc::new(UrlEncodedParser)),
        JSON => Some(Arc::new(JsonParser)),
        XML => Some(Arc::new(XmlParser)),
        _ => None,
    }
}
