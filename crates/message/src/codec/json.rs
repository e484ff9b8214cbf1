//! JSON body codec.

use serde_json::Value;

use crate::codec::{Formatter, JSON, Parser};
use crate::error::MessageError;
use crate::message::{Fields, Message};

/// Formats structured data as a JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

/// Parses a JSON object into structured data.
///
/// Empty (or whitespace-only) content and a literal `null` both parse to an
/// empty mapping. A well-formed document whose top level is not an object is
/// rejected, since the structured side of a message is always a mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Formatter for JsonFormatter {
    fn format(&self, message: &Message) -> Result<String, MessageError> {
        let empty = Fields::new();
        let fields = message.cached_data().unwrap_or(&empty);
        serde_json::to_string(fields).map_err(|e| MessageError::codec(JSON, e))
    }
}

impl Parser for JsonParser {
    fn parse(&self, message: &Message) -> Result<Fields, MessageError> {
        let content = message.cached_content().unwrap_or("").trim();
        if content.is_empty() {
            return Ok(Fields::new());
        }

        match serde_json::from_str::<Value>(content).map_err(|e| MessageError::codec(JSON, e))? {
            Value::Object(fields) => Ok(fields),
            Value::Null => Ok(Fields::new()),
            other => Err(MessageError::codec(
                JSON,
                format!("expected an object at the top level, got: {other}"),
            )),
        }
    }
}
