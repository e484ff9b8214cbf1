//! URL-encoded body codec (`a=1&b=2` style).
//!
//! The formatter flattens the field mapping into name/value pairs in insertion
//! order: scalars are stringified, `null` becomes an empty value, arrays
//! expand into one pair per element under the same name, and anything nested
//! deeper falls back to its JSON text. The parser is maximally lenient: any
//! input decodes to *some* mapping, duplicate names last-wins, and a bare
//! token becomes a name with an empty value.

use serde_json::Value;

use crate::codec::{Formatter, Parser, URLENCODED};
use crate::error::MessageError;
use crate::message::{Fields, Message};

/// Formats structured data as a URL-encoded query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedFormatter;

/// Parses a URL-encoded query string into structured data.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedParser;

/// Renders a single field value as its query-string text.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // numbers, booleans and nested structures all render as their
        // canonical json text
        other => other.to_string(),
    }
}

impl Formatter for UrlEncodedFormatter {
    fn format(&self, message: &Message) -> Result<String, MessageError> {
        let empty = Fields::new();
        let fields = message.cached_data().unwrap_or(&empty);

        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((name.as_str(), scalar(item)));
                    }
                }
                other => pairs.push((name.as_str(), scalar(other))),
            }
        }

        serde_urlencoded::to_string(&pairs).map_err(|e| MessageError::codec(URLENCODED, e))
    }
}

impl Parser for UrlEncodedParser {
    fn parse(&self, message: &Message) -> Result<Fields, MessageError> {
        let content = message.cached_content().unwrap_or("");

        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(content).map_err(|e| MessageError::codec(URLENCODED, e))?;

        let mut fields = Fields::new();
        for (name, value) in pairs {
            // duplicate names last-wins
            fields.insert(name, Value::String(value));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a json object"),
        }
    }

    #[test]
    fn formats_in_insertion_order() {
        let mut message = Message::new();
        message.set_data(fields(json!({"a": "1", "b": "2"})));

        let formatted = UrlEncodedFormatter.format(&message).unwrap();
        assert_eq!(formatted, "a=1&b=2");
    }

    #[test]
    fn escapes_reserved_characters() {
        let mut message = Message::new();
        message.set_data(fields(json!({"greeting": "hello world", "sym": "a&b=c"})));

        let formatted = UrlEncodedFormatter.format(&message).unwrap();
        assert_eq!(formatted, "greeting=hello+world&sym=a%26b%3Dc");
    }

    #[test]
    fn stringifies_scalars_and_expands_arrays() {
        let mut message = Message::new();
        message.set_data(fields(json!({"n": 42, "ok": true, "none": null, "tag": ["x", "y"]})));

        let formatted = UrlEncodedFormatter.format(&message).unwrap();
        assert_eq!(formatted, "n=42&ok=true&none=&tag=x&tag=y");
    }

    #[test]
    fn parses_pairs_with_last_wins_duplicates() {
        let mut message = Message::new();
        message.set_content("a=1&b=2&a=3");

        let parsed = UrlEncodedParser.parse(&message).unwrap();
        assert_eq!(parsed, fields(json!({"a": "3", "b": "2"})));
    }

    #[test]
    fn lenient_on_bare_tokens_and_empty_input() {
        let mut message = Message::new();
        message.set_content("flag");
        assert_eq!(UrlEncodedParser.parse(&message).unwrap(), fields(json!({"flag": ""})));

        message.set_content("");
        assert!(UrlEncodedParser.parse(&message).unwrap().is_empty());
    }

    #[test]
    fn round_trips_string_valued_mappings() {
        let original = fields(json!({"name": "Alice B", "city": "Århus", "q": "1+1=2"}));

        let mut message = Message::new();
        message.set_data(original.clone());
        let formatted = UrlEncodedFormatter.format(&message).unwrap();

        let mut back = Message::new();
        back.set_content(formatted);
        assert_eq!(UrlEncodedParser.parse(&back).unwrap(), original);
    }
}
