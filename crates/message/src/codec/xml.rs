//! XML body parser.
//!
//! Parse direction only: there is no built-in XML formatter. The parser walks
//! the document with a streaming [`quick_xml::Reader`] and folds it into the
//! message field mapping:
//!
//! - the root element's children become the top-level mapping
//! - a text-only element becomes a string value
//! - an element with child elements becomes a nested mapping
//! - repeated sibling names collect into an array, in document order
//! - a text-only root maps its own name to its text
//!
//! Attributes are dropped and anything after the root element is ignored.
//! Truncated or malformed documents are codec errors; empty content parses to
//! an empty mapping.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;

use crate::codec::{Parser, XML};
use crate::error::MessageError;
use crate::message::{Fields, Message};

/// Parses an XML document into structured data.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl Parser for XmlParser {
    fn parse(&self, message: &Message) -> Result<Fields, MessageError> {
        let content = message.cached_content().unwrap_or("");
        if content.trim().is_empty() {
            return Ok(Fields::new());
        }

        let mut reader = Reader::from_str(content);
        loop {
            match reader.read_event().map_err(|e| MessageError::codec(XML, e))? {
                Event::Start(start) => {
                    let name = element_name(start.name().as_ref());
                    let value = read_element(&mut reader)?;
                    return Ok(match value {
                        Value::Object(children) => children,
                        scalar => {
                            let mut fields = Fields::new();
                            fields.insert(name, scalar);
                            fields
                        }
                    });
                }
                Event::Empty(start) => {
                    // a self-closing root is a text-only root with empty text
                    let mut fields = Fields::new();
                    fields.insert(element_name(start.name().as_ref()), Value::String(String::new()));
                    return Ok(fields);
                }
                Event::Eof => return Ok(Fields::new()),
                Event::End(end) => {
                    let name = element_name(end.name().as_ref());
                    return Err(MessageError::codec(XML, format!("unexpected closing tag: {name}")));
                }
                // prolog, comments and stray whitespace before the root
                _ => {}
            }
        }
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Reads the body of an element whose start tag was already consumed.
///
/// Returns a string for text-only elements and a nested mapping otherwise;
/// text interleaved with child elements is dropped.
fn read_element(reader: &mut Reader<&[u8]>) -> Result<Value, MessageError> {
    let mut text = String::new();
    let mut children = Fields::new();

    loop {
        match reader.read_event().map_err(|e| MessageError::codec(XML, e))? {
            Event::Start(start) => {
                let name = element_name(start.name().as_ref());
                let child = read_element(reader)?;
                insert_child(&mut children, name, child);
            }
            Event::Empty(start) => {
                let name = element_name(start.name().as_ref());
                insert_child(&mut children, name, Value::String(String::new()));
            }
            Event::Text(t) => {
                let unescaped = t.unescape().map_err(|e| MessageError::codec(XML, e))?;
                text.push_str(&unescaped);
            }
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t.into_inner())),
            Event::End(_) => break,
            Event::Eof => return Err(MessageError::codec(XML, "unexpected end of document")),
            _ => {}
        }
    }

    if children.is_empty() {
        Ok(Value::String(text.trim().to_owned()))
    } else {
        Ok(Value::Object(children))
    }
}

/// Inserts a child value, promoting repeated names into arrays.
fn insert_child(children: &mut Fields, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    fn parse(content: &str) -> Result<Fields, MessageError> {
        let mut message = Message::new();
        message.set_content(content);
        XmlParser.parse(&message)
    }

    #[test]
    fn flat_elements_become_string_fields() {
        let parsed = parse("<user><name>alice</name><age>30</age></user>").unwrap();
        assert_eq!(Value::Object(parsed), json!({"name": "alice", "age": "30"}));
    }

    #[test]
    fn nested_and_repeated_elements() {
        let doc = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <order>
              <id>17</id>
              <item>
                <sku>a-1</sku>
                <qty>2</qty>
              </item>
              <item>
                <sku>b-9</sku>
                <qty>1</qty>
              </item>
            </order>
        "#};

        let parsed = parse(doc).unwrap();
        assert_eq!(
            Value::Object(parsed),
            json!({
                "id": "17",
                "item": [
                    {"sku": "a-1", "qty": "2"},
                    {"sku": "b-9", "qty": "1"}
                ]
            })
        );
    }

    #[test]
    fn text_only_root_maps_its_name() {
        let parsed = parse("<status>ok</status>").unwrap();
        assert_eq!(Value::Object(parsed), json!({"status": "ok"}));

        let parsed = parse("<status/>").unwrap();
        assert_eq!(Value::Object(parsed), json!({"status": ""}));
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let parsed = parse("<m><q>a &amp; b</q><raw><![CDATA[<tag>]]></raw></m>").unwrap();
        assert_eq!(Value::Object(parsed), json!({"q": "a & b", "raw": "<tag>"}));
    }

    #[test]
    fn self_closing_elements_become_empty_strings() {
        let parsed = parse("<m><flag/><name>x</name></m>").unwrap();
        assert_eq!(Value::Object(parsed), json!({"flag": "", "name": "x"}));
    }

    #[test]
    fn empty_content_parses_to_empty_mapping() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   \n").unwrap().is_empty());
    }

    #[test]
    fn truncated_document_is_a_codec_error() {
        let err = parse("<order><id>17</id>").unwrap_err();
        assert!(matches!(err, MessageError::Codec { .. }));
    }
}
