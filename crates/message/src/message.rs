//! The message content model.
//!
//! A [`Message`] is the body-side view of one HTTP request or response. It
//! holds four loosely coupled pieces of state:
//!
//! - a header collection, materialized lazily from whatever form it was set in
//! - `content`: the raw body string
//! - `data`: the structured body fields
//! - `format`: the identifier selecting which codec pair applies
//!
//! Content and data are two views of the same body. Whichever side the caller
//! sets becomes authoritative; the other side is computed on first read
//! through the codec resolved for the current format, and cached. Setting one
//! side never clears the other, so a caller that writes `content` after `data`
//! was already derived keeps the stale derived value until it overwrites it.
//! That non-invalidation is part of the contract, not an accident.
//!
//! Codec resolution checks the message's own override tables before the
//! built-ins, per direction, with no merging and no fallback format.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{trace, warn};

use crate::codec::{self, Formatter, Parser};
use crate::error::{Direction, MessageError};
use crate::headers::{self, HeaderSource, HeaderState, HeaderValues};

/// The structured side of a message body: string-keyed fields in insertion
/// order, with arbitrary JSON values.
pub type Fields = serde_json::Map<String, Value>;

/// An HTTP message body with lazy, format-driven conversion between its raw
/// and structured views.
///
/// # Example
///
/// ```
/// use micro_message::Message;
///
/// # fn main() -> Result<(), micro_message::MessageError> {
/// let mut message = Message::new();
/// message.set_content(r#"{"x": 1}"#).set_format("json");
///
/// let data = message.data()?.cloned().unwrap();
/// assert_eq!(data["x"], 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Message {
    headers: HeaderState,
    content: Option<String>,
    data: Option<Fields>,
    format: Option<String>,
    formatters: HashMap<String, Arc<dyn Formatter>>,
    parsers: HashMap<String, Arc<dyn Parser>>,
}

impl Message {
    /// The format assumed when none was set explicitly.
    pub const DEFAULT_FORMAT: &'static str = codec::URLENCODED;

    /// Creates an empty message: no headers, no body on either side, default
    /// format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores headers in whichever form they are given, without normalizing.
    ///
    /// Accepts an existing `HeaderMap<String>` or plain name/value pairs; the
    /// pairs are folded into a collection only when [`headers`](Self::headers)
    /// is first called.
    pub fn set_headers(&mut self, headers: impl Into<HeaderSource>) -> &mut Self {
        self.headers = HeaderState::Raw(headers.into());
        self
    }

    /// Returns the header collection, materializing it on first access.
    ///
    /// If headers were never set, an empty collection is created. If they were
    /// set from raw pairs, the pairs are validated and folded in; an invalid
    /// header name is an [`MessageError::InvalidHeader`] and leaves the raw
    /// form untouched. The returned map may be mutated freely.
    pub fn headers(&mut self) -> Result<&mut HeaderMap<String>, MessageError> {
        self.headers.materialize()
    }

    /// Materializes the header collection and appends every given pair.
    ///
    /// Each value may be a single string or a sequence of strings.
    pub fn add_headers<I, K, V>(&mut self, pairs: I) -> Result<&mut Self, MessageError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<HeaderValues>,
    {
        let map = self.headers.materialize()?;
        for (name, values) in pairs {
            headers::append_pair(map, name.as_ref(), &values.into())?;
        }
        Ok(self)
    }

    /// Peeks at the header collection without materializing a raw form.
    ///
    /// This is the accessor codecs use for content-type hints; it returns
    /// `None` until the collection has been materialized.
    pub fn cached_headers(&self) -> Option<&HeaderMap<String>> {
        self.headers.ready()
    }

    /// Returns the raw content, deriving it from the structured data on first
    /// read.
    ///
    /// If content is unset and data holds at least one field, the formatter
    /// for the current format is resolved and invoked once, and its output
    /// cached. Returns `None` when neither side has anything to offer.
    pub fn content(&mut self) -> Result<Option<&str>, MessageError> {
        if self.content.is_none() && self.data.as_ref().is_some_and(|fields| !fields.is_empty()) {
            let formatter = self.resolve_formatter()?;
            trace!("lazily formatting data into content");
            let formatted = formatter.format(self)?;
            self.content = Some(formatted);
        }
        Ok(self.content.as_deref())
    }

    /// Returns the structured data, deriving it from the raw content on first
    /// read.
    ///
    /// If data is unset and content is a non-empty string, the parser for the
    /// current format is resolved and invoked once, and its output cached.
    /// Returns `None` when neither side has anything to offer.
    pub fn data(&mut self) -> Result<Option<&Fields>, MessageError> {
        if self.data.is_none() && self.content.as_ref().is_some_and(|content| !content.is_empty()) {
            let parser = self.resolve_parser()?;
            trace!("lazily parsing content into data");
            let parsed = parser.parse(self)?;
            self.data = Some(parsed);
        }
        Ok(self.data.as_ref())
    }

    /// Overwrites the raw content.
    ///
    /// Does not touch a previously derived `data`; the caller owns that
    /// staleness (see the module docs).
    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = Some(content.into());
        self
    }

    /// Overwrites the structured data.
    ///
    /// Does not touch a previously derived `content`.
    pub fn set_data(&mut self, data: Fields) -> &mut Self {
        self.data = Some(data);
        self
    }

    /// Serializes any map-shaped value into the structured data.
    ///
    /// A value that does not serialize to a map (a list, a scalar) is
    /// rejected, since the structured side is always a field mapping.
    pub fn set_data_from<T: Serialize>(&mut self, value: &T) -> Result<&mut Self, MessageError> {
        match serde_json::to_value(value).map_err(|e| MessageError::codec(codec::JSON, e))? {
            Value::Object(fields) => {
                self.data = Some(fields);
                Ok(self)
            }
            other => Err(MessageError::codec(
                codec::JSON,
                format!("expected a map-shaped value, got: {other}"),
            )),
        }
    }

    /// Lazily parses (if needed) and deserializes the structured data into a
    /// typed value.
    ///
    /// The typing step is always JSON-value machinery, whatever format parsed
    /// the content, so a typing failure reports as a `json` codec error.
    pub fn data_as<T: DeserializeOwned>(&mut self) -> Result<T, MessageError> {
        let fields = self.data()?.cloned().unwrap_or_default();
        serde_json::from_value(Value::Object(fields)).map_err(|e| MessageError::codec(codec::JSON, e))
    }

    /// Peeks at the raw content without triggering lazy formatting.
    pub fn cached_content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Peeks at the structured data without triggering lazy parsing.
    pub fn cached_data(&self) -> Option<&Fields> {
        self.data.as_ref()
    }

    /// Returns the active format identifier, assigning the default on first
    /// read if none was set.
    pub fn format(&mut self) -> &str {
        self.format.get_or_insert_with(|| Self::DEFAULT_FORMAT.to_owned())
    }

    /// Overwrites the format identifier.
    ///
    /// Takes effect on the next lazy computation only; already-cached content
    /// or data is left as it is.
    pub fn set_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.format = Some(format.into());
        self
    }

    /// Registers a formatter override for a format identifier.
    ///
    /// Overrides always win over the built-in table, including for the
    /// built-in identifiers themselves.
    pub fn register_formatter(&mut self, format: impl Into<String>, formatter: Arc<dyn Formatter>) -> &mut Self {
        self.formatters.insert(format.into(), formatter);
        self
    }

    /// Registers a parser override for a format identifier.
    pub fn register_parser(&mut self, format: impl Into<String>, parser: Arc<dyn Parser>) -> &mut Self {
        self.parsers.insert(format.into(), parser);
        self
    }

    fn resolve_formatter(&mut self) -> Result<Arc<dyn Formatter>, MessageError> {
        let format = self.format().to_owned();
        if let Some(formatter) = self.formatters.get(&format) {
            trace!(format = %format, "resolved override formatter");
            return Ok(Arc::clone(formatter));
        }
        codec::builtin_formatter(&format)
            .ok_or_else(|| MessageError::unrecognized_format(Direction::Format, format))
    }

    fn resolve_parser(&mut self) -> Result<Arc<dyn Parser>, MessageError> {
        let format = self.format().to_owned();
        if let Some(parser) = self.parsers.get(&format) {
            trace!(format = %format, "resolved override parser");
            return Ok(Arc::clone(parser));
        }
        codec::builtin_parser(&format).ok_or_else(|| MessageError::unrecognized_format(Direction::Parse, format))
    }

    /// Renders the message for diagnostics: one `name : value` line per header
    /// value, a blank line, then the content.
    ///
    /// Reading the content may trigger lazy formatting; this path is the one
    /// place where a failure is swallowed instead of propagated, since display
    /// rendering must never itself fail. The failing part renders empty, a
    /// `warn!` is emitted, and the error is carried on the returned
    /// [`DisplayString`] for callers that want to look.
    pub fn to_display_string(&mut self) -> DisplayString {
        let mut text = String::new();
        let mut diagnostic = None;

        match self.headers() {
            Ok(headers) => {
                for (name, value) in headers.iter() {
                    text.push_str(name.as_str());
                    text.push_str(" : ");
                    text.push_str(value);
                    text.push('\n');
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to materialize headers for display");
                diagnostic = Some(e);
            }
        }

        text.push('\n');

        match self.content() {
            Ok(Some(content)) => text.push_str(content),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to render content for display");
                diagnostic = Some(e);
            }
        }

        DisplayString { text, diagnostic }
    }
}

/// The outcome of [`Message::to_display_string`]: best-effort text plus the
/// error, if any, that the lazy content path raised along the way.
#[derive(Debug)]
pub struct DisplayString {
    text: String,
    diagnostic: Option<MessageError>,
}

impl DisplayString {
    /// The rendered text; the body part is empty if rendering it failed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The error swallowed during rendering, if there was one.
    pub fn diagnostic(&self) -> Option<&MessageError> {
        self.diagnostic.as_ref()
    }

    /// Consumes the outcome, keeping only the text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for DisplayString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
