//! An HTTP message content model with lazy, format-driven body codecs
//!
//! This crate models the body side of an HTTP request or response as two
//! views of the same thing: the raw content string and the structured field
//! mapping. Whichever side the caller sets is authoritative; the other side
//! is computed on demand through a codec selected by the message's format
//! identifier, and cached. Transport, routing and the outer request/response
//! envelope (URL, method, status code) are deliberately out of scope: the
//! crate is pure in-memory transformation with no I/O.
//!
//! # Features
//!
//! - Lazy, cached conversion between raw content and structured data
//! - Pluggable codecs keyed by a plain string format identifier
//! - Per-message codec overrides that always win over the built-ins
//! - Built-in `urlencoded` and `json` codec pairs, plus an `xml` parser
//! - Deferred header normalization into a case-insensitive multi-value
//!   collection (`http::HeaderMap`)
//! - Typed get/set of the structured side through serde
//! - A display rendering that never fails, for diagnostics and logging
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use micro_message::codec::{self, Formatter};
//! use micro_message::{Message, MessageError};
//!
//! fn main() -> Result<(), MessageError> {
//!     // outgoing: structured data in, raw content out (default urlencoded)
//!     let mut request = Message::new();
//!     request.add_headers([("Content-Type", "application/x-www-form-urlencoded")])?;
//!     request.set_data_from(&serde_json::json!({"user": "alice", "attempts": 3}))?;
//!     assert_eq!(request.content()?, Some("user=alice&attempts=3"));
//!
//!     // incoming: raw content in, structured data out
//!     let mut response = Message::new();
//!     response.set_content(r#"{"ok": true}"#).set_format(codec::JSON);
//!     assert_eq!(response.data()?.unwrap()["ok"], true);
//!
//!     // host applications can override any format, built-in or not
//!     #[derive(Debug)]
//!     struct Plain;
//!
//!     impl Formatter for Plain {
//!         fn format(&self, message: &Message) -> Result<String, MessageError> {
//!             Ok(format!("{:?}", message.cached_data()))
//!         }
//!     }
//!
//!     let mut debug = Message::new();
//!     debug.register_formatter(codec::JSON, Arc::new(Plain));
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into a few small modules:
//!
//! - [`message`]: the central [`Message`] entity and its lazy accessors
//! - [`codec`]: the [`Formatter`]/[`Parser`] capability traits, the built-in
//!   codec tables and the built-in codecs themselves
//! - [`headers`]: deferred normalization of raw header input into the
//!   materialized collection
//! - [`error`]: the crate error taxonomy
//!
//! # Conversion protocol
//!
//! Reading [`Message::content`] when only data is set resolves a
//! [`Formatter`] for the active format and caches its output; reading
//! [`Message::data`] when only content is set does the symmetric thing with a
//! [`Parser`]. Resolution checks the message's own override table first, then
//! the built-in table for that direction, and otherwise fails with
//! [`MessageError::UnrecognizedFormat`]: no merging, no fallback format.
//!
//! Setting one side never invalidates the other: a caller that overwrites
//! `content` after `data` was derived keeps the stale `data` until it
//! overwrites that too. Changing the format affects the next lazy computation
//! only.
//!
//! # Error handling
//!
//! All fallible operations return [`MessageError`]. Codec failures and
//! unrecognized formats propagate unchanged to the caller, with one
//! exception: [`Message::to_display_string`] must never fail, so it catches
//! any error on the lazy path, renders what it can, and reports the error as
//! a diagnostic on the returned [`DisplayString`].
//!
//! [`Formatter`]: codec::Formatter
//! [`Parser`]: codec::Parser

pub mod codec;
pub mod error;
pub mod headers;
pub mod message;

pub use error::Direction;
pub use error::MessageError;
pub use headers::HeaderSource;
pub use headers::HeaderValues;
pub use message::DisplayString;
pub use message::Fields;
pub use message::Message;
