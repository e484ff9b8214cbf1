use std::sync::Arc;

use micro_message::codec::{self, Parser};
use micro_message::{Fields, HeaderValues, Message, MessageError};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// A parser override: trusts the message's own content-type header over the
/// format identifier, falling back to the built-in json parser.
#[derive(Debug)]
struct ContentTypeAware;

impl Parser for ContentTypeAware {
    fn parse(&self, message: &Message) -> Result<Fields, MessageError> {
        let content_type = message
            .cached_headers()
            .and_then(|headers| headers.get("content-type"))
            .map(String::as_str)
            .unwrap_or("application/json");

        info!(content_type, "parsing with content-type hint");
        if content_type.starts_with("application/xml") {
            codec::XmlParser.parse(message)
        } else {
            codec::JsonParser.parse(message)
        }
    }
}

fn main() -> Result<(), MessageError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // outgoing request: set data, let the default urlencoded formatter run
    let mut request = Message::new();
    request.add_headers([
        ("Host", HeaderValues::from("example.com")),
        ("Accept", HeaderValues::from(vec!["application/json", "application/xml"])),
    ])?;
    request.set_data_from(&serde_json::json!({"q": "lazy codecs", "page": 1}))?;

    info!(content = request.content()?.unwrap_or(""), "formatted request body");
    println!("{}", request.to_display_string());

    // incoming response: declared json, but the body is xml
    let mut response = Message::new();
    response
        .add_headers([("Content-Type", "application/xml; charset=utf-8")])?
        .register_parser(codec::JSON, Arc::new(ContentTypeAware))
        .set_format(codec::JSON)
        .set_content("<result><status>ok</status><took>12</took></result>");

    let data = response.data()?.cloned().unwrap_or_default();
    info!(status = %data["status"], took = %data["took"], "parsed response body");
    Ok(())
}
