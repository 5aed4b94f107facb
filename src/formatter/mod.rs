//! Response formatting: the dispatcher that picks a serialization
//! strategy from the declared content type, and the three strategies
//! themselves.
//!
//! Each strategy is an independent, stateless implementation of
//! [`Formatter`] selected by a plain lookup — `application/json` streams
//! JSON, `application/zip` streams an archive container, anything else
//! passes data through raw. The selection never fails; raw is the
//! fallback.

mod archive;
mod json;
mod raw;

pub use archive::{ArchiveEntry, ArchiveFormatter, ArchiveSettings};
pub use json::JsonFormatter;
pub use raw::RawFormatter;

use std::io;

use serde_json::Value;

use crate::api::ResponseConfig;

/// Lazy sequence of structured records produced by a handler.
pub type RecordStream = Box<dyn Iterator<Item = io::Result<Value>> + Send>;

/// Lazy sequence of response body chunks.
///
/// Pull-based: the consumer drives the producer, which is what suspends
/// the producing side when the transport is not ready for more bytes. An
/// `Err` item is the stream's error channel; consumers stop reading after
/// it.
pub type ByteStream = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send>;

/// Everything a handler may return.
pub enum HandlerOutput {
    /// No body.
    Empty,
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// One structured record.
    Value(Value),
    /// An ordered sequence of structured records.
    Records(Vec<Value>),
    /// A lazy sequence of structured records.
    RecordStream(RecordStream),
    /// A lazy byte stream.
    ByteStream(ByteStream),
}

impl HandlerOutput {
    pub fn record_stream<I>(records: I) -> Self
    where
        I: Iterator<Item = io::Result<Value>> + Send + 'static,
    {
        HandlerOutput::RecordStream(Box::new(records))
    }

    pub fn byte_stream<I>(chunks: I) -> Self
    where
        I: Iterator<Item = io::Result<Vec<u8>>> + Send + 'static,
    {
        HandlerOutput::ByteStream(Box::new(chunks))
    }
}

impl std::fmt::Debug for HandlerOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerOutput::Empty => write!(f, "Empty"),
            HandlerOutput::Text(s) => f.debug_tuple("Text").field(s).finish(),
            HandlerOutput::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            HandlerOutput::Value(v) => f.debug_tuple("Value").field(v).finish(),
            HandlerOutput::Records(r) => write!(f, "Records({} records)", r.len()),
            HandlerOutput::RecordStream(_) => write!(f, "RecordStream(..)"),
            HandlerOutput::ByteStream(_) => write!(f, "ByteStream(..)"),
        }
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Value(value)
    }
}

impl From<String> for HandlerOutput {
    fn from(text: String) -> Self {
        HandlerOutput::Text(text)
    }
}

impl From<Vec<u8>> for HandlerOutput {
    fn from(bytes: Vec<u8>) -> Self {
        HandlerOutput::Bytes(bytes)
    }
}

/// A formatted response body, ready for the transport.
pub enum ResponseBody {
    Empty,
    Full(Vec<u8>),
    Stream(ByteStream),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Empty => write!(f, "Empty"),
            ResponseBody::Full(b) => write!(f, "Full({} bytes)", b.len()),
            ResponseBody::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// Formatting failure, surfaced as a 500 response.
#[derive(Debug)]
pub struct FormatError {
    message: String,
}

impl FormatError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// One serialization strategy. Stateless beyond the route's response
/// configuration captured at selection time.
pub trait Formatter: Send {
    fn format(&self, output: HandlerOutput) -> Result<ResponseBody, FormatError>;
}

/// Select the formatter strategy for a declared content type.
///
/// The match is case-insensitive on the media type; `;`-parameters are
/// ignored. Unknown types fall back to raw passthrough — selection is
/// never an error.
#[must_use]
pub fn select(content_type: &str, response: &ResponseConfig) -> Box<dyn Formatter> {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match media.as_str() {
        "application/json" => Box::new(JsonFormatter),
        "application/zip" => Box::new(ArchiveFormatter::new(ArchiveSettings::resolve(response))),
        _ => Box::new(RawFormatter),
    }
}
