use std::io;

use serde_json::Value;

use super::{FormatError, Formatter, HandlerOutput, RecordStream, ResponseBody};

/// JSON serialization strategy.
///
/// Record sequences — lazy or in-memory — are emitted as an incrementally
/// produced JSON array so that large results never materialize as one
/// buffer; everything else is encoded eagerly. The streamed rendering is
/// byte-equivalent to the eager encoding of the same logical array.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, output: HandlerOutput) -> Result<ResponseBody, FormatError> {
        match output {
            HandlerOutput::RecordStream(records) => {
                Ok(ResponseBody::Stream(Box::new(JsonArrayStream::new(records))))
            }
            HandlerOutput::Records(records) => Ok(ResponseBody::Stream(Box::new(
                JsonArrayStream::new(Box::new(records.into_iter().map(Ok))),
            ))),
            // Already-encoded byte streams pass through untouched.
            HandlerOutput::ByteStream(chunks) => Ok(ResponseBody::Stream(chunks)),
            HandlerOutput::Empty => Ok(ResponseBody::Empty),
            HandlerOutput::Text(text) => Ok(ResponseBody::Full(serde_json::to_vec(
                &Value::String(text),
            )?)),
            HandlerOutput::Bytes(bytes) => Ok(ResponseBody::Full(serde_json::to_vec(&bytes)?)),
            HandlerOutput::Value(value) => Ok(ResponseBody::Full(serde_json::to_vec(&value)?)),
        }
    }
}

enum ArrayState {
    Start,
    Streaming,
    Done,
}

/// Lazily renders a record stream as a JSON array: `[`, comma-separated
/// encoded elements, `]`. Each element is encoded as it is pulled, which
/// bounds peak memory and lets the transport send chunks as they appear.
/// A failing record terminates the stream through the error channel.
struct JsonArrayStream {
    records: RecordStream,
    state: ArrayState,
}

impl JsonArrayStream {
    fn new(records: RecordStream) -> Self {
        Self {
            records,
            state: ArrayState::Start,
        }
    }

    fn encode(value: &Value, prefix: u8) -> io::Result<Vec<u8>> {
        let mut chunk = vec![prefix];
        serde_json::to_writer(&mut chunk, value).map_err(io::Error::other)?;
        Ok(chunk)
    }
}

impl Iterator for JsonArrayStream {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ArrayState::Start => match self.records.next() {
                None => {
                    self.state = ArrayState::Done;
                    Some(Ok(b"[]".to_vec()))
                }
                Some(Ok(value)) => {
                    self.state = ArrayState::Streaming;
                    Some(Self::encode(&value, b'['))
                }
                Some(Err(err)) => {
                    self.state = ArrayState::Done;
                    Some(Err(err))
                }
            },
            ArrayState::Streaming => match self.records.next() {
                None => {
                    self.state = ArrayState::Done;
                    Some(Ok(b"]".to_vec()))
                }
                Some(Ok(value)) => Some(Self::encode(&value, b',')),
                Some(Err(err)) => {
                    self.state = ArrayState::Done;
                    Some(Err(err))
                }
            },
            ArrayState::Done => None,
        }
    }
}
