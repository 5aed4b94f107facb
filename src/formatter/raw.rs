use std::io;

use serde_json::Value;

use super::{FormatError, Formatter, HandlerOutput, ResponseBody};

/// Raw passthrough strategy — the default when no other strategy claims
/// the declared content type.
///
/// Byte streams are piped through unchanged with their error channel
/// intact; byte buffers and strings pass through as-is; anything
/// structured falls back to eager JSON encoding of the whole value.
pub struct RawFormatter;

impl Formatter for RawFormatter {
    fn format(&self, output: HandlerOutput) -> Result<ResponseBody, FormatError> {
        match output {
            HandlerOutput::ByteStream(chunks) => Ok(ResponseBody::Stream(chunks)),
            HandlerOutput::Bytes(bytes) => Ok(ResponseBody::Full(bytes)),
            HandlerOutput::Text(text) => Ok(ResponseBody::Full(text.into_bytes())),
            HandlerOutput::Empty => Ok(ResponseBody::Empty),
            HandlerOutput::Value(value) => Ok(ResponseBody::Full(serde_json::to_vec(&value)?)),
            HandlerOutput::Records(records) => Ok(ResponseBody::Full(serde_json::to_vec(
                &Value::Array(records),
            )?)),
            HandlerOutput::RecordStream(stream) => {
                let records = stream
                    .collect::<io::Result<Vec<Value>>>()
                    .map_err(FormatError::from)?;
                Ok(ResponseBody::Full(serde_json::to_vec(&Value::Array(
                    records,
                ))?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_passes_through_unquoted() {
        let body = RawFormatter
            .format(HandlerOutput::Text("plain".to_string()))
            .unwrap();
        match body {
            ResponseBody::Full(bytes) => assert_eq!(bytes, b"plain"),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_structured_falls_back_to_json() {
        let body = RawFormatter
            .format(HandlerOutput::Value(json!({"id": 1})))
            .unwrap();
        match body {
            ResponseBody::Full(bytes) => assert_eq!(bytes, br#"{"id":1}"#),
            other => panic!("unexpected body: {other:?}"),
        }
    }
}
