//! Tests for the formatter dispatcher and the JSON/raw strategies.

use routedef::formatter::{self, Formatter, HandlerOutput, JsonFormatter, RawFormatter};
use routedef::{ResponseBody, ResponseConfig};
use serde_json::{json, Value};

fn drain(body: ResponseBody) -> Vec<u8> {
    match body {
        ResponseBody::Empty => Vec::new(),
        ResponseBody::Full(bytes) => bytes,
        ResponseBody::Stream(chunks) => chunks
            .map(|chunk| chunk.expect("stream chunk"))
            .flatten()
            .collect(),
    }
}

#[test]
fn test_select_is_case_insensitive() {
    let config = ResponseConfig::default();
    let body = formatter::select("APPLICATION/JSON", &config)
        .format(HandlerOutput::Records(vec![json!(1)]))
        .unwrap();
    assert_eq!(drain(body), b"[1]");
}

#[test]
fn test_select_ignores_media_type_parameters() {
    let config = ResponseConfig::default();
    let body = formatter::select("application/json; charset=utf-8", &config)
        .format(HandlerOutput::Value(json!({"a": 1})))
        .unwrap();
    assert_eq!(drain(body), br#"{"a":1}"#);
}

#[test]
fn test_select_unknown_type_falls_back_to_raw() {
    let config = ResponseConfig::default();
    let body = formatter::select("text/plain", &config)
        .format(HandlerOutput::Text("hello".to_string()))
        .unwrap();
    assert_eq!(drain(body), b"hello");
}

#[test]
fn test_json_stream_matches_eager_encoding() {
    let records: Vec<Value> = (0..1000).map(|num| json!({ "num": num })).collect();
    let eager = serde_json::to_vec(&Value::Array(records.clone())).unwrap();

    let streamed = drain(
        JsonFormatter
            .format(HandlerOutput::record_stream(records.into_iter().map(Ok)))
            .unwrap(),
    );
    assert_eq!(streamed, eager);
}

#[test]
fn test_json_vector_also_streams() {
    let records = vec![json!({"a": 1}), json!({"b": 2})];
    let body = JsonFormatter
        .format(HandlerOutput::Records(records))
        .unwrap();
    assert!(matches!(body, ResponseBody::Stream(_)));
    assert_eq!(drain(body), br#"[{"a":1},{"b":2}]"#);
}

#[test]
fn test_json_plain_value_is_eager() {
    let body = JsonFormatter
        .format(HandlerOutput::Value(json!({"id": 7})))
        .unwrap();
    assert!(matches!(body, ResponseBody::Full(_)));
    assert_eq!(drain(body), br#"{"id":7}"#);
}

#[test]
fn test_json_string_is_quoted() {
    let body = JsonFormatter
        .format(HandlerOutput::Text("foo".to_string()))
        .unwrap();
    assert_eq!(drain(body), br#""foo""#);
}

#[test]
fn test_json_empty_output_has_empty_body() {
    let body = JsonFormatter.format(HandlerOutput::Empty).unwrap();
    assert!(matches!(body, ResponseBody::Empty));
}

#[test]
fn test_json_stream_error_terminates() {
    let records: Vec<std::io::Result<Value>> = vec![
        Ok(json!(1)),
        Err(std::io::Error::other("backend gone")),
        Ok(json!(2)),
    ];
    let body = JsonFormatter
        .format(HandlerOutput::record_stream(records.into_iter()))
        .unwrap();
    let ResponseBody::Stream(mut chunks) = body else {
        panic!("expected stream");
    };
    assert_eq!(chunks.next().unwrap().unwrap(), b"[1");
    assert!(chunks.next().unwrap().is_err());
    assert!(chunks.next().is_none());
}

#[test]
fn test_raw_byte_stream_passes_through() {
    let chunks: Vec<std::io::Result<Vec<u8>>> = vec![Ok(b"foo".to_vec()), Ok(b"bar".to_vec())];
    let body = RawFormatter
        .format(HandlerOutput::byte_stream(chunks.into_iter()))
        .unwrap();
    assert_eq!(drain(body), b"foobar");
}

#[test]
fn test_raw_bytes_and_text_unchanged() {
    assert_eq!(
        drain(RawFormatter.format(HandlerOutput::Bytes(vec![1, 2, 3])).unwrap()),
        vec![1, 2, 3]
    );
    assert_eq!(
        drain(
            RawFormatter
                .format(HandlerOutput::Text("plain text".to_string()))
                .unwrap()
        ),
        b"plain text"
    );
}

#[test]
fn test_raw_structured_value_falls_back_to_json() {
    let body = RawFormatter
        .format(HandlerOutput::Value(json!({"k": "v"})))
        .unwrap();
    assert_eq!(drain(body), br#"{"k":"v"}"#);
}
