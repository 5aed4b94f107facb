//! Tests for the archive formatter: record mapping, container round
//! trips, file-name sanitization, and the compression settings.

use std::io::{Cursor, Read};

use routedef::formatter::{ArchiveFormatter, ArchiveSettings, Formatter, HandlerOutput};
use routedef::{ArchiveMethod, CompressionConfig, ContainFiles, ResponseBody, ResponseConfig};
use serde_json::json;

fn drain(body: ResponseBody) -> Vec<u8> {
    match body {
        ResponseBody::Empty => Vec::new(),
        ResponseBody::Full(bytes) => bytes,
        ResponseBody::Stream(chunks) => chunks
            .map(|chunk| chunk.expect("archive stream chunk"))
            .flatten()
            .collect(),
    }
}

fn zip_response() -> ResponseConfig {
    ResponseConfig {
        content_type: Some("application/zip".to_string()),
        contain_files: Some(ContainFiles {
            file_name_key: "fileName".to_string(),
            data_key: "data".to_string(),
            time_stamp_key: Some("timeStamp".to_string()),
        }),
        compression: Some(CompressionConfig {
            file_name_encoding: Some("us-ascii".to_string()),
            method: Some(ArchiveMethod::Deflate),
            level: Some(9),
        }),
    }
}

fn formatter(config: &ResponseConfig) -> ArchiveFormatter {
    ArchiveFormatter::new(ArchiveSettings::resolve(config))
}

#[test]
fn test_two_records_round_trip() {
    let config = zip_response();
    let records = vec![
        json!({
            "fileName": "file1.bin",
            "timeStamp": 1558398147051_i64,
            "data": "payload one",
        }),
        json!({
            "fileName": "file2.bin",
            "timeStamp": 1558398147051_i64,
            "data": "payload two",
        }),
    ];

    let bytes = drain(
        formatter(&config)
            .format(HandlerOutput::Records(records))
            .unwrap(),
    );
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut contents = String::new();
    archive
        .by_name("file1.bin")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "payload one");

    contents.clear();
    archive
        .by_name("file2.bin")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "payload two");
}

#[test]
fn test_single_record_accepted() {
    let config = zip_response();
    let record = json!({
        "fileName": "only.txt",
        "timeStamp": 1558398147051_i64,
        "data": "solo",
    });

    let bytes = drain(formatter(&config).format(HandlerOutput::Value(record)).unwrap());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.by_index(0).unwrap().name(), "only.txt");
}

#[test]
fn test_unsafe_name_characters_replaced() {
    let config = zip_response();
    let record = json!({
        "fileName": r#"dir/sub\x:y*z?"a<b>c|.bin"#,
        "timeStamp": 1558398147051_i64,
        "data": "x",
    });

    let bytes = drain(formatter(&config).format(HandlerOutput::Value(record)).unwrap());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "dir_sub_x_y_z__a_b_c_.bin");
}

#[test]
fn test_store_method_keeps_payload_readable() {
    let mut config = zip_response();
    config.compression = Some(CompressionConfig {
        file_name_encoding: None,
        method: Some(ArchiveMethod::Store),
        level: None,
    });
    let record = json!({
        "fileName": "stored.txt",
        "timeStamp": 1558398147051_i64,
        "data": "stored payload",
    });

    let bytes = drain(formatter(&config).format(HandlerOutput::Value(record)).unwrap());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut contents = String::new();
    archive
        .by_index(0)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "stored payload");
}

#[test]
fn test_byte_array_payload() {
    let config = zip_response();
    let record = json!({
        "fileName": "bytes.bin",
        "timeStamp": 1558398147051_i64,
        "data": [0, 1, 2, 255],
    });

    let bytes = drain(formatter(&config).format(HandlerOutput::Value(record)).unwrap());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut contents = Vec::new();
    archive
        .by_index(0)
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    assert_eq!(contents, vec![0, 1, 2, 255]);
}

#[test]
fn test_missing_file_name_key_is_an_error() {
    let config = zip_response();
    let record = json!({ "data": "x" });
    let err = formatter(&config)
        .format(HandlerOutput::Value(record))
        .unwrap_err();
    assert!(err.to_string().contains("fileName"));
}

#[test]
fn test_default_timestamp_used_when_key_absent() {
    // No timeStampKey configured: entries are stamped at formatting time
    // and the archive still round-trips.
    let config = ResponseConfig {
        content_type: Some("application/zip".to_string()),
        contain_files: None,
        compression: None,
    };
    let record = json!({ "fileName": "now.txt", "data": "n" });

    let bytes = drain(formatter(&config).format(HandlerOutput::Value(record)).unwrap());
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "now.txt");
}
