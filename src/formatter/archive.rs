use std::io::{self, Cursor, Write};

use encoding_rs::Encoding;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::api::{ArchiveMethod, ResponseConfig};

use super::{FormatError, Formatter, HandlerOutput, ResponseBody};

/// Size of the chunks the archive stream hands to the transport.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Characters that are unsafe in entry file names on common filesystems;
/// each is replaced with `_` before the name enters the container.
const UNSAFE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Archive configuration resolved once per response from the route's
/// declared settings plus the documented defaults. Immutable — the
/// declared configuration is never mutated to fill in defaults.
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub file_name_key: String,
    pub data_key: String,
    /// Record key carrying the entry timestamp; `None` stamps entries
    /// with the time of formatting.
    pub time_stamp_key: Option<String>,
    pub file_name_encoding: &'static Encoding,
    pub method: ArchiveMethod,
    pub level: i64,
}

impl ArchiveSettings {
    /// Resolve settings for one response: declared values win, anything
    /// unset falls back to `"fileName"`/`"data"`, formatting-time
    /// timestamps, `us-ascii` names, DEFLATE level 9.
    #[must_use]
    pub fn resolve(response: &ResponseConfig) -> Self {
        let contain = response.contain_files.clone().unwrap_or_default();
        let compression = response.compression.clone().unwrap_or_default();
        let encoding = compression
            .file_name_encoding
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(encoding_rs::WINDOWS_1252);
        Self {
            file_name_key: contain.file_name_key,
            data_key: contain.data_key,
            time_stamp_key: contain.time_stamp_key,
            file_name_encoding: encoding,
            method: compression.method.unwrap_or(ArchiveMethod::Deflate),
            level: compression.level.unwrap_or(9),
        }
    }
}

/// One file inside the archive, derived from a handler record. Exists
/// only while the archive response is being formatted.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub payload: Vec<u8>,
    pub timestamp: OffsetDateTime,
}

/// ZIP archive serialization strategy.
///
/// Accepts a single record or an ordered sequence of records, maps each
/// through the configured keys into an [`ArchiveEntry`], and produces the
/// container as a lazily started, chunked byte stream.
pub struct ArchiveFormatter {
    settings: ArchiveSettings,
}

impl ArchiveFormatter {
    #[must_use]
    pub fn new(settings: ArchiveSettings) -> Self {
        Self { settings }
    }

    fn entry_from_record(&self, record: &Value) -> Result<ArchiveEntry, FormatError> {
        let Some(object) = record.as_object() else {
            return Err(FormatError::new("archive record must be an object"));
        };

        let name = object
            .get(&self.settings.file_name_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FormatError::new(format!(
                    "archive record is missing file name key '{}'",
                    self.settings.file_name_key
                ))
            })?;

        let payload = match object.get(&self.settings.data_key) {
            Some(Value::String(text)) => text.clone().into_bytes(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .filter(|byte| *byte <= u64::from(u8::MAX))
                        .map(|byte| byte as u8)
                        .ok_or_else(|| {
                            FormatError::new(format!(
                                "archive record data key '{}' holds a non-byte element",
                                self.settings.data_key
                            ))
                        })
                })
                .collect::<Result<Vec<u8>, FormatError>>()?,
            _ => {
                return Err(FormatError::new(format!(
                    "archive record is missing data key '{}'",
                    self.settings.data_key
                )))
            }
        };

        let timestamp = self
            .settings
            .time_stamp_key
            .as_deref()
            .and_then(|key| object.get(key))
            .and_then(parse_timestamp)
            .unwrap_or_else(OffsetDateTime::now_utc);

        Ok(ArchiveEntry {
            name: sanitize_file_name(name),
            payload,
            timestamp,
        })
    }
}

impl Formatter for ArchiveFormatter {
    fn format(&self, output: HandlerOutput) -> Result<ResponseBody, FormatError> {
        let records: Vec<Value> = match output {
            HandlerOutput::Value(record) => vec![record],
            HandlerOutput::Records(records) => records,
            HandlerOutput::RecordStream(stream) => stream
                .collect::<io::Result<Vec<Value>>>()
                .map_err(FormatError::from)?,
            HandlerOutput::Empty => Vec::new(),
            other => {
                return Err(FormatError::new(format!(
                    "archive response requires structured records, got {other:?}"
                )))
            }
        };

        let entries = records
            .iter()
            .map(|record| self.entry_from_record(record))
            .collect::<Result<Vec<ArchiveEntry>, FormatError>>()?;

        debug!(
            entry_count = entries.len(),
            method = %self.settings.method,
            level = self.settings.level,
            "Archive response prepared"
        );

        Ok(ResponseBody::Stream(Box::new(ArchiveStream::new(
            entries,
            self.settings.clone(),
        ))))
    }
}

/// Replace filesystem-unsafe characters in an entry name with `_`.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Re-encode an entry name into the configured byte encoding. Characters
/// the target encoding cannot represent degrade to its substitution
/// form, mirroring the transliteration behavior of the source system's
/// name encoder.
fn encode_file_name(name: &str, encoding: &'static Encoding) -> String {
    let (bytes, _, _) = encoding.encode(name);
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Read a record timestamp: integers are Unix epoch milliseconds, strings
/// are RFC 3339.
fn parse_timestamp(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64()?;
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
        }
        Value::String(s) => {
            OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339).ok()
        }
        _ => None,
    }
}

enum ArchiveState {
    Pending(Vec<ArchiveEntry>),
    Draining { data: Vec<u8>, position: usize },
    Done,
}

/// Lazily started archive stream: the container is assembled on the
/// first pull and delivered in fixed-size chunks, so the consumer's pace
/// governs delivery. A build failure is reported through the stream's
/// error channel and terminates it.
struct ArchiveStream {
    state: ArchiveState,
    settings: ArchiveSettings,
}

impl ArchiveStream {
    fn new(entries: Vec<ArchiveEntry>, settings: ArchiveSettings) -> Self {
        Self {
            state: ArchiveState::Pending(entries),
            settings,
        }
    }

    fn build(entries: &[ArchiveEntry], settings: &ArchiveSettings) -> io::Result<Vec<u8>> {
        let method = match settings.method {
            ArchiveMethod::Deflate => CompressionMethod::Deflated,
            ArchiveMethod::Store => CompressionMethod::Stored,
        };
        let level = match settings.method {
            ArchiveMethod::Deflate => Some(settings.level),
            ArchiveMethod::Store => None,
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in entries {
            let modified = zip::DateTime::try_from(entry.timestamp).unwrap_or_default();
            let options = SimpleFileOptions::default()
                .compression_method(method)
                .compression_level(level)
                .last_modified_time(modified);
            let name = encode_file_name(&entry.name, settings.file_name_encoding);
            writer
                .start_file(name, options)
                .map_err(io::Error::other)?;
            writer.write_all(&entry.payload)?;
        }
        let cursor = writer.finish().map_err(io::Error::other)?;
        Ok(cursor.into_inner())
    }
}

impl Iterator for ArchiveStream {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, ArchiveState::Done) {
                ArchiveState::Pending(entries) => match Self::build(&entries, &self.settings) {
                    Ok(data) => {
                        self.state = ArchiveState::Draining { data, position: 0 };
                    }
                    Err(err) => return Some(Err(err)),
                },
                ArchiveState::Draining { data, position } => {
                    if position >= data.len() {
                        return None;
                    }
                    let end = (position + STREAM_CHUNK_SIZE).min(data.len());
                    let chunk = data[position..end].to_vec();
                    self.state = ArchiveState::Draining {
                        data,
                        position: end,
                    };
                    return Some(Ok(chunk));
                }
                ArchiveState::Done => return None,
            }
        }
    }
}
