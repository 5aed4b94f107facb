use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Read;

use may_minihttp::Request;
use tracing::debug;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// HTTP headers (lowercase keys).
    pub headers: HashMap<String, String>,
    /// Parsed query string parameters; repeated keys joined with `,`.
    pub query_params: HashMap<String, String>,
    /// Parsed JSON body, if one was present and parseable.
    pub body: Option<serde_json::Value>,
    /// Raw body size in bytes, before any parsing.
    pub body_len: usize,
}

/// Parse query string parameters from a URL path.
///
/// Everything after `?` is percent-decoded into a key→value map. A key
/// that appears more than once has its values joined with `,` — the
/// normalization the validator and extractor are specified against.
#[must_use]
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = HashMap::new();
    if let Some(pos) = path.find('?') {
        let query_str = &path[pos + 1..];
        for (key, value) in url::form_urlencoded::parse(query_str.as_bytes()) {
            match params.entry(key.into_owned()) {
                Entry::Occupied(mut existing) => {
                    let joined = existing.get_mut();
                    joined.push(',');
                    joined.push_str(&value);
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.into_owned());
                }
            }
        }
    }
    params
}

/// Extract method, path, headers, query parameters, and body from a raw
/// HTTP request.
#[must_use]
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);

    let mut body_str = String::new();
    let body_len = req
        .body()
        .read_to_string(&mut body_str)
        .unwrap_or_default();
    let body = if body_len > 0 {
        serde_json::from_str(&body_str).ok()
    } else {
        None
    };

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query_params.len(),
        body_len = body_len,
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
        body_len,
    }
}
