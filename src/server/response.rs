use may_minihttp::Response;
use tracing::error;

use crate::dispatcher::HeaderVec;
use crate::formatter::ResponseBody;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

fn push_header(res: &mut Response, name: &str, value: &str) {
    // may_minihttp wants 'static header lines; build and leak per write.
    let header = format!("{name}: {value}").into_boxed_str();
    res.header(Box::leak(header));
}

/// Write a formatted response: status line, content type, handler-set
/// headers, then the body.
///
/// Streamed bodies are drained pull-by-pull into the transport buffer; a
/// failing chunk is logged and truncates the response — the bytes already
/// written stay written, and no recovery is attempted.
pub fn write_response(
    res: &mut Response,
    status: u16,
    content_type: Option<&str>,
    headers: &HeaderVec,
    body: ResponseBody,
) {
    res.status_code(status as usize, status_reason(status));

    if let Some(ct) = content_type {
        push_header(res, "Content-Type", ct);
    }
    for (name, value) in headers {
        push_header(res, name, value);
    }

    match body {
        ResponseBody::Empty => {
            res.body_vec(Vec::new());
        }
        ResponseBody::Full(bytes) => {
            res.body_vec(bytes);
        }
        ResponseBody::Stream(chunks) => {
            let mut buffer = Vec::new();
            for chunk in chunks {
                match chunk {
                    Ok(bytes) => buffer.extend_from_slice(&bytes),
                    Err(err) => {
                        error!(error = %err, "response stream failed; truncating");
                        break;
                    }
                }
            }
            res.body_vec(buffer);
        }
    }
}

/// Write an error response with a plain-text body.
///
/// Validation failures rely on the body carrying the validator's message
/// verbatim.
pub fn write_error(res: &mut Response, status: u16, message: &str) {
    res.status_code(status as usize, status_reason(status));
    push_header(res, "Content-Type", "text/plain; charset=utf-8");
    res.body_vec(message.as_bytes().to_vec());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(400), "Bad Request");
        assert_eq!(status_reason(413), "Payload Too Large");
    }
}
