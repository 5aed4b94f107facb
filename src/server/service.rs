use std::io;
use std::sync::{Arc, RwLock};

use http::Method;
use may_minihttp::{HttpService, Request, Response};
use tracing::debug;

use super::request::{parse_request, ParsedRequest};
use super::response::{write_error, write_response};
use crate::dispatcher::{Dispatcher, HandlerRequest, HeaderVec};
use crate::extractor::extract;
use crate::formatter::{self, Formatter, RawFormatter, ResponseBody};
use crate::router::Router;

/// Default request-body budget: 1 MiB, the conventional JSON payload cap.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// The per-request dispatch controller.
///
/// One `call` runs the pipeline `Extracting → Invoking → Formatting →
/// Responded` with early exits into the failed states: a validation
/// failure answers 400 with the validator's message verbatim, a missing
/// route 404, an oversized body 413, and everything else that goes wrong
/// 500 with the error's message text. Nothing a request does escapes this
/// boundary.
pub struct AppService {
    pub router: Arc<RwLock<Router>>,
    pub dispatcher: Arc<RwLock<Dispatcher>>,
    pub body_limit: usize,
}

impl Clone for AppService {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            dispatcher: Arc::clone(&self.dispatcher),
            body_limit: self.body_limit,
        }
    }
}

impl AppService {
    #[must_use]
    pub fn new(router: Arc<RwLock<Router>>, dispatcher: Arc<RwLock<Dispatcher>>) -> Self {
        Self {
            router,
            dispatcher,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
            body_len,
        } = parse_request(req);

        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            write_error(res, 404, "Not Found");
            return Ok(());
        };
        // HEAD shares the GET chain.
        let lookup_method = if method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };

        let route_match = {
            let router = match self.router.read() {
                Ok(router) => router,
                Err(_) => {
                    write_error(res, 500, "router lock poisoned");
                    return Ok(());
                }
            };
            router.route(&lookup_method, &path)
        };
        let Some(route_match) = route_match else {
            write_error(res, 404, "Not Found");
            return Ok(());
        };
        let entry = &route_match.entry;

        // Size violations are a transport-level concern, reported before
        // the core's own validation runs.
        if entry.parse_body && body_len > self.body_limit {
            write_error(res, 413, "Request Entity Too Large");
            return Ok(());
        }
        let body = if entry.parse_body { body } else { None };

        // Extracting
        let args = match extract(
            &entry.def,
            &route_match.path_params,
            &query_params,
            body.as_ref(),
        ) {
            Ok(args) => args,
            Err(err) => {
                debug!(path = %path, error = %err, "extraction failed");
                write_error(res, 400, &err.to_string());
                return Ok(());
            }
        };

        // Invoking
        let mut request_headers = HeaderVec::new();
        for (name, value) in &headers {
            request_headers.push((Arc::from(name.as_str()), value.clone()));
        }
        let handler_request = HandlerRequest {
            method,
            path,
            handler_name: route_match.handler_name.clone(),
            args: args.values,
            raw_query: args.raw_query,
            headers: request_headers,
            body,
        };
        let reply = {
            let dispatcher = match self.dispatcher.read() {
                Ok(dispatcher) => dispatcher,
                Err(_) => {
                    write_error(res, 500, "dispatcher lock poisoned");
                    return Ok(());
                }
            };
            dispatcher.dispatch(handler_request)
        };
        let response = match reply {
            None => {
                write_error(res, 500, "Handler failed or not registered");
                return Ok(());
            }
            Some(Err(err)) => {
                write_error(res, 500, &err.message);
                return Ok(());
            }
            Some(Ok(response)) => response,
        };

        // Formatting
        let content_type = entry.def.response.content_type.clone();
        let formatted = match &content_type {
            Some(ct) => formatter::select(ct, &entry.def.response).format(response.output),
            None => RawFormatter.format(response.output),
        };
        match formatted {
            Err(err) => write_error(res, 500, &err.to_string()),
            Ok(body) => {
                // An empty body answers 204 and carries no content type.
                let (status, content_type) = match body {
                    ResponseBody::Empty => (204, None),
                    _ => (200, content_type),
                };
                write_response(res, status, content_type.as_deref(), &response.headers, body);
            }
        }
        Ok(())
    }
}
