use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use crate::formatter::HandlerOutput;
use crate::middleware::Middleware;
use crate::runtime_config::RuntimeConfig;

/// Maximum inline headers before heap allocation. Most requests and
/// responses carry well under 16.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the request hot path.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Everything a handler receives for one request: the request identity,
/// the extracted positional arguments in their fixed order, and the raw
/// query map that always closes the argument list.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub path: String,
    /// Name the handler coroutine was registered under.
    pub handler_name: String,
    /// Positional argument values assembled by the extractor.
    pub args: Vec<Value>,
    /// Full raw query map (repeated keys joined with `,`).
    pub raw_query: HashMap<String, String>,
    /// Request headers (lowercase names).
    pub headers: HeaderVec,
    /// Parsed request body, when body parsing ran for this route.
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a positional argument by index.
    #[inline]
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Get a request header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a handler hands back: the output to format plus any response
/// headers it wants applied.
#[derive(Debug)]
pub struct HandlerResponse {
    pub headers: HeaderVec,
    pub output: HandlerOutput,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(output: HandlerOutput) -> Self {
        Self {
            headers: HeaderVec::new(),
            output,
        }
    }

    /// A response with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(HandlerOutput::Empty)
    }

    /// A single structured record.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::new(HandlerOutput::Value(value))
    }

    /// A plain-text body.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(HandlerOutput::Text(text.into()))
    }

    /// An ordered sequence of structured records.
    #[must_use]
    pub fn records(records: Vec<Value>) -> Self {
        Self::new(HandlerOutput::Records(records))
    }

    /// Add or replace a response header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Mark the response as a download with the given file name.
    #[must_use]
    pub fn attachment(self, file_name: &str) -> Self {
        self.header(
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        )
    }
}

impl From<HandlerOutput> for HandlerResponse {
    fn from(output: HandlerOutput) -> Self {
        Self::new(output)
    }
}

/// Failure raised by (or on behalf of) a handler; surfaced as a 500
/// response whose body is the message text.
#[derive(Debug, Clone)]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of one dispatched invocation.
pub type HandlerReply = Result<HandlerResponse, HandlerError>;

/// One unit of work queued to a handler coroutine: the request and the
/// channel its reply travels back on.
pub struct DispatchMessage {
    pub request: HandlerRequest,
    pub reply_tx: mpsc::Sender<HandlerReply>,
}

/// Channel sender that delivers requests to one handler coroutine.
pub type HandlerSender = mpsc::Sender<DispatchMessage>;

/// Routes extracted requests to registered handler coroutines and waits
/// for their replies.
///
/// Handlers are registered once at startup; afterwards the map is only
/// read, so the dispatcher is shared behind `Arc<RwLock<_>>` without any
/// per-request locking pressure.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerSender>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add middleware; executed in registration order around every
    /// dispatched invocation.
    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Register a handler function under the given name, spawning the
    /// coroutine that will process its requests.
    ///
    /// Re-registering a name replaces the previous handler; the old
    /// coroutine exits when its channel closes. Panics inside the handler
    /// are caught and reported as [`HandlerError`]s.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn()`, which is unsafe in the
    /// `may` runtime. The caller must ensure the runtime is initialized
    /// before registering handlers.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(&HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<DispatchMessage>();
        let name = name.to_string();
        let coroutine_name = name.clone();
        let stack_size = RuntimeConfig::from_env().stack_size;

        // SAFETY: spawn is unsafe per the may runtime's requirements, not
        // this function's logic. The handler is Send + 'static and every
        // failure path reports through the reply channel.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %coroutine_name,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );
                    for message in rx.iter() {
                        let started = Instant::now();
                        let reply = match std::panic::catch_unwind(
                            std::panic::AssertUnwindSafe(|| handler_fn(&message.request)),
                        ) {
                            Ok(Ok(response)) => Ok(response),
                            Ok(Err(err)) => Err(HandlerError::from(err)),
                            Err(panic) => {
                                error!(
                                    handler_name = %message.request.handler_name,
                                    panic_message = ?panic,
                                    "Handler panicked"
                                );
                                Err(HandlerError::new(format!("Handler panicked: {panic:?}")))
                            }
                        };
                        info!(
                            handler_name = %message.request.handler_name,
                            execution_time_ms = started.elapsed().as_millis() as u64,
                            ok = reply.is_ok(),
                            "Handler execution complete"
                        );
                        let _ = message.reply_tx.send(reply);
                    }
                })
        };

        if let Err(err) = spawn_result {
            error!(
                handler_name = %name,
                error = %err,
                stack_size = stack_size,
                "Failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.insert(name.clone(), tx).is_some() {
            warn!(
                handler_name = %name,
                "Replaced existing handler - old coroutine will exit"
            );
        }
    }

    /// Dispatch one extracted request to its handler and wait for the
    /// reply.
    ///
    /// Returns `None` when no handler is registered under the request's
    /// name. A handler whose channel closes mid-request (crash, resource
    /// exhaustion) yields an `Err` reply instead of hanging the request.
    #[must_use]
    pub fn dispatch(&self, request: HandlerRequest) -> Option<HandlerReply> {
        let tx = match self.handlers.get(&request.handler_name) {
            Some(tx) => tx,
            None => {
                error!(
                    handler_name = %request.handler_name,
                    available_handlers = self.handlers.len(),
                    "Handler not found"
                );
                return None;
            }
        };

        for middleware in &self.middlewares {
            middleware.before(&request);
        }

        info!(
            handler_name = %request.handler_name,
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );

        let (reply_tx, reply_rx) = mpsc::channel();
        let started = Instant::now();
        let handler_name = request.handler_name.clone();
        let message = DispatchMessage {
            request: request.clone(),
            reply_tx,
        };

        let reply = if tx.send(message).is_err() {
            Err(HandlerError::new(format!(
                "Handler '{handler_name}' is not responding"
            )))
        } else {
            match reply_rx.recv() {
                Ok(reply) => reply,
                Err(_) => Err(HandlerError::new(format!(
                    "Handler '{handler_name}' channel closed before replying"
                ))),
            }
        };

        let latency = started.elapsed();
        let status = if reply.is_ok() { 200 } else { 500 };
        for middleware in &self.middlewares {
            middleware.after(&request, status, latency);
        }

        Some(reply)
    }
}
