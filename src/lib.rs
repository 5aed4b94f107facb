//! # routedef
//!
//! **routedef** turns declarative API route definitions — method,
//! path-argument schema, query-option schema, body-parameter schema,
//! response format — into a complete request-handling pipeline on the
//! `may` coroutine runtime: typed parameter extraction, validation,
//! handler dispatch, and streamed response formatting.
//!
//! ## Architecture
//!
//! - **[`api`]** — declarative route definitions and their
//!   registration-time build (path templates, invariant checks)
//! - **[`validator`]** — pure per-parameter validation with user-facing
//!   failure messages
//! - **[`extractor`]** — ordered positional argument assembly
//! - **[`router`]** — path-template matching and parameter capture
//! - **[`dispatcher`]** — coroutine-based handler dispatch
//! - **[`formatter`]** — content-type driven response serialization
//!   (streamed JSON, streamed ZIP archive, raw passthrough)
//! - **[`server`]** — HTTP service built on `may_minihttp`
//! - **[`middleware`]** — hooks around dispatched invocations
//!
//! ### Request flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as AppService
//!     participant Router
//!     participant Extractor
//!     participant Handler as Handler (coroutine)
//!     participant Formatter
//!
//!     Client->>Service: HTTP request
//!     Service->>Router: route(method, path)
//!     Router-->>Service: RouteMatch + path params
//!     Service->>Extractor: extract(def, params, query, body)
//!     alt validation fails
//!         Service-->>Client: 400 + validator message
//!     end
//!     Extractor-->>Service: ordered argument list
//!     Service->>Handler: dispatch over channel
//!     Handler-->>Service: HandlerResponse
//!     Service->>Formatter: format by declared content type
//!     Formatter-->>Service: body (full or streamed)
//!     Service-->>Client: response
//! ```
//!
//! Route tables and dispatch maps are built once at startup and never
//! mutated afterwards; each in-flight request is one logical task on the
//! coroutine scheduler, and streamed bodies are pull-based so a slow
//! consumer suspends only its own producer.
//!
//! ## Quick start
//!
//! ```no_run
//! use http::Method;
//! use routedef::{
//!     Api, Constraints, Dispatcher, HandlerResponse, HttpServer, ParamSpec, ParamType,
//!     ResponseConfig, RouteDefinition,
//! };
//! use serde_json::json;
//! use std::sync::{Arc, RwLock};
//!
//! let mut api = Api::new("/api/v1");
//! let mut dispatcher = Dispatcher::new();
//!
//! let def = RouteDefinition::new(Method::GET, "items")
//!     .path_args(vec![ParamSpec::new("id", ParamType::Number)
//!         .validate(Constraints::new().min(1.0).max(999.0))])
//!     .response(ResponseConfig::json());
//!
//! unsafe {
//!     api.route_add(&mut dispatcher, def, |req| {
//!         Ok(HandlerResponse::json(json!({ "id": req.args[0].clone() })))
//!     })
//!     .expect("route registration");
//! }
//!
//! let router = Arc::new(RwLock::new(api.into_router()));
//! let dispatcher = Arc::new(RwLock::new(dispatcher));
//! let service = routedef::AppService::new(router, dispatcher);
//! let handle = HttpServer(service).start("127.0.0.1:8080").expect("bind");
//! handle.join().expect("server");
//! ```
//!
//! ## Runtime considerations
//!
//! routedef runs on the `may` coroutine runtime, not tokio: handlers run
//! in coroutines, stack size is configured with `ROUTEDEF_STACK_SIZE`,
//! and blocking calls should use `may`'s facilities.

pub mod api;
pub mod dispatcher;
pub mod extractor;
pub mod formatter;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod validator;

pub use api::{
    Api, ArchiveMethod, CompressionConfig, ConfigError, Constraints, ContainFiles, ParamSpec,
    ParamType, ResponseConfig, RouteDefinition,
};
pub use dispatcher::{Dispatcher, HandlerError, HandlerRequest, HandlerResponse};
pub use extractor::{extract, ExtractedArguments};
pub use formatter::{HandlerOutput, ResponseBody};
pub use router::{RouteMatch, Router};
pub use server::{AppService, HttpServer, ServerHandle};
pub use validator::{validate, ValidationError};
