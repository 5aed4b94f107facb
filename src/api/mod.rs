//! Declarative API descriptions and their registration-time build.
//!
//! An [`Api`] owns a set of route definitions for one URL prefix. Adding a
//! route eagerly builds its path template, checks the parameter-list
//! invariants, and spawns the handler coroutine; an unsupported HTTP
//! method fails registration immediately so startup can abort. Nothing in
//! the resulting table is mutated after registration.

mod build;
mod types;

pub use build::{build_path_template, check_unique_keys, registration_method, ConfigError};
pub use types::{
    ArchiveMethod, CompressionConfig, Constraints, ContainFiles, ParamSpec, ParamType,
    ResponseConfig, RouteDefinition, RouteEntry,
};

use tracing::info;

use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::router::Router;

/// A set of API routes registered under a common URL prefix.
pub struct Api {
    prefix: String,
    routes: Vec<RouteEntry>,
}

impl Api {
    /// Create an empty API set. The prefix is prepended to every path
    /// template (`""` for none); a trailing slash is normalized away.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            routes: Vec::new(),
        }
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Register one route: build its template, validate the definition,
    /// and spawn the handler coroutine under a method-derived name.
    ///
    /// HEAD definitions share the GET chain; POST and PUT routes run body
    /// parsing before extraction. An unsupported method or a duplicate
    /// parameter key is a fatal [`ConfigError`] — registration is a
    /// one-time transition and is never retried.
    ///
    /// # Safety
    ///
    /// Spawns a coroutine via `may::coroutine::Builder::spawn()`, which is
    /// unsafe in the `may` runtime. The caller must ensure the runtime is
    /// initialized before registering routes.
    pub unsafe fn route_add<F>(
        &mut self,
        dispatcher: &mut Dispatcher,
        def: RouteDefinition,
        handler: F,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&HandlerRequest) -> anyhow::Result<HandlerResponse> + Send + 'static,
    {
        let method = registration_method(&def.method)?;
        check_unique_keys(&def)?;

        let handler_name = format!(
            "{}_{}",
            method.as_str().to_ascii_lowercase(),
            def.name
        );
        let path_template = format!(
            "{}{}",
            self.prefix,
            build_path_template(&def.name, &def.path_args)
        );
        let parse_body = method == http::Method::POST || method == http::Method::PUT;

        // SAFETY: forwarded to the caller; see the function-level contract.
        unsafe {
            dispatcher.register_handler(&handler_name, handler);
        }

        info!(
            method = %method,
            path_template = %path_template,
            handler_name = %handler_name,
            "Route registered"
        );

        let mut def = def;
        def.method = method;
        self.routes.push(RouteEntry {
            def,
            handler_name,
            path_template,
            parse_body,
        });
        Ok(())
    }

    /// Compile the registered routes into a matching table.
    #[must_use]
    pub fn into_router(self) -> Router {
        Router::new(self.routes)
    }
}
