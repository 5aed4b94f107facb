use std::sync::Arc;

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::api::RouteEntry;

/// Maximum number of path parameters before heap allocation.
/// Most routes declare ≤4 path arguments; keep the common case on the
/// stack.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the request hot path.
///
/// Parameter names come from the static route table and are shared as
/// `Arc<str>`; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route entry (shared, never mutated after startup).
    pub entry: Arc<RouteEntry>,
    /// Path parameters captured from the URL, percent-decoded.
    pub path_params: ParamVec,
    /// Name of the handler that should process this request.
    pub handler_name: String,
}

/// Route table compiled from registered route entries.
///
/// Matching is first-registered-wins over the compiled patterns. The
/// table is built once at startup and only read afterwards, so it needs
/// no locking of its own.
#[derive(Clone)]
pub struct Router {
    routes: Vec<(Method, Regex, Arc<RouteEntry>, Vec<Arc<str>>)>,
}

impl Router {
    /// Compile a matching table from registered route entries.
    #[must_use]
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        let routes: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let (regex, param_names) = Self::template_to_regex(&entry.path_template);
                let method = entry.def.method.clone();
                (method, regex, Arc::new(entry), param_names)
            })
            .collect();

        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|(method, _, entry, _)| format!("{} {}", method, entry.path_template))
            .collect();
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Self { routes }
    }

    /// Match an HTTP method and path against the table.
    ///
    /// Returns `None` when nothing matches (a 404 at the service layer).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for (route_method, regex, entry, param_names) in &self.routes {
            if route_method != method {
                continue;
            }
            let Some(captures) = regex.captures(path) else {
                continue;
            };

            let mut path_params = ParamVec::new();
            for (index, name) in param_names.iter().enumerate() {
                if let Some(value) = captures.get(index + 1) {
                    let decoded = urlencoding::decode(value.as_str())
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| value.as_str().to_string());
                    path_params.push((Arc::clone(name), decoded));
                }
            }

            info!(
                method = %method,
                path = %path,
                handler_name = %entry.handler_name,
                path_template = %entry.path_template,
                "Route matched"
            );

            return Some(RouteMatch {
                handler_name: entry.handler_name.clone(),
                entry: Arc::clone(entry),
                path_params,
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    /// Compile a `:name` path template into a regex and the ordered list
    /// of parameter names it captures.
    pub(crate) fn template_to_regex(template: &str) -> (Regex, Vec<Arc<str>>) {
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut param_names = Vec::new();

        for segment in template.split('/') {
            if let Some(name) = segment.strip_prefix(':') {
                pattern.push_str("/([^/]+)");
                param_names.push(Arc::from(name));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }
        if pattern.len() == 1 {
            pattern.push('/');
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).expect("Failed to compile path template regex");
        (regex, param_names)
    }
}
