use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::dispatcher::HandlerRequest;

/// Emits one structured event on each side of a dispatched invocation.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) {
        info!(
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            "request start"
        );
    }

    fn after(&self, req: &HandlerRequest, status: u16, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            status = status,
            latency_ms = latency.as_millis() as u64,
            "request end"
        );
    }
}
