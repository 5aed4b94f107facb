use std::time::Duration;

use crate::dispatcher::HandlerRequest;

/// Hook around every dispatched invocation.
///
/// Middleware is executed in registration order: `before` ahead of the
/// handler, `after` once the reply (or failure) is in hand.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) {}
    fn after(&self, _req: &HandlerRequest, _status: u16, _latency: Duration) {}
}
