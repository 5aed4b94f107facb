mod core;
mod tracing;

pub use core::Middleware;
pub use tracing::TracingMiddleware;
