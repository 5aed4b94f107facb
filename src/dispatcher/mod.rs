//! Coroutine-based handler dispatch.
//!
//! Every registered route gets one handler coroutine. Requests reach it
//! over an MPSC channel after extraction has succeeded, and the reply
//! travels back over a per-request channel. Handler panics are caught and
//! converted to errors, so one failing handler never takes the server
//! down.

mod core;

pub use core::{
    DispatchMessage, Dispatcher, HandlerError, HandlerReply, HandlerRequest, HandlerResponse,
    HandlerSender, HeaderVec, MAX_INLINE_HEADERS,
};
