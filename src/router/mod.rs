//! Path matching and route resolution.
//!
//! At registration time each route's path template (e.g.
//! `/api/v1/items/:id/detail/:detail`) is compiled into a regex that
//! matches request paths and captures the `:name` segments. At request
//! time the router tests the compiled patterns in registration order and
//! returns the matched entry together with the extracted path-parameter
//! values.

mod core;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
