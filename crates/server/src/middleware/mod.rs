//! HTTP middleware stack for the shop API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost, added in `main`)
//! 2. CORS (added in `main` from configuration)
//! 3. `TraceLayer` (request span with method, uri, status and latency)
//! 4. Request ID (records `request_id` on the span)

pub mod cors;
pub mod request_id;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
