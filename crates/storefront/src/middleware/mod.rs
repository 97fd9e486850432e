//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with a bounded in-memory store)
//! 5. Security headers (CSP, camera permission, etc.)
//!
//! The [`CurrentClient`] extractor runs per handler, after the session layer.

pub mod client;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use client::CurrentClient;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{BoundedMemoryStore, create_session_layer, sweep_expired_sessions};
