//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /                            - Home page
//!
//! # Products
//! GET  /products?category=          - Product listing, optionally filtered
//! GET  /products/{id}               - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                        - Cart page
//! POST /cart/add                    - Add one unit (returns count badge, triggers cart-updated)
//! POST /cart/update                 - Set quantity (returns cart_items fragment)
//! POST /cart/remove                 - Remove line (returns cart_items fragment)
//! POST /cart/clear                  - Empty cart (returns cart_items fragment)
//! GET  /cart/count                  - Cart count badge (fragment)
//! GET  /api/cart                    - Cart contents and totals (JSON)
//!
//! # Checkout
//! GET  /checkout                    - Checkout form
//! POST /checkout                    - Place simulated order
//!
//! # Try-on
//! GET  /try-on/{id}                 - Try-on page
//! GET  /try-on/{id}/status          - Try-on status (fragment, polled)
//! POST /try-on/{id}/capture         - Start from camera capture
//! POST /try-on/{id}/measurements    - Start from body measurements
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;
pub mod try_on;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the try-on routes router.
pub fn try_on_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(try_on::show))
        .route("/{id}/status", get(try_on::status))
        .route("/{id}/capture", post(try_on::capture))
        .route("/{id}/measurements", post(try_on::measurements))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/api/cart", get(cart::snapshot))
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .nest("/try-on", try_on_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Build the full application: routes, static files, sessions and middleware.
///
/// Sentry layers are added by the binary around this router.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.sessions().clone(), state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
