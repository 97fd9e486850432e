//! WearView Storefront library.
//!
//! The storefront serves the catalog, the cart, a simulated checkout and
//! the simulated virtual try-on. It is a library so the integration tests
//! can drive the router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;

pub use routes::app;
pub use state::AppState;
