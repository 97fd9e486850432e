//! WearView Core - cart store and storefront domain types.
//!
//! This crate provides the pieces shared by every WearView component:
//! - `storefront` - Public-facing try-on storefront
//! - `cli` - Operator tooling for inspecting persisted carts
//!
//! # Architecture
//!
//! The core crate performs no I/O of its own. The [`cart::CartStore`] persists
//! through the [`cart::CartStorage`] trait; the storefront supplies a
//! file-backed implementation and tests use [`cart::MemoryStorage`].
//!
//! # Modules
//!
//! - [`cart`] - Line items, the cart store, derived totals and persistence seam
//! - [`checkout`] - Order summary, checkout form validation, simulated order placement
//! - [`try_on`] - Body measurements and simulated try-on sessions
//! - [`types`] - Newtype wrappers for IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod try_on;
pub mod types;

pub use types::*;
