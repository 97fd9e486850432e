//! Session keys.
//!
//! The session holds only small per-browser values. Carts are persisted
//! outside the session, keyed by the client id stored here.

/// Session keys for storefront data.
pub mod keys {
    /// Key for the browser's [`wearview_core::ClientId`].
    pub const CLIENT_ID: &str = "client_id";

    /// Key for the most recent [`wearview_core::try_on::TryOnSession`].
    pub const TRY_ON: &str = "try_on";
}
