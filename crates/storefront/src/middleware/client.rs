//! Browser client identity.
//!
//! Every browser gets a [`ClientId`] the first time it touches a cart route.
//! The id is kept in the session and keys that browser's persisted cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use wearview_core::ClientId;

use crate::error::AppError;
use crate::models::session_keys;

/// Extractor yielding the current browser's client id.
///
/// Assigns and stores a fresh id when the session has none yet.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     State(state): State<AppState>,
///     CurrentClient(client): CurrentClient,
/// ) -> Result<String> {
///     let count = state.with_cart(client, |cart| Ok(cart.total_items())).await?;
///     Ok(format!("{count} items"))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentClient(pub ClientId);

impl<S> FromRequestParts<S> for CurrentClient
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        if let Some(client) = session.get::<ClientId>(session_keys::CLIENT_ID).await? {
            return Ok(Self(client));
        }

        let client = ClientId::generate();
        session.insert(session_keys::CLIENT_ID, client).await?;
        tracing::debug!(client_id = %client, "Assigned new client id");
        Ok(Self(client))
    }
}
