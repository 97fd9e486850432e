//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation restores the browser's cart from storage, applies the
//! change through [`CartStore`], and responds with a fragment plus an
//! `HX-Trigger: cart-updated` header so the count badge refreshes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use wearview_core::cart::{CartStorage, CartStore, LineItem};
use wearview_core::{Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentClient;
use crate::state::AppState;

/// HTMX event fired after any cart mutation.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image: String,
    pub quantity: u32,
    /// Quantity posted by the "-" button; zero removes the line.
    pub decrease_to: i64,
    /// Quantity posted by the "+" button.
    pub increase_to: i64,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format a rupee amount for display.
pub(crate) fn format_inr(amount: Decimal) -> String {
    Price::inr(amount).display()
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.as_str().to_string(),
            name: item.name.clone(),
            category: item.category.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            decrease_to: i64::from(item.quantity) - 1,
            increase_to: i64::from(item.quantity) + 1,
            price: format_inr(item.price),
            line_price: format_inr(item.line_total()),
        }
    }
}

impl<S: CartStorage> From<&CartStore<S>> for CartView {
    fn from(cart: &CartStore<S>) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_inr(cart.total_price()),
            item_count: cart.total_items(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
}

/// Update cart form data.
///
/// A quantity of zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// JSON view of the cart.
#[derive(Debug, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub total_items: u64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Respond with the refreshed cart items fragment and the update trigger.
fn items_fragment(cart: CartView) -> Response {
    (AppendHeaders([CART_UPDATED_TRIGGER]), CartItemsTemplate { cart }).into_response()
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
) -> Result<CartShowTemplate> {
    let cart = state
        .with_cart(client, |cart| Ok(CartView::from(&*cart)))
        .await?;
    Ok(CartShowTemplate { cart })
}

/// Add one unit of a product to the cart (HTMX).
///
/// The product is resolved in the catalog; name and price never come from
/// the request. Returns the updated count badge.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let descriptor = state
        .catalog()
        .find(&ProductId::new(form.id.as_str()))
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.id)))?
        .descriptor();

    let count = state
        .with_cart(client, move |cart| {
            cart.add_to_cart(descriptor)?;
            Ok(cart.total_items())
        })
        .await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", form.id.as_str())]));

    Ok((AppendHeaders([CART_UPDATED_TRIGGER]), CartCountTemplate { count }).into_response())
}

/// Set a line's quantity (HTMX).
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let cart = state
        .with_cart(client, move |cart| {
            cart.update_quantity(&ProductId::new(form.id), form.quantity)?;
            Ok(CartView::from(&*cart))
        })
        .await?;
    Ok(items_fragment(cart))
}

/// Remove a line (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let id = ProductId::new(form.id.as_str());
    let cart = state
        .with_cart(client, move |cart| {
            cart.remove_from_cart(&id)?;
            Ok(CartView::from(&*cart))
        })
        .await?;
    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", form.id.as_str())]));
    Ok(items_fragment(cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
) -> Result<Response> {
    let cart = state
        .with_cart(client, |cart| {
            cart.clear_cart()?;
            Ok(CartView::from(&*cart))
        })
        .await?;
    Ok(items_fragment(cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
) -> Result<CartCountTemplate> {
    let count = state
        .with_cart(client, |cart| Ok(cart.total_items()))
        .await?;
    Ok(CartCountTemplate { count })
}

/// Cart contents and totals as JSON.
#[instrument(skip(state))]
pub async fn snapshot(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
) -> Result<Json<CartSnapshot>> {
    let snapshot = state
        .with_cart(client, |cart| {
            Ok(CartSnapshot {
                items: cart.items().to_vec(),
                total_items: cart.total_items(),
                total_price: cart.total_price(),
            })
        })
        .await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wearview_core::cart::MemoryStorage;

    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_cart_view_formats_prices() {
        let catalog = Catalog::default();
        let mut cart = CartStore::restore(MemoryStorage::new());
        let tee = catalog.find(&ProductId::new("1")).unwrap();
        cart.add_to_cart(tee.descriptor()).unwrap();
        cart.add_to_cart(tee.descriptor()).unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "₹2598");
        let item = view.items.first().unwrap();
        assert_eq!(item.price, "₹1299");
        assert_eq!(item.line_price, "₹2598");
    }

    #[test]
    fn test_count_badge_renders_total_items() {
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains('3'));
    }

    #[test]
    fn test_snapshot_serializes_numbers() {
        let snapshot = CartSnapshot {
            items: Vec::new(),
            total_items: 0,
            total_price: Decimal::ZERO,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["total_items"], 0);
        assert!(json["total_price"].is_number());
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
