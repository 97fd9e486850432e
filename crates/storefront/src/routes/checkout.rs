//! Checkout route handlers.
//!
//! Payment is simulated: a valid submission waits for the configured
//! checkout delay, then the order is placed and the cart cleared.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;
use wearview_core::cart::{CartStorage, CartStore};
use wearview_core::checkout::{
    CheckoutDetails, CheckoutError, CheckoutForm, OrderConfirmation, OrderSummary, PaymentMethod,
    ShippingMethod, place_order,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentClient;
use crate::routes::cart::{CartItemView, format_inr};
use crate::state::AppState;

/// Money breakdown display data for templates.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<OrderSummary> for SummaryView {
    fn from(summary: OrderSummary) -> Self {
        Self {
            subtotal: format_inr(summary.subtotal),
            shipping: if summary.shipping == Decimal::ZERO {
                "Free".to_string()
            } else {
                format_inr(summary.shipping)
            },
            tax: format_inr(summary.tax),
            total: format_inr(summary.total),
        }
    }
}

/// A radio option on the checkout form.
#[derive(Clone)]
pub struct OptionView {
    pub value: &'static str,
    pub label: String,
    pub checked: bool,
}

fn shipping_options(selected: ShippingMethod) -> Vec<OptionView> {
    ShippingMethod::ALL
        .into_iter()
        .map(|method| {
            let cost = method.cost();
            let price = if cost == Decimal::ZERO {
                "Free".to_string()
            } else {
                format_inr(cost)
            };
            OptionView {
                value: method.as_str(),
                label: format!("{} - {price}", method.label()),
                checked: method == selected,
            }
        })
        .collect()
}

fn payment_options(selected: PaymentMethod) -> Vec<OptionView> {
    PaymentMethod::ALL
        .into_iter()
        .map(|method| OptionView {
            value: method.as_str(),
            label: method.label().to_string(),
            checked: method == selected,
        })
        .collect()
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
    pub form: CheckoutForm,
    pub shipping_options: Vec<OptionView>,
    pub payment_options: Vec<OptionView>,
    pub error: Option<String>,
}

impl CheckoutShowTemplate {
    fn new<S: CartStorage>(cart: &CartStore<S>, form: CheckoutForm, error: Option<String>) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            summary: OrderSummary::from_subtotal(cart.total_price(), form.shipping_method).into(),
            shipping_options: shipping_options(form.shipping_method),
            payment_options: payment_options(form.payment_method),
            form,
            error,
        }
    }
}

/// Shown when there is nothing to check out.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/empty.html")]
pub struct CheckoutEmptyTemplate;

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub order_number: String,
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
    pub first_name: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub payment: &'static str,
    pub shipping: &'static str,
}

impl From<OrderConfirmation> for CheckoutCompleteTemplate {
    fn from(order: OrderConfirmation) -> Self {
        let contact = &order.details.contact;
        let address = &order.details.address;
        Self {
            order_number: order.order_number.to_string(),
            items: order.items.iter().map(CartItemView::from).collect(),
            summary: order.summary.into(),
            first_name: contact.first_name.clone(),
            name: format!("{} {}", contact.first_name, contact.last_name),
            email: contact.email.to_string(),
            address: format!(
                "{}, {}, {} {}",
                address.street, address.city, address.state, address.pin_code
            ),
            payment: order.details.payment_method.label(),
            shipping: order.details.shipping_method.label(),
        }
    }
}

/// Display the checkout form.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
) -> Result<Response> {
    let page = state
        .with_cart(client, |cart| {
            Ok((!cart.is_empty())
                .then(|| CheckoutShowTemplate::new(cart, CheckoutForm::default(), None)))
        })
        .await?;
    Ok(page.map_or_else(
        || CheckoutEmptyTemplate.into_response(),
        IntoResponse::into_response,
    ))
}

/// Outcome of checking a submission against the current cart.
enum Review {
    Empty,
    Invalid(CheckoutShowTemplate),
    Valid(CheckoutDetails),
}

/// Validate the form, simulate payment, and place the order.
///
/// Validation errors re-render the form with the submitted values.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    CurrentClient(client): CurrentClient,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let review = state
        .with_cart(client, move |cart| {
            if cart.is_empty() {
                return Ok(Review::Empty);
            }
            Ok(match form.clone().validate() {
                Ok(details) => Review::Valid(details),
                Err(err) => {
                    tracing::info!(error = %err, "Checkout form rejected");
                    let page = CheckoutShowTemplate::new(cart, form, Some(err.to_string()));
                    Review::Invalid(page)
                }
            })
        })
        .await?;

    let details = match review {
        Review::Empty => return Ok(CheckoutEmptyTemplate.into_response()),
        Review::Invalid(page) => {
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
        Review::Valid(details) => details,
    };

    tokio::time::sleep(state.config().checkout_delay).await;

    // Restored again: the cart may have changed while payment was "processing".
    let placed = state
        .with_cart(client, move |cart| match place_order(cart, details) {
            Ok(order) => Ok(Some(order)),
            Err(CheckoutError::EmptyCart) => Ok(None),
            Err(err) => Err(err.into()),
        })
        .await?;

    let Some(order) = placed else {
        return Ok(CheckoutEmptyTemplate.into_response());
    };
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", order.order_number.as_str())]),
    );
    Ok(CheckoutCompleteTemplate::from(order).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_view_shows_free_shipping() {
        let view = SummaryView::from(OrderSummary::from_subtotal(
            Decimal::new(2499, 0),
            ShippingMethod::Standard,
        ));
        assert_eq!(view.subtotal, "₹2499");
        assert_eq!(view.shipping, "Free");
        assert_eq!(view.tax, "₹250");
        assert_eq!(view.total, "₹2749");
    }

    #[test]
    fn test_summary_view_express() {
        let view = SummaryView::from(OrderSummary::from_subtotal(
            Decimal::new(1000, 0),
            ShippingMethod::Express,
        ));
        assert_eq!(view.shipping, "₹749");
        assert_eq!(view.total, "₹1849");
    }

    #[test]
    fn test_confirmation_greets_by_first_name() {
        use wearview_core::cart::MemoryStorage;

        let mut cart = CartStore::restore(MemoryStorage::new());
        let catalog = crate::catalog::Catalog::default();
        let tee = catalog.find(&wearview_core::ProductId::new("1")).unwrap();
        cart.add_to_cart(tee.descriptor()).unwrap();

        let details = CheckoutForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pin_code: "560001".to_string(),
            ..CheckoutForm::default()
        }
        .validate()
        .unwrap();
        let order = place_order(&mut cart, details).unwrap();

        let html = CheckoutCompleteTemplate::from(order).render().unwrap();
        assert!(html.contains("Thank you, Asha!"));
        assert!(html.contains("Asha Rao"));
    }

    #[test]
    fn test_options_mark_selection() {
        let options = payment_options(PaymentMethod::Upi);
        let checked: Vec<&str> = options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.value)
            .collect();
        assert_eq!(checked, ["upi"]);
        assert_eq!(shipping_options(ShippingMethod::Standard).len(), 2);
    }
}
