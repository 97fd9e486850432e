//! Checkout: order summary, form validation and simulated order placement.
//!
//! Payment is simulated. Placing an order validates the form, snapshots the
//! cart, and clears it exactly once. No money moves anywhere.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::{CartError, CartStorage, CartStore, LineItem};
use crate::{Email, EmailError};

/// Sales tax applied to the cart subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat fee for express shipping, in rupees.
pub const EXPRESS_SHIPPING_FEE: Decimal = Decimal::from_parts(749, 0, 0, false, 0);

/// Errors raised while checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required form field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email field did not parse.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Clearing the cart after placing the order failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// 3-5 business days, free.
    #[default]
    Standard,
    /// 1-2 business days, flat fee.
    Express,
}

impl ShippingMethod {
    /// Every option, in display order.
    pub const ALL: [Self; 2] = [Self::Standard, Self::Express];

    /// Form value, as (de)serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    /// Shipping cost in rupees.
    #[must_use]
    pub const fn cost(self) -> Decimal {
        match self {
            Self::Standard => Decimal::ZERO,
            Self::Express => EXPRESS_SHIPPING_FEE,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Shipping (3-5 business days)",
            Self::Express => "Express Shipping (1-2 business days)",
        }
    }
}

/// Payment method chosen at checkout. All are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "upi")]
    Upi,
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Every option, in display order.
    pub const ALL: [Self; 3] = [Self::Card, Self::Upi, Self::CashOnDelivery];

    /// Form value, as (de)serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Upi => "upi",
            Self::CashOnDelivery => "cod",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Credit/Debit Card",
            Self::Upi => "UPI",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

/// Money breakdown shown next to the checkout form and on the confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// Build a summary from the cart subtotal.
    ///
    /// Tax is [`TAX_RATE`] of the subtotal, rounded to the nearest whole rupee
    /// with halves rounded away from zero. Shipping is not taxed.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal, shipping: ShippingMethod) -> Self {
        let tax = (subtotal * TAX_RATE)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let shipping = shipping.cost();
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
}

/// Shopper contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
}

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
}

/// A validated checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutDetails {
    pub contact: ContactInfo,
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
}

fn required(value: String, field: &'static str) -> Result<String, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

impl CheckoutForm {
    /// Validate the form.
    ///
    /// Fields are checked in form order and the first problem is reported.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] for a blank required field and
    /// [`CheckoutError::InvalidEmail`] for an unparseable email.
    pub fn validate(self) -> Result<CheckoutDetails, CheckoutError> {
        let first_name = required(self.first_name, "First name")?;
        let last_name = required(self.last_name, "Last name")?;
        let email = Email::parse(&required(self.email, "Email")?)?;
        let phone = required(self.phone, "Phone")?;
        let street = required(self.address, "Street address")?;
        let city = required(self.city, "City")?;
        let state = required(self.state, "State")?;
        let pin_code = required(self.pin_code, "PIN code")?;

        Ok(CheckoutDetails {
            contact: ContactInfo {
                first_name,
                last_name,
                email,
                phone,
            },
            address: ShippingAddress {
                street,
                city,
                state,
                pin_code,
            },
            payment_method: self.payment_method,
            shipping_method: self.shipping_method,
        })
    }
}

/// Human-facing order number, e.g. `WV-3F9A0C12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a random order number.
    #[must_use]
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("WV-{}", hex.get(..8).unwrap_or(&hex)))
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    pub details: CheckoutDetails,
}

/// Place an order for everything in the cart.
///
/// On success the cart has been cleared exactly once. On any error before
/// clearing, the cart is untouched.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] if there is nothing to order and
/// [`CheckoutError::Cart`] if the cleared cart cannot be persisted.
pub fn place_order<S: CartStorage>(
    cart: &mut CartStore<S>,
    details: CheckoutDetails,
) -> Result<OrderConfirmation, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let items = cart.items().to_vec();
    let summary = OrderSummary::from_subtotal(cart.total_price(), details.shipping_method);
    let order_number = OrderNumber::generate();

    cart.clear_cart()?;

    tracing::info!(
        order_number = %order_number,
        line_items = items.len(),
        total = %summary.total,
        "Simulated order placed"
    );

    Ok(OrderConfirmation {
        order_number,
        items,
        summary,
        details,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ProductId;
    use crate::cart::{MemoryStorage, ProductDescriptor};

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.in".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pin_code: "560001".to_string(),
            payment_method: PaymentMethod::Upi,
            shipping_method: ShippingMethod::Standard,
        }
    }

    fn hoodie() -> ProductDescriptor {
        ProductDescriptor {
            id: ProductId::new("3"),
            name: "Blessed Hoodie".to_string(),
            price: Decimal::new(1999, 0),
            image: "/images/hoodie.webp".to_string(),
            category: "Hoodies".to_string(),
        }
    }

    #[test]
    fn test_tax_rate_is_ten_percent() {
        assert_eq!(TAX_RATE, Decimal::new(10, 2));
        assert_eq!(EXPRESS_SHIPPING_FEE, Decimal::new(749, 0));
    }

    #[test]
    fn test_summary_standard_shipping() {
        let summary = OrderSummary::from_subtotal(Decimal::new(4498, 0), ShippingMethod::Standard);
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.tax, Decimal::new(450, 0));
        assert_eq!(summary.total, Decimal::new(4948, 0));
    }

    #[test]
    fn test_summary_express_shipping_is_not_taxed() {
        let summary = OrderSummary::from_subtotal(Decimal::new(1299, 0), ShippingMethod::Express);
        assert_eq!(summary.tax, Decimal::new(130, 0));
        assert_eq!(summary.total, Decimal::new(1299 + 749 + 130, 0));
    }

    #[test]
    fn test_summary_rounds_half_away_from_zero() {
        let summary = OrderSummary::from_subtotal(Decimal::new(1005, 0), ShippingMethod::Standard);
        assert_eq!(summary.tax, Decimal::new(101, 0));
    }

    #[test]
    fn test_form_deserializes_method_codes() {
        let form: CheckoutForm =
            serde_json::from_str(r#"{"payment_method":"cod","shipping_method":"express"}"#)
                .unwrap();
        assert_eq!(form.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(form.shipping_method, ShippingMethod::Express);
    }

    #[test]
    fn test_method_form_values_match_serde() {
        for method in ShippingMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let form = CheckoutForm {
            city: "  Pune ".to_string(),
            ..filled_form()
        };
        let details = form.validate().unwrap();
        assert_eq!(details.address.city, "Pune");
        assert_eq!(details.contact.email.as_str(), "asha@example.in");
    }

    #[test]
    fn test_validate_reports_missing_field() {
        let form = CheckoutForm {
            pin_code: "   ".to_string(),
            ..filled_form()
        };
        assert!(matches!(
            form.validate(),
            Err(CheckoutError::MissingField("PIN code"))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let form = CheckoutForm {
            email: "asha-at-example".to_string(),
            ..filled_form()
        };
        assert!(matches!(
            form.validate(),
            Err(CheckoutError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_place_order_clears_cart_once() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::restore(storage.clone());
        cart.add_to_cart(hoodie()).unwrap();
        cart.add_to_cart(hoodie()).unwrap();

        let clears = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&clears);
        cart.subscribe(move |change| {
            if change.items.is_empty() {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        });

        let confirmation = place_order(&mut cart, filled_form().validate().unwrap()).unwrap();

        assert!(confirmation.order_number.as_str().starts_with("WV-"));
        assert_eq!(confirmation.order_number.as_str().len(), 11);
        assert_eq!(confirmation.items.len(), 1);
        assert_eq!(confirmation.summary.subtotal, Decimal::new(3998, 0));
        assert!(cart.is_empty());
        assert_eq!(storage.payload().as_deref(), Some("[]"));
        assert_eq!(clears.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_place_order_rejects_empty_cart() {
        let mut cart = CartStore::restore(MemoryStorage::new());
        let result = place_order(&mut cart, filled_form().validate().unwrap());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }
}
