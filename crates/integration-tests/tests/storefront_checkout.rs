//! Simulated checkout through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use wearview_integration_tests::TestApp;

const VALID_FORM: [(&str, &str); 10] = [
    ("first_name", "Asha"),
    ("last_name", "Rao"),
    ("email", "asha@example.in"),
    ("phone", "+91 98765 43210"),
    ("address", "12 MG Road"),
    ("city", "Bengaluru"),
    ("state", "Karnataka"),
    ("pin_code", "560001"),
    ("payment_method", "upi"),
    ("shipping_method", "express"),
];

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let mut app = TestApp::new();
    let resp = app.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your cart is empty"));

    let resp = app.post_form("/checkout", &VALID_FORM).await;
    assert!(resp.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_checkout_form_shows_summary() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "2")]).await;

    let resp = app.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Slim Fit Jeans"));
    // 2499 + free shipping + 250 tax
    assert!(resp.body.contains("₹2749"));
}

#[tokio::test]
async fn test_place_order_clears_cart() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "1")]).await;

    let resp = app.post_form("/checkout", &VALID_FORM).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("WV-"));
    assert!(resp.body.contains("Thank you, Asha!"));
    assert!(resp.body.contains("UPI"));
    // 2598 + 749 express + 260 tax
    assert!(resp.body.contains("₹3607"));

    let json = app.get("/api/cart").await.json();
    assert_eq!(json["total_items"], 0);
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_form_keeps_cart() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "3")]).await;

    let form: Vec<(&str, &str)> = VALID_FORM
        .iter()
        .map(|&(k, v)| if k == "city" { (k, "  ") } else { (k, v) })
        .collect();
    let resp = app.post_form("/checkout", &form).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("City is required"));
    // Submitted values are kept.
    assert!(resp.body.contains("value=\"Asha\""));

    assert_eq!(app.get("/api/cart").await.json()["total_items"], 1);
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("id", "3")]).await;

    let form: Vec<(&str, &str)> = VALID_FORM
        .iter()
        .map(|&(k, v)| if k == "email" { (k, "not-an-email") } else { (k, v) })
        .collect();
    let resp = app.post_form("/checkout", &form).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("invalid email"));
}
