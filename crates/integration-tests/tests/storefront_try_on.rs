//! Simulated virtual try-on through the HTTP surface.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use wearview_integration_tests::TestApp;

#[tokio::test]
async fn test_try_on_page_starts_idle() {
    let mut app = TestApp::new();
    let resp = app.get("/try-on/3").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Blessed Hoodie"));
    assert!(resp.body.contains("Capture a photo or enter your measurements"));
    assert!(resp.body.contains("name=\"height\""));
}

#[tokio::test]
async fn test_unknown_product_falls_back_to_first() {
    let mut app = TestApp::new();
    let resp = app.get("/try-on/99").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Classic White T-Shirt"));
}

#[tokio::test]
async fn test_capture_completes_after_delay() {
    let mut app = TestApp::new();

    let resp = app.post_form("/try-on/4/capture", &[]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/try-on/4"));

    // Test configuration has no processing delay.
    let resp = app.get("/try-on/4/status").await;
    assert!(resp.body.contains("/static/placeholder.svg"));
    assert!(resp.body.contains("Generated from your camera"));
}

#[tokio::test]
async fn test_measurements_start_try_on() {
    let mut app = TestApp::new();
    let form = [
        ("height", "180"),
        ("weight", "75"),
        ("chest", "100"),
        ("waist", "85"),
        ("hips", "98"),
        ("inseam", "82"),
    ];
    let resp = app.post_form("/try-on/5/measurements", &form).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let resp = app.get("/try-on/5").await;
    assert!(resp.body.contains("Generated from your measurements"));
    assert!(resp.body.contains("value=\"180\""));
}

#[tokio::test]
async fn test_out_of_range_measurements_are_rejected() {
    let mut app = TestApp::new();
    let form = [("height", "250")];
    let resp = app.post_form("/try-on/5/measurements", &form).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("height must be between 140 and 210"));
    assert!(resp.body.contains("value=\"250\""));
}

#[tokio::test]
async fn test_try_on_is_scoped_to_product() {
    let mut app = TestApp::new();
    app.post_form("/try-on/4/capture", &[]).await;

    let resp = app.get("/try-on/2").await;
    assert!(resp.body.contains("Capture a photo or enter your measurements"));
}
