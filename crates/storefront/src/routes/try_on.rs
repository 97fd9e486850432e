//! Virtual try-on route handlers.
//!
//! A try-on starts from a camera capture or from body measurements. The
//! session remembers the latest one; the page polls its status fragment
//! until the simulated processing delay has passed and the result shows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{TimeDelta, Utc};
use tower_sessions::Session;
use tracing::instrument;
use wearview_core::ProductId;
use wearview_core::try_on::{
    BodyMeasurements, PLACEHOLDER_RESULT_IMAGE, TryOnSession, TryOnSource, TryOnStatus,
};

use crate::catalog::Product;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// One measurement input on the try-on form.
#[derive(Clone)]
pub struct MeasurementFieldView {
    pub field: &'static str,
    pub label: &'static str,
    pub min: u16,
    pub max: u16,
    pub value: u16,
}

fn measurement_fields(measurements: &BodyMeasurements) -> Vec<MeasurementFieldView> {
    measurements
        .fields()
        .into_iter()
        .map(|(range, value)| MeasurementFieldView {
            field: range.field,
            label: range.label,
            min: range.min,
            max: range.max,
            value,
        })
        .collect()
}

/// Try-on progress display data for templates.
#[derive(Clone)]
pub struct TryOnStatusView {
    /// `idle`, `processing` or `complete`.
    pub state: &'static str,
    pub product_id: String,
    pub source: &'static str,
    pub remaining_secs: i64,
    pub result_image: &'static str,
}

impl TryOnStatusView {
    fn idle(product_id: &ProductId) -> Self {
        Self {
            state: "idle",
            product_id: product_id.as_str().to_string(),
            source: "",
            remaining_secs: 0,
            result_image: PLACEHOLDER_RESULT_IMAGE,
        }
    }

    fn of(session: &TryOnSession, delay: TimeDelta) -> Self {
        let source = match session.source {
            TryOnSource::Camera => "camera",
            TryOnSource::Measurements(_) => "measurements",
        };
        let (state, remaining_secs) = match session.status(Utc::now(), delay) {
            TryOnStatus::Processing { remaining } => {
                // Round up so "0 seconds left" never shows while processing.
                ("processing", remaining.num_milliseconds().saturating_add(999) / 1000)
            }
            TryOnStatus::Complete => ("complete", 0),
        };
        Self {
            state,
            product_id: session.product_id.as_str().to_string(),
            source,
            remaining_secs,
            result_image: PLACEHOLDER_RESULT_IMAGE,
        }
    }

    /// Whether the page should keep polling.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.state == "processing"
    }
}

/// Try-on page template.
#[derive(Template, WebTemplate)]
#[template(path = "try_on/show.html")]
pub struct TryOnShowTemplate {
    pub product: ProductCardView,
    pub measurements: Vec<MeasurementFieldView>,
    pub status: TryOnStatusView,
    pub error: Option<String>,
}

/// Try-on status fragment template (for HTMX polling).
#[derive(Template, WebTemplate)]
#[template(path = "partials/try_on_status.html")]
pub struct TryOnStatusTemplate {
    pub status: TryOnStatusView,
}

fn resolve_product<'a>(state: &'a AppState, id: &str) -> Result<&'a Product> {
    state
        .catalog()
        .find_or_first(&ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

fn try_on_delay(state: &AppState) -> TimeDelta {
    TimeDelta::from_std(state.config().try_on_delay).unwrap_or(TimeDelta::MAX)
}

/// The session's try-on, if it is for `product`.
async fn current_try_on(session: &Session, product: &ProductId) -> Result<Option<TryOnSession>> {
    let try_on = session
        .get::<TryOnSession>(session_keys::TRY_ON)
        .await?
        .filter(|t| &t.product_id == product);
    Ok(try_on)
}

fn status_view(state: &AppState, product: &Product, try_on: Option<&TryOnSession>) -> TryOnStatusView {
    try_on.map_or_else(
        || TryOnStatusView::idle(&product.id),
        |t| TryOnStatusView::of(t, try_on_delay(state)),
    )
}

/// Start a try-on: store it in the session and send the browser back to the page.
async fn begin(session: &Session, try_on: &TryOnSession) -> Result<Response> {
    session.insert(session_keys::TRY_ON, try_on).await?;
    add_breadcrumb(
        "try_on",
        "Try-on started",
        Some(&[("product_id", try_on.product_id.as_str())]),
    );
    Ok(Redirect::to(&format!("/try-on/{}", try_on.product_id)).into_response())
}

/// Display the try-on page.
///
/// Unknown product ids fall back to the first catalog product.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<TryOnShowTemplate> {
    let product = resolve_product(&state, &id)?;
    let try_on = current_try_on(&session, &product.id).await?;

    let measurements = match try_on.as_ref().map(|t| t.source) {
        Some(TryOnSource::Measurements(m)) => m,
        _ => BodyMeasurements::default(),
    };

    Ok(TryOnShowTemplate {
        product: ProductCardView::from(product),
        measurements: measurement_fields(&measurements),
        status: status_view(&state, product, try_on.as_ref()),
        error: None,
    })
}

/// Current try-on status (HTMX polling fragment).
#[instrument(skip(state, session))]
pub async fn status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<TryOnStatusTemplate> {
    let product = resolve_product(&state, &id)?;
    let try_on = current_try_on(&session, &product.id).await?;
    Ok(TryOnStatusTemplate {
        status: status_view(&state, product, try_on.as_ref()),
    })
}

/// Start a try-on from a camera capture.
///
/// The captured frame stays in the browser; only the fact of the capture is
/// recorded.
#[instrument(skip(state, session))]
pub async fn capture(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let product = resolve_product(&state, &id)?;
    begin(&session, &TryOnSession::from_camera(product.id.clone(), Utc::now())).await
}

/// Start a try-on from body measurements.
///
/// Out-of-range values re-render the form with the submitted values.
#[instrument(skip(state, session))]
pub async fn measurements(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(measurements): Form<BodyMeasurements>,
) -> Result<Response> {
    let product = resolve_product(&state, &id)?;

    match TryOnSession::from_measurements(product.id.clone(), measurements, Utc::now()) {
        Ok(try_on) => begin(&session, &try_on).await,
        Err(err) => {
            tracing::info!(error = %err, "Measurements rejected");
            let try_on = current_try_on(&session, &product.id).await?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                TryOnShowTemplate {
                    product: ProductCardView::from(product),
                    measurements: measurement_fields(&measurements),
                    status: status_view(&state, product, try_on.as_ref()),
                    error: Some(err.to_string()),
                },
            )
                .into_response())
        }
    }
}
