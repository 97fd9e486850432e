//! Simulated virtual try-on.
//!
//! There is no image processing here. A try-on session records what the
//! shopper submitted (a camera capture or body measurements) and when; it
//! reports `Processing` until a fixed delay has elapsed and `Complete`
//! afterwards, at which point the storefront shows a placeholder result.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ProductId;

/// Image shown as the try-on result.
pub const PLACEHOLDER_RESULT_IMAGE: &str = "/static/placeholder.svg";

/// A measurement outside its accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be between {min} and {max} (got {value})")]
pub struct MeasurementError {
    pub field: &'static str,
    pub value: u16,
    pub min: u16,
    pub max: u16,
}

/// Body measurements entered on the try-on form.
///
/// Lengths are centimetres, weight is kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyMeasurements {
    pub height: u16,
    pub weight: u16,
    pub chest: u16,
    pub waist: u16,
    pub hips: u16,
    pub inseam: u16,
}

impl Default for BodyMeasurements {
    fn default() -> Self {
        Self {
            height: 170,
            weight: 70,
            chest: 90,
            waist: 80,
            hips: 95,
            inseam: 80,
        }
    }
}

/// Accepted range for one measurement field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementRange {
    pub field: &'static str,
    pub label: &'static str,
    pub min: u16,
    pub max: u16,
}

/// Accepted ranges, in form order.
pub const MEASUREMENT_RANGES: [MeasurementRange; 6] = [
    MeasurementRange { field: "height", label: "Height (cm)", min: 140, max: 210 },
    MeasurementRange { field: "weight", label: "Weight (kg)", min: 40, max: 150 },
    MeasurementRange { field: "chest", label: "Chest (cm)", min: 70, max: 130 },
    MeasurementRange { field: "waist", label: "Waist (cm)", min: 60, max: 120 },
    MeasurementRange { field: "hips", label: "Hips (cm)", min: 70, max: 130 },
    MeasurementRange { field: "inseam", label: "Inseam (cm)", min: 60, max: 100 },
];

impl BodyMeasurements {
    /// Values paired with their ranges, in form order.
    #[must_use]
    pub const fn fields(&self) -> [(MeasurementRange, u16); 6] {
        let [height, weight, chest, waist, hips, inseam] = MEASUREMENT_RANGES;
        [
            (height, self.height),
            (weight, self.weight),
            (chest, self.chest),
            (waist, self.waist),
            (hips, self.hips),
            (inseam, self.inseam),
        ]
    }

    /// Check every value against its range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), MeasurementError> {
        for (range, value) in self.fields() {
            if !(range.min..=range.max).contains(&value) {
                return Err(MeasurementError {
                    field: range.field,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

/// What the shopper submitted for the try-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TryOnSource {
    Camera,
    Measurements(BodyMeasurements),
}

/// Progress of a try-on session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryOnStatus {
    Processing { remaining: TimeDelta },
    Complete,
}

/// A simulated try-on in flight or finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryOnSession {
    pub product_id: ProductId,
    pub source: TryOnSource,
    pub started_at: DateTime<Utc>,
}

impl TryOnSession {
    /// Start a session from a camera capture.
    #[must_use]
    pub const fn from_camera(product_id: ProductId, now: DateTime<Utc>) -> Self {
        Self {
            product_id,
            source: TryOnSource::Camera,
            started_at: now,
        }
    }

    /// Start a session from body measurements.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError`] if any measurement is out of range.
    pub fn from_measurements(
        product_id: ProductId,
        measurements: BodyMeasurements,
        now: DateTime<Utc>,
    ) -> Result<Self, MeasurementError> {
        measurements.validate()?;
        Ok(Self {
            product_id,
            source: TryOnSource::Measurements(measurements),
            started_at: now,
        })
    }

    /// Status at `now`, given the simulated processing delay.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>, delay: TimeDelta) -> TryOnStatus {
        let Some(ready_at) = self.started_at.checked_add_signed(delay) else {
            // Unrepresentable deadline: never completes.
            return TryOnStatus::Processing { remaining: delay };
        };
        if now >= ready_at {
            TryOnStatus::Complete
        } else {
            TryOnStatus::Processing {
                remaining: ready_at - now,
            }
        }
    }
}
