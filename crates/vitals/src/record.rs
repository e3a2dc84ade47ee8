//! Core record types for vitals.
//!
//! This module defines the vital record as stored, the fields a caller
//! supplies when adding one, and the raw text form those fields are typed
//! into before coercion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a record by the store.
pub type RecordId = i64;

/// One logged observation of temperature, blood pressure, heart rate and notes.
///
/// Records are only ever created by a store and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    /// Unique identifier, never reused.
    pub id: RecordId,

    /// Body temperature in degrees Celsius.
    pub temperature_c: Option<f64>,

    /// Systolic blood pressure in mmHg.
    pub systolic: Option<f64>,

    /// Diastolic blood pressure in mmHg.
    pub diastolic: Option<f64>,

    /// Heart rate in beats per minute.
    pub heart_rate: Option<f64>,

    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl VitalRecord {
    /// Build a record from caller fields plus store-assigned identity.
    #[must_use]
    pub fn from_new(id: RecordId, created_at: DateTime<Utc>, vitals: NewVitals) -> Self {
        Self {
            id,
            temperature_c: vitals.temperature_c,
            systolic: vitals.systolic,
            diastolic: vitals.diastolic,
            heart_rate: vitals.heart_rate,
            notes: vitals.notes,
            created_at,
        }
    }

    /// The caller-supplied part of this record.
    #[must_use]
    pub fn vitals(&self) -> NewVitals {
        NewVitals {
            temperature_c: self.temperature_c,
            systolic: self.systolic,
            diastolic: self.diastolic,
            heart_rate: self.heart_rate,
            notes: self.notes.clone(),
        }
    }

    /// Whether at least one blood pressure reading is present.
    #[must_use]
    pub fn has_blood_pressure(&self) -> bool {
        self.systolic.is_some() || self.diastolic.is_some()
    }
}

/// The fields of a record before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVitals {
    /// Body temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Systolic blood pressure in mmHg.
    pub systolic: Option<f64>,
    /// Diastolic blood pressure in mmHg.
    pub diastolic: Option<f64>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<f64>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Raw text of the add-record form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalForm {
    /// Temperature field text.
    pub temperature: String,
    /// Systolic field text.
    pub systolic: String,
    /// Diastolic field text.
    pub diastolic: String,
    /// Heart rate field text.
    pub heart_rate: String,
    /// Notes field text.
    pub notes: String,
}

impl VitalForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce the typed text into record fields.
    ///
    /// Never fails: unusable numbers become absent and empty notes become absent.
    #[must_use]
    pub fn to_new_vitals(&self) -> NewVitals {
        NewVitals {
            temperature_c: parse_or_absent(&self.temperature),
            systolic: parse_or_absent(&self.systolic),
            diastolic: parse_or_absent(&self.diastolic),
            heart_rate: parse_or_absent(&self.heart_rate),
            notes: if self.notes.is_empty() {
                None
            } else {
                Some(self.notes.clone())
            },
        }
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check if nothing has been typed.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse a numeric form value, treating anything unusable as "no value".
///
/// Empty text, text that is not a decimal number, non-finite values and zero
/// all map to `None`.
#[must_use]
pub fn parse_or_absent(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value != 0.0)
}
