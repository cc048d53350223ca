//! Core domain types for the growth metrics engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Measurements and their kinds
//! - Patient context for one calculation request
//! - Age results (chronological and gestation-corrected)
//! - Derived metrics (BSA, height velocity, MPH, GH dose)
//! - Validation failures and chart age-range selections

use crate::bsa::BsaFormula;
use crate::reference::{CentileReading, SdsAlert};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Measurement Types
// ============================================================================

/// Patient sex as used by growth references
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Kind of anthropometric measurement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Weight,
    Height,
    Bmi,
    Ofc,
}

impl MeasurementKind {
    /// The fixed unit for this measurement kind
    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::Weight => "kg",
            MeasurementKind::Height => "cm",
            MeasurementKind::Bmi => "kg/m²",
            MeasurementKind::Ofc => "cm",
        }
    }
}

/// A single dated anthropometric measurement. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub value: f64,
    pub date: NaiveDate,
}

impl Measurement {
    /// Create a measurement, rejecting non-finite or non-positive values
    pub fn new(kind: MeasurementKind, value: f64, date: NaiveDate) -> crate::Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(crate::Error::Measurement(format!(
                "{:?} value must be a finite positive number, got {}",
                kind, value
            )));
        }
        Ok(Measurement { kind, value, date })
    }
}

// ============================================================================
// Patient Context and Age Types
// ============================================================================

/// Patient facts for the duration of one calculation request.
/// Not persisted by the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientContext {
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub measurement_date: NaiveDate,
    pub gestation_weeks: Option<u8>,
    pub gestation_days: Option<u8>,
}

/// Calendar-style age breakdown (whole years, months and days)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarAge {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

/// Output of the age engine. Read-only; consumed by every downstream
/// engine that needs an age.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgeResult {
    /// Exact elapsed time from birth to measurement, in decimal years
    pub chronological_years: f64,
    /// Calendar breakdown of the chronological age
    pub calendar_age: CalendarAge,
    /// Gestation-corrected age. Present for preterm patients; equals
    /// the chronological age once the correction window has passed.
    pub corrected_years: Option<f64>,
    /// Whether correction is currently active
    pub is_corrected: bool,
    /// Chronological age (years) up to which correction applies for
    /// this degree of prematurity (0.0 when no correction applies)
    pub correction_applied_until: f64,
}

impl AgeResult {
    /// The age downstream consumers (centile lookup, chart range
    /// selection) should use: corrected while correction is active,
    /// chronological otherwise.
    pub fn age_for_assessment(&self) -> f64 {
        if self.is_corrected {
            self.corrected_years.unwrap_or(self.chronological_years)
        } else {
            self.chronological_years
        }
    }
}

// ============================================================================
// Derived Metric Types
// ============================================================================

/// A derived clinical metric with type-safe variants. Each variant
/// carries the fields that make its result traceable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedMetric {
    /// Body surface area in m²
    Bsa { value: f64, formula: BsaFormula },
    /// Annualized height velocity in cm/year
    HeightVelocity {
        value: f64,
        interval_days: i64,
        interval_description: String,
        /// Set when the measurement interval is below the stability
        /// threshold; the value still computes but should be surfaced
        /// with a caveat
        low_confidence: bool,
    },
    /// Sex-adjusted mid-parental height prediction in cm
    MidParentalHeight {
        value: f64,
        target_range_low: f64,
        target_range_high: f64,
    },
    /// Standard GH dosing schedule derived from BSA and weight
    GhDose {
        mg_per_day: f64,
        mg_m2_week: f64,
        mcg_kg_day: f64,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// Machine-readable failure codes, partitioned into error classes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    NotANumber,
    OutOfRange,
    InvalidDate,
    InvalidSex,
    DateInFuture,
    DateOrder,
    MissingField,
    MissingMeasurement,
}

/// Error class a failure code belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Format,
    Range,
    Temporal,
    Missing,
}

impl FailureCode {
    pub fn class(&self) -> FailureClass {
        match self {
            FailureCode::NotANumber | FailureCode::InvalidDate | FailureCode::InvalidSex => {
                FailureClass::Format
            }
            FailureCode::OutOfRange => FailureClass::Range,
            FailureCode::DateInFuture | FailureCode::DateOrder => FailureClass::Temporal,
            FailureCode::MissingField | FailureCode::MissingMeasurement => FailureClass::Missing,
        }
    }
}

/// One field-scoped validation failure. An empty failure list is the
/// success sentinel; there is no separate "valid" flag.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ValidationFailure {
    pub field: String,
    pub code: FailureCode,
    pub message: String,
}

// ============================================================================
// Chart Range Types
// ============================================================================

/// Chart display age-range buckets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RangeKey {
    #[serde(rename = "0-2")]
    ZeroToTwo,
    #[serde(rename = "0-4")]
    ZeroToFour,
    #[serde(rename = "2-18")]
    TwoToEighteen,
    #[serde(rename = "0-18")]
    ZeroToEighteen,
}

impl RangeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKey::ZeroToTwo => "0-2",
            RangeKey::ZeroToFour => "0-4",
            RangeKey::TwoToEighteen => "2-18",
            RangeKey::ZeroToEighteen => "0-18",
        }
    }
}

/// Chosen chart viewing window for one measurement kind. Computed
/// fresh per display request, never cached across requests.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeRangeSelection {
    pub measurement_kind: MeasurementKind,
    pub range_key: RangeKey,
}

// ============================================================================
// Result Bundle Types
// ============================================================================

/// One measurement together with its centile/SDS reading. The reading
/// is absent when the external provider failed, the value was out of
/// the reference population's modeled range, or the returned SDS was
/// beyond the hard plausibility limit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeasurementAssessment {
    pub measurement: Measurement,
    pub centile: Option<CentileReading>,
    /// Raised when the provider's SDS fell outside plausibility limits
    pub sds_alert: Option<SdsAlert>,
}

/// Complete output of one calculation request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultBundle {
    pub id: Uuid,
    pub age: AgeResult,
    pub assessments: Vec<MeasurementAssessment>,
    pub metrics: Vec<DerivedMetric>,
    pub chart_ranges: Vec<AgeRangeSelection>,
}

// ============================================================================
// Validated Input
// ============================================================================

/// Fully parsed and bounds-checked calculation input. Only the
/// validator constructs this, so engines never see raw form data.
#[derive(Clone, Debug)]
pub struct ValidatedInput {
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub measurement_date: NaiveDate,
    pub gestation_weeks: Option<u8>,
    pub gestation_days: Option<u8>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub ofc_cm: Option<f64>,
    pub previous_height_cm: Option<f64>,
    pub previous_date: Option<NaiveDate>,
    pub maternal_height_cm: Option<f64>,
    pub paternal_height_cm: Option<f64>,
    /// Reference dataset identifier passed through to the centile provider
    pub reference: String,
}
