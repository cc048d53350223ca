//! Input validation for raw form field values.
//!
//! Every check appends to one ordered failure list; nothing
//! short-circuits, so the caller can show every problem at once.
//! Non-numeric input for a field produces a format failure and skips
//! that field's range check only. Cross-field temporal checks run
//! independently of the per-field ones.

use crate::{FailureCode, Sex, ValidatedInput, ValidationFailure};
use chrono::NaiveDate;

// Clinical plausibility bounds
pub const MIN_WEIGHT_KG: f64 = 0.1;
pub const MAX_WEIGHT_KG: f64 = 300.0;
/// Exclusive lower bound
pub const MIN_HEIGHT_CM: f64 = 5.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
/// Exclusive lower bound
pub const MIN_OFC_CM: f64 = 5.0;
pub const MAX_OFC_CM: f64 = 150.0;
pub const MIN_GESTATION_WEEKS: u8 = 22;
pub const MAX_GESTATION_WEEKS: u8 = 44;
pub const MAX_GESTATION_DAYS: u8 = 6;

/// Oldest plausible birth date, in years before today
const MAX_YEARS_IN_PAST: i32 = 150;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_REFERENCE: &str = "uk-who";

/// Raw form field values, exactly as submitted. All optional; the
/// validator decides which combinations are acceptable.
#[derive(Clone, Debug, Default)]
pub struct RawInput {
    pub sex: Option<String>,
    pub birth_date: Option<String>,
    pub measurement_date: Option<String>,
    pub gestation_weeks: Option<String>,
    pub gestation_days: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub ofc: Option<String>,
    pub previous_height: Option<String>,
    pub previous_date: Option<String>,
    pub maternal_height: Option<String>,
    pub paternal_height: Option<String>,
    pub reference: Option<String>,
}

/// Failure list accumulator
struct Failures(Vec<ValidationFailure>);

impl Failures {
    fn push(&mut self, field: &str, code: FailureCode, message: impl Into<String>) {
        self.0.push(ValidationFailure {
            field: field.to_string(),
            code,
            message: message.into(),
        });
    }
}

/// Bounds for a decimal field; `min_exclusive` controls whether the
/// minimum itself is acceptable
struct DecimalBounds {
    min: f64,
    max: f64,
    min_exclusive: bool,
    unit: &'static str,
}

fn check_decimal(
    field: &str,
    raw: Option<&str>,
    bounds: &DecimalBounds,
    failures: &mut Failures,
) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let value: f64 = match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            failures.push(
                field,
                FailureCode::NotANumber,
                format!("{field} must be a valid number"),
            );
            return None;
        }
    };
    if !value.is_finite() {
        failures.push(
            field,
            FailureCode::NotANumber,
            format!("{field} must be a valid number"),
        );
        return None;
    }

    let below = if bounds.min_exclusive {
        value <= bounds.min
    } else {
        value < bounds.min
    };
    if below || value > bounds.max {
        let lower = if bounds.min_exclusive {
            format!("more than {}", bounds.min)
        } else {
            format!("at least {}", bounds.min)
        };
        failures.push(
            field,
            FailureCode::OutOfRange,
            format!(
                "{field} must be {lower} and at most {} {}",
                bounds.max, bounds.unit
            ),
        );
        return None;
    }

    Some(value)
}

fn check_integer(
    field: &str,
    raw: Option<&str>,
    min: u8,
    max: u8,
    failures: &mut Failures,
) -> Option<u8> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let value: u8 = match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            failures.push(
                field,
                FailureCode::NotANumber,
                format!("{field} must be a whole number"),
            );
            return None;
        }
    };

    if value < min || value > max {
        failures.push(
            field,
            FailureCode::OutOfRange,
            format!("{field} must be between {min} and {max}"),
        );
        return None;
    }

    Some(value)
}

fn check_date(
    field: &str,
    raw: Option<&str>,
    today: NaiveDate,
    required: bool,
    failures: &mut Failures,
) -> Option<NaiveDate> {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => {
            if required {
                failures.push(field, FailureCode::MissingField, format!("{field} is required"));
            }
            return None;
        }
    };

    let date = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(d) => d,
        Err(_) => {
            failures.push(
                field,
                FailureCode::InvalidDate,
                format!("{field} must be in YYYY-MM-DD format"),
            );
            return None;
        }
    };

    if date > today {
        failures.push(
            field,
            FailureCode::DateInFuture,
            format!("{field} cannot be in the future"),
        );
    }

    use chrono::Datelike;
    if date.year() < today.year() - MAX_YEARS_IN_PAST {
        failures.push(
            field,
            FailureCode::OutOfRange,
            format!("{field} is too far in the past"),
        );
    }

    // The parsed value is returned even when rejected so the
    // cross-field ordering checks still run against it
    Some(date)
}

fn check_sex(raw: Option<&str>, failures: &mut Failures) -> Option<Sex> {
    let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => {
            failures.push("sex", FailureCode::MissingField, "sex is required");
            return None;
        }
    };
    match raw.to_lowercase().as_str() {
        "male" => Some(Sex::Male),
        "female" => Some(Sex::Female),
        _ => {
            failures.push(
                "sex",
                FailureCode::InvalidSex,
                "sex must be 'male' or 'female'",
            );
            None
        }
    }
}

/// Validate raw form input against clinical plausibility bounds and
/// cross-field temporal consistency.
///
/// Returns the fully parsed input on success, or the ordered list of
/// every failure found. Engines only accept the parsed form, so
/// invalid data cannot reach them.
pub fn validate(
    raw: &RawInput,
    today: NaiveDate,
) -> std::result::Result<ValidatedInput, Vec<ValidationFailure>> {
    let mut failures = Failures(Vec::new());

    let sex = check_sex(raw.sex.as_deref(), &mut failures);

    let birth_date = check_date("birth_date", raw.birth_date.as_deref(), today, true, &mut failures);
    let measurement_date = check_date(
        "measurement_date",
        raw.measurement_date.as_deref(),
        today,
        true,
        &mut failures,
    );
    let previous_date = check_date(
        "previous_date",
        raw.previous_date.as_deref(),
        today,
        false,
        &mut failures,
    );

    let weight = check_decimal(
        "weight",
        raw.weight.as_deref(),
        &DecimalBounds {
            min: MIN_WEIGHT_KG,
            max: MAX_WEIGHT_KG,
            min_exclusive: false,
            unit: "kg",
        },
        &mut failures,
    );
    let height_bounds = DecimalBounds {
        min: MIN_HEIGHT_CM,
        max: MAX_HEIGHT_CM,
        min_exclusive: true,
        unit: "cm",
    };
    let height = check_decimal("height", raw.height.as_deref(), &height_bounds, &mut failures);
    let ofc = check_decimal(
        "ofc",
        raw.ofc.as_deref(),
        &DecimalBounds {
            min: MIN_OFC_CM,
            max: MAX_OFC_CM,
            min_exclusive: true,
            unit: "cm",
        },
        &mut failures,
    );
    let previous_height = check_decimal(
        "previous_height",
        raw.previous_height.as_deref(),
        &height_bounds,
        &mut failures,
    );
    let maternal_height = check_decimal(
        "maternal_height",
        raw.maternal_height.as_deref(),
        &height_bounds,
        &mut failures,
    );
    let paternal_height = check_decimal(
        "paternal_height",
        raw.paternal_height.as_deref(),
        &height_bounds,
        &mut failures,
    );

    let gestation_weeks = check_integer(
        "gestation_weeks",
        raw.gestation_weeks.as_deref(),
        MIN_GESTATION_WEEKS,
        MAX_GESTATION_WEEKS,
        &mut failures,
    );
    let gestation_days = check_integer(
        "gestation_days",
        raw.gestation_days.as_deref(),
        0,
        MAX_GESTATION_DAYS,
        &mut failures,
    );

    // At least one measurement must be present for a calculation to
    // produce anything
    let any_measurement = [&raw.weight, &raw.height, &raw.ofc]
        .iter()
        .any(|f| f.as_deref().map(str::trim).is_some_and(|s| !s.is_empty()));
    if !any_measurement {
        failures.push(
            "measurements",
            FailureCode::MissingMeasurement,
            "at least one measurement (weight, height, or OFC) is required",
        );
    }

    // Paired fields: a half-provided pair is flagged rather than
    // silently dropped
    let previous_pair_present =
        raw.previous_height.as_deref().is_some_and(|s| !s.trim().is_empty());
    let previous_date_present =
        raw.previous_date.as_deref().is_some_and(|s| !s.trim().is_empty());
    if previous_pair_present != previous_date_present {
        let missing = if previous_pair_present {
            "previous_date"
        } else {
            "previous_height"
        };
        failures.push(
            missing,
            FailureCode::MissingField,
            "previous height and previous date must be provided together",
        );
    }

    let maternal_present = raw.maternal_height.as_deref().is_some_and(|s| !s.trim().is_empty());
    let paternal_present = raw.paternal_height.as_deref().is_some_and(|s| !s.trim().is_empty());
    if maternal_present != paternal_present {
        let missing = if maternal_present {
            "paternal_height"
        } else {
            "maternal_height"
        };
        failures.push(
            missing,
            FailureCode::MissingField,
            "both parental heights are required for mid-parental height",
        );
    }

    // Cross-field temporal checks, independent of per-field results
    if let (Some(birth), Some(measurement)) = (birth_date, measurement_date) {
        if measurement <= birth {
            failures.push(
                "measurement_date",
                FailureCode::DateOrder,
                "measurement date must be after birth date",
            );
        }
    }
    if let (Some(previous), Some(measurement)) = (previous_date, measurement_date) {
        if previous >= measurement {
            failures.push(
                "previous_date",
                FailureCode::DateOrder,
                "previous measurement date must be before the current measurement date",
            );
        }
    }

    if !failures.0.is_empty() {
        tracing::debug!(count = failures.0.len(), "input validation failed");
        return Err(failures.0);
    }

    // All individual checks passed; required fields are present
    let (sex, birth_date, measurement_date) = match (sex, birth_date, measurement_date) {
        (Some(s), Some(b), Some(m)) => (s, b, m),
        _ => unreachable!("required-field failures were recorded above"),
    };

    Ok(ValidatedInput {
        sex,
        birth_date,
        measurement_date,
        gestation_weeks,
        gestation_days,
        weight_kg: weight,
        height_cm: height,
        ofc_cm: ofc,
        previous_height_cm: previous_height,
        previous_date,
        maternal_height_cm: maternal_height,
        paternal_height_cm: paternal_height,
        reference: raw
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REFERENCE)
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailureClass;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn minimal_raw() -> RawInput {
        RawInput {
            sex: Some("female".into()),
            birth_date: Some("2020-03-15".into()),
            measurement_date: Some("2024-03-15".into()),
            weight: Some("16.2".into()),
            ..Default::default()
        }
    }

    fn codes_for<'a>(
        failures: &'a [ValidationFailure],
        field: &str,
    ) -> Vec<&'a FailureCode> {
        failures
            .iter()
            .filter(|f| f.field == field)
            .map(|f| &f.code)
            .collect()
    }

    #[test]
    fn test_minimal_valid_input() {
        let input = validate(&minimal_raw(), today()).unwrap();
        assert_eq!(input.sex, Sex::Female);
        assert_eq!(input.weight_kg, Some(16.2));
        assert_eq!(input.reference, "uk-who");
    }

    #[test]
    fn test_weight_below_minimum_is_range_violation() {
        let mut raw = minimal_raw();
        raw.weight = Some("0.05".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "weight");
        assert_eq!(failures[0].code, FailureCode::OutOfRange);
        assert_eq!(failures[0].code.class(), FailureClass::Range);
    }

    #[test]
    fn test_weight_boundary_is_inclusive() {
        let mut raw = minimal_raw();
        raw.weight = Some("0.1".into());
        assert!(validate(&raw, today()).is_ok());
        raw.weight = Some("300".into());
        assert!(validate(&raw, today()).is_ok());
        raw.weight = Some("300.1".into());
        assert!(validate(&raw, today()).is_err());
    }

    #[test]
    fn test_height_lower_bound_is_exclusive() {
        let mut raw = minimal_raw();
        raw.height = Some("5".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(codes_for(&failures, "height"), vec![&FailureCode::OutOfRange]);
        raw.height = Some("5.1".into());
        assert!(validate(&raw, today()).is_ok());
    }

    #[test]
    fn test_ofc_bounds() {
        let mut raw = minimal_raw();
        raw.ofc = Some("150".into());
        assert!(validate(&raw, today()).is_ok());
        raw.ofc = Some("150.5".into());
        assert!(validate(&raw, today()).is_err());
    }

    #[test]
    fn test_non_numeric_skips_range_check() {
        let mut raw = minimal_raw();
        raw.weight = Some("heavy".into());
        let failures = validate(&raw, today()).unwrap_err();
        // Exactly one failure for the field: format, no cascading range error
        assert_eq!(codes_for(&failures, "weight"), vec![&FailureCode::NotANumber]);
        assert!(failures[0].message.contains("must be a valid number"));
    }

    #[test]
    fn test_gestation_bounds() {
        let mut raw = minimal_raw();
        raw.gestation_weeks = Some("21".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(
            codes_for(&failures, "gestation_weeks"),
            vec![&FailureCode::OutOfRange]
        );

        let mut raw = minimal_raw();
        raw.gestation_weeks = Some("34".into());
        raw.gestation_days = Some("7".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(
            codes_for(&failures, "gestation_days"),
            vec![&FailureCode::OutOfRange]
        );
    }

    #[test]
    fn test_gestation_must_be_whole_number() {
        let mut raw = minimal_raw();
        raw.gestation_weeks = Some("34.5".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(
            codes_for(&failures, "gestation_weeks"),
            vec![&FailureCode::NotANumber]
        );
    }

    #[test]
    fn test_equal_dates_is_temporal_violation() {
        let mut raw = minimal_raw();
        raw.birth_date = Some("2024-03-15".into());
        raw.measurement_date = Some("2024-03-15".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert!(failures
            .iter()
            .any(|f| f.code == FailureCode::DateOrder
                && f.code.class() == FailureClass::Temporal));
    }

    #[test]
    fn test_future_dates_rejected() {
        let mut raw = minimal_raw();
        raw.measurement_date = Some("2025-01-01".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert_eq!(
            codes_for(&failures, "measurement_date"),
            vec![&FailureCode::DateInFuture]
        );
    }

    #[test]
    fn test_rejected_date_still_checked_for_ordering() {
        // Birth date in the future AND after the measurement date:
        // both problems are reported in the same pass
        let mut raw = minimal_raw();
        raw.birth_date = Some("2025-01-01".into());
        raw.measurement_date = Some("2024-03-15".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert!(codes_for(&failures, "birth_date").contains(&&FailureCode::DateInFuture));
        assert!(codes_for(&failures, "measurement_date").contains(&&FailureCode::DateOrder));
    }

    #[test]
    fn test_all_failures_collected_at_once() {
        let raw = RawInput {
            sex: Some("other".into()),
            birth_date: Some("not-a-date".into()),
            measurement_date: Some("2024-03-15".into()),
            weight: Some("-2".into()),
            height: Some("tall".into()),
            ..Default::default()
        };
        let failures = validate(&raw, today()).unwrap_err();
        let fields: Vec<&str> = failures.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"sex"));
        assert!(fields.contains(&"birth_date"));
        assert!(fields.contains(&"weight"));
        assert!(fields.contains(&"height"));
        assert!(failures.len() >= 4);
    }

    #[test]
    fn test_missing_required_fields() {
        let raw = RawInput {
            weight: Some("12".into()),
            ..Default::default()
        };
        let failures = validate(&raw, today()).unwrap_err();
        assert!(codes_for(&failures, "sex").contains(&&FailureCode::MissingField));
        assert!(codes_for(&failures, "birth_date").contains(&&FailureCode::MissingField));
        assert!(codes_for(&failures, "measurement_date").contains(&&FailureCode::MissingField));
    }

    #[test]
    fn test_no_measurements_at_all() {
        let raw = RawInput {
            sex: Some("male".into()),
            birth_date: Some("2020-03-15".into()),
            measurement_date: Some("2024-03-15".into()),
            ..Default::default()
        };
        let failures = validate(&raw, today()).unwrap_err();
        assert!(failures
            .iter()
            .any(|f| f.code == FailureCode::MissingMeasurement));
    }

    #[test]
    fn test_half_provided_pairs_flagged() {
        let mut raw = minimal_raw();
        raw.maternal_height = Some("165".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert!(codes_for(&failures, "paternal_height").contains(&&FailureCode::MissingField));

        let mut raw = minimal_raw();
        raw.previous_height = Some("90".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert!(codes_for(&failures, "previous_date").contains(&&FailureCode::MissingField));
    }

    #[test]
    fn test_previous_date_must_precede_measurement_date() {
        let mut raw = minimal_raw();
        raw.height = Some("100".into());
        raw.previous_height = Some("95".into());
        raw.previous_date = Some("2024-03-15".into());
        let failures = validate(&raw, today()).unwrap_err();
        assert!(codes_for(&failures, "previous_date").contains(&&FailureCode::DateOrder));
    }

    #[test]
    fn test_gestation_days_default_when_absent() {
        let mut raw = minimal_raw();
        raw.gestation_weeks = Some("33".into());
        let input = validate(&raw, today()).unwrap();
        assert_eq!(input.gestation_weeks, Some(33));
        assert_eq!(input.gestation_days, None);
    }

    #[test]
    fn test_reference_passthrough() {
        let mut raw = minimal_raw();
        raw.reference = Some("who".into());
        let input = validate(&raw, today()).unwrap();
        assert_eq!(input.reference, "who");
    }
}
