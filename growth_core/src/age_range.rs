//! Chart viewing-window selection.
//!
//! Each measurement kind has a fixed set of caller-visible range
//! options and a deterministic decision table over age thresholds.
//! The selector never errors: unknown age falls back to the first
//! option for the kind, and a guard re-checks that the computed key
//! is one of the kind's valid options.

use crate::{AgeRangeSelection, MeasurementKind, RangeKey};

// Age thresholds (exclusive upper bounds of each bucket)
const INFANT_LIMIT_YEARS: f64 = 2.0;
const TODDLER_LIMIT_YEARS: f64 = 4.0;
/// BMI switches to the full range at adolescence regardless of MPH,
/// since adolescent BMI interpretation needs full puberty context
const BMI_ADOLESCENT_YEARS: f64 = 12.0;

/// The caller-visible range options for a measurement kind, in
/// display order. The first entry is the fallback.
pub fn options(kind: MeasurementKind) -> &'static [RangeKey] {
    match kind {
        MeasurementKind::Height => &[
            RangeKey::ZeroToTwo,
            RangeKey::ZeroToFour,
            RangeKey::TwoToEighteen,
            RangeKey::ZeroToEighteen,
        ],
        MeasurementKind::Weight => &[
            RangeKey::ZeroToTwo,
            RangeKey::ZeroToFour,
            RangeKey::ZeroToEighteen,
        ],
        MeasurementKind::Bmi => &[
            RangeKey::ZeroToFour,
            RangeKey::TwoToEighteen,
            RangeKey::ZeroToEighteen,
        ],
        MeasurementKind::Ofc => &[RangeKey::ZeroToTwo, RangeKey::ZeroToEighteen],
    }
}

fn table(kind: MeasurementKind, age_years: f64, mph_available: bool) -> RangeKey {
    match kind {
        MeasurementKind::Height => {
            if age_years < INFANT_LIMIT_YEARS {
                RangeKey::ZeroToTwo
            } else if age_years < TODDLER_LIMIT_YEARS {
                RangeKey::ZeroToFour
            } else if mph_available {
                RangeKey::TwoToEighteen
            } else {
                RangeKey::ZeroToEighteen
            }
        }
        MeasurementKind::Weight => {
            if age_years < INFANT_LIMIT_YEARS {
                RangeKey::ZeroToTwo
            } else if age_years < TODDLER_LIMIT_YEARS {
                RangeKey::ZeroToFour
            } else {
                RangeKey::ZeroToEighteen
            }
        }
        // BMI uses a three-way age split; MPH availability does not
        // change the outcome
        MeasurementKind::Bmi => {
            if age_years < TODDLER_LIMIT_YEARS {
                RangeKey::ZeroToFour
            } else if age_years < BMI_ADOLESCENT_YEARS {
                RangeKey::TwoToEighteen
            } else {
                RangeKey::ZeroToEighteen
            }
        }
        MeasurementKind::Ofc => {
            if age_years < INFANT_LIMIT_YEARS {
                RangeKey::ZeroToTwo
            } else {
                RangeKey::ZeroToEighteen
            }
        }
    }
}

/// Select the chart viewing window for one measurement kind.
///
/// `age_years` is the patient's decimal age: corrected if preterm
/// correction is still active, chronological otherwise. `None` means
/// the age is unknown (no birth date) and yields the first enumerated
/// option for the kind.
pub fn select(
    kind: MeasurementKind,
    age_years: Option<f64>,
    mph_available: bool,
) -> AgeRangeSelection {
    let valid = options(kind);

    let range_key = match age_years {
        None => valid[0],
        Some(age) => {
            let key = table(kind, age, mph_available);
            if valid.contains(&key) {
                key
            } else {
                // Should not occur given the table, but never error
                tracing::warn!(
                    ?kind,
                    computed = key.as_str(),
                    "computed range key is not a valid option, falling back"
                );
                valid[0]
            }
        }
    };

    AgeRangeSelection {
        measurement_kind: kind,
        range_key,
    }
}
