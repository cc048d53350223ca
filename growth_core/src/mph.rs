//! Mid-parental height prediction.
//!
//! Predicted adult height is the parental mean shifted by a fixed
//! sex adjustment, with a symmetric clinical target band around it.

use crate::{DerivedMetric, Error, Result, Sex};

/// Sex adjustment applied to the parental mean (cm)
pub const SEX_ADJUSTMENT_CM: f64 = 6.5;

/// Default clinical target band around the predicted height (cm).
/// A deliberate named constant so the band can be revisited without
/// touching the formula.
pub const DEFAULT_TARGET_RANGE_CM: f64 = 10.0;

/// Predict adult height from parental heights (cm) and patient sex.
///
/// Both parental heights are mandatory; callers with only one parent's
/// height must not invoke this.
pub fn predict(
    maternal_height_cm: f64,
    paternal_height_cm: f64,
    sex: Sex,
    target_range_cm: f64,
) -> Result<DerivedMetric> {
    if maternal_height_cm <= 0.0 || paternal_height_cm <= 0.0 {
        return Err(Error::InternalInconsistency(format!(
            "MPH invoked with parental heights {maternal_height_cm}/{paternal_height_cm} cm"
        )));
    }

    let mean = (maternal_height_cm + paternal_height_cm) / 2.0;
    let value = match sex {
        Sex::Male => mean + SEX_ADJUSTMENT_CM,
        Sex::Female => mean - SEX_ADJUSTMENT_CM,
    };

    tracing::debug!(maternal_height_cm, paternal_height_cm, ?sex, value, "computed MPH");

    Ok(DerivedMetric::MidParentalHeight {
        value,
        target_range_low: value - target_range_cm,
        target_range_high: value + target_range_cm,
    })
}
