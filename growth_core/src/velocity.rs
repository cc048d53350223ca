//! Annualized height velocity from two dated height measurements.

use crate::age::decimal_years_between;
use crate::{DerivedMetric, Error, Result};
use chrono::NaiveDate;

/// Default minimum interval (days) below which a velocity estimate is
/// flagged as low-confidence. Short intervals amplify measurement noise
/// into implausible cm/year figures.
pub const DEFAULT_MIN_INTERVAL_DAYS: i64 = 90;

const DAYS_PER_MONTH: f64 = 30.44;

/// One dated height observation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightObservation {
    pub height_cm: f64,
    pub date: NaiveDate,
}

/// Human-readable description of an interval for display alongside the
/// velocity figure
fn describe_interval(days: i64) -> String {
    if days < 60 {
        format!("{days} days")
    } else if days < 365 {
        format!("{:.0} months", days as f64 / DAYS_PER_MONTH)
    } else {
        let years = days as f64 / 365.25;
        if (years - years.round()).abs() < 0.04 {
            let whole = years.round() as i64;
            if whole == 1 {
                "1 year".to_string()
            } else {
                format!("{whole} years")
            }
        } else {
            format!("{years:.1} years")
        }
    }
}

/// Compute annualized height velocity (cm/year) between two
/// observations, where `second` is strictly after `first`.
///
/// Elapsed time uses the same day-exact method as the age engine.
/// Intervals shorter than `min_interval_days` still compute but the
/// result is tagged low-confidence for the caller to surface.
pub fn calculate(
    first: &HeightObservation,
    second: &HeightObservation,
    min_interval_days: i64,
) -> Result<DerivedMetric> {
    // Temporal ordering is the validation gate's job
    if second.date <= first.date {
        return Err(Error::InternalInconsistency(format!(
            "height velocity invoked with non-increasing dates {} -> {}",
            first.date, second.date
        )));
    }

    let interval_days = (second.date - first.date).num_days();
    let elapsed_years = decimal_years_between(first.date, second.date);
    let value = (second.height_cm - first.height_cm) / elapsed_years;
    let low_confidence = interval_days < min_interval_days;

    if low_confidence {
        tracing::warn!(
            interval_days,
            min_interval_days,
            "height velocity interval below stability threshold"
        );
    }

    Ok(DerivedMetric::HeightVelocity {
        value,
        interval_days,
        interval_description: describe_interval(interval_days),
        low_confidence,
    })
}
