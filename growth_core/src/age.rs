//! Chronological and gestation-corrected age calculation.
//!
//! Decimal ages are day-exact: whole years are counted by calendar
//! anniversaries and the fractional part is the number of days past the
//! last anniversary divided by the length of the current anniversary
//! year. This avoids the systematic drift a fixed 365.25 divisor
//! introduces across leap years.

use crate::{CalendarAge, Error, PatientContext, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Completed gestation weeks at or above which a birth is term
pub const TERM_GESTATION_WEEKS: f64 = 37.0;
/// Below this many weeks the prematurity is classed as extreme
pub const MODERATE_PRETERM_WEEKS: f64 = 32.0;
/// Full-term pregnancy length used to locate the estimated due date
pub const FULL_TERM_DAYS: i64 = 280;
/// Correction window for moderate prematurity (32-36 weeks)
pub const CORRECTION_LIMIT_MODERATE_YEARS: f64 = 1.0;
/// Correction window for extreme prematurity (<32 weeks)
pub const CORRECTION_LIMIT_EXTREME_YEARS: f64 = 2.0;

const DAYS_PER_WEEK: f64 = 7.0;

/// Age facts for one patient, as produced by [`assess_age`]
pub use crate::types::AgeResult;

/// The anniversary of `date` in `year`. A 29 February anniversary
/// falls on 1 March in non-leap years.
fn anniversary(date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 3, 1).expect("1 March always exists"))
}

/// Day-exact elapsed time between two dates in decimal years.
///
/// Precondition: `end >= start`.
pub fn decimal_years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    debug_assert!(end >= start, "decimal_years_between requires end >= start");

    let mut whole = end.year() - start.year();
    let mut last = anniversary(start, end.year());
    if last > end {
        whole -= 1;
        last = anniversary(start, end.year() - 1);
    }
    let next = anniversary(start, last.year() + 1);

    let elapsed = (end - last).num_days() as f64;
    let year_length = (next - last).num_days() as f64;

    whole as f64 + elapsed / year_length
}

/// Signed variant used for corrected ages, which can be negative when a
/// very preterm infant is measured before the estimated due date.
fn signed_decimal_years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    if end >= start {
        decimal_years_between(start, end)
    } else {
        -decimal_years_between(end, start)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid month start");
    (next - first).num_days() as u32
}

/// `date` advanced by `months` whole months, with the day-of-month
/// clamped to the target month's length (31 Jan + 1 month = 28/29 Feb).
fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid")
}

/// Calendar breakdown (years, months, days) of the interval between two
/// dates: the greatest whole number of months that fits, then leftover
/// days. Precondition: `end >= start`.
pub fn calendar_age_between(start: NaiveDate, end: NaiveDate) -> CalendarAge {
    debug_assert!(end >= start, "calendar_age_between requires end >= start");

    let mut months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    let mut advanced = add_months_clamped(start, months);
    if advanced > end {
        months -= 1;
        advanced = add_months_clamped(start, months);
    }
    let days = (end - advanced).num_days();

    CalendarAge {
        years: (months / 12) as u32,
        months: (months % 12) as u32,
        days: days as u32,
    }
}

/// Compute chronological decimal age and, when gestation indicates a
/// preterm birth, the corrected age.
///
/// Correction subtracts the shortfall from 40 weeks gestation and is
/// applied only while the chronological age is inside the window for
/// the degree of prematurity: below 1 year for 32-36 weeks, below
/// 2 years for under 32 weeks. Beyond the window the corrected and
/// chronological ages are reported equal.
pub fn assess_age(ctx: &PatientContext) -> Result<AgeResult> {
    // The validation gate guarantees measurement strictly after birth.
    // Reaching this point otherwise is a wiring bug, not a user error.
    if ctx.measurement_date <= ctx.birth_date {
        return Err(Error::InternalInconsistency(format!(
            "measurement date {} is not after birth date {}",
            ctx.measurement_date, ctx.birth_date
        )));
    }

    let chronological = decimal_years_between(ctx.birth_date, ctx.measurement_date);
    if chronological < 0.0 {
        return Err(Error::InternalInconsistency(format!(
            "computed negative chronological age {chronological}"
        )));
    }
    let calendar_age = calendar_age_between(ctx.birth_date, ctx.measurement_date);

    let Some(weeks) = ctx.gestation_weeks else {
        return Ok(AgeResult {
            chronological_years: chronological,
            calendar_age,
            corrected_years: None,
            is_corrected: false,
            correction_applied_until: 0.0,
        });
    };

    let days = ctx.gestation_days.unwrap_or(0);
    let total_weeks = weeks as f64 + days as f64 / DAYS_PER_WEEK;

    if total_weeks >= TERM_GESTATION_WEEKS {
        return Ok(AgeResult {
            chronological_years: chronological,
            calendar_age,
            corrected_years: None,
            is_corrected: false,
            correction_applied_until: 0.0,
        });
    }

    let window = if total_weeks >= MODERATE_PRETERM_WEEKS {
        CORRECTION_LIMIT_MODERATE_YEARS
    } else {
        CORRECTION_LIMIT_EXTREME_YEARS
    };

    if chronological >= window {
        tracing::debug!(
            chronological,
            window,
            "gestational correction window has passed"
        );
        return Ok(AgeResult {
            chronological_years: chronological,
            calendar_age,
            corrected_years: Some(chronological),
            is_corrected: false,
            correction_applied_until: window,
        });
    }

    // Corrected age is measured from the estimated due date
    let total_gestation_days = weeks as i64 * 7 + days as i64;
    let due_date = ctx.birth_date + Duration::days(FULL_TERM_DAYS - total_gestation_days);
    let corrected = signed_decimal_years_between(due_date, ctx.measurement_date);

    tracing::debug!(
        total_weeks,
        chronological,
        corrected,
        "applying gestational age correction"
    );

    Ok(AgeResult {
        chronological_years: chronological,
        calendar_age,
        corrected_years: Some(corrected),
        is_corrected: true,
        correction_applied_until: window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sex;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ctx(
        birth: NaiveDate,
        measurement: NaiveDate,
        weeks: Option<u8>,
        days: Option<u8>,
    ) -> PatientContext {
        PatientContext {
            sex: Sex::Female,
            birth_date: birth,
            measurement_date: measurement,
            gestation_weeks: weeks,
            gestation_days: days,
        }
    }

    #[test]
    fn test_exact_whole_year() {
        let years = decimal_years_between(d(2020, 3, 15), d(2023, 3, 15));
        assert_eq!(years, 3.0);
    }

    #[test]
    fn test_half_year_is_day_exact() {
        // 2021 is not a leap year: the anniversary year has 365 days
        let years = decimal_years_between(d(2021, 1, 1), d(2021, 7, 2));
        assert!((years - 182.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_leap_year_interval_has_no_drift() {
        // 2024 is a leap year; one full anniversary year is still 1.0
        let years = decimal_years_between(d(2024, 1, 1), d(2025, 1, 1));
        assert_eq!(years, 1.0);
        // Half way through a 366-day year
        let years = decimal_years_between(d(2024, 1, 1), d(2024, 7, 2));
        assert!((years - 183.0 / 366.0).abs() < 1e-12);
    }

    #[test]
    fn test_age_monotonic_in_measurement_date() {
        let birth = d(2019, 6, 10);
        let mut previous = -1.0;
        let mut date = d(2019, 6, 11);
        for _ in 0..1500 {
            let age = decimal_years_between(birth, date);
            assert!(age > previous, "age must increase with measurement date");
            previous = age;
            date = date + Duration::days(1);
        }
    }

    #[test]
    fn test_calendar_age_borrowing() {
        let age = calendar_age_between(d(2020, 1, 31), d(2020, 3, 1));
        assert_eq!(
            age,
            CalendarAge {
                years: 0,
                months: 1,
                days: 1
            }
        );
        let age = calendar_age_between(d(2019, 11, 15), d(2021, 2, 10));
        assert_eq!(
            age,
            CalendarAge {
                years: 1,
                months: 2,
                days: 26
            }
        );
    }

    #[test]
    fn test_term_birth_has_no_correction() {
        let result = assess_age(&ctx(d(2023, 1, 1), d(2023, 7, 1), Some(40), Some(0))).unwrap();
        assert!(!result.is_corrected);
        assert!(result.corrected_years.is_none());
    }

    #[test]
    fn test_missing_gestation_has_no_correction() {
        let result = assess_age(&ctx(d(2023, 1, 1), d(2023, 7, 1), None, None)).unwrap();
        assert!(!result.is_corrected);
        assert!(result.corrected_years.is_none());
        assert_eq!(result.correction_applied_until, 0.0);
    }

    #[test]
    fn test_moderate_preterm_corrected_below_one_year() {
        // 34+0 weeks: 42 days short of term
        let result = assess_age(&ctx(d(2023, 1, 1), d(2023, 9, 1), Some(34), Some(0))).unwrap();
        assert!(result.is_corrected);
        assert_eq!(result.correction_applied_until, 1.0);
        let corrected = result.corrected_years.unwrap();
        assert!(corrected < result.chronological_years);
    }

    #[test]
    fn test_moderate_preterm_correction_expires_at_one_year() {
        let result = assess_age(&ctx(d(2022, 1, 1), d(2023, 6, 1), Some(34), Some(0))).unwrap();
        assert!(!result.is_corrected);
        assert_eq!(result.corrected_years, Some(result.chronological_years));
        assert_eq!(result.correction_applied_until, 1.0);
    }

    #[test]
    fn test_extreme_preterm_corrected_until_two_years() {
        let result = assess_age(&ctx(d(2022, 1, 1), d(2023, 6, 1), Some(28), Some(3))).unwrap();
        assert!(result.is_corrected);
        assert_eq!(result.correction_applied_until, 2.0);
        let corrected = result.corrected_years.unwrap();
        // 28+3 weeks gestation: 81 days short of 280
        let expected = decimal_years_between(d(2022, 1, 1) + Duration::days(81), d(2023, 6, 1));
        assert!((corrected - expected).abs() < 1e-12);
    }

    #[test]
    fn test_corrected_never_exceeds_chronological() {
        for weeks in 22..37u8 {
            let result =
                assess_age(&ctx(d(2023, 3, 1), d(2023, 10, 1), Some(weeks), Some(2))).unwrap();
            if result.is_corrected {
                assert!(result.corrected_years.unwrap() <= result.chronological_years);
            }
        }
    }

    #[test]
    fn test_corrected_age_can_be_negative_before_due_date() {
        // Born at 25 weeks, measured 4 weeks later: still before the EDD
        let result = assess_age(&ctx(d(2023, 6, 1), d(2023, 6, 29), Some(25), Some(0))).unwrap();
        assert!(result.is_corrected);
        assert!(result.corrected_years.unwrap() < 0.0);
    }

    #[test]
    fn test_measurement_on_birth_date_is_internal_error() {
        let err = assess_age(&ctx(d(2023, 1, 1), d(2023, 1, 1), None, None)).unwrap_err();
        assert!(matches!(err, Error::InternalInconsistency(_)));
    }

    #[test]
    fn test_age_for_assessment_prefers_corrected() {
        let result = assess_age(&ctx(d(2023, 1, 1), d(2023, 9, 1), Some(30), Some(0))).unwrap();
        assert!(result.is_corrected);
        assert_eq!(result.age_for_assessment(), result.corrected_years.unwrap());

        let result = assess_age(&ctx(d(2020, 1, 1), d(2023, 9, 1), Some(30), Some(0))).unwrap();
        assert!(!result.is_corrected);
        assert_eq!(result.age_for_assessment(), result.chronological_years);
    }
}
