//! Orchestrating calculation engine.
//!
//! Drives one calculation request to completion: age assessment, then
//! the derived-metric engines for whatever inputs are present, then
//! centile lookups against the external provider, then chart range
//! selection. Pure and stateless; each request is independent.

use crate::reference::{self, CentileRequest, CentileSource, SdsAlert};
use crate::types::{
    DerivedMetric, Measurement, MeasurementAssessment, MeasurementKind, PatientContext,
    ResultBundle, ValidatedInput,
};
use crate::velocity::HeightObservation;
use crate::{age, age_range, bsa, dose, mph, Config, Result};
use uuid::Uuid;

/// Run one complete calculation over validated input.
///
/// Derived metrics are computed for every combination of inputs that
/// supports them; a missing optional input silently narrows the output
/// rather than failing. Provider failures produce a partial result:
/// the affected measurement keeps its place in the bundle with the
/// centile reading absent.
pub fn evaluate(
    input: &ValidatedInput,
    provider: &dyn CentileSource,
    config: &Config,
) -> Result<ResultBundle> {
    let ctx = PatientContext {
        sex: input.sex,
        birth_date: input.birth_date,
        measurement_date: input.measurement_date,
        gestation_weeks: input.gestation_weeks,
        gestation_days: input.gestation_days,
    };

    let age_result = age::assess_age(&ctx)?;
    let assessment_age = age_result.age_for_assessment();

    tracing::info!(
        chronological = age_result.chronological_years,
        corrected = age_result.is_corrected,
        "assessed age"
    );

    // Measurement facts, BMI derived when both inputs exist
    let mut measurements = Vec::new();
    if let Some(weight) = input.weight_kg {
        measurements.push(Measurement::new(
            MeasurementKind::Weight,
            weight,
            input.measurement_date,
        )?);
    }
    if let Some(height) = input.height_cm {
        measurements.push(Measurement::new(
            MeasurementKind::Height,
            height,
            input.measurement_date,
        )?);
    }
    if let (Some(weight), Some(height)) = (input.weight_kg, input.height_cm) {
        let height_m = height / 100.0;
        measurements.push(Measurement::new(
            MeasurementKind::Bmi,
            weight / (height_m * height_m),
            input.measurement_date,
        )?);
    }
    if let Some(ofc) = input.ofc_cm {
        measurements.push(Measurement::new(
            MeasurementKind::Ofc,
            ofc,
            input.measurement_date,
        )?);
    }

    // Derived metrics for whatever inputs are available
    let mut metrics = Vec::new();

    let mut bsa_value = None;
    // With both measurements the configured formula applies; weight
    // alone falls back to the cBNF lookup table
    let bsa_metric = match (input.weight_kg, input.height_cm) {
        (Some(weight), Some(height)) => {
            Some(bsa::calculate(height, weight, config.calculation.bsa_formula)?)
        }
        (Some(weight), None) => Some(bsa::calculate_from_weight(weight)?),
        _ => None,
    };
    if let Some(metric) = bsa_metric {
        if let DerivedMetric::Bsa { value, .. } = &metric {
            bsa_value = Some(*value);
        }
        metrics.push(metric);
    }

    if let (Some(height), Some(previous_height), Some(previous_date)) =
        (input.height_cm, input.previous_height_cm, input.previous_date)
    {
        let first = HeightObservation {
            height_cm: previous_height,
            date: previous_date,
        };
        let second = HeightObservation {
            height_cm: height,
            date: input.measurement_date,
        };
        metrics.push(crate::velocity::calculate(
            &first,
            &second,
            config.calculation.velocity_min_interval_days,
        )?);
    }

    let mut mph_available = false;
    if let (Some(maternal), Some(paternal)) =
        (input.maternal_height_cm, input.paternal_height_cm)
    {
        metrics.push(mph::predict(
            maternal,
            paternal,
            input.sex,
            config.calculation.mph_target_range_cm,
        )?);
        mph_available = true;
    }

    if let (Some(bsa_m2), Some(weight)) = (bsa_value, input.weight_kg) {
        metrics.push(dose::standard_schedule(
            bsa_m2,
            weight,
            config.calculation.gh_standard_mg_m2_week,
        )?);
    }

    // Centile lookups; provider failure marks the reading absent, and
    // returned readings pass the SDS plausibility screen before use
    let assessments = measurements
        .into_iter()
        .map(|measurement| {
            let request = CentileRequest {
                kind: measurement.kind,
                value: measurement.value,
                sex: input.sex,
                age_years: assessment_age,
                reference: input.reference.clone(),
            };
            let (centile, sds_alert) = match provider.centile_and_sds(&request) {
                Ok(reading) => match reference::screen_sds(reading.sds) {
                    Some(SdsAlert::Implausible) => {
                        tracing::warn!(
                            kind = ?measurement.kind,
                            sds = reading.sds,
                            "SDS beyond hard plausibility limit, reading discarded"
                        );
                        (None, Some(SdsAlert::Implausible))
                    }
                    Some(SdsAlert::Verify) => {
                        tracing::warn!(
                            kind = ?measurement.kind,
                            sds = reading.sds,
                            "SDS beyond warning limit, verify measurement"
                        );
                        (Some(reading), Some(SdsAlert::Verify))
                    }
                    None => (Some(reading), None),
                },
                Err(e) => {
                    tracing::warn!(kind = ?measurement.kind, error = %e, "centile lookup failed");
                    (None, None)
                }
            };
            MeasurementAssessment {
                measurement,
                centile,
                sds_alert,
            }
        })
        .collect::<Vec<_>>();

    // One chart window per measurement kind in the bundle
    let chart_ranges = assessments
        .iter()
        .map(|a| age_range::select(a.measurement.kind, Some(assessment_age), mph_available))
        .collect();

    Ok(ResultBundle {
        id: Uuid::new_v4(),
        age: age_result,
        assessments,
        metrics,
        chart_ranges,
    })
}
