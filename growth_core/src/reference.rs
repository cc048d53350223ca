//! Boundary to the external centile/SDS provider.
//!
//! The core never computes centiles itself; it hands cleaned
//! measurement facts to a [`CentileSource`] and consumes back one
//! centile/SDS pair per measurement. Provider failure yields a partial
//! result upstream, never a fabricated value.

use crate::{MeasurementKind, Sex};
use serde::{Deserialize, Serialize};

/// Readings beyond this many SDS in either direction are implausible
/// and discarded
pub const SDS_HARD_LIMIT: f64 = 8.0;
/// Readings beyond this many SDS in either direction are kept but
/// flagged for re-measurement
pub const SDS_WARNING_LIMIT: f64 = 4.0;

/// One lookup request against a growth reference
#[derive(Clone, Debug, PartialEq)]
pub struct CentileRequest {
    pub kind: MeasurementKind,
    pub value: f64,
    pub sex: Sex,
    /// Decimal age: corrected when gestational correction is active,
    /// chronological otherwise. That choice is the engine's, not the
    /// provider's.
    pub age_years: f64,
    /// Reference dataset identifier (e.g. "uk-who")
    pub reference: String,
}

/// A centile/SDS pair from the reference population
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CentileReading {
    /// Percentile rank, 0-100
    pub centile: f64,
    /// Standard deviation score
    pub sds: f64,
}

/// Provider-side failure modes
#[derive(Debug, thiserror::Error)]
pub enum CentileError {
    /// The value lies outside the range the reference population models
    #[error("value is outside the reference population's modeled range")]
    OutOfReferenceRange,

    /// The provider could not be reached or answered malformed
    #[error("centile provider unavailable: {0}")]
    Unavailable(String),
}

/// Plausibility alert raised against a provider reading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SdsAlert {
    /// Beyond the warning limit; the reading is kept but the
    /// measurement should be verified
    Verify,
    /// Beyond the hard limit; the reading was discarded
    Implausible,
}

/// Screen a provider SDS value against the plausibility limits.
///
/// SDS magnitudes this far from the reference mean point at a
/// measurement or data-entry error, not a real patient, so the consumer
/// must not trust them silently.
pub fn screen_sds(sds: f64) -> Option<SdsAlert> {
    if sds.abs() > SDS_HARD_LIMIT {
        Some(SdsAlert::Implausible)
    } else if sds.abs() > SDS_WARNING_LIMIT {
        Some(SdsAlert::Verify)
    } else {
        None
    }
}

/// External centile/SDS provider boundary
pub trait CentileSource {
    fn centile_and_sds(
        &self,
        request: &CentileRequest,
    ) -> std::result::Result<CentileReading, CentileError>;
}

/// Provider stand-in for callers with nothing wired up. Every lookup
/// reports unavailability, so bundles carry measurements without
/// centile readings.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableCentileSource;

impl CentileSource for UnavailableCentileSource {
    fn centile_and_sds(
        &self,
        _request: &CentileRequest,
    ) -> std::result::Result<CentileReading, CentileError> {
        Err(CentileError::Unavailable(
            "no centile provider configured".to_string(),
        ))
    }
}
