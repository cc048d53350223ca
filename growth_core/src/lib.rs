#![forbid(unsafe_code)]

//! Core domain model and calculation logic for pediatric growth
//! assessment.
//!
//! This crate provides:
//! - Domain types (measurements, patient context, derived metrics)
//! - Chronological and gestation-corrected age calculation
//! - Body surface area, height velocity and mid-parental height engines
//! - GH dose unit conversion
//! - Input validation with clinical plausibility bounds
//! - Chart age-range selection
//! - The boundary to the external centile/SDS provider

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod age;
pub mod bsa;
pub mod velocity;
pub mod mph;
pub mod dose;
pub mod validation;
pub mod age_range;
pub mod reference;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use age::assess_age;
pub use bsa::BsaFormula;
pub use dose::{DoseContext, DoseUnit};
pub use reference::{
    CentileReading, CentileRequest, CentileSource, SdsAlert, UnavailableCentileSource,
};
pub use validation::{validate, RawInput};
pub use engine::evaluate;
