//! Body surface area estimation.
//!
//! The formula is always selected by the caller, never auto-chosen:
//! different clinical protocols standardize on different estimators and
//! silently switching between them would change dosing downstream. The
//! one exception is weight-only input, which has exactly one supported
//! path: the cBNF lookup table.

use crate::{DerivedMetric, Error, Result};
use serde::{Deserialize, Serialize};

/// Selectable BSA estimation formula
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BsaFormula {
    #[default]
    Mosteller,
    DuBois,
    Haycock,
    Boyd,
    /// BNF for Children weight-only lookup table; height is not used
    Cbnf,
}

impl BsaFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            BsaFormula::Mosteller => "mosteller",
            BsaFormula::DuBois => "du_bois",
            BsaFormula::Haycock => "haycock",
            BsaFormula::Boyd => "boyd",
            BsaFormula::Cbnf => "cbnf",
        }
    }
}

/// BNF for Children weight-to-BSA table (Sharkey I et al., British
/// Journal of Cancer 2001; 85(1): 23-28). Entries were derived from the
/// Boyd equation; half-kilogram steps below 10 kg, whole kilograms up
/// to 90 kg.
const CBNF_BSA_TABLE: &[(f64, f64)] = &[
    (1.0, 0.10),
    (1.5, 0.13),
    (2.0, 0.16),
    (2.5, 0.19),
    (3.0, 0.21),
    (3.5, 0.24),
    (4.0, 0.26),
    (4.5, 0.28),
    (5.0, 0.30),
    (5.5, 0.32),
    (6.0, 0.34),
    (6.5, 0.36),
    (7.0, 0.38),
    (7.5, 0.40),
    (8.0, 0.42),
    (8.5, 0.44),
    (9.0, 0.46),
    (9.5, 0.47),
    (10.0, 0.49),
    (11.0, 0.53),
    (12.0, 0.56),
    (13.0, 0.59),
    (14.0, 0.62),
    (15.0, 0.65),
    (16.0, 0.68),
    (17.0, 0.71),
    (18.0, 0.74),
    (19.0, 0.77),
    (20.0, 0.79),
    (21.0, 0.82),
    (22.0, 0.85),
    (23.0, 0.87),
    (24.0, 0.90),
    (25.0, 0.92),
    (26.0, 0.95),
    (27.0, 0.97),
    (28.0, 1.0),
    (29.0, 1.0),
    (30.0, 1.1),
    (31.0, 1.1),
    (32.0, 1.1),
    (33.0, 1.1),
    (34.0, 1.1),
    (35.0, 1.2),
    (36.0, 1.2),
    (37.0, 1.2),
    (38.0, 1.2),
    (39.0, 1.3),
    (40.0, 1.3),
    (41.0, 1.3),
    (42.0, 1.3),
    (43.0, 1.3),
    (44.0, 1.4),
    (45.0, 1.4),
    (46.0, 1.4),
    (47.0, 1.4),
    (48.0, 1.4),
    (49.0, 1.5),
    (50.0, 1.5),
    (51.0, 1.5),
    (52.0, 1.5),
    (53.0, 1.5),
    (54.0, 1.6),
    (55.0, 1.6),
    (56.0, 1.6),
    (57.0, 1.6),
    (58.0, 1.6),
    (59.0, 1.7),
    (60.0, 1.7),
    (61.0, 1.7),
    (62.0, 1.7),
    (63.0, 1.7),
    (64.0, 1.7),
    (65.0, 1.8),
    (66.0, 1.8),
    (67.0, 1.8),
    (68.0, 1.8),
    (69.0, 1.8),
    (70.0, 1.9),
    (71.0, 1.9),
    (72.0, 1.9),
    (73.0, 1.9),
    (74.0, 1.9),
    (75.0, 1.9),
    (76.0, 2.0),
    (77.0, 2.0),
    (78.0, 2.0),
    (79.0, 2.0),
    (80.0, 2.0),
    (81.0, 2.0),
    (82.0, 2.1),
    (83.0, 2.1),
    (84.0, 2.1),
    (85.0, 2.1),
    (86.0, 2.1),
    (87.0, 2.1),
    (88.0, 2.2),
    (89.0, 2.2),
    (90.0, 2.2),
];

/// Table lookup with linear interpolation between adjacent rows and
/// linear extrapolation from the outermost pair beyond either end.
fn cbnf_bsa(weight_kg: f64) -> f64 {
    let table = CBNF_BSA_TABLE;
    let n = table.len();

    let (lo, hi) = if weight_kg <= table[0].0 {
        (table[0], table[1])
    } else if weight_kg >= table[n - 1].0 {
        (table[n - 2], table[n - 1])
    } else {
        let i = table
            .windows(2)
            .position(|pair| weight_kg <= pair[1].0)
            .expect("weight is inside the table span");
        (table[i], table[i + 1])
    };

    let slope = (hi.1 - lo.1) / (hi.0 - lo.0);
    lo.1 + slope * (weight_kg - lo.0)
}

/// Estimate body surface area (m²) from height (cm) and weight (kg).
///
/// Both measurements are mandatory; the caller checks availability
/// before invoking. Non-positive inputs indicate the validation gate
/// was bypassed.
pub fn calculate(height_cm: f64, weight_kg: f64, formula: BsaFormula) -> Result<DerivedMetric> {
    if height_cm <= 0.0 || weight_kg <= 0.0 || !height_cm.is_finite() || !weight_kg.is_finite() {
        return Err(Error::InternalInconsistency(format!(
            "BSA invoked with height {height_cm} cm, weight {weight_kg} kg"
        )));
    }

    let value = match formula {
        BsaFormula::Mosteller => (height_cm * weight_kg / 3600.0).sqrt(),
        BsaFormula::DuBois => 0.007184 * height_cm.powf(0.725) * weight_kg.powf(0.425),
        BsaFormula::Haycock => 0.024265 * height_cm.powf(0.3964) * weight_kg.powf(0.5378),
        BsaFormula::Boyd => {
            let weight_g = weight_kg * 1000.0;
            0.0003207 * height_cm.powf(0.3) * weight_g.powf(0.7285 - 0.0188 * weight_g.log10())
        }
        BsaFormula::Cbnf => cbnf_bsa(weight_kg),
    };

    tracing::debug!(height_cm, weight_kg, ?formula, value, "computed BSA");

    Ok(DerivedMetric::Bsa { value, formula })
}

/// Estimate body surface area (m²) from weight (kg) alone via the cBNF
/// lookup table. Used when no height measurement exists.
pub fn calculate_from_weight(weight_kg: f64) -> Result<DerivedMetric> {
    if weight_kg <= 0.0 || !weight_kg.is_finite() {
        return Err(Error::InternalInconsistency(format!(
            "weight-only BSA invoked with weight {weight_kg} kg"
        )));
    }

    let value = cbnf_bsa(weight_kg);

    tracing::debug!(weight_kg, value, "computed BSA from weight-only lookup");

    Ok(DerivedMetric::Bsa {
        value,
        formula: BsaFormula::Cbnf,
    })
}
