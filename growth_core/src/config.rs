//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/growthcalc/config.toml`.

use crate::bsa::BsaFormula;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub calculation: CalculationConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,
}

/// Calculation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// BSA estimation formula applied by the orchestrating engine
    #[serde(default)]
    pub bsa_formula: BsaFormula,

    /// Minimum interval (days) before a height-velocity estimate is
    /// considered stable
    #[serde(default = "default_velocity_min_interval_days")]
    pub velocity_min_interval_days: i64,

    /// Clinical target band around the mid-parental height (cm)
    #[serde(default = "default_mph_target_range_cm")]
    pub mph_target_range_cm: f64,

    /// Standard GH dosing intensity (mg/m²/week)
    #[serde(default = "default_gh_standard_mg_m2_week")]
    pub gh_standard_mg_m2_week: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            bsa_formula: BsaFormula::default(),
            velocity_min_interval_days: default_velocity_min_interval_days(),
            mph_target_range_cm: default_mph_target_range_cm(),
            gh_standard_mg_m2_week: default_gh_standard_mg_m2_week(),
        }
    }
}

/// Growth reference configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Default reference dataset identifier sent to the centile provider
    #[serde(default = "default_dataset")]
    pub dataset: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
        }
    }
}

// Default value functions
fn default_velocity_min_interval_days() -> i64 {
    crate::velocity::DEFAULT_MIN_INTERVAL_DAYS
}

fn default_mph_target_range_cm() -> f64 {
    crate::mph::DEFAULT_TARGET_RANGE_CM
}

fn default_gh_standard_mg_m2_week() -> f64 {
    crate::dose::STANDARD_DOSE_MG_M2_WEEK
}

fn default_dataset() -> String {
    "uk-who".to_string()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.calculation.velocity_min_interval_days < 1 {
            return Err(Error::Config(
                "velocity_min_interval_days must be at least 1".to_string(),
            ));
        }
        if config.calculation.gh_standard_mg_m2_week <= 0.0 {
            return Err(Error::Config(
                "gh_standard_mg_m2_week must be positive".to_string(),
            ));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("growthcalc").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
