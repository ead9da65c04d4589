//! TOML-based analysis defaults and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distribution::{DistributionDict, ROUND_DEC, is_valid};
use crate::numeric::round_to;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML with
/// [`DssConfig::from_toml_file`] or use [`DssConfig::baseline`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DssConfig {
    /// Initial values of a new analysis.
    #[serde(default)]
    pub analysis: AnalysisDefaults,
    /// Discrete-choice model reference values.
    #[serde(default)]
    pub dcm: DcmDefaults,
    /// Fixed simulation and output parameters sent with every analysis.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Initial values of a new analysis, as fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisDefaults {
    /// Share of battery electric vehicles in the fleet (0.0-1.0).
    pub bevs_ratio: f64,
    /// Share of plug-in hybrid vehicles in the fleet (0.0-1.0).
    pub phevs_ratio: f64,
    /// Night charging at public points near home.
    pub home_public: f64,
    /// Night charging at private points at home.
    pub home_private: f64,
    /// Day charging at public points near work.
    pub work_public: f64,
    /// Day charging at private points at work.
    pub work_private: f64,
    /// Day charging at other public points.
    pub other_public: f64,
    /// Daily travelled distance distribution (km bucket to weight).
    pub km_travelled_dist: DistributionDict,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            bevs_ratio: 0.1,
            phevs_ratio: 0.05,
            home_public: 0.1,
            home_private: 0.5,
            work_public: 0.1,
            work_private: 0.2,
            other_public: 0.1,
            km_travelled_dist: DistributionDict::from_weights([
                ("5", 0.3),
                ("10", 0.25),
                ("20", 0.2),
                ("50", 0.15),
                ("100", 0.1),
            ]),
        }
    }
}

impl AnalysisDefaults {
    /// The five charging utilisation shares, in form order.
    pub fn utilization_shares(&self) -> [f64; 5] {
        [
            self.home_public,
            self.home_private,
            self.work_public,
            self.work_private,
            self.other_public,
        ]
    }
}

/// Discrete-choice model reference values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DcmDefaults {
    /// Reference ICE vehicle price in units of 10 000 EUR.
    pub default_price_ice: f64,
    /// Reference ICE vehicle range in units of 100 km.
    pub default_range_ice: f64,
}

impl Default for DcmDefaults {
    fn default() -> Self {
        Self {
            default_price_ice: 2.5,
            default_range_ice: 6.0,
        }
    }
}

/// Fixed simulation and output parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Simulation epochs run by the backend.
    pub max_epoch: u32,
    /// Simulated days.
    pub simulation_days: u32,
    /// `outputsY.LW` sent to the backend.
    pub lw: u32,
    /// `outputsY.TNP` sent to the backend.
    pub tnp: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_epoch: 3,
            simulation_days: 3,
            lw: 50_000,
            tnp: 5_000,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"analysis.bevs_ratio"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl DssConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "urban"];

    /// Returns the baseline defaults.
    pub fn baseline() -> Self {
        Self {
            analysis: AnalysisDefaults::default(),
            dcm: DcmDefaults::default(),
            output: OutputConfig::default(),
        }
    }

    /// Returns the dense-urban preset: higher adoption, shorter trips, more public charging.
    pub fn urban() -> Self {
        Self {
            analysis: AnalysisDefaults {
                bevs_ratio: 0.2,
                phevs_ratio: 0.1,
                home_public: 0.25,
                home_private: 0.25,
                work_public: 0.15,
                work_private: 0.15,
                other_public: 0.2,
                km_travelled_dist: DistributionDict::from_weights([
                    ("2,5", 0.25),
                    ("5", 0.35),
                    ("10", 0.25),
                    ("20", 0.15),
                ]),
            },
            dcm: DcmDefaults {
                default_price_ice: 2.2,
                ..DcmDefaults::default()
            },
            output: OutputConfig::default(),
        }
    }

    /// Loads defaults from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "urban" => Ok(Self::urban()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let a = &self.analysis;

        let fractions = [
            ("analysis.bevs_ratio", a.bevs_ratio),
            ("analysis.phevs_ratio", a.phevs_ratio),
            ("analysis.home_public", a.home_public),
            ("analysis.home_private", a.home_private),
            ("analysis.work_public", a.work_public),
            ("analysis.work_private", a.work_private),
            ("analysis.other_public", a.other_public),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
            }
        }
        if a.bevs_ratio + a.phevs_ratio > 1.0 {
            errors.push(ConfigError::new(
                "analysis.phevs_ratio",
                "analysis.bevs_ratio + analysis.phevs_ratio must be <= 1.0",
            ));
        }
        let utilization: f64 = a.utilization_shares().iter().sum();
        if round_to(utilization, ROUND_DEC) != 1.0 {
            errors.push(ConfigError::new(
                "analysis.home_public",
                format!("charging utilisation shares must sum to 1.0, got {utilization}"),
            ));
        }
        if !is_valid(&a.km_travelled_dist) {
            errors.push(ConfigError::new(
                "analysis.km_travelled_dist",
                "weights must be numbers summing to 1.0",
            ));
        }

        let d = &self.dcm;
        if !(1.0..=10.0).contains(&d.default_price_ice) {
            errors.push(ConfigError::new("dcm.default_price_ice", "must be in [1.0, 10.0]"));
        }
        if !(1.0..=10.0).contains(&d.default_range_ice) {
            errors.push(ConfigError::new("dcm.default_range_ice", "must be in [1.0, 10.0]"));
        }

        let o = &self.output;
        if o.max_epoch == 0 {
            errors.push(ConfigError::new("output.max_epoch", "must be > 0"));
        }
        if o.simulation_days == 0 {
            errors.push(ConfigError::new("output.simulation_days", "must be > 0"));
        }

        errors
    }
}

impl Default for DssConfig {
    fn default() -> Self {
        Self::baseline()
    }
}
