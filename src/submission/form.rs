//! Typed state of the new-analysis form and its validation rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DssConfig;
use crate::distribution::{DistributionEntry, ROUND_DEC, is_valid, to_array, to_dictionary};
use crate::mappings::{self, LabelMapping};
use crate::numeric::round_to;

/// Longest accepted analysis name, in characters.
pub const MAX_NAME_LEN: usize = 30;

/// Day profile the power analysis is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayProfile {
    #[default]
    Weekdays,
    Weekends,
}

/// Values held by the new-analysis form.
///
/// Ratios and utilisation shares are percentages (0-100). Select fields hold
/// the numeric code of the chosen option, see [`crate::mappings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisForm {
    pub name: String,

    // Urban behaviour model inputs
    pub total_urban_trips: f64,
    pub total_incoming_trips: f64,
    pub total_outgoing_trips: f64,
    pub average_number_trips: f64,
    pub bevs_ratio: f64,
    pub phevs_ratio: f64,

    // Vehicle adoption (discrete-choice model) inputs
    pub forecast_year: u16,
    pub vehicle_imm_t0: f64,
    pub bev_vehicle_t0: f64,
    pub phev_vehicle_t0: f64,
    /// Reference ICE price (EUR).
    pub price_ice: f64,
    /// Reference ICE range (km).
    pub range_ice: f64,
    pub diffusion: f64,
    pub coef_price_bev: f64,
    pub coef_price_phev: f64,
    pub coef_range_bev: f64,
    pub coef_range_phev: f64,
    pub cost_bev: f64,
    pub cost_phev: f64,
    pub purchase_incentives_bev: f64,
    pub purchase_incentives_phev: f64,
    pub utilization_incentives_bev: f64,
    pub utilization_incentives_phev: f64,

    // Charging point utilisation
    pub home_public: f64,
    pub home_private: f64,
    pub work_public: f64,
    pub work_private: f64,
    pub other_public: f64,
    pub charging_time: f64,
    pub waiting_time: f64,
    pub charging_price: f64,
    pub renewable_energy: f64,

    /// Daily travelled distance rows.
    pub travel_dist: Vec<DistributionEntry>,

    // Power and charging infrastructure
    pub ciy: bool,
    pub tdp: DayProfile,
}

/// Fraction to percentage, rounded to two decimals.
pub(crate) fn percent(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 2)
}

impl AnalysisForm {
    /// Initial form state derived from configured defaults.
    pub fn from_defaults(config: &DssConfig) -> Self {
        let a = &config.analysis;
        Self {
            name: String::new(),
            total_urban_trips: 0.0,
            total_incoming_trips: 0.0,
            total_outgoing_trips: 0.0,
            average_number_trips: 1.0,
            bevs_ratio: percent(a.bevs_ratio),
            phevs_ratio: percent(a.phevs_ratio),
            forecast_year: *mappings::FORECAST_YEARS.start(),
            vehicle_imm_t0: 0.0,
            bev_vehicle_t0: 0.0,
            phev_vehicle_t0: 0.0,
            price_ice: round_to(config.dcm.default_price_ice * 10_000.0, 2),
            range_ice: round_to(config.dcm.default_range_ice * 100.0, 2),
            diffusion: 0.0,
            coef_price_bev: 1.0,
            coef_price_phev: 1.0,
            coef_range_bev: 1.0,
            coef_range_phev: 1.0,
            cost_bev: 0.0,
            cost_phev: 0.0,
            purchase_incentives_bev: 0.0,
            purchase_incentives_phev: 0.0,
            utilization_incentives_bev: 0.0,
            utilization_incentives_phev: 0.0,
            home_public: percent(a.home_public),
            home_private: percent(a.home_private),
            work_public: percent(a.work_public),
            work_private: percent(a.work_private),
            other_public: percent(a.other_public),
            charging_time: 1.0,
            waiting_time: 1.0,
            charging_price: 0.5,
            renewable_energy: 0.0,
            travel_dist: to_array(&a.km_travelled_dist),
            ciy: true,
            tdp: DayProfile::Weekdays,
        }
    }

    /// Layers `overrides` over the configured defaults.
    ///
    /// Unknown members are rejected; members left out keep their default.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if a member is unknown or mistyped.
    pub fn from_overrides(
        overrides: Map<String, Value>,
        config: &DssConfig,
    ) -> Result<Self, serde_json::Error> {
        let mut merged = match serde_json::to_value(Self::from_defaults(config))? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(overrides);
        serde_json::from_value(Value::Object(merged))
    }

    /// Parses a TOML form file over the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a member is unknown or mistyped.
    pub fn from_toml_str(s: &str, config: &DssConfig) -> crate::Result<Self> {
        let overrides: Map<String, Value> = toml::from_str(s)?;
        Ok(Self::from_overrides(overrides, config)?)
    }

    /// Sum of the five charging utilisation percentages.
    pub fn utilization_total(&self) -> f64 {
        self.work_public + self.work_private + self.other_public + self.home_public + self.home_private
    }

    /// Checks every field and returns all violations.
    ///
    /// `existing_names` are the names of the project's other analyses; a new
    /// analysis may not reuse one.
    pub fn validate(&self, existing_names: &[String]) -> Vec<FormError> {
        let mut errors = Vec::new();

        let name = self.name.as_str();
        if name.is_empty() {
            errors.push(FormError::new("name", "Required"));
        } else {
            if !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace())
            {
                errors.push(FormError::new(
                    "name",
                    "Only alphanumeric characters and underscores, spaces and dashes are allowed",
                ));
            }
            if name.chars().count() > MAX_NAME_LEN {
                errors.push(FormError::new("name", "Must be 30 characters or less"));
            }
            if existing_names.iter().any(|n| n == name) {
                errors.push(FormError::new(
                    "name",
                    "An analysis with this name already exists",
                ));
            }
        }

        let minimums = [
            ("total_urban_trips", self.total_urban_trips, 0.0),
            ("total_incoming_trips", self.total_incoming_trips, 0.0),
            ("total_outgoing_trips", self.total_outgoing_trips, 0.0),
            ("average_number_trips", self.average_number_trips, 1.0),
            ("vehicle_imm_t0", self.vehicle_imm_t0, 0.0),
            ("bev_vehicle_t0", self.bev_vehicle_t0, 0.0),
            ("phev_vehicle_t0", self.phev_vehicle_t0, 0.0),
        ];
        for (field, value, min) in minimums {
            if value < min {
                errors.push(FormError::new(field, format!("Must be greater than or equal to {min}")));
            }
        }

        let ranges = [
            ("bevs_ratio", self.bevs_ratio, 0.0, 100.0),
            ("phevs_ratio", self.phevs_ratio, 0.0, 100.0),
            ("price_ice", self.price_ice, 10_000.0, 100_000.0),
            ("range_ice", self.range_ice, 100.0, 1_000.0),
            ("home_public", self.home_public, 0.0, 100.0),
            ("home_private", self.home_private, 0.0, 100.0),
            ("work_public", self.work_public, 0.0, 100.0),
            ("work_private", self.work_private, 0.0, 100.0),
            ("other_public", self.other_public, 0.0, 100.0),
            ("renewable_energy", self.renewable_energy, 0.0, 100.0),
        ];
        for (field, value, min, max) in ranges {
            if !(min..=max).contains(&value) {
                errors.push(FormError::new(field, format!("Must be between {min} and {max}")));
            }
        }

        if self.bevs_ratio + self.phevs_ratio > 100.0 {
            for field in ["bevs_ratio", "phevs_ratio"] {
                errors.push(FormError::new(
                    field,
                    "Sum of BEV and PHEV ratios must be less than 100",
                ));
            }
        }

        if !mappings::is_forecast_year(self.forecast_year) {
            errors.push(FormError::new(
                "forecast_year",
                format!(
                    "Must be a year between {} and {}",
                    mappings::FORECAST_YEARS.start(),
                    mappings::FORECAST_YEARS.end()
                ),
            ));
        }

        let coded: [(&str, f64, LabelMapping); 14] = [
            ("diffusion", self.diffusion, mappings::DIFFUSION),
            ("cost_bev", self.cost_bev, mappings::ENERGY_COST),
            ("cost_phev", self.cost_phev, mappings::ENERGY_COST),
            ("coef_price_bev", self.coef_price_bev, mappings::EV_PRICE),
            ("coef_price_phev", self.coef_price_phev, mappings::EV_PRICE),
            ("coef_range_bev", self.coef_range_bev, mappings::EV_RANGE),
            ("coef_range_phev", self.coef_range_phev, mappings::EV_RANGE),
            ("purchase_incentives_bev", self.purchase_incentives_bev, mappings::PURCHASE_INCENTIVE),
            ("purchase_incentives_phev", self.purchase_incentives_phev, mappings::PURCHASE_INCENTIVE),
            ("utilization_incentives_bev", self.utilization_incentives_bev, mappings::UTILIZATION_INCENTIVES),
            ("utilization_incentives_phev", self.utilization_incentives_phev, mappings::UTILIZATION_INCENTIVES),
            ("charging_time", self.charging_time, mappings::CHARGING_TIME),
            ("waiting_time", self.waiting_time, mappings::WAITING_TIME),
            ("charging_price", self.charging_price, mappings::CHARGING_PRICE),
        ];
        for (field, code, mapping) in coded {
            if !mapping.contains_code(code) {
                errors.push(FormError::new(
                    field,
                    format!("Must be one of the {} options", mapping.name),
                ));
            }
        }

        if round_to(self.utilization_total(), ROUND_DEC) != 100.0 {
            errors.push(FormError::new(
                "cp_total",
                format!("Total should equal 100, got {}", self.utilization_total()),
            ));
        }

        if !is_valid(&to_dictionary(&self.travel_dist)) {
            errors.push(FormError::new("travel_dist", "Total should equal 100"));
        }

        errors
    }
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self::from_defaults(&DssConfig::baseline())
    }
}

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct FormError {
    pub field: String,
    pub message: String,
}

impl FormError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> AnalysisForm {
        AnalysisForm {
            name: name.to_string(),
            ..AnalysisForm::default()
        }
    }

    fn fields(errors: &[FormError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn defaults_are_valid_once_named() {
        let errors = named("Baseline 2030").validate(&[]);
        assert!(errors.is_empty(), "defaults should validate: {errors:?}");
    }

    #[test]
    fn defaults_follow_configuration() {
        let form = AnalysisForm::from_defaults(&DssConfig::urban());
        assert_eq!(form.bevs_ratio, 20.0);
        assert_eq!(form.price_ice, 22_000.0);
        assert_eq!(form.travel_dist[0], DistributionEntry::new("2.5", "25.00"));
        assert_eq!(form.forecast_year, 2023);
    }

    #[test]
    fn name_rules() {
        assert_eq!(fields(&named("").validate(&[])), vec!["name"]);
        assert_eq!(fields(&named("bad/name").validate(&[])), vec!["name"]);
        assert_eq!(
            fields(&named("a name that is definitely longer than thirty").validate(&[])),
            vec!["name"]
        );
        assert_eq!(
            fields(&named("Base").validate(&["Base".to_string()])),
            vec!["name"]
        );
        assert!(named("ok_name-2 x").validate(&[]).is_empty());
    }

    #[test]
    fn ratio_sum_over_100_flags_both_fields() {
        let form = AnalysisForm {
            bevs_ratio: 70.0,
            phevs_ratio: 40.0,
            ..named("ratios")
        };
        let errors = form.validate(&[]);
        assert_eq!(fields(&errors), vec!["bevs_ratio", "phevs_ratio"]);
    }

    #[test]
    fn utilisation_must_total_100() {
        let form = AnalysisForm {
            home_private: 10.0,
            ..named("util")
        };
        assert_eq!(fields(&form.validate(&[])), vec!["cp_total"]);
    }

    #[test]
    fn coded_fields_must_use_known_codes() {
        let form = AnalysisForm {
            diffusion: 3.0,
            waiting_time: 2.0,
            ..named("codes")
        };
        assert_eq!(fields(&form.validate(&[])), vec!["diffusion", "waiting_time"]);
    }

    #[test]
    fn travel_distance_must_total_100() {
        let form = AnalysisForm {
            travel_dist: vec![
                DistributionEntry::new("5", "50"),
                DistributionEntry::new("10", "40"),
            ],
            ..named("dist")
        };
        assert_eq!(fields(&form.validate(&[])), vec!["travel_dist"]);
    }

    #[test]
    fn toml_form_overrides_configured_defaults() {
        let toml = r#"
            name = "Centre"
            total_urban_trips = 12000
            tdp = "Weekends"
            travel_dist = [
                { key = "5", value = "60" },
                { key = "10", value = "40" },
            ]
        "#;
        let form = AnalysisForm::from_toml_str(toml, &DssConfig::urban()).expect("form parses");
        assert_eq!(form.name, "Centre");
        assert_eq!(form.total_urban_trips, 12_000.0);
        assert_eq!(form.tdp, DayProfile::Weekends);
        assert_eq!(form.travel_dist.len(), 2);
        assert_eq!(form.bevs_ratio, 20.0);
        assert!(form.validate(&[]).is_empty());
    }

    #[test]
    fn unknown_form_member_is_rejected() {
        assert!(AnalysisForm::from_toml_str("colour = \"red\"", &DssConfig::baseline()).is_err());
    }

    #[test]
    fn out_of_range_values() {
        let form = AnalysisForm {
            average_number_trips: 0.5,
            price_ice: 500.0,
            forecast_year: 2040,
            ..named("ranges")
        };
        assert_eq!(
            fields(&form.validate(&[])),
            vec!["average_number_trips", "price_ice", "forecast_year"]
        );
    }
}
