//! Analysis-creation payload expected by the simulation backend.
//!
//! Field names are part of the backend wire contract (`ubmY`, `outputsY`,
//! `powerY`, `ciY`, ...) and must not change.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{ChargingPointModel, charging_point_catalog};
use super::form::{AnalysisForm, DayProfile, percent};
use crate::config::OutputConfig;
use crate::distribution::{DistributionDict, to_array, to_dictionary};
use crate::mappings;

/// Status every new analysis is created with.
pub const STATUS_RUNNING: &str = "running";

/// Body of `POST /analysis/{projectId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub name: String,
    pub status: String,
    #[serde(rename = "ubmY")]
    pub ubm_y: UbmSection,
    pub max_epoch: u32,
    pub simulation_days: u32,
    #[serde(rename = "outputsY")]
    pub outputs_y: OutputsSection,
    pub default: bool,
    #[serde(rename = "powerY", default, skip_serializing_if = "Option::is_none")]
    pub power_y: Option<PowerSection>,
    #[serde(rename = "ciY", default, skip_serializing_if = "Option::is_none")]
    pub ci_y: Option<ChargingInfraSection>,
}

/// Urban behaviour model section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UbmSection {
    pub input: UbmInput,
    pub config: UbmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UbmInput {
    pub total_urban_trips: Vec<f64>,
    pub total_incoming_trips: Vec<f64>,
    pub total_outgoing_trips: Vec<f64>,
    pub average_number_trips: Vec<f64>,
    /// BEV share of the fleet (0-1).
    pub bevs_ratio: f64,
    /// PHEV share of the fleet (0-1).
    pub phevs_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UbmConfig {
    pub night_ratio: NightRatio,
    pub day_ratio: DayRatio,
    pub km_travelled_dist: DistributionDict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightRatio {
    pub home_public: f64,
    pub home_private: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRatio {
    pub work_public: f64,
    pub work_private: f64,
    pub other_public: f64,
    pub other_semi_public: f64,
    pub fast: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputsSection {
    #[serde(rename = "LW")]
    pub lw: u32,
    #[serde(rename = "TNP")]
    pub tnp: u32,
}

/// Power grid section, present only for power analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSection {
    #[serde(rename = "CIY")]
    pub ciy: bool,
    /// Forecast year.
    #[serde(rename = "AY")]
    pub ay: u16,
    #[serde(rename = "TDP")]
    pub tdp: DayProfile,
}

/// Charging infrastructure section, present only for power analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingInfraSection {
    #[serde(rename = "CIY")]
    pub ciy: bool,
    #[serde(rename = "CI_database")]
    pub ci_database: Vec<ChargingPointModel>,
}

impl AnalysisForm {
    /// Builds the backend payload with the default output parameters.
    ///
    /// Percentages become fractions, trip totals become one-element arrays and
    /// the travelled-distance rows become a distribution dictionary. Without
    /// `can_do_power_analysis` the `powerY` and `ciY` sections are left out.
    pub fn to_payload(&self, can_do_power_analysis: bool) -> AnalysisPayload {
        self.to_payload_with(can_do_power_analysis, &OutputConfig::default())
    }

    /// Same as [`Self::to_payload`] with explicit output parameters.
    pub fn to_payload_with(&self, can_do_power_analysis: bool, output: &OutputConfig) -> AnalysisPayload {
        let (power_y, ci_y) = if can_do_power_analysis {
            (
                Some(PowerSection {
                    ciy: self.ciy,
                    ay: self.forecast_year,
                    tdp: self.tdp,
                }),
                Some(ChargingInfraSection {
                    ciy: self.ciy,
                    ci_database: charging_point_catalog(),
                }),
            )
        } else {
            (None, None)
        };

        AnalysisPayload {
            name: self.name.clone(),
            status: STATUS_RUNNING.to_string(),
            ubm_y: UbmSection {
                input: UbmInput {
                    total_urban_trips: vec![self.total_urban_trips],
                    total_incoming_trips: vec![self.total_incoming_trips],
                    total_outgoing_trips: vec![self.total_outgoing_trips],
                    average_number_trips: vec![self.average_number_trips],
                    bevs_ratio: self.bevs_ratio / 100.0,
                    phevs_ratio: self.phevs_ratio / 100.0,
                },
                config: UbmConfig {
                    night_ratio: NightRatio {
                        home_public: self.home_public / 100.0,
                        home_private: self.home_private / 100.0,
                    },
                    day_ratio: DayRatio {
                        work_public: self.work_public / 100.0,
                        work_private: self.work_private / 100.0,
                        other_public: self.other_public / 100.0,
                        other_semi_public: 0.0,
                        fast: 0.0,
                    },
                    km_travelled_dist: to_dictionary(&self.travel_dist),
                },
            },
            max_epoch: output.max_epoch,
            simulation_days: output.simulation_days,
            outputs_y: OutputsSection {
                lw: output.lw,
                tnp: output.tnp,
            },
            default: true,
            power_y,
            ci_y,
        }
    }

    /// Writes a stored analysis back into the form, e.g. to duplicate it.
    ///
    /// Only members present in `record` are written. Fractions come back as
    /// percentages rounded to two decimals. The forecast year is ignored
    /// unless it is one the form offers.
    pub fn apply_analysis(&mut self, record: &AnalysisRecord) {
        if let Some(name) = &record.name {
            self.name.clone_from(name);
        }

        if let Some(ubm) = &record.ubm_y {
            if let Some(input) = &ubm.input {
                let first = |v: &Option<Vec<f64>>| v.as_ref().and_then(|v| v.first().copied());
                if let Some(v) = first(&input.total_urban_trips) {
                    self.total_urban_trips = v;
                }
                if let Some(v) = first(&input.total_incoming_trips) {
                    self.total_incoming_trips = v;
                }
                if let Some(v) = first(&input.total_outgoing_trips) {
                    self.total_outgoing_trips = v;
                }
                if let Some(v) = first(&input.average_number_trips) {
                    self.average_number_trips = v;
                }
                if let Some(v) = input.bevs_ratio {
                    self.bevs_ratio = percent(v);
                }
                if let Some(v) = input.phevs_ratio {
                    self.phevs_ratio = percent(v);
                }
            }
            if let Some(config) = &ubm.config {
                if let Some(night) = &config.night_ratio {
                    if let Some(v) = night.home_public {
                        self.home_public = percent(v);
                    }
                    if let Some(v) = night.home_private {
                        self.home_private = percent(v);
                    }
                }
                if let Some(day) = &config.day_ratio {
                    if let Some(v) = day.work_public {
                        self.work_public = percent(v);
                    }
                    if let Some(v) = day.work_private {
                        self.work_private = percent(v);
                    }
                    if let Some(v) = day.other_public {
                        self.other_public = percent(v);
                    }
                }
                if let Some(dist) = &config.km_travelled_dist {
                    self.travel_dist = to_array(dist);
                }
            }
        }

        if let Some(power) = &record.power_y {
            if let Some(ciy) = power.ciy {
                self.ciy = ciy;
            }
            match power.ay {
                Some(year) if mappings::is_forecast_year(year) => self.forecast_year = year,
                Some(year) => tracing::warn!(year, "ignoring unsupported forecast year"),
                None => {}
            }
            if let Some(tdp) = power.tdp {
                self.tdp = tdp;
            }
        }
    }
}

/// Stored analysis as returned by the backend; every member may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ubmY", default)]
    pub ubm_y: Option<UbmRecord>,
    #[serde(rename = "powerY", default)]
    pub power_y: Option<PowerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UbmRecord {
    #[serde(default)]
    pub input: Option<UbmInputRecord>,
    #[serde(default)]
    pub config: Option<UbmConfigRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UbmInputRecord {
    pub total_urban_trips: Option<Vec<f64>>,
    pub total_incoming_trips: Option<Vec<f64>>,
    pub total_outgoing_trips: Option<Vec<f64>>,
    pub average_number_trips: Option<Vec<f64>>,
    pub bevs_ratio: Option<f64>,
    pub phevs_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UbmConfigRecord {
    pub night_ratio: Option<NightRatioRecord>,
    pub day_ratio: Option<DayRatioRecord>,
    pub km_travelled_dist: Option<DistributionDict>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightRatioRecord {
    pub home_public: Option<f64>,
    pub home_private: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayRatioRecord {
    pub work_public: Option<f64>,
    pub work_private: Option<f64>,
    pub other_public: Option<f64>,
}

/// Power-analysis members of a stored analysis.
///
/// A mistyped member reads as absent so the rest of the record still applies.
/// `AY` may be stored as a number or as text (`"2030"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerRecord {
    #[serde(rename = "CIY", deserialize_with = "lenient")]
    pub ciy: Option<bool>,
    #[serde(rename = "AY", deserialize_with = "lenient_year")]
    pub ay: Option<u16>,
    #[serde(rename = "TDP", deserialize_with = "lenient")]
    pub tdp: Option<DayProfile>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!(%value, error = %e, "ignoring mistyped stored member");
            Ok(None)
        }
    }
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let year = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .and_then(|y| u16::try_from(y).ok());
    if year.is_none() {
        tracing::warn!(%value, "ignoring unreadable forecast year");
    }
    Ok(year)
}

impl From<&AnalysisPayload> for AnalysisRecord {
    fn from(p: &AnalysisPayload) -> Self {
        let input = &p.ubm_y.input;
        let config = &p.ubm_y.config;
        Self {
            id: None,
            name: Some(p.name.clone()),
            ubm_y: Some(UbmRecord {
                input: Some(UbmInputRecord {
                    total_urban_trips: Some(input.total_urban_trips.clone()),
                    total_incoming_trips: Some(input.total_incoming_trips.clone()),
                    total_outgoing_trips: Some(input.total_outgoing_trips.clone()),
                    average_number_trips: Some(input.average_number_trips.clone()),
                    bevs_ratio: Some(input.bevs_ratio),
                    phevs_ratio: Some(input.phevs_ratio),
                }),
                config: Some(UbmConfigRecord {
                    night_ratio: Some(NightRatioRecord {
                        home_public: Some(config.night_ratio.home_public),
                        home_private: Some(config.night_ratio.home_private),
                    }),
                    day_ratio: Some(DayRatioRecord {
                        work_public: Some(config.day_ratio.work_public),
                        work_private: Some(config.day_ratio.work_private),
                        other_public: Some(config.day_ratio.other_public),
                    }),
                    km_travelled_dist: Some(config.km_travelled_dist.clone()),
                }),
            }),
            power_y: p.power_y.as_ref().map(|power| PowerRecord {
                ciy: Some(power.ciy),
                ay: Some(power.ay),
                tdp: Some(power.tdp),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::distribution::DistributionEntry;

    fn sample_form() -> AnalysisForm {
        AnalysisForm {
            name: "Centre 2030".to_string(),
            total_urban_trips: 120_000.0,
            total_incoming_trips: 8_000.0,
            total_outgoing_trips: 6_500.0,
            average_number_trips: 2.5,
            bevs_ratio: 12.0,
            phevs_ratio: 4.0,
            forecast_year: 2030,
            home_public: 20.0,
            home_private: 40.0,
            work_public: 10.0,
            work_private: 20.0,
            other_public: 10.0,
            travel_dist: vec![
                DistributionEntry::new("10", "60"),
                DistributionEntry::new("1", "15"),
                DistributionEntry::new("2", "25"),
            ],
            ciy: false,
            tdp: DayProfile::Weekends,
            ..AnalysisForm::default()
        }
    }

    #[test]
    fn percentages_become_fractions() {
        let payload = sample_form().to_payload(true);
        let input = &payload.ubm_y.input;
        assert_eq!(input.bevs_ratio, 0.12);
        assert_eq!(input.phevs_ratio, 0.04);
        assert_eq!(input.total_urban_trips, vec![120_000.0]);
        assert_eq!(input.average_number_trips, vec![2.5]);

        let config = &payload.ubm_y.config;
        assert_eq!(config.night_ratio.home_private, 0.4);
        assert_eq!(config.day_ratio.work_private, 0.2);
        assert_eq!(config.day_ratio.other_semi_public, 0.0);
        assert_eq!(config.day_ratio.fast, 0.0);
        assert_eq!(config.km_travelled_dist.get("10"), Some(0.6));
    }

    #[test]
    fn fixed_members() {
        let payload = sample_form().to_payload(false);
        assert_eq!(payload.status, "running");
        assert_eq!(payload.max_epoch, 3);
        assert_eq!(payload.simulation_days, 3);
        assert_eq!(payload.outputs_y.lw, 50_000);
        assert_eq!(payload.outputs_y.tnp, 5_000);
        assert!(payload.default);
    }

    #[test]
    fn power_sections_follow_flag() {
        let with = sample_form().to_payload(true);
        let power = with.power_y.as_ref().expect("powerY present");
        assert!(!power.ciy);
        assert_eq!(power.ay, 2030);
        assert_eq!(power.tdp, DayProfile::Weekends);
        assert_eq!(with.ci_y.as_ref().map(|c| c.ci_database.len()), Some(10));

        let without = sample_form().to_payload(false);
        let json = serde_json::to_value(&without).unwrap_or_default();
        let obj = json.as_object().expect("payload serializes to an object");
        assert!(!obj.contains_key("powerY"));
        assert!(!obj.contains_key("ciY"));
    }

    #[test]
    fn serializes_wire_keys() {
        let json = serde_json::to_value(sample_form().to_payload(true)).unwrap_or_default();
        assert_eq!(json["ubmY"]["input"]["bevs_ratio"], 0.12);
        assert_eq!(json["ubmY"]["config"]["night_ratio"]["home_public"], 0.2);
        assert_eq!(json["ubmY"]["config"]["km_travelled_dist"]["1"], 0.15);
        assert_eq!(json["outputsY"]["LW"], 50_000);
        assert_eq!(json["powerY"]["AY"], 2030);
        assert_eq!(json["powerY"]["TDP"], "Weekends");
        assert_eq!(json["ciY"]["CIY"], Value::Bool(false));
        assert_eq!(json["ciY"]["CI_database"][9]["manufacturer"], "Janja 2");
    }

    #[test]
    fn apply_analysis_reverses_payload() {
        let original = sample_form();
        let record = AnalysisRecord::from(&original.to_payload(true));

        let mut form = AnalysisForm::default();
        form.apply_analysis(&record);

        assert_eq!(form.name, original.name);
        assert_eq!(form.total_incoming_trips, original.total_incoming_trips);
        assert_eq!(form.bevs_ratio, original.bevs_ratio);
        assert_eq!(form.home_private, original.home_private);
        assert_eq!(form.forecast_year, 2030);
        assert_eq!(form.tdp, DayProfile::Weekends);
        assert!(!form.ciy);
        assert_eq!(
            form.travel_dist,
            vec![
                DistributionEntry::new("1", "15.00"),
                DistributionEntry::new("2", "25.00"),
                DistributionEntry::new("10", "60.00"),
            ]
        );
    }

    #[test]
    fn apply_analysis_skips_missing_and_unknown_year() {
        let record: AnalysisRecord = serde_json::from_str(
            r#"{"_id": "65f0", "name": "dup", "ubmY": {"input": {"phevs_ratio": 0.07}}, "powerY": {"AY": 2050}}"#,
        )
        .unwrap_or_default();

        let mut form = AnalysisForm::default();
        let before = form.clone();
        form.apply_analysis(&record);

        assert_eq!(form.name, "dup");
        assert_eq!(form.phevs_ratio, 7.0);
        assert_eq!(form.bevs_ratio, before.bevs_ratio);
        assert_eq!(form.forecast_year, before.forecast_year);
        assert_eq!(form.travel_dist, before.travel_dist);
    }

    #[test]
    fn power_record_reads_text_year_and_null_members() {
        let power: PowerRecord =
            serde_json::from_str(r#"{"AY": " 2031 ", "TDP": null, "CIY": true}"#).unwrap_or_default();
        assert_eq!(power.ay, Some(2031));
        assert_eq!(power.tdp, None);
        assert_eq!(power.ciy, Some(true));

        let power: PowerRecord = serde_json::from_str(r#"{"AY": 70000}"#).unwrap_or_default();
        assert_eq!(power.ay, None);
    }
}
