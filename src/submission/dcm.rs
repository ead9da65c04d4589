//! Requests to and replies from the discrete-choice model (DCM) helpers.
//!
//! The form can ask the backend to estimate vehicle adoption ratios and
//! charging point utilisation from behavioural parameters; the replies are
//! written back into the form as percentages.

use serde::{Deserialize, Serialize};

use super::form::AnalysisForm;
use crate::numeric::round_to;

/// Body of the vehicle adoption (ratio) estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmRatioRequest {
    pub total_urban_trips: Vec<f64>,
    pub total_outgoing_trips: Vec<f64>,
    pub average_number_trips: Vec<f64>,
    pub forecast_year: u16,
    pub vehicle_imm_t0: f64,
    pub bev_vehicle_t0: f64,
    pub phev_vehicle_t0: f64,
    /// ICE price in units of 10 000 EUR.
    pub price_ice: f64,
    /// ICE range in units of 100 km.
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
}

impl DcmRatioRequest {
    pub fn from_form(form: &AnalysisForm) -> Self {
        Self {
            total_urban_trips: vec![form.total_urban_trips],
            total_outgoing_trips: vec![form.total_outgoing_trips],
            average_number_trips: vec![form.average_number_trips],
            forecast_year: form.forecast_year,
            vehicle_imm_t0: form.vehicle_imm_t0,
            bev_vehicle_t0: form.bev_vehicle_t0,
            phev_vehicle_t0: form.phev_vehicle_t0,
            price_ice: form.price_ice / 10_000.0,
            range_ice: form.range_ice / 100.0,
            diffusion: form.diffusion,
            coef_price_bev: form.coef_price_bev,
            coef_price_phev: form.coef_price_phev,
            coef_range_bev: form.coef_range_bev,
            coef_range_phev: form.coef_range_phev,
            cost_bev: form.cost_bev,
            cost_phev: form.cost_phev,
            purchase_incentives_bev: form.purchase_incentives_bev,
            purchase_incentives_phev: form.purchase_incentives_phev,
            utilization_incentives_bev: form.utilization_incentives_bev,
            utilization_incentives_phev: form.utilization_incentives_phev,
        }
    }
}

/// Body of the charging utilisation estimate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmChargingRequest {
    pub charging_price: f64,
    pub waiting_time: f64,
    pub charging_time: f64,
    /// Renewable share of the grid (0-1).
    pub renewable_energy: f64,
}

impl DcmChargingRequest {
    pub fn from_form(form: &AnalysisForm) -> Self {
        Self {
            charging_price: form.charging_price,
            waiting_time: form.waiting_time,
            charging_time: form.charging_time,
            renewable_energy: form.renewable_energy / 100.0,
        }
    }
}

/// Adoption estimate, as fractions of the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmRatioOutput {
    pub bev: f64,
    pub phevs: f64,
}

/// Utilisation estimate, as fractions of charging events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmChargingOutput {
    pub night_ratio: DcmNightRatio,
    pub day_ratio: DcmDayRatio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmNightRatio {
    pub home_public: f64,
    pub home_private: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcmDayRatio {
    pub work_public: f64,
    pub work_private: f64,
    pub other_public: f64,
    #[serde(default)]
    pub other_semi_public: f64,
    #[serde(default)]
    pub fast: f64,
}

impl AnalysisForm {
    /// Writes an adoption estimate as percentages with one decimal.
    pub fn apply_dcm_ratio(&mut self, output: &DcmRatioOutput) {
        self.bevs_ratio = round_to(output.bev * 100.0, 1);
        self.phevs_ratio = round_to(output.phevs * 100.0, 1);
    }

    /// Writes a utilisation estimate as whole percentages.
    ///
    /// `other_semi_public` and `fast` have no form field and are not written.
    pub fn apply_dcm_charging(&mut self, output: &DcmChargingOutput) {
        self.home_public = round_to(output.night_ratio.home_public * 100.0, 0);
        self.home_private = round_to(output.night_ratio.home_private * 100.0, 0);
        self.work_public = round_to(output.day_ratio.work_public * 100.0, 0);
        self.work_private = round_to(output.day_ratio.work_private * 100.0, 0);
        self.other_public = round_to(output.day_ratio.other_public * 100.0, 0);
    }
}
