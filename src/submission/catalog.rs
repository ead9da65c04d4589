//! Reference catalogue of charging-point hardware sent with power analyses.

use serde::{Deserialize, Serialize};

/// One charging-point hardware model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingPointModel {
    pub manufacturer: String,
    /// Maximum output power (kW).
    pub max_output_power: f64,
    /// Installation cost (EUR).
    pub installation_cost: f64,
    /// Maintenance cost (EUR).
    pub maintenance_cost: f64,
    pub authorization: String,
    #[serde(rename = "EV_communication")]
    pub ev_communication: String,
}

const IEC_BOTH: &str = "IEC 61851 & IEC15118";
const IEC_61851: &str = "IEC 61851";

/// `(manufacturer, kW, installation, maintenance, authorization, protocol)`.
const MODELS: [(&str, f64, f64, f64, &str, &str); 10] = [
    ("Etrel 1", 22.0, 1000.0, 3000.0, "PIN code", IEC_BOTH),
    ("Etrel 2", 11.0, 500.0, 2000.0, "PIN code, RFID", IEC_BOTH),
    ("Efacec 1", 3.7, 300.0, 1500.0, "RFID", IEC_61851),
    ("Efacec 2", 12.0, 500.0, 1500.0, "RFID", IEC_61851),
    ("Mitja 1", 25.0, 3000.0, 5000.0, "PIN code", IEC_BOTH),
    ("Mitja 2", 30.0, 2000.0, 6000.0, "PIN code, RFID", IEC_BOTH),
    ("Klemen 1", 4.0, 150.0, 800.0, "RFID", IEC_61851),
    ("Klemen 2", 5.0, 200.0, 900.0, "RFID", IEC_61851),
    ("Janja 1", 12.0, 400.0, 800.0, "RFID", IEC_61851),
    ("Janja 2", 5.0, 200.0, 900.0, "RFID", IEC_61851),
];

/// The fixed `CI_database` catalogue, in submission order.
pub fn charging_point_catalog() -> Vec<ChargingPointModel> {
    MODELS
        .iter()
        .map(
            |&(manufacturer, power, installation, maintenance, authorization, protocol)| {
                ChargingPointModel {
                    manufacturer: manufacturer.to_string(),
                    max_output_power: power,
                    installation_cost: installation,
                    maintenance_cost: maintenance,
                    authorization: authorization.to_string(),
                    ev_communication: protocol.to_string(),
                }
            },
        )
        .collect()
}
