//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;

use ev_dss::distribution::DistributionEntry;
use ev_dss::submission::AnalysisForm;
use ev_dss::zones::ZoneProperties;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Contents of a fixture file.
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should be readable")
}

/// Form rows from `(key, value)` pairs.
pub fn rows(pairs: &[(&str, &str)]) -> Vec<DistributionEntry> {
    pairs
        .iter()
        .map(|(k, v)| DistributionEntry::new(*k, *v))
        .collect()
}

/// Property map from a JSON object literal.
pub fn zone(value: Value) -> ZoneProperties {
    match value {
        Value::Object(map) => map,
        other => panic!("zone fixture must be an object, got {other}"),
    }
}

/// Baseline form with a name, valid as is.
pub fn named_form(name: &str) -> AnalysisForm {
    AnalysisForm {
        name: name.to_string(),
        ..AnalysisForm::default()
    }
}
