//! Zone-level input validation for the power and charging infrastructure module.
//!
//! Each zone of a project shapefile may carry planning inputs (existing
//! charging points, transformer data, zone type). A power analysis can only be
//! requested when every zone carries every input and all of them are valid.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::numeric::parse_number;

/// Raw `properties` object of one GeoJSON zone feature.
pub type ZoneProperties = Map<String, Value>;

/// Property key set on a zone whose present inputs fail validation.
pub const INVALID_MARKER: &str = "invalid";

/// Type and range constraint for a single zone input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Whole number, zero or more.
    NonNegativeInteger,
    /// Any number, zero or more.
    NonNegativeNumber,
    /// String equal to one of the listed values.
    OneOf(&'static [&'static str]),
}

impl FieldRule {
    /// Checks a raw property value against the rule.
    ///
    /// Numeric rules accept JSON numbers and numeric strings, ignoring any
    /// whitespace inside them (`"1 000"`); `null`, booleans and containers
    /// always fail.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Self::NonNegativeInteger => numeric(value).is_some_and(|v| v >= 0.0 && v.fract() == 0.0),
            Self::NonNegativeNumber => numeric(value).is_some_and(|v| v >= 0.0),
            Self::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            parse_number(&compact)
        }
        _ => None,
    }
}

/// Declared zone input: property name, rule and help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneField {
    pub name: &'static str,
    pub rule: FieldRule,
    pub description: &'static str,
}

/// Zone types accepted by the power analysis.
pub const ZONE_TYPES: &[&str] = &["Residential", "Commercial"];

/// Inputs every zone must carry for a power and charging infrastructure analysis.
pub const ZONE_INPUTS_SCHEMA: &[ZoneField] = &[
    ZoneField {
        name: "SCS",
        rule: FieldRule::NonNegativeInteger,
        description: "Number of slow charging points (<7 kW) in the zone.",
    },
    ZoneField {
        name: "FACCS",
        rule: FieldRule::NonNegativeInteger,
        description: "Number of fast AC charging points (7-22 kW) in the zone.",
    },
    ZoneField {
        name: "FCS",
        rule: FieldRule::NonNegativeInteger,
        description: "Number of fast charging points (> 22kW) in the zone.",
    },
    ZoneField {
        name: "ML",
        rule: FieldRule::NonNegativeNumber,
        description: "Maximum loading that occurs at the transformer in %.",
    },
    ZoneField {
        name: "TNP",
        rule: FieldRule::NonNegativeNumber,
        description: "Transformer nominal power in kVA.",
    },
    ZoneField {
        name: "Zone_type",
        rule: FieldRule::OneOf(ZONE_TYPES),
        description: "Type of zone. Can be only \"Residential\" or \"Commercial\".",
    },
];

/// Outcome of validating a zone collection against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneInputsReport {
    /// Number of zones carrying a valid value, per schema field.
    pub inputs_count: BTreeMap<String, usize>,
    /// False as soon as any zone lacks a field or carries an invalid one.
    pub all_inputs_valid: bool,
}

impl ZoneInputsReport {
    /// Valid-zone count for `field`, zero for unknown fields.
    pub fn count(&self, field: &str) -> usize {
        self.inputs_count.get(field).copied().unwrap_or(0)
    }
}

/// Validates every zone against `schema`, marking zones with invalid inputs.
///
/// A missing field only clears `all_inputs_valid`. A present field that fails
/// its rule also sets `"invalid": true` on that zone's properties. Running the
/// validator again over the annotated zones yields the same report.
pub fn validate_zones(schema: &[ZoneField], zones: &mut [ZoneProperties]) -> ZoneInputsReport {
    validate_each(schema, zones.iter_mut())
}

/// Core of [`validate_zones`] over any sequence of mutable property maps.
pub(crate) fn validate_each<'a, I>(schema: &[ZoneField], zones: I) -> ZoneInputsReport
where
    I: IntoIterator<Item = &'a mut ZoneProperties>,
{
    let mut inputs_count: BTreeMap<String, usize> =
        schema.iter().map(|f| (f.name.to_string(), 0)).collect();
    let mut all_inputs_valid = true;
    let mut zone_count = 0_usize;

    for zone in zones {
        zone_count += 1;
        let mut zone_invalid = false;
        for field in schema {
            match zone.get(field.name) {
                Some(value) if field.rule.check(value) => {
                    *inputs_count.entry(field.name.to_string()).or_insert(0) += 1;
                }
                Some(_) => {
                    all_inputs_valid = false;
                    zone_invalid = true;
                }
                None => all_inputs_valid = false,
            }
        }
        if zone_invalid {
            zone.insert(INVALID_MARKER.to_string(), Value::Bool(true));
        }
    }

    tracing::debug!(zones = zone_count, all_inputs_valid, "validated zone inputs");

    ZoneInputsReport {
        inputs_count,
        all_inputs_valid,
    }
}

/// Owned variant of [`validate_zones`]: returns the annotated zones with the report.
pub fn annotate_zones(
    schema: &[ZoneField],
    mut zones: Vec<ZoneProperties>,
) -> (Vec<ZoneProperties>, ZoneInputsReport) {
    let report = validate_zones(schema, &mut zones);
    (zones, report)
}
