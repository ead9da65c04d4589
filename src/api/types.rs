//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::choropleth::Theme;
use crate::distribution::DistributionDict;
use crate::geo::FeatureCollection;
use crate::submission::FormError;
use crate::zones::ZoneInputsReport;

/// Wire dictionary built from form rows, with its validity.
#[derive(Debug, Serialize)]
pub struct DictionaryResponse {
    pub distribution: DistributionDict,
    /// Whether the weights sum to one.
    pub valid: bool,
}

/// Validation report plus the annotated collection.
#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    #[serde(flatten)]
    pub report: ZoneInputsReport,
    /// Input collection with `"invalid": true` on zones carrying a bad value.
    #[serde(flatten)]
    pub collection: FeatureCollection,
}

/// Query parameters of `/analyses/payload`.
#[derive(Debug, Deserialize)]
pub struct PayloadQuery {
    /// Whether the project supports power analyses (default: true).
    pub power: Option<bool>,
}

/// Query parameters of `/legend`.
#[derive(Debug, Deserialize)]
pub struct LegendQuery {
    /// Largest value shown on the map.
    pub max: f64,
    #[serde(default)]
    pub theme: Theme,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Field-level violations, when the request was a form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: Vec::new(),
        }
    }
}
