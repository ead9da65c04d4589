//! Minimal GeoJSON model for project zone shapefiles.
//!
//! Only what the planning layer reads is typed (`properties`, geometry
//! `bbox`); everything else is carried through untouched so an annotated
//! collection serializes back to the same document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::zones::{ZoneField, ZoneInputsReport, ZoneProperties, validate_each};

/// A GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_kind")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: ZoneProperties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feature geometry; coordinates are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[min_lon, min_lat, max_lon, max_lat]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn collection_kind() -> String {
    "FeatureCollection".to_string()
}

fn feature_kind() -> String {
    "Feature".to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ZoneProperties, D::Error> {
    Ok(Option::<ZoneProperties>::deserialize(deserializer)?.unwrap_or_default())
}

impl Geometry {
    /// Declared `bbox`, or one computed from the coordinates.
    pub fn bounding_box(&self) -> Option<[f64; 4]> {
        self.bbox.or_else(|| {
            let mut acc: Option<[f64; 4]> = None;
            extend_bbox(&self.coordinates, &mut acc);
            acc
        })
    }
}

/// Walks nested coordinate arrays, widening `acc` with every `[lon, lat, ..]` position.
fn extend_bbox(coords: &Value, acc: &mut Option<[f64; 4]>) {
    let Some(items) = coords.as_array() else {
        return;
    };
    if let (Some(lon), Some(lat)) = (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        *acc = Some(match *acc {
            Some([x0, y0, x1, y1]) => [x0.min(lon), y0.min(lat), x1.max(lon), y1.max(lat)],
            None => [lon, lat, lon, lat],
        });
        return;
    }
    for item in items {
        extend_bbox(item, acc);
    }
}

/// Map extent as two `[lat, lon]` corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: [f64; 2],
    pub north_east: [f64; 2],
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.south_west, self.north_east].serialize(serializer)
    }
}

impl FeatureCollection {
    /// Parses a GeoJSON document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a feature collection.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Validates the zone inputs of every feature, marking invalid zones in place.
    pub fn validate_inputs(&mut self, schema: &[ZoneField]) -> ZoneInputsReport {
        validate_each(schema, self.features.iter_mut().map(|f| &mut f.properties))
    }

    /// Extent covering every feature that has a bounding box.
    pub fn area_bounds(&self) -> Option<Bounds> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.as_ref().and_then(Geometry::bounding_box))
            .map(|[min_lon, min_lat, max_lon, max_lat]| Bounds {
                south_west: [min_lat, min_lon],
                north_east: [max_lat, max_lon],
            })
            .reduce(|acc, b| Bounds {
                south_west: [
                    acc.south_west[0].min(b.south_west[0]),
                    acc.south_west[1].min(b.south_west[1]),
                ],
                north_east: [
                    acc.north_east[0].max(b.north_east[0]),
                    acc.north_east[1].max(b.north_east[1]),
                ],
            })
    }

    /// Center of [`Self::area_bounds`] as `[lat, lon]`.
    pub fn center(&self) -> Option<[f64; 2]> {
        self.area_bounds().map(|b| {
            [
                (b.south_west[0] + b.north_east[0]) / 2.0,
                (b.south_west[1] + b.north_east[1]) / 2.0,
            ]
        })
    }
}
