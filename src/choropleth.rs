//! Colour banding for result choropleth maps.

use serde::{Deserialize, Serialize};

use crate::numeric::round_to;

/// Six-step red scale, lightest first.
pub const PALETTE: [&str; 6] = [
    "#fee5d9", "#fcbba1", "#fc9272", "#fb6a4a", "#de2d26", "#a50f15",
];

/// Lower thresholds (exclusive) of bands 1 to 5 on the normalised scale.
pub const THRESHOLDS: [f64; 5] = [0.17, 0.33, 0.5, 0.67, 0.83];

/// Display theme of the hosting page. Passed in explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Colour used for legend text on this theme.
    pub fn text_color(self) -> &'static str {
        match self {
            Self::Light => "#4b5563",
            Self::Dark => "#e5e7eb",
        }
    }
}

/// Index into [`PALETTE`] for a value normalised to `[0, 1]`.
pub fn band(normalised: f64) -> usize {
    THRESHOLDS.iter().filter(|&&t| normalised > t).count()
}

/// Fill colour of an area whose value is `normalised` of the map maximum.
pub fn area_color(normalised: f64) -> &'static str {
    PALETTE[band(normalised)]
}

/// Divides every value by the largest one.
///
/// Returns the normalised values with that maximum. A non-positive maximum
/// leaves every value at zero.
pub fn normalise(values: &[f64]) -> (Vec<f64>, f64) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_nan() || max <= 0.0 {
        return (vec![0.0; values.len()], max.max(0.0));
    }
    (values.iter().map(|v| v / max).collect(), max)
}

/// One line of the map legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendRow {
    pub color: &'static str,
    pub min: f64,
    pub max: f64,
    pub text_color: &'static str,
}

impl LegendRow {
    pub fn label(&self) -> String {
        format!("{} - {}", self.min, self.max)
    }
}

/// Legend for a map whose largest value is `max_value`, bounds rounded to two decimals.
pub fn legend(max_value: f64, theme: Theme) -> Vec<LegendRow> {
    let mut edges = Vec::with_capacity(PALETTE.len() + 1);
    edges.push(0.0);
    edges.extend(THRESHOLDS.iter().map(|t| round_to(t * max_value, 2)));
    edges.push(round_to(max_value, 2));

    PALETTE
        .iter()
        .zip(edges.windows(2))
        .map(|(&color, w)| LegendRow {
            color,
            min: w[0],
            max: w[1],
            text_color: theme.text_color(),
        })
        .collect()
}
