//! Conversion between the editable and the wire representation of a distribution.
//!
//! The analysis form edits distributions (e.g. daily travelled distance) as
//! rows of `{key, value}` percentage strings. The backend expects an object
//! mapping each bucket label, written with a decimal comma, to a fractional
//! weight rounded to four decimals.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::numeric::{parse_number, round_to};

/// Number of decimals kept in dictionary weights and in the validity check.
pub const ROUND_DEC: i32 = 4;

/// One editable row of a distribution, as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    /// Bucket label (e.g. `"2.5"` km).
    pub key: String,
    /// Percentage share with two decimals (e.g. `"8.12"`).
    pub value: String,
}

impl DistributionEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Canonical distribution: bucket label to fractional weight.
///
/// Entries are always kept in ascending numeric order of their label, which is
/// also the order they serialize in. Labels use a decimal comma (`"2,5"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionDict {
    entries: Vec<(String, f64)>,
}

impl DistributionDict {
    /// Builds a dictionary from `(label, weight)` pairs.
    ///
    /// Pairs are sorted by the numeric value of their label; a repeated label
    /// keeps the last weight given for it.
    pub fn from_weights<K, I>(weights: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut entries: Vec<(String, f64)> = Vec::new();
        for (key, weight) in weights {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = weight,
                None => entries.push((key, weight)),
            }
        }
        entries.sort_by(|(a, _), (b, _)| compare_labels(a, b));
        Self { entries }
    }

    /// Returns the weight stored for `key`, if any.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights, unrounded.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

/// Numeric value of a label written with either decimal separator.
fn label_value(label: &str) -> Option<f64> {
    parse_number(&label.replacen(',', ".", 1))
}

/// Numeric labels first in ascending order, then anything else by text.
fn compare_labels(a: &str, b: &str) -> Ordering {
    match (label_value(a), label_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

impl Serialize for DistributionDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, weight) in &self.entries {
            map.serialize_entry(key, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DistributionDict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DictVisitor;

        impl<'de> Visitor<'de> for DictVisitor {
            type Value = DistributionDict;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping bucket labels to numeric weights")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, weight)) = access.next_entry::<String, f64>()? {
                    pairs.push((key, weight));
                }
                Ok(DistributionDict::from_weights(pairs))
            }
        }

        deserializer.deserialize_map(DictVisitor)
    }
}

/// Converts editable rows into the canonical dictionary.
///
/// Rows whose key or value is not a number are dropped without error; use
/// [`is_valid`] on the result to check the distribution as a whole.
///
/// # Examples
///
/// ```
/// use ev_dss::distribution::{DistributionEntry, to_dictionary};
///
/// let dict = to_dictionary(&[
///     DistributionEntry::new("2.5", "5.45"),
///     DistributionEntry::new("1", "8.12345"),
/// ]);
/// assert_eq!(dict.get("1"), Some(0.0812));
/// assert_eq!(dict.get("2,5"), Some(0.0545));
/// ```
pub fn to_dictionary(distribution: &[DistributionEntry]) -> DistributionDict {
    let mut unordered: BTreeMap<&str, f64> = BTreeMap::new();
    for entry in distribution {
        let (Some(_), Some(value)) = (parse_number(&entry.key), parse_number(&entry.value)) else {
            continue;
        };
        unordered.insert(entry.key.as_str(), round_to(value / 100.0, ROUND_DEC));
    }
    DistributionDict::from_weights(
        unordered
            .into_iter()
            .map(|(key, weight)| (key.replacen('.', ",", 1), weight)),
    )
}

/// Whether every weight is a number and the weights sum to 1 at four decimals.
pub fn is_valid(distribution: &DistributionDict) -> bool {
    if distribution.iter().any(|(_, w)| !w.is_finite()) {
        return false;
    }
    round_to(distribution.total(), ROUND_DEC) == 1.0
}

/// Same check as [`is_valid`] over an untyped wire object.
///
/// Fails for anything that is not an object or that holds a non-number member.
pub fn is_valid_json(distribution: &serde_json::Value) -> bool {
    let Some(members) = distribution.as_object() else {
        return false;
    };
    let mut weights = Vec::with_capacity(members.len());
    for (key, value) in members {
        match value.as_f64() {
            Some(w) => weights.push((key.clone(), w)),
            None => return false,
        }
    }
    is_valid(&DistributionDict::from_weights(weights))
}

/// Converts the canonical dictionary back into editable rows.
///
/// Rows follow ascending numeric label order. Values are percentages with two
/// decimals and labels use a decimal point again.
pub fn to_array(distribution: &DistributionDict) -> Vec<DistributionEntry> {
    distribution
        .iter()
        .map(|(key, weight)| DistributionEntry {
            key: key.replacen(',', ".", 1),
            value: format!("{:.2}", round_to(weight * 100.0, 2)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(rows: &[(&str, &str)]) -> Vec<DistributionEntry> {
        rows.iter()
            .map(|(k, v)| DistributionEntry::new(*k, *v))
            .collect()
    }

    #[test]
    fn to_dictionary_rounds_and_scales() {
        let dict = to_dictionary(&entries(&[("1", "8.12"), ("2", "5.45"), ("3", "86.43")]));
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get("1"), Some(0.0812));
        assert_eq!(dict.get("2"), Some(0.0545));
        assert_eq!(dict.get("3"), Some(0.8643));
        assert!(is_valid(&dict));
    }

    #[test]
    fn to_dictionary_sorts_numerically_and_uses_decimal_comma() {
        let dict = to_dictionary(&entries(&[("10", "50"), ("2.5", "30"), ("1", "20")]));
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["1", "2,5", "10"]);
    }

    #[test]
    fn to_dictionary_drops_non_numeric_rows() {
        let dict = to_dictionary(&entries(&[("1", "50"), ("abc", "25"), ("3", ""), ("4", "x")]));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("1"), Some(0.5));
        assert!(!is_valid(&dict));
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let dict = to_dictionary(&entries(&[("1", "40"), ("1", "100")]));
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("1"), Some(1.0));
    }

    #[test]
    fn validity_requires_exact_sum() {
        let short = DistributionDict::from_weights([("1", 0.1), ("2", 0.25)]);
        assert!(!is_valid(&short));

        let exact = DistributionDict::from_weights([("1", 0.15), ("2", 0.25), ("10", 0.6)]);
        assert!(is_valid(&exact));

        let drifted = DistributionDict::from_weights([("1", 0.5), ("2", 0.50006)]);
        assert!(!is_valid(&drifted));
    }

    #[test]
    fn validity_rejects_non_finite_weights() {
        let dict = DistributionDict::from_weights([("1", f64::NAN), ("2", 1.0)]);
        assert!(!is_valid(&dict));
    }

    #[test]
    fn is_valid_json_rejects_non_numbers() {
        let ok = serde_json::json!({"1": 0.5, "2": 0.5});
        assert!(is_valid_json(&ok));

        let text = serde_json::json!({"1": "0.5", "2": 0.5});
        assert!(!is_valid_json(&text));

        assert!(!is_valid_json(&serde_json::json!([0.5, 0.5])));
    }

    #[test]
    fn to_array_formats_two_decimals_in_key_order() {
        let dict = DistributionDict::from_weights([("10", 0.6), ("1", 0.15), ("2", 0.25)]);
        let rows = to_array(&dict);
        assert_eq!(
            rows,
            entries(&[("1", "15.00"), ("2", "25.00"), ("10", "60.00")])
        );
    }

    #[test]
    fn to_array_restores_decimal_point() {
        let dict = DistributionDict::from_weights([("2,5", 1.0)]);
        assert_eq!(to_array(&dict), entries(&[("2.5", "100.00")]));
    }

    #[test]
    fn to_array_rounds_ties_up() {
        let dict = DistributionDict::from_weights([("1", 0.00125)]);
        assert_eq!(to_array(&dict), entries(&[("1", "0.13")]));
    }

    #[test]
    fn serializes_in_ascending_key_order() {
        let dict = DistributionDict::from_weights([("10", 0.6), ("2", 0.25), ("1", 0.15)]);
        let json = serde_json::to_string(&dict).unwrap_or_default();
        assert_eq!(json, r#"{"1":0.15,"2":0.25,"10":0.6}"#);
    }

    #[test]
    fn deserializes_and_sorts() {
        let dict: DistributionDict =
            serde_json::from_str(r#"{"10": 0.6, "2,5": 0.25, "1": 0.15}"#).unwrap_or_default();
        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["1", "2,5", "10"]);
    }
}
