// Copyright (C) 2026  jmxport contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Attribute values as delivered by a scrape source, and the flat samples
//! produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One value in a bean's attribute tree.
///
/// The flattener matches on this exhaustively, so a new value kind is a
/// compile-time change rather than a runtime type check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RawValue {
    /// Attribute had no value at scrape time
    Null,
    /// Any numeric attribute, widened to f64
    Number(f64),
    /// Exported as 1 or 0
    Boolean(bool),
    /// Strings and enum constants
    Text(String),
    /// Exported as seconds since the Unix epoch
    Date(DateTime<Utc>),
    /// A value that may be absent
    Optional(Option<Box<RawValue>>),
    /// Named record of sub-values
    Composite(CompositeValue),
    /// Indexed table of composite rows
    Tabular(TabularValue),
    /// Arrays are not exported
    Array(Vec<RawValue>),
    /// Any other type, carried by name for diagnostics only
    Unknown(String),
}

impl RawValue {
    /// Short kind name used in diagnostics
    pub fn kind(&self) -> &str {
        match self {
            RawValue::Null => "null",
            RawValue::Number(_) => "number",
            RawValue::Boolean(_) => "boolean",
            RawValue::Text(_) => "text",
            RawValue::Date(_) => "date",
            RawValue::Optional(_) => "optional",
            RawValue::Composite(_) => "composite",
            RawValue::Tabular(_) => "tabular",
            RawValue::Array(_) => "array",
            RawValue::Unknown(type_name) => type_name,
        }
    }

    /// Numeric reading of a scalar leaf, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            RawValue::Date(d) => Some(d.timestamp_millis() as f64 / 1000.0),
            _ => None,
        }
    }

    /// Text used when this value fills a label (tabular index columns)
    pub fn label_text(&self) -> Option<String> {
        match self {
            RawValue::Null | RawValue::Optional(None) => None,
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Boolean(b) => Some(b.to_string()),
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Date(d) => Some(d.to_rfc3339()),
            RawValue::Optional(Some(inner)) => inner.label_text(),
            RawValue::Composite(_) | RawValue::Tabular(_) | RawValue::Array(_) => None,
            RawValue::Unknown(type_name) => Some(type_name.clone()),
        }
    }
}

/// A composite record: fields in declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeValue {
    /// Name of the composite type
    #[serde(default)]
    pub type_name: String,
    /// Type description; becomes the help text of every field
    #[serde(default)]
    pub description: String,
    /// Fields in the order the type declares them
    pub fields: Vec<CompositeField>,
}

impl CompositeValue {
    /// Composite with no description
    pub fn new(type_name: impl Into<String>, fields: Vec<CompositeField>) -> Self {
        Self {
            type_name: type_name.into(),
            description: String::new(),
            fields,
        }
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// One named field of a [`CompositeValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeField {
    /// Field name
    pub name: String,
    /// Declared type of the field
    #[serde(default)]
    pub type_name: String,
    /// Field value
    pub value: RawValue,
}

impl CompositeField {
    /// Field with an empty type name
    pub fn new(name: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            type_name: String::new(),
            value,
        }
    }
}

/// A table whose rows are composites keyed by one or more index columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularValue {
    /// Columns that identify a row; these become labels
    pub index_names: Vec<String>,
    /// Rows in table order. Non-composite rows are skipped.
    pub rows: Vec<RawValue>,
}

/// Ordered label-name to label-value mapping.
///
/// Inserting an existing name replaces its value in place, so names stay
/// unique and keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSet {
    entries: Vec<(String, String)>,
}

impl LabelSet {
    /// Empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a label, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Value of a label
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a label with this name exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no labels
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Family type reported alongside a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetricType {
    /// Type unknown; the flattener's default
    #[default]
    Untyped,
    /// Value that can go up and down
    Gauge,
}

/// One flattened observation ready for exposition.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Sanitised metric name
    pub name: String,
    /// Labels in emission order
    pub labels: LabelSet,
    /// Sample value; NaN for text leaves
    pub value: f64,
    /// Help text of the metric family
    pub help: String,
    /// False for leaves that must not reach the wire
    pub exposable: bool,
    /// Family type
    pub metric_type: MetricType,
    /// Optional sample timestamp in milliseconds
    pub timestamp_ms: Option<i64>,
}

impl MetricSample {
    /// Untyped sample, exposable iff `value` is finite
    pub fn new(name: impl Into<String>, labels: LabelSet, value: f64, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels,
            value,
            help: help.into(),
            exposable: value.is_finite(),
            metric_type: MetricType::Untyped,
            timestamp_ms: None,
        }
    }

    /// Recorded-but-hidden sample for a non-numeric leaf
    pub fn unexposable(name: impl Into<String>, labels: LabelSet, help: impl Into<String>) -> Self {
        Self {
            exposable: false,
            ..Self::new(name, labels, f64::NAN, help)
        }
    }

    /// Set the family type
    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Set the sample timestamp
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_label_set_overwrites_in_place() {
        let mut labels = LabelSet::new();
        labels.insert("name", "a");
        labels.insert("source", "/dev/sda1");
        assert_eq!(labels.insert("name", "b"), Some("a".to_string()));

        let collected: Vec<_> = labels.iter().collect();
        assert_eq!(collected, vec![("name", "b"), ("source", "/dev/sda1")]);
    }

    #[test]
    fn test_scalar_readings() {
        assert_eq!(RawValue::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(RawValue::Boolean(false).as_f64(), Some(0.0));
        let date = DateTime::from_timestamp_millis(1_500).unwrap();
        assert_eq!(RawValue::Date(date).as_f64(), Some(1.5));
        assert_eq!(RawValue::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn test_non_finite_sample_not_exposable() {
        assert!(MetricSample::new("a", LabelSet::new(), 1.0, "").exposable);
        assert!(!MetricSample::new("a", LabelSet::new(), f64::INFINITY, "").exposable);
        assert!(!MetricSample::new("a", LabelSet::new(), f64::NAN, "").exposable);
        assert!(!MetricSample::unexposable("a", LabelSet::new(), "").exposable);
    }

    #[test]
    fn test_raw_value_json_shape() {
        let json = r#"{"type":"composite","value":{"type_name":"Usage","fields":[
            {"name":"used","value":{"type":"number","value":42.0}},
            {"name":"state","value":{"type":"text","value":"RUNNABLE"}},
            {"name":"missing","value":{"type":"null"}}]}}"#;
        let value: RawValue = serde_json::from_str(json).unwrap();
        let RawValue::Composite(composite) = value else {
            panic!("expected composite");
        };
        assert_eq!(composite.get("used"), Some(&RawValue::Number(42.0)));
        assert_eq!(composite.get("missing"), Some(&RawValue::Null));
    }
}
