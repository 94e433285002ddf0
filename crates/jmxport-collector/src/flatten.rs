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
//! Attribute-tree flattening.
//!
//! [`Flattener::flatten`] walks one attribute of one bean and yields a
//! [`MetricSample`] per scalar leaf. The walk is driven by an explicit stack
//! so it is lazy and its depth is not limited by the call stack. Every stack
//! frame owns its own path and [`LabelSet`], so labels added for one table
//! row never reach a sibling row.
//!
//! Values that cannot be exported (null, arrays, unknown types, malformed
//! table rows) produce no sample; they are logged at `debug` and collected as
//! [`Diagnostic`]s on the iterator.

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::identity::ObjectIdentity;
use crate::model::{CompositeField, CompositeValue, LabelSet, MetricSample, RawValue, TabularValue};
use crate::naming::{build_help, build_name, sanitize};

/// Output name rewriting switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Lowercase metric names
    pub lowercase_output_name: bool,
    /// Lowercase label names
    pub lowercase_output_label_names: bool,
}

/// A skipped value, reported instead of a sample.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("{attribute}: null value")]
    NullValue { attribute: String },

    #[error("{attribute}: arrays unsupported")]
    ArrayUnsupported { attribute: String },

    #[error("{attribute}: unsupported type {type_name}")]
    UnsupportedType { attribute: String, type_name: String },

    #[error("{attribute}: tabular row is a {kind}, not a composite")]
    MalformedTabularRow { attribute: String, kind: String },

    #[error("{attribute}: duplicate series dropped")]
    DuplicateSeries { attribute: String },
}

impl Diagnostic {
    /// Dotted path of the attribute the diagnostic refers to
    pub fn attribute(&self) -> &str {
        match self {
            Diagnostic::NullValue { attribute }
            | Diagnostic::ArrayUnsupported { attribute }
            | Diagnostic::UnsupportedType { attribute, .. }
            | Diagnostic::MalformedTabularRow { attribute, .. }
            | Diagnostic::DuplicateSeries { attribute } => attribute,
        }
    }
}

/// Flattens attribute trees into samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    /// Flattener with the given naming options
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> FlattenOptions {
        self.options
    }

    /// Lazily flatten one attribute of `identity`.
    ///
    /// The first identity value goes into every sample name; the remaining
    /// identity pairs become the leading labels.
    pub fn flatten<'a>(
        &self,
        identity: &'a ObjectIdentity,
        attribute_name: &str,
        attribute_help: &str,
        value: &'a RawValue,
    ) -> Flatten<'a> {
        let labels: LabelSet = identity
            .properties()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let root = Frame {
            path: Vec::new(),
            labels,
            name: attribute_name.to_string(),
            description: attribute_help.to_string(),
            value,
        };
        Flatten {
            identity,
            options: self.options,
            named_labels: identity.properties().len().min(1),
            stack: vec![root],
            diagnostics: Vec::new(),
        }
    }
}

/// One pending value in the walk.
struct Frame<'a> {
    path: Vec<String>,
    labels: LabelSet,
    name: String,
    description: String,
    value: &'a RawValue,
}

impl Frame<'_> {
    fn attribute(&self) -> String {
        let mut dotted = self.path.join(".");
        if !dotted.is_empty() {
            dotted.push('.');
        }
        dotted.push_str(&self.name);
        dotted
    }

    fn extended_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(self.name.clone());
        path
    }
}

/// Iterator returned by [`Flattener::flatten`].
pub struct Flatten<'a> {
    identity: &'a ObjectIdentity,
    options: FlattenOptions,
    /// Leading labels already spent on the metric name
    named_labels: usize,
    stack: Vec<Frame<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Flatten<'a> {
    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the iterator, keeping only its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        debug!(bean = %self.identity, %diagnostic, "Attribute not exported");
        self.diagnostics.push(diagnostic);
    }

    fn sample(&self, frame: &Frame<'a>, value: Option<f64>) -> MetricSample {
        let mut name = build_name(
            self.identity.domain(),
            self.identity.first_value(),
            &frame.path,
            &frame.name,
        );
        if self.options.lowercase_output_name {
            name = name.to_lowercase();
        }
        let labels: LabelSet = frame
            .labels
            .iter()
            .skip(self.named_labels)
            .map(|(k, v)| (self.label_name(k), v))
            .collect();
        let help = build_help(&frame.description, self.identity, &frame.name);
        match value {
            Some(value) => MetricSample::new(name, labels, value, help),
            None => MetricSample::unexposable(name, labels, help),
        }
    }

    fn label_name(&self, raw: &str) -> String {
        let name = sanitize(raw);
        if self.options.lowercase_output_label_names {
            name.to_lowercase()
        } else {
            name
        }
    }

    fn expand_composite(&mut self, frame: &Frame<'a>, composite: &'a CompositeValue) {
        let path = frame.extended_path();
        let description = type_description(composite);
        self.stack.extend(composite.fields.iter().rev().map(|field| Frame {
            path: path.clone(),
            labels: frame.labels.clone(),
            name: field.name.clone(),
            description: description.clone(),
            value: &field.value,
        }));
    }

    fn expand_table(&mut self, frame: &Frame<'a>, table: &'a TabularValue) {
        let extended = frame.extended_path();
        let mut children = Vec::new();

        for row in &table.rows {
            let RawValue::Composite(row) = row else {
                self.diagnose(Diagnostic::MalformedTabularRow {
                    attribute: frame.attribute(),
                    kind: row.kind().to_string(),
                });
                continue;
            };

            let labels = row_labels(&frame.labels, &table.index_names, row);
            let description = type_description(row);

            let mut columns: Vec<&'a CompositeField> = row
                .fields
                .iter()
                .filter(|field| !table.index_names.contains(&field.name))
                .collect();
            columns.sort_by(|a, b| a.name.cmp(&b.name));

            for column in columns {
                // A `value` column stands for the row itself: no extra segment.
                let (path, name) = if column.name.eq_ignore_ascii_case("value") {
                    (frame.path.clone(), frame.name.clone())
                } else {
                    (extended.clone(), column.name.clone())
                };
                children.push(Frame {
                    path,
                    labels: labels.clone(),
                    name,
                    description: description.clone(),
                    value: &column.value,
                });
            }
        }

        self.stack.extend(children.into_iter().rev());
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = MetricSample;

    fn next(&mut self) -> Option<MetricSample> {
        loop {
            let frame = self.stack.pop()?;
            let value: &'a RawValue = frame.value;
            match value {
                RawValue::Null | RawValue::Optional(None) => {
                    self.diagnose(Diagnostic::NullValue {
                        attribute: frame.attribute(),
                    });
                }
                RawValue::Number(_) | RawValue::Boolean(_) | RawValue::Date(_) => {
                    return Some(self.sample(&frame, value.as_f64()));
                }
                RawValue::Text(_) => return Some(self.sample(&frame, None)),
                RawValue::Optional(Some(inner)) => {
                    self.stack.push(Frame {
                        value: inner.as_ref(),
                        ..frame
                    });
                }
                RawValue::Composite(composite) => self.expand_composite(&frame, composite),
                RawValue::Tabular(table) => self.expand_table(&frame, table),
                RawValue::Array(_) => {
                    self.diagnose(Diagnostic::ArrayUnsupported {
                        attribute: frame.attribute(),
                    });
                }
                RawValue::Unknown(type_name) => {
                    self.diagnose(Diagnostic::UnsupportedType {
                        attribute: frame.attribute(),
                        type_name: type_name.clone(),
                    });
                }
            }
        }
    }
}

impl fmt::Debug for Flatten<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flatten")
            .field("identity", &self.identity.to_string())
            .field("pending", &self.stack.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

fn type_description(composite: &CompositeValue) -> String {
    if composite.description.is_empty() {
        composite.type_name.clone()
    } else {
        composite.description.clone()
    }
}

/// Labels for one table row: the enclosing labels plus its index columns.
///
/// An index name already present (nested tables) gets `_` appended until it
/// is unique. A composite index value contributes one `<index>_<field>`
/// label per field.
fn row_labels(enclosing: &LabelSet, index_names: &[String], row: &CompositeValue) -> LabelSet {
    let mut labels = enclosing.clone();
    for index in index_names {
        let Some(key) = row.get(index) else {
            continue;
        };
        if matches!(key, RawValue::Null | RawValue::Optional(None)) {
            continue;
        }
        let mut label = index.clone();
        while labels.contains_key(&label) {
            label.push('_');
        }
        match key {
            RawValue::Composite(key) => {
                for field in &key.fields {
                    if let Some(text) = field.value.label_text() {
                        labels.insert(format!("{}_{}", label, field.name), text);
                    }
                }
            }
            other => {
                if let Some(text) = other.label_text() {
                    labels.insert(label, text);
                }
            }
        }
    }
    labels
}
