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
//! Grouping of samples into metric families.

use jmxport_collector::{MetricSample, MetricType};
use std::collections::BTreeMap;

/// Exposable samples sharing one name.
#[derive(Debug, Clone, PartialEq)]
pub struct Family<'a> {
    /// Metric name
    pub name: &'a str,
    /// Help text of the first sample
    pub help: &'a str,
    /// Type of the first sample
    pub metric_type: MetricType,
    /// Samples in input order
    pub samples: Vec<&'a MetricSample>,
}

/// Group the exposable samples by name, sorted by name.
///
/// Within a family the input order is kept, so the same input always
/// serializes to the same bytes. Help and type come from the first sample
/// of each family.
pub fn group<'a>(samples: impl IntoIterator<Item = &'a MetricSample>) -> Vec<Family<'a>> {
    let mut families: BTreeMap<&'a str, Family<'a>> = BTreeMap::new();
    for sample in samples.into_iter().filter(|s| s.exposable) {
        families
            .entry(sample.name.as_str())
            .or_insert_with(|| Family {
                name: &sample.name,
                help: &sample.help,
                metric_type: sample.metric_type,
                samples: Vec::new(),
            })
            .samples
            .push(sample);
    }
    families.into_values().collect()
}
