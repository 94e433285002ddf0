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
//! Flattening scenarios against realistic bean shapes.

use jmxport_collector::{
    Attribute, Bean, CompositeField, CompositeValue, Diagnostic, Flattener, ObjectIdentity,
    RawValue, Scraper, StaticSource, TabularValue,
};
use std::sync::Arc;

fn disk_usage_row(source: &str, size: f64) -> RawValue {
    RawValue::Composite(CompositeValue::new(
        "Disk Usage Row",
        vec![
            CompositeField::new("source", RawValue::Text(source.to_string())),
            CompositeField::new("size", RawValue::Number(size)),
        ],
    ))
}

fn disk_usage_table() -> RawValue {
    RawValue::Tabular(TabularValue {
        index_names: vec!["source".to_string()],
        rows: vec![
            disk_usage_row("/dev/sda1", 7516192768.0),
            disk_usage_row("/dev/sda2", 15032385536.0),
        ],
    })
}

#[test]
fn test_tabular_disk_usage() {
    let identity = ObjectIdentity::parse("io.prometheus.jmx:type=tabularData").unwrap();
    let table = disk_usage_table();
    let samples: Vec<_> = Flattener::default()
        .flatten(&identity, "Server_1_Disk_Usage_Table", "Disk Usage Table", &table)
        .collect();

    assert_eq!(samples.len(), 2);
    for sample in &samples {
        assert_eq!(
            sample.name,
            "io_prometheus_jmx_tabularData_Server_1_Disk_Usage_Table_size"
        );
        assert_eq!(sample.labels.len(), 1);
        assert!(sample.exposable);
    }
    assert_eq!(samples[0].labels.get("source"), Some("/dev/sda1"));
    assert_eq!(samples[0].value, 7516192768.0);
    assert_eq!(samples[1].labels.get("source"), Some("/dev/sda2"));
    assert_eq!(samples[1].value, 15032385536.0);
}

#[test]
fn test_null_attribute_yields_one_diagnostic() {
    let identity = ObjectIdentity::parse("java.lang:type=Runtime").unwrap();
    let value = RawValue::Null;
    let mut walk = Flattener::default().flatten(&identity, "BootClassPath", "", &value);

    assert_eq!(walk.by_ref().count(), 0);
    assert_eq!(
        walk.into_diagnostics(),
        vec![Diagnostic::NullValue {
            attribute: "BootClassPath".to_string()
        }]
    );
}

#[test]
fn test_array_attribute_yields_one_diagnostic() {
    let identity = ObjectIdentity::parse("java.lang:type=Runtime").unwrap();
    let value = RawValue::Array(vec![RawValue::Text("-Xmx1g".to_string())]);
    let mut walk = Flattener::default().flatten(&identity, "InputArguments", "", &value);

    assert_eq!(walk.by_ref().count(), 0);
    assert_eq!(
        walk.into_diagnostics(),
        vec![Diagnostic::ArrayUnsupported {
            attribute: "InputArguments".to_string()
        }]
    );
}

#[test]
fn test_bad_attribute_does_not_hide_the_rest() {
    let identity = Arc::new(
        ObjectIdentity::parse("java.lang:type=GarbageCollector,name=G1 Young Generation").unwrap(),
    );
    let last_gc = RawValue::Composite(CompositeValue::new(
        "GcInfo",
        vec![
            CompositeField::new("duration", RawValue::Number(4.0)),
            CompositeField::new("memoryUsageBeforeGc", RawValue::Unknown("TabularData[]".into())),
            CompositeField::new("id", RawValue::Number(87.0)),
        ],
    ));
    let source = StaticSource::new(vec![Bean {
        identity,
        attributes: vec![
            Attribute::new("CollectionCount", "", RawValue::Number(87.0)),
            Attribute::new("MemoryPoolNames", "", RawValue::Array(vec![])),
            Attribute::new("LastGcInfo", "", last_gc),
        ],
    }]);

    let report = Scraper::default().scrape(&source).unwrap();
    let names: Vec<_> = report
        .samples
        .iter()
        .filter(|s| s.name.starts_with("java_lang"))
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "java_lang_GarbageCollector_CollectionCount",
            "java_lang_GarbageCollector_LastGcInfo_duration",
            "java_lang_GarbageCollector_LastGcInfo_id",
        ]
    );
    assert!(report
        .samples
        .iter()
        .filter(|s| s.name.starts_with("java_lang"))
        .all(|s| s.labels.get("name") == Some("G1 Young Generation")));
    assert_eq!(report.diagnostics.len(), 2);
    assert_eq!(report.diagnostics[1].attribute(), "LastGcInfo.memoryUsageBeforeGc");
}
