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
//! Round-trip and determinism properties across all three formats.

use jmxport_collector::{LabelSet, MetricSample, MetricType};
use jmxport_exposition::{parse, serialize, ExpositionFormat};
use proptest::prelude::*;

const FORMATS: [ExpositionFormat; 3] = [
    ExpositionFormat::PrometheusText,
    ExpositionFormat::OpenMetricsText,
    ExpositionFormat::ProtobufDelimited,
];

fn arb_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => any::<f64>().prop_filter("finite", |v| v.is_finite()),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

fn arb_sample() -> impl Strategy<Value = MetricSample> {
    (
        prop::sample::select(vec!["jvm_threads", "jvm_memory_used", "os_load"]),
        prop::collection::vec(("[a-z_][a-z0-9_]{0,6}", "[ -~\n\u{e9}\u{4e2d}]{0,10}"), 0..4),
        arb_value(),
        "[ -~]{0,20}",
        any::<bool>(),
        prop::option::of(0i64..2_000_000_000_000),
    )
        .prop_map(|(name, labels, value, help, gauge, timestamp)| {
            let labels: LabelSet = labels.into_iter().collect();
            let mut sample = MetricSample::new(name, labels, value, help);
            if gauge {
                sample = sample.with_type(MetricType::Gauge);
            }
            if let Some(timestamp) = timestamp {
                sample = sample.with_timestamp(timestamp);
            }
            sample
        })
}

type Triple = (String, Vec<(String, String)>, f64);

fn triples<'a>(samples: impl IntoIterator<Item = &'a MetricSample>) -> Vec<Triple> {
    samples
        .into_iter()
        .map(|s| {
            let labels = s
                .labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (s.name.clone(), labels, s.value)
        })
        .collect()
}

proptest! {
    #[test]
    fn proptest_round_trip_keeps_exposable_triples(samples in prop::collection::vec(arb_sample(), 0..12)) {
        let mut expected: Vec<&MetricSample> = samples.iter().filter(|s| s.exposable).collect();
        expected.sort_by(|a, b| a.name.cmp(&b.name));

        for format in FORMATS {
            let bytes = serialize(&samples, format).unwrap();
            let parsed = parse(&bytes, format).unwrap();
            prop_assert_eq!(triples(&parsed), triples(expected.iter().copied()), "format {}", format);
        }
    }

    #[test]
    fn proptest_serialization_is_deterministic(samples in prop::collection::vec(arb_sample(), 0..12)) {
        for format in FORMATS {
            prop_assert_eq!(serialize(&samples, format).unwrap(), serialize(&samples, format).unwrap());
        }
    }
}

#[test]
fn test_openmetrics_output_ends_with_eof() {
    let samples = vec![MetricSample::new("up", LabelSet::new(), 1.0, "")];
    let bytes = serialize(&samples, ExpositionFormat::OpenMetricsText).unwrap();
    assert!(bytes.ends_with(b"# EOF\n"));
}

#[test]
fn test_type_and_timestamp_survive_every_format() {
    let samples = vec![MetricSample::new("jmx_scrape_error", LabelSet::new(), 0.0, "Non-zero if this scrape failed.")
        .with_type(MetricType::Gauge)
        .with_timestamp(1_700_000_000_123)];
    for format in FORMATS {
        let parsed = parse(&serialize(&samples, format).unwrap(), format).unwrap();
        assert_eq!(parsed[0].metric_type, MetricType::Gauge, "{format}");
        assert_eq!(parsed[0].timestamp_ms, Some(1_700_000_000_123), "{format}");
        assert_eq!(parsed[0].help, "Non-zero if this scrape failed.", "{format}");
    }
}
