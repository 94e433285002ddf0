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
//! Length-delimited protobuf exposition.
//!
//! Each family is one `io.prometheus.client.MetricFamily` message preceded
//! by its varint length. Families are concatenated with no separator.

use jmxport_collector::{LabelSet, MetricSample, MetricType};
use prost::Message;

use crate::error::{FormatError, FormatErrorKind, FormatResult};
use crate::family::group;

/// `io.prometheus.client` messages, restricted to the types jmxport emits.
pub mod proto {
    /// `io.prometheus.client.MetricType`
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MetricType {
        /// Monotonic counter
        Counter = 0,
        /// Gauge
        Gauge = 1,
        /// Summary
        Summary = 2,
        /// Untyped
        Untyped = 3,
        /// Histogram
        Histogram = 4,
    }

    /// `io.prometheus.client.LabelPair`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LabelPair {
        /// Label name
        #[prost(string, optional, tag = "1")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        /// Label value
        #[prost(string, optional, tag = "2")]
        pub value: ::core::option::Option<::prost::alloc::string::String>,
    }

    /// `io.prometheus.client.Gauge`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Gauge {
        /// Current value
        #[prost(double, optional, tag = "1")]
        pub value: ::core::option::Option<f64>,
    }

    /// `io.prometheus.client.Untyped`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Untyped {
        /// Current value
        #[prost(double, optional, tag = "1")]
        pub value: ::core::option::Option<f64>,
    }

    /// `io.prometheus.client.Metric`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Metric {
        /// Labels
        #[prost(message, repeated, tag = "1")]
        pub label: ::prost::alloc::vec::Vec<LabelPair>,
        /// Set for gauge families
        #[prost(message, optional, tag = "2")]
        pub gauge: ::core::option::Option<Gauge>,
        /// Set for untyped families
        #[prost(message, optional, tag = "5")]
        pub untyped: ::core::option::Option<Untyped>,
        /// Milliseconds since the epoch
        #[prost(int64, optional, tag = "6")]
        pub timestamp_ms: ::core::option::Option<i64>,
    }

    /// `io.prometheus.client.MetricFamily`
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MetricFamily {
        /// Metric name
        #[prost(string, optional, tag = "1")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        /// Help text
        #[prost(string, optional, tag = "2")]
        pub help: ::core::option::Option<::prost::alloc::string::String>,
        /// Family type
        #[prost(enumeration = "MetricType", optional, tag = "3")]
        pub r#type: ::core::option::Option<i32>,
        /// Samples
        #[prost(message, repeated, tag = "4")]
        pub metric: ::prost::alloc::vec::Vec<Metric>,
    }
}

/// Encode the exposable samples as delimited `MetricFamily` messages.
pub fn write<'a>(samples: impl IntoIterator<Item = &'a MetricSample>) -> FormatResult<Vec<u8>> {
    let mut out = Vec::new();
    for family in group(samples) {
        let message = proto::MetricFamily {
            name: Some(family.name.to_string()),
            help: Some(family.help.to_string()),
            r#type: Some(proto_type(family.metric_type) as i32),
            metric: family
                .samples
                .iter()
                .map(|sample| to_metric(sample, family.metric_type))
                .collect(),
        };
        let offset = out.len();
        message
            .encode_length_delimited(&mut out)
            .map_err(|e| FormatError::at_offset(FormatErrorKind::Encode(e.to_string()), offset))?;
    }
    Ok(out)
}

fn proto_type(metric_type: MetricType) -> proto::MetricType {
    match metric_type {
        MetricType::Untyped => proto::MetricType::Untyped,
        MetricType::Gauge => proto::MetricType::Gauge,
    }
}

fn to_metric(sample: &MetricSample, metric_type: MetricType) -> proto::Metric {
    let label = sample
        .labels
        .iter()
        .map(|(name, value)| proto::LabelPair {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
        })
        .collect();
    let value = Some(sample.value);
    let (gauge, untyped) = match metric_type {
        MetricType::Gauge => (Some(proto::Gauge { value }), None),
        MetricType::Untyped => (None, Some(proto::Untyped { value })),
    };
    proto::Metric {
        label,
        gauge,
        untyped,
        timestamp_ms: sample.timestamp_ms,
    }
}

/// Decode delimited `MetricFamily` messages until the input is exhausted.
///
/// Errors carry the byte offset of the frame that failed.
pub fn parse(bytes: &[u8]) -> FormatResult<Vec<MetricSample>> {
    let mut samples = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let length = prost::decode_length_delimiter(&bytes[offset..])
            .map_err(|_| FormatError::at_offset(FormatErrorKind::InvalidLength, offset))?;
        let start = offset + prost::length_delimiter_len(length);
        let available = bytes.len() - start;
        if length > available {
            return Err(FormatError::at_offset(
                FormatErrorKind::Truncated {
                    needed: length,
                    available,
                },
                offset,
            ));
        }
        let end = start + length;
        let family = proto::MetricFamily::decode(&bytes[start..end]).map_err(|e| {
            FormatError::at_offset(FormatErrorKind::InvalidMessage(e.to_string()), start)
        })?;
        from_family(family, &mut samples).map_err(|kind| FormatError::at_offset(kind, offset))?;
        offset = end;
    }
    Ok(samples)
}

fn from_family(family: proto::MetricFamily, out: &mut Vec<MetricSample>) -> Result<(), FormatErrorKind> {
    let raw_type = family.r#type.unwrap_or_default();
    let metric_type = match proto::MetricType::try_from(raw_type) {
        Ok(proto::MetricType::Untyped) => MetricType::Untyped,
        Ok(proto::MetricType::Gauge) => MetricType::Gauge,
        Ok(other) => {
            return Err(FormatErrorKind::UnsupportedType(
                format!("{:?}", other).to_uppercase(),
            ))
        }
        Err(_) => return Err(FormatErrorKind::UnsupportedType(raw_type.to_string())),
    };
    let name = family.name.unwrap_or_default();
    let help = family.help.unwrap_or_default();

    for metric in family.metric {
        let value = match metric_type {
            MetricType::Gauge => metric.gauge.and_then(|g| g.value),
            MetricType::Untyped => metric.untyped.and_then(|u| u.value),
        }
        .unwrap_or_default();
        let labels: LabelSet = metric
            .label
            .into_iter()
            .map(|pair| (pair.name.unwrap_or_default(), pair.value.unwrap_or_default()))
            .collect();
        let sample = MetricSample::new(name.clone(), labels, value, help.clone()).with_type(metric_type);
        out.push(match metric.timestamp_ms {
            Some(timestamp) => sample.with_timestamp(timestamp),
            None => sample,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Position;

    fn samples() -> Vec<MetricSample> {
        vec![
            MetricSample::new("b", [("k", "v")].into_iter().collect(), 2.5, "B help"),
            MetricSample::new("a", LabelSet::new(), 1.0, "A help")
                .with_type(MetricType::Gauge)
                .with_timestamp(42),
        ]
    }

    #[test]
    fn test_frames_decode_one_family_each() {
        let bytes = write(&samples()).unwrap();

        let first_len = prost::decode_length_delimiter(bytes.as_slice()).unwrap();
        let header = prost::length_delimiter_len(first_len);
        let first = proto::MetricFamily::decode(&bytes[header..header + first_len]).unwrap();
        assert_eq!(first.name.as_deref(), Some("a"));
        assert_eq!(first.r#type, Some(proto::MetricType::Gauge as i32));
        assert_eq!(first.metric[0].gauge.as_ref().unwrap().value, Some(1.0));
        assert_eq!(first.metric[0].timestamp_ms, Some(42));
    }

    #[test]
    fn test_parse_restores_samples() {
        let parsed = parse(&write(&samples()).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "a");
        assert_eq!(parsed[0].metric_type, MetricType::Gauge);
        assert_eq!(parsed[0].timestamp_ms, Some(42));
        assert_eq!(parsed[1].labels.get("k"), Some("v"));
        assert_eq!(parsed[1].value, 2.5);
        assert_eq!(parsed[1].help, "B help");
    }

    #[test]
    fn test_truncated_frame_reports_offset() {
        let bytes = write(&samples()).unwrap();
        let first_len = prost::decode_length_delimiter(bytes.as_slice()).unwrap();
        let second_frame = prost::length_delimiter_len(first_len) + first_len;

        let err = parse(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err.kind, FormatErrorKind::Truncated { .. }));
        assert_eq!(err.position, Position::Offset(second_frame));
    }

    #[test]
    fn test_invalid_length_prefix() {
        let err = parse(&[0xff; 11]).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidLength);
        assert_eq!(err.position, Position::Offset(0));
    }

    #[test]
    fn test_counter_family_is_rejected() {
        let family = proto::MetricFamily {
            name: Some("c".into()),
            help: None,
            r#type: Some(proto::MetricType::Counter as i32),
            metric: vec![],
        };
        let mut bytes = Vec::new();
        family.encode_length_delimited(&mut bytes).unwrap();
        let err = parse(&bytes).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnsupportedType("COUNTER".into()));
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(parse(&[]).unwrap().is_empty());
        assert!(write(std::iter::empty()).unwrap().is_empty());
    }
}
