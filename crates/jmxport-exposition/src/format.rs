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
//! Exposition formats and content negotiation.

use std::fmt;

/// Content type of the Prometheus text format
pub const PROMETHEUS_TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
/// Content type of the OpenMetrics text format
pub const OPENMETRICS_TEXT_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";
/// Content type of the delimited protobuf format
pub const PROTOBUF_CONTENT_TYPE: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=delimited";

/// Wire format of a metrics response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpositionFormat {
    /// Prometheus text format 0.0.4
    #[default]
    PrometheusText,
    /// OpenMetrics text format 1.0.0
    OpenMetricsText,
    /// Length-delimited `io.prometheus.client.MetricFamily` messages
    ProtobufDelimited,
}

impl ExpositionFormat {
    /// Value for the `Content-Type` response header
    pub fn content_type(self) -> &'static str {
        match self {
            ExpositionFormat::PrometheusText => PROMETHEUS_TEXT_CONTENT_TYPE,
            ExpositionFormat::OpenMetricsText => OPENMETRICS_TEXT_CONTENT_TYPE,
            ExpositionFormat::ProtobufDelimited => PROTOBUF_CONTENT_TYPE,
        }
    }

    /// Pick a format from an `Accept` header.
    ///
    /// Media ranges are tried in the order given; the first protobuf or
    /// OpenMetrics range wins. Anything else, including no header at all,
    /// gets Prometheus text.
    pub fn from_accept(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ExpositionFormat::PrometheusText;
        };
        for range in accept.split(',') {
            let mut parts = range.split(';').map(str::trim);
            let media_type = parts.next().unwrap_or_default();
            if media_type.eq_ignore_ascii_case("application/openmetrics-text") {
                return ExpositionFormat::OpenMetricsText;
            }
            if media_type.eq_ignore_ascii_case("application/vnd.google.protobuf") {
                let params: Vec<&str> = parts.collect();
                let has = |wanted: &str| params.iter().any(|p| p.eq_ignore_ascii_case(wanted));
                if has("proto=io.prometheus.client.MetricFamily") && has("encoding=delimited") {
                    return ExpositionFormat::ProtobufDelimited;
                }
            }
        }
        ExpositionFormat::PrometheusText
    }
}

impl fmt::Display for ExpositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpositionFormat::PrometheusText => "prometheus-text",
            ExpositionFormat::OpenMetricsText => "openmetrics-text",
            ExpositionFormat::ProtobufDelimited => "protobuf-delimited",
        };
        f.write_str(name)
    }
}
