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
//! Prometheus text (0.0.4) and OpenMetrics text writers and parser.
//!
//! Both flavors share escaping, ordering and the sample line layout:
//!
//! ```text
//! # HELP name help
//! # TYPE name untyped
//! name{label1="v1",label2="v2",} 1 1700000000000
//! ```
//!
//! The trailing comma inside the label block matches the legacy writer.
//! OpenMetrics spells the untyped family type `unknown`, writes timestamps
//! in seconds (`1700000000.123`) and ends with `# EOF`.

use jmxport_collector::{LabelSet, MetricSample, MetricType};
use std::collections::HashMap;

use crate::error::{FormatError, FormatErrorKind, FormatResult};
use crate::family::group;
use crate::float::{format_value, parse_value};

/// Which text format to write or read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFlavor {
    /// `text/plain; version=0.0.4`
    Prometheus,
    /// `application/openmetrics-text; version=1.0.0`
    OpenMetrics,
}

impl TextFlavor {
    fn type_token(self, metric_type: MetricType) -> &'static str {
        match (self, metric_type) {
            (_, MetricType::Gauge) => "gauge",
            (TextFlavor::Prometheus, MetricType::Untyped) => "untyped",
            (TextFlavor::OpenMetrics, MetricType::Untyped) => "unknown",
        }
    }
}

/// Write the exposable samples in the given text flavor.
pub fn write<'a>(samples: impl IntoIterator<Item = &'a MetricSample>, flavor: TextFlavor) -> String {
    let mut out = String::new();
    for family in group(samples) {
        out.push_str("# HELP ");
        out.push_str(family.name);
        out.push(' ');
        out.push_str(&escape(family.help, false));
        out.push('\n');

        out.push_str("# TYPE ");
        out.push_str(family.name);
        out.push(' ');
        out.push_str(flavor.type_token(family.metric_type));
        out.push('\n');

        for sample in family.samples {
            write_sample(&mut out, sample, flavor);
        }
    }
    if flavor == TextFlavor::OpenMetrics {
        out.push_str("# EOF\n");
    }
    out
}

fn write_sample(out: &mut String, sample: &MetricSample, flavor: TextFlavor) {
    out.push_str(&sample.name);
    if !sample.labels.is_empty() {
        out.push('{');
        for (name, value) in sample.labels.iter() {
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value, true));
            out.push_str("\",");
        }
        out.push('}');
    }
    out.push(' ');
    out.push_str(&format_value(sample.value));
    if let Some(timestamp) = sample.timestamp_ms {
        out.push(' ');
        match flavor {
            TextFlavor::Prometheus => out.push_str(&timestamp.to_string()),
            TextFlavor::OpenMetrics => out.push_str(&millis_as_seconds(timestamp)),
        }
    }
    out.push('\n');
}

/// `1700000000123` -> `1700000000.123`, without trailing zeros.
fn millis_as_seconds(timestamp_ms: i64) -> String {
    let sign = if timestamp_ms < 0 { "-" } else { "" };
    let abs = timestamp_ms.unsigned_abs();
    let (secs, millis) = (abs / 1000, abs % 1000);
    if millis == 0 {
        return format!("{}{}", sign, secs);
    }
    let fraction = format!("{:03}", millis);
    format!("{}{}.{}", sign, secs, fraction.trim_end_matches('0'))
}

fn parse_timestamp(raw: &str, flavor: TextFlavor) -> Result<i64, FormatErrorKind> {
    let invalid = || FormatErrorKind::InvalidTimestamp(raw.to_string());
    match flavor {
        TextFlavor::Prometheus => raw.parse::<i64>().map_err(|_| invalid()),
        TextFlavor::OpenMetrics => {
            let seconds: f64 = raw.parse().map_err(|_| invalid())?;
            let millis = (seconds * 1000.0).round();
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return Err(invalid());
            }
            Ok(millis as i64)
        }
    }
}

/// Escape help text (`\` and newline), plus `"` for label values.
fn escape(raw: &str, label_value: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' if label_value => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}

/// Undo [`escape`]; unknown escape sequences are kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse text exposition back into samples.
///
/// Errors carry the 1-based line number. For OpenMetrics the input must end
/// with `# EOF` and nothing may follow it.
pub fn parse(bytes: &[u8], flavor: TextFlavor) -> FormatResult<Vec<MetricSample>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FormatError::at_offset(FormatErrorKind::InvalidUtf8, e.valid_up_to()))?;

    let mut helps: HashMap<&str, String> = HashMap::new();
    let mut types: HashMap<&str, MetricType> = HashMap::new();
    let mut samples = Vec::new();
    let mut seen_eof = false;
    let mut line_count = 0;

    // Only '\n' ends a line; a '\r' belongs to the help or label text.
    for (index, line) in text.split_terminator('\n').enumerate() {
        let line_no = index + 1;
        line_count = line_no;
        if seen_eof {
            return Err(FormatError::at_line(
                FormatErrorKind::TrailingData(line.to_string()),
                line_no,
            ));
        }
        if line.trim().is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim_start();
            if flavor == TextFlavor::OpenMetrics && comment.trim() == "EOF" {
                seen_eof = true;
            } else if let Some(rest) = comment.strip_prefix("HELP ") {
                let (name, help) = rest.split_once(' ').unwrap_or((rest, ""));
                helps.insert(name, unescape(help));
            } else if let Some(rest) = comment.strip_prefix("TYPE ") {
                let (name, token) = rest.split_once(' ').unwrap_or((rest, ""));
                let metric_type = match token.trim() {
                    "untyped" | "unknown" => MetricType::Untyped,
                    "gauge" => MetricType::Gauge,
                    other => {
                        return Err(FormatError::at_line(
                            FormatErrorKind::UnsupportedType(other.to_string()),
                            line_no,
                        ))
                    }
                };
                types.insert(name, metric_type);
            }
            continue;
        }
        samples.push(
            parse_sample_line(line, flavor).map_err(|kind| FormatError::at_line(kind, line_no))?,
        );
    }

    if flavor == TextFlavor::OpenMetrics && !seen_eof {
        return Err(FormatError::at_line(FormatErrorKind::MissingEof, line_count + 1));
    }

    Ok(samples
        .into_iter()
        .map(|mut sample| {
            if let Some(help) = helps.get(sample.name.as_str()) {
                sample.help = help.clone();
            }
            if let Some(metric_type) = types.get(sample.name.as_str()) {
                sample.metric_type = *metric_type;
            }
            sample
        })
        .collect())
}

fn parse_sample_line(line: &str, flavor: TextFlavor) -> Result<MetricSample, FormatErrorKind> {
    let name_end = line
        .find(|c: char| c == '{' || c.is_ascii_whitespace())
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if !is_metric_name(name) {
        return Err(FormatErrorKind::InvalidName(name.to_string()));
    }

    let mut rest = &line[name_end..];
    let mut labels = LabelSet::new();
    if let Some(block) = rest.strip_prefix('{') {
        let (parsed, after) = parse_labels(block)?;
        labels = parsed;
        rest = after;
    }

    let mut fields = rest.split_ascii_whitespace();
    let raw_value = fields.next().ok_or(FormatErrorKind::MissingValue)?;
    let value =
        parse_value(raw_value).ok_or_else(|| FormatErrorKind::InvalidValue(raw_value.to_string()))?;
    let timestamp = fields
        .next()
        .map(|raw| parse_timestamp(raw, flavor))
        .transpose()?;
    if let Some(extra) = fields.next() {
        return Err(FormatErrorKind::TrailingData(extra.to_string()));
    }

    let sample = MetricSample::new(name, labels, value, "");
    Ok(match timestamp {
        Some(timestamp) => sample.with_timestamp(timestamp),
        None => sample,
    })
}

/// Parse `k="v",...}` (the opening brace already consumed).
fn parse_labels(mut rest: &str) -> Result<(LabelSet, &str), FormatErrorKind> {
    let mut labels = LabelSet::new();
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix('}') {
            return Ok((labels, after));
        }
        let eq = rest.find('=').ok_or(FormatErrorKind::UnterminatedLabels)?;
        let key = rest[..eq].trim();
        if !is_label_name(key) {
            return Err(FormatErrorKind::MalformedLabel(format!("invalid label name '{}'", key)));
        }
        rest = rest[eq + 1..].trim_start();
        let quoted = rest.strip_prefix('"').ok_or_else(|| {
            FormatErrorKind::MalformedLabel(format!("value of '{}' is not quoted", key))
        })?;
        let (value, after) = read_quoted(quoted).ok_or(FormatErrorKind::UnterminatedLabels)?;
        labels.insert(key, value);

        rest = after.trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after;
        } else if !rest.starts_with('}') {
            return Err(FormatErrorKind::UnterminatedLabels);
        }
    }
}

/// Read an escaped value up to its closing quote; returns the value and
/// what follows the quote.
fn read_quoted(s: &str) -> Option<(String, &str)> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some((unescape(&s[..i]), &s[i + 1..])),
            _ => {}
        }
    }
    None
}

fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
