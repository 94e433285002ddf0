//! jmxport exposition
//!
//! Serializes flattened samples into the three Prometheus wire formats and
//! parses them back.
//!
//! # Formats
//!
//! - **Prometheus text** (`text/plain; version=0.0.4`), the default
//! - **OpenMetrics text**, identical apart from the `unknown` type token
//!   and the closing `# EOF`
//! - **Delimited protobuf**, one varint-prefixed `MetricFamily` per family
//!
//! Only exposable samples are written. Families are sorted by name and
//! samples keep their input order, so output is byte-for-byte repeatable.
//!
//! # Example
//!
//! ```ignore
//! use jmxport_exposition::{serialize, ExpositionFormat};
//!
//! let format = ExpositionFormat::from_accept(headers.get("accept"));
//! let body = serialize(&report.samples, format)?;
//! ```

pub mod error;
pub mod family;
pub mod float;
pub mod format;
pub mod protobuf;
pub mod text;

pub use error::{FormatError, FormatErrorKind, FormatResult, Position};
pub use format::ExpositionFormat;
pub use text::TextFlavor;

use jmxport_collector::MetricSample;
use tracing::debug;

/// Serialize the exposable samples in `format`.
pub fn serialize<'a>(
    samples: impl IntoIterator<Item = &'a MetricSample>,
    format: ExpositionFormat,
) -> FormatResult<Vec<u8>> {
    let body = match format {
        ExpositionFormat::PrometheusText => text::write(samples, TextFlavor::Prometheus).into_bytes(),
        ExpositionFormat::OpenMetricsText => text::write(samples, TextFlavor::OpenMetrics).into_bytes(),
        ExpositionFormat::ProtobufDelimited => protobuf::write(samples)?,
    };
    debug!(%format, bytes = body.len(), "Serialized samples");
    Ok(body)
}

/// Parse bytes written in `format` back into samples.
pub fn parse(bytes: &[u8], format: ExpositionFormat) -> FormatResult<Vec<MetricSample>> {
    match format {
        ExpositionFormat::PrometheusText => text::parse(bytes, TextFlavor::Prometheus),
        ExpositionFormat::OpenMetricsText => text::parse(bytes, TextFlavor::OpenMetrics),
        ExpositionFormat::ProtobufDelimited => protobuf::parse(bytes),
    }
}
