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
//! jmxport collector
//!
//! Turns nested bean attributes into flat, labelled metric samples.
//!
//! # Naming
//!
//! A leaf reached through `HeapMemoryUsage.used` on `java.lang:type=Memory`
//! becomes `java_lang_Memory_HeapMemoryUsage_used`: domain, first identity
//! value, attribute path and leaf name, joined with `_`. The remaining
//! identity pairs and any table index columns become labels.
//!
//! # Example
//!
//! ```ignore
//! use jmxport_collector::{Flattener, ObjectIdentity, RawValue};
//!
//! let identity = ObjectIdentity::parse("java.lang:type=Threading")?;
//! let value = RawValue::Number(12.0);
//! let samples: Vec<_> = Flattener::default()
//!     .flatten(&identity, "ThreadCount", "Live threads", &value)
//!     .collect();
//! assert_eq!(samples[0].name, "java_lang_Threading_ThreadCount");
//! ```

pub mod error;
pub mod filter;
pub mod flatten;
pub mod identity;
pub mod model;
pub mod naming;
pub mod scrape;
pub mod snapshot;

pub use error::{ScrapeError, ScrapeResult};
pub use filter::{ObjectNamePattern, ScrapeFilter};
pub use flatten::{Diagnostic, Flatten, FlattenOptions, Flattener};
pub use identity::{IdentityCache, ObjectIdentity};
pub use model::{
    CompositeField, CompositeValue, LabelSet, MetricSample, MetricType, RawValue, TabularValue,
};
pub use scrape::{
    Attribute, Bean, BeanSet, BuildInfo, ScrapeReport, ScrapeSource, Scraper, StaticSource,
    OBJECTNAME_LABEL,
};
pub use snapshot::SnapshotSource;
