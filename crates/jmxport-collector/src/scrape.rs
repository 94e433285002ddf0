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
//! Scrape driver: pulls beans from a [`ScrapeSource`], flattens every
//! attribute and appends the exporter's own metrics.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::ScrapeResult;
use crate::filter::ScrapeFilter;
use crate::flatten::{Diagnostic, FlattenOptions, Flattener};
use crate::identity::ObjectIdentity;
use crate::model::{LabelSet, MetricSample, MetricType, RawValue};

/// Name of the scrape duration self-metric
pub const SCRAPE_DURATION_METRIC: &str = "jmx_scrape_duration_seconds";
/// Name of the scrape error self-metric
pub const SCRAPE_ERROR_METRIC: &str = "jmx_scrape_error";
/// Name of the build info self-metric
pub const BUILD_INFO_METRIC: &str = "jmx_exporter_build_info";
/// Label added to every sample of a family whose label sets collide
pub const OBJECTNAME_LABEL: &str = "_objectname";

/// One attribute of a bean
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute description
    pub help: String,
    /// Current value
    pub value: RawValue,
}

impl Attribute {
    /// Attribute with a description
    pub fn new(name: impl Into<String>, help: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value,
        }
    }
}

/// A bean and its readable attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Bean {
    /// Parsed bean name
    pub identity: Arc<ObjectIdentity>,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
}

/// What a source returned for one scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeanSet {
    /// Beans that were read
    pub beans: Vec<Bean>,
    /// Beans the source saw but could not read
    pub skipped: usize,
}

/// Supplier of the beans to export.
///
/// Called once per scrape from a blocking thread; implementations may do I/O.
pub trait ScrapeSource: Send + Sync {
    /// Read every bean currently visible
    fn beans(&self) -> ScrapeResult<BeanSet>;
}

/// A fixed set of beans.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    beans: Vec<Bean>,
}

impl StaticSource {
    /// Source that always returns `beans`
    pub fn new(beans: Vec<Bean>) -> Self {
        Self { beans }
    }
}

impl ScrapeSource for StaticSource {
    fn beans(&self) -> ScrapeResult<BeanSet> {
        Ok(BeanSet {
            beans: self.beans.clone(),
            skipped: 0,
        })
    }
}

/// Labels of the build info self-metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Exporter name
    pub name: String,
    /// Exporter version
    pub version: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            name: "jmxport".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Result of one scrape.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Flattened samples followed by the self-metrics
    pub samples: Vec<MetricSample>,
    /// Values that produced no sample
    pub diagnostics: Vec<Diagnostic>,
    /// Wall time of the scrape
    pub duration: Duration,
}

/// Runs scrapes. Holds no per-scrape state, so one instance can serve
/// concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Scraper {
    flattener: Flattener,
    build_info: BuildInfo,
    filter: ScrapeFilter,
}

impl Scraper {
    /// Scraper with the given naming options
    pub fn new(options: FlattenOptions) -> Self {
        Self {
            flattener: Flattener::new(options),
            build_info: BuildInfo::default(),
            filter: ScrapeFilter::default(),
        }
    }

    /// Restrict which beans and attributes are exported
    pub fn with_filter(mut self, filter: ScrapeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Override the build info labels
    pub fn with_build_info(mut self, build_info: BuildInfo) -> Self {
        self.build_info = build_info;
        self
    }

    /// Scrape `source` once.
    ///
    /// A source failure aborts the scrape. Beans the source skipped set
    /// `jmx_scrape_error` to 1 but the rest are still exported. Beans and
    /// attributes the filter rejects are dropped before flattening.
    pub fn scrape(&self, source: &dyn ScrapeSource) -> ScrapeResult<ScrapeReport> {
        let started = Instant::now();
        let bean_set = source.beans()?;

        let mut samples = Vec::new();
        let mut origins = Vec::new();
        let mut diagnostics = Vec::new();
        let mut exported = 0usize;
        for bean in &bean_set.beans {
            if !self.filter.allows_bean(&bean.identity) {
                continue;
            }
            exported += 1;
            for attribute in &bean.attributes {
                if !self.filter.allows_attribute(&bean.identity, &attribute.name) {
                    continue;
                }
                let mut walk = self.flattener.flatten(
                    &bean.identity,
                    &attribute.name,
                    &attribute.help,
                    &attribute.value,
                );
                samples.extend(walk.by_ref());
                origins.resize(samples.len(), Arc::clone(&bean.identity));
                diagnostics.extend(walk.into_diagnostics());
            }
        }
        let mut samples = make_series_unique(samples, &origins, &mut diagnostics);

        let duration = started.elapsed();
        debug!(
            beans = exported,
            skipped = bean_set.skipped,
            samples = samples.len(),
            diagnostics = diagnostics.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Scrape complete"
        );

        samples.extend(self.self_metrics(duration, bean_set.skipped > 0));
        Ok(ScrapeReport {
            samples,
            diagnostics,
            duration,
        })
    }

    fn self_metrics(&self, duration: Duration, failed: bool) -> [MetricSample; 3] {
        let build_labels: LabelSet = [
            ("name", self.build_info.name.as_str()),
            ("version", self.build_info.version.as_str()),
        ]
        .into_iter()
        .collect();
        [
            MetricSample::new(
                SCRAPE_DURATION_METRIC,
                LabelSet::new(),
                duration.as_secs_f64(),
                "Time this JMX scrape took, in seconds.",
            )
            .with_type(MetricType::Gauge),
            MetricSample::new(
                SCRAPE_ERROR_METRIC,
                LabelSet::new(),
                if failed { 1.0 } else { 0.0 },
                "Non-zero if this scrape failed.",
            )
            .with_type(MetricType::Gauge),
            MetricSample::new(
                BUILD_INFO_METRIC,
                build_labels,
                1.0,
                "JMX Exporter build information",
            )
            .with_type(MetricType::Gauge),
        ]
    }
}

fn series_key(labels: &LabelSet) -> Vec<(&str, &str)> {
    let mut key: Vec<_> = labels.iter().collect();
    key.sort_unstable();
    key
}

/// Keep every exposable series distinct.
///
/// A family with colliding label sets gets [`OBJECTNAME_LABEL`] on all of
/// its samples. Collisions within one bean survive that, so the later
/// copies are dropped with a diagnostic. `origins[i]` is the bean of
/// `samples[i]`.
fn make_series_unique(
    mut samples: Vec<MetricSample>,
    origins: &[Arc<ObjectIdentity>],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<MetricSample> {
    let mut families: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, sample) in samples.iter().enumerate().filter(|(_, s)| s.exposable) {
        families.entry(sample.name.as_str()).or_default().push(i);
    }

    let mut ambiguous = Vec::new();
    for members in families.values() {
        let mut seen = HashSet::new();
        if !members.iter().all(|&i| seen.insert(series_key(&samples[i].labels))) {
            ambiguous.extend(members.iter().copied());
        }
    }
    for i in ambiguous {
        samples[i].labels.insert(OBJECTNAME_LABEL, origins[i].to_string());
    }

    let mut seen = HashSet::new();
    samples.retain(|sample| {
        if !sample.exposable {
            return true;
        }
        let labels: Vec<(String, String)> = series_key(&sample.labels)
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        if seen.insert((sample.name.clone(), labels)) {
            return true;
        }
        debug!(metric = %sample.name, "Dropping duplicate series");
        diagnostics.push(Diagnostic::DuplicateSeries {
            attribute: sample.name.clone(),
        });
        false
    });
    samples
}
