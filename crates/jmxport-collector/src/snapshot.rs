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
//! A [`ScrapeSource`] backed by a JSON snapshot file.
//!
//! The file is re-read on every scrape, so whatever writes it (an agent, a
//! sidecar, a test) controls what the next scrape sees:
//!
//! ```json
//! {"beans": [{"name": "java.lang:type=Memory",
//!             "attributes": [{"name": "HeapMemoryUsage",
//!                             "description": "Heap usage",
//!                             "value": {"type": "composite", "value": {...}}}]}]}
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{ScrapeError, ScrapeResult};
use crate::identity::IdentityCache;
use crate::model::RawValue;
use crate::scrape::{Attribute, Bean, BeanSet, ScrapeSource};

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    beans: Vec<SnapshotBean>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBean {
    name: String,
    #[serde(default)]
    attributes: Vec<SnapshotAttribute>,
}

#[derive(Debug, Deserialize)]
struct SnapshotAttribute {
    name: String,
    #[serde(default)]
    description: String,
    value: RawValue,
}

/// Reads beans from a JSON file on each scrape.
#[derive(Debug)]
pub struct SnapshotSource {
    path: PathBuf,
    identities: IdentityCache,
}

impl SnapshotSource {
    /// Source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            identities: IdentityCache::new(),
        }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse snapshot JSON into beans; unparseable bean names are skipped.
    pub fn parse(&self, json: &str) -> ScrapeResult<BeanSet> {
        let file: SnapshotFile = serde_json::from_str(json)?;

        let live: HashSet<&str> = file.beans.iter().map(|b| b.name.as_str()).collect();
        let mut set = BeanSet::default();
        for bean in &file.beans {
            let identity = match self.identities.resolve(&bean.name) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(error = %e, "Skipping bean");
                    set.skipped += 1;
                    continue;
                }
            };
            let attributes = bean
                .attributes
                .iter()
                .map(|a| Attribute::new(a.name.clone(), a.description.clone(), a.value.clone()))
                .collect();
            set.beans.push(Bean {
                identity,
                attributes,
            });
        }
        self.identities.retain_only(&live);
        Ok(set)
    }
}

impl ScrapeSource for SnapshotSource {
    fn beans(&self) -> ScrapeResult<BeanSet> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| ScrapeError::SnapshotRead {
            path: self.path.clone(),
            source,
        })?;
        self.parse(&json)
    }
}
