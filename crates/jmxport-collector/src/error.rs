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
//! Scrape errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole scrape.
///
/// Per-attribute problems never end up here; the flattener reports them as
/// [`Diagnostic`](crate::flatten::Diagnostic)s and moves on.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Invalid object name '{name}': {reason}")]
    InvalidObjectName { name: String, reason: String },

    #[error("Scrape source failed: {0}")]
    Source(String),

    #[error("Failed to read snapshot {}: {source}", path.display())]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Wrap any source-side failure message
    pub fn source_failure(message: impl Into<String>) -> Self {
        ScrapeError::Source(message.into())
    }
}

/// Result type for scrape operations
pub type ScrapeResult<T> = Result<T, ScrapeError>;
