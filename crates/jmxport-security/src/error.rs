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
//! Authentication configuration errors.

use thiserror::Error;

/// Invalid or incomplete authentication settings.
///
/// Raised once at startup by
/// [`AuthenticationConfig::build`](crate::config::AuthenticationConfig::build),
/// never while serving requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unsupported authentication algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Missing required authentication field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for authentication field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigurationError {
    /// Invalid value for `field`
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for authentication configuration
pub type ConfigResult<T> = Result<T, ConfigurationError>;
