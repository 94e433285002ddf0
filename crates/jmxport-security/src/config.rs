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
//! Authentication settings as read from the server configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::{ConfigResult, ConfigurationError};
use crate::hash::{AlgorithmName, DEFAULT_KEY_LENGTH_BITS};
use crate::verifier::{AuthenticationMode, Verifier};

/// `[authentication]` table
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationConfig {
    /// `plaintext`, `SHA-1`, `SHA-256`, `SHA-512`, `PBKDF2WithHmacSHA1`,
    /// `PBKDF2WithHmacSHA256` or `PBKDF2WithHmacSHA512`
    pub algorithm: String,

    /// Required username (case-sensitive)
    pub username: Option<String>,

    /// Password, for `plaintext`
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Expected hex hash, for every other algorithm
    #[serde(alias = "passwordHash")]
    pub password_hash: Option<String>,

    /// Salt for digest and PBKDF2 algorithms
    pub salt: Option<String>,

    /// PBKDF2 iterations; defaults depend on the algorithm
    pub iterations: Option<u32>,

    /// PBKDF2 key length in bits
    #[serde(alias = "keyLength")]
    pub key_length: u32,

    /// Bound the cache of accepted credentials to this many bytes.
    /// Unbounded when absent.
    pub allowed_cache_bytes: Option<usize>,
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            algorithm: "plaintext".to_string(),
            username: None,
            password: None,
            password_hash: None,
            salt: None,
            iterations: None,
            key_length: DEFAULT_KEY_LENGTH_BITS,
            allowed_cache_bytes: None,
        }
    }
}

impl fmt::Debug for AuthenticationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationConfig")
            .field("algorithm", &self.algorithm)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("password_hash", &redacted(&self.password_hash))
            .field("salt", &redacted(&self.salt))
            .field("iterations", &self.iterations)
            .field("key_length", &self.key_length)
            .field("allowed_cache_bytes", &self.allowed_cache_bytes)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> ConfigResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigurationError::MissingField(field)),
    }
}

impl AuthenticationConfig {
    /// Resolved authentication mode
    pub fn mode(&self) -> ConfigResult<AuthenticationMode> {
        let mode = match self.algorithm.parse::<AlgorithmName>()? {
            AlgorithmName::Plaintext => AuthenticationMode::Plaintext,
            AlgorithmName::Digest(algorithm) => AuthenticationMode::Digest {
                algorithm,
                salt: required(&self.salt, "salt")?.to_string(),
            },
            AlgorithmName::Pbkdf2(algorithm) => AuthenticationMode::Pbkdf2 {
                algorithm,
                salt: required(&self.salt, "salt")?.to_string(),
                iterations: self
                    .iterations
                    .unwrap_or_else(|| algorithm.default_pbkdf2_iterations()),
                key_length_bits: self.key_length,
            },
        };
        Ok(mode)
    }

    /// Validate the settings and build the verifier
    pub fn build(&self) -> ConfigResult<Verifier> {
        let mode = self.mode()?;
        let username = required(&self.username, "username")?;
        let secret = match mode {
            AuthenticationMode::Plaintext => required(&self.password, "password")?,
            _ => required(&self.password_hash, "password_hash")?,
        };

        let mut verifier = Verifier::configure(mode, username, secret)?;
        if let Some(max_bytes) = self.allowed_cache_bytes {
            if max_bytes == 0 {
                return Err(ConfigurationError::invalid(
                    "allowed_cache_bytes",
                    "must be at least 1",
                ));
            }
            verifier = verifier.with_allowed_cache_bytes(max_bytes);
        }

        info!(algorithm = %self.algorithm, "Basic authentication enabled");
        Ok(verifier)
    }
}
