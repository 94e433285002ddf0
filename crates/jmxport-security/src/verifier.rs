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
//! Credential verification with allowed and recently-denied caches.
//!
//! Hashing a presented password is deliberately slow, so results are cached
//! per presented `(username, password)` pair:
//!
//! - a pair that verified once is remembered in the allowed set and never
//!   hashed again;
//! - a pair that failed is remembered in a small FIFO queue
//!   ([`DENIED_CAPACITY`] entries). Anything older than that is hashed again.
//!
//! Plaintext secrets are compared directly and bypass both caches.

use dashmap::DashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

use crate::cache::CredentialsCache;
use crate::credentials::Credentials;
use crate::error::{ConfigResult, ConfigurationError};
use crate::hash::{generate_digest_hash, generate_pbkdf2_hash, normalize_hash, HashAlgorithm};
use crate::lru_set::LruSet;

/// Capacity of the recently-denied queue
pub const DENIED_CAPACITY: usize = 16;

/// Decides whether a presented username and password are accepted.
///
/// The server only depends on this trait, so a custom check can stand in for
/// the built-in [`Verifier`].
pub trait Authenticator: Send + Sync {
    /// True if the credentials are accepted
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// Turns a presented password into the hex hash compared against the
/// configured one.
pub trait PasswordHasher: Send + Sync {
    /// Lower-case hex hash of `password`
    fn hash(&self, password: &str) -> String;
}

/// How the configured secret is stored and checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationMode {
    /// Secret is the password itself
    Plaintext,
    /// Secret is `hex(H(salt + ":" + password))`
    Digest {
        /// Hash function
        algorithm: HashAlgorithm,
        /// Salt prepended to the password
        salt: String,
    },
    /// Secret is a hex PBKDF2 key
    Pbkdf2 {
        /// HMAC hash function
        algorithm: HashAlgorithm,
        /// Salt, used as UTF-8 bytes
        salt: String,
        /// Iteration count
        iterations: u32,
        /// Derived key length in bits
        key_length_bits: u32,
    },
}

impl AuthenticationMode {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            AuthenticationMode::Plaintext => Ok(()),
            AuthenticationMode::Digest { salt, .. } => {
                if salt.is_empty() {
                    return Err(ConfigurationError::MissingField("salt"));
                }
                Ok(())
            }
            AuthenticationMode::Pbkdf2 {
                salt,
                iterations,
                key_length_bits,
                ..
            } => {
                if salt.is_empty() {
                    return Err(ConfigurationError::MissingField("salt"));
                }
                if *iterations < 1 {
                    return Err(ConfigurationError::invalid("iterations", "must be at least 1"));
                }
                if *key_length_bits < 1 || key_length_bits % 8 != 0 {
                    return Err(ConfigurationError::invalid(
                        "key_length",
                        format!("{} is not a positive multiple of 8 bits", key_length_bits),
                    ));
                }
                Ok(())
            }
        }
    }

    fn hasher(&self) -> Option<Arc<dyn PasswordHasher>> {
        match self {
            AuthenticationMode::Plaintext => None,
            AuthenticationMode::Digest { .. } | AuthenticationMode::Pbkdf2 { .. } => {
                Some(Arc::new(ModeHasher(self.clone())))
            }
        }
    }
}

struct ModeHasher(AuthenticationMode);

impl PasswordHasher for ModeHasher {
    fn hash(&self, password: &str) -> String {
        match &self.0 {
            AuthenticationMode::Plaintext => password.to_string(),
            AuthenticationMode::Digest { algorithm, salt } => {
                generate_digest_hash(*algorithm, salt, password)
            }
            AuthenticationMode::Pbkdf2 {
                algorithm,
                salt,
                iterations,
                key_length_bits,
            } => generate_pbkdf2_hash(*algorithm, salt, *iterations, *key_length_bits, password),
        }
    }
}

enum Secret {
    Plaintext(Zeroizing<String>),
    Hashed {
        expected: String,
        hasher: Arc<dyn PasswordHasher>,
    },
}

enum AllowedSet {
    Unbounded(DashSet<Credentials>),
    Bounded(CredentialsCache),
}

impl AllowedSet {
    fn contains(&self, credentials: &Credentials) -> bool {
        match self {
            AllowedSet::Unbounded(set) => set.contains(credentials),
            AllowedSet::Bounded(cache) => cache.contains(credentials),
        }
    }

    fn insert(&self, credentials: Credentials) {
        match self {
            AllowedSet::Unbounded(set) => {
                set.insert(credentials);
            }
            AllowedSet::Bounded(cache) => {
                cache.add(credentials);
            }
        }
    }

    fn remove(&self, credentials: &Credentials) {
        match self {
            AllowedSet::Unbounded(set) => {
                set.remove(credentials);
            }
            AllowedSet::Bounded(cache) => {
                cache.remove(credentials);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            AllowedSet::Unbounded(set) => set.len(),
            AllowedSet::Bounded(cache) => cache.len(),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hash_computations: AtomicU64,
    allowed_hits: AtomicU64,
    denied_hits: AtomicU64,
}

/// Point-in-time copy of a verifier's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifierStats {
    /// Checks that had to hash the presented password
    pub hash_computations: u64,
    /// Checks answered from the allowed set
    pub allowed_hits: u64,
    /// Checks answered from the denied queue
    pub denied_hits: u64,
}

/// Checks Basic-auth credentials against one configured user.
///
/// Built once at startup and shared by every request handler.
pub struct Verifier {
    username: String,
    secret: Secret,
    allowed: AllowedSet,
    denied: LruSet<Credentials>,
    counters: Counters,
}

impl Verifier {
    /// Verifier for `username` whose configured secret is `secret`.
    ///
    /// For hashed modes `secret` is the expected hash; case and `:`
    /// separators are ignored.
    pub fn configure(mode: AuthenticationMode, username: &str, secret: &str) -> ConfigResult<Self> {
        if username.is_empty() {
            return Err(ConfigurationError::MissingField("username"));
        }
        mode.validate()?;
        match mode.hasher() {
            None => {
                if secret.is_empty() {
                    return Err(ConfigurationError::MissingField("password"));
                }
                Ok(Self::build(
                    username,
                    Secret::Plaintext(Zeroizing::new(secret.to_string())),
                ))
            }
            Some(hasher) => Self::with_hasher(username, secret, hasher),
        }
    }

    /// Verifier with a caller-supplied hasher
    pub fn with_hasher(
        username: &str,
        expected_hash: &str,
        hasher: Arc<dyn PasswordHasher>,
    ) -> ConfigResult<Self> {
        if username.is_empty() {
            return Err(ConfigurationError::MissingField("username"));
        }
        let expected = normalize_hash(expected_hash);
        if expected.is_empty() {
            return Err(ConfigurationError::MissingField("password_hash"));
        }
        Ok(Self::build(username, Secret::Hashed { expected, hasher }))
    }

    fn build(username: &str, secret: Secret) -> Self {
        Self {
            username: username.to_string(),
            secret,
            allowed: AllowedSet::Unbounded(DashSet::new()),
            denied: LruSet::new(DENIED_CAPACITY),
            counters: Counters::default(),
        }
    }

    /// Bound the allowed set to `max_bytes` of credential material
    pub fn with_allowed_cache_bytes(mut self, max_bytes: usize) -> Self {
        self.allowed = AllowedSet::Bounded(CredentialsCache::new(max_bytes));
        self
    }

    /// Configured username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// True if `username` and `password` match the configured user.
    ///
    /// Usernames are case-sensitive. The caller learns nothing about which
    /// part was wrong.
    pub fn check(&self, username: &str, password: &str) -> bool {
        let (expected, hasher) = match &self.secret {
            Secret::Plaintext(expected) => {
                let accepted = (username == self.username) & (password == expected.as_str());
                if !accepted {
                    debug!("Credentials rejected");
                }
                return accepted;
            }
            Secret::Hashed { expected, hasher } => (expected, hasher),
        };

        let credentials = Credentials::new(username, password);
        if self.allowed.contains(&credentials) {
            self.counters.allowed_hits.fetch_add(1, Ordering::Relaxed);
            return true;
        }
        if self.denied.contains(&credentials) {
            self.counters.denied_hits.fetch_add(1, Ordering::Relaxed);
            debug!("Credentials rejected (recently denied)");
            return false;
        }

        self.counters.hash_computations.fetch_add(1, Ordering::Relaxed);
        let hash = Zeroizing::new(hasher.hash(password));
        let accepted = (username == self.username) & (hash.as_str() == expected.as_str());

        if accepted {
            self.denied.remove(&credentials);
            self.allowed.insert(credentials);
        } else {
            self.allowed.remove(&credentials);
            self.denied.insert(credentials);
            debug!("Credentials rejected");
        }
        accepted
    }

    /// Counter snapshot
    pub fn stats(&self) -> VerifierStats {
        VerifierStats {
            hash_computations: self.counters.hash_computations.load(Ordering::Relaxed),
            allowed_hits: self.counters.allowed_hits.load(Ordering::Relaxed),
            denied_hits: self.counters.denied_hits.load(Ordering::Relaxed),
        }
    }

    /// Number of remembered accepted pairs
    pub fn allowed_len(&self) -> usize {
        self.allowed.len()
    }

    /// Number of remembered denied pairs
    pub fn denied_len(&self) -> usize {
        self.denied.len()
    }
}

impl Authenticator for Verifier {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.check(username, password)
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.secret {
            Secret::Plaintext(_) => "plaintext",
            Secret::Hashed { .. } => "hashed",
        };
        f.debug_struct("Verifier")
            .field("username", &self.username)
            .field("mode", &mode)
            .field("allowed", &self.allowed.len())
            .field("denied", &self.denied.len())
            .finish()
    }
}
