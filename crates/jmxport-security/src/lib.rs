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
//! jmxport security
//!
//! Basic-auth credential verification for the exposition endpoint.
//!
//! Secrets are configured as plaintext, a salted digest or a PBKDF2 key.
//! [`Verifier`] remembers presented credentials that passed, and briefly
//! remembers ones that failed, so the expensive hash runs at most once per
//! distinct attempt.
//!
//! # Example
//!
//! ```ignore
//! use jmxport_security::{AuthenticationMode, HashAlgorithm, Verifier};
//!
//! let mode = AuthenticationMode::Pbkdf2 {
//!     algorithm: HashAlgorithm::Sha256,
//!     salt: "salt".into(),
//!     iterations: 600_000,
//!     key_length_bits: 128,
//! };
//! let verifier = Verifier::configure(mode, "Prometheus", &expected_hash)?;
//! assert!(verifier.check("Prometheus", "secret"));
//! ```

pub mod basic;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod hash;
pub mod lru_set;
pub mod verifier;

pub use basic::decode_basic_auth;
pub use cache::CredentialsCache;
pub use config::AuthenticationConfig;
pub use credentials::Credentials;
pub use error::{ConfigResult, ConfigurationError};
pub use hash::{
    generate_digest_hash, generate_pbkdf2_hash, normalize_hash, AlgorithmName, HashAlgorithm,
    DEFAULT_KEY_LENGTH_BITS,
};
pub use lru_set::LruSet;
pub use verifier::{
    AuthenticationMode, Authenticator, PasswordHasher, Verifier, VerifierStats, DENIED_CAPACITY,
};
