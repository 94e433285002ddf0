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
//! Password hashing: salted digests and PBKDF2.
//!
//! Hashes are lower-case hex. A digest hash is `hex(H(salt + ":" + password))`;
//! a PBKDF2 hash is `hex(PBKDF2-HMAC-H(password, salt, iterations, bits))`
//! with the salt used as UTF-8 bytes.

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::ConfigurationError;

/// Default PBKDF2 key length in bits
pub const DEFAULT_KEY_LENGTH_BITS: u32 = 128;

/// Underlying hash function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// PBKDF2 iterations used when none are configured.
    ///
    /// Weaker hash functions get more rounds so every algorithm costs about
    /// the same.
    pub fn default_pbkdf2_iterations(self) -> u32 {
        match self {
            HashAlgorithm::Sha1 => 1_300_000,
            HashAlgorithm::Sha256 => 600_000,
            HashAlgorithm::Sha512 => 210_000,
        }
    }
}

/// A configured authentication algorithm name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmName {
    /// `plaintext`
    Plaintext,
    /// `SHA-1`, `SHA-256`, `SHA-512`
    Digest(HashAlgorithm),
    /// `PBKDF2WithHmacSHA1`, `PBKDF2WithHmacSHA256`, `PBKDF2WithHmacSHA512`
    Pbkdf2(HashAlgorithm),
}

impl FromStr for AlgorithmName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(AlgorithmName::Plaintext),
            "SHA-1" => Ok(AlgorithmName::Digest(HashAlgorithm::Sha1)),
            "SHA-256" => Ok(AlgorithmName::Digest(HashAlgorithm::Sha256)),
            "SHA-512" => Ok(AlgorithmName::Digest(HashAlgorithm::Sha512)),
            "PBKDF2WithHmacSHA1" => Ok(AlgorithmName::Pbkdf2(HashAlgorithm::Sha1)),
            "PBKDF2WithHmacSHA256" => Ok(AlgorithmName::Pbkdf2(HashAlgorithm::Sha256)),
            "PBKDF2WithHmacSHA512" => Ok(AlgorithmName::Pbkdf2(HashAlgorithm::Sha512)),
            other => Err(ConfigurationError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmName::Plaintext => "plaintext",
            AlgorithmName::Digest(HashAlgorithm::Sha1) => "SHA-1",
            AlgorithmName::Digest(HashAlgorithm::Sha256) => "SHA-256",
            AlgorithmName::Digest(HashAlgorithm::Sha512) => "SHA-512",
            AlgorithmName::Pbkdf2(HashAlgorithm::Sha1) => "PBKDF2WithHmacSHA1",
            AlgorithmName::Pbkdf2(HashAlgorithm::Sha256) => "PBKDF2WithHmacSHA256",
            AlgorithmName::Pbkdf2(HashAlgorithm::Sha512) => "PBKDF2WithHmacSHA512",
        };
        f.write_str(name)
    }
}

/// `hex(H(salt + ":" + password))`
pub fn generate_digest_hash(algorithm: HashAlgorithm, salt: &str, password: &str) -> String {
    let input = Zeroizing::new(format!("{}:{}", salt, password));
    match algorithm {
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(input.as_bytes())),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(input.as_bytes())),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(input.as_bytes())),
    }
}

/// `hex(PBKDF2-HMAC-H(password, salt, iterations))`, `key_length_bits / 8`
/// bytes long. `key_length_bits` must be a positive multiple of 8.
pub fn generate_pbkdf2_hash(
    algorithm: HashAlgorithm,
    salt: &str,
    iterations: u32,
    key_length_bits: u32,
    password: &str,
) -> String {
    let mut key = Zeroizing::new(vec![0u8; (key_length_bits / 8) as usize]);
    let (password, salt) = (password.as_bytes(), salt.as_bytes());
    match algorithm {
        HashAlgorithm::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut key),
        HashAlgorithm::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key),
        HashAlgorithm::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut key),
    }
    hex::encode(key.as_slice())
}

/// Canonical form of a configured hash: lower-case, `:` separators removed.
pub fn normalize_hash(configured: &str) -> String {
    configured
        .chars()
        .filter(|c| *c != ':')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
