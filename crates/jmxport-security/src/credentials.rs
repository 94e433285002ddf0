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
//! A presented username/password pair.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Username and password as received on the wire.
///
/// Compared and hashed by value. The password is wiped when the value is
/// dropped and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Pair a username with a password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Presented username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Presented password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Bytes charged against a cache budget: username plus password length
    pub fn size_bytes(&self) -> usize {
        self.username.len() + self.password.len()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_value_and_case_sensitive() {
        assert_eq!(Credentials::new("Prometheus", "secret"), Credentials::new("Prometheus", "secret"));
        assert_ne!(Credentials::new("Prometheus", "secret"), Credentials::new("prometheus", "secret"));
        assert_ne!(Credentials::new("Prometheus", "secret"), Credentials::new("Prometheus", "Secret"));
    }

    #[test]
    fn test_size_counts_bytes() {
        assert_eq!(Credentials::new("ab", "cde").size_bytes(), 5);
        assert_eq!(Credentials::new("é", "").size_bytes(), 2);
    }

    #[test]
    fn test_debug_hides_password() {
        let printed = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(printed.contains("user"));
        assert!(!printed.contains("hunter2"));
    }
}
