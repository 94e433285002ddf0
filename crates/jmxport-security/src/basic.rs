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
//! `Authorization: Basic` header decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::credentials::Credentials;

/// Decode `Basic base64(username:password)`.
///
/// Any malformed header (other scheme, bad base64, invalid UTF-8, no `:`)
/// yields `None`, which callers treat the same as wrong credentials.
pub fn decode_basic_auth(header: &str) -> Option<Credentials> {
    let (scheme, payload) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = Zeroizing::new(STANDARD.decode(payload.trim()).ok()?);
    let text = std::str::from_utf8(&decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some(Credentials::new(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_decodes_username_and_password() {
        let credentials = decode_basic_auth(&encode("Prometheus:secret")).unwrap_or_else(|| panic!());
        assert_eq!(credentials.username(), "Prometheus");
        assert_eq!(credentials.password(), "secret");
    }

    #[test]
    fn test_password_may_contain_colons() {
        let credentials = decode_basic_auth(&encode("user:a:b")).unwrap_or_else(|| panic!());
        assert_eq!(credentials.username(), "user");
        assert_eq!(credentials.password(), "a:b");
    }

    #[test]
    fn test_empty_parts_are_allowed() {
        let credentials = decode_basic_auth(&encode(":")).unwrap_or_else(|| panic!());
        assert_eq!(credentials.username(), "");
        assert_eq!(credentials.password(), "");
    }

    #[test]
    fn test_malformed_headers() {
        for header in [
            String::new(),
            "Basic".to_string(),
            "Basic !!!not-base64".to_string(),
            format!("Bearer {}", STANDARD.encode("user:pass")),
            encode("no-colon"),
            format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':'])),
        ] {
            assert!(decode_basic_auth(&header).is_none(), "{header:?}");
        }
    }
}
