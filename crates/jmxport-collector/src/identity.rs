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
//! Bean identities (`domain:key=value,...`) with key order preserved.
//!
//! Key order matters: the first value becomes part of the metric name and
//! the rest become labels, in the order they were written.

use dashmap::DashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ScrapeError, ScrapeResult};

/// A parsed bean name: domain plus ordered key properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentity {
    domain: String,
    properties: Vec<(String, String)>,
}

impl ObjectIdentity {
    /// Build an identity from already-split parts
    pub fn new<K, V>(domain: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            domain: domain.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse `domain:k1=v1,k2="quoted, value"`.
    ///
    /// Quoted values keep their quotes, matching how the name was written.
    /// A quoted value may contain `,`, `=`, `:` and backslash escapes.
    pub fn parse(name: &str) -> ScrapeResult<Self> {
        let invalid = |reason: &str| ScrapeError::InvalidObjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let (domain, mut rest) = name.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
        if rest.is_empty() {
            return Err(invalid("no key properties"));
        }

        let mut properties: Vec<(String, String)> = Vec::new();
        while !rest.is_empty() {
            let eq = rest.find('=').ok_or_else(|| invalid("key without '='"))?;
            let key = &rest[..eq];
            if key.is_empty() || key.contains([',', ':', '*', '?']) {
                return Err(invalid("empty or illegal key"));
            }
            rest = &rest[eq + 1..];

            let value_len = if rest.starts_with('"') {
                quoted_len(rest).ok_or_else(|| invalid("unterminated quoted value"))?
            } else {
                rest.find(',').unwrap_or(rest.len())
            };
            let value = &rest[..value_len];
            if !value.starts_with('"') && value.contains(['=', ':', '"']) {
                return Err(invalid("illegal character in unquoted value"));
            }
            if properties.iter().any(|(k, _)| k == key) {
                return Err(invalid("duplicate key"));
            }
            properties.push((key.to_string(), value.to_string()));

            rest = &rest[value_len..];
            if let Some(next) = rest.strip_prefix(',') {
                if next.is_empty() {
                    return Err(invalid("trailing ','"));
                }
                rest = next;
            } else if !rest.is_empty() {
                return Err(invalid("expected ',' after quoted value"));
            }
        }

        Ok(Self {
            domain: domain.to_string(),
            properties,
        })
    }

    /// Domain part
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Key properties in written order
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Value of the first key property
    pub fn first_value(&self) -> Option<&str> {
        self.properties.first().map(|(_, v)| v.as_str())
    }

    /// Value of a key property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (i, (k, v)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// Byte length of a leading quoted value, including both quotes.
fn quoted_len(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Parsed identities keyed by the raw bean name.
///
/// Parsing is repeated for every bean on every scrape, so results are kept
/// until the bean disappears from the source.
#[derive(Debug, Default)]
pub struct IdentityCache {
    identities: DashMap<String, Arc<ObjectIdentity>>,
}

impl IdentityCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name`, or return the cached parse
    pub fn resolve(&self, name: &str) -> ScrapeResult<Arc<ObjectIdentity>> {
        if let Some(identity) = self.identities.get(name) {
            return Ok(Arc::clone(identity.value()));
        }
        let identity = Arc::new(ObjectIdentity::parse(name)?);
        self.identities
            .insert(name.to_string(), Arc::clone(&identity));
        Ok(identity)
    }

    /// Drop every entry whose name is not in `live`
    pub fn retain_only(&self, live: &HashSet<&str>) {
        let before = self.identities.len();
        self.identities.retain(|name, _| live.contains(name.as_str()));
        let evicted = before.saturating_sub(self.identities.len());
        if evicted > 0 {
            debug!(evicted, "Dropped identities of beans no longer present");
        }
    }

    /// Number of cached identities
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_key_order() {
        let identity = ObjectIdentity::parse("java.lang:type=Memory,name=Heap,area=eden").unwrap();
        assert_eq!(identity.domain(), "java.lang");
        let keys: Vec<_> = identity.properties().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["type", "name", "area"]);
        assert_eq!(identity.first_value(), Some("Memory"));
    }

    #[test]
    fn test_parse_quoted_value() {
        let identity =
            ObjectIdentity::parse(r#"org.apache:type=Servlet,name="a,b=c\"d",context=/"#).unwrap();
        assert_eq!(identity.get("name"), Some(r#""a,b=c\"d""#));
        assert_eq!(identity.get("context"), Some("/"));
        assert_eq!(identity.properties().len(), 3);
    }

    #[test]
    fn test_parse_empty_unquoted_value() {
        let identity = ObjectIdentity::parse("d:a=,b=1").unwrap();
        assert_eq!(identity.get("a"), Some(""));
        assert_eq!(identity.get("b"), Some("1"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for name in [
            "nodomain",
            "d:",
            "d:novalue",
            "d:a=1,",
            "d:a=\"open",
            "d:a=1,a=2",
            "d:a=\"x\"y",
        ] {
            assert!(ObjectIdentity::parse(name).is_err(), "{name} should fail");
        }
    }

    #[test]
    fn test_display_round_trips() {
        let raw = r#"io.prometheus.jmx:type=tabularData,name="x y""#;
        let identity = ObjectIdentity::parse(raw).unwrap();
        assert_eq!(identity.to_string(), raw);
    }

    #[test]
    fn test_cache_resolves_once_and_retains_live() {
        let cache = IdentityCache::new();
        let a = cache.resolve("d:type=A").unwrap();
        let again = cache.resolve("d:type=A").unwrap();
        assert!(Arc::ptr_eq(&a, &again));
        cache.resolve("d:type=B").unwrap();
        assert_eq!(cache.len(), 2);

        cache.retain_only(&HashSet::from(["d:type=B"]));
        assert_eq!(cache.len(), 1);
    }
}
