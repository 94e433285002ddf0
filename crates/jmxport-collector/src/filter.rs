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
//! Bean selection: which beans and attributes a scrape exports.
//!
//! Patterns use the object-name pattern syntax: `domain:key=value,...`
//! where the domain and values may contain `*` and `?`, and a trailing
//! `*` in the key list (`java.lang:type=GarbageCollector,*`) lets the bean
//! carry other keys too. Without it the bean must have exactly the listed
//! keys.

use std::collections::HashSet;

use crate::error::{ScrapeError, ScrapeResult};
use crate::identity::ObjectIdentity;

/// A parsed bean name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNamePattern {
    raw: String,
    domain: String,
    properties: Vec<(String, String)>,
    open: bool,
}

impl ObjectNamePattern {
    /// Parse `domain:k=v,...`, `domain:k=v,*` or `domain:*`
    pub fn parse(pattern: &str) -> ScrapeResult<Self> {
        let invalid = |reason: &str| ScrapeError::InvalidObjectName {
            name: pattern.to_string(),
            reason: reason.to_string(),
        };
        let (domain, keys) = pattern.split_once(':').ok_or_else(|| invalid("missing ':'"))?;

        let (keys, open) = if keys == "*" {
            ("", true)
        } else if let Some(fixed) = keys.strip_suffix(",*") {
            (fixed, true)
        } else {
            (keys, false)
        };
        if keys.is_empty() && !open {
            return Err(invalid("no key properties"));
        }

        let properties = if keys.is_empty() {
            Vec::new()
        } else {
            let parsed = ObjectIdentity::parse(&format!("{}:{}", domain, keys))?;
            parsed.properties().to_vec()
        };

        Ok(Self {
            raw: pattern.to_string(),
            domain: domain.to_string(),
            properties,
            open,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `identity` is selected by this pattern
    pub fn matches(&self, identity: &ObjectIdentity) -> bool {
        if !glob_match(&self.domain, identity.domain()) {
            return false;
        }
        if !self.open && identity.properties().len() != self.properties.len() {
            return false;
        }
        self.properties.iter().all(|(key, value)| {
            identity
                .get(key)
                .is_some_and(|actual| glob_match(value, actual))
        })
    }
}

/// `*` matches any run of characters, `?` exactly one.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    t = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

/// Include, exclude and per-bean attribute exclusion rules.
///
/// An empty include list selects every bean. Excludes win over includes.
#[derive(Debug, Clone, Default)]
pub struct ScrapeFilter {
    include: Vec<ObjectNamePattern>,
    exclude: Vec<ObjectNamePattern>,
    exclude_attributes: Vec<(ObjectNamePattern, HashSet<String>)>,
}

impl ScrapeFilter {
    /// Filter that lets everything through
    pub fn new() -> Self {
        Self::default()
    }

    /// Only export beans matching one of `patterns`
    pub fn include<I, S>(mut self, patterns: I) -> ScrapeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.include.push(ObjectNamePattern::parse(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Never export beans matching one of `patterns`
    pub fn exclude<I, S>(mut self, patterns: I) -> ScrapeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.exclude.push(ObjectNamePattern::parse(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Drop `attributes` from beans matching `pattern`
    pub fn exclude_attributes<I, S>(mut self, pattern: &str, attributes: I) -> ScrapeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pattern = ObjectNamePattern::parse(pattern)?;
        let attributes: HashSet<String> = attributes.into_iter().map(Into::into).collect();
        match self.exclude_attributes.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, existing)) => existing.extend(attributes),
            None => self.exclude_attributes.push((pattern, attributes)),
        }
        Ok(self)
    }

    /// Whether a bean is exported at all
    pub fn allows_bean(&self, identity: &ObjectIdentity) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(identity));
        included && !self.exclude.iter().any(|p| p.matches(identity))
    }

    /// Whether one attribute of an exported bean is flattened
    pub fn allows_attribute(&self, identity: &ObjectIdentity, attribute: &str) -> bool {
        !self
            .exclude_attributes
            .iter()
            .any(|(pattern, names)| names.contains(attribute) && pattern.matches(identity))
    }

    /// Whether this filter drops nothing
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.exclude_attributes.is_empty()
    }
}
