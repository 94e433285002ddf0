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
//! Metric and label naming.
//!
//! Names are the domain, the first identity value, the attribute path and
//! the leaf name joined with `_`, then rewritten so that every character is
//! in `[a-zA-Z0-9_]` and the first is not a digit.

use crate::identity::ObjectIdentity;

/// Segment separator in built names
pub const SEPARATOR: char = '_';

/// Rewrite `raw` into a legal metric or label name.
///
/// Any character outside `[a-zA-Z0-9_]` becomes `_` (this covers `.`, ` `
/// and `-`), a leading digit gets a `_` prefix and an empty input becomes
/// `_`. Applying it twice gives the same result as applying it once.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    if raw.starts_with(|c: char| c.is_ascii_digit()) {
        out.push(SEPARATOR);
    }
    out.extend(raw.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == SEPARATOR {
            c
        } else {
            SEPARATOR
        }
    }));
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    out
}

/// Whether `name` matches `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Join `[domain, first_value?, ...path, leaf]` with `_` and sanitize.
pub fn build_name(domain: &str, first_value: Option<&str>, path: &[String], leaf: &str) -> String {
    let mut joined = String::from(domain);
    let segments = first_value
        .into_iter()
        .chain(path.iter().map(String::as_str))
        .chain(std::iter::once(leaf));
    for segment in segments {
        joined.push(SEPARATOR);
        joined.push_str(segment);
    }
    sanitize(&joined)
}

/// Help text for a leaf.
///
/// `<description> <domain>:name=<name>,type=<type>,attribute=<attr>`, where
/// the description is left out when it is empty or just repeats the
/// attribute name. Missing `name`/`type` keys print as `null`.
pub fn build_help(description: &str, identity: &ObjectIdentity, attribute: &str) -> String {
    let origin = format!(
        "{}:name={},type={},attribute={}",
        identity.domain(),
        identity.get("name").unwrap_or("null"),
        identity.get("type").unwrap_or("null"),
        attribute
    );
    if description.is_empty() || description == attribute {
        origin
    } else {
        format!("{} {}", description, origin)
    }
}
