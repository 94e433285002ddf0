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
//! Byte-budgeted credentials cache.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::credentials::Credentials;

/// Caches [`Credentials`] within a fixed byte budget.
///
/// Each entry costs [`Credentials::size_bytes`]. Adding an entry evicts the
/// oldest entries until it fits; an entry larger than the whole budget is
/// not cached and evicts nothing.
#[derive(Debug)]
pub struct CredentialsCache {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    members: HashSet<Credentials>,
    /// Oldest first
    order: VecDeque<Credentials>,
    current_bytes: usize,
}

impl CredentialsCache {
    /// Empty cache with a budget of `max_bytes`
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Cache `credentials`; false if it can never fit
    pub fn add(&self, credentials: Credentials) -> bool {
        let size = credentials.size_bytes();
        if size > self.max_bytes {
            debug!(size, budget = self.max_bytes, "Credentials larger than cache budget");
            return false;
        }

        let mut inner = self.inner.lock();
        if inner.members.contains(&credentials) {
            return true;
        }
        while inner.current_bytes + size > self.max_bytes {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.members.remove(&oldest);
            inner.current_bytes -= oldest.size_bytes();
        }
        inner.members.insert(credentials.clone());
        inner.order.push_back(credentials);
        inner.current_bytes += size;
        true
    }

    /// Whether `credentials` is cached
    pub fn contains(&self, credentials: &Credentials) -> bool {
        self.inner.lock().members.contains(credentials)
    }

    /// Remove `credentials`; true if it was cached
    pub fn remove(&self, credentials: &Credentials) -> bool {
        let mut inner = self.inner.lock();
        if !inner.members.remove(credentials) {
            return false;
        }
        inner.order.retain(|member| member != credentials);
        inner.current_bytes -= credentials.size_bytes();
        true
    }

    /// Budget in bytes
    pub fn max_size_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Bytes currently charged
    pub fn current_size_bytes(&self) -> usize {
        self.inner.lock().current_bytes
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
