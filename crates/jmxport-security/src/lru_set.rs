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
//! Fixed-capacity set with first-in, first-out eviction.

use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// A set that forgets its oldest member once it holds more than
/// `capacity` items.
///
/// Re-inserting a present item does not refresh its position. Insert and
/// evict happen under one lock, so concurrent inserts never push the set
/// past its capacity.
#[derive(Debug)]
pub struct LruSet<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    members: HashSet<T>,
    order: VecDeque<T>,
}

impl<T: Eq + Hash + Clone> LruSet<T> {
    /// Empty set holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                members: HashSet::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
        }
    }

    /// Add `item`, returning the member evicted to make room, if any
    pub fn insert(&self, item: T) -> Option<T> {
        let mut inner = self.inner.lock();
        if inner.members.contains(&item) {
            return None;
        }
        inner.members.insert(item.clone());
        inner.order.push_back(item);

        if inner.order.len() > self.capacity {
            let oldest = inner.order.pop_front()?;
            inner.members.remove(&oldest);
            return Some(oldest);
        }
        None
    }

    /// Whether `item` is a member
    pub fn contains(&self, item: &T) -> bool {
        self.inner.lock().members.contains(item)
    }

    /// Remove `item`; true if it was present
    pub fn remove(&self, item: &T) -> bool {
        let mut inner = self.inner.lock();
        if !inner.members.remove(item) {
            return false;
        }
        inner.order.retain(|member| member != item);
        true
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of members
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_evicts_oldest_first() {
        let set = LruSet::new(3);
        for i in 1..=3 {
            assert_eq!(set.insert(i), None);
        }
        assert_eq!(set.insert(4), Some(1));
        assert!(!set.contains(&1));
        assert!(set.contains(&2) && set.contains(&4));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let set = LruSet::new(2);
        set.insert("a");
        set.insert("b");
        set.insert("a");
        assert_eq!(set.insert("c"), Some("a"));
    }

    #[test]
    fn test_remove() {
        let set = LruSet::new(2);
        set.insert(1);
        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert!(set.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_respect_capacity() {
        let set = Arc::new(LruSet::new(16));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    for i in 0..100 {
                        set.insert(t * 1000 + i);
                        assert!(set.len() <= 16);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(set.len(), 16);
    }
}
