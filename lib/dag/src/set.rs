/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::hash::Hash;

/// An order-preserving set of commit hashes.
///
/// Iteration follows the insertion order of the first appearance. Set
/// algebra preserves the order of the left operand; `union` appends the
/// right operand's new hashes after it. Cloning is cheap; the backing
/// storage is shared until changed.
#[derive(Clone, Default)]
pub struct Set {
    inner: Arc<IndexSet<Hash>>,
}

impl Set {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union, keeping `self`'s order followed by `other`'s new hashes.
    pub fn union(&self, other: &Set) -> Set {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut inner = (*self.inner).clone();
        inner.extend(other.inner.iter().cloned());
        Set {
            inner: Arc::new(inner),
        }
    }

    /// Intersection, in `self`'s order.
    pub fn intersect(&self, other: &Set) -> Set {
        if self.is_empty() || other.is_empty() {
            return Set::new();
        }
        self.inner
            .iter()
            .filter(|h| other.contains(h))
            .cloned()
            .collect()
    }

    /// Difference, in `self`'s order.
    pub fn subtract(&self, other: &Set) -> Set {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }
        self.inner
            .iter()
            .filter(|h| !other.contains(h))
            .cloned()
            .collect()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.contains(hash.as_str())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.inner.iter()
    }

    pub fn first(&self) -> Option<&Hash> {
        self.inner.first()
    }

    pub fn to_vec(&self) -> Vec<Hash> {
        self.inner.iter().cloned().collect()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Set {}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.iter()).finish()
    }
}

impl FromIterator<Hash> for Set {
    fn from_iter<I: IntoIterator<Item = Hash>>(iter: I) -> Self {
        Set {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl From<Hash> for Set {
    fn from(hash: Hash) -> Self {
        std::iter::once(hash).collect()
    }
}

impl From<&Hash> for Set {
    fn from(hash: &Hash) -> Self {
        Set::from(hash.clone())
    }
}

impl From<Vec<Hash>> for Set {
    fn from(hashes: Vec<Hash>) -> Self {
        hashes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(hashes: &[&str]) -> Set {
        hashes.iter().map(|h| Hash::from(*h)).collect()
    }

    #[test]
    fn test_order_preserved() {
        let s = set(&["c", "a", "b"]);
        assert_eq!(format!("{:?}", s), "{c, a, b}");
    }

    #[test]
    fn test_union_keeps_left_order() {
        let s = set(&["b", "a"]).union(&set(&["a", "c"]));
        assert_eq!(format!("{:?}", s), "{b, a, c}");
    }

    #[test]
    fn test_intersect_and_subtract() {
        let s = set(&["c", "a", "b"]);
        assert_eq!(s.intersect(&set(&["b", "c"])), set(&["c", "b"]));
        assert_eq!(s.subtract(&set(&["a"])), set(&["c", "b"]));
        // Foreign hashes are silently ignored.
        assert_eq!(s.intersect(&set(&["z"])), Set::new());
        assert_eq!(s.subtract(&set(&["z"])), s);
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(set(&["a", "b"]), set(&["b", "a"]));
        assert_ne!(set(&["a"]), set(&["a", "b"]));
    }
}
