/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::basedag::BaseDag;
use crate::basedag::GraphNode;
use crate::hash::Hash;
use crate::set::Set;

/// A node of the mutation graph: a hash and its known predecessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationNode {
    hash: Hash,
    predecessors: Vec<Hash>,
}

impl GraphNode for MutationNode {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn parents(&self) -> &[Hash] {
        &self.predecessors
    }
}

/// The predecessor → successor graph superimposed on the visible commit
/// graph.
///
/// Nodes here are never removed when visible commits are: an obsolete
/// ancestor that has disappeared from the visible graph is remembered so
/// that its successors remain reachable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationDag {
    inner: BaseDag<MutationNode>,
}

impl MutationDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `(predecessor, successor)` edges. Both endpoints are
    /// materialised; duplicate edges are ignored.
    pub fn add_mutations(&self, pairs: impl IntoIterator<Item = (Hash, Hash)>) -> Self {
        let mut pending: Vec<MutationNode> = Vec::new();
        let mut inner = self.inner.clone();
        for (predecessor, successor) in pairs {
            if predecessor == successor {
                continue;
            }
            if !inner.contains(&predecessor) && !pending.iter().any(|n| n.hash == predecessor) {
                pending.push(MutationNode {
                    hash: predecessor.clone(),
                    predecessors: Vec::new(),
                });
            }
            let mut node = pending
                .iter()
                .position(|n| n.hash == successor)
                .map(|i| pending.remove(i))
                .or_else(|| inner.get(&successor).cloned())
                .unwrap_or(MutationNode {
                    hash: successor.clone(),
                    predecessors: Vec::new(),
                });
            if !node.predecessors.contains(&predecessor) {
                node.predecessors.push(predecessor);
            }
            pending.push(node);
            // Apply eagerly so later pairs observe earlier ones.
            inner = inner.add(pending.drain(..));
        }
        MutationDag { inner }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.contains(hash)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Known predecessors of `hash`, in insertion order.
    pub fn predecessors(&self, hash: &Hash) -> &[Hash] {
        self.inner.parent_hashes(hash)
    }

    /// Known successors of `hash`, in insertion order.
    pub fn successors(&self, hash: &Hash) -> &[Hash] {
        self.inner.child_hashes(hash)
    }

    /// Transitive successors, including the starting set.
    pub fn descendants(&self, set: &Set) -> Set {
        self.inner.descendants(set, None)
    }

    /// Transitive predecessors, including the starting set.
    pub fn ancestors(&self, set: &Set) -> Set {
        self.inner.ancestors(set, None)
    }

    /// Members of `set` that are not predecessors of other members.
    pub fn heads(&self, set: &Set) -> Set {
        self.inner.heads(set)
    }

    /// All edges as `(predecessor, successors)` pairs, for debugging.
    pub fn edges(&self) -> Vec<(Hash, Vec<Hash>)> {
        self.inner
            .hashes()
            .filter(|h| !self.inner.child_hashes(h).is_empty())
            .map(|h| (h.clone(), self.inner.child_hashes(h).to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(h: &str) -> Hash {
        Hash::from(h)
    }

    fn set(hashes: &[&str]) -> Set {
        hashes.iter().map(|h| Hash::from(*h)).collect()
    }

    #[test]
    fn test_add_mutations() {
        let dag = MutationDag::new().add_mutations(vec![
            (hash("a1"), hash("a2")),
            (hash("a2"), hash("a3")),
            (hash("b1"), hash("a3")),
        ]);
        assert_eq!(dag.successors(&hash("a1")), &[hash("a2")]);
        assert_eq!(dag.predecessors(&hash("a3")), &[hash("a2"), hash("b1")]);
        assert_eq!(dag.descendants(&set(&["a1"])), set(&["a1", "a2", "a3"]));
    }

    #[test]
    fn test_heads_follow_newest() {
        let dag = MutationDag::new()
            .add_mutations(vec![(hash("a1"), hash("a2")), (hash("a2"), hash("a3"))]);
        let all = dag.descendants(&set(&["a1"]));
        assert_eq!(dag.heads(&all), set(&["a3"]));
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let dag = MutationDag::new()
            .add_mutations(vec![(hash("a1"), hash("a2")), (hash("a1"), hash("a2"))]);
        assert_eq!(dag.successors(&hash("a1")), &[hash("a2")]);
        assert_eq!(dag.predecessors(&hash("a2")), &[hash("a1")]);
    }
}
