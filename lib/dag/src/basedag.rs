/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::cmp::Ordering;
use std::collections::HashSet;
use std::collections::VecDeque;

use im::OrdMap;
use indexmap::IndexSet;

use crate::errors::DagError;
use crate::errors::Result;
use crate::hash::Hash;
use crate::set::Set;

/// A node stored in a [`BaseDag`]. The parent list carried by the payload is
/// the single source of truth for edges.
pub trait GraphNode: Clone {
    fn hash(&self) -> &Hash;
    fn parents(&self) -> &[Hash];
}

/// Generic commit-graph store: a map from hash to payload plus a derived
/// child adjacency map, kept consistent with the payloads' parent lists.
///
/// The maps are persistent; every update returns a new `BaseDag` sharing
/// unchanged structure with its predecessor. A node may list parents that
/// are not (yet) present; the edge materialises when the parent is added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseDag<N> {
    infos: OrdMap<Hash, N>,
    children: OrdMap<Hash, Vec<Hash>>,
}

impl<N> Default for BaseDag<N> {
    fn default() -> Self {
        BaseDag {
            infos: OrdMap::new(),
            children: OrdMap::new(),
        }
    }
}

fn detach_child(children: &mut OrdMap<Hash, Vec<Hash>>, parent: &Hash, child: &Hash) {
    if let Some(list) = children.get(parent.as_str()) {
        let mut list = list.clone();
        list.retain(|h| h != child);
        if list.is_empty() {
            children.remove(parent.as_str());
        } else {
            children.insert(parent.clone(), list);
        }
    }
}

impl<N: GraphNode> BaseDag<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace nodes by hash.
    pub fn add(&self, nodes: impl IntoIterator<Item = N>) -> Self {
        let mut infos = self.infos.clone();
        let mut children = self.children.clone();
        for node in nodes {
            let hash = node.hash().clone();
            if let Some(old) = infos.get(hash.as_str()) {
                let old_parents: Vec<Hash> = old.parents().to_vec();
                for parent in &old_parents {
                    detach_child(&mut children, parent, &hash);
                }
            }
            for parent in node.parents() {
                let mut list = children.get(parent.as_str()).cloned().unwrap_or_default();
                if !list.iter().any(|h| h == &hash) {
                    list.push(hash.clone());
                    children.insert(parent.clone(), list);
                }
            }
            infos.insert(hash, node);
        }
        BaseDag { infos, children }
    }

    /// Remove the given nodes and their edges. Unknown hashes are ignored.
    pub fn remove(&self, set: &Set) -> Self {
        let mut infos = self.infos.clone();
        let mut children = self.children.clone();
        for hash in set.iter() {
            let Some(old) = infos.remove(hash.as_str()) else {
                continue;
            };
            for parent in old.parents() {
                detach_child(&mut children, parent, hash);
            }
        }
        BaseDag { infos, children }
    }

    pub fn get(&self, hash: &Hash) -> Option<&N> {
        self.infos.get(hash.as_str())
    }

    pub fn get_by_str(&self, hash: &str) -> Option<&N> {
        self.infos.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.infos.contains_key(hash.as_str())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &Hash> + '_ {
        self.infos.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &N> + '_ {
        self.infos.values()
    }

    /// Every known hash, ordered by hash.
    pub fn all(&self) -> Set {
        self.hashes().cloned().collect()
    }

    /// Ordered parents of `hash`, as recorded by the payload. May include
    /// hashes not present in the graph.
    pub fn parent_hashes(&self, hash: &Hash) -> &[Hash] {
        self.get(hash).map(|n| n.parents()).unwrap_or(&[])
    }

    /// Children of `hash`, in insertion order. All returned hashes are
    /// present in the graph.
    pub fn child_hashes(&self, hash: &Hash) -> &[Hash] {
        self.children
            .get(hash.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Keep only the hashes that exist in the graph.
    pub fn present(&self, set: &Set) -> Set {
        set.iter().filter(|h| self.contains(h)).cloned().collect()
    }

    fn closure(&self, set: &Set, within: Option<&Set>, towards_parents: bool) -> Set {
        let mut result: IndexSet<Hash> = IndexSet::new();
        let mut queue: VecDeque<Hash> = VecDeque::new();
        for hash in set.iter() {
            if self.contains(hash) && result.insert(hash.clone()) {
                queue.push_back(hash.clone());
            }
        }
        while let Some(hash) = queue.pop_front() {
            let neighbors = if towards_parents {
                self.parent_hashes(&hash)
            } else {
                self.child_hashes(&hash)
            };
            // The neighbor list borrows `hash`'s entry; collect before
            // mutating the queue.
            let neighbors: Vec<Hash> = neighbors
                .iter()
                .filter(|n| self.contains(n))
                .filter(|n| within.map_or(true, |w| w.contains(n)))
                .cloned()
                .collect();
            for neighbor in neighbors {
                if result.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
        }
        result.into_iter().collect()
    }

    /// Reflexive ancestor closure. `within` restricts which nodes the
    /// traversal may expand into; the starting set is always included.
    pub fn ancestors(&self, set: &Set, within: Option<&Set>) -> Set {
        self.closure(set, within, true)
    }

    /// Reflexive descendant closure, with the same `within` semantics.
    pub fn descendants(&self, set: &Set, within: Option<&Set>) -> Set {
        self.closure(set, within, false)
    }

    /// Present direct parents of the given set.
    pub fn parents(&self, set: &Set) -> Set {
        let mut result: IndexSet<Hash> = IndexSet::new();
        for hash in set.iter() {
            for parent in self.parent_hashes(hash) {
                if self.contains(parent) {
                    result.insert(parent.clone());
                }
            }
        }
        result.into_iter().collect()
    }

    /// Direct children of the given set.
    pub fn children(&self, set: &Set) -> Set {
        let mut result: IndexSet<Hash> = IndexSet::new();
        for hash in set.iter() {
            for child in self.child_hashes(hash) {
                result.insert(child.clone());
            }
        }
        result.into_iter().collect()
    }

    /// `descendants(roots) ∩ ancestors(heads)`.
    pub fn range(&self, roots: &Set, heads: &Set) -> Set {
        self.descendants(roots, None)
            .intersect(&self.ancestors(heads, None))
    }

    /// Members of `set` without a parent in `set`.
    pub fn roots(&self, set: &Set) -> Set {
        let set = self.present(set);
        set.subtract(&self.children(&set))
    }

    /// Members of `set` without a child in `set`.
    pub fn heads(&self, set: &Set) -> Set {
        let set = self.present(set);
        set.subtract(&self.parents(&set))
    }

    /// Greatest common ancestors of two sets.
    pub fn gca(&self, a: &Set, b: &Set) -> Set {
        let common = self.ancestors(a, None).intersect(&self.ancestors(b, None));
        self.heads(&common)
    }

    /// True if `ancestor` is an ancestor of (or equal to) `descendant`.
    pub fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> bool {
        self.ancestors(&Set::from(descendant), None).contains(ancestor)
    }

    /// The subset of `set` (or of the whole graph) whose payload satisfies
    /// the predicate.
    pub fn filter(&self, predicate: impl Fn(&N) -> bool, set: Option<&Set>) -> Set {
        match set {
            Some(set) => set
                .iter()
                .filter(|h| self.get(h).is_some_and(&predicate))
                .cloned()
                .collect(),
            None => self
                .infos
                .iter()
                .filter(|(_, n)| predicate(n))
                .map(|(h, _)| h.clone())
                .collect(),
        }
    }

    /// Sort `set` topologically so parents appear before children, breaking
    /// ties with `compare`. With `gap` set (the default used by callers),
    /// each stack is emitted as a contiguous run: commits are taken in
    /// comparator order and pulled in together with their not-yet-emitted
    /// in-set ancestors. Without `gap`, branches are interleaved strictly by
    /// the comparator.
    ///
    /// Fails with [`DagError::InvalidDag`] if a cycle is detected.
    pub fn sort_asc_by(
        &self,
        set: &Set,
        gap: bool,
        compare: impl Fn(&N, &N) -> Ordering,
    ) -> Result<Vec<Hash>> {
        let scope = self.present(set);
        let cmp = |a: &Hash, b: &Hash| -> Ordering {
            match (self.get(a), self.get(b)) {
                (Some(x), Some(y)) => compare(x, y),
                _ => a.cmp(b),
            }
        };
        if gap {
            self.sort_asc_contiguous(&scope, &cmp)
        } else {
            self.sort_asc_interleaved(&scope, &cmp)
        }
    }

    /// `sort_asc_by` reversed.
    pub fn sort_desc_by(
        &self,
        set: &Set,
        gap: bool,
        compare: impl Fn(&N, &N) -> Ordering,
    ) -> Result<Vec<Hash>> {
        let mut sorted = self.sort_asc_by(set, gap, compare)?;
        sorted.reverse();
        Ok(sorted)
    }

    fn sorted_in_scope_parents(
        &self,
        hash: &Hash,
        scope: &Set,
        cmp: &impl Fn(&Hash, &Hash) -> Ordering,
    ) -> Vec<Hash> {
        let mut parents: Vec<Hash> = self
            .parent_hashes(hash)
            .iter()
            .filter(|p| scope.contains(p))
            .cloned()
            .collect();
        parents.sort_by(|a, b| cmp(a, b));
        parents.dedup();
        parents
    }

    fn sort_asc_contiguous(
        &self,
        scope: &Set,
        cmp: &impl Fn(&Hash, &Hash) -> Ordering,
    ) -> Result<Vec<Hash>> {
        struct Frame {
            hash: Hash,
            parents: Vec<Hash>,
            next: usize,
        }

        let mut order = scope.to_vec();
        order.sort_by(|a, b| cmp(a, b));

        let mut emitted: HashSet<Hash> = HashSet::with_capacity(order.len());
        let mut on_stack: HashSet<Hash> = HashSet::new();
        let mut output: Vec<Hash> = Vec::with_capacity(order.len());

        for start in &order {
            if emitted.contains(start) {
                continue;
            }
            on_stack.insert(start.clone());
            let mut stack = vec![Frame {
                parents: self.sorted_in_scope_parents(start, scope, cmp),
                hash: start.clone(),
                next: 0,
            }];
            loop {
                let (done, pending) = {
                    let Some(frame) = stack.last_mut() else {
                        break;
                    };
                    if frame.next < frame.parents.len() {
                        let parent = frame.parents[frame.next].clone();
                        frame.next += 1;
                        (None, Some(parent))
                    } else {
                        (Some(frame.hash.clone()), None)
                    }
                };
                if let Some(parent) = pending {
                    if emitted.contains(&parent) {
                        continue;
                    }
                    if on_stack.contains(&parent) {
                        return Err(DagError::InvalidDag(parent));
                    }
                    on_stack.insert(parent.clone());
                    stack.push(Frame {
                        parents: self.sorted_in_scope_parents(&parent, scope, cmp),
                        hash: parent,
                        next: 0,
                    });
                } else if let Some(hash) = done {
                    stack.pop();
                    on_stack.remove(&hash);
                    emitted.insert(hash.clone());
                    output.push(hash);
                }
            }
        }
        Ok(output)
    }

    fn sort_asc_interleaved(
        &self,
        scope: &Set,
        cmp: &impl Fn(&Hash, &Hash) -> Ordering,
    ) -> Result<Vec<Hash>> {
        let mut indegree: std::collections::HashMap<Hash, usize> =
            std::collections::HashMap::with_capacity(scope.len());
        for hash in scope.iter() {
            let mut seen: Vec<&Hash> = Vec::new();
            for parent in self.parent_hashes(hash) {
                if scope.contains(parent) && !seen.contains(&parent) {
                    seen.push(parent);
                }
            }
            indegree.insert(hash.clone(), seen.len());
        }

        let mut ready: Vec<Hash> = scope
            .iter()
            .filter(|h| indegree.get(*h) == Some(&0))
            .cloned()
            .collect();
        let mut output: Vec<Hash> = Vec::with_capacity(scope.len());
        while !ready.is_empty() {
            let mut best = 0;
            for i in 1..ready.len() {
                if cmp(&ready[i], &ready[best]) == Ordering::Less {
                    best = i;
                }
            }
            let hash = ready.remove(best);
            for child in self.child_hashes(&hash).to_vec() {
                if let Some(count) = indegree.get_mut(&child) {
                    if *count > 0 {
                        *count -= 1;
                        if *count == 0 {
                            ready.push(child);
                        }
                    }
                }
            }
            output.push(hash);
        }
        if output.len() != scope.len() {
            let mut remaining: Vec<&Hash> = scope
                .iter()
                .filter(|h| indegree.get(*h) != Some(&0))
                .collect();
            remaining.sort();
            if let Some(hash) = remaining.first() {
                return Err(DagError::InvalidDag((*hash).clone()));
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitInfo;
    use crate::commit::Phase;

    fn commit(hash: &str, parents: &[&str]) -> CommitInfo {
        CommitInfo::new(hash, parents.iter().map(|p| Hash::from(*p)).collect())
    }

    fn set(hashes: &[&str]) -> Set {
        hashes.iter().map(|h| Hash::from(*h)).collect()
    }

    fn sample() -> BaseDag<CommitInfo> {
        // a-b-c-e
        //    \d
        BaseDag::new().add(vec![
            commit("a", &[]),
            commit("b", &["a"]),
            commit("c", &["b"]),
            commit("d", &["b"]),
            commit("e", &["c"]),
        ])
    }

    #[test]
    fn test_adjacency_symmetry() {
        let dag = sample();
        for info in dag.values() {
            for parent in info.parents() {
                assert!(
                    dag.child_hashes(parent).contains(info.hash()),
                    "child link missing for {} -> {}",
                    parent,
                    info.hash()
                );
            }
        }
        for hash in dag.hashes() {
            for child in dag.child_hashes(hash) {
                assert!(dag.parent_hashes(child).contains(hash));
            }
        }
    }

    #[test]
    fn test_lazy_parent_edges() {
        // Children can be inserted before their parents.
        let dag = BaseDag::new().add(vec![commit("b", &["a"])]);
        assert!(dag.child_hashes(&Hash::from("a")).contains(&Hash::from("b")));
        let dag = dag.add(vec![commit("a", &[])]);
        assert_eq!(dag.ancestors(&set(&["b"]), None), set(&["b", "a"]));
    }

    #[test]
    fn test_replace_updates_children() {
        let dag = sample().add(vec![commit("d", &["a"])]);
        assert!(!dag.child_hashes(&Hash::from("b")).contains(&Hash::from("d")));
        assert!(dag.child_hashes(&Hash::from("a")).contains(&Hash::from("d")));
    }

    #[test]
    fn test_remove_drops_edges() {
        let dag = sample().remove(&set(&["c"]));
        assert!(!dag.contains(&Hash::from("c")));
        assert!(!dag.child_hashes(&Hash::from("b")).contains(&Hash::from("c")));
        // "e" still records "c" as parent; the edge is simply dangling.
        assert_eq!(dag.ancestors(&set(&["e"]), None), set(&["e"]));
    }

    #[test]
    fn test_reachability() {
        let dag = sample();
        assert_eq!(dag.ancestors(&set(&["e"]), None), set(&["e", "c", "b", "a"]));
        assert_eq!(
            dag.descendants(&set(&["b"]), None),
            set(&["b", "c", "d", "e"])
        );
        assert_eq!(
            dag.ancestors(&set(&["e"]), Some(&set(&["c", "e"]))),
            set(&["e", "c"])
        );
        assert_eq!(dag.range(&set(&["b"]), &set(&["e"])), set(&["b", "c", "e"]));
        assert_eq!(dag.roots(&set(&["b", "c", "d"])), set(&["b"]));
        assert_eq!(dag.heads(&set(&["b", "c", "d"])), set(&["c", "d"]));
        assert_eq!(dag.gca(&set(&["d"]), &set(&["e"])), set(&["b"]));
        assert!(dag.is_ancestor(&Hash::from("a"), &Hash::from("e")));
        assert!(!dag.is_ancestor(&Hash::from("d"), &Hash::from("e")));
    }

    #[test]
    fn test_filter_and_present() {
        let dag = sample().add(vec![commit("p", &[]).with_phase(Phase::Public)]);
        assert_eq!(
            dag.filter(|c| c.phase == Phase::Public, None),
            set(&["p"])
        );
        assert_eq!(dag.present(&set(&["a", "zz", "d"])), set(&["a", "d"]));
    }

    #[test]
    fn test_sort_parents_before_children() {
        let dag = sample();
        let sorted = dag
            .sort_asc_by(&dag.all(), true, |a, b| a.hash.cmp(&b.hash))
            .unwrap();
        let position = |h: &str| sorted.iter().position(|x| x.as_str() == h).unwrap();
        assert!(position("a") < position("b"));
        assert!(position("b") < position("c"));
        assert!(position("b") < position("d"));
        assert!(position("c") < position("e"));
    }

    #[test]
    fn test_sort_deterministic_and_idempotent() {
        let dag = sample();
        let compare = |a: &CommitInfo, b: &CommitInfo| a.hash.cmp(&b.hash);
        let first = dag.sort_asc_by(&dag.all(), true, compare).unwrap();
        let second = dag
            .sort_asc_by(&first.iter().cloned().collect(), true, compare)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sort_detects_cycle() {
        let dag = BaseDag::new().add(vec![commit("x", &["y"]), commit("y", &["x"])]);
        let result = dag.sort_asc_by(&dag.all(), true, |a, b| a.hash.cmp(&b.hash));
        assert!(matches!(result, Err(DagError::InvalidDag(_))));
        let result = dag.sort_asc_by(&dag.all(), false, |a, b| a.hash.cmp(&b.hash));
        assert!(matches!(result, Err(DagError::InvalidDag(_))));
    }
}
