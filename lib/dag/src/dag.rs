/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::cmp::Ordering;
use std::sync::Arc;

use lru_cache::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::basedag::BaseDag;
use crate::commit::CommitInfo;
use crate::commit::MutationOp;
use crate::commit::Phase;
use crate::commit::PreviewType;
use crate::commit::SuccessorInfo;
use crate::errors::DagError;
use crate::errors::Result;
use crate::hash::Hash;
use crate::mutationdag::MutationDag;
use crate::namemap::NameMap;
use crate::set::Set;

/// Prefix prepended to a rebased commit's hash to form the synthetic hash
/// of its optimistic successor in a rebase preview.
pub const REBASE_SUCC_PREFIX: &str = "OPTIMISTIC_REBASE_SUCC:";

/// Bound on the memoisation caches attached to each Dag value.
const CACHE_CAPACITY: usize = 1000;

/// Cache key: the ordered hashes of the input set, or `None` for the
/// default (whole-graph) input.
type CacheKey = Option<Vec<Hash>>;

#[cfg(feature = "render")]
type RenderRows = Vec<(CommitInfo, renderdag::GraphRow<Hash>)>;

struct Caches {
    all: Mutex<Option<Set>>,
    roots: Mutex<LruCache<CacheKey, Set>>,
    heads: Mutex<LruCache<CacheKey, Set>>,
    subset_for_rendering: Mutex<LruCache<(CacheKey, bool), Set>>,
    default_sort_asc: Mutex<LruCache<CacheKey, Vec<Hash>>>,
    #[cfg(feature = "render")]
    render_rows: Mutex<LruCache<CacheKey, RenderRows>>,
}

impl Default for Caches {
    fn default() -> Self {
        Caches {
            all: Mutex::new(None),
            roots: Mutex::new(LruCache::new(CACHE_CAPACITY)),
            heads: Mutex::new(LruCache::new(CACHE_CAPACITY)),
            subset_for_rendering: Mutex::new(LruCache::new(CACHE_CAPACITY)),
            default_sort_asc: Mutex::new(LruCache::new(CACHE_CAPACITY)),
            #[cfg(feature = "render")]
            render_rows: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        }
    }
}

fn cache_key(set: Option<&Set>) -> CacheKey {
    set.map(|s| s.to_vec())
}

/// The commit graph: visible commits, the mutation graph, and the name
/// index, composed as one immutable value.
///
/// Every update returns a new `Dag`; existing references stay valid and the
/// underlying storage is structurally shared. Pure queries are memoised in
/// caches owned by the value, so they die with it.
#[derive(Clone)]
pub struct Dag {
    commits: BaseDag<CommitInfo>,
    mutation: MutationDag,
    names: NameMap,
    next_seq: u64,
    caches: Arc<Caches>,
}

impl Default for Dag {
    fn default() -> Self {
        Dag {
            commits: BaseDag::new(),
            mutation: MutationDag::new(),
            names: NameMap::new(),
            next_seq: 0,
            caches: Arc::new(Caches::default()),
        }
    }
}

/// Serialisable snapshot of the graph, for the debug surface.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DebugState {
    pub commits: Vec<(Hash, Vec<Hash>)>,
    pub mutations: Vec<(Hash, Vec<Hash>)>,
    pub names: Vec<(String, Vec<(u8, Hash)>)>,
    pub next_seq_number: u64,
}

/// The default display order: draft before public, then newer insertions
/// first, then older dates first, then larger hashes first.
pub fn default_compare(a: &CommitInfo, b: &CommitInfo) -> Ordering {
    if a.phase != b.phase {
        return if a.phase == Phase::Draft {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    if let (Some(x), Some(y)) = (a.seq_number, b.seq_number) {
        if x != y {
            return y.cmp(&x);
        }
    }
    if a.date != b.date {
        return a.date.cmp(&b.date);
    }
    b.hash.cmp(&a.hash)
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible commit graph.
    pub fn commits(&self) -> &BaseDag<CommitInfo> {
        &self.commits
    }

    /// The mutation graph.
    pub fn mutation(&self) -> &MutationDag {
        &self.mutation
    }

    /// The name index.
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    pub fn next_seq_number(&self) -> u64 {
        self.next_seq
    }

    pub fn get(&self, hash: &Hash) -> Option<&CommitInfo> {
        self.commits.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.commits.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    fn with_parts(
        &self,
        commits: BaseDag<CommitInfo>,
        mutation: MutationDag,
        names: NameMap,
        next_seq: u64,
    ) -> Dag {
        Dag {
            commits,
            mutation,
            names,
            next_seq,
            caches: Arc::new(Caches::default()),
        }
    }

    /// Insert or replace a batch of commits.
    ///
    /// Assigns `seq_number` to commits that lack one, records mutation edges
    /// from `closest_predecessors` and `successor_info`, keeps the name
    /// index in sync, and clears any previous working parent when the batch
    /// carries a new one (the last dot in the batch wins).
    pub fn add(&self, commits: impl IntoIterator<Item = CommitInfo>) -> Dag {
        let mut next_seq = self.next_seq;
        let mut batch: Vec<CommitInfo> = Vec::new();
        for mut info in commits {
            if info.seq_number.is_none() {
                if let Some(existing) = self.commits.get(&info.hash) {
                    info.seq_number = existing.seq_number;
                }
            }
            if info.seq_number.is_none() {
                info.seq_number = Some(next_seq);
                next_seq += 1;
            }
            batch.push(info);
        }

        // At most one working parent.
        let incoming_dot: Option<Hash> = batch
            .iter()
            .filter(|c| c.is_dot)
            .next_back()
            .map(|c| c.hash.clone());
        if let Some(dot) = &incoming_dot {
            for info in batch.iter_mut() {
                if info.is_dot && &info.hash != dot {
                    info.is_dot = false;
                }
            }
            if let Some(previous) = self.names.resolve(".") {
                if previous != dot && !batch.iter().any(|c| &c.hash == previous) {
                    if let Some(mut cleared) = self.commits.get(previous).cloned() {
                        cleared.is_dot = false;
                        batch.push(cleared);
                    }
                }
            }
        }

        debug!(target: "dag::ops", count = batch.len(), "add commits");

        let removed: Vec<CommitInfo> = batch
            .iter()
            .filter_map(|c| self.commits.get(&c.hash).cloned())
            .collect();
        let names = self.names.update(removed.iter(), batch.iter());

        let mut mutations: Vec<(Hash, Hash)> = Vec::new();
        for info in &batch {
            if let Some(predecessors) = &info.closest_predecessors {
                for predecessor in predecessors {
                    mutations.push((predecessor.clone(), info.hash.clone()));
                }
            }
            if let Some(successor) = &info.successor_info {
                mutations.push((info.hash.clone(), successor.hash.clone()));
            }
        }
        let mutation = if mutations.is_empty() {
            self.mutation.clone()
        } else {
            self.mutation.add_mutations(mutations)
        };

        let commits = self.commits.add(batch);
        self.with_parts(commits, mutation, names, next_seq)
    }

    /// Remove commits from the visible graph and the name index. The
    /// mutation graph intentionally keeps its nodes.
    pub fn remove(&self, set: &Set) -> Dag {
        let removed: Vec<CommitInfo> = set
            .iter()
            .filter_map(|h| self.commits.get(h).cloned())
            .collect();
        if removed.is_empty() {
            return self.clone();
        }
        debug!(target: "dag::ops", count = removed.len(), "remove commits");
        let names = self.names.update(removed.iter(), []);
        let commits = self.commits.remove(set);
        self.with_parts(commits, self.mutation.clone(), names, self.next_seq)
    }

    /// Record mutation edges independently of commit ingestion.
    pub fn add_mutations(&self, pairs: impl IntoIterator<Item = (Hash, Hash)>) -> Dag {
        let mutation = self.mutation.add_mutations(pairs);
        self.with_parts(
            self.commits.clone(),
            mutation,
            self.names.clone(),
            self.next_seq,
        )
    }

    /// Map each hash in `set` through `f`: `Some` inserts or replaces,
    /// `None` removes.
    pub fn replace_with(
        &self,
        set: &Set,
        f: impl Fn(&Hash, Option<&CommitInfo>) -> Option<CommitInfo>,
    ) -> Dag {
        let mut inserted: Vec<CommitInfo> = Vec::new();
        let mut removed: Vec<Hash> = Vec::new();
        for hash in set.iter() {
            match f(hash, self.commits.get(hash)) {
                Some(info) => inserted.push(info),
                None => {
                    if self.commits.contains(hash) {
                        removed.push(hash.clone());
                    }
                }
            }
        }
        let mut next = self.clone();
        if !removed.is_empty() {
            next = next.remove(&removed.into_iter().collect());
        }
        if !inserted.is_empty() {
            next = next.add(inserted);
        }
        next
    }

    // ---- Filters ----

    pub fn obsolete(&self, set: Option<&Set>) -> Set {
        self.commits.filter(|c| c.is_obsolete(), set)
    }

    pub fn non_obsolete(&self, set: Option<&Set>) -> Set {
        self.commits.filter(|c| !c.is_obsolete(), set)
    }

    pub fn draft(&self, set: Option<&Set>) -> Set {
        self.commits.filter(|c| c.phase == Phase::Draft, set)
    }

    pub fn public_(&self, set: Option<&Set>) -> Set {
        self.commits.filter(|c| c.phase == Phase::Public, set)
    }

    // ---- Cached queries ----

    /// Every known hash.
    pub fn all(&self) -> Set {
        let mut cached = self.caches.all.lock();
        match &*cached {
            Some(set) => set.clone(),
            None => {
                let set = self.commits.all();
                *cached = Some(set.clone());
                set
            }
        }
    }

    pub fn roots(&self, set: Option<&Set>) -> Set {
        let key = cache_key(set);
        if let Some(cached) = self.caches.roots.lock().get_mut(&key) {
            return cached.clone();
        }
        let result = match set {
            Some(set) => self.commits.roots(set),
            None => self.commits.roots(&self.all()),
        };
        self.caches.roots.lock().insert(key, result.clone());
        result
    }

    pub fn heads(&self, set: Option<&Set>) -> Set {
        let key = cache_key(set);
        if let Some(cached) = self.caches.heads.lock().get_mut(&key) {
            return cached.clone();
        }
        let result = match set {
            Some(set) => self.commits.heads(set),
            None => self.commits.heads(&self.all()),
        };
        self.caches.heads.lock().insert(key, result.clone());
        result
    }

    // ---- Uncached reachability, delegated to the commit graph ----

    pub fn ancestors(&self, set: &Set, within: Option<&Set>) -> Set {
        self.commits.ancestors(set, within)
    }

    pub fn descendants(&self, set: &Set, within: Option<&Set>) -> Set {
        self.commits.descendants(set, within)
    }

    pub fn parents(&self, set: &Set) -> Set {
        self.commits.parents(set)
    }

    pub fn children(&self, set: &Set) -> Set {
        self.commits.children(set)
    }

    pub fn range(&self, roots: &Set, heads: &Set) -> Set {
        self.commits.range(roots, heads)
    }

    pub fn gca(&self, a: &Set, b: &Set) -> Set {
        self.commits.gca(a, b)
    }

    pub fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> bool {
        self.commits.is_ancestor(ancestor, descendant)
    }

    pub fn present(&self, set: &Set) -> Set {
        self.commits.present(set)
    }

    // ---- Sorting ----

    /// Sort ascending with the default comparator, keeping stacks
    /// contiguous. Memoised per input set.
    pub fn sort_asc(&self, set: Option<&Set>) -> Result<Vec<Hash>> {
        let key = cache_key(set);
        if let Some(cached) = self.caches.default_sort_asc.lock().get_mut(&key) {
            return Ok(cached.clone());
        }
        let scope = match set {
            Some(set) => set.clone(),
            None => self.all(),
        };
        let result = self.commits.sort_asc_by(&scope, true, default_compare)?;
        self.caches
            .default_sort_asc
            .lock()
            .insert(key, result.clone());
        Ok(result)
    }

    /// `sort_asc` reversed.
    pub fn sort_desc(&self, set: Option<&Set>) -> Result<Vec<Hash>> {
        let mut sorted = self.sort_asc(set)?;
        sorted.reverse();
        Ok(sorted)
    }

    // ---- Name resolution ----

    /// Resolve a name to a commit: exact hash first, then the name index,
    /// then an unambiguous hex prefix. Returns `None` when nothing matches
    /// or a prefix is ambiguous.
    pub fn resolve(&self, name: &str) -> Option<&CommitInfo> {
        if let Some(info) = self.commits.get_by_str(name) {
            return Some(info);
        }
        if let Some(hash) = self.names.resolve(name) {
            return self.commits.get(hash);
        }
        match self.prefix_lookup(name) {
            PrefixMatch::One(hash) => self.commits.get(&hash),
            PrefixMatch::None | PrefixMatch::Ambiguous => None,
        }
    }

    /// Like [`Dag::resolve`], but reports why resolution failed.
    pub fn resolve_required(&self, name: &str) -> Result<&CommitInfo> {
        if let Some(info) = self.resolve(name) {
            return Ok(info);
        }
        match self.prefix_lookup(name) {
            PrefixMatch::Ambiguous => Err(DagError::AmbiguousPrefix(name.to_string())),
            _ => Err(DagError::NotFound(name.to_string())),
        }
    }

    fn prefix_lookup(&self, name: &str) -> PrefixMatch {
        if name.is_empty()
            || name.len() > 39
            || !name.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
        {
            return PrefixMatch::None;
        }
        let mut found: Option<Hash> = None;
        for hash in self.commits.hashes() {
            if hash.as_str().starts_with(name) {
                if found.is_some() {
                    return PrefixMatch::Ambiguous;
                }
                found = Some(hash.clone());
            }
        }
        match found {
            Some(hash) => PrefixMatch::One(hash),
            None => PrefixMatch::None,
        }
    }

    // ---- Rendering subset ----

    /// Choose which commits to draw: hide unnamed public commits that no
    /// draft hangs off, and (optionally) the interior of obsolete stacks.
    pub fn subset_for_rendering(&self, set: Option<&Set>, condense_obsolete_stacks: bool) -> Set {
        let key = (cache_key(set), condense_obsolete_stacks);
        if let Some(cached) = self.caches.subset_for_rendering.lock().get_mut(&key) {
            return cached.clone();
        }

        let all = match set {
            Some(set) => self.commits.present(set),
            None => self.all(),
        };
        let draft = self.draft(Some(&all));
        let unnamed_public = self.commits.filter(
            |c| {
                c.phase == Phase::Public
                    && c.bookmarks.is_empty()
                    && c.remote_bookmarks.is_empty()
                    && c.stable_commit_metadata
                        .as_ref()
                        .map_or(true, |m| m.is_empty())
                    && !c.is_dot
            },
            Some(&all),
        );
        let to_hide_public = unnamed_public.subtract(&self.commits.parents(&draft));
        let to_hide = if condense_obsolete_stacks {
            let obsolete = self.obsolete(Some(&all));
            let to_keep = self
                .commits
                .parents(&draft.subtract(&obsolete))
                .union(&self.commits.roots(&obsolete))
                .union(&self.commits.heads(&obsolete));
            obsolete.subtract(&to_keep).union(&to_hide_public)
        } else {
            to_hide_public
        };
        let result = all.subtract(&to_hide);

        self.caches
            .subset_for_rendering
            .lock()
            .insert(key, result.clone());
        result
    }

    // ---- Previews ----

    /// The synthetic hash of the optimistic successor created for `hash` in
    /// a rebase preview.
    pub fn rebase_succ_hash(hash: &Hash) -> Hash {
        Hash::from(format!("{}{}", REBASE_SUCC_PREFIX, hash))
    }

    /// Preview `rebase -r src_set -d dest` at time `now`.
    ///
    /// Commits whose descendants would be orphaned are duplicated: the
    /// predecessor copy keeps its hash and becomes obsolete, while an
    /// optimistic successor appears at the new location. Other source
    /// commits simply move. Finishes with a [`Dag::cleanup`] pass so
    /// obsolete stacks that became dangling are pruned.
    ///
    /// Known gaps, kept as-is: the preview does not copy a mutation
    /// relation between two commits that are both in `src_set`, and it does
    /// not suppress a rebase whose source is an ancestor of `dest` only
    /// through predecessor edges.
    pub fn rebase(&self, src_set: &Set, dest: Option<&Hash>, now: i64) -> Dag {
        let Some(dest) = dest else {
            return self.clone();
        };
        let already_rebased = self
            .commits
            .descendants(&Set::from(dest), Some(src_set));
        let src = self.draft(Some(&self.present(src_set).subtract(&already_rebased)));
        if src.is_empty() {
            return self.clone();
        }
        let src_roots = self.commits.roots(&src);
        let orphaned = self
            .commits
            .range(&src, &self.draft(None))
            .subtract(&src);
        let duplicated = self.commits.ancestors(&orphaned, None).intersect(&src);
        debug!(
            target: "dag::preview",
            src = src.len(),
            orphaned = orphaned.len(),
            duplicated = duplicated.len(),
            "rebase preview"
        );

        let new_parents = |hash: &Hash| -> Vec<Hash> {
            let parents: Set = self.commits.parent_hashes(hash).iter().cloned().collect();
            let mut base = parents.intersect(&src);
            if base.is_empty() {
                base = self
                    .commits
                    .heads(&self.commits.ancestors(&parents, None).intersect(&src));
            }
            let chosen: Vec<Hash> = if base.is_empty() {
                vec![dest.clone()]
            } else {
                base.to_vec()
            };
            chosen
                .into_iter()
                .map(|p| {
                    if duplicated.contains(&p) {
                        Self::rebase_succ_hash(&p)
                    } else {
                        p
                    }
                })
                .collect()
        };

        let mut edits: Vec<CommitInfo> = Vec::new();
        for hash in src.iter() {
            let Some(info) = self.commits.get(hash) else {
                continue;
            };
            let parents = new_parents(hash);
            let is_root = src_roots.contains(hash);
            if duplicated.contains(hash) {
                let succ_hash = Self::rebase_succ_hash(hash);
                let mut predecessor = info.clone();
                predecessor.successor_info = Some(SuccessorInfo {
                    hash: succ_hash.clone(),
                    op: MutationOp::Rebase,
                });
                edits.push(predecessor);

                let mut successor = info.clone();
                successor.hash = succ_hash;
                successor.parents = parents;
                successor.seq_number = None;
                successor.date = now;
                successor.is_dot = false;
                successor.successor_info = None;
                successor.closest_predecessors = Some(vec![hash.clone()]);
                successor.preview_type = Some(if is_root {
                    PreviewType::RebaseOptimisticRoot
                } else {
                    PreviewType::RebaseOptimisticDescendant
                });
                edits.push(successor);
            } else {
                let mut moved = info.clone();
                moved.parents = parents;
                moved.seq_number = None;
                moved.date = now;
                moved.preview_type = Some(if is_root {
                    PreviewType::RebaseRoot
                } else {
                    PreviewType::RebaseDescendant
                });
                edits.push(moved);
            }
        }

        let next = self.add(edits);
        next.cleanup(Some(&self.commits.parents(&src_roots)))
    }

    /// Remove obsolete commits that no longer have non-obsolete
    /// descendants. Ancestors of the working parent are never removed.
    pub fn cleanup(&self, start_heads: Option<&Set>) -> Dag {
        let obsolete = self.obsolete(None);
        let scope = match self.resolve(".") {
            Some(dot) => {
                let dot_hash = dot.hash.clone();
                obsolete.subtract(&self.commits.ancestors(&Set::from(dot_hash), None))
            }
            None => obsolete,
        };
        let mut heads = self.commits.heads(&self.draft(None)).intersect(&scope);
        if let Some(start_heads) = start_heads {
            heads = heads.intersect(start_heads);
        }
        if heads.is_empty() {
            return self.clone();
        }
        let to_remove = self.commits.ancestors(&heads, Some(&scope));
        debug!(target: "dag::preview", count = to_remove.len(), "cleanup");
        self.remove(&to_remove)
    }

    /// Bump `date` to `now` on `set` (and descendants, by default), floating
    /// the stack to the top of date-sorted views.
    pub fn touch(&self, set: &Set, now: i64, include_descendants: bool) -> Dag {
        let target = if include_descendants {
            self.commits.descendants(set, None)
        } else {
            self.commits.present(set)
        };
        self.replace_with(&target, |_, info| {
            info.map(|info| {
                let mut info = info.clone();
                info.date = now;
                info
            })
        })
    }

    /// For each commit, follow the mutation graph to its final visible
    /// successor. Commits without visible successors are kept as-is; a
    /// single-commit input with several candidate successors is narrowed to
    /// the top of the stack in the visible graph.
    pub fn follow_successors(&self, set: &Set) -> Set {
        let mut result: Vec<Hash> = Vec::new();
        for hash in set.iter() {
            let start = Set::from(hash);
            let visible = self
                .commits
                .present(&self.mutation.descendants(&start).subtract(&start));
            if visible.is_empty() {
                result.push(hash.clone());
                continue;
            }
            let finals = self.mutation.heads(&visible);
            if finals.len() <= 1 || set.len() > 1 {
                result.extend(finals.to_vec());
            } else {
                let tops = self
                    .commits
                    .heads(&self.commits.ancestors(&finals, None));
                result.extend(tops.to_vec());
            }
        }
        result.into_iter().collect()
    }

    /// Connect disconnected public roots with synthetic dashed edges, in
    /// date order. An approximation until richer ancestry data is
    /// available; equal dates fall back to hash order.
    pub fn force_connect_public(&self) -> Dag {
        let roots = self.commits.roots(&self.public_(None));
        if roots.len() <= 1 {
            return self.clone();
        }
        let mut infos: Vec<&CommitInfo> =
            roots.iter().filter_map(|h| self.commits.get(h)).collect();
        infos.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.hash.cmp(&b.hash)));
        let mut edits: Vec<CommitInfo> = Vec::new();
        for pair in infos.windows(2) {
            let (older, newer) = (pair[0], pair[1]);
            let mut connected = newer.clone();
            if !connected.parents.contains(&older.hash) {
                connected.parents.push(older.hash.clone());
            }
            connected.ancestors = Some(vec![older.hash.clone()]);
            edits.push(connected);
        }
        self.add(edits)
    }

    #[cfg(feature = "render")]
    pub(crate) fn cached_render_rows(&self, set: Option<&Set>) -> Option<RenderRows> {
        self.caches
            .render_rows
            .lock()
            .get_mut(&cache_key(set))
            .map(|rows| rows.clone())
    }

    #[cfg(feature = "render")]
    pub(crate) fn store_render_rows(&self, set: Option<&Set>, rows: &RenderRows) {
        self.caches
            .render_rows
            .lock()
            .insert(cache_key(set), rows.clone());
    }

    /// Serialisable snapshot for debugging.
    pub fn get_debug_state(&self) -> DebugState {
        DebugState {
            commits: self
                .commits
                .values()
                .map(|c| (c.hash.clone(), c.parents.clone()))
                .collect(),
            mutations: self.mutation.edges(),
            names: self.names.entries(),
            next_seq_number: self.next_seq,
        }
    }
}

enum PrefixMatch {
    None,
    One(Hash),
    Ambiguous,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, parents: &[&str]) -> CommitInfo {
        CommitInfo::new(hash, parents.iter().map(|p| Hash::from(*p)).collect())
    }

    #[test]
    fn test_prefix_resolve() {
        let dag = Dag::new().add(vec![commit("a1b2c3d4", &[]), commit("a1b2cfff", &[])]);
        assert_eq!(dag.resolve("a1b2c"), None);
        assert_eq!(
            dag.resolve("a1b2c3").map(|c| c.hash.clone()),
            Some(Hash::from("a1b2c3d4"))
        );
        assert_eq!(
            dag.resolve("a1b2c3d4").map(|c| c.hash.clone()),
            Some(Hash::from("a1b2c3d4"))
        );
        assert_eq!(
            dag.resolve_required("a1b2c"),
            Err(DagError::AmbiguousPrefix("a1b2c".to_string()))
        );
        assert_eq!(
            dag.resolve_required("zz"),
            Err(DagError::NotFound("zz".to_string()))
        );
    }

    #[test]
    fn test_bookmark_priority_beats_hoisted() {
        let dag = Dag::new().add(vec![
            commit("1111", &[]).with_remote_bookmark("remote/main"),
            commit("2222", &[]).with_bookmark("main"),
        ]);
        assert_eq!(
            dag.resolve("main").map(|c| c.hash.clone()),
            Some(Hash::from("2222"))
        );
    }

    #[test]
    fn test_seq_number_assignment() {
        let dag = Dag::new().add(vec![commit("a", &[]), commit("b", &["a"])]);
        assert_eq!(dag.get(&Hash::from("a")).unwrap().seq_number, Some(0));
        assert_eq!(dag.get(&Hash::from("b")).unwrap().seq_number, Some(1));
        assert_eq!(dag.next_seq_number(), 2);
        // Re-inserting keeps the original number.
        let dag = dag.add(vec![commit("a", &[]).with_date(5)]);
        assert_eq!(dag.get(&Hash::from("a")).unwrap().seq_number, Some(0));
        assert_eq!(dag.next_seq_number(), 2);
    }

    #[test]
    fn test_single_dot() {
        let dag = Dag::new().add(vec![commit("a", &[]).with_dot(), commit("b", &["a"])]);
        let dag = dag.add(vec![commit("c", &["b"]).with_dot()]);
        let dots: Vec<&CommitInfo> = dag.commits().values().filter(|c| c.is_dot).collect();
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0].hash, Hash::from("c"));
        assert_eq!(
            dag.resolve(".").map(|c| c.hash.clone()),
            Some(Hash::from("c"))
        );
    }

    #[test]
    fn test_add_records_mutation_edges() {
        let dag = Dag::new().add(vec![
            commit("a2", &[]).with_closest_predecessors(vec![Hash::from("a1")]),
        ]);
        assert!(dag.mutation().contains(&Hash::from("a1")));
        assert_eq!(dag.mutation().successors(&Hash::from("a1")), &[Hash::from("a2")]);
        let dag = dag.add(vec![commit("b1", &[]).with_successor("b2", MutationOp::Amend)]);
        assert_eq!(dag.mutation().successors(&Hash::from("b1")), &[Hash::from("b2")]);
    }

    #[test]
    fn test_mutation_survives_remove() {
        let dag = Dag::new()
            .add(vec![
                commit("a1", &[]).with_successor("a2", MutationOp::Amend),
                commit("a2", &[]),
            ])
            .remove(&Set::from(Hash::from("a1")));
        assert!(!dag.contains(&Hash::from("a1")));
        assert_eq!(dag.mutation().successors(&Hash::from("a1")), &[Hash::from("a2")]);
    }
}
