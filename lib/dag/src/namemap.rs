/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use im::OrdMap;
use im::OrdSet;

use crate::commit::CommitInfo;
use crate::hash::Hash;

/// Priority of the `.` (working parent) name. Lowest wins.
const DOT_PRIORITY: u8 = 1;
/// Priority of a local bookmark.
const BOOKMARK_PRIORITY: u8 = 10;
/// Priority of a remote bookmark (`remote/main`).
const REMOTE_BOOKMARK_PRIORITY: u8 = 55;
/// Priority of the hoisted tail of a remote bookmark (`main`).
const HOISTED_PRIORITY: u8 = 60;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct NameEntry {
    priority: u8,
    hash: Hash,
}

/// Index from human-friendly name to candidate commits.
///
/// Fully derived from the commits currently present: every entry is
/// contributed by some commit's dot flag, bookmark, or remote bookmark.
/// Resolution picks the entry with the lowest priority number, breaking
/// ties by the lexicographically smallest hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameMap {
    names: OrdMap<String, OrdSet<NameEntry>>,
}

fn contributions(info: &CommitInfo) -> Vec<(String, u8)> {
    let mut out = Vec::new();
    if info.is_dot {
        out.push((".".to_string(), DOT_PRIORITY));
    }
    for bookmark in &info.bookmarks {
        out.push((bookmark.clone(), BOOKMARK_PRIORITY));
    }
    for remote in &info.remote_bookmarks {
        out.push((remote.clone(), REMOTE_BOOKMARK_PRIORITY));
        if let Some((_, tail)) = remote.split_once('/') {
            if !tail.is_empty() {
                out.push((tail.to_string(), HOISTED_PRIORITY));
            }
        }
    }
    out
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of removals followed by insertions in one transition.
    /// A commit that is removed and re-added in the same batch keeps its
    /// names.
    pub(crate) fn update<'a>(
        &self,
        removed: impl IntoIterator<Item = &'a CommitInfo>,
        inserted: impl IntoIterator<Item = &'a CommitInfo>,
    ) -> NameMap {
        let mut names = self.names.clone();
        for info in removed {
            for (name, priority) in contributions(info) {
                let Some(entries) = names.get(name.as_str()) else {
                    continue;
                };
                let mut entries = entries.clone();
                entries.remove(&NameEntry {
                    priority,
                    hash: info.hash.clone(),
                });
                if entries.is_empty() {
                    names.remove(name.as_str());
                } else {
                    names.insert(name, entries);
                }
            }
        }
        for info in inserted {
            for (name, priority) in contributions(info) {
                let mut entries = names.get(name.as_str()).cloned().unwrap_or_default();
                entries.insert(NameEntry {
                    priority,
                    hash: info.hash.clone(),
                });
                names.insert(name, entries);
            }
        }
        NameMap { names }
    }

    /// The best candidate for `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<&Hash> {
        self.names
            .get(name)
            .and_then(|entries| entries.iter().next())
            .map(|entry| &entry.hash)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All entries, for debugging.
    pub fn entries(&self) -> Vec<(String, Vec<(u8, Hash)>)> {
        self.names
            .iter()
            .map(|(name, entries)| {
                (
                    name.clone(),
                    entries
                        .iter()
                        .map(|e| (e.priority, e.hash.clone()))
                        .collect(),
                )
            })
            .collect()
    }
}
