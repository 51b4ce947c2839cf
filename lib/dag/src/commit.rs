/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use serde::Deserialize;
use serde::Serialize;

use crate::basedag::GraphNode;
use crate::hash::Hash;

/// Commit lifecycle phase. Public commits are immutable from the client's
/// standpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Public,
    Draft,
}

/// The operation that replaced a commit with its successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationOp {
    Amend,
    Rebase,
    Fold,
    Split,
    Metaedit,
    Land,
}

/// Marks a commit as obsolete: it has been replaced by `hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessorInfo {
    pub hash: Hash,
    pub op: MutationOp,
}

/// Why a commit is present in a preview Dag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewType {
    RebaseRoot,
    RebaseDescendant,
    RebaseOptimisticRoot,
    RebaseOptimisticDescendant,
    HiddenRoot,
    HiddenDescendant,
    GotoDestination,
    GotoPreviousLocation,
    NonActionableCommit,
}

/// Extra lines of stable metadata shown with a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableCommitMetadata {
    pub value: String,
    pub description: String,
}

/// A visible commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: Hash,
    /// Direct parents, in order. Zero, one, or two (a merge).
    pub parents: Vec<Hash>,
    /// Synthetic ancestors connecting otherwise disconnected public
    /// commits. Rendered as dashed edges in place of missing parents.
    pub ancestors: Option<Vec<Hash>>,
    pub phase: Phase,
    /// True on the working parent (`.`). At most one commit has this set.
    pub is_dot: bool,
    pub bookmarks: Vec<String>,
    pub remote_bookmarks: Vec<String>,
    pub stable_commit_metadata: Option<Vec<StableCommitMetadata>>,
    /// Present iff the commit is obsolete.
    pub successor_info: Option<SuccessorInfo>,
    pub closest_predecessors: Option<Vec<Hash>>,
    /// Commit date, in milliseconds since the epoch.
    pub date: i64,
    /// Insertion order, assigned by the Dag. Stable across preview updates;
    /// reset to `None` to request a fresh number on the next insertion.
    pub seq_number: Option<u64>,
    pub preview_type: Option<PreviewType>,
}

impl CommitInfo {
    pub fn new(hash: impl Into<Hash>, parents: Vec<Hash>) -> Self {
        CommitInfo {
            hash: hash.into(),
            parents,
            ancestors: None,
            phase: Phase::Draft,
            is_dot: false,
            bookmarks: Vec::new(),
            remote_bookmarks: Vec::new(),
            stable_commit_metadata: None,
            successor_info: None,
            closest_predecessors: None,
            date: 0,
            seq_number: None,
            preview_type: None,
        }
    }

    /// True if the commit has been replaced by a successor.
    pub fn is_obsolete(&self) -> bool {
        self.successor_info.is_some()
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_date(mut self, date: i64) -> Self {
        self.date = date;
        self
    }

    pub fn with_dot(mut self) -> Self {
        self.is_dot = true;
        self
    }

    pub fn with_bookmark(mut self, name: &str) -> Self {
        self.bookmarks.push(name.to_string());
        self
    }

    pub fn with_remote_bookmark(mut self, name: &str) -> Self {
        self.remote_bookmarks.push(name.to_string());
        self
    }

    pub fn with_successor(mut self, hash: impl Into<Hash>, op: MutationOp) -> Self {
        self.successor_info = Some(SuccessorInfo {
            hash: hash.into(),
            op,
        });
        self
    }

    pub fn with_closest_predecessors(mut self, predecessors: Vec<Hash>) -> Self {
        self.closest_predecessors = Some(predecessors);
        self
    }

    pub fn with_ancestors(mut self, ancestors: Vec<Hash>) -> Self {
        self.ancestors = Some(ancestors);
        self
    }
}

impl GraphNode for CommitInfo {
    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn parents(&self) -> &[Hash] {
        &self.parents
    }
}
