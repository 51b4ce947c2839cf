/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use thiserror::Error;

use crate::hash::Hash;

/// Errors surfaced by the commit graph.
///
/// The graph never retries and never logs on failure; errors are returned
/// synchronously and the originating value is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DagError {
    /// A strict lookup did not match any commit.
    #[error("unknown revision '{0}'")]
    NotFound(String),

    /// A hex prefix matched more than one commit.
    #[error("ambiguous identifier '{0}'")]
    AmbiguousPrefix(String),

    /// A cycle or structural inconsistency was detected while sorting.
    #[error("commit graph contains a cycle involving '{0}'")]
    InvalidDag(Hash),
}

pub type Result<T> = std::result::Result<T, DagError>;
