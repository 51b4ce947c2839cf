/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! In-memory commit DAG powering smartlog-style UIs.
//!
//! Two graphs are superimposed: the visible commit graph ([`BaseDag`] over
//! [`CommitInfo`]) and the mutation graph ([`MutationDag`]) recording which
//! commits replaced which. [`Dag`] composes them with a name index
//! ([`NameMap`]) into a single immutable value with structural sharing:
//! ingestion and preview operations (`rebase`, `cleanup`, `touch`) return
//! new values while prior ones stay valid, which is what makes cheap
//! optimistic previews possible.
//!
//! Queries are pure: reachability and set algebra ([`Set`]), name
//! resolution, deterministic display sorting, and (behind the default
//! `render` feature) the row stream handed to the graph renderer.

mod basedag;
mod commit;
mod dag;
mod errors;
mod hash;
mod mutationdag;
mod namemap;
#[cfg(feature = "render")]
mod render;
mod set;

#[cfg(test)]
mod tests;

pub use basedag::BaseDag;
pub use basedag::GraphNode;
pub use commit::CommitInfo;
pub use commit::MutationOp;
pub use commit::Phase;
pub use commit::PreviewType;
pub use commit::StableCommitMetadata;
pub use commit::SuccessorInfo;
pub use dag::default_compare;
pub use dag::Dag;
pub use dag::DebugState;
pub use dag::REBASE_SUCC_PREFIX;
pub use errors::DagError;
pub use errors::Result;
pub use hash::Hash;
pub use mutationdag::MutationDag;
pub use mutationdag::MutationNode;
pub use namemap::NameMap;
#[cfg(feature = "render")]
pub use render::glyph;
#[cfg(feature = "render")]
pub use render::RenderStep;
pub use set::Set;
