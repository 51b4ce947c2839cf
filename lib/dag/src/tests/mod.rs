/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

#[cfg(feature = "render")]
mod test_dag;

use crate::CommitInfo;
use crate::Hash;
use crate::Phase;
use crate::Set;

pub(crate) fn hashes(names: &[&str]) -> Vec<Hash> {
    names.iter().map(|n| Hash::from(*n)).collect()
}

pub(crate) fn set(names: &[&str]) -> Set {
    names.iter().map(|n| Hash::from(*n)).collect()
}

pub(crate) fn draft(hash: &str, parents: &[&str]) -> CommitInfo {
    CommitInfo::new(hash, hashes(parents))
}

pub(crate) fn public(hash: &str, parents: &[&str]) -> CommitInfo {
    draft(hash, parents).with_phase(Phase::Public)
}
