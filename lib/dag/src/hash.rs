/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// A commit hash: a short identifier, typically 12 to 40 hex characters,
/// although preview code also synthesises non-hex hashes. Equality is string
/// equality; cloning is cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(Arc<str>);

impl Hash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Hash {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Hash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Hash {
    fn from(value: &str) -> Self {
        Hash(Arc::from(value))
    }
}

impl From<String> for Hash {
    fn from(value: String) -> Self {
        Hash(Arc::from(value.as_str()))
    }
}

impl From<&Hash> for Hash {
    fn from(value: &Hash) -> Self {
        value.clone()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Hash::from(value))
    }
}
