//! Stream tags: the serializable record a writer places before a value so a
//! reader can verify it is about to decode the shape it expects.
//!
//! `DefId`s are only meaningful within the store that allocated them, so a
//! tag is only portable between processes that ingest the same declarations
//! in the same order. The canonical text is carried for diagnostics.

use crate::error::{ReflectError, Result};
use crate::hierarchy::TypeHierarchy;
use crate::key::Key;
use crate::types::TypeDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTag {
    pub descriptor: TypeDescriptor,
    pub text: String,
}

impl KeyTag {
    pub fn new(key: &Key) -> Self {
        Self {
            descriptor: key.descriptor().clone(),
            text: key.as_str().to_owned(),
        }
    }

    /// Accept the tag only if it records exactly `expected`'s shape.
    pub fn verify(&self, expected: &Key) -> Result<()> {
        if self.descriptor == *expected.descriptor() {
            return Ok(());
        }
        Err(ReflectError::TagMismatch {
            expected: expected.as_str().to_owned(),
            recorded: self.text.clone(),
        })
    }

    /// Rebuild the recorded Key against `env`, re-validating the shape.
    pub fn to_key(&self, env: &dyn TypeHierarchy) -> Result<Key> {
        Key::of(env, self.descriptor.clone())
    }
}

impl From<&Key> for KeyTag {
    fn from(key: &Key) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
#[path = "../tests/tagging_tests.rs"]
mod tests;
