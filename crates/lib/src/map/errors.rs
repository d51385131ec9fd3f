//! Error types for ordered map operations.
//!
//! This module defines the structured errors raised when a mutation would break
//! the key uniqueness guarantee of an [`OrderedMap`](super::OrderedMap).

use std::fmt::Debug;

use thiserror::Error;

/// Structured error types for ordered map operations.
///
/// Every variant is recoverable: the map that produced it is left unmodified,
/// and the caller decides whether the condition is fatal.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// A key was inserted (or decoded) while already present in the map.
    ///
    /// The key is stored in its `Debug` rendering, so string keys are quoted:
    /// `key "X" already exists`.
    #[error("key {key} already exists")]
    KeyAlreadyExists { key: String },
}

impl MapError {
    /// Build a [`MapError::KeyAlreadyExists`] for the given key.
    pub fn key_already_exists<K: Debug + ?Sized>(key: &K) -> Self {
        MapError::KeyAlreadyExists {
            key: format!("{key:?}"),
        }
    }

    /// Check if this error reports a duplicate key
    pub fn is_already_exists(&self) -> bool {
        matches!(self, MapError::KeyAlreadyExists { .. })
    }

    /// Get the rendered key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            MapError::KeyAlreadyExists { key } => Some(key),
        }
    }
}

// Conversion from MapError to the main Error type
impl From<MapError> for crate::Error {
    fn from(err: MapError) -> Self {
        crate::Error::Map(err)
    }
}
