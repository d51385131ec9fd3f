//!
//! orderedmap: a copy-on-write map that remembers insertion order.
//!
//! The crate provides [`OrderedMap`], an associative container with three properties
//! a plain `HashMap` does not give you:
//!
//! * **Insertion order**: iteration, [`OrderedMap::for_each`] and serialization visit
//!   entries in the order their keys were first inserted. Deleting a key removes it
//!   from the order without disturbing the others.
//! * **No silent overwrites**: inserting a key that is already present fails with
//!   [`MapError::KeyAlreadyExists`] instead of replacing the value.
//! * **Versioned values**: every mutation produces a new logical version. Clones are
//!   cheap and share storage until one of them is mutated, so an older handle never
//!   observes later changes.
//!
//! The canonical external form is an ordered list of `{"Key": .., "Value": ..}`
//! records, see [`map::Record`].
//!
//! ```
//! use orderedmap::OrderedMap;
//!
//! let map = OrderedMap::new()
//!     .must_set("a", 1)
//!     .must_set("b", 2);
//!
//! let json = map.to_json().unwrap();
//! assert_eq!(json, r#"[{"Key":"a","Value":1},{"Key":"b","Value":2}]"#);
//!
//! let decoded: OrderedMap<String, i64> = OrderedMap::from_json(&json).unwrap();
//! assert_eq!(decoded.keys().collect::<Vec<_>>(), ["a", "b"]);
//! ```
//!
//! The map performs no internal locking. Handles can be sent between threads when
//! `K` and `V` allow it, but a single handle is mutated through `&mut` only.

pub mod map;

pub use map::{MapError, OrderedMap, Record};

/// Result type used throughout the orderedmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the orderedmap library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured map errors from the map module
    #[error(transparent)]
    Map(MapError),

    /// The input could not be parsed into an ordered list of records
    #[error("failed to decode ordered map: {0}")]
    Decode(#[source] serde_json::Error),

    /// A key or value could not be encoded
    #[error("failed to encode ordered map: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Map(_) => "map",
            Error::Decode(_) | Error::Encode(_) => "serialize",
        }
    }

    /// Check if this error indicates a key collision.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error is a decoding failure of malformed input.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Check if this error is an encoding failure.
    pub fn is_encode_error(&self) -> bool {
        matches!(self, Error::Encode(_))
    }
}
