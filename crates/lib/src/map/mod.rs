//! Insertion-ordered map with copy-on-write versions.
//!
//! This module provides [`OrderedMap`], a key/value container that remembers the
//! order in which keys were first inserted and refuses to overwrite an existing key.
//!
//! # Core Types
//!
//! - [`OrderedMap`] - The container itself
//! - [`Record`] - A `{Key, Value}` pair, the unit of the serialized form
//! - [`MapError`] - Errors raised by map mutations
//! - [`Iter`] - Borrowing iterator in insertion order
//!
//! # Operations
//!
//! | Operation   | Persistent (returns a new version) | In place on a handle   |
//! |-------------|------------------------------------|------------------------|
//! | insert      | [`OrderedMap::set`], [`OrderedMap::must_set`] | [`OrderedMap::insert`] |
//! | delete      | [`OrderedMap::delete`]             | [`OrderedMap::remove`] |
//! | decode      | [`OrderedMap::from_json`]          | [`OrderedMap::replace_from_json`] |
//!
//! Both columns give the same isolation guarantee: versions held elsewhere are
//! never modified.
//!
//! ```
//! use orderedmap::OrderedMap;
//!
//! let mut map = OrderedMap::default();
//! map.insert("first item", "a").unwrap();
//! map.insert("this is the second item", "b").unwrap();
//! map.insert("3rd item", "c").unwrap();
//!
//! let snapshot = map.clone();
//! map.remove("this is the second item");
//!
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["first item", "3rd item"]);
//! assert_eq!(snapshot.len(), 3);
//! ```

pub mod errors;
mod implementation;
pub mod record;

pub use errors::MapError;
pub use implementation::{Iter, OrderedMap};
pub use record::Record;
