//! Canonical serialized form of an [`OrderedMap`].
//!
//! A map is encoded as an ordered sequence of [`Record`]s. In JSON that is an
//! array of `{"Key": .., "Value": ..}` objects whose position in the array is the
//! insertion order:
//!
//! ```text
//! [{"Key":"a","Value":1},{"Key":"b","Value":2}]
//! ```
//!
//! Decoding replays an insert per record, in array order, into a fresh map. Two
//! records sharing a key fail the whole decode with `KeyAlreadyExists`.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, Error as _, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::OrderedMap;
use crate::{Error, Result};

/// Upper bound on pre-allocation driven by an untrusted length hint.
const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// Field names of a record in the serialized form.
const RECORD_FIELDS: &[&str] = &["Key", "Value"];

/// A single `{key, value}` pair as it appears in the serialized form.
///
/// Records only decode from objects (maps) carrying both `Key` and `Value`;
/// the positional `[key, value]` form is rejected. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record<K, V> {
    #[serde(rename = "Key")]
    pub key: K,
    #[serde(rename = "Value")]
    pub value: V,
}

impl<K, V> Record<K, V> {
    /// Creates a record from a key and its value
    ///
    /// ```
    /// use orderedmap::{OrderedMap, Record};
    ///
    /// let map = OrderedMap::from_records([Record::new("a", 1), Record::new("b", 2)]).unwrap();
    /// assert_eq!(map.to_records()[1], Record::new("b", 2));
    /// ```
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<'de, K, V> Deserialize<'de> for Record<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        enum Field {
            Key,
            Value,
            #[serde(other)]
            Unknown,
        }

        struct RecordVisitor<K, V> {
            marker: PhantomData<fn() -> Record<K, V>>,
        }

        impl<'de, K, V> Visitor<'de> for RecordVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Record<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object with Key and Value fields")
            }

            // Only the object form is accepted, so no visit_seq.
            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut key = None;
                let mut value = None;

                while let Some(field) = map.next_key::<Field>()? {
                    match field {
                        Field::Key => {
                            if key.is_some() {
                                return Err(A::Error::duplicate_field("Key"));
                            }
                            key = Some(map.next_value()?);
                        }
                        Field::Value => {
                            if value.is_some() {
                                return Err(A::Error::duplicate_field("Value"));
                            }
                            value = Some(map.next_value()?);
                        }
                        Field::Unknown => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }

                Ok(Record {
                    key: key.ok_or_else(|| A::Error::missing_field("Key"))?,
                    value: value.ok_or_else(|| A::Error::missing_field("Value"))?,
                })
            }
        }

        deserializer.deserialize_struct(
            "Record",
            RECORD_FIELDS,
            RecordVisitor {
                marker: PhantomData,
            },
        )
    }
}

impl<K, V> From<(K, V)> for Record<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Returns the entries as records, in insertion order
    pub fn to_records(&self) -> Vec<Record<K, V>> {
        let mut records = Vec::with_capacity(self.len());
        let Ok(()) = self.for_each(|key, value| {
            records.push(Record::new(key.clone(), value.clone()));
            Ok::<(), std::convert::Infallible>(())
        });
        records
    }

    /// Builds a map by inserting each record in order.
    ///
    /// Fails with `KeyAlreadyExists` on the first repeated key; no partially
    /// built map is returned.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Record<K, V>>,
    {
        let records = records.into_iter();
        let mut map = Self::with_capacity(records.size_hint().0);
        for Record { key, value } in records {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Encodes the map as a JSON array of records
    pub fn to_json(&self) -> Result<String>
    where
        K: Serialize,
        V: Serialize,
    {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    /// Decodes a map from a JSON array of records.
    ///
    /// Malformed input fails with [`Error::Decode`] before any insert happens;
    /// a repeated key fails with `KeyAlreadyExists`.
    ///
    /// ```
    /// use orderedmap::OrderedMap;
    ///
    /// let err = OrderedMap::<String, String>::from_json(
    ///     r#"[{"Key":"1","Value":"a"},{"Key":"1","Value":"b"}]"#,
    /// )
    /// .unwrap_err();
    ///
    /// assert!(err.is_already_exists());
    /// assert_eq!(err.to_string(), r#"key "1" already exists"#);
    /// ```
    pub fn from_json(data: &str) -> Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        let records: Vec<Record<K, V>> = serde_json::from_str(data).map_err(Error::Decode)?;
        debug!(records = records.len(), "Decoded ordered map records");
        Self::from_records(records)
    }

    /// Replaces the contents of this handle with the map decoded from `data`.
    ///
    /// On any error the handle keeps its previous contents.
    pub fn replace_from_json(&mut self, data: &str) -> Result<()>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        *self = Self::from_json(data)?;
        Ok(())
    }
}

impl<K, V> TryFrom<Vec<Record<K, V>>> for OrderedMap<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    type Error = Error;

    fn try_from(records: Vec<Record<K, V>>) -> Result<Self> {
        Self::from_records(records)
    }
}

// Serialized as a sequence of records so that insertion order survives formats
// whose maps are unordered.
impl<K: Serialize, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (key, value) in self {
            seq.serialize_element(&Record { key, value })?;
        }
        seq.end()
    }
}

/// Decodes the record sequence, inserting each record in order.
///
/// A repeated key fails the decode through the format's own error type
/// (`de::Error::custom` with the `key "X" already exists` message), so the
/// typed `KeyAlreadyExists` and [`Error::is_already_exists`] are not available
/// on this path. Use [`OrderedMap::from_json`] when the duplicate-key condition
/// needs to be checked programmatically.
impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de> + Hash + Eq + Clone + Debug,
    V: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordsVisitor<K, V> {
            marker: PhantomData<fn() -> OrderedMap<K, V>>,
        }

        impl<'de, K, V> Visitor<'de> for RecordsVisitor<K, V>
        where
            K: Deserialize<'de> + Hash + Eq + Clone + Debug,
            V: Deserialize<'de> + Clone,
        {
            type Value = OrderedMap<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of {Key, Value} records")
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_RECORDS);
                let mut map = OrderedMap::with_capacity(capacity);

                while let Some(Record { key, value }) = seq.next_element::<Record<K, V>>()? {
                    map.insert(key, value).map_err(A::Error::custom)?;
                }

                Ok(map)
            }
        }

        deserializer.deserialize_seq(RecordsVisitor {
            marker: PhantomData,
        })
    }
}
