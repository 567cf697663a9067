//! Schema-less documents, stored records, and driver result shapes
//!
//! Documents are opaque field-name-to-value maps. The effect layer passes
//! them through untouched: filters and update patches have meaning only to
//! the driver executing them.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// An opaque document: a mapping from field names to JSON values.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A query payload, matched against stored records by the driver.
pub type Filter = Document;

/// An update payload, applied to matched records by the driver.
pub type Update = Document;

/// Build a [`Document`] (or [`Filter`]/[`Update`]) from JSON-literal syntax.
///
/// # Examples
///
/// ```
/// use driftwood::doc;
///
/// let document = doc! { "name": "ada", "age": 36 };
/// assert_eq!(document["name"], "ada");
/// ```
#[macro_export]
macro_rules! doc {
    ($($body:tt)*) => {
        match $crate::__serde_json::json!({ $($body)* }) {
            $crate::__serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    };
}

/// Identity assigned to a record by the driver on insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw driver-assigned identity.
    pub fn new(raw: u64) -> Self {
        RecordId(raw)
    }

    /// The raw identity value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored document together with its assigned identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The driver-assigned identity.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// The document fields as inserted (and later patched).
    #[serde(flatten)]
    pub fields: Document,
}

/// Driver summary of a single-document insertion.
///
/// Carries the inserted record so callers can project it without a second
/// lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertOneResult {
    /// The record as stored, identity assigned.
    pub record: Record,
}

/// Driver summary of a multi-document insertion.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertManyResult {
    /// The stored records, in input order.
    pub records: Vec<Record>,
}

/// Driver summary of a deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteResult {
    /// Number of records removed.
    pub deleted_count: u64,
}

/// Driver summary of an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateResult {
    /// Number of records the filter matched.
    pub matched_count: u64,
    /// Number of matched records actually changed by the patch.
    pub modified_count: u64,
}

/// A stream of records produced by a driver `find`.
///
/// Materialize it with [`futures::TryStreamExt::try_collect`]; the derived
/// `find_many` operation does exactly that.
#[derive(Debug)]
pub struct Cursor {
    items: std::vec::IntoIter<Result<Record, StoreError>>,
}

impl Cursor {
    /// Build a cursor from per-record results.
    pub fn new(items: Vec<Result<Record, StoreError>>) -> Self {
        Cursor {
            items: items.into_iter(),
        }
    }

    /// Build a cursor over already-fetched records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Cursor::new(records.into_iter().map(Ok).collect())
    }
}

impl Stream for Cursor {
    type Item = Result<Record, StoreError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().items.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn record(id: u64, name: &str) -> Record {
        Record {
            id: RecordId::new(id),
            fields: doc! { "name": name },
        }
    }

    #[test]
    fn test_doc_macro_builds_object() {
        let document = doc! { "name": "ada", "age": 36 };
        assert_eq!(document.len(), 2);
        assert_eq!(document["age"], 36);

        let empty = doc! {};
        assert!(empty.is_empty());
    }

    #[test]
    fn test_record_serializes_with_mongo_style_id() {
        let json = serde_json::to_value(record(7, "ada")).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["name"], "ada");
    }

    #[tokio::test]
    async fn test_cursor_yields_in_order() {
        let cursor = Cursor::from_records(vec![record(1, "a"), record(2, "b")]);
        let collected: Vec<Record> = cursor.try_collect().await.unwrap();
        assert_eq!(
            collected.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![RecordId::new(1), RecordId::new(2)]
        );
    }

    #[tokio::test]
    async fn test_cursor_surfaces_item_error() {
        let cursor = Cursor::new(vec![Ok(record(1, "a")), Err(StoreError::ConnectionClosed)]);
        let collected: Result<Vec<Record>, StoreError> = cursor.try_collect().await;
        assert_eq!(collected, Err(StoreError::ConnectionClosed));
    }
}
