//! Data model and the driver boundary
//!
//! This module defines what the effect layer consumes from a document store:
//! exactly one capability on the handle - resolve a named collection - and,
//! on the collection, the raw CRUD calls. Both sides of the boundary are
//! traits so that any driver can sit behind them; [`memory`] provides the
//! in-process reference driver used throughout the tests.
//!
//! The handle is supplied by the caller at invocation time and never owned
//! here: the effect layer does not create, pool, close, or cache it, and a
//! collection is re-resolved on every execution.

pub mod document;
pub mod error;
pub mod memory;

pub use document::{
    Cursor, DeleteResult, Document, Filter, InsertManyResult, InsertOneResult, Record, RecordId,
    Update, UpdateResult,
};
pub use error::StoreError;

use std::future::Future;

/// A document-store handle: a namespace of named collections.
///
/// This is the `Env` the derived operations in [`ops`](crate::ops) run
/// against. Resolution is a pure lookup - collections auto-vivify in every
/// reasonable driver, so naming one is not a failure-prone step; failures
/// belong to the calls made *through* the collection.
pub trait Datastore: Send + Sync {
    /// The collection handle this store hands out.
    type Collection: Collection;

    /// Resolve the named collection. Called fresh on every operation
    /// execution; implementations must not rely on handles being reused.
    fn collection(&self, name: &str) -> Self::Collection;
}

/// The raw driver calls on one collection.
///
/// Each method returns a future that resolves with a driver result shape or
/// rejects with a [`StoreError`]. Futures are `Send` so operations can be
/// composed and run from any executor. At-most-one attempt per call: retry
/// policies live outside this boundary, in the driver or the caller.
pub trait Collection: Send + Sync + 'static {
    /// Fetch the first record matching `filter`, if any.
    fn find_one(
        &self,
        filter: Filter,
    ) -> impl Future<Output = Result<Option<Record>, StoreError>> + Send;

    /// Open a cursor over all records matching `filter`, in insertion order.
    fn find(&self, filter: Filter) -> impl Future<Output = Result<Cursor, StoreError>> + Send;

    /// Store one document, assigning it an identity.
    fn insert_one(
        &self,
        document: Document,
    ) -> impl Future<Output = Result<InsertOneResult, StoreError>> + Send;

    /// Store several documents, assigning identities, preserving input order.
    fn insert_many(
        &self,
        documents: Vec<Document>,
    ) -> impl Future<Output = Result<InsertManyResult, StoreError>> + Send;

    /// Remove the first record matching `filter`.
    fn delete_one(
        &self,
        filter: Filter,
    ) -> impl Future<Output = Result<DeleteResult, StoreError>> + Send;

    /// Remove every record matching `filter`.
    fn delete_many(
        &self,
        filter: Filter,
    ) -> impl Future<Output = Result<DeleteResult, StoreError>> + Send;

    /// Patch the first record matching `filter`.
    fn update_one(
        &self,
        filter: Filter,
        update: Update,
    ) -> impl Future<Output = Result<UpdateResult, StoreError>> + Send;

    /// Patch every record matching `filter`.
    fn update_many(
        &self,
        filter: Filter,
        update: Update,
    ) -> impl Future<Output = Result<UpdateResult, StoreError>> + Send;
}
