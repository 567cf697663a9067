//! Derived CRUD operations
//!
//! Each operation here is a pure composition: it builds an
//! [`Effect`] describing one or two driver calls and how their results
//! relate, and holds no state of its own. Nothing touches the store until
//! the caller supplies a handle and runs the effect.
//!
//! The write operations that report records rather than driver summaries
//! pair two effects with a fixed order:
//! - `delete_*` looks up first and deletes as a side effect, because the
//!   pre-deletion snapshot is the only one there will ever be
//! - `update_*` writes first and looks up second, because the post-update
//!   state is the one that answers the caller's question
//!
//! In both pairings the first failure wins and the untried half is skipped.
//!
//! # Examples
//!
//! ```
//! use driftwood::store::memory::Client;
//! use driftwood::{doc, ops, Outcome};
//!
//! # tokio_test::block_on(async {
//! let db = Client::new().database("app");
//!
//! let outcome = ops::insert_one("crew", doc! { "name": "ada", "rank": 1 })
//!     .and(ops::update_one("crew", doc! { "name": "ada" }, doc! { "rank": 2 }))
//!     .run(&db)
//!     .await;
//!
//! match outcome {
//!     Outcome::Success(Some(record)) => assert_eq!(record.fields["rank"], 2),
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! # });
//! ```

use std::future::Future;

use futures::TryStreamExt;

use crate::effect::Effect;
use crate::store::{
    Collection, Datastore, DeleteResult, Document, Filter, Record, StoreError, Update,
    UpdateResult,
};

/// Resolve a named collection from the environment and apply a driver call.
///
/// The lookup itself is pure and infallible; whatever the call returns is
/// routed through [`Effect::from_async`], so a driver rejection becomes the
/// effect's `Failure` branch. The collection is resolved fresh each time the
/// effect executes - nothing is cached between runs.
pub fn with_collection<T, F, Fut, Env>(name: &str, f: F) -> Effect<T, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
    F: FnOnce(Env::Collection) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
    T: Send + 'static,
{
    let name = name.to_owned();
    Effect::from_async(move |env: &Env| f(env.collection(&name)))
}

/// Find the first record matching `filter`, or `None`.
pub fn find_one<Env>(collection: &str, filter: Filter) -> Effect<Option<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.find_one(filter).await
    })
}

/// Find every record matching `filter`, in insertion order.
///
/// Opens the driver cursor and materializes it into a `Vec` in one step.
pub fn find_many<Env>(collection: &str, filter: Filter) -> Effect<Vec<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        let cursor = coll.find(filter).await?;
        cursor.try_collect().await
    })
}

/// Insert one document and surface the stored record, identity assigned.
pub fn insert_one<Env>(collection: &str, document: Document) -> Effect<Record, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.insert_one(document).await
    })
    .map(|result| result.record)
}

/// Insert several documents and surface the stored records, in input order.
pub fn insert_many<Env>(
    collection: &str,
    documents: Vec<Document>,
) -> Effect<Vec<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.insert_many(documents).await
    })
    .map(|result| result.records)
}

fn delete_one_raw<Env>(collection: &str, filter: Filter) -> Effect<DeleteResult, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.delete_one(filter).await
    })
}

fn delete_many_raw<Env>(collection: &str, filter: Filter) -> Effect<DeleteResult, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.delete_many(filter).await
    })
}

fn update_one_raw<Env>(
    collection: &str,
    filter: Filter,
    update: Update,
) -> Effect<UpdateResult, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.update_one(filter, update).await
    })
}

fn update_many_raw<Env>(
    collection: &str,
    filter: Filter,
    update: Update,
) -> Effect<UpdateResult, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    with_collection(collection, move |coll: Env::Collection| async move {
        coll.update_many(filter, update).await
    })
}

/// Delete the first record matching `filter`, returning it as it existed
/// before deletion, or `None` if nothing matched.
///
/// The lookup runs first and the deletion runs second, for its side effect:
/// once the record is gone there is no snapshot left to return. If the
/// lookup fails the deletion never runs; if the deletion fails, its error is
/// the outcome.
pub fn delete_one<Env>(collection: &str, filter: Filter) -> Effect<Option<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    let remove = delete_one_raw(collection, filter.clone());
    find_one(collection, filter).and_then_ref(move |_| remove)
}

/// Delete every record matching `filter`, returning them as they existed
/// before deletion.
pub fn delete_many<Env>(collection: &str, filter: Filter) -> Effect<Vec<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    let remove = delete_many_raw(collection, filter.clone());
    find_many(collection, filter).and_then_ref(move |_| remove)
}

/// Patch the first record matching `filter`, returning its state *after*
/// the update, or `None` if nothing matched.
///
/// The write runs first; the lookup runs second and supplies the returned
/// value. If the write fails the lookup never runs. The lookup reuses the
/// original filter, so a patch that rewrites a filtered field will report
/// `None` - the freshly-patched record no longer matches.
pub fn update_one<Env>(
    collection: &str,
    filter: Filter,
    update: Update,
) -> Effect<Option<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    update_one_raw(collection, filter.clone(), update).and(find_one(collection, filter))
}

/// Patch every record matching `filter`, returning their states *after* the
/// update.
///
/// Shares [`update_one`]'s ordering and filter-reuse caveat.
pub fn update_many<Env>(
    collection: &str,
    filter: Filter,
    update: Update,
) -> Effect<Vec<Record>, StoreError, Env>
where
    Env: Datastore + Sync + 'static,
{
    update_many_raw(collection, filter.clone(), update).and(find_many(collection, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::store::memory::Client;
    use crate::Outcome;

    #[tokio::test]
    async fn test_insert_then_find_round_trip() {
        let db = Client::new().database("test");

        let inserted = insert_one("t", doc! { "name": "a" }).run(&db).await;
        let found = find_one("t", doc! { "name": "a" }).run(&db).await;

        match (inserted, found) {
            (Outcome::Success(inserted), Outcome::Success(found)) => {
                assert_eq!(found, Some(inserted));
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_one_reports_pre_deletion_snapshot() {
        let db = Client::new().database("test");
        insert_one("t", doc! { "name": "a", "rank": 1 })
            .run(&db)
            .await
            .into_result()
            .unwrap();

        let deleted = delete_one("t", doc! { "name": "a" })
            .run(&db)
            .await
            .into_result()
            .unwrap()
            .expect("record existed");
        assert_eq!(deleted.fields["rank"], 1);

        let gone = find_one("t", doc! { "name": "a" })
            .run(&db)
            .await
            .into_result()
            .unwrap();
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn test_update_one_reports_post_update_snapshot() {
        let db = Client::new().database("test");
        insert_one("t", doc! { "name": "a", "rank": 1 })
            .run(&db)
            .await
            .into_result()
            .unwrap();

        let updated = update_one("t", doc! { "name": "a" }, doc! { "rank": 2 })
            .run(&db)
            .await
            .into_result()
            .unwrap()
            .expect("record existed");
        assert_eq!(updated.fields["rank"], 2);
    }
}
