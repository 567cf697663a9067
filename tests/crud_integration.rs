//! Integration tests for the derived CRUD operations.
//!
//! Each operation is exercised both against a healthy store and against a
//! closed connection, and the two-effect compositions (delete/update) are
//! checked for their ordering and short-circuit behavior with a probing
//! driver that records and optionally rejects individual calls.

use std::sync::{Arc, Mutex};

use driftwood::store::memory::{self, Client, Database};
use driftwood::store::{
    Collection, Cursor, Datastore, DeleteResult, Document, Filter, InsertManyResult,
    InsertOneResult, Record, StoreError, Update, UpdateResult,
};
use driftwood::{doc, ops, Outcome};

fn closed_database() -> Database {
    let client = Client::new();
    let db = client.database("app");
    client.close();
    db
}

async fn seed(db: &Database, collection: &str, docs: Vec<Document>) {
    db.collection(collection)
        .insert_many(docs)
        .await
        .expect("seeding failed");
}

// ---------------------------------------------------------------------------
// A driver wrapper that logs every raw call and can reject chosen ones,
// for observing the sequencing policy of the composed operations.
// ---------------------------------------------------------------------------

type CallLog = Arc<Mutex<Vec<&'static str>>>;

#[derive(Clone, Debug)]
struct Probe {
    inner: Database,
    deny: &'static [&'static str],
    log: CallLog,
}

fn probe(deny: &'static [&'static str]) -> (Probe, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let probe = Probe {
        inner: Client::new().database("probe"),
        deny,
        log: log.clone(),
    };
    (probe, log)
}

#[derive(Clone, Debug)]
struct ProbeCollection {
    inner: memory::Collection,
    deny: &'static [&'static str],
    log: CallLog,
}

impl Datastore for Probe {
    type Collection = ProbeCollection;

    fn collection(&self, name: &str) -> ProbeCollection {
        ProbeCollection {
            inner: self.inner.collection(name),
            deny: self.deny,
            log: self.log.clone(),
        }
    }
}

impl ProbeCollection {
    fn gate(&self, op: &'static str) -> Result<(), StoreError> {
        self.log.lock().unwrap().push(op);
        if self.deny.contains(&op) {
            Err(StoreError::Driver(format!("injected failure in {op}")))
        } else {
            Ok(())
        }
    }
}

impl Collection for ProbeCollection {
    async fn find_one(&self, filter: Filter) -> Result<Option<Record>, StoreError> {
        self.gate("find_one")?;
        self.inner.find_one(filter).await
    }

    async fn find(&self, filter: Filter) -> Result<Cursor, StoreError> {
        self.gate("find")?;
        self.inner.find(filter).await
    }

    async fn insert_one(&self, document: Document) -> Result<InsertOneResult, StoreError> {
        self.gate("insert_one")?;
        self.inner.insert_one(document).await
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<InsertManyResult, StoreError> {
        self.gate("insert_many")?;
        self.inner.insert_many(documents).await
    }

    async fn delete_one(&self, filter: Filter) -> Result<DeleteResult, StoreError> {
        self.gate("delete_one")?;
        self.inner.delete_one(filter).await
    }

    async fn delete_many(&self, filter: Filter) -> Result<DeleteResult, StoreError> {
        self.gate("delete_many")?;
        self.inner.delete_many(filter).await
    }

    async fn update_one(&self, filter: Filter, update: Update) -> Result<UpdateResult, StoreError> {
        self.gate("update_one")?;
        self.inner.update_one(filter, update).await
    }

    async fn update_many(
        &self,
        filter: Filter,
        update: Update,
    ) -> Result<UpdateResult, StoreError> {
        self.gate("update_many")?;
        self.inner.update_many(filter, update).await
    }
}

// ---------------------------------------------------------------------------
// connect
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_produces_a_usable_handle() {
    let client = memory::connect("memory://it")
        .run(&())
        .await
        .into_result()
        .expect("connect failed");
    let db = client.database("app");

    let inserted = ops::insert_one("t", doc! { "name": "a" })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(inserted.fields["name"], "a");
}

#[tokio::test]
async fn connect_rejects_foreign_scheme() {
    match memory::connect("mongodb://localhost:27017").run(&()).await {
        Outcome::Failure(StoreError::InvalidUri(uri)) => {
            assert_eq!(uri, "mongodb://localhost:27017");
        }
        other => panic!("expected InvalidUri, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// insert_one / insert_many
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_one_returns_document_with_assigned_identity() {
    let db = Client::new().database("app");

    let record = ops::insert_one("t", doc! { "name": "a", "property": "b" })
        .run(&db)
        .await
        .into_result()
        .unwrap();

    assert_eq!(record.fields, doc! { "name": "a", "property": "b" });
    assert!(record.id.as_u64() > 0);
}

#[tokio::test]
async fn insert_one_fails_when_connection_closed() {
    let db = closed_database();

    assert_eq!(
        ops::insert_one("t", doc! { "name": "a" }).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
}

#[tokio::test]
async fn insert_many_returns_records_in_input_order() {
    let db = Client::new().database("app");
    let docs = vec![
        doc! { "name": "x" },
        doc! { "name": "y" },
        doc! { "name": "z" },
    ];

    let records = ops::insert_many("t", docs.clone())
        .run(&db)
        .await
        .into_result()
        .unwrap();

    assert_eq!(records.len(), 3);
    for (record, doc) in records.iter().zip(&docs) {
        assert_eq!(&record.fields, doc);
    }
}

#[tokio::test]
async fn insert_many_fails_when_connection_closed() {
    let db = closed_database();

    assert_eq!(
        ops::insert_many("t", vec![doc! { "name": "a" }]).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
}

// ---------------------------------------------------------------------------
// find_one / find_many
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_many_returns_insertions_in_order() {
    let db = Client::new().database("app");
    seed(&db, "t", vec![doc! { "name": "x" }, doc! { "name": "y" }]).await;

    let records = ops::find_many("t", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap();

    let names: Vec<_> = records.iter().map(|r| r.fields["name"].clone()).collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[tokio::test]
async fn find_many_returns_only_the_matching_subset() {
    let db = Client::new().database("app");
    seed(
        &db,
        "t",
        vec![
            doc! { "name": "x", "kind": "keep" },
            doc! { "name": "y", "kind": "skip" },
            doc! { "name": "z", "kind": "keep" },
        ],
    )
    .await;

    let records = ops::find_many("t", doc! { "kind": "keep" })
        .run(&db)
        .await
        .into_result()
        .unwrap();

    let names: Vec<_> = records.iter().map(|r| r.fields["name"].clone()).collect();
    assert_eq!(names, vec!["x", "z"]);
}

#[tokio::test]
async fn find_one_returns_first_match() {
    let db = Client::new().database("app");
    seed(
        &db,
        "t",
        vec![
            doc! { "name": "a", "rank": 1 },
            doc! { "name": "a", "rank": 2 },
        ],
    )
    .await;

    let record = ops::find_one("t", doc! { "name": "a" })
        .run(&db)
        .await
        .into_result()
        .unwrap()
        .expect("match expected");
    assert_eq!(record.fields["rank"], 1);
}

#[tokio::test]
async fn find_one_returns_none_when_nothing_matches() {
    let db = Client::new().database("app");

    let found = ops::find_one("t", doc! { "name": "ghost" })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn find_fails_when_connection_closed() {
    let db = closed_database();

    assert_eq!(
        ops::find_one("t", doc! {}).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
    assert_eq!(
        ops::find_many("t", doc! {}).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
}

// ---------------------------------------------------------------------------
// delete_one / delete_many
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_one_returns_pre_deletion_record_and_removes_it() {
    let db = Client::new().database("app");
    seed(&db, "t", vec![doc! { "name": "x" }]).await;

    let deleted = ops::delete_one("t", doc! { "name": "x" })
        .run(&db)
        .await
        .into_result()
        .unwrap()
        .expect("record existed");
    assert_eq!(deleted.fields["name"], "x");

    let after = ops::find_one("t", doc! { "name": "x" })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(after, None);
}

#[tokio::test]
async fn delete_one_without_match_returns_none() {
    let db = Client::new().database("app");
    seed(&db, "t", vec![doc! { "name": "x" }]).await;

    let deleted = ops::delete_one("t", doc! { "name": "ghost" })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(deleted, None);

    let untouched = ops::find_many("t", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(untouched.len(), 1);
}

#[tokio::test]
async fn delete_many_returns_pre_deletion_set_and_clears_matches() {
    let db = Client::new().database("app");
    seed(
        &db,
        "t",
        vec![
            doc! { "name": "a", "kind": "old" },
            doc! { "name": "b", "kind": "new" },
            doc! { "name": "c", "kind": "old" },
        ],
    )
    .await;

    let deleted = ops::delete_many("t", doc! { "kind": "old" })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    let names: Vec<_> = deleted.iter().map(|r| r.fields["name"].clone()).collect();
    assert_eq!(names, vec!["a", "c"]);

    let remaining = ops::find_many("t", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].fields["name"], "b");
}

#[tokio::test]
async fn delete_fails_when_connection_closed() {
    let db = closed_database();

    assert_eq!(
        ops::delete_one("t", doc! {}).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
    assert_eq!(
        ops::delete_many("t", doc! {}).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
}

// ---------------------------------------------------------------------------
// update_one / update_many
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_one_returns_post_update_record() {
    let db = Client::new().database("app");
    seed(&db, "t", vec![doc! { "name": "x", "v": 1 }]).await;

    let updated = ops::update_one("t", doc! { "name": "x" }, doc! { "v": 2 })
        .run(&db)
        .await
        .into_result()
        .unwrap()
        .expect("record existed");

    assert_eq!(updated.fields["name"], "x");
    assert_eq!(updated.fields["v"], 2);
}

#[tokio::test]
async fn update_many_returns_all_post_update_records() {
    let db = Client::new().database("app");
    seed(
        &db,
        "t",
        vec![
            doc! { "name": "shared", "property": "one" },
            doc! { "name": "shared", "property": "two" },
        ],
    )
    .await;

    let updated = ops::update_many(
        "t",
        doc! { "name": "shared" },
        doc! { "property": "patched" },
    )
    .run(&db)
    .await
    .into_result()
    .unwrap();

    assert_eq!(updated.len(), 2);
    for record in &updated {
        assert_eq!(record.fields["property"], "patched");
    }
}

#[tokio::test]
async fn update_one_without_match_returns_none() {
    let db = Client::new().database("app");

    let updated = ops::update_one("t", doc! { "name": "ghost" }, doc! { "v": 2 })
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(updated, None);
}

#[tokio::test]
async fn update_fails_when_connection_closed() {
    let db = closed_database();

    assert_eq!(
        ops::update_one("t", doc! {}, doc! { "v": 1 }).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
    assert_eq!(
        ops::update_many("t", doc! {}, doc! { "v": 1 }).run(&db).await,
        Outcome::Failure(StoreError::ConnectionClosed)
    );
}

// ---------------------------------------------------------------------------
// Sequencing policy of the two-effect compositions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_one_looks_up_before_deleting() {
    let (env, log) = probe(&[]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    ops::delete_one("t", doc! { "name": "x" })
        .run(&env)
        .await
        .into_result()
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["find_one", "delete_one"]);
}

#[tokio::test]
async fn update_one_writes_before_looking_up() {
    let (env, log) = probe(&[]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    ops::update_one("t", doc! { "name": "x" }, doc! { "v": 2 })
        .run(&env)
        .await
        .into_result()
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["update_one", "find_one"]);
}

#[tokio::test]
async fn delete_one_skips_deletion_when_lookup_fails() {
    let (env, log) = probe(&["find_one"]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    let outcome = ops::delete_one("t", doc! { "name": "x" }).run(&env).await;

    assert!(outcome.is_failure());
    assert_eq!(*log.lock().unwrap(), vec!["find_one"]);

    // The record survived: the mutation was never attempted.
    let survivor = env
        .inner
        .collection("t")
        .find_one(doc! { "name": "x" })
        .await
        .unwrap();
    assert!(survivor.is_some());
}

#[tokio::test]
async fn delete_one_surfaces_deletion_failure() {
    let (env, log) = probe(&["delete_one"]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    let outcome = ops::delete_one("t", doc! { "name": "x" }).run(&env).await;

    assert_eq!(
        outcome,
        Outcome::Failure(StoreError::Driver(
            "injected failure in delete_one".to_string()
        ))
    );
    assert_eq!(*log.lock().unwrap(), vec!["find_one", "delete_one"]);
}

#[tokio::test]
async fn update_one_skips_lookup_when_write_fails() {
    let (env, log) = probe(&["update_one"]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    let outcome = ops::update_one("t", doc! { "name": "x" }, doc! { "v": 2 })
        .run(&env)
        .await;

    assert!(outcome.is_failure());
    assert_eq!(*log.lock().unwrap(), vec!["update_one"]);
}

#[tokio::test]
async fn delete_many_follows_the_same_policy() {
    let (env, log) = probe(&[]);
    seed(&env.inner, "t", vec![doc! { "name": "x" }]).await;

    ops::delete_many("t", doc! {})
        .run(&env)
        .await
        .into_result()
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["find", "delete_many"]);
}

// ---------------------------------------------------------------------------
// Failure observation and deferral
// ---------------------------------------------------------------------------

#[tokio::test]
#[should_panic(expected = "connection closed")]
async fn fold_failure_branch_may_rethrow_by_caller_choice() {
    let db = closed_database();

    let outcome = ops::find_one("t", doc! {}).run(&db).await;

    // The panic below is the caller's: the run itself returned normally.
    outcome.fold(|err| panic!("{err}"), |_| ());
}

#[tokio::test]
async fn composition_is_inert_until_run() {
    // Built before any store exists; nothing executes here.
    let pipeline = ops::insert_one("t", doc! { "name": "late" })
        .and_then(|record| {
            ops::find_one("t", doc! { "name": "late" }).map(move |found| (record, found))
        });

    let db = Client::new().database("app");
    let (inserted, found) = pipeline.run(&db).await.into_result().unwrap();
    assert_eq!(found, Some(inserted));
}

#[tokio::test]
async fn rebuilt_effect_observes_fresh_state() {
    let db = Client::new().database("app");
    seed(&db, "t", vec![doc! { "name": "first" }]).await;

    let count = ops::find_many("t", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap()
        .len();
    assert_eq!(count, 1);

    seed(&db, "t", vec![doc! { "name": "second" }]).await;

    // Same description, rebuilt: no cached results, it re-issues the call.
    let count = ops::find_many("t", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap()
        .len();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn full_pipeline_composes_across_operations() {
    let db = Client::new().database("app");

    let pipeline = ops::insert_many(
        "crew",
        vec![
            doc! { "name": "ada", "role": "navigator" },
            doc! { "name": "brin", "role": "stoker" },
        ],
    )
    .and(ops::update_one(
        "crew",
        doc! { "name": "brin" },
        doc! { "role": "engineer" },
    ))
    .and_then(|promoted| {
        ops::delete_many("crew", doc! { "role": "navigator" })
            .map(move |dismissed| (promoted, dismissed))
    });

    let (promoted, dismissed) = pipeline.run(&db).await.into_result().unwrap();

    assert_eq!(promoted.expect("brin existed").fields["role"], "engineer");
    assert_eq!(dismissed.len(), 1);
    assert_eq!(dismissed[0].fields["name"], "ada");

    let remaining = ops::find_many("crew", doc! {})
        .run(&db)
        .await
        .into_result()
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].fields["name"], "brin");
}
