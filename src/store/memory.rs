//! In-memory reference driver
//!
//! A small, process-local document store implementing the
//! [`Datastore`]/[`Collection`](super::Collection) boundary. It exists for
//! the same reason an in-memory server exists for every production document
//! database: pipelines composed against it behave exactly as they would
//! against a remote store - including connection loss, via
//! [`Client::close`] - without any network in the picture.
//!
//! Semantics kept deliberately plain:
//! - collections auto-vivify on first use and keep records in insertion order
//! - filters match by field equality; an empty filter matches everything
//! - update payloads are merge patches: each field is written over the
//!   record's current value
//! - identities are assigned monotonically per collection

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::effect::Effect;

use super::{
    Cursor, Datastore, DeleteResult, Document, Filter, InsertManyResult, InsertOneResult, Record,
    RecordId, StoreError, Update, UpdateResult,
};

/// Establish a connection to an in-memory store.
///
/// Accepts `memory://<name>` connection strings and fails with
/// [`StoreError::InvalidUri`] otherwise. Each successful connect produces a
/// fresh, empty store; the name only namespaces the URI, it is not a
/// registry key.
///
/// # Examples
///
/// ```
/// use driftwood::store::memory;
///
/// # tokio_test::block_on(async {
/// assert!(memory::connect("memory://demo").run(&()).await.is_success());
/// assert!(memory::connect("postgres://nope").run(&()).await.is_failure());
/// # });
/// ```
pub fn connect(uri: &str) -> Effect<Client, StoreError, ()> {
    let uri = uri.to_owned();
    Effect::from_async(move |_| async move {
        match uri.strip_prefix("memory://") {
            Some(name) if !name.is_empty() => Ok(Client::new()),
            _ => Err(StoreError::InvalidUri(uri)),
        }
    })
}

#[derive(Debug, Default)]
struct Shared {
    closed: bool,
    databases: HashMap<String, DatabaseState>,
}

#[derive(Debug, Default)]
struct DatabaseState {
    collections: HashMap<String, CollectionState>,
}

#[derive(Debug, Default)]
struct CollectionState {
    next_id: u64,
    records: Vec<Record>,
}

impl CollectionState {
    fn assign(&mut self, fields: Document) -> Record {
        self.next_id += 1;
        let record = Record {
            id: RecordId::new(self.next_id),
            fields,
        };
        self.records.push(record.clone());
        record
    }
}

fn matches(filter: &Filter, record: &Record) -> bool {
    filter
        .iter()
        .all(|(field, expected)| record.fields.get(field) == Some(expected))
}

fn apply_patch(record: &mut Record, update: &Update) -> bool {
    let mut changed = false;
    for (field, value) in update {
        if record.fields.get(field) != Some(value) {
            record.fields.insert(field.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// A live connection to an in-memory store.
///
/// Cheap to clone; all clones (and every [`Database`]/collection handle
/// derived from them) share the same underlying state, so closing the client
/// invalidates all of them at once.
#[derive(Clone, Debug)]
pub struct Client {
    shared: Arc<Mutex<Shared>>,
}

impl Client {
    /// Create a connected client without the connection-string ceremony.
    pub fn new() -> Self {
        Client {
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Get a handle on a named database within this client.
    pub fn database(&self, name: &str) -> Database {
        Database {
            name: name.to_owned(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Close the connection.
    ///
    /// Every subsequent driver call through any handle derived from this
    /// client rejects with [`StoreError::ConnectionClosed`].
    pub fn close(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.closed = true;
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}

/// A named database: the environment the derived CRUD operations run against.
#[derive(Clone, Debug)]
pub struct Database {
    name: String,
    shared: Arc<Mutex<Shared>>,
}

impl Database {
    /// The database name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Datastore for Database {
    type Collection = Collection;

    fn collection(&self, name: &str) -> Collection {
        Collection {
            database: self.name.clone(),
            name: name.to_owned(),
            shared: Arc::clone(&self.shared),
        }
    }
}

/// A handle on one named collection of an in-memory database.
#[derive(Clone, Debug)]
pub struct Collection {
    database: String,
    name: String,
    shared: Arc<Mutex<Shared>>,
}

impl Collection {
    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CollectionState) -> R) -> Result<R, StoreError> {
        let mut shared = self
            .shared
            .lock()
            .map_err(|_| StoreError::Driver("store lock poisoned".to_owned()))?;
        if shared.closed {
            return Err(StoreError::ConnectionClosed);
        }
        let state = shared
            .databases
            .entry(self.database.clone())
            .or_default()
            .collections
            .entry(self.name.clone())
            .or_default();
        Ok(f(state))
    }
}

impl super::Collection for Collection {
    async fn find_one(&self, filter: Filter) -> Result<Option<Record>, StoreError> {
        self.with_state(|state| {
            state
                .records
                .iter()
                .find(|record| matches(&filter, record))
                .cloned()
        })
    }

    async fn find(&self, filter: Filter) -> Result<Cursor, StoreError> {
        self.with_state(|state| {
            Cursor::from_records(
                state
                    .records
                    .iter()
                    .filter(|record| matches(&filter, record))
                    .cloned()
                    .collect(),
            )
        })
    }

    async fn insert_one(&self, document: Document) -> Result<InsertOneResult, StoreError> {
        self.with_state(|state| InsertOneResult {
            record: state.assign(document),
        })
    }

    async fn insert_many(&self, documents: Vec<Document>) -> Result<InsertManyResult, StoreError> {
        self.with_state(|state| InsertManyResult {
            records: documents
                .into_iter()
                .map(|document| state.assign(document))
                .collect(),
        })
    }

    async fn delete_one(&self, filter: Filter) -> Result<DeleteResult, StoreError> {
        self.with_state(|state| {
            match state
                .records
                .iter()
                .position(|record| matches(&filter, record))
            {
                Some(index) => {
                    state.records.remove(index);
                    DeleteResult { deleted_count: 1 }
                }
                None => DeleteResult { deleted_count: 0 },
            }
        })
    }

    async fn delete_many(&self, filter: Filter) -> Result<DeleteResult, StoreError> {
        self.with_state(|state| {
            let before = state.records.len();
            state.records.retain(|record| !matches(&filter, record));
            DeleteResult {
                deleted_count: (before - state.records.len()) as u64,
            }
        })
    }

    async fn update_one(&self, filter: Filter, update: Update) -> Result<UpdateResult, StoreError> {
        self.with_state(|state| {
            match state
                .records
                .iter_mut()
                .find(|record| matches(&filter, record))
            {
                Some(record) => UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(apply_patch(record, &update)),
                },
                None => UpdateResult {
                    matched_count: 0,
                    modified_count: 0,
                },
            }
        })
    }

    async fn update_many(&self, filter: Filter, update: Update) -> Result<UpdateResult, StoreError> {
        self.with_state(|state| {
            let mut result = UpdateResult {
                matched_count: 0,
                modified_count: 0,
            };
            for record in state
                .records
                .iter_mut()
                .filter(|record| matches(&filter, record))
            {
                result.matched_count += 1;
                result.modified_count += u64::from(apply_patch(record, &update));
            }
            result
        })
    }
}
