//! # Driftwood
//!
//! > *"Carried by the current, untouched until it lands"*
//!
//! A Rust library for deferred, composable document-store operations.
//!
//! ## Philosophy
//!
//! **Driftwood** keeps database access honest by separating *describing* an
//! operation from *executing* it:
//! - **Drift** = values float through pure combinators, nothing runs
//! - **Wood** = the solid bit at the end: one explicit `run` against a handle
//!
//! Every CRUD call is modeled as an [`Effect`]: a computation that needs an
//! environment (the database handle), suspends until invoked, and resolves to
//! an [`Outcome`] instead of throwing. Failures from the driver are captured
//! once, at the adapter boundary, and surface only through
//! [`Outcome::fold`].
//!
//! ## Quick Example
//!
//! ```rust
//! use driftwood::store::memory;
//! use driftwood::{doc, ops, Outcome};
//!
//! # tokio_test::block_on(async {
//! // Nothing has touched the store yet: this is a pure description.
//! let pipeline = ops::insert_one("users", doc! { "name": "ada" }).and_then(|inserted| {
//!     ops::find_one("users", doc! { "name": "ada" }).map(move |found| (inserted, found))
//! });
//!
//! let client = match memory::connect("memory://quickstart").run(&()).await {
//!     Outcome::Success(client) => client,
//!     Outcome::Failure(err) => panic!("connect failed: {err}"),
//! };
//! let db = client.database("app");
//!
//! match pipeline.run(&db).await {
//!     Outcome::Success((inserted, found)) => assert_eq!(found, Some(inserted)),
//!     Outcome::Failure(err) => panic!("store rejected: {err}"),
//! }
//! # });
//! ```
//!
//! The [`ops`] module holds the derived CRUD operations, [`store`] the data
//! model and the driver boundary, and [`effect`]/[`task`]/[`outcome`] the
//! composition core they are built from.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod ops;
pub mod outcome;
pub mod store;
pub mod task;

// Re-exports
pub use effect::Effect;
pub use outcome::Outcome;
pub use store::{Datastore, Document, Filter, Record, RecordId, StoreError, Update};
pub use task::Task;

#[doc(hidden)]
pub use serde_json as __serde_json;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::doc;
    pub use crate::effect::Effect;
    pub use crate::outcome::Outcome;
    pub use crate::store::{
        Collection, Datastore, Document, Filter, Record, RecordId, StoreError, Update,
    };
    pub use crate::task::Task;
}
