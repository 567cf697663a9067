//! Driver error taxonomy
//!
//! Every rejection from the underlying store surfaces through one type,
//! converted into the effect layer's failure channel exactly once, at the
//! [`Effect::from_async`](crate::Effect::from_async) boundary. The effect
//! layer does not distinguish error subkinds; composed operations propagate
//! the first failure encountered and skip the remaining steps.

use thiserror::Error;

/// An error raised by the underlying document store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The connection behind the handle is gone; no call can complete.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection string could not be understood.
    #[error("invalid connection string `{0}`")]
    InvalidUri(String),

    /// Any other driver rejection, with the raw cause attached as a message.
    ///
    /// The payload is carried opaquely; callers that need to react to a
    /// specific driver condition inspect it in their own `fold` handlers.
    #[error("driver error: {0}")]
    Driver(String),
}
