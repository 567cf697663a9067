//! Deferred asynchronous computations
//!
//! A [`Task`] wraps "produce a value asynchronously when invoked". Nothing
//! happens at construction time; the wrapped effect runs only when [`Task::run`]
//! is called. Tasks carry no failure channel of their own - failure is modeled
//! one layer up, by [`Effect`](crate::Effect) resolving to an
//! [`Outcome`](crate::Outcome).
//!
//! # Examples
//!
//! ```
//! use driftwood::Task;
//!
//! # tokio_test::block_on(async {
//! let task = Task::new(|| async { 21 }).map(|n| n * 2);
//! assert_eq!(task.run().await, 42);
//! # });
//! ```

use std::future::Future;

use futures::future::BoxFuture;

/// Thunk type for Task internals
type Thunk<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, T> + Send + 'a>;

/// A deferred asynchronous computation producing a `T` when invoked.
///
/// Construction is free of side effects; the wrapped effect starts only on
/// [`Task::run`]. A `Task` owns nothing and memoizes nothing: each
/// constructed value executes at most once (it is consumed by `run`), and
/// re-execution is expressed by building the task again, so a rebuilt task
/// always observes fresh state.
pub struct Task<'a, T> {
    thunk: Thunk<'a, T>,
}

// Manual Debug implementation since FnOnce is not Debug
impl<T> std::fmt::Debug for Task<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("thunk", &"<deferred>").finish()
    }
}

impl<'a, T> Task<'a, T>
where
    T: Send + 'a,
{
    /// Wrap a lazily-produced future.
    ///
    /// The closure is not called until the task is run.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Task;
    ///
    /// # tokio_test::block_on(async {
    /// let task = Task::new(|| async { "hello" });
    /// assert_eq!(task.run().await, "hello");
    /// # });
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = T> + Send + 'a,
    {
        Task {
            thunk: Box::new(move || Box::pin(f())),
        }
    }

    /// Run the deferred computation, producing its value.
    pub async fn run(self) -> T {
        (self.thunk)().await
    }

    /// Transform the eventual value.
    pub fn map<U, F>(self, f: F) -> Task<'a, U>
    where
        F: FnOnce(T) -> U + Send + 'a,
        U: Send + 'a,
    {
        let thunk = self.thunk;
        Task {
            thunk: Box::new(move || Box::pin(async move { f(thunk().await) })),
        }
    }

    /// Sequence two tasks: run `self`, discard its value, run `next`, keep
    /// `next`'s value.
    ///
    /// Both tasks always run, in that order. There is no failure channel at
    /// this layer, so `self`'s value cannot prevent `next` from running.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Task;
    ///
    /// # tokio_test::block_on(async {
    /// let first = Task::new(|| async { "ignored" });
    /// let second = Task::new(|| async { 7 });
    /// assert_eq!(first.then(second).run().await, 7);
    /// # });
    /// ```
    pub fn then<U>(self, next: Task<'a, U>) -> Task<'a, U>
    where
        U: Send + 'a,
    {
        let first = self.thunk;
        let second = next.thunk;
        Task {
            thunk: Box::new(move || {
                Box::pin(async move {
                    first().await;
                    second().await
                })
            }),
        }
    }
}
