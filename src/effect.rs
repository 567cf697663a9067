//! Effect type for composing deferred, failable, environment-dependent computations
//!
//! This module provides the `Effect` type, the central abstraction of the
//! crate: a computation that takes an environment (typically a database
//! handle), suspends until invoked, and resolves to an
//! [`Outcome`](crate::Outcome) instead of throwing. Composing effects builds
//! descriptions; nothing executes until [`Effect::run`] (or
//! [`Effect::provide`] + [`Task::run`]) supplies the environment and invokes
//! the deferred computation.
//!
//! # Core Concepts
//!
//! - **Deferred**: construction and composition are pure; side effects start
//!   only at invocation
//! - **Environment**: the database handle is injected explicitly at the end,
//!   never captured at construction time
//! - **Typed failure**: rejections from the underlying driver are captured by
//!   [`Effect::from_async`] and travel the `Failure` branch; nothing escapes
//!   an invoked computation as a raw error
//! - **Sequencing**: combinators never reorder their operands; the first
//!   operand always resolves before the second begins, and the first
//!   `Failure` short-circuits the rest
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use driftwood::{Effect, Outcome};
//!
//! # tokio_test::block_on(async {
//! let effect = Effect::<_, String, ()>::pure(42);
//! assert_eq!(effect.run(&()).await, Outcome::Success(42));
//!
//! let effect = Effect::<i32, _, ()>::fail("error");
//! assert_eq!(effect.run(&()).await, Outcome::Failure("error"));
//! # });
//! ```
//!
//! ## Composing effects
//!
//! ```
//! use driftwood::{Effect, Outcome};
//!
//! # tokio_test::block_on(async {
//! let effect = Effect::<_, String, ()>::pure(5)
//!     .map(|x| x * 2)
//!     .and_then(|x| Effect::pure(x + 10));
//!
//! assert_eq!(effect.run(&()).await, Outcome::Success(20));
//! # });
//! ```
//!
//! ## Capturing a driver rejection
//!
//! ```
//! use driftwood::{Effect, Outcome};
//!
//! # tokio_test::block_on(async {
//! let effect = Effect::from_async(|_: &()| async {
//!     Err::<i32, _>("connection closed".to_string())
//! });
//!
//! assert_eq!(
//!     effect.run(&()).await,
//!     Outcome::Failure("connection closed".to_string())
//! );
//! # });
//! ```

use std::future::Future;

use futures::future::BoxFuture;

use crate::outcome::Outcome;
use crate::task::Task;

/// Function type for Effect internals
type EffectFn<T, E, Env> = Box<dyn FnOnce(&Env) -> BoxFuture<'_, Outcome<T, E>> + Send>;

/// A deferred computation that needs an environment and may fail.
///
/// `Effect<T, E, Env>` represents an asynchronous computation that:
/// - Produces a value of type `T` on success
/// - Fails with an error of type `E`
/// - Depends on an environment of type `Env`
///
/// Effects are lazy - they don't execute until [`Effect::run`] is called.
/// Structurally an effect is a function from `&Env` to a deferred
/// [`Outcome`]; it closes over its operation parameters and owns no shared
/// mutable state, so independently built effects may be invoked concurrently
/// by the caller.
///
/// # Type Parameters
///
/// * `T` - The type of the success value
/// * `E` - The type of the error value (defaults to `std::convert::Infallible`)
/// * `Env` - The type of the environment (defaults to `()`)
///
/// # Examples
///
/// ```
/// use driftwood::{Effect, Outcome};
///
/// # tokio_test::block_on(async {
/// let effect: Effect<_, String> = Effect::pure(42);
/// assert_eq!(effect.run(&()).await, Outcome::Success(42));
/// # });
/// ```
pub struct Effect<T, E = std::convert::Infallible, Env = ()> {
    run_fn: EffectFn<T, E, Env>,
}

// Manual Debug implementation since FnOnce is not Debug
impl<T, E, Env> std::fmt::Debug for Effect<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<T, E, Env> Effect<T, E, Env>
where
    T: Send + 'static,
    E: Send + 'static,
    Env: Sync + 'static,
{
    /// Succeed immediately with `value`, ignoring the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure(42);
    /// assert_eq!(effect.run(&()).await, Outcome::Success(42));
    /// # });
    /// ```
    pub fn pure(value: T) -> Self {
        Effect {
            run_fn: Box::new(move |_| Box::pin(async move { Outcome::Success(value) })),
        }
    }

    /// Fail immediately with `error`, ignoring the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<i32, _, ()>::fail("error");
    /// assert_eq!(effect.run(&()).await, Outcome::Failure("error"));
    /// # });
    /// ```
    pub fn fail(error: E) -> Self {
        Effect {
            run_fn: Box::new(move |_| Box::pin(async move { Outcome::Failure(error) })),
        }
    }

    /// Create from a synchronous function of the environment.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(&Env) -> Result<T, E> + Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                let outcome = Outcome::from_result(f(env));
                Box::pin(async move { outcome })
            }),
        }
    }

    /// The failure adapter: lift a raw asynchronous operation into the effect.
    ///
    /// This is the single point where a driver's rejection channel is
    /// converted into the typed [`Outcome`] channel: resolution becomes
    /// `Success`, rejection becomes `Failure` with the error carried as an
    /// opaque payload, neither narrowed nor validated. Every derived
    /// operation in [`ops`](crate::ops) routes through here.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::from_async(|_: &()| async { Ok::<_, String>(42) });
    /// assert_eq!(effect.run(&()).await, Outcome::Success(42));
    /// # });
    /// ```
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(&Env) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                let fut = f(env);
                Box::pin(async move { Outcome::from_result(fut.await) })
            }),
        }
    }

    /// Lift an already-resolved `Result` into an effect.
    pub fn from_result(result: Result<T, E>) -> Self {
        Effect::from_outcome(Outcome::from_result(result))
    }

    /// Lift an already-resolved [`Outcome`] into an effect.
    pub fn from_outcome(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Effect::pure(value),
            Outcome::Failure(error) => Effect::fail(error),
        }
    }

    /// Transform the eventual success value; a failure passes through unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure(5).map(|x| x * 2);
    /// assert_eq!(effect.run(&()).await, Outcome::Success(10));
    /// # });
    /// ```
    pub fn map<U, F>(self, f: F) -> Effect<U, E, Env>
    where
        F: FnOnce(T) -> U + Send + 'static,
        U: Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                Box::pin(async move { (self.run_fn)(env).await.map(f) })
            }),
        }
    }

    /// Transform the eventual error value; a success passes through unchanged.
    pub fn map_err<E2, F>(self, f: F) -> Effect<T, E2, Env>
    where
        F: FnOnce(E) -> E2 + Send + 'static,
        E2: Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                Box::pin(async move { (self.run_fn)(env).await.map_err(f) })
            }),
        }
    }

    /// Chain effects: derive the next computation from the previous success.
    ///
    /// Runs `self`; on `Success(a)` runs `f(a)` against the same environment
    /// and surfaces its outcome. On `Failure`, short-circuits: `f` is never
    /// invoked. This is the sequential-dependency primitive - "update, then
    /// look up the fresh state".
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure(5).and_then(|x| Effect::pure(x * 2));
    /// assert_eq!(effect.run(&()).await, Outcome::Success(10));
    ///
    /// // Error propagation
    /// let effect = Effect::<_, String, ()>::fail("error".to_string())
    ///     .and_then(|x: i32| Effect::pure(x * 2));
    /// assert_eq!(effect.run(&()).await, Outcome::Failure("error".to_string()));
    /// # });
    /// ```
    pub fn and_then<U, F>(self, f: F) -> Effect<U, E, Env>
    where
        F: FnOnce(T) -> Effect<U, E, Env> + Send + 'static,
        U: Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                Box::pin(async move {
                    match (self.run_fn)(env).await {
                        Outcome::Success(value) => {
                            let next = f(value);
                            (next.run_fn)(env).await
                        }
                        Outcome::Failure(error) => Outcome::Failure(error),
                    }
                })
            }),
        }
    }

    /// Sequence two effects, keeping the second's value.
    ///
    /// Runs `self`; on `Success` runs `next` against the same environment
    /// and surfaces `next`'s outcome, discarding `self`'s value. On
    /// `Failure`, short-circuits: `next` never runs. `self` always begins
    /// (and resolves) before `next` begins.
    ///
    /// This is how a write-then-lookup pairing surfaces the lookup's value
    /// instead of the write's raw summary.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure("summary").and(Effect::pure(7));
    /// assert_eq!(effect.run(&()).await, Outcome::Success(7));
    /// # });
    /// ```
    pub fn and<U>(self, next: Effect<U, E, Env>) -> Effect<U, E, Env>
    where
        U: Send + 'static,
    {
        self.and_then(move |_| next)
    }

    /// Chain an effect for its side effect only, keeping the original value.
    ///
    /// Runs `self`; on `Success(a)` the function receives `&a` and its
    /// effect runs against the same environment; the result is `Success(a)`
    /// if that side effect succeeds, otherwise its `Failure`. On `Failure`
    /// of `self`, the side effect never runs.
    ///
    /// This is how a lookup-then-mutate pairing captures a pre-mutation
    /// snapshot: the lookup's value survives, the mutation only contributes
    /// its failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure(42)
    ///     .and_then_ref(|snapshot| {
    ///         assert_eq!(*snapshot, 42);
    ///         Effect::pure("discarded")
    ///     });
    ///
    /// assert_eq!(effect.run(&()).await, Outcome::Success(42));
    /// # });
    /// ```
    pub fn and_then_ref<U, F>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Effect<U, E, Env> + Send + 'static,
        U: Send + 'static,
        T: Clone,
    {
        self.and_then(move |value| {
            let kept = value.clone();
            f(&value).map(move |_| kept)
        })
    }

    /// Perform a unit side effect and return the original value.
    ///
    /// Like [`Effect::and_then_ref`] but for side effects that produce no
    /// value of their own (logging, notifications). If the side effect
    /// fails, the whole computation fails.
    pub fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Effect<(), E, Env> + Send + 'static,
        T: Clone,
    {
        self.and_then_ref(f)
    }

    /// Recover from errors.
    ///
    /// If the effect fails, apply the recovery function to the error to
    /// produce a new effect against the same environment. If it succeeds,
    /// the value passes through unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<i32, _, ()>::fail("error").or_else(|_| Effect::pure(42));
    /// assert_eq!(effect.run(&()).await, Outcome::Success(42));
    /// # });
    /// ```
    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> Effect<T, E, Env> + Send + 'static,
    {
        Effect {
            run_fn: Box::new(move |env| {
                Box::pin(async move {
                    match (self.run_fn)(env).await {
                        Outcome::Success(value) => Outcome::Success(value),
                        Outcome::Failure(error) => {
                            let recovery = f(error);
                            (recovery.run_fn)(env).await
                        }
                    }
                })
            }),
        }
    }

    /// Supply the environment, obtaining the deferred result as a [`Task`].
    ///
    /// The returned task has not started; invoke it with [`Task::run`].
    /// Splitting invocation this way makes the two stages explicit: binding
    /// the handle is separate from running the computation.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let task = Effect::<_, String, ()>::pure(42).provide(&());
    /// assert_eq!(task.run().await, Outcome::Success(42));
    /// # });
    /// ```
    pub fn provide(self, env: &Env) -> Task<'_, Outcome<T, E>> {
        let run_fn = self.run_fn;
        Task::new(move || run_fn(env))
    }

    /// Run the effect with the given environment.
    ///
    /// Equivalent to `provide(env)` followed by [`Task::run`]. Collection
    /// handles and results are never cached: running a rebuilt effect always
    /// re-resolves and re-issues the underlying calls.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::{Effect, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = Effect::<_, String, ()>::pure(42);
    /// assert_eq!(effect.run(&()).await, Outcome::Success(42));
    /// # });
    /// ```
    pub async fn run(self, env: &Env) -> Outcome<T, E> {
        self.provide(env).run().await
    }

    /// Wrap this effect in a tracing span.
    ///
    /// The span is entered while the effect executes, following the standard
    /// `tracing::Instrument` pattern for async code. Only available with the
    /// `tracing` feature.
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> Self {
        use tracing::Instrument as _;
        Effect {
            run_fn: Box::new(move |env| Box::pin((self.run_fn)(env).instrument(span))),
        }
    }
}
