//! Terminal result type for executed effects
//!
//! This module provides the `Outcome` type, the two-variant container every
//! executed [`Effect`](crate::Effect) resolves to. It is a terminal
//! representation of an already-resolved computation: there is nothing left
//! to defer, retry, or cancel, only a value to eliminate via [`Outcome::fold`].
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use driftwood::Outcome;
//!
//! let success = Outcome::<_, String>::success(42);
//! let failure = Outcome::<i32, _>::failure("boom".to_string());
//!
//! assert!(success.is_success());
//! assert!(failure.is_failure());
//! ```
//!
//! ## Eliminating with fold
//!
//! ```
//! use driftwood::Outcome;
//!
//! let outcome = Outcome::<_, String>::success(2);
//! let description = outcome.fold(
//!     |err| format!("failed: {}", err),
//!     |value| format!("got {}", value),
//! );
//! assert_eq!(description, "got 2");
//! ```

/// The resolved result of an effectful computation.
///
/// `Outcome<T, E>` is either `Success(T)` or `Failure(E)` - exactly one
/// variant, immutable once constructed, plain value semantics. It replaces
/// thrown exceptions for expected failure modes: drivers reject, the failure
/// adapter captures the rejection, and callers observe it here.
///
/// Unlike `std::result::Result` in typical application code, an `Outcome` is
/// meant to be *eliminated* rather than propagated: call [`Outcome::fold`]
/// with one handler per branch. `From`/`Into` conversions to `Result` are
/// provided for code that wants `?` at its own boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use = "an Outcome carries the only record of a computation's failure"]
pub enum Outcome<T, E> {
    /// The computation produced a value.
    Success(T),
    /// The computation failed with an error payload.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Create a successful outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let outcome = Outcome::<_, String>::success(42);
    /// assert!(outcome.is_success());
    /// ```
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    /// Create a failed outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let outcome = Outcome::<i32, _>::failure("boom");
    /// assert!(outcome.is_failure());
    /// ```
    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    /// Lift a `Result` into an `Outcome`.
    ///
    /// `Ok` becomes `Success`, `Err` becomes `Failure`. This is how driver
    /// results enter the typed failure channel.
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }

    /// Convert into a `Result`, for callers that want `?` propagation.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let outcome = Outcome::<_, String>::success(42);
    /// assert_eq!(outcome.into_result(), Ok(42));
    /// ```
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }

    /// Returns true if this is a `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns true if this is a `Failure`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// Eliminate the outcome: exactly one branch is invoked with its payload.
    ///
    /// The return value is whatever the invoked branch produces. `fold` is
    /// pure; it has no side effects unless the handlers themselves do. This
    /// is the single observation point for failures - a handler that panics
    /// is exercising caller choice, not a leak from the effect layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let ok = Outcome::<_, String>::success(2).fold(|_| 0, |n| n * 10);
    /// assert_eq!(ok, 20);
    ///
    /// let err = Outcome::<i32, _>::failure("down").fold(|e| e.len(), |_| 0);
    /// assert_eq!(err, 4);
    /// ```
    pub fn fold<R, FE, FT>(self, on_failure: FE, on_success: FT) -> R
    where
        FE: FnOnce(E) -> R,
        FT: FnOnce(T) -> R,
    {
        match self {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure(error) => on_failure(error),
        }
    }

    /// Transform the success value; a failure passes through unchanged.
    ///
    /// The function must not itself need to signal failure - use
    /// [`Effect::and_then`](crate::Effect::and_then) at the effect layer for
    /// that.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let outcome = Outcome::<_, String>::success(5).map(|x| x * 2);
    /// assert_eq!(outcome, Outcome::Success(10));
    ///
    /// let outcome = Outcome::<i32, _>::failure("boom").map(|x| x * 2);
    /// assert_eq!(outcome, Outcome::Failure("boom"));
    /// ```
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the failure value; a success passes through unchanged.
    pub fn map_err<E2, F>(self, f: F) -> Outcome<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// Chain a computation that may itself fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use driftwood::Outcome;
    ///
    /// let outcome = Outcome::<_, String>::success(5)
    ///     .and_then(|x| if x > 0 { Outcome::Success(x * 2) } else { Outcome::Failure("neg".into()) });
    /// assert_eq!(outcome, Outcome::Success(10));
    /// ```
    pub fn and_then<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Outcome::Success(value) => f(value),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Outcome::from_result(result)
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
