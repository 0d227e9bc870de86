//! The terminal value of effect evaluation.
//!
//! Running an [`Effect`](crate::effect::Effect) produces an [`Exit<E, A>`]:
//! either [`Success`](Exit::Success) carrying the computed value, or
//! [`Failure`](Exit::Failure) carrying the [`Cause`] of the failure.
//!
//! The channel discipline mirrors the effect algebra:
//!
//! - [`map`](Exit::map) touches only `Success`.
//! - [`map_error`](Exit::map_error) touches only the expected failure inside
//!   `Failure`; defects pass through untouched.
//!
//! # Examples
//!
//! ```rust
//! use rea::exit::Exit;
//!
//! let exit: Exit<String, u32> = Exit::Success(21);
//! assert_eq!(exit.map(|n| n * 2).success(), Some(42));
//!
//! let failed: Exit<String, u32> = Exit::from(Err("down".to_string()));
//! assert_eq!(failed.get_or_else(|_| 0), 0);
//! ```

use crate::cause::{Cause, Defect};

/// The result of evaluating an effect to completion.
///
/// # Type Parameters
///
/// * `E` - The declared error type of the evaluated effect.
/// * `A` - The success type of the evaluated effect.
#[derive(Debug)]
pub enum Exit<E, A> {
    /// Evaluation produced a value.
    Success(A),
    /// Evaluation failed with the given cause.
    Failure(Cause<E>),
}

impl<E, A> Exit<E, A> {
    /// Returns `true` if this is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if this is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Transforms the success value; failures pass through unchanged.
    pub fn map<B, F>(self, function: F) -> Exit<E, B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Success(value) => Exit::Success(function(value)),
            Self::Failure(cause) => Exit::Failure(cause),
        }
    }

    /// Transforms the expected failure; successes and defects pass through
    /// unchanged.
    pub fn map_error<E2, F>(self, function: F) -> Exit<E2, A>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success(value) => Exit::Success(value),
            Self::Failure(cause) => Exit::Failure(cause.map(function)),
        }
    }

    /// Extracts the success value, or `None` for failures.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::exit::Exit;
    ///
    /// let exit: Exit<String, u32> = Exit::Success(7);
    /// assert_eq!(exit.success(), Some(7));
    /// ```
    pub fn success(self) -> Option<A> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Extracts the failure cause, or `None` for successes.
    pub fn cause(self) -> Option<Cause<E>> {
        match self {
            Self::Success(_) => None,
            Self::Failure(cause) => Some(cause),
        }
    }

    /// Projects out the success value, or applies `function` to the cause.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::exit::Exit;
    ///
    /// let failed: Exit<&str, u32> = Exit::from(Err("down"));
    /// assert_eq!(failed.get_or_else(|_| 0), 0);
    /// ```
    pub fn get_or_else<F>(self, function: F) -> A
    where
        F: FnOnce(Cause<E>) -> A,
    {
        match self {
            Self::Success(value) => value,
            Self::Failure(cause) => function(cause),
        }
    }

    /// Total eliminator over the three outcomes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::exit::Exit;
    ///
    /// let exit: Exit<String, u32> = Exit::Success(3);
    /// let rendered = exit.fold(
    ///     |error| format!("failed: {error}"),
    ///     |defect| format!("died: {}", defect.message()),
    ///     |value| format!("got {value}"),
    /// );
    /// assert_eq!(rendered, "got 3");
    /// ```
    pub fn fold<T, F, G, H>(self, on_expected: F, on_defect: G, on_success: H) -> T
    where
        F: FnOnce(E) -> T,
        G: FnOnce(Defect) -> T,
        H: FnOnce(A) -> T,
    {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(cause) => cause.fold(on_expected, on_defect),
        }
    }
}

impl<E: std::fmt::Debug, A> Exit<E, A> {
    /// Projects out the success value, raising the failure otherwise.
    ///
    /// A defect is re-raised with its original payload, exactly as if the
    /// panic had never been caught. An expected failure panics with a
    /// message describing the cause; convert expected failures you cannot
    /// handle with [`Effect::or_die`](crate::effect::Effect::or_die) before
    /// running if you need the original payload back instead.
    ///
    /// # Panics
    ///
    /// Panics whenever this exit is a failure.
    pub fn unwrap_or_resume(self) -> A {
        match self {
            Self::Success(value) => value,
            Self::Failure(Cause::Panic(defect)) => defect.resume(),
            Self::Failure(cause @ Cause::Expected(_)) => {
                panic!("effect evaluation failed: {cause:?}")
            }
        }
    }
}

impl<E, A> From<Result<A, E>> for Exit<E, A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(Cause::Expected(error)),
        }
    }
}

impl<E, A> From<Exit<E, A>> for Result<A, Cause<E>> {
    fn from(exit: Exit<E, A>) -> Self {
        match exit {
            Exit::Success(value) => Ok(value),
            Exit::Failure(cause) => Err(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn map_touches_only_success() {
        let success: Exit<String, u32> = Exit::Success(21);
        assert_eq!(success.map(|n| n * 2).success(), Some(42));

        let failure: Exit<String, u32> = Exit::Failure(Cause::Expected("down".to_string()));
        let mapped = failure.map(|n| n * 2);
        assert_eq!(
            mapped.cause().and_then(Cause::into_failure),
            Some("down".to_string())
        );
    }

    #[rstest]
    fn map_error_touches_only_expected() {
        let success: Exit<String, u32> = Exit::Success(1);
        assert_eq!(success.map_error(|error| error.len()).success(), Some(1));

        let failure: Exit<String, u32> = Exit::Failure(Cause::Expected("abc".to_string()));
        let mapped = failure.map_error(|error| error.len());
        assert_eq!(mapped.cause().and_then(Cause::into_failure), Some(3));

        let died: Exit<String, u32> = Exit::Failure(Cause::Panic(Defect::new("boom")));
        assert!(died.map_error(|error| error.len()).is_failure());
    }

    #[rstest]
    fn get_or_else_recovers_from_the_cause() {
        let failure: Exit<&str, usize> = Exit::Failure(Cause::Expected("four"));
        let recovered = failure.get_or_else(|cause| cause.failure().map_or(0, |text| text.len()));
        assert_eq!(recovered, 4);
    }

    #[rstest]
    fn fold_is_total() {
        let success: Exit<&str, u32> = Exit::Success(1);
        assert_eq!(success.fold(|_| "expected", |_| "defect", |_| "success"), "success");

        let expected: Exit<&str, u32> = Exit::Failure(Cause::Expected("e"));
        assert_eq!(expected.fold(|_| "expected", |_| "defect", |_| "success"), "expected");

        let died: Exit<&str, u32> = Exit::Failure(Cause::Panic(Defect::new("boom")));
        assert_eq!(died.fold(|_| "expected", |_| "defect", |_| "success"), "defect");
    }

    #[rstest]
    fn unwrap_or_resume_reraises_the_defect_payload() {
        let died: Exit<String, u32> = Exit::Failure(Cause::Panic(Defect::new(11_u16)));
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || died.unwrap_or_resume()));
        assert_eq!(caught.unwrap_err().downcast_ref::<u16>(), Some(&11));
    }

    #[rstest]
    fn conversions_round_trip_through_result() {
        let exit: Exit<String, u32> = Exit::from(Ok::<_, String>(9));
        assert_eq!(exit.success(), Some(9));

        let exit: Exit<String, u32> = Exit::from(Err("gone".to_string()));
        let result: Result<u32, Cause<String>> = exit.into();
        assert_eq!(result.unwrap_err().into_failure(), Some("gone".to_string()));
    }
}
