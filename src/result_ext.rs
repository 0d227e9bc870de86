//! Pure-values vocabulary over [`std::result::Result`].
//!
//! Effects trade in deferred computations; `Result` is their immediate
//! counterpart, and [`Effect::attempt`](crate::effect::Effect::attempt)
//! and [`Effect::from_result`](crate::effect::Effect::from_result) convert
//! between the two. Most of the vocabulary already ships with the standard
//! library:
//!
//! | operation            | std name            |
//! |----------------------|---------------------|
//! | transform the value  | [`Result::map`]     |
//! | sequence             | [`Result::and_then`]|
//! | transform the error  | [`Result::map_err`] |
//! | recover with a result| [`Result::or_else`] |
//! | recover with a value | [`Result::unwrap_or`] / [`Result::unwrap_or_else`] |
//! | comprehension        | the `?` operator    |
//!
//! This module adds the remainder: [`ResultExt::fold`] as the total
//! eliminator, [`ResultExt::contains`], and the iterable helpers
//! [`sequence`] and [`partition`].
//!
//! # Examples
//!
//! ```rust
//! use rea::result_ext::{sequence, ResultExt};
//!
//! let results: Vec<Result<u32, String>> = vec![Ok(1), Ok(2), Ok(3)];
//! assert_eq!(sequence(results), Ok(vec![1, 2, 3]));
//!
//! let described = Ok::<_, String>(2).fold(|error| error, |value| format!("got {value}"));
//! assert_eq!(described, "got 2");
//! ```

/// Extension operations on [`Result`] beyond the standard library surface.
pub trait ResultExt<T, E> {
    /// Total eliminator: applies exactly one of the two functions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::result_ext::ResultExt;
    ///
    /// let ok: Result<u32, String> = Ok(2);
    /// assert_eq!(ok.fold(|_| 0, |value| value * 10), 20);
    ///
    /// let err: Result<u32, String> = Err("gone".to_string());
    /// assert_eq!(err.fold(|error| error.len() as u32, |value| value), 4);
    /// ```
    fn fold<U, F, G>(self, on_err: F, on_ok: G) -> U
    where
        F: FnOnce(E) -> U,
        G: FnOnce(T) -> U;

    /// Returns `true` when this is `Ok` with exactly the given value.
    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn fold<U, F, G>(self, on_err: F, on_ok: G) -> U
    where
        F: FnOnce(E) -> U,
        G: FnOnce(T) -> U,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        matches!(self, Ok(contained) if contained == value)
    }
}

/// Collects results left to right, short-circuiting on the first error.
///
/// On success the output order equals the input order.
///
/// # Examples
///
/// ```rust
/// use rea::result_ext::sequence;
///
/// let mixed: Vec<Result<u32, String>> = vec![Ok(1), Err("two".to_string()), Ok(3)];
/// assert_eq!(sequence(mixed), Err("two".to_string()));
/// ```
///
/// # Errors
///
/// Returns the first `Err` encountered.
pub fn sequence<T, E, I>(results: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}

/// Splits results into their `Ok` and `Err` values, preserving order
/// within each side.
///
/// # Examples
///
/// ```rust
/// use rea::result_ext::partition;
///
/// let mixed: Vec<Result<u32, String>> =
///     vec![Ok(1), Err("two".to_string()), Ok(3)];
/// let (values, errors) = partition(mixed);
/// assert_eq!(values, vec![1, 3]);
/// assert_eq!(errors, vec!["two".to_string()]);
/// ```
pub fn partition<T, E, I>(results: I) -> (Vec<T>, Vec<E>)
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }
    (values, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fold_applies_exactly_one_branch() {
        let ok: Result<u32, String> = Ok(3);
        assert_eq!(ok.fold(|_| 0, |value| value + 1), 4);

        let err: Result<u32, String> = Err("x".to_string());
        assert_eq!(err.fold(|error| error.len() as u32, |value| value), 1);
    }

    #[rstest]
    fn contains_matches_only_the_exact_ok_value() {
        let ok: Result<u32, String> = Ok(3);
        assert!(ok.contains(&3));
        assert!(!ok.contains(&4));

        let err: Result<u32, String> = Err("x".to_string());
        assert!(!err.contains(&3));
    }

    #[rstest]
    fn sequence_preserves_order_on_success() {
        let results: Vec<Result<u32, String>> = (0..5).map(Ok).collect();
        assert_eq!(sequence(results), Ok(vec![0, 1, 2, 3, 4]));
    }

    #[rstest]
    fn sequence_returns_the_first_error() {
        let results: Vec<Result<u32, String>> = vec![
            Ok(1),
            Err("first".to_string()),
            Err("second".to_string()),
        ];
        assert_eq!(sequence(results), Err("first".to_string()));
    }

    #[rstest]
    fn partition_splits_both_sides_in_order() {
        let results: Vec<Result<u32, String>> = vec![
            Ok(1),
            Err("a".to_string()),
            Ok(2),
            Err("b".to_string()),
        ];
        let (values, errors) = partition(results);
        assert_eq!(values, vec![1, 2]);
        assert_eq!(errors, vec!["a".to_string(), "b".to_string()]);
    }
}
