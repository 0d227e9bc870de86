//! Derived operators over the effect algebra.
//!
//! Everything here is expressed through the nine primitives of
//! [`crate::effect::algebra`]; no combinator talks to the interpreter
//! directly. The failure-channel discipline is uniform:
//!
//! - [`fold_cause_m`](Effect::fold_cause_m) and
//!   [`recover_cause`](Effect::recover_cause) observe the full
//!   [`Cause`] — expected failures *and* defects.
//! - Every other operator observes expected failures at most, and lets
//!   defects flow through completely untouched.
//!
//! # Laws
//!
//! The combinators satisfy the usual functor/monad laws, checked by the
//! property suites in `tests/effect_laws.rs`:
//!
//! - `succeed(a).map(f) == succeed(f(a))`
//! - `succeed(a).flat_map(k) == k(a)` and `m.flat_map(succeed) == m`
//! - `traverse(xs, f) == collect(xs.map(f))`
//! - `m.flip().flip() == m` on pure succeed/fail effects

use std::convert::Infallible;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::cause::{Cause, Defect};
use crate::effect::algebra::{concretise_cause, unbox, Effect, Node};

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: 'static,
    A: 'static,
{
    /// Transforms the success value. Failures are not observed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::succeed(21).map(|n| n * 2);
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(42));
    /// ```
    pub fn map<B, F>(self, function: F) -> Effect<R, E, B>
    where
        B: 'static,
        F: FnOnce(A) -> B + 'static,
    {
        self.flat_map(move |value| Effect::succeed(function(value)))
    }

    /// Sequences this effect with a continuation on its success value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> =
    ///     Effect::succeed(20).flat_map(|n| Effect::succeed(n + 2));
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(42));
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> Effect<R, E, B>
    where
        B: 'static,
        F: FnOnce(A) -> Effect<R, E, B> + 'static,
    {
        Effect::from_node(Node::FlatMap(
            Box::new(self.node),
            Box::new(move |value| function(unbox::<A>(value)).node),
        ))
    }

    /// Alias for [`flat_map`](Effect::flat_map).
    pub fn and_then<B, F>(self, function: F) -> Effect<R, E, B>
    where
        B: 'static,
        F: FnOnce(A) -> Effect<R, E, B> + 'static,
    {
        self.flat_map(function)
    }

    /// Installs a both-branches continuation over the full cause.
    ///
    /// This is the only operator through which a **defect** can be
    /// observed; everything else forwards defects unchanged.
    pub fn fold_cause_m<E2, B, FF, FS>(self, on_failure: FF, on_success: FS) -> Effect<R, E2, B>
    where
        E2: 'static,
        B: 'static,
        FF: FnOnce(Cause<E>) -> Effect<R, E2, B> + 'static,
        FS: FnOnce(A) -> Effect<R, E2, B> + 'static,
    {
        Effect::from_node(Node::Fold {
            inner: Box::new(self.node),
            on_success: Box::new(move |value| on_success(unbox::<A>(value)).node),
            on_failure: Box::new(move |cause| on_failure(concretise_cause::<E>(cause)).node),
        })
    }

    /// Folds over the expected failure or the success value; defects are
    /// re-raised unchanged.
    pub fn fold_m<E2, B, FF, FS>(self, on_failure: FF, on_success: FS) -> Effect<R, E2, B>
    where
        E2: 'static,
        B: 'static,
        FF: FnOnce(E) -> Effect<R, E2, B> + 'static,
        FS: FnOnce(A) -> Effect<R, E2, B> + 'static,
    {
        self.fold_cause_m(
            move |cause| match cause {
                Cause::Expected(error) => on_failure(error),
                Cause::Panic(defect) => Effect::halt(Cause::Panic(defect)),
            },
            on_success,
        )
    }

    /// Pure eliminator over expected failure and success; always succeeds.
    ///
    /// Defects are re-raised unchanged, like [`fold_m`](Effect::fold_m).
    pub fn fold<B, FF, FS>(self, on_failure: FF, on_success: FS) -> Effect<R, Infallible, B>
    where
        B: 'static,
        FF: FnOnce(E) -> B + 'static,
        FS: FnOnce(A) -> B + 'static,
    {
        self.fold_m(
            move |error| Effect::succeed(on_failure(error)),
            move |value| Effect::succeed(on_success(value)),
        )
    }

    /// Transforms the expected failure; successes and defects pass through.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), usize, u32> =
    ///     Effect::fail("four".to_string()).map_error(|error| error.len());
    /// let cause = Runtime::new(()).unsafe_run_sync(effect).cause().unwrap();
    /// assert_eq!(cause.into_failure(), Some(4));
    /// ```
    pub fn map_error<E2, F>(self, function: F) -> Effect<R, E2, A>
    where
        E2: 'static,
        F: FnOnce(E) -> E2 + 'static,
    {
        self.fold_cause_m(
            move |cause| Effect::halt(cause.map(function)),
            |value| Effect::succeed(value),
        )
    }

    /// Recovers from an expected failure with a new effect.
    ///
    /// A success passes through, and so does a defect: only `Expected`
    /// failures reach the handler.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> =
    ///     Effect::fail("gone".to_string()).recover(|_| Effect::succeed(0));
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(0));
    /// ```
    pub fn recover<E2, F>(self, handler: F) -> Effect<R, E2, A>
    where
        E2: 'static,
        F: FnOnce(E) -> Effect<R, E2, A> + 'static,
    {
        self.fold_m(handler, |value| Effect::succeed(value))
    }

    /// Recovers from any cause, defects included.
    pub fn recover_cause<E2, F>(self, handler: F) -> Effect<R, E2, A>
    where
        E2: 'static,
        F: FnOnce(Cause<E>) -> Effect<R, E2, A> + 'static,
    {
        self.fold_cause_m(handler, |value| Effect::succeed(value))
    }

    /// Replaces any expected failure with a pure default.
    pub fn recover_default(self, default: A) -> Effect<R, Infallible, A> {
        self.fold_m(move |_| Effect::succeed(default), |value| Effect::succeed(value))
    }

    /// Materialises the expected channel as a [`Result`], so the effect
    /// itself can no longer fail expectedly.
    ///
    /// Defects are *not* materialised: they keep propagating unchanged,
    /// observable only to [`fold_cause_m`](Effect::fold_cause_m). This is
    /// deliberate — reclassifying a defect as an expected failure would
    /// silently launder bugs into the error channel.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::fail("gone".to_string());
    /// let exit = Runtime::new(()).unsafe_run_sync(effect.attempt());
    /// assert_eq!(exit.success(), Some(Err("gone".to_string())));
    /// ```
    pub fn attempt(self) -> Effect<R, Infallible, Result<A, E>> {
        self.fold_m(
            |error| Effect::succeed(Err(error)),
            |value| Effect::succeed(Ok(value)),
        )
    }

    /// Swaps the failure and success channels.
    ///
    /// Defects keep propagating unchanged; only the expected channel
    /// trades places with the success channel.
    pub fn flip(self) -> Effect<R, A, E> {
        self.fold_m(
            |error| Effect::succeed(error),
            |value| Effect::fail(value),
        )
    }

    /// Sequences two effects into a pair.
    ///
    /// Fails with the left effect's failure if it fails, otherwise with
    /// the right's.
    pub fn zip<B: 'static>(self, other: Effect<R, E, B>) -> Effect<R, E, (A, B)> {
        self.zip_with(other, |left, right| (left, right))
    }

    /// Sequences two effects and combines their values.
    pub fn zip_with<B, C, F>(self, other: Effect<R, E, B>, function: F) -> Effect<R, E, C>
    where
        B: 'static,
        C: 'static,
        F: FnOnce(A, B) -> C + 'static,
    {
        self.flat_map(move |left| other.map(move |right| function(left, right)))
    }

    /// Discards the success value.
    pub fn ignore(self) -> Effect<R, E, ()> {
        self.map(|_| ())
    }

    /// Evaluates all effects left to right and collects their values.
    ///
    /// Short-circuits on the first failure; on success the output order
    /// equals the input order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effects: Vec<Effect<(), String, u32>> =
    ///     (0..4).map(Effect::succeed).collect();
    /// let exit = Runtime::new(()).unsafe_run_sync(Effect::collect(effects));
    /// assert_eq!(exit.success(), Some(vec![0, 1, 2, 3]));
    /// ```
    pub fn collect<I>(effects: I) -> Effect<R, E, Vec<A>>
    where
        I: IntoIterator<Item = Self>,
    {
        effects
            .into_iter()
            .fold(Effect::succeed(Vec::new()), |accumulated, effect| {
                accumulated.flat_map(move |mut values| {
                    effect.map(move |value| {
                        values.push(value);
                        values
                    })
                })
            })
    }

    /// Applies an effectful function to every item and collects the
    /// results, left to right, short-circuiting on the first failure.
    ///
    /// Equivalent to mapping first and then [`collect`](Effect::collect)ing.
    pub fn traverse<X, I, F>(items: I, function: F) -> Effect<R, E, Vec<A>>
    where
        I: IntoIterator<Item = X>,
        F: Fn(X) -> Self,
    {
        let effects: Vec<Self> = items.into_iter().map(function).collect();
        Self::collect(effects)
    }

    /// Runs `summary` before and after this effect and combines the two
    /// observations alongside the result.
    pub fn summarized<B, C, S, F>(self, summary: S, combine: F) -> Effect<R, E, (C, A)>
    where
        B: 'static,
        C: 'static,
        S: Fn() -> B + 'static,
        F: FnOnce(B, B) -> C + 'static,
    {
        let summary = Rc::new(summary);
        let after = Rc::clone(&summary);
        Effect::<R, E, B>::total(move || summary()).flat_map(move |start| {
            self.flat_map(move |value| {
                Effect::<R, E, B>::total(move || after())
                    .map(move |end| (combine(start, end), value))
            })
        })
    }

    /// Measures the wall-clock duration of this effect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::succeed(42);
    /// let timed = Runtime::new(()).unsafe_run_sync(effect.measured());
    /// let (elapsed, value) = timed.success().unwrap();
    /// assert_eq!(value, 42);
    /// assert!(elapsed.as_secs() < 1);
    /// ```
    pub fn measured(self) -> Effect<R, E, (Duration, A)> {
        self.summarized(Instant::now, |start, end| end.duration_since(start))
    }

    /// Repeats effects produced by the factory until one fails.
    ///
    /// The factory is invoked once per iteration, so the computation never
    /// terminates successfully; the only way out is a failure (or defect)
    /// of an iteration, which surfaces immediately.
    pub fn forever<F>(make: F) -> Effect<R, E, Infallible>
    where
        F: Fn() -> Self + 'static,
    {
        fn step<R, E, A>(make: Rc<dyn Fn() -> Effect<R, E, A>>) -> Effect<R, E, Infallible>
        where
            R: 'static,
            E: 'static,
            A: 'static,
        {
            let again = Rc::clone(&make);
            make().flat_map(move |_| step(again))
        }
        step(Rc::new(make))
    }
}

// =============================================================================
// Conditional constructors
// =============================================================================

impl<R, E> Effect<R, E, ()>
where
    R: 'static,
    E: 'static,
{
    /// Fails with the produced error when the condition holds; succeeds
    /// with unit otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let check: Effect<(), String, ()> =
    ///     Effect::fail_when(false, || "too large".to_string());
    /// assert!(Runtime::new(()).unsafe_run_sync(check).is_success());
    /// ```
    pub fn fail_when<F>(condition: bool, error: F) -> Self
    where
        F: FnOnce() -> E,
    {
        if condition {
            Self::fail(error())
        } else {
            Self::succeed(())
        }
    }
}

// =============================================================================
// Optional values
// =============================================================================

impl<R, E, A> Effect<R, E, Option<A>>
where
    R: 'static,
    E: 'static,
    A: 'static,
{
    /// Replaces an absent value with a fallback effect.
    pub fn on_none(self, fallback: Effect<R, E, A>) -> Effect<R, E, A> {
        self.flat_map(move |value| match value {
            Some(value) => Effect::succeed(value),
            None => fallback,
        })
    }

    /// Fails with the produced error when the value is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> =
    ///     Effect::succeed(None).on_none_fail(|| "absent".to_string());
    /// assert!(Runtime::new(()).unsafe_run_sync(effect).is_failure());
    /// ```
    pub fn on_none_fail<F>(self, error: F) -> Effect<R, E, A>
    where
        F: FnOnce() -> E + 'static,
    {
        self.flat_map(move |value| Effect::from_option(value, error))
    }

    /// Replaces an absent value with a pure default.
    pub fn on_none_default(self, default: A) -> Effect<R, E, A> {
        self.on_none(Effect::succeed(default))
    }
}

// =============================================================================
// Defect-typed failures
// =============================================================================

impl<R, A> Effect<R, Defect, A>
where
    R: 'static,
    A: 'static,
{
    /// Refines a captured defect-typed failure to a concrete error type.
    ///
    /// Failures whose payload is an `E2` become expected failures of that
    /// type, with the originally-raised instance as the payload. Every
    /// other failure is converted to a defect — a bug, as far as the
    /// refined effect is concerned. Defects that were already defects are
    /// re-raised unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct BadInput(u32);
    ///
    /// let effect: Effect<(), _, u32> =
    ///     Effect::capture(|| std::panic::panic_any(BadInput(7)));
    /// let refined = effect.refine_or_die::<BadInput>();
    /// let cause = Runtime::new(()).unsafe_run_sync(refined).cause().unwrap();
    /// assert_eq!(cause.into_failure(), Some(BadInput(7)));
    /// ```
    pub fn refine_or_die<E2>(self) -> Effect<R, E2, A>
    where
        E2: std::any::Any + Send + 'static,
    {
        self.fold_m(
            |defect| match defect.downcast::<E2>() {
                Ok(error) => Effect::fail(error),
                Err(defect) => Effect::halt(Cause::Panic(defect)),
            },
            |value| Effect::succeed(value),
        )
    }
}

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: std::any::Any + Send + 'static,
    A: 'static,
{
    /// Converts any expected failure into a defect, erasing the expected
    /// channel.
    ///
    /// The failure value itself becomes the defect payload, so the
    /// original instance remains observable through
    /// [`Defect::downcast_ref`](crate::cause::Defect::downcast_ref).
    pub fn or_die(self) -> Effect<R, Infallible, A> {
        self.fold_m(
            |error| Effect::halt(Cause::Panic(Defect::new(error))),
            |value| Effect::succeed(value),
        )
    }
}

// =============================================================================
// Infallible failures
// =============================================================================

impl<R, A> Effect<R, Infallible, A>
where
    R: 'static,
    A: 'static,
{
    /// Re-types an effect that cannot fail into any failure channel.
    pub fn widen<E2: 'static>(self) -> Effect<R, E2, A> {
        self.map_error(|never| match never {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Runtime;
    use rstest::rstest;

    fn run<E: 'static, A: 'static>(effect: Effect<(), E, A>) -> crate::exit::Exit<E, A> {
        Runtime::new(()).unsafe_run_sync(effect)
    }

    #[rstest]
    fn map_does_not_observe_failures() {
        let effect: Effect<(), String, u32> =
            Effect::fail("gone".to_string()).map(|n: u32| n + 1);
        let cause = run(effect).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("gone".to_string()));
    }

    #[rstest]
    fn map_error_leaves_defects_untouched() {
        let effect: Effect<(), String, u32> = Effect::total(|| panic!("boom"));
        let mapped = effect.map_error(|error: String| error.len());
        let cause = run(mapped).cause().unwrap();
        assert!(cause.is_panic());
    }

    #[rstest]
    fn recover_handles_expected_failures_only() {
        let failing: Effect<(), String, u32> = Effect::fail("gone".to_string());
        let healed = failing.recover::<String, _>(|_| Effect::succeed(7));
        assert_eq!(run(healed).success(), Some(7));

        let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
        let still_dead = dying.recover::<String, _>(|_| Effect::succeed(7));
        assert!(run(still_dead).cause().unwrap().is_panic());
    }

    #[rstest]
    fn recover_cause_handles_defects_too() {
        let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
        let healed = dying.recover_cause::<String, _>(|_| Effect::succeed(3));
        assert_eq!(run(healed).success(), Some(3));
    }

    #[rstest]
    fn recover_default_replaces_expected_failures() {
        let failing: Effect<(), String, u32> = Effect::fail("gone".to_string());
        assert_eq!(run(failing.recover_default(9)).success(), Some(9));
    }

    #[rstest]
    fn attempt_materialises_both_expected_outcomes() {
        let success: Effect<(), String, u32> = Effect::succeed(1);
        assert_eq!(run(success.attempt()).success(), Some(Ok(1)));

        let failure: Effect<(), String, u32> = Effect::fail("e".to_string());
        assert_eq!(run(failure.attempt()).success(), Some(Err("e".to_string())));
    }

    #[rstest]
    fn attempt_keeps_defects_in_flight() {
        let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
        let cause = run(dying.attempt()).cause().unwrap();
        assert!(cause.is_panic());
    }

    #[rstest]
    fn flip_swaps_the_channels() {
        let success: Effect<(), String, u32> = Effect::succeed(1);
        let flipped = success.flip();
        let cause = run(flipped).cause().unwrap();
        assert_eq!(cause.into_failure(), Some(1));
    }

    #[rstest]
    fn zip_fails_with_the_left_failure_first() {
        let left: Effect<(), String, u32> = Effect::fail("left".to_string());
        let right: Effect<(), String, u32> = Effect::fail("right".to_string());
        let cause = run(left.zip(right)).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("left".to_string()));
    }

    #[rstest]
    fn zip_with_combines_in_order() {
        let left: Effect<(), String, u32> = Effect::succeed(6);
        let right: Effect<(), String, u32> = Effect::succeed(7);
        assert_eq!(run(left.zip_with(right, |a, b| a * b)).success(), Some(42));
    }

    #[rstest]
    fn collect_preserves_input_order() {
        let effects: Vec<Effect<(), String, u32>> = (0..5).map(Effect::succeed).collect();
        assert_eq!(run(Effect::collect(effects)).success(), Some(vec![0, 1, 2, 3, 4]));
    }

    #[rstest]
    fn collect_short_circuits_on_the_first_failure() {
        let effects: Vec<Effect<(), String, u32>> = vec![
            Effect::succeed(1),
            Effect::fail("error".to_string()),
            Effect::succeed(3),
        ];
        let cause = run(Effect::collect(effects)).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("error".to_string()));
    }

    #[rstest]
    fn traverse_matches_map_then_collect() {
        let traversed: Effect<(), String, Vec<u32>> =
            Effect::traverse(0..5_u32, |n| Effect::succeed(n * 2));
        assert_eq!(run(traversed).success(), Some(vec![0, 2, 4, 6, 8]));
    }

    #[rstest]
    fn fail_when_fires_only_on_true() {
        let pass: Effect<(), String, ()> = Effect::fail_when(false, || "nope".to_string());
        assert!(run(pass).is_success());

        let fire: Effect<(), String, ()> = Effect::fail_when(true, || "nope".to_string());
        assert!(run(fire).is_failure());
    }

    #[rstest]
    fn on_none_family_covers_the_three_shapes() {
        let absent: Effect<(), String, Option<u32>> = Effect::succeed(None);
        assert_eq!(run(absent.on_none(Effect::succeed(1))).success(), Some(1));

        let absent: Effect<(), String, Option<u32>> = Effect::succeed(None);
        assert!(run(absent.on_none_fail(|| "none".to_string())).is_failure());

        let present: Effect<(), String, Option<u32>> = Effect::succeed(Some(5));
        assert_eq!(run(present.on_none_default(9)).success(), Some(5));
    }

    #[rstest]
    fn ignore_discards_the_value() {
        let effect: Effect<(), String, u32> = Effect::succeed(5);
        assert_eq!(run(effect.ignore()).success(), Some(()));
    }

    #[rstest]
    fn or_die_keeps_the_original_failure_instance() {
        let effect: Effect<(), String, u32> = Effect::fail("kept".to_string());
        let cause = run(effect.or_die()).cause().unwrap();
        let defect = cause.into_defect().unwrap();
        assert_eq!(defect.downcast_ref::<String>().map(String::as_str), Some("kept"));
    }

    #[rstest]
    fn widen_retypes_an_infallible_effect() {
        let effect: Effect<(), Infallible, u32> = Effect::succeed(4);
        let widened: Effect<(), String, u32> = effect.widen();
        assert_eq!(run(widened).success(), Some(4));
    }

    #[rstest]
    fn forever_surfaces_the_first_failure() {
        let effect = Effect::<(), String, u32>::forever(|| Effect::fail("spin".to_string()));
        let cause = run(effect).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("spin".to_string()));
    }

    #[rstest]
    fn summarized_combines_both_observations() {
        let effect: Effect<(), String, u32> = Effect::succeed(1);
        let summarized = effect.summarized(|| 10_u32, |start, end| start + end);
        assert_eq!(run(summarized).success(), Some((20, 1)));
    }
}
