//! The effect algebra: nine primitive constructors behind a typed facade.
//!
//! An [`Effect<R, E, A>`](Effect) is a first-class description of a
//! computation that reads an environment `R` and either succeeds with an
//! `A`, fails with an expected `E`, or dies with a defect. Building an
//! effect performs no work; the tree of primitives is walked later by the
//! interpreter in [`crate::effect::interpreter`].
//!
//! # Design
//!
//! Internally every node is type-erased: values travel as `Box<dyn Any>`,
//! environments as `Rc<dyn Any>`, and expected errors as `Box<dyn Any>`.
//! The typed `Effect` wrapper re-establishes the types at the boundary with
//! downcasts that cannot fail for values built through the public
//! constructors. This keeps the interpreter monomorphic: one loop serves
//! every `(R, E, A)` instantiation, and `Fold` can change the error type
//! mid-tree without any subtyping.
//!
//! # One-shot values
//!
//! Effect values own `FnOnce` closures and are consumed by evaluation.
//! Re-running a computation means rebuilding its effect value, or using a
//! factory-based combinator such as
//! [`Effect::forever`](crate::effect::Effect::forever).
//!
//! # Examples
//!
//! ```rust
//! use rea::effect::{Effect, Runtime};
//!
//! let effect: Effect<(), String, u32> = Effect::succeed(20).map(|n| n + 2);
//! let exit = Runtime::new(()).unsafe_run_sync(effect);
//! assert_eq!(exit.success(), Some(22));
//! ```

use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::cause::{Cause, Defect};
use crate::effect::scope::{Scope, ScopeCore};
use crate::exit::Exit;

// =============================================================================
// Erased representation
// =============================================================================

/// A type-erased success value.
pub(crate) type AnyValue = Box<dyn Any>;

/// A type-erased expected-error payload.
pub(crate) type AnyError = Box<dyn Any>;

/// A type-erased, shareable environment.
pub(crate) type AnyEnv = Rc<dyn Any>;

/// A failure cause whose expected payload is erased.
pub(crate) type ErasedCause = Cause<AnyError>;

/// The nine primitive effect constructors, type-erased.
///
/// The interpreter is the sole consumer; each variant corresponds to one
/// row of its step table.
pub(crate) enum Node {
    /// Yields the value.
    Succeed(AnyValue),
    /// Yields a failing exit with the cause.
    Fail(ErasedCause),
    /// Yields the node obtained by applying the function to the current
    /// environment.
    Access(Box<dyn FnOnce(&AnyEnv) -> Node>),
    /// Sequences the inner node, then the continuation.
    FlatMap(Box<Node>, Box<dyn FnOnce(AnyValue) -> Node>),
    /// Installs a both-branches continuation; the only defect-observing
    /// primitive.
    Fold {
        inner: Box<Node>,
        on_success: Box<dyn FnOnce(AnyValue) -> Node>,
        on_failure: Box<dyn FnOnce(ErasedCause) -> Node>,
    },
    /// Runs the thunk; non-fatal panics become expected failures.
    Partial(Box<dyn FnOnce() -> AnyValue>),
    /// Runs the thunk, assumed not to panic.
    Total(Box<dyn FnOnce() -> AnyValue>),
    /// A suspended imperative block with a non-local failure exit.
    Comprehension(Box<dyn FnOnce(ScopeCore) -> Node>),
    /// Replaces the environment for the duration of the inner node.
    Provide(Box<Node>, AnyEnv),
}

/// Recovers a concrete value from an erased one.
///
/// The expectation encodes an internal invariant: nodes are only ever built
/// through the typed constructors, so the payload type always matches.
pub(crate) fn unbox<A: 'static>(value: AnyValue) -> A {
    *value
        .downcast::<A>()
        .expect("type mismatch in erased effect value")
}

/// Erases the expected payload of a typed cause.
pub(crate) fn erase_cause<E: 'static>(cause: Cause<E>) -> ErasedCause {
    match cause {
        Cause::Expected(error) => Cause::Expected(Box::new(error)),
        Cause::Panic(defect) => Cause::Panic(defect),
    }
}

/// Re-establishes the expected payload type of an erased cause.
pub(crate) fn concretise_cause<E: 'static>(cause: ErasedCause) -> Cause<E> {
    match cause {
        Cause::Expected(error) => Cause::Expected(
            *error
                .downcast::<E>()
                .expect("type mismatch in erased failure cause"),
        ),
        Cause::Panic(defect) => Cause::Panic(defect),
    }
}

// =============================================================================
// Typed facade
// =============================================================================

/// A deferred computation over an environment `R`, failing with `E` or
/// succeeding with `A`.
///
/// Construction is pure and cheap; nothing runs until the effect is handed
/// to a [`Runtime`](crate::effect::Runtime). See the
/// [module docs](crate::effect) for the full combinator surface.
pub struct Effect<R, E, A> {
    pub(crate) node: Node,
    pub(crate) _types: PhantomData<fn(R) -> (E, A)>,
}

impl<R, E, A> Effect<R, E, A>
where
    R: 'static,
    E: 'static,
    A: 'static,
{
    /// Wraps a raw node, restoring the phantom types.
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node,
            _types: PhantomData,
        }
    }

    /// An effect that immediately succeeds with the value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::succeed(42);
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(42));
    /// ```
    pub fn succeed(value: A) -> Self {
        Self::from_node(Node::Succeed(Box::new(value)))
    }

    /// An effect that immediately fails with the expected error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::fail("missing".to_string());
    /// let exit = Runtime::new(()).unsafe_run_sync(effect);
    /// assert!(exit.is_failure());
    /// ```
    pub fn fail(error: E) -> Self {
        Self::from_node(Node::Fail(Cause::Expected(Box::new(error))))
    }

    /// An effect that immediately fails with the given cause, expected or
    /// defect alike.
    pub fn halt(cause: Cause<E>) -> Self {
        Self::from_node(Node::Fail(erase_cause(cause)))
    }

    /// Lifts a finished exit back into an effect.
    pub fn done(exit: Exit<E, A>) -> Self {
        match exit {
            Exit::Success(value) => Self::succeed(value),
            Exit::Failure(cause) => Self::halt(cause),
        }
    }

    /// Lifts a pure result into an effect.
    pub fn from_result(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => Self::succeed(value),
            Err(error) => Self::fail(error),
        }
    }

    /// An effect that fails when the value is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let present: Effect<(), String, u32> =
    ///     Effect::from_option(Some(5), || "absent".to_string());
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(present).success(), Some(5));
    /// ```
    pub fn from_option<F>(value: Option<A>, error: F) -> Self
    where
        F: FnOnce() -> E,
    {
        match value {
            Some(value) => Self::succeed(value),
            None => Self::fail(error()),
        }
    }

    /// Projects a value out of the current environment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// struct Config {
    ///     port: u16,
    /// }
    ///
    /// let port: Effect<Config, String, u16> = Effect::access(|config: &Config| config.port);
    /// let exit = Runtime::new(Config { port: 8080 }).unsafe_run_sync(port);
    /// assert_eq!(exit.success(), Some(8080));
    /// ```
    pub fn access<F>(function: F) -> Self
    where
        F: FnOnce(&R) -> A + 'static,
    {
        Self::access_m(move |environment| Self::succeed(function(environment)))
    }

    /// Continues with the effect obtained from the current environment.
    pub fn access_m<F>(function: F) -> Self
    where
        F: FnOnce(&R) -> Self + 'static,
    {
        Self::from_node(Node::Access(Box::new(move |environment: &AnyEnv| {
            let typed = (**environment)
                .downcast_ref::<R>()
                .expect("type mismatch in effect environment");
            function(typed).node
        })))
    }

    /// Defers a thunk that is assumed never to panic.
    ///
    /// If the assumption is wrong, the panic is reclassified as a defect
    /// (observable only to [`fold_cause_m`](Effect::fold_cause_m) and
    /// [`recover_cause`](Effect::recover_cause)).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::total(|| 6 * 7);
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(42));
    /// ```
    pub fn total<F>(thunk: F) -> Self
    where
        F: FnOnce() -> A + 'static,
    {
        Self::from_node(Node::Total(Box::new(move || Box::new(thunk()) as AnyValue)))
    }

    /// A suspended imperative block with non-local failure exits.
    ///
    /// The body receives a [`Scope`] whose [`run`](Scope::run) extracts the
    /// success value of an inner effect, or short-circuits the whole
    /// comprehension with the inner failure. See
    /// [`crate::effect::scope`] for the full contract.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::comprehension(|scope| {
    ///     let a = scope.run(Effect::succeed(5));
    ///     let b = scope.run(Effect::succeed(4));
    ///     Effect::succeed(a * b)
    /// });
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(20));
    /// ```
    pub fn comprehension<F>(body: F) -> Self
    where
        F: FnOnce(&Scope<R, E>) -> Self + 'static,
    {
        Self::from_node(Node::Comprehension(Box::new(move |core: ScopeCore| {
            let scope = Scope::new(core);
            body(&scope).node
        })))
    }

    /// Supplies the environment, producing an effect that no longer needs
    /// one.
    ///
    /// The caller picks the resulting environment type freely; the effect
    /// never reads it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let doubled: Effect<u32, String, u32> = Effect::access(|n: &u32| n * 2);
    /// let provided: Effect<(), String, u32> = doubled.provide(21);
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(provided).success(), Some(42));
    /// ```
    pub fn provide<R2: 'static>(self, environment: R) -> Effect<R2, E, A> {
        Effect::from_node(Node::Provide(Box::new(self.node), Rc::new(environment)))
    }
}

impl<R, E> Effect<R, E, R>
where
    R: Clone + 'static,
    E: 'static,
{
    /// Yields the whole current environment.
    pub fn environment() -> Self {
        Self::access(|environment: &R| environment.clone())
    }
}

impl<R, A> Effect<R, Defect, A>
where
    R: 'static,
    A: 'static,
{
    /// Defers a thunk whose panics become **expected** failures.
    ///
    /// Any non-fatal panic raised by the thunk is captured as
    /// `Expected(Defect)`, so the failure can be handled with the ordinary
    /// error operators ([`recover`](Effect::recover),
    /// [`map_error`](Effect::map_error), …) and refined to a concrete type
    /// with [`refine_or_die`](Effect::refine_or_die). Panics carrying a
    /// [`Fatal`](crate::cause::Fatal) payload are re-raised, never captured.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), _, u32> = Effect::capture(|| panic!("io refused"));
    /// let exit = Runtime::new(()).unsafe_run_sync(effect);
    /// let error = exit.cause().and_then(|cause| cause.into_failure()).unwrap();
    /// assert_eq!(error.message(), "io refused");
    /// ```
    pub fn capture<F>(thunk: F) -> Self
    where
        F: FnOnce() -> A + 'static,
    {
        Self::from_node(Node::Partial(Box::new(move || Box::new(thunk()) as AnyValue)))
    }
}

impl<R, E, A> From<Result<A, E>> for Effect<R, E, A>
where
    R: 'static,
    E: 'static,
    A: 'static,
{
    fn from(result: Result<A, E>) -> Self {
        Self::from_result(result)
    }
}

impl<R, E, A> std::fmt::Debug for Effect<R, E, A> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.node {
            Node::Succeed(_) => "Succeed",
            Node::Fail(_) => "Fail",
            Node::Access(_) => "Access",
            Node::FlatMap(_, _) => "FlatMap",
            Node::Fold { .. } => "Fold",
            Node::Partial(_) => "Partial",
            Node::Total(_) => "Total",
            Node::Comprehension(_) => "Comprehension",
            Node::Provide(_, _) => "Provide",
        };
        formatter.debug_tuple("Effect").field(&label).finish()
    }
}
