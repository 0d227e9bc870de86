//! The trampolined evaluation loop and the [`Runtime`] capability.
//!
//! Evaluation walks an effect tree iteratively: a current-node register, an
//! explicit continuation stack, and an environment stack replace host
//! recursion, so arbitrarily deep `flat_map` chains evaluate in constant
//! host-stack space. One interpreter invocation is strictly synchronous and
//! single-threaded; independent invocations (one per [`Runtime::unsafe_run_sync`]
//! call) share nothing.
//!
//! # Frames
//!
//! The continuation stack holds three kinds of frame:
//!
//! - `Continue` — a plain flat-map continuation, applied to a success value
//!   and discarded during unwinding.
//! - `Fold` — a both-branches continuation. On success its `on_success`
//!   behaves like a plain frame; on failure it is the frame unwinding stops
//!   at, resuming with `on_failure` applied to the cause. The first `Fold`
//!   reached wins; there is no look-ahead.
//! - `RestoreEnv` — pops the environment stack. Pushed by `Provide` and
//!   honoured on the success path and the unwind path alike, so an
//!   environment override ends with its region on every exit.
//!
//! # Panics during evaluation
//!
//! Every host closure the loop invokes (continuations, fold branches,
//! access functions, thunks) runs under `catch_unwind`:
//!
//! - A payload of type [`Fatal`] is re-raised immediately; no handler may
//!   observe it.
//! - A comprehension sentinel is re-raised so it reaches the comprehension
//!   that owns it.
//! - Inside a `Partial` thunk, any other panic becomes an **expected**
//!   failure of type [`Defect`].
//! - Everywhere else, any other panic is reclassified as a
//!   [`Cause::Panic`] defect and unwinding begins with that cause.

use std::any::Any;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::cause::{Cause, Defect, Fatal};
use crate::effect::algebra::{
    concretise_cause, unbox, AnyEnv, AnyError, AnyValue, Effect, ErasedCause, Node,
};
use crate::effect::scope::{next_token, take_pending_cause, ScopeCore, ScopeExit};
use crate::exit::Exit;

// =============================================================================
// Frames
// =============================================================================

enum Frame {
    /// A plain flat-map continuation.
    Continue(Box<dyn FnOnce(AnyValue) -> Node>),
    /// A both-branches continuation installed by `Fold`.
    Fold {
        on_success: Box<dyn FnOnce(AnyValue) -> Node>,
        on_failure: Box<dyn FnOnce(ErasedCause) -> Node>,
    },
    /// Marks the end of a `Provide` region.
    RestoreEnv,
}

// =============================================================================
// Panic classification
// =============================================================================

/// Re-raises payloads no catch site may swallow; returns the rest.
fn reraise_unstoppable(payload: Box<dyn Any + Send>) -> Box<dyn Any + Send> {
    if payload.is::<Fatal>() || payload.is::<ScopeExit>() {
        resume_unwind(payload)
    }
    payload
}

/// Turns an escaped panic into an unwinding defect.
fn reclassify(payload: Box<dyn Any + Send>) -> Node {
    let payload = reraise_unstoppable(payload);
    Node::Fail(Cause::Panic(Defect::from_payload(payload)))
}

/// Applies a value continuation, guarding against panics.
fn apply_value(continuation: Box<dyn FnOnce(AnyValue) -> Node>, value: AnyValue) -> Node {
    match catch_unwind(AssertUnwindSafe(move || continuation(value))) {
        Ok(node) => node,
        Err(payload) => reclassify(payload),
    }
}

/// Applies a failure continuation, guarding against panics.
fn apply_cause(continuation: Box<dyn FnOnce(ErasedCause) -> Node>, cause: ErasedCause) -> Node {
    match catch_unwind(AssertUnwindSafe(move || continuation(cause))) {
        Ok(node) => node,
        Err(payload) => reclassify(payload),
    }
}

/// Applies an environment function, guarding against panics.
fn apply_environment(function: Box<dyn FnOnce(&AnyEnv) -> Node>, environment: &AnyEnv) -> Node {
    match catch_unwind(AssertUnwindSafe(move || function(environment))) {
        Ok(node) => node,
        Err(payload) => reclassify(payload),
    }
}

// =============================================================================
// The loop
// =============================================================================

/// Pops frames until a value continuation turns up, honouring environment
/// restores along the way.
fn next_continuation(
    frames: &mut Vec<Frame>,
    environments: &mut Vec<AnyEnv>,
) -> Option<Box<dyn FnOnce(AnyValue) -> Node>> {
    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Continue(continuation) => return Some(continuation),
            Frame::Fold { on_success, .. } => return Some(on_success),
            Frame::RestoreEnv => {
                environments.pop();
            }
        }
    }
    None
}

/// Unwinds to the nearest `Fold` frame, discarding plain continuations and
/// honouring environment restores along the way.
fn unwind(
    frames: &mut Vec<Frame>,
    environments: &mut Vec<AnyEnv>,
) -> Option<Box<dyn FnOnce(ErasedCause) -> Node>> {
    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Continue(_) => {}
            Frame::Fold { on_failure, .. } => return Some(on_failure),
            Frame::RestoreEnv => {
                environments.pop();
            }
        }
    }
    None
}

/// Enters a comprehension: runs the body under this invocation's token and
/// catches exactly this invocation's sentinel.
fn enter_comprehension(body: Box<dyn FnOnce(ScopeCore) -> Node>, environment: AnyEnv) -> Node {
    let token = next_token();
    let core = ScopeCore { token, environment };
    match catch_unwind(AssertUnwindSafe(move || body(core))) {
        Ok(node) => node,
        Err(payload) => match payload.downcast::<ScopeExit>() {
            Ok(sentinel) if sentinel.token == token => Node::Fail(take_pending_cause()),
            Ok(sentinel) => resume_unwind(sentinel),
            Err(payload) => reclassify(payload),
        },
    }
}

/// Drives a node to its exit.
///
/// The environment stack starts with the initial environment and never
/// empties while evaluation is in progress: only `RestoreEnv` frames pop
/// it, and each is pushed together with an environment.
pub(crate) fn evaluate(root: Node, environment: AnyEnv) -> Exit<AnyError, AnyValue> {
    let mut current = root;
    let mut frames: Vec<Frame> = Vec::new();
    let mut environments: Vec<AnyEnv> = vec![environment];

    loop {
        current = match current {
            Node::Succeed(value) => match next_continuation(&mut frames, &mut environments) {
                Some(continuation) => apply_value(continuation, value),
                None => return Exit::Success(value),
            },
            Node::Fail(cause) => match unwind(&mut frames, &mut environments) {
                Some(on_failure) => apply_cause(on_failure, cause),
                None => return Exit::Failure(cause),
            },
            Node::Access(function) => {
                let environment = environments
                    .last()
                    .expect("environment stack never empties during evaluation")
                    .clone();
                apply_environment(function, &environment)
            }
            Node::FlatMap(inner, continuation) => {
                frames.push(Frame::Continue(continuation));
                *inner
            }
            Node::Fold {
                inner,
                on_success,
                on_failure,
            } => {
                frames.push(Frame::Fold {
                    on_success,
                    on_failure,
                });
                *inner
            }
            Node::Partial(thunk) => match catch_unwind(AssertUnwindSafe(thunk)) {
                Ok(value) => Node::Succeed(value),
                Err(payload) => {
                    let payload = reraise_unstoppable(payload);
                    let defect: AnyError = Box::new(Defect::from_payload(payload));
                    Node::Fail(Cause::Expected(defect))
                }
            },
            Node::Total(thunk) => match catch_unwind(AssertUnwindSafe(thunk)) {
                Ok(value) => Node::Succeed(value),
                Err(payload) => reclassify(payload),
            },
            Node::Comprehension(body) => {
                let environment = environments
                    .last()
                    .expect("environment stack never empties during evaluation")
                    .clone();
                enter_comprehension(body, environment)
            }
            Node::Provide(inner, environment) => {
                environments.push(environment);
                frames.push(Frame::RestoreEnv);
                *inner
            }
        };
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// An immutable capability binding an environment to the interpreter.
///
/// A `Runtime<R>` captures its environment once and can evaluate any number
/// of effects against it. It holds no other state; cloning it shares the
/// environment.
///
/// # Examples
///
/// ```rust
/// use rea::effect::{Effect, Runtime};
///
/// struct Services {
///     greeting: String,
/// }
///
/// let runtime = Runtime::new(Services {
///     greeting: "hello".to_string(),
/// });
/// let effect: Effect<Services, String, String> =
///     Effect::access(|services: &Services| services.greeting.clone());
/// assert_eq!(runtime.unsafe_run_sync(effect).success(), Some("hello".to_string()));
/// ```
pub struct Runtime<R> {
    environment: Rc<R>,
}

impl<R: 'static> Runtime<R> {
    /// Creates a runtime over the given environment.
    pub fn new(environment: R) -> Self {
        Self {
            environment: Rc::new(environment),
        }
    }

    /// Borrows the captured environment.
    #[must_use]
    pub fn environment(&self) -> &R {
        &self.environment
    }

    /// Evaluates an effect to its exit.
    ///
    /// The name records that this is the edge of the pure world: evaluation
    /// performs whatever side effects the thunks inside the tree describe.
    pub fn unsafe_run_sync<E, A>(&self, effect: Effect<R, E, A>) -> Exit<E, A>
    where
        E: 'static,
        A: 'static,
    {
        let environment: AnyEnv = Rc::clone(&self.environment) as Rc<dyn std::any::Any>;
        match evaluate(effect.node, environment) {
            Exit::Success(value) => Exit::Success(unbox::<A>(value)),
            Exit::Failure(cause) => Exit::Failure(concretise_cause::<E>(cause)),
        }
    }

    /// Evaluates an effect and extracts its success value.
    ///
    /// # Panics
    ///
    /// Panics when evaluation fails: a defect is re-raised with its
    /// original payload, an expected failure with a message carrying the
    /// cause.
    pub fn unsafe_run<E, A>(&self, effect: Effect<R, E, A>) -> A
    where
        E: std::fmt::Debug + 'static,
        A: 'static,
    {
        self.unsafe_run_sync(effect).unwrap_or_resume()
    }
}

impl<R> Clone for Runtime<R> {
    fn clone(&self) -> Self {
        Self {
            environment: Rc::clone(&self.environment),
        }
    }
}
