//! Comprehension scopes: imperative sequencing with non-local failure exits.
//!
//! A comprehension ([`Effect::comprehension`](crate::effect::Effect::comprehension))
//! evaluates its body with a [`Scope`] capability. Inside the body,
//! [`Scope::run`] extracts the success value of an inner effect as an
//! ordinary Rust value; when the inner effect fails, the whole
//! comprehension short-circuits to a failure with that cause, without the
//! body seeing anything past the failing extraction.
//!
//! # Mechanism
//!
//! Each comprehension invocation mints a unique token. A failing extraction
//! stores the erased cause in a thread-local cell and panics with a sentinel
//! carrying the token; the enclosing comprehension catches *only* a sentinel
//! with its own token (anything else is re-raised), takes the cause back out
//! of the cell, and terminates with it. Carrying the cause out of band keeps
//! the error type free of `Send` bounds, which the panic payload would
//! otherwise require.
//!
//! Nested comprehensions therefore compose: an inner comprehension's catch
//! site passes an outer sentinel through untouched. Extraction order is
//! host-program order, and each extraction blocks the body until the inner
//! effect completes.
//!
//! # Leaked extractors
//!
//! Storing a scope reference beyond its comprehension, or calling `run` from
//! a plain mapping function, puts the sentinel outside any matching catch
//! site. The sentinel then propagates as an ordinary panic; don't do that.
//!
//! # Examples
//!
//! ```rust
//! use rea::effect::{Effect, Runtime};
//!
//! let effect: Effect<(), String, u32> = Effect::comprehension(|scope| {
//!     let a = scope.run(Effect::succeed(6));
//!     let b = scope.run(Effect::succeed(7));
//!     Effect::succeed(a * b)
//! });
//! assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(42));
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::panic_any;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::effect::algebra::{unbox, AnyEnv, Effect, ErasedCause};
use crate::effect::interpreter::evaluate;
use crate::exit::Exit;

/// Source of comprehension identity tokens.
static SCOPE_TOKENS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// The cause of the sentinel currently in flight, if any.
    static PENDING_CAUSE: RefCell<Option<ErasedCause>> = const { RefCell::new(None) };
}

/// Mints a fresh comprehension token.
pub(crate) fn next_token() -> u64 {
    SCOPE_TOKENS.fetch_add(1, Ordering::Relaxed)
}

/// Takes the cause stored by the sentinel being caught.
pub(crate) fn take_pending_cause() -> ErasedCause {
    PENDING_CAUSE
        .with(|cell| cell.borrow_mut().take())
        .expect("comprehension sentinel raised without a stored cause")
}

/// The sentinel payload of a comprehension's non-local exit.
///
/// Identity lives in the token; the cause travels through the
/// thread-local cell, so the payload itself stays trivially `Send`.
pub(crate) struct ScopeExit {
    pub(crate) token: u64,
}

/// The untyped identity of one comprehension invocation.
pub(crate) struct ScopeCore {
    pub(crate) token: u64,
    pub(crate) environment: AnyEnv,
}

/// The extraction capability handed to a comprehension body.
///
/// A `Scope<R, E>` belongs to exactly one comprehension invocation over
/// environment `R` and failure type `E`. It must not outlive its body.
pub struct Scope<R, E> {
    core: ScopeCore,
    _types: PhantomData<fn(R) -> E>,
}

impl<R, E> Scope<R, E>
where
    R: 'static,
    E: 'static,
{
    pub(crate) fn new(core: ScopeCore) -> Self {
        Self {
            core,
            _types: PhantomData,
        }
    }

    /// Runs an inner effect and extracts its success value.
    ///
    /// The effect is evaluated immediately, under the environment the
    /// comprehension was entered with. On failure — expected or defect —
    /// the enclosing comprehension terminates with that cause and this
    /// call never returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::effect::{Effect, Runtime};
    ///
    /// let effect: Effect<(), String, u32> = Effect::comprehension(|scope| {
    ///     let value = scope.run(Effect::succeed(2));
    ///     Effect::succeed(value + 1)
    /// });
    /// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(3));
    /// ```
    pub fn run<A: 'static>(&self, effect: Effect<R, E, A>) -> A {
        match evaluate(effect.node, self.core.environment.clone()) {
            Exit::Success(value) => unbox::<A>(value),
            Exit::Failure(cause) => self.raise(cause),
        }
    }

    /// Short-circuits the enclosing comprehension with the cause.
    fn raise(&self, cause: ErasedCause) -> ! {
        PENDING_CAUSE.with(|cell| *cell.borrow_mut() = Some(cause));
        panic_any(ScopeExit {
            token: self.core.token,
        })
    }
}
