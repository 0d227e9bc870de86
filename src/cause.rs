//! Failure vocabulary: expected failures, defects, and fatal payloads.
//!
//! Evaluation of an effect can end badly in two very different ways, and
//! this module keeps them apart:
//!
//! - An **expected failure** is a value of the effect's declared error type
//!   `E`, raised deliberately with [`Effect::fail`](crate::effect::Effect::fail)
//!   or captured from a panicking thunk by
//!   [`Effect::capture`](crate::effect::Effect::capture).
//! - A **defect** is a host panic that escaped from code that never declared
//!   it: a mapping function, a total thunk, a recovery handler. Defects are
//!   wrapped in [`Defect`] and carried as [`Cause::Panic`].
//!
//! [`Cause<E>`](Cause) is the tagged union of the two. Only the cause-aware
//! operators ([`fold_cause_m`](crate::effect::Effect::fold_cause_m),
//! [`recover_cause`](crate::effect::Effect::recover_cause)) can observe a
//! defect; every other combinator lets defects flow through untouched.
//!
//! A third class exists but is deliberately *not* representable as a cause:
//! panics whose payload is [`Fatal`]. They model unrecoverable host failures
//! and are re-raised by every catch site in the interpreter.
//!
//! # Examples
//!
//! ```rust
//! use rea::cause::Cause;
//!
//! let expected: Cause<String> = Cause::Expected("missing user".to_string());
//! assert_eq!(expected.failure(), Some(&"missing user".to_string()));
//! assert!(expected.defect().is_none());
//!
//! // `map` transforms only the expected payload.
//! let lengths = expected.map(|message| message.len());
//! assert_eq!(lengths.failure(), Some(&12));
//! ```

use std::any::Any;
use std::panic::resume_unwind;

// =============================================================================
// Defect
// =============================================================================

/// An untyped defect: the payload of a host panic that escaped effectful code.
///
/// A `Defect` preserves the original panic payload, so the value that was
/// panicked with can be inspected with [`downcast_ref`](Defect::downcast_ref)
/// or re-raised with its identity intact via [`resume`](Defect::resume).
///
/// # Examples
///
/// ```rust
/// use rea::cause::Defect;
///
/// let defect = Defect::new("index out of bounds");
/// assert_eq!(defect.message(), "index out of bounds");
/// assert_eq!(defect.downcast_ref::<&str>(), Some(&"index out of bounds"));
/// ```
pub struct Defect {
    payload: Box<dyn Any + Send>,
}

impl Defect {
    /// Wraps an arbitrary value as a defect payload.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::Defect;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Broken(u32);
    ///
    /// let defect = Defect::new(Broken(7));
    /// assert_eq!(defect.downcast_ref::<Broken>(), Some(&Broken(7)));
    /// ```
    pub fn new<T: Any + Send>(payload: T) -> Self {
        // Defects never nest: wrapping a Defect yields that defect.
        let boxed: Box<dyn Any + Send> = Box::new(payload);
        match boxed.downcast::<Self>() {
            Ok(defect) => *defect,
            Err(payload) => Self { payload },
        }
    }

    /// Wraps a raw panic payload, as obtained from `std::panic::catch_unwind`.
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Self { payload }
    }

    /// Extracts a human-readable message from the payload.
    ///
    /// String payloads (the common case for `panic!("…")`) are returned
    /// verbatim; anything else produces a placeholder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::Defect;
    ///
    /// assert_eq!(Defect::new("boom".to_string()).message(), "boom");
    /// assert_eq!(Defect::new(42).message(), "unknown panic");
    /// ```
    pub fn message(&self) -> String {
        if let Some(string) = self.payload.downcast_ref::<&str>() {
            (*string).to_string()
        } else if let Some(string) = self.payload.downcast_ref::<String>() {
            string.clone()
        } else if let Some(fatal) = self.payload.downcast_ref::<Fatal>() {
            fatal.message().to_string()
        } else {
            "unknown panic".to_string()
        }
    }

    /// Borrows the payload as a concrete type, if it has that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Extracts the payload as a concrete type, or returns the defect
    /// unchanged when the dynamic type does not match.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::Defect;
    ///
    /// let defect = Defect::new(13_u32);
    /// let defect = defect.downcast::<String>().unwrap_err();
    /// assert_eq!(defect.downcast::<u32>().unwrap(), 13);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` when the payload is not a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self.payload.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(payload) => Err(Self { payload }),
        }
    }

    /// Returns `true` if the payload is a [`Fatal`] marker.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.payload.is::<Fatal>()
    }

    /// Re-raises the original panic, preserving the payload's identity.
    ///
    /// The caller observes exactly the panic that created this defect, as
    /// if it had never been caught.
    pub fn resume(self) -> ! {
        resume_unwind(self.payload)
    }
}

impl std::fmt::Debug for Defect {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_tuple("Defect").field(&self.message()).finish()
    }
}

impl std::fmt::Display for Defect {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "defect: {}", self.message())
    }
}

impl std::error::Error for Defect {}

// =============================================================================
// Fatal
// =============================================================================

/// Marker payload for unrecoverable host failures.
///
/// Rust's true virtual-machine-level failures (out of memory, stack
/// exhaustion) abort the process and can never be observed by a handler.
/// `Fatal` extends the same contract to payloads raised in-process: a panic
/// whose payload is `Fatal` is re-raised by every catch site in the
/// interpreter, never converted to a [`Cause`].
///
/// # Examples
///
/// ```rust,should_panic
/// use rea::cause::Fatal;
///
/// std::panic::panic_any(Fatal::new("simulated vm failure"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fatal {
    message: String,
}

impl Fatal {
    /// Creates a fatal marker carrying a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Fatal {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "fatal: {}", self.message)
    }
}

impl std::error::Error for Fatal {}

// =============================================================================
// Cause
// =============================================================================

/// The reason an effect failed: a typed, expected failure or an untyped
/// defect.
///
/// # Type Parameters
///
/// * `E` - The declared error type of the failed effect.
///
/// # Invariants
///
/// - [`failure`](Cause::failure) is `Some` exactly for [`Cause::Expected`].
/// - [`defect`](Cause::defect) is `Some` exactly for [`Cause::Panic`].
/// - [`map`](Cause::map) transforms only the expected payload and is the
///   identity on [`Cause::Panic`].
#[derive(Debug)]
pub enum Cause<E> {
    /// A typed, declared failure.
    Expected(E),
    /// An untyped defect: a host panic that escaped effectful code.
    Panic(Defect),
}

impl<E> Cause<E> {
    /// Returns `true` if this is an expected failure.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::Expected(_))
    }

    /// Returns `true` if this is a defect.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }

    /// Borrows the expected failure, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::{Cause, Defect};
    ///
    /// let expected: Cause<&str> = Cause::Expected("nope");
    /// assert_eq!(expected.failure(), Some(&"nope"));
    ///
    /// let panic: Cause<&str> = Cause::Panic(Defect::new("boom"));
    /// assert_eq!(panic.failure(), None);
    /// ```
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Expected(error) => Some(error),
            Self::Panic(_) => None,
        }
    }

    /// Extracts the expected failure, if any.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Expected(error) => Some(error),
            Self::Panic(_) => None,
        }
    }

    /// Borrows the defect, if any.
    pub const fn defect(&self) -> Option<&Defect> {
        match self {
            Self::Expected(_) => None,
            Self::Panic(defect) => Some(defect),
        }
    }

    /// Extracts the defect, if any.
    pub fn into_defect(self) -> Option<Defect> {
        match self {
            Self::Expected(_) => None,
            Self::Panic(defect) => Some(defect),
        }
    }

    /// Transforms the expected payload; the identity on defects.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::{Cause, Defect};
    ///
    /// let cause: Cause<u32> = Cause::Expected(21);
    /// assert_eq!(cause.map(|n| n * 2).failure(), Some(&42));
    ///
    /// let panic: Cause<u32> = Cause::Panic(Defect::new("boom"));
    /// assert!(panic.map(|n| n * 2).is_panic());
    /// ```
    pub fn map<E2, F>(self, function: F) -> Cause<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Expected(error) => Cause::Expected(function(error)),
            Self::Panic(defect) => Cause::Panic(defect),
        }
    }

    /// Total eliminator over both variants.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rea::cause::Cause;
    ///
    /// let cause: Cause<&str> = Cause::Expected("late");
    /// let rendered = cause.fold(
    ///     |error| format!("expected: {error}"),
    ///     |defect| format!("defect: {}", defect.message()),
    /// );
    /// assert_eq!(rendered, "expected: late");
    /// ```
    pub fn fold<T, F, G>(self, on_expected: F, on_panic: G) -> T
    where
        F: FnOnce(E) -> T,
        G: FnOnce(Defect) -> T,
    {
        match self {
            Self::Expected(error) => on_expected(error),
            Self::Panic(defect) => on_panic(defect),
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for Cause<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expected(error) => write!(formatter, "expected failure: {error}"),
            Self::Panic(defect) => write!(formatter, "{defect}"),
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for Cause<E> {}
