//! `comp!` macro for do-notation style effect chaining.
//!
//! The macro linearises `flat_map` chains into an imperative-looking
//! block. It is pure sugar over the algebra and is independent of the
//! scope-based [`Effect::comprehension`](crate::effect::Effect::comprehension):
//! the macro expands at compile time to nested closures, while a
//! comprehension extracts values at evaluation time.
//!
//! # Syntax
//!
//! - `pattern <= expression;` — bind: extracts the success value
//! - `let pattern = expression;` — pure let binding
//! - `expression` — final expression (must already be an effect)
//!
//! `<=` stands in for the `<-` of other languages, which is not a valid
//! token sequence in Rust macro patterns.
//!
//! # Examples
//!
//! ```rust
//! use rea::comp;
//! use rea::effect::{Effect, Runtime};
//!
//! let effect: Effect<(), String, u32> = comp! {
//!     a <= Effect::succeed(5);
//!     b <= Effect::succeed(10);
//!     let sum = a + b;
//!     Effect::succeed(sum * 2)
//! };
//! assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(30));
//! ```
//!
//! The first failing bind short-circuits the rest of the block:
//!
//! ```rust
//! use rea::comp;
//! use rea::effect::{Effect, Runtime};
//!
//! let effect: Effect<(), String, u32> = comp! {
//!     a <= Effect::succeed(5);
//!     _skipped <= Effect::<(), String, ()>::fail("wrong".to_string());
//!     Effect::succeed(a)
//! };
//! assert!(Runtime::new(()).unsafe_run_sync(effect).is_failure());
//! ```

/// Do-notation sugar over [`Effect::flat_map`](crate::effect::Effect::flat_map).
///
/// # Syntax
///
/// - `pattern <= expression;` — bind: extracts the success value
/// - `let pattern = expression;` — pure let binding
/// - `expression` — final expression (must already be an effect)
///
/// # Examples
///
/// ```rust
/// use rea::comp;
/// use rea::effect::{Effect, Runtime};
///
/// let effect: Effect<(), String, u32> = comp! {
///     a <= Effect::succeed(5);
///     b <= Effect::succeed(10);
///     Effect::succeed(a + b)
/// };
/// assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(15));
/// ```
#[macro_export]
macro_rules! comp {
    // Terminal expression.
    ($result:expr) => {
        $result
    };

    // Bind with identifier pattern.
    ($pattern:ident <= $effect:expr ; $($rest:tt)+) => {
        $effect.flat_map(move |$pattern| {
            $crate::comp!($($rest)+)
        })
    };

    // Bind with tuple pattern.
    (($($pattern:tt)*) <= $effect:expr ; $($rest:tt)+) => {
        $effect.flat_map(move |($($pattern)*)| {
            $crate::comp!($($rest)+)
        })
    };

    // Bind with wildcard pattern.
    (_ <= $effect:expr ; $($rest:tt)+) => {
        $effect.flat_map(move |_| {
            $crate::comp!($($rest)+)
        })
    };

    // Pure let binding.
    (let $pattern:pat = $expr:expr ; $($rest:tt)+) => {
        {
            let $pattern = $expr;
            $crate::comp!($($rest)+)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::{Effect, Runtime};

    fn run<A: 'static>(effect: Effect<(), String, A>) -> Option<A> {
        Runtime::new(()).unsafe_run_sync(effect).success()
    }

    #[test]
    fn binds_chain_left_to_right() {
        let effect: Effect<(), String, u32> = comp! {
            a <= Effect::succeed(2);
            b <= Effect::succeed(3);
            Effect::succeed(a * b)
        };
        assert_eq!(run(effect), Some(6));
    }

    #[test]
    fn let_bindings_stay_pure() {
        let effect: Effect<(), String, u32> = comp! {
            a <= Effect::succeed(4);
            let doubled = a * 2;
            Effect::succeed(doubled)
        };
        assert_eq!(run(effect), Some(8));
    }

    #[test]
    fn tuple_patterns_destructure() {
        let effect: Effect<(), String, u32> = comp! {
            (a, b) <= Effect::succeed((3, 4));
            Effect::succeed(a + b)
        };
        assert_eq!(run(effect), Some(7));
    }

    #[test]
    fn wildcard_discards_the_value() {
        let effect: Effect<(), String, u32> = comp! {
            _ <= Effect::succeed(99);
            Effect::succeed(1)
        };
        assert_eq!(run(effect), Some(1));
    }

    #[test]
    fn a_failing_bind_short_circuits() {
        let effect: Effect<(), String, u32> = comp! {
            a <= Effect::succeed(5);
            _ <= Effect::<(), String, u32>::fail("stop".to_string());
            Effect::succeed(a)
        };
        assert_eq!(run(effect), None);
    }
}
