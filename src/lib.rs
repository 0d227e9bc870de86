//! # rea
//!
//! A typed effect runtime: describe effectful computations as first-class
//! values of type `Effect<R, E, A>` — environment `R`, expected failure
//! `E`, success `A` — and evaluate them later on a stack-safe, strictly
//! synchronous interpreter.
//!
//! ## Overview
//!
//! - **Effect algebra**: nine primitive constructors (succeed, fail,
//!   access, flat-map, fold, partial/total thunks, comprehension,
//!   provide) that compose lawfully into larger effects.
//! - **Interpreter**: a trampolined evaluation loop driving an effect to
//!   an [`Exit`](exit::Exit) with an explicit continuation stack and
//!   environment stack — no host recursion, no stack overflow on deep
//!   chains.
//! - **Failure channels**: expected failures of type `E` and untyped
//!   defects ([`Cause`](cause::Cause)) are kept strictly apart; only the
//!   cause-aware operators can observe a defect.
//! - **Comprehensions**: imperative-looking sequencing with non-local
//!   failure exits ([`Scope`](effect::Scope)), plus the [`comp!`] macro
//!   as compile-time sugar.
//! - **Resources**: [`bracket`](effect::Effect::bracket) for guaranteed
//!   release, and [`transact`](effect::Effect::transact) for
//!   commit-on-success / rollback-on-failure over an environment-carried
//!   connection.
//!
//! ## Example
//!
//! ```rust
//! use rea::effect::{Effect, Runtime};
//!
//! struct Config {
//!     retries: u32,
//! }
//!
//! let effect: Effect<Config, String, u32> = Effect::access(|config: &Config| config.retries)
//!     .flat_map(|retries| {
//!         Effect::fail_when(retries == 0, || "no retries configured".to_string())
//!             .map(move |()| retries)
//!     });
//!
//! let runtime = Runtime::new(Config { retries: 3 });
//! assert_eq!(runtime.unsafe_run_sync(effect).success(), Some(3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(clippy::large_stack_arrays))]

pub mod cause;
pub mod effect;
pub mod exit;
pub mod result_ext;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use rea::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cause::{Cause, Defect, Fatal};
    pub use crate::effect::{Connection, Effect, HasConnection, Runtime, Scope};
    pub use crate::exit::Exit;
    pub use crate::result_ext::ResultExt;
}

#[cfg(test)]
mod tests {
    #[test]
    fn library_compiles() {
        // Basic smoke test to ensure the library compiles
    }
}
