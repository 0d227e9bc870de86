//! The effect algebra, its interpreter, and the derived operators.
//!
//! An [`Effect<R, E, A>`](Effect) is a first-class, deferred computation:
//! it reads an environment `R` and ends in a success `A`, an expected
//! failure `E`, or a defect (a panic that escaped code which never
//! declared it). Nothing runs until the value is handed to a
//! [`Runtime`], whose trampolined interpreter walks the tree iteratively
//! and returns an [`Exit`](crate::exit::Exit).
//!
//! # Building effects
//!
//! ```rust
//! use rea::effect::{Effect, Runtime};
//!
//! struct Config {
//!     base: u32,
//! }
//!
//! let effect: Effect<Config, String, u32> = Effect::access(|config: &Config| config.base)
//!     .flat_map(|base| Effect::succeed(base * 2))
//!     .recover(|_: String| Effect::succeed(0));
//!
//! let runtime = Runtime::new(Config { base: 21 });
//! assert_eq!(runtime.unsafe_run_sync(effect).success(), Some(42));
//! ```
//!
//! # Failure channels
//!
//! Expected failures ([`Effect::fail`]) and defects (escaped panics) are
//! kept strictly apart: `map_error`, `recover`, `attempt` and friends see
//! only the expected channel, while [`Effect::fold_cause_m`] and
//! [`Effect::recover_cause`] see the full [`Cause`](crate::cause::Cause).
//! Panics carrying a [`Fatal`](crate::cause::Fatal) payload belong to
//! neither channel and abort evaluation.
//!
//! # Comprehensions
//!
//! [`Effect::comprehension`] evaluates an imperative body in which
//! [`Scope::run`] extracts inner effect results, short-circuiting the
//! whole block on the first failure. The `comp!` macro offers the same
//! linearised reading as compile-time sugar over `flat_map`.
//!
//! # Resources and transactions
//!
//! [`Effect::bracket`] guarantees release on every exit path after a
//! successful acquire, and [`Effect::transact`] specialises it to
//! commit/rollback over a [`Connection`] carried in the environment.

mod algebra;
mod bracket;
mod combinators;
mod comp_macro;
mod interpreter;
mod scope;
mod transact;

pub use algebra::Effect;
pub use interpreter::Runtime;
pub use scope::Scope;
pub use transact::{Connection, HasConnection};
