//! Transactional execution over an environment-carried connection.
//!
//! [`Effect::transact`] layers "commit on success, roll back on failure,
//! roll back on defect" semantics over whatever connection the environment
//! provides. The combinator itself is a thin [`bracket_exit`]
//! specialisation:
//!
//! 1. Acquire: remember the connection's auto-commit flag and disable it.
//! 2. Use: run the wrapped effect against the same connection, now in
//!    explicit-transaction mode.
//! 3. Release: commit when the exit is a success, roll back on *any*
//!    failure cause — expected or defect — then restore the remembered
//!    auto-commit flag. The original exit is re-yielded either way.
//!
//! Nested `transact` calls are independent: an inner transaction that has
//! already committed is not undone by an outer rollback. That isolation is
//! a property of the underlying connection; the combinator neither adds
//! nor weakens it.
//!
//! [`bracket_exit`]: crate::effect::Effect::bracket_exit
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use rea::effect::{Connection, Effect, HasConnection, Runtime};
//!
//! /// A connection that stages writes until commit.
//! #[derive(Default)]
//! struct Staging {
//!     auto_commit: RefCell<bool>,
//!     staged: RefCell<Vec<String>>,
//!     committed: RefCell<Vec<String>>,
//! }
//!
//! impl Connection for Staging {
//!     fn auto_commit(&self) -> bool {
//!         *self.auto_commit.borrow()
//!     }
//!     fn set_auto_commit(&self, enabled: bool) {
//!         *self.auto_commit.borrow_mut() = enabled;
//!     }
//!     fn commit(&self) {
//!         let staged = self.staged.borrow_mut().drain(..).collect::<Vec<_>>();
//!         self.committed.borrow_mut().extend(staged);
//!     }
//!     fn rollback(&self) {
//!         self.staged.borrow_mut().clear();
//!     }
//! }
//!
//! struct Database {
//!     connection: Staging,
//! }
//!
//! impl HasConnection for Database {
//!     type Conn = Staging;
//!     fn connection(&self) -> &Staging {
//!         &self.connection
//!     }
//! }
//!
//! let insert: Effect<Database, String, ()> = Effect::access(|database: &Database| {
//!     database.connection.staged.borrow_mut().push("alice".to_string());
//! });
//!
//! let runtime = Runtime::new(Database { connection: Staging::default() });
//! assert!(runtime.unsafe_run_sync(insert.transact()).is_success());
//! assert_eq!(*runtime.environment().connection.committed.borrow(), vec!["alice"]);
//! ```

use std::convert::Infallible;
use std::rc::Rc;

use crate::effect::algebra::Effect;
use crate::exit::Exit;

/// The connection contract `transact` drives.
///
/// Implementations use interior mutability; the methods are infallible by
/// signature, and a panicking implementation surfaces as a defect of the
/// transacted effect.
pub trait Connection {
    /// Whether the connection currently commits each statement on its own.
    fn auto_commit(&self) -> bool;

    /// Switches automatic per-statement commits on or off.
    fn set_auto_commit(&self, enabled: bool);

    /// Makes every write since the last commit or rollback durable.
    fn commit(&self);

    /// Discards every write since the last commit or rollback.
    fn rollback(&self);
}

/// Environments that carry a connection handle.
pub trait HasConnection {
    /// The connection type this environment provides.
    type Conn: Connection;

    /// Borrows the connection handle.
    fn connection(&self) -> &Self::Conn;
}

impl<R, E, A> Effect<R, E, A>
where
    R: HasConnection + 'static,
    E: 'static,
    A: 'static,
{
    /// Runs this effect inside a transaction on the environment's
    /// connection.
    ///
    /// Commits when the effect succeeds; rolls back when it fails with an
    /// expected error *or* dies with a defect. The connection's prior
    /// auto-commit flag is restored in both cases, and the effect's exit
    /// is re-yielded unchanged.
    pub fn transact(self) -> Effect<R, E, A> {
        Effect::bracket_exit(
            Effect::<R, E, bool>::access(|environment: &R| {
                let connection = environment.connection();
                let prior = connection.auto_commit();
                connection.set_auto_commit(false);
                prior
            }),
            |prior: Rc<bool>, exit: &Exit<E, A>| {
                let prior = *prior;
                let succeeded = exit.is_success();
                Effect::<R, Infallible, ()>::access(move |environment: &R| {
                    let connection = environment.connection();
                    if succeeded {
                        connection.commit();
                    } else {
                        connection.rollback();
                    }
                    connection.set_auto_commit(prior);
                })
            },
            move |_prior| self,
        )
    }
}
