//! Scoped resource acquisition and release.
//!
//! [`Effect::bracket`] guarantees that once `acquire` has succeeded, the
//! `release` action runs exactly once, on every exit path of `use` —
//! success, expected failure, or defect. When `acquire` itself fails,
//! nothing was acquired and `release` never runs.
//!
//! The resource is handed to both `use` and `release` behind an [`Rc`],
//! since the two closures live in separate continuation branches.
//!
//! `release` declares an [`Infallible`] expected channel: it has no
//! legitimate way to fail. If it defects anyway, that cause is discarded —
//! the bracket's outcome is always `use`'s exit.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use rea::effect::{Effect, Runtime};
//!
//! let closed = Rc::new(Cell::new(false));
//! let seen = Rc::clone(&closed);
//!
//! let effect: Effect<(), String, u32> = Effect::bracket(
//!     Effect::succeed("handle".to_string()),
//!     move |_handle| {
//!         let closed = Rc::clone(&seen);
//!         Effect::total(move || closed.set(true))
//!     },
//!     |handle| Effect::succeed(handle.len() as u32),
//! );
//!
//! assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(6));
//! assert!(closed.get());
//! ```

use std::convert::Infallible;
use std::rc::Rc;

use crate::effect::algebra::Effect;
use crate::exit::Exit;

/// Discards every outcome of a release action.
fn swallow<R, E>(release: Effect<R, Infallible, ()>) -> Effect<R, E, ()>
where
    R: 'static,
    E: 'static,
{
    release.fold_cause_m(|_| Effect::succeed(()), |()| Effect::succeed(()))
}

impl<R, E, B> Effect<R, E, B>
where
    R: 'static,
    E: 'static,
    B: 'static,
{
    /// Acquires a resource, uses it, and releases it on every exit path.
    ///
    /// Semantics:
    ///
    /// 1. `acquire` is evaluated; if it fails, the bracket fails with that
    ///    cause and `release` is never invoked.
    /// 2. `use_fn(resource)` is evaluated to an exit.
    /// 3. `release(resource)` is evaluated; its own cause, if any, is
    ///    discarded.
    /// 4. The bracket yields `use_fn`'s exit.
    pub fn bracket<S, Rel, Use>(
        acquire: Effect<R, E, S>,
        release: Rel,
        use_fn: Use,
    ) -> Effect<R, E, B>
    where
        S: 'static,
        Rel: Fn(Rc<S>) -> Effect<R, Infallible, ()> + 'static,
        Use: FnOnce(Rc<S>) -> Effect<R, E, B> + 'static,
    {
        Self::bracket_exit(
            acquire,
            move |resource, _exit: &Exit<E, B>| release(resource),
            use_fn,
        )
    }

    /// [`bracket`](Effect::bracket) with a release action that ignores the
    /// resource.
    pub fn bracket_ignore<S, Rel, Use>(
        acquire: Effect<R, E, S>,
        release: Rel,
        use_fn: Use,
    ) -> Effect<R, E, B>
    where
        S: 'static,
        Rel: Fn() -> Effect<R, Infallible, ()> + 'static,
        Use: FnOnce(Rc<S>) -> Effect<R, E, B> + 'static,
    {
        Self::bracket(acquire, move |_resource| release(), use_fn)
    }

    /// [`bracket`](Effect::bracket) with a release action that observes
    /// `use`'s exit, so it can distinguish commit from rollback.
    ///
    /// The release closure inspects the exit while *building* its effect;
    /// the exit itself is re-yielded unchanged afterwards.
    pub fn bracket_exit<S, Rel, Use>(
        acquire: Effect<R, E, S>,
        release: Rel,
        use_fn: Use,
    ) -> Effect<R, E, B>
    where
        S: 'static,
        Rel: Fn(Rc<S>, &Exit<E, B>) -> Effect<R, Infallible, ()> + 'static,
        Use: FnOnce(Rc<S>) -> Effect<R, E, B> + 'static,
    {
        acquire.flat_map(move |resource| {
            let resource = Rc::new(resource);
            let release = Rc::new(release);
            let failure_resource = Rc::clone(&resource);
            let failure_release = Rc::clone(&release);
            use_fn(Rc::clone(&resource)).fold_cause_m(
                move |cause| {
                    let exit: Exit<E, B> = Exit::Failure(cause);
                    let finalizer = failure_release(failure_resource, &exit);
                    swallow::<R, E>(finalizer).flat_map(move |()| Effect::done(exit))
                },
                move |value| {
                    let exit: Exit<E, B> = Exit::Success(value);
                    let finalizer = release(resource, &exit);
                    swallow::<R, E>(finalizer).flat_map(move |()| Effect::done(exit))
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Runtime;
    use rstest::rstest;
    use std::cell::Cell;

    fn counting_release(
        counter: &Rc<Cell<u32>>,
    ) -> impl Fn(Rc<String>) -> Effect<(), Infallible, ()> + 'static {
        let counter = Rc::clone(counter);
        move |_resource| {
            let counter = Rc::clone(&counter);
            Effect::total(move || counter.set(counter.get() + 1))
        }
    }

    #[rstest]
    fn release_runs_once_on_success() {
        let released = Rc::new(Cell::new(0));
        let effect: Effect<(), String, usize> = Effect::bracket(
            Effect::succeed("db".to_string()),
            counting_release(&released),
            |resource| Effect::succeed(resource.len()),
        );
        assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(2));
        assert_eq!(released.get(), 1);
    }

    #[rstest]
    fn release_runs_once_on_expected_failure() {
        let released = Rc::new(Cell::new(0));
        let effect: Effect<(), String, usize> = Effect::bracket(
            Effect::succeed("db".to_string()),
            counting_release(&released),
            |_resource| Effect::fail("use failed".to_string()),
        );
        let cause = Runtime::new(()).unsafe_run_sync(effect).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("use failed".to_string()));
        assert_eq!(released.get(), 1);
    }

    #[rstest]
    fn release_runs_once_on_defect() {
        let released = Rc::new(Cell::new(0));
        let effect: Effect<(), String, usize> = Effect::bracket(
            Effect::succeed("db".to_string()),
            counting_release(&released),
            |_resource| Effect::total(|| panic!("use died")),
        );
        let cause = Runtime::new(()).unsafe_run_sync(effect).cause().unwrap();
        assert!(cause.is_panic());
        assert_eq!(released.get(), 1);
    }

    #[rstest]
    fn release_never_runs_when_acquire_fails() {
        let released = Rc::new(Cell::new(0));
        let effect: Effect<(), String, usize> = Effect::bracket(
            Effect::fail("no resource".to_string()),
            counting_release(&released),
            |resource| Effect::succeed(resource.len()),
        );
        assert!(Runtime::new(()).unsafe_run_sync(effect).is_failure());
        assert_eq!(released.get(), 0);
    }

    #[rstest]
    fn use_cause_wins_over_release_defect() {
        let effect: Effect<(), String, usize> = Effect::bracket(
            Effect::succeed("db".to_string()),
            |_resource| Effect::total(|| panic!("release died")),
            |_resource| Effect::fail("use failed".to_string()),
        );
        let cause = Runtime::new(()).unsafe_run_sync(effect).cause().unwrap();
        assert_eq!(cause.into_failure(), Some("use failed".to_string()));
    }

    #[rstest]
    fn bracket_exit_sees_the_outcome() {
        let committed = Rc::new(Cell::new(false));
        let observed = Rc::clone(&committed);
        let effect: Effect<(), String, u32> = Effect::bracket_exit(
            Effect::succeed(()),
            move |_resource, exit: &Exit<String, u32>| {
                let committed = Rc::clone(&observed);
                let success = exit.is_success();
                Effect::total(move || committed.set(success))
            },
            |_resource| Effect::succeed(9),
        );
        assert_eq!(Runtime::new(()).unsafe_run_sync(effect).success(), Some(9));
        assert!(committed.get());
    }
}
