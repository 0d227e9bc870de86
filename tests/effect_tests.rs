//! Integration tests for the effect surface: constructors, combinators,
//! and failure-channel discipline.

use rea::cause::Cause;
use rea::effect::{Effect, Runtime};
use rstest::rstest;

fn run<E: 'static, A: 'static>(effect: Effect<(), E, A>) -> rea::exit::Exit<E, A> {
    Runtime::new(()).unsafe_run_sync(effect)
}

// =============================================================================
// Sequencing
// =============================================================================

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
fn traverse_over_pure_effects_preserves_order() {
    let effect: Effect<(), String, Vec<u32>> = Effect::traverse(0..=10_u32, Effect::succeed);
    let values = run(effect).success().unwrap();
    assert_eq!(values, (0..=10).collect::<Vec<_>>());
}

#[rstest]
fn traverse_stops_at_the_first_failing_item() {
    let effect: Effect<(), String, Vec<u32>> = Effect::traverse(0..10_u32, |n| {
        if n == 3 {
            Effect::fail(format!("bad item {n}"))
        } else {
            Effect::succeed(n)
        }
    });
    let cause = run(effect).cause().unwrap();
    assert_eq!(cause.into_failure(), Some("bad item 3".to_string()));
}

#[rstest]
fn zip_sequences_left_then_right() {
    let effect: Effect<(), String, (u32, &'static str)> =
        Effect::succeed(1).zip(Effect::succeed("right"));
    assert_eq!(run(effect).success(), Some((1, "right")));
}

// =============================================================================
// Error refinement
// =============================================================================

#[derive(Debug, PartialEq)]
struct BadArgument(&'static str);

#[rstest]
fn refine_then_die_preserves_the_original_instance() {
    let effect: Effect<(), _, u32> =
        Effect::capture(|| std::panic::panic_any(BadArgument("negative size")));
    let refined = effect.refine_or_die::<BadArgument>().or_die();

    let cause = run(refined).cause().unwrap();
    let defect = cause.into_defect().unwrap();
    assert_eq!(
        defect.downcast_ref::<BadArgument>(),
        Some(&BadArgument("negative size"))
    );
}

#[rstest]
fn refine_or_die_converts_mismatches_to_defects() {
    let effect: Effect<(), _, u32> = Effect::capture(|| panic!("some other panic"));
    let refined = effect.refine_or_die::<BadArgument>();

    let cause = run(refined).cause().unwrap();
    assert!(cause.is_panic());
}

#[rstest]
fn capture_turns_panics_into_expected_failures() {
    let effect: Effect<(), _, u32> = Effect::capture(|| panic!("connection refused"));
    let error = run(effect).cause().and_then(Cause::into_failure).unwrap();
    assert_eq!(error.message(), "connection refused");
}

// =============================================================================
// Recovery discipline
// =============================================================================

#[rstest]
fn recover_sees_expected_failures_but_not_defects() {
    let failing: Effect<(), String, u32> = Effect::fail("expected".to_string());
    let healed = failing.recover::<String, _>(|error| Effect::succeed(error.len() as u32));
    assert_eq!(run(healed).success(), Some(8));

    let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
    let still_dead = dying.recover::<String, _>(|_| Effect::succeed(0));
    assert!(run(still_dead).cause().unwrap().is_panic());
}

#[rstest]
fn fold_m_reraises_defects_unchanged() {
    let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
    let folded = dying.fold_m(
        |_| Effect::<(), String, &'static str>::succeed("handled failure"),
        |_| Effect::succeed("handled success"),
    );
    assert!(run(folded).cause().unwrap().is_panic());
}

#[rstest]
fn fold_cause_m_observes_defects() {
    let dying: Effect<(), String, u32> = Effect::total(|| panic!("bug"));
    let healed = dying.fold_cause_m(
        |cause: Cause<String>| Effect::<(), String, bool>::succeed(cause.is_panic()),
        |_| Effect::succeed(false),
    );
    assert_eq!(run(healed).success(), Some(true));
}

#[rstest]
fn attempt_then_flip_round_trip_on_pure_effects() {
    let failing: Effect<(), String, u32> = Effect::fail("e".to_string());
    let flipped_back = failing.flip().flip();
    let cause = run(flipped_back).cause().unwrap();
    assert_eq!(cause.into_failure(), Some("e".to_string()));
}

// =============================================================================
// Timing
// =============================================================================

#[rstest]
fn measured_reports_a_plausible_duration() {
    let effect: Effect<(), String, u32> = Effect::total(|| {
        std::thread::sleep(std::time::Duration::from_millis(5));
        7
    });
    let (elapsed, value) = run(effect.measured()).success().unwrap();
    assert_eq!(value, 7);
    assert!(elapsed >= std::time::Duration::from_millis(5));
}

// =============================================================================
// Environment
// =============================================================================

#[rstest]
fn provide_scopes_the_environment_to_the_inner_effect() {
    struct Outer {
        label: &'static str,
    }

    let inner: Effect<&'static str, String, String> =
        Effect::access(|label: &&'static str| format!("inner sees {label}"));
    let effect: Effect<Outer, String, (String, &'static str)> = inner
        .provide("replacement")
        .zip(Effect::access(|outer: &Outer| outer.label));

    let exit = Runtime::new(Outer { label: "original" }).unsafe_run_sync(effect);
    assert_eq!(
        exit.success(),
        Some(("inner sees replacement".to_string(), "original"))
    );
}
