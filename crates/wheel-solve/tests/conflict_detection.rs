mod common;

use common::{linear_ciphertext, sym};
use wheel_solve::{
    solve, Anchor, Classing, Constraint, ConstraintSet, Family, KeySchedule, Origin, SolveContext,
    SolveError, WheelSpec,
};

fn context_parts() -> (wheel_core::Ciphertext, Classing, KeySchedule) {
    (
        linear_ciphertext(130),
        Classing::parity_triad(),
        KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17)),
    )
}

#[test]
fn shared_slot_with_different_residues_conflicts() {
    let (ct, classing, schedule) = context_parts();
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    // 21 and 123 both land on class 3 slot 4; E implies residue 16, A implies 6.
    let anchors = [Anchor::at("late", 123, "A"), Anchor::at("EAST", 21, "EAST")];
    let set = ConstraintSet::from_anchors(&anchors, ct.len()).expect("anchors expand");

    let outcome = solve(&ctx, &set).expect("configuration is valid");
    let conflict = match outcome {
        Err(SolveError::Conflict(conflict)) => conflict,
        other => panic!("expected a conflict, got {other:?}"),
    };
    assert_eq!(conflict.class, 3);
    assert_eq!(conflict.slot, 4);
    assert_eq!(conflict.earlier_position, 21);
    assert_eq!(conflict.position, 123);
    assert_eq!(conflict.existing, sym('Q'));
    assert_eq!(conflict.required, sym('G'));
}

#[test]
fn conflict_report_ignores_insertion_order() {
    let (ct, classing, schedule) = context_parts();
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let forward = ConstraintSet::new(vec![
        Constraint::new(21, sym('E'), Origin::Manual),
        Constraint::new(123, sym('A'), Origin::Manual),
    ]);
    let backward: ConstraintSet = forward.constraints().iter().rev().cloned().collect();
    assert_eq!(
        solve(&ctx, &forward).unwrap(),
        solve(&ctx, &backward).unwrap()
    );
}

#[test]
fn duplicate_consistent_constraints_are_accepted() {
    let (ct, classing, schedule) = context_parts();
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let set = ConstraintSet::new(vec![
        Constraint::new(21, sym('E'), Origin::Manual),
        Constraint::new(21, sym('E'), Origin::Manual),
        Constraint::new(123, sym('Q'), Origin::Manual),
    ]);
    let wheels = solve(&ctx, &set).unwrap().expect("consistent");
    assert_eq!(wheels.resolved_slots(), 1);
    assert_eq!(wheels.wheel(3).unwrap().witness(4), Some(21));
}

#[test]
fn classing_and_schedule_defects_abort_the_solve() {
    let ct = linear_ciphertext(10);
    let classing = Classing::Modular { k: 3 };
    let short = KeySchedule::uniform(2, WheelSpec::new(Family::Additive, 4));
    let ctx = SolveContext::new(&ct, &classing, &short);
    let err = solve(&ctx, &ConstraintSet::default()).unwrap_err();
    assert_eq!(err.info().code, "schedule-class-mismatch");

    let sparse = Classing::Modular { k: 12 };
    let schedule = KeySchedule::uniform(12, WheelSpec::new(Family::Additive, 4));
    let ctx = SolveContext::new(&ct, &sparse, &schedule);
    let err = solve(&ctx, &ConstraintSet::default()).unwrap_err();
    assert_eq!(err.info().code, "class-empty");

    let classing = Classing::Modular { k: 1 };
    let phased = KeySchedule::uniform(1, WheelSpec::new(Family::Additive, 4).with_phase(4));
    let ctx = SolveContext::new(&ct, &classing, &phased);
    let err = solve(&ctx, &ConstraintSet::default()).unwrap_err();
    assert_eq!(err.info().code, "phase-out-of-range");
}
