mod common;

use common::{linear_ciphertext, sym};
use wheel_solve::{
    solve, Anchor, Classing, Constraint, ConstraintSet, Family, KeySchedule, LegalityPolicy,
    Origin, SolveContext, SolveError, WheelSpec,
};

// ct[0] is D, so plaintext D at 0 needs key A under additive and variant.
fn zero_key_anchor() -> Anchor {
    Anchor::at("self", 0, "D")
}

#[test]
fn literal_key_families_reject_zero_key_anchors() {
    let ct = linear_ciphertext(40);
    let classing = Classing::Modular { k: 2 };
    for family in [Family::Additive, Family::Variant] {
        let schedule = KeySchedule::uniform(2, WheelSpec::new(family, 5));
        let ctx = SolveContext::new(&ct, &classing, &schedule);
        let set = ConstraintSet::from_anchors(&[zero_key_anchor()], ct.len()).unwrap();
        let err = match solve(&ctx, &set).unwrap() {
            Err(SolveError::Illegal(err)) => err,
            other => panic!("{family}: expected an illegal anchor, got {other:?}"),
        };
        assert_eq!(err.position, 0);
        assert_eq!(err.label, "self");
        assert_eq!(err.family, family);
        assert_eq!((err.class, err.slot), (0, 0));
    }
}

#[test]
fn beaufort_zero_offset_is_allowed() {
    let ct = linear_ciphertext(40);
    let classing = Classing::Modular { k: 2 };
    let schedule = KeySchedule::uniform(2, WheelSpec::new(Family::Beaufort, 5));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    // Beaufort key is p + c, so plaintext X (23) over D (3) gives residue 0.
    let set = ConstraintSet::from_anchors(&[Anchor::at("wrap", 0, "X")], ct.len()).unwrap();
    let wheels = solve(&ctx, &set).unwrap().expect("beaufort is exempt");
    assert!(wheels.wheel(0).unwrap().residue(0).unwrap().is_zero());

    let strict = ctx.with_policy(LegalityPolicy::AdditiveOnly);
    assert!(solve(&strict, &set).unwrap().is_ok());
}

#[test]
fn policy_controls_which_families_are_checked() {
    let ct = linear_ciphertext(40);
    let classing = Classing::Modular { k: 1 };
    let schedule = KeySchedule::uniform(1, WheelSpec::new(Family::Variant, 5));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let set = ConstraintSet::from_anchors(&[zero_key_anchor()], ct.len()).unwrap();

    assert!(solve(&ctx, &set).unwrap().is_err());
    assert!(solve(&ctx.with_policy(LegalityPolicy::AdditiveOnly), &set)
        .unwrap()
        .is_ok());
    assert!(solve(&ctx.with_policy(LegalityPolicy::Off), &set)
        .unwrap()
        .is_ok());
}

#[test]
fn tail_constraints_are_exempt() {
    let ct = linear_ciphertext(4);
    let classing = Classing::Modular { k: 1 };
    let schedule = KeySchedule::uniform(1, WheelSpec::new(Family::Additive, 4));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let set = ConstraintSet::new(vec![Constraint::new(0, sym('D'), Origin::Tail)]);
    assert!(solve(&ctx, &set).unwrap().is_ok());
}

#[test]
fn illegality_is_reported_before_conflicts() {
    let ct = linear_ciphertext(130);
    let classing = Classing::parity_triad();
    let schedule = KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let anchors = [
        Anchor::at("EAST", 21, "EAST"),
        Anchor::at("late", 123, "A"),
        zero_key_anchor(),
    ];
    let set = ConstraintSet::from_anchors(&anchors, ct.len()).unwrap();
    assert!(matches!(
        solve(&ctx, &set).unwrap(),
        Err(SolveError::Illegal(ref err)) if err.position == 0
    ));
}
