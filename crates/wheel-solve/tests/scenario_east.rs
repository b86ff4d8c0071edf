mod common;

use common::{linear_ciphertext, sym};
use wheel_solve::{
    derive, solve, Anchor, ClassAssignment, Classing, ConstraintSet, Family, KeySchedule,
    SolveContext, WheelSpec,
};

#[test]
fn east_anchor_fixes_slot_four_of_its_class() {
    let ct = linear_ciphertext(130);
    let classing = Classing::parity_triad();
    let schedule = KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let constraints = ConstraintSet::from_anchors(&[Anchor::at("EAST", 21, "EAST")], ct.len())
        .expect("anchor expands");

    let wheels = solve(&ctx, &constraints)
        .expect("valid configuration")
        .expect("consistent constraints");

    let class = classing.class_of(21);
    assert_eq!(class, 3);
    let wheel = wheels.wheel(class).unwrap();
    assert_eq!(wheel.slot_of(21), 21 % 17);
    let residue = wheel.residue(4).expect("slot 4 resolved");
    assert_eq!(wheel.witness(4), Some(21));
    assert_eq!(Family::Additive.decrypt(ct.get(21).unwrap(), residue), sym('E'));

    let derived = derive(&ct, &classing, &wheels);
    assert_eq!(derived.render('?').get(21..25), Some("EAST"));
    assert!(derived.agrees_with(&constraints));

    // 123 is the next position in class 3 whose slot is 4.
    assert_eq!(classing.class_of(123), class);
    assert!(derived.is_determined(123));
    assert_eq!(
        derived.get(123),
        Some(Family::Additive.decrypt(ct.get(123).unwrap(), residue))
    );

    // Position 4 also sits on slot 4, but of class 1, which no anchor touches.
    assert_eq!(classing.class_of(4), 1);
    assert!(!derived.is_determined(4));
    assert_eq!(derived.determined_count(), 4 + 4);
}

#[test]
fn single_track_propagates_to_earlier_positions() {
    let ct = linear_ciphertext(60);
    let classing = Classing::Modular { k: 1 };
    let schedule = KeySchedule::uniform(1, WheelSpec::new(Family::Additive, 17));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let constraints =
        ConstraintSet::from_anchors(&[Anchor::at("EAST", 21, "EAST")], ct.len()).unwrap();
    let wheels = solve(&ctx, &constraints).unwrap().unwrap();
    let derived = derive(&ct, &classing, &wheels);

    let residue = wheels.wheel(0).unwrap().residue(4).unwrap();
    assert!(derived.is_determined(4));
    assert_eq!(
        derived.get(4),
        Some(Family::Additive.decrypt(ct.get(4).unwrap(), residue))
    );
    // positions 4..=7, 21..=24 and 38..=41, 55..=58
    assert_eq!(derived.determined_count(), 16);
}
