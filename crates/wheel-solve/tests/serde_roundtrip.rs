mod common;

use common::{linear_ciphertext, sym};
use wheel_solve::{
    canonical_wheels_hash, coverage, derive, from_json_slice, solve, to_canonical_json_bytes,
    Anchor, Classing, Constraint, ConstraintSet, CoverageReport, Family, KeySchedule, Origin,
    Region, SolveContext, SolveError, WheelSpec, Wheels,
};

fn solved() -> (Wheels, CoverageReport) {
    let ct = linear_ciphertext(130);
    let classing = Classing::parity_triad();
    let schedule = KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17).with_phase(3));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let set = ConstraintSet::from_anchors(&[Anchor::at("EAST", 21, "EAST")], ct.len()).unwrap();
    let wheels = solve(&ctx, &set).unwrap().unwrap();
    let derived = derive(&ct, &classing, &wheels);
    let report = coverage(&classing, &wheels, &derived, &[Region::new("EAST", 21, 24)]);
    (wheels, report)
}

#[test]
fn wheels_and_coverage_survive_canonical_json() {
    let (wheels, report) = solved();
    let bytes = to_canonical_json_bytes(&wheels).expect("serialize wheels");
    let restored: Wheels = from_json_slice(&bytes).expect("deserialize wheels");
    assert_eq!(restored, wheels);
    assert_eq!(canonical_wheels_hash(&restored), canonical_wheels_hash(&wheels));

    let bytes = to_canonical_json_bytes(&report).expect("serialize report");
    let restored: CoverageReport = from_json_slice(&bytes).expect("deserialize report");
    assert_eq!(restored, report);
}

#[test]
fn schedules_and_errors_use_readable_tags() {
    let schedule = KeySchedule::new(vec![
        WheelSpec::new(Family::Beaufort, 7),
        WheelSpec::new(Family::Variant, 9).with_phase(2),
    ]);
    let json = String::from_utf8(to_canonical_json_bytes(&schedule).unwrap()).unwrap();
    assert!(json.contains("\"beaufort\""));
    assert!(json.contains("\"phase\":2"));
    let back: KeySchedule = from_json_slice(json.as_bytes()).unwrap();
    assert_eq!(back, schedule);

    let classing: Classing = serde_json::from_str(r#"{"type":"stepped","k":3,"step":2}"#).unwrap();
    assert_eq!(classing, Classing::Stepped { k: 3, step: 2 });

    let ct = linear_ciphertext(130);
    let classing = Classing::parity_triad();
    let schedule = KeySchedule::uniform(6, WheelSpec::new(Family::Additive, 17));
    let ctx = SolveContext::new(&ct, &classing, &schedule);
    let set = ConstraintSet::new(vec![
        Constraint::new(21, sym('E'), Origin::Manual),
        Constraint::new(123, sym('A'), Origin::Manual),
    ]);
    let err = solve(&ctx, &set).unwrap().unwrap_err();
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["reason"], "conflict");
    assert_eq!(value["earlier_position"], 21);
    let back: SolveError = serde_json::from_value(value).unwrap();
    assert_eq!(back, err);
}

#[test]
fn malformed_json_maps_to_serde_error() {
    let err = from_json_slice::<Wheels>(b"{not json").unwrap_err();
    assert!(matches!(err, wheel_core::WheelError::Serde(_)));
}
