use proptest::prelude::*;
use wheel_core::Symbol;
use wheel_solve::Family;

fn symbol() -> impl Strategy<Value = Symbol> {
    (0u8..26).prop_map(|v| Symbol::from_residue(v as i64))
}

proptest! {
    #[test]
    fn every_family_inverts_and_recovers_its_key(p in symbol(), k in symbol()) {
        for family in Family::ALL {
            let c = family.encrypt(p, k);
            prop_assert_eq!(family.decrypt(c, k), p);
            prop_assert_eq!(family.solve_key(p, c), k);
        }
    }
}

#[test]
fn beaufort_and_variant_differ_from_additive() {
    let p = Symbol::from_letter('H').unwrap();
    let k = Symbol::from_letter('D').unwrap();
    assert_eq!(Family::Additive.encrypt(p, k).letter(), 'K');
    assert_eq!(Family::Variant.encrypt(p, k).letter(), 'E');
    assert_eq!(Family::Beaufort.encrypt(p, k).letter(), 'W');
}
