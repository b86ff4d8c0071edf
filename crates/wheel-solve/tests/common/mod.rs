#![allow(dead_code)]

use wheel_core::{Ciphertext, Symbol};
use wheel_solve::{ClassAssignment, KeySchedule};

pub fn sym(letter: char) -> Symbol {
    Symbol::from_letter(letter).unwrap()
}

/// Ciphertext whose letter at `i` is `(7i + 3) mod 26`.
pub fn linear_ciphertext(n: usize) -> Ciphertext {
    Ciphertext::from_symbols(
        (0..n)
            .map(|i| Symbol::from_residue(7 * i as i64 + 3))
            .collect::<Vec<_>>(),
    )
}

/// Enciphers `plaintext` with fully known per-class keys, where
/// `keys[class][slot]` is the residue of that slot.
pub fn encipher<C: ClassAssignment>(
    plaintext: &[Symbol],
    classing: &C,
    schedule: &KeySchedule,
    keys: &[Vec<Symbol>],
) -> Ciphertext {
    let symbols: Vec<Symbol> = plaintext
        .iter()
        .enumerate()
        .map(|(position, &p)| {
            let class = classing.class_of(position);
            let spec = schedule.spec(class).unwrap();
            spec.family.encrypt(p, keys[class][spec.slot_of(position)])
        })
        .collect();
    Ciphertext::from_symbols(symbols)
}
