#![allow(dead_code)]

use std::path::PathBuf;

use wheel_core::{Ciphertext, Symbol};
use wheel_solve::{Anchor, Classing, Tail};
use wheel_sweep::{PeriodAxis, Scenario, SweepPlan};

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// 130 letters with `ct[i] = (7i + 3) mod 26`.
pub fn ciphertext() -> Ciphertext {
    Ciphertext::from_symbols(
        (0..130)
            .map(|i| Symbol::from_residue(7 * i as i64 + 3))
            .collect::<Vec<_>>(),
    )
}

pub fn scenario() -> Scenario {
    Scenario {
        ciphertext: ciphertext(),
        anchors: vec![
            Anchor::at("EAST", 21, "EAST"),
            Anchor::at("NORTHEAST", 63, "NORTHEAST"),
        ],
        tail: Some(Tail {
            start: 124,
            text: "CLOCKS".into(),
        }),
        regions: Vec::new(),
    }
}

/// Parity-triad grid over periods `min..=max`, additive only.
pub fn triad_plan(min: usize, max: usize) -> SweepPlan {
    SweepPlan::new(
        scenario(),
        vec![Classing::parity_triad()],
        PeriodAxis::Uniform { min, max },
    )
}
