use serde::Serialize;
use sha2::{Digest, Sha256};
use wheel_core::{Ciphertext, WheelError};

use crate::serde::to_canonical_json_bytes;
use crate::wheel::Wheels;

/// Computes a stable SHA-256 hex digest of the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, WheelError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Hash of the ciphertext letters.
pub fn ciphertext_hash(ciphertext: &Ciphertext) -> String {
    let mut hasher = Sha256::new();
    hasher.update((ciphertext.len() as u64).to_le_bytes());
    for symbol in ciphertext.symbols() {
        hasher.update([symbol.value()]);
    }
    format!("{:x}", hasher.finalize())
}

/// Structural hash of solved wheels: family, period, phase and residues of
/// every class. Witness positions are excluded, so two solves that fix the
/// same residues from different anchors hash alike.
pub fn canonical_wheels_hash(wheels: &Wheels) -> String {
    let mut hasher = Sha256::new();
    hasher.update((wheels.len() as u64).to_le_bytes());
    for wheel in wheels.iter() {
        hasher.update([wheel.family() as u8]);
        hasher.update((wheel.period() as u64).to_le_bytes());
        hasher.update((wheel.phase() as u64).to_le_bytes());
        for residue in wheel.residues() {
            // 0xff marks an unresolved slot; residues are below 26
            hasher.update([residue.map_or(0xff, |r| r.value())]);
        }
    }
    format!("{:x}", hasher.finalize())
}
