#![deny(missing_docs)]
#![doc = "Alphabet arithmetic, error surface and provenance records shared by the key-wheel crates."]

pub mod alphabet;
pub mod errors;
pub mod provenance;

pub use alphabet::{parse_symbols, render_symbols, Ciphertext, Symbol, ALPHABET_LEN};
pub use errors::{ErrorInfo, WheelError};
pub use provenance::{RunProvenance, SchemaVersion};
