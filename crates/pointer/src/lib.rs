//! Pointers give a hop prover a stable address.  The owner can move a pointer
//! to a newer prover version, and anyone reading the pointer remotely learns
//! both where the prover is and the hash of its code.

mod errors;
mod pointer;

pub use errors::{PointerError, PointerResult};
pub use pointer::Pointer;
