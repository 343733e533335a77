//! Hop provers.
//!
//! A hop prover is deployed on a *home* chain and knows how to get from a
//! commitment to the home chain's state to a commitment to its *target*
//! chain's state, and from there to individual storage slots.  Provers are
//! pure functions of their immutable configuration, which is also what their
//! code hash commits to, so a copy deployed on another chain is
//! interchangeable with the original for everything except reading the home
//! chain directly.

pub mod buffer_prover;
pub mod code;
pub mod deployments;
pub mod errors;
pub mod proof;
pub mod prover;
pub mod root_store;
pub mod root_store_prover;

pub use buffer_prover::{BufferProver, BufferProverConfig};
pub use code::{ProverCode, ProverKind};
pub use deployments::ProverDeployments;
pub use errors::*;
pub use prover::HopProver;
pub use root_store::FinalizedRootStore;
pub use root_store_prover::{RootStoreProver, RootStoreProverConfig};
