//! Devnet of chains exchanging block hashes, and a broadcast scenario run over
//! it.  Shared by the `waypoint-sim` binary and the integration tests.

pub mod network;
pub mod scenario;
