//! Route verification.
//!
//! A route is a list of pointers, one per hop.  The first pointer lives on the
//! executing chain and every later one on the previous hop's target chain.
//! Folding the route turns a commitment to the executing chain (read locally)
//! into a commitment to the last target chain, against which a single storage
//! slot is then proven.

mod errors;
mod resolver;
mod verifier;

pub use errors::{RouteError, RouteResult};
pub use resolver::{HopResolver, PointerResolver, ResolvedHop};
pub use verifier::{read_remote_slot, verify_route, RemoteReadArgs, RemoteSlot, RouteOutcome};
