//! Collection of generic data types that are shared by every hop of a route.

pub mod abi;
pub mod alias;
pub mod chain;
pub mod constants;
pub mod events;
pub mod slots;

pub mod prelude;
