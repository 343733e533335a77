//! Broadcasting messages on one chain and verifying them on another.

mod broadcaster;
mod errors;
mod receiver;

pub use broadcaster::Broadcaster;
pub use errors::{BroadcastError, BroadcastResult};
pub use receiver::{Receiver, ReceiverResolver};
