//! Getting parent chain block hashes onto a child chain.
//!
//! A [`Pusher`](pusher::Pusher) on the parent reads recent block hashes and
//! sends them through a [`CrossDomainMessenger`](messaging::CrossDomainMessenger).
//! Some later, independent call relays the message to the child chain's
//! [`RingBuffer`](buffer::RingBuffer), which keeps the most recent
//! `buffer_size` of them addressable by block number.

pub mod buffer;
pub mod errors;
pub mod messaging;
pub mod pusher;

pub use buffer::{block_hash_slot, ring_slot, PusherAuth, RingBuffer};
pub use errors::*;
pub use messaging::{
    CrossDomainMessenger, Delivery, MessageChannel, NativeMessenger, PendingMessage,
    RetryableInbox,
};
pub use pusher::Pusher;
