//! State plumbing shared by every component: where slots live, how writes are
//! staged, and the context a call executes in.
//!
//! Components never write a slot directly.  They stage writes in a
//! [`WriteBatch`](batch::WriteBatch) while checking their preconditions and
//! apply it once everything passed, so a failed call leaves storage untouched.

pub mod batch;
pub mod context;
pub mod errors;
pub mod history;
pub mod store;

pub mod prelude;
