pub use crate::{
    batch::WriteBatch,
    context::ExecCtx,
    errors::{StateError, StateResult},
    history::{BlockHashHistory, EmptyHistory},
    store::{MemSlotStore, SlotStore},
};
