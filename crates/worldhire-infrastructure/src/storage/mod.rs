//! Storage layer: atomic JSON files and the persistent slot implementations.

mod atomic_json;
mod file_slot;
mod memory_slot;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use file_slot::FileSlotStore;
pub use memory_slot::MemorySlotStore;
