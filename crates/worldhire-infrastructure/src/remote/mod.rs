//! Implementations of the hosted backend surface.

pub mod memory_backend;
pub mod rest_backend;

pub use memory_backend::{MemoryBackend, PROFILES_TABLE};
pub use rest_backend::RestBackend;
