pub mod memory_store;
pub mod stream;

pub use memory_store::MemoryStore;
