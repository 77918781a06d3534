//! Token cache implementations.

mod file;
mod memory;

pub use file::FileTokenCache;
pub use memory::InMemoryTokenCache;
