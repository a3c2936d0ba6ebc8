//! Partition store implementations

pub mod memory;

pub use memory::MemoryCacheStorage;
