//! Storage infrastructure - Record store implementations

mod factory;
#[cfg(test)]
pub mod faulty;
mod in_memory;
mod postgres;
pub mod timestamp;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryRecordStore;
pub use postgres::{PostgresConfig, PostgresRecordStore};
