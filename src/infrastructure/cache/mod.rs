//! Cache infrastructure

mod read_through;

pub use read_through::{CacheState, ReadThroughCache};
