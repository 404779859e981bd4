//! Storage domain - collection-scoped record store abstraction

mod record;
mod repository;

pub use record::{CollectionRecord, Filter, OrderBy, Record, SortDirection};
pub use repository::RecordStore;

#[cfg(test)]
pub use repository::MockRecordStore;
