pub mod query;
pub mod repository;

pub use repository::PostgresRecordStore;
