pub mod errors;
pub mod models;
pub mod schema;
pub mod usage_storage;

pub use errors::StorageError;
pub use models::{Interface, InterfaceRegistry, MonthlyAggregate, StoreStatus, UsageStore};
pub use usage_storage::SqliteUsageStore;
