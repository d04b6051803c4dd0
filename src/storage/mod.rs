// storage/mod.rs
// Database pools, migrations and the result store

pub mod migrations;
pub mod pool;
pub mod results;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::{init_pool, init_pool_with};
pub use results::{AnalysisRecord, ResultStore, SqliteResultStore};
