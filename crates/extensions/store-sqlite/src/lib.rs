//! SQLite job store for cronsync.
//!
//! Persists job definitions in a single `jobs` table.

mod backend;
mod schema;

pub use backend::SqliteJobStore;
