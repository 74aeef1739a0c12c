// Library interface for testing

// Declare all modules
pub mod audio;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod file_store;
pub mod import;
pub mod journal;
pub mod locks;
pub mod models;
pub mod mutation;
pub mod queries;
pub mod record_store;
pub mod recovery;
pub mod schema;

// Re-export the expected database version for convenience
pub use constants::EXPECTED_DB_VERSION;
pub use mutation::{MutationOutcome, RecordMutationService, Rejection};
