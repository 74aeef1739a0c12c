//! SQLite connection setup and schema initialization.

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::constants::{generate_db_unique_id, EXPECTED_DB_VERSION};
use crate::error::StoreError;
use crate::queries::{ddl, metadata};

/// Open a file-based database pool, creating the file if needed
/// Enables WAL mode and foreign keys
pub async fn open_database_connection(db_path: &Path) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("SQLite database: {}", db_path.display());
    Ok(pool)
}

/// Create tables and indexes if they don't exist
pub async fn init_database_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(&ddl::create_metadata_table())
        .execute(pool)
        .await?;
    sqlx::query(&ddl::create_records_table())
        .execute(pool)
        .await?;
    sqlx::query(&ddl::create_record_edit_table())
        .execute(pool)
        .await?;

    sqlx::query(&ddl::create_records_recycle_index())
        .execute(pool)
        .await?;
    sqlx::query(&ddl::create_record_edit_record_id_index())
        .execute(pool)
        .await?;

    Ok(())
}

/// Query a single metadata value by key
pub async fn query_metadata(pool: &SqlitePool, key: &str) -> Result<Option<String>, StoreError> {
    let sql = metadata::select_by_key(key);
    let value: Option<String> = sqlx::query_scalar(&sql).fetch_optional(pool).await?;
    Ok(value)
}

/// Write version and unique_id on a fresh database, verify the version otherwise
pub async fn ensure_metadata(pool: &SqlitePool) -> Result<(), StoreError> {
    match query_metadata(pool, "version").await? {
        Some(found) if found != EXPECTED_DB_VERSION => {
            return Err(StoreError::VersionMismatch {
                expected: EXPECTED_DB_VERSION.to_string(),
                found,
            });
        }
        Some(_) => {}
        None => {
            sqlx::query(&metadata::upsert("version", EXPECTED_DB_VERSION))
                .execute(pool)
                .await?;
        }
    }

    if query_metadata(pool, "unique_id").await?.is_none() {
        let unique_id = generate_db_unique_id();
        sqlx::query(&metadata::insert("unique_id", &unique_id))
            .execute(pool)
            .await?;
        info!("Initialized database with unique_id {}", unique_id);
    }

    Ok(())
}

/// Open, initialize and version-check a database in one step
pub async fn open_and_prepare(db_path: &Path) -> Result<SqlitePool, StoreError> {
    let pool = open_database_connection(db_path).await?;
    init_database_schema(&pool).await?;
    ensure_metadata(&pool).await?;
    Ok(pool)
}

/// Create a database in a temporary directory for testing
/// Returns (pool, guard) - keep the guard alive to prevent deletion
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), StoreError> {
    let temp_dir = tempfile::tempdir().map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
    let db_path = temp_dir.path().join("test.sqlite");
    let pool = open_and_prepare(&db_path).await?;
    Ok((pool, temp_dir))
}
