//! Record Store: the `records` table behind a trait seam.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::StoreError;
use crate::models::{decode_amps, Record};
use crate::queries::records;

/// Persistent record metadata
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<Record>, StoreError>;

    /// Overwrite every column of the row with `record.id`.
    /// Fails with `RecordNotFound` when no row was updated.
    async fn update(&self, record: &Record) -> Result<(), StoreError>;

    /// Fails with `RecordNotFound` when no row was deleted.
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;

    /// Insert a new row and return its assigned id (`record.id` is ignored)
    async fn insert(&self, record: &Record) -> Result<i64, StoreError>;

    /// Number of records not in the recycle bin
    async fn count(&self) -> Result<i64, StoreError>;

    async fn count_recycled(&self) -> Result<i64, StoreError>;

    /// Sum of durations (ms) of records not in the recycle bin
    async fn total_duration(&self) -> Result<i64, StoreError>;

    /// Records not in the recycle bin, most recently added first
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Record>, StoreError>;

    async fn list_recycled(&self) -> Result<Vec<Record>, StoreError>;

    /// Recycled records whose `removed` time is before `cutoff_ms`
    async fn list_recycled_before(&self, cutoff_ms: i64) -> Result<Vec<Record>, StoreError>;

    async fn set_bookmarked(&self, id: i64, bookmarked: bool) -> Result<(), StoreError>;
}

/// `RecordStore` backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_all(&self, sql: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn execute_for_id(&self, sql: &str, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound(id));
        }
        Ok(())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<Record, StoreError> {
    let amps: String = row.try_get("amps")?;
    Ok(Record {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        duration: row.try_get("duration")?,
        created: row.try_get("created")?,
        added: row.try_get("added")?,
        removed: row.try_get("removed")?,
        path: row.try_get("path")?,
        format: row.try_get("format")?,
        size: row.try_get("size")?,
        sample_rate: row.try_get("sampleRate")?,
        channel_count: row.try_get("channelCount")?,
        bitrate: row.try_get("bitrate")?,
        is_bookmarked: row.try_get("isBookmarked")?,
        is_waveform_processed: row.try_get("isWaveformProcessed")?,
        is_moved_to_recycle: row.try_get("isMovedToRecycle")?,
        amps: decode_amps(&amps)?,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Record>, StoreError> {
        let sql = records::select_by_id(id);
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn update(&self, record: &Record) -> Result<(), StoreError> {
        self.execute_for_id(&records::update(record), record.id)
            .await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.execute_for_id(&records::delete_by_id(id), id).await
    }

    async fn insert(&self, record: &Record) -> Result<i64, StoreError> {
        let sql = records::insert(record);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(&records::count(false))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_recycled(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(&records::count(true))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn total_duration(&self) -> Result<i64, StoreError> {
        // SUM over zero rows is NULL
        let total: Option<i64> = sqlx::query_scalar(&records::total_duration())
            .fetch_one(&self.pool)
            .await?;
        Ok(total.unwrap_or(0))
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(&records::select_page(offset, limit)).await
    }

    async fn list_recycled(&self) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(&records::select_recycled()).await
    }

    async fn list_recycled_before(&self, cutoff_ms: i64) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(&records::select_recycled_before(cutoff_ms))
            .await
    }

    async fn set_bookmarked(&self, id: i64, bookmarked: bool) -> Result<(), StoreError> {
        self.execute_for_id(&records::set_bookmarked(id, bookmarked), id)
            .await
    }
}
