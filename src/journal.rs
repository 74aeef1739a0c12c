//! Edit Journal: durable log of in-flight record mutations.
//!
//! An entry is written before a mutation touches any resource and deleted
//! once the file and the row agree again. An entry that outlives its
//! mutation marks a record whose file and row are known to disagree.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::StoreError;
use crate::models::{EditOperation, RecordEdit};
use crate::queries::record_edits;

#[async_trait]
pub trait EditJournal: Send + Sync {
    /// Open an entry and return its transaction id
    async fn begin(
        &self,
        record_id: i64,
        operation: EditOperation,
        rename_name: Option<&str>,
    ) -> Result<i64, StoreError>;

    /// Close an entry. Closing an absent id is a no-op.
    async fn end(&self, transaction_id: i64) -> Result<(), StoreError>;

    async fn get(&self, transaction_id: i64) -> Result<Option<RecordEdit>, StoreError>;

    /// All entries, most recent first
    async fn list_all(&self) -> Result<Vec<RecordEdit>, StoreError>;

    async fn list_for_record(&self, record_id: i64) -> Result<Vec<RecordEdit>, StoreError>;
}

/// `EditJournal` stored in the `record_edit` table
#[derive(Clone)]
pub struct SqliteEditJournal {
    pool: SqlitePool,
}

impl SqliteEditJournal {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str) -> Result<Vec<RecordEdit>, StoreError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(edit_from_row).collect()
    }
}

fn edit_from_row(row: &SqliteRow) -> Result<RecordEdit, StoreError> {
    let ordinal: i32 = row.try_get("editOperation")?;
    Ok(RecordEdit {
        id: row.try_get("id")?,
        record_id: row.try_get("recordId")?,
        edit_operation: EditOperation::from_ordinal(ordinal)?,
        rename_name: row.try_get("renameName")?,
        created: row.try_get("created")?,
        retry_count: row.try_get("retryCount")?,
    })
}

#[async_trait]
impl EditJournal for SqliteEditJournal {
    async fn begin(
        &self,
        record_id: i64,
        operation: EditOperation,
        rename_name: Option<&str>,
    ) -> Result<i64, StoreError> {
        let created = Utc::now().timestamp_millis();
        let sql = record_edits::insert(record_id, operation, rename_name, created);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        let transaction_id = result.last_insert_rowid();
        debug!(
            "Journal: opened transaction {} ({} on record {})",
            transaction_id, operation, record_id
        );
        Ok(transaction_id)
    }

    async fn end(&self, transaction_id: i64) -> Result<(), StoreError> {
        sqlx::query(&record_edits::delete_by_id(transaction_id))
            .execute(&self.pool)
            .await?;
        debug!("Journal: closed transaction {}", transaction_id);
        Ok(())
    }

    async fn get(&self, transaction_id: i64) -> Result<Option<RecordEdit>, StoreError> {
        let sql = record_edits::select_by_id(transaction_id);
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(edit_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<RecordEdit>, StoreError> {
        self.fetch_all(&record_edits::select_all()).await
    }

    async fn list_for_record(&self, record_id: i64) -> Result<Vec<RecordEdit>, StoreError> {
        self.fetch_all(&record_edits::select_by_record_id(record_id))
            .await
    }
}
