use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table};

use crate::schema::{Metadata, RecordEdit, Records};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).string().primary_key())
        .col(ColumnDef::new(Metadata::Value).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS records (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     duration, created, added, removed INTEGER NOT NULL,
///     path TEXT NOT NULL,
///     format TEXT NOT NULL,
///     size INTEGER NOT NULL,
///     sampleRate, channelCount, bitrate INTEGER NOT NULL,
///     isBookmarked, isWaveformProcessed, isMovedToRecycle INTEGER NOT NULL DEFAULT 0,
///     amps TEXT NOT NULL DEFAULT ''
/// )
pub fn create_records_table() -> String {
    Table::create()
        .table(Records::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Records::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(Records::Name).string().not_null())
        .col(ColumnDef::new(Records::Duration).big_integer().not_null())
        .col(ColumnDef::new(Records::Created).big_integer().not_null())
        .col(ColumnDef::new(Records::Added).big_integer().not_null())
        .col(
            ColumnDef::new(Records::Removed)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Records::Path).string().not_null())
        .col(ColumnDef::new(Records::Format).string().not_null())
        .col(ColumnDef::new(Records::Size).big_integer().not_null())
        .col(ColumnDef::new(Records::SampleRate).integer().not_null())
        .col(ColumnDef::new(Records::ChannelCount).integer().not_null())
        .col(ColumnDef::new(Records::Bitrate).integer().not_null())
        .col(
            ColumnDef::new(Records::IsBookmarked)
                .integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Records::IsWaveformProcessed)
                .integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Records::IsMovedToRecycle)
                .integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Records::Amps).text().not_null().default(""))
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS record_edit (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     recordId INTEGER NOT NULL,
///     editOperation INTEGER NOT NULL,
///     renameName TEXT NULL,
///     created INTEGER NOT NULL,
///     retryCount INTEGER NOT NULL DEFAULT 0
/// )
///
/// No foreign key to records: DeleteForever removes the row while the
/// journal entry is still open.
pub fn create_record_edit_table() -> String {
    Table::create()
        .table(RecordEdit::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(RecordEdit::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(RecordEdit::RecordId).big_integer().not_null())
        .col(ColumnDef::new(RecordEdit::EditOperation).integer().not_null())
        .col(ColumnDef::new(RecordEdit::RenameName).string().null())
        .col(ColumnDef::new(RecordEdit::Created).big_integer().not_null())
        .col(
            ColumnDef::new(RecordEdit::RetryCount)
                .integer()
                .not_null()
                .default(0),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_records_recycle_added ON records(isMovedToRecycle, added)
pub fn create_records_recycle_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_records_recycle_added")
        .table(Records::Table)
        .col(Records::IsMovedToRecycle)
        .col(Records::Added)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_record_edit_record_id ON record_edit(recordId)
pub fn create_record_edit_record_id_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_record_edit_record_id")
        .table(RecordEdit::Table)
        .col(RecordEdit::RecordId)
        .to_string(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_edit_table_uses_camel_case_columns() {
        let sql = create_record_edit_table();
        assert!(sql.contains("\"record_edit\""));
        assert!(sql.contains("\"recordId\""));
        assert!(sql.contains("\"editOperation\""));
        assert!(sql.contains("\"renameName\""));
        assert!(sql.contains("\"retryCount\""));
    }

    #[test]
    fn test_records_table_uses_camel_case_columns() {
        let sql = create_records_table();
        assert!(sql.contains("\"records\""));
        assert!(sql.contains("\"sampleRate\""));
        assert!(sql.contains("\"isMovedToRecycle\""));
        assert!(sql.contains("\"amps\""));
    }
}
