use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use crate::models::EditOperation;
use crate::schema::RecordEdit;

const COLUMNS: [RecordEdit; 6] = [
    RecordEdit::Id,
    RecordEdit::RecordId,
    RecordEdit::EditOperation,
    RecordEdit::RenameName,
    RecordEdit::Created,
    RecordEdit::RetryCount,
];

/// INSERT INTO record_edit (recordId, editOperation, renameName, created, retryCount)
/// VALUES (?, ?, ?, ?, 0)
pub fn insert(
    record_id: i64,
    operation: EditOperation,
    rename_name: Option<&str>,
    created_ms: i64,
) -> String {
    Query::insert()
        .into_table(RecordEdit::Table)
        .columns([
            RecordEdit::RecordId,
            RecordEdit::EditOperation,
            RecordEdit::RenameName,
            RecordEdit::Created,
            RecordEdit::RetryCount,
        ])
        .values_panic([
            record_id.into(),
            operation.ordinal().into(),
            rename_name.map(str::to_string).into(),
            created_ms.into(),
            0i32.into(),
        ])
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM record_edit WHERE id = ?
pub fn delete_by_id(id: i64) -> String {
    Query::delete()
        .from_table(RecordEdit::Table)
        .and_where(Expr::col(RecordEdit::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM record_edit WHERE id = ?
pub fn select_by_id(id: i64) -> String {
    Query::select()
        .columns(COLUMNS)
        .from(RecordEdit::Table)
        .and_where(Expr::col(RecordEdit::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM record_edit ORDER BY created DESC, id DESC
pub fn select_all() -> String {
    Query::select()
        .columns(COLUMNS)
        .from(RecordEdit::Table)
        .order_by(RecordEdit::Created, Order::Desc)
        .order_by(RecordEdit::Id, Order::Desc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM record_edit WHERE recordId = ? ORDER BY created DESC, id DESC
pub fn select_by_record_id(record_id: i64) -> String {
    Query::select()
        .columns(COLUMNS)
        .from(RecordEdit::Table)
        .and_where(Expr::col(RecordEdit::RecordId).eq(record_id))
        .order_by(RecordEdit::Created, Order::Desc)
        .order_by(RecordEdit::Id, Order::Desc)
        .to_string(SqliteQueryBuilder)
}
