use sea_query::{Expr, Func, Order, Query, SimpleExpr, SqliteQueryBuilder};

use crate::models::{encode_amps, Record};
use crate::schema::Records;

/// Every column except `id`, in insert order
const DATA_COLUMNS: [Records; 15] = [
    Records::Name,
    Records::Duration,
    Records::Created,
    Records::Added,
    Records::Removed,
    Records::Path,
    Records::Format,
    Records::Size,
    Records::SampleRate,
    Records::ChannelCount,
    Records::Bitrate,
    Records::IsBookmarked,
    Records::IsWaveformProcessed,
    Records::IsMovedToRecycle,
    Records::Amps,
];

fn data_values(record: &Record) -> [SimpleExpr; 15] {
    [
        record.name.as_str().into(),
        record.duration.into(),
        record.created.into(),
        record.added.into(),
        record.removed.into(),
        record.path.as_str().into(),
        record.format.as_str().into(),
        record.size.into(),
        record.sample_rate.into(),
        record.channel_count.into(),
        record.bitrate.into(),
        (record.is_bookmarked as i32).into(),
        (record.is_waveform_processed as i32).into(),
        (record.is_moved_to_recycle as i32).into(),
        encode_amps(&record.amps).into(),
    ]
}

fn all_columns() -> Vec<Records> {
    let mut columns = vec![Records::Id];
    columns.extend(DATA_COLUMNS);
    columns
}

/// INSERT INTO records (name, duration, ..., amps) VALUES (...)
/// The id is assigned by SQLite
pub fn insert(record: &Record) -> String {
    Query::insert()
        .into_table(Records::Table)
        .columns(DATA_COLUMNS)
        .values_panic(data_values(record))
        .to_string(SqliteQueryBuilder)
}

/// UPDATE records SET name = ?, ..., amps = ? WHERE id = ?
pub fn update(record: &Record) -> String {
    let values: Vec<(Records, SimpleExpr)> = DATA_COLUMNS
        .into_iter()
        .zip(data_values(record))
        .collect();
    Query::update()
        .table(Records::Table)
        .values(values)
        .and_where(Expr::col(Records::Id).eq(record.id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM records WHERE id = ?
pub fn select_by_id(id: i64) -> String {
    Query::select()
        .columns(all_columns())
        .from(Records::Table)
        .and_where(Expr::col(Records::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM records WHERE id = ?
pub fn delete_by_id(id: i64) -> String {
    Query::delete()
        .from_table(Records::Table)
        .and_where(Expr::col(Records::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM records WHERE isMovedToRecycle = 0 ORDER BY added DESC, id DESC LIMIT ? OFFSET ?
pub fn select_page(offset: u64, limit: u64) -> String {
    Query::select()
        .columns(all_columns())
        .from(Records::Table)
        .and_where(Expr::col(Records::IsMovedToRecycle).eq(0))
        .order_by(Records::Added, Order::Desc)
        .order_by(Records::Id, Order::Desc)
        .limit(limit)
        .offset(offset)
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM records WHERE isMovedToRecycle = 1 ORDER BY removed DESC, id DESC
pub fn select_recycled() -> String {
    Query::select()
        .columns(all_columns())
        .from(Records::Table)
        .and_where(Expr::col(Records::IsMovedToRecycle).eq(1))
        .order_by(Records::Removed, Order::Desc)
        .order_by(Records::Id, Order::Desc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT * FROM records WHERE isMovedToRecycle = 1 AND removed < ? ORDER BY removed
pub fn select_recycled_before(cutoff_ms: i64) -> String {
    Query::select()
        .columns(all_columns())
        .from(Records::Table)
        .and_where(Expr::col(Records::IsMovedToRecycle).eq(1))
        .and_where(Expr::col(Records::Removed).lt(cutoff_ms))
        .order_by(Records::Removed, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT COUNT(id) FROM records WHERE isMovedToRecycle = ?
pub fn count(recycled: bool) -> String {
    Query::select()
        .expr(Func::count(Expr::col(Records::Id)))
        .from(Records::Table)
        .and_where(Expr::col(Records::IsMovedToRecycle).eq(recycled as i32))
        .to_string(SqliteQueryBuilder)
}

/// SELECT SUM(duration) FROM records WHERE isMovedToRecycle = 0
pub fn total_duration() -> String {
    Query::select()
        .expr(Func::sum(Expr::col(Records::Duration)))
        .from(Records::Table)
        .and_where(Expr::col(Records::IsMovedToRecycle).eq(0))
        .to_string(SqliteQueryBuilder)
}

/// UPDATE records SET isBookmarked = ? WHERE id = ?
pub fn set_bookmarked(id: i64, bookmarked: bool) -> String {
    Query::update()
        .table(Records::Table)
        .value(Records::IsBookmarked, bookmarked as i32)
        .and_where(Expr::col(Records::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}
