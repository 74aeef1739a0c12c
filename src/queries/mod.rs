//! SQL text builders, one module per table

pub mod ddl;
pub mod metadata;
pub mod record_edits;
pub mod records;
