//! Inspection of journal entries left behind by unfinished mutations.
//!
//! This only reports. Nothing here retries, and `retry_count` is never
//! incremented; a replay scheduler would sit on top of `inspect_pending`
//! and decide its own retry limits.

use log::info;
use serde::Serialize;
use std::path::Path;

use crate::constants::TRASH_MARK_EXTENSION;
use crate::error::StoreError;
use crate::file_store::{is_marked_deleted, FileStore};
use crate::journal::EditJournal;
use crate::models::{EditOperation, Record, RecordEdit};
use crate::record_store::RecordStore;

/// Current state of the file and row behind a leftover entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Diagnosis {
    /// The row's path exists; file and row agree
    Consistent,
    /// The file step landed but the row still has the old path
    FileAheadOfRow { file_path: String },
    /// Neither the row's path nor the expected new path exists
    FileMissing,
    /// The row is gone; the file may still be on disk
    RowDeleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingEdit {
    pub edit: RecordEdit,
    pub record: Option<Record>,
    pub diagnosis: Diagnosis,
}

/// Classify every leftover journal entry, most recent first
pub async fn inspect_pending<S, F, J>(
    store: &S,
    files: &F,
    journal: &J,
) -> Result<Vec<PendingEdit>, StoreError>
where
    S: RecordStore,
    F: FileStore,
    J: EditJournal,
{
    let edits = journal.list_all().await?;
    let mut pending = Vec::with_capacity(edits.len());
    for edit in edits {
        let record = store.get_by_id(edit.record_id).await?;
        let diagnosis = match &record {
            Some(record) => diagnose(files, &edit, record).await,
            None => Diagnosis::RowDeleted,
        };
        info!(
            "Pending transaction {}: {} on record {} (retries: {}) -> {:?}",
            edit.id, edit.edit_operation, edit.record_id, edit.retry_count, diagnosis
        );
        pending.push(PendingEdit {
            edit,
            record,
            diagnosis,
        });
    }
    Ok(pending)
}

async fn diagnose<F: FileStore>(files: &F, edit: &RecordEdit, record: &Record) -> Diagnosis {
    if files.exists(&record.path).await {
        return Diagnosis::Consistent;
    }
    let expected = match edit.edit_operation {
        EditOperation::Rename => edit
            .rename_name
            .as_deref()
            .map(|name| renamed_path(&record.path, name)),
        EditOperation::MoveToRecycle if !is_marked_deleted(&record.path) => {
            Some(format!("{}.{}", record.path, TRASH_MARK_EXTENSION))
        }
        EditOperation::RestoreFromRecycle => record
            .path
            .strip_suffix(&format!(".{}", TRASH_MARK_EXTENSION))
            .map(str::to_string),
        _ => None,
    };
    if let Some(file_path) = expected {
        if files.exists(&file_path).await {
            return Diagnosis::FileAheadOfRow { file_path };
        }
    }
    Diagnosis::FileMissing
}

/// Path a rename to `name` would produce, keeping the extension
fn renamed_path(path: &str, name: &str) -> String {
    let path = Path::new(path);
    let file_name = match path.extension() {
        Some(ext) => format!("{}.{}", name, ext.to_string_lossy()),
        None => name.to_string(),
    };
    path.with_file_name(file_name).to_string_lossy().into_owned()
}
