//! Record Mutation Service.
//!
//! Every mutation spans the file system and the record store. Each one is
//! bracketed by an edit journal entry:
//!
//! 1. open the entry
//! 2. step A (file side, or the row delete for DeleteForever)
//! 3. step B (row side), only after step A succeeded
//! 4. on step B failure, undo step A
//! 5. close the entry unless the file and the row are known to disagree
//!
//! | Step A | Step B | Rollback | Journal entry | Outcome     |
//! |--------|--------|----------|---------------|-------------|
//! | fail   | -      | -        | deleted       | `Failed`    |
//! | ok     | ok     | -        | deleted       | `Completed` |
//! | ok     | fail   | ok       | deleted       | `Failed`    |
//! | ok     | fail   | fail     | kept          | `Stuck`     |

use chrono::Utc;
use log::{error, info, warn};

use crate::error::{FileStoreError, MutationError};
use crate::file_store::FileStore;
use crate::journal::EditJournal;
use crate::locks::RecordLocks;
use crate::models::{EditOperation, Record};
use crate::record_store::RecordStore;

/// Why a mutation was refused before opening a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    RecordNotFound,
    FileMissing,
    InvalidName,
    /// Rename of a record sitting in the recycle bin
    InRecycle,
}

/// Result of one mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Both resources reflect the new state
    Completed,
    /// Nothing to do (rename to the current name)
    Unchanged,
    /// Refused up front; nothing touched, no journal entry
    Rejected(Rejection),
    /// Failed, and both resources reflect the original state
    Failed { transaction_id: i64 },
    /// File and row disagree; the journal entry was kept
    Stuck {
        record_id: i64,
        transaction_id: i64,
    },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Completed | MutationOutcome::Unchanged)
    }

    pub fn transaction_id(&self) -> Option<i64> {
        match self {
            MutationOutcome::Failed { transaction_id }
            | MutationOutcome::Stuck { transaction_id, .. } => Some(*transaction_id),
            _ => None,
        }
    }

    /// Boolean call style that raises only when the record was left stuck
    pub fn into_legacy(self) -> Result<bool, MutationError> {
        match self {
            MutationOutcome::Stuck {
                record_id,
                transaction_id,
            } => Err(MutationError::FailedToRestore {
                record_id,
                transaction_id,
            }),
            other => Ok(other.is_success()),
        }
    }
}

/// File-side half of Rename, MoveToRecycle and RestoreFromRecycle
#[derive(Debug, Clone, Copy)]
enum FileStep<'a> {
    Rename { new_name: &'a str },
    MarkDeleted,
    UnmarkDeleted,
}

impl FileStep<'_> {
    fn operation(&self) -> EditOperation {
        match self {
            FileStep::Rename { .. } => EditOperation::Rename,
            FileStep::MarkDeleted => EditOperation::MoveToRecycle,
            FileStep::UnmarkDeleted => EditOperation::RestoreFromRecycle,
        }
    }

    fn rename_name(&self) -> Option<&str> {
        match self {
            FileStep::Rename { new_name } => Some(*new_name),
            _ => None,
        }
    }
}

/// Runs the four record mutations against injected stores
pub struct RecordMutationService<S, F, J> {
    store: S,
    files: F,
    journal: J,
    locks: RecordLocks,
}

impl<S, F, J> RecordMutationService<S, F, J>
where
    S: RecordStore,
    F: FileStore,
    J: EditJournal,
{
    pub fn new(store: S, files: F, journal: J) -> Self {
        Self {
            store,
            files,
            journal,
            locks: RecordLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Rename the record and its file; the file keeps its extension
    pub async fn rename(
        &self,
        record_id: i64,
        new_name: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let _lock = self.locks.acquire(record_id).await;
        let record = match self.find(record_id).await? {
            Some(record) => record,
            None => return Ok(MutationOutcome::Rejected(Rejection::RecordNotFound)),
        };
        if record.name == new_name {
            return Ok(MutationOutcome::Unchanged);
        }
        if new_name.trim().is_empty() || new_name.contains(['/', '\\']) {
            return Ok(MutationOutcome::Rejected(Rejection::InvalidName));
        }
        if record.is_moved_to_recycle {
            return Ok(MutationOutcome::Rejected(Rejection::InRecycle));
        }
        if let Some(rejected) = self.check_file(&record).await {
            return Ok(rejected);
        }
        self.run_file_then_store(&record, FileStep::Rename { new_name }, |record, path| Record {
            name: new_name.to_string(),
            path,
            ..record.clone()
        })
        .await
    }

    pub async fn move_to_recycle(&self, record_id: i64) -> Result<MutationOutcome, MutationError> {
        let _lock = self.locks.acquire(record_id).await;
        let record = match self.load(record_id).await? {
            Ok(record) => record,
            Err(outcome) => return Ok(outcome),
        };
        let removed = Utc::now().timestamp_millis();
        self.run_file_then_store(&record, FileStep::MarkDeleted, |record, path| Record {
            path,
            is_moved_to_recycle: true,
            removed,
            ..record.clone()
        })
        .await
    }

    pub async fn restore_from_recycle(
        &self,
        record_id: i64,
    ) -> Result<MutationOutcome, MutationError> {
        let _lock = self.locks.acquire(record_id).await;
        let record = match self.load(record_id).await? {
            Ok(record) => record,
            Err(outcome) => return Ok(outcome),
        };
        self.run_file_then_store(&record, FileStep::UnmarkDeleted, |record, path| Record {
            path,
            is_moved_to_recycle: false,
            removed: 0,
            ..record.clone()
        })
        .await
    }

    /// Delete the row, then the file. There is no rollback: a file that
    /// cannot be removed leaves the journal entry behind.
    pub async fn delete_forever(&self, record_id: i64) -> Result<MutationOutcome, MutationError> {
        let _lock = self.locks.acquire(record_id).await;
        let record = match self.find(record_id).await? {
            Some(record) => record,
            None => return Ok(MutationOutcome::Rejected(Rejection::RecordNotFound)),
        };

        let transaction_id = self
            .journal
            .begin(record_id, EditOperation::DeleteForever, None)
            .await
            .map_err(MutationError::Journal)?;

        if let Err(e) = self.store.delete_by_id(record_id).await {
            warn!("DeleteForever record {}: row delete failed: {}", record_id, e);
            self.close(transaction_id).await?;
            return Ok(MutationOutcome::Failed { transaction_id });
        }

        if !self.files.delete(&record.path).await {
            error!(
                "DeleteForever record {}: row removed but file {} remains, transaction {} kept",
                record_id, record.path, transaction_id
            );
            return Ok(MutationOutcome::Stuck {
                record_id,
                transaction_id,
            });
        }

        self.close(transaction_id).await?;
        info!("Deleted record {} forever", record_id);
        Ok(MutationOutcome::Completed)
    }

    /// DeleteForever every recycled record removed before `cutoff_ms`
    pub async fn purge_recycled_before(
        &self,
        cutoff_ms: i64,
    ) -> Result<Vec<(i64, MutationOutcome)>, MutationError> {
        let expired = self
            .store
            .list_recycled_before(cutoff_ms)
            .await
            .map_err(MutationError::Store)?;
        let mut results = Vec::with_capacity(expired.len());
        for record in expired {
            let outcome = self.delete_forever(record.id).await?;
            results.push((record.id, outcome));
        }
        Ok(results)
    }

    async fn find(&self, record_id: i64) -> Result<Option<Record>, MutationError> {
        self.store
            .get_by_id(record_id)
            .await
            .map_err(MutationError::Store)
    }

    async fn check_file(&self, record: &Record) -> Option<MutationOutcome> {
        if self.files.exists(&record.path).await {
            return None;
        }
        warn!("Record {}: file {} is missing", record.id, record.path);
        Some(MutationOutcome::Rejected(Rejection::FileMissing))
    }

    /// Look up the record and check its file is present
    async fn load(&self, record_id: i64) -> Result<Result<Record, MutationOutcome>, MutationError> {
        let record = match self.find(record_id).await? {
            Some(record) => record,
            None => return Ok(Err(MutationOutcome::Rejected(Rejection::RecordNotFound))),
        };
        match self.check_file(&record).await {
            Some(rejected) => Ok(Err(rejected)),
            None => Ok(Ok(record)),
        }
    }

    async fn run_file_then_store(
        &self,
        record: &Record,
        step: FileStep<'_>,
        updated: impl FnOnce(&Record, String) -> Record,
    ) -> Result<MutationOutcome, MutationError> {
        let operation = step.operation();
        let transaction_id = self
            .journal
            .begin(record.id, operation, step.rename_name())
            .await
            .map_err(MutationError::Journal)?;

        let new_path = match self.apply(step, &record.path).await {
            Ok(path) => path,
            Err(e) => {
                warn!("{} record {}: file step failed: {}", operation, record.id, e);
                self.close(transaction_id).await?;
                return Ok(MutationOutcome::Failed { transaction_id });
            }
        };

        let store_err = match self.store.update(&updated(record, new_path.clone())).await {
            Ok(()) => {
                self.close(transaction_id).await?;
                info!("{} record {}: {} -> {}", operation, record.id, record.path, new_path);
                return Ok(MutationOutcome::Completed);
            }
            Err(e) => e,
        };

        warn!(
            "{} record {}: store update failed, rolling back file: {}",
            operation, record.id, store_err
        );
        match self.undo(step, &new_path, &record.path).await {
            Ok(()) => {
                self.close(transaction_id).await?;
                Ok(MutationOutcome::Failed { transaction_id })
            }
            Err(e) => {
                error!(
                    "{} record {}: rollback of {} failed, transaction {} kept: {}",
                    operation, record.id, new_path, transaction_id, e
                );
                Ok(MutationOutcome::Stuck {
                    record_id: record.id,
                    transaction_id,
                })
            }
        }
    }

    async fn apply(&self, step: FileStep<'_>, path: &str) -> Result<String, FileStoreError> {
        match step {
            FileStep::Rename { new_name } => self.files.rename(path, new_name).await,
            FileStep::MarkDeleted => self.files.mark_as_deleted(path).await,
            FileStep::UnmarkDeleted => self.files.unmark_as_deleted(path).await,
        }
    }

    /// Put the file back at `original_path`
    async fn undo(
        &self,
        step: FileStep<'_>,
        applied_path: &str,
        original_path: &str,
    ) -> Result<(), FileStoreError> {
        match step {
            FileStep::Rename { .. } => self.files.move_to(applied_path, original_path).await,
            FileStep::MarkDeleted => self
                .files
                .unmark_as_deleted(applied_path)
                .await
                .and_then(|path| same_path(path, original_path)),
            FileStep::UnmarkDeleted => self
                .files
                .mark_as_deleted(applied_path)
                .await
                .and_then(|path| same_path(path, original_path)),
        }
    }

    async fn close(&self, transaction_id: i64) -> Result<(), MutationError> {
        self.journal
            .end(transaction_id)
            .await
            .map_err(MutationError::Journal)
    }
}

/// A rollback that lands anywhere but the row's path has not restored the file
fn same_path(undone: String, original: &str) -> Result<(), FileStoreError> {
    if undone == original {
        Ok(())
    } else {
        Err(FileStoreError::Misplaced {
            expected: original.into(),
            actual: undone.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_maps_stuck_to_error() {
        let stuck = MutationOutcome::Stuck {
            record_id: 10,
            transaction_id: 3,
        };
        match stuck.into_legacy() {
            Err(MutationError::FailedToRestore {
                record_id,
                transaction_id,
            }) => {
                assert_eq!(record_id, 10);
                assert_eq!(transaction_id, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_legacy_maps_other_outcomes_to_bool() {
        assert!(MutationOutcome::Completed.into_legacy().unwrap());
        assert!(MutationOutcome::Unchanged.into_legacy().unwrap());
        assert!(!MutationOutcome::Failed { transaction_id: 1 }
            .into_legacy()
            .unwrap());
        assert!(!MutationOutcome::Rejected(Rejection::FileMissing)
            .into_legacy()
            .unwrap());
    }

    #[test]
    fn test_same_path() {
        assert!(same_path("/r/a.m4a".to_string(), "/r/a.m4a").is_ok());
        assert!(matches!(
            same_path("/r/a.2".to_string(), "/r/a"),
            Err(FileStoreError::Misplaced { .. })
        ));
    }

    #[test]
    fn test_transaction_id() {
        assert_eq!(MutationOutcome::Completed.transaction_id(), None);
        assert_eq!(
            MutationOutcome::Failed { transaction_id: 4 }.transaction_id(),
            Some(4)
        );
    }
}
