//! Per-record advisory locks.
//!
//! Two mutations on the same record id are serialized; mutations on
//! different ids never wait on each other. The locks live in process
//! memory only and do not guard against another process sharing the
//! database and records directory.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct RecordLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// Held for the duration of one mutation
pub struct RecordLockGuard<'a> {
    owner: &'a RecordLocks,
    record_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation holds `record_id`
    pub async fn acquire(&self, record_id: i64) -> RecordLockGuard<'_> {
        // Clone out of the map before awaiting so no shard lock is held
        let mutex = self
            .locks
            .entry(record_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        RecordLockGuard {
            owner: self,
            record_id,
            guard: Some(guard),
        }
    }

    /// Number of record ids with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for RecordLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody holds or waits on it
        self.owner
            .locks
            .remove_if(&self.record_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_entry_removed_after_release() {
        let locks = RecordLocks::new();
        {
            let _guard = locks.acquire(10).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_records_do_not_block() {
        let locks = RecordLocks::new();
        let _a = locks.acquire(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_same_record_blocks_until_release() {
        let locks = RecordLocks::new();
        let guard = locks.acquire(7).await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(7)).await;
        assert!(blocked.is_err());
        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.acquire(7)).await;
        assert!(acquired.is_ok());
    }
}
