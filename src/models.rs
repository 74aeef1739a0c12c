//! Row types for the `records` and `record_edit` tables.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Metadata of one audio clip
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    /// Duration in milliseconds
    pub duration: i64,
    pub created: i64,
    pub added: i64,
    pub removed: i64,
    pub path: String,
    pub format: String,
    pub size: i64,
    pub sample_rate: i32,
    pub channel_count: i32,
    pub bitrate: i32,
    pub is_bookmarked: bool,
    pub is_waveform_processed: bool,
    pub is_moved_to_recycle: bool,
    pub amps: Vec<i32>,
}

/// Kind of mutation bracketed by a journal entry
///
/// Persisted by ordinal. The mapping is fixed; reordering variants would
/// break existing databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOperation {
    Rename,
    MoveToRecycle,
    RestoreFromRecycle,
    DeleteForever,
}

const EDIT_OPERATIONS: [(EditOperation, i32, &str); 4] = [
    (EditOperation::Rename, 0, "rename"),
    (EditOperation::MoveToRecycle, 1, "move_to_recycle"),
    (EditOperation::RestoreFromRecycle, 2, "restore_from_recycle"),
    (EditOperation::DeleteForever, 3, "delete_forever"),
];

impl EditOperation {
    pub const ALL: [EditOperation; 4] = [
        EditOperation::Rename,
        EditOperation::MoveToRecycle,
        EditOperation::RestoreFromRecycle,
        EditOperation::DeleteForever,
    ];

    /// Value stored in the `editOperation` column
    pub fn ordinal(self) -> i32 {
        EDIT_OPERATIONS
            .iter()
            .find(|(op, _, _)| *op == self)
            .map(|(_, ordinal, _)| *ordinal)
            .unwrap_or_default()
    }

    pub fn from_ordinal(ordinal: i32) -> Result<Self, StoreError> {
        EDIT_OPERATIONS
            .iter()
            .find(|(_, o, _)| *o == ordinal)
            .map(|(op, _, _)| *op)
            .ok_or_else(|| StoreError::InvalidValue {
                column: "editOperation",
                value: ordinal.to_string(),
            })
    }

    pub fn as_str(self) -> &'static str {
        EDIT_OPERATIONS
            .iter()
            .find(|(op, _, _)| *op == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("rename")
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditOperation {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EDIT_OPERATIONS
            .iter()
            .find(|(_, _, name)| *name == s)
            .map(|(op, _, _)| *op)
            .ok_or_else(|| StoreError::InvalidValue {
                column: "editOperation",
                value: s.to_string(),
            })
    }
}

/// One journal entry: a mutation that is in flight or was left inconsistent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEdit {
    /// Transaction id
    pub id: i64,
    pub record_id: i64,
    pub edit_operation: EditOperation,
    /// Target name, only present for `Rename`
    pub rename_name: Option<String>,
    pub created: i64,
    pub retry_count: i32,
}

/// Encode amplitude samples as comma-joined integers
pub fn encode_amps(amps: &[i32]) -> String {
    amps.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode the `amps` column; the empty string is an empty array
pub fn decode_amps(text: &str) -> Result<Vec<i32>, StoreError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|part| {
            part.trim().parse::<i32>().map_err(|_| StoreError::InvalidValue {
                column: "amps",
                value: part.to_string(),
            })
        })
        .collect()
}
