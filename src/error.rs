//! Error types shared by the stores and the mutation service.

use std::path::PathBuf;

/// Failure of the SQLite-backed record store or edit journal
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record {0} not found")]
    RecordNotFound(i64),

    #[error("invalid value {value:?} in column {column}")]
    InvalidValue { column: &'static str, value: String },

    #[error("database version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Failure of a file-system operation on an audio file
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("file is not marked as deleted: {0}")]
    NotMarkedDeleted(PathBuf),

    #[error("file is already marked as deleted: {0}")]
    AlreadyMarkedDeleted(PathBuf),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file moved to {actual} instead of {expected}")]
    Misplaced { expected: PathBuf, actual: PathBuf },
}

impl FileStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileStoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Infrastructure failure while running a record mutation
///
/// Ordinary step failures are reported through `MutationOutcome`; this type
/// covers the journal itself failing and the legacy "restore could not be
/// completed" signal.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("edit journal failure: {0}")]
    Journal(#[source] StoreError),

    #[error("record store failure: {0}")]
    Store(#[source] StoreError),

    #[error("failed to restore record {record_id}: transaction {transaction_id} left in journal")]
    FailedToRestore { record_id: i64, transaction_id: i64 },
}

/// Invalid or unreadable configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure while importing an audio file into the library
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported audio file {0}: only WAV can be imported")]
    UnsupportedFormat(PathBuf),

    #[error("failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    File(#[from] FileStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
