//! File Store: operations on audio files in the records directory.

use async_trait::async_trait;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::TRASH_MARK_EXTENSION;
use crate::error::FileStoreError;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Rename the file at `path` to `new_name`, keeping its extension.
    /// Returns the new absolute path.
    async fn rename(&self, path: &str, new_name: &str) -> Result<String, FileStoreError>;

    /// Append the trash marker to the file name. Returns the marked path.
    async fn mark_as_deleted(&self, path: &str) -> Result<String, FileStoreError>;

    /// Strip the trash marker from the file name. Returns the restored path.
    async fn unmark_as_deleted(&self, path: &str) -> Result<String, FileStoreError>;

    /// Move the file at `from` to exactly `to`. Fails if `to` exists.
    async fn move_to(&self, from: &str, to: &str) -> Result<(), FileStoreError>;

    /// Remove the file; false if it could not be removed
    async fn delete(&self, path: &str) -> bool;

    /// Create a new empty file named `name` (made unique if taken)
    async fn create(&self, name: &str) -> Result<String, FileStoreError>;

    async fn exists(&self, path: &str) -> bool;

    /// Free bytes on the volume holding the records directory
    fn available_space(&self) -> Result<u64, FileStoreError>;
}

/// True if the file name carries the trash marker
pub fn is_marked_deleted(path: &str) -> bool {
    path.ends_with(&format!(".{}", TRASH_MARK_EXTENSION))
}

fn validate_name(name: &str) -> Result<(), FileStoreError> {
    if name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(FileStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `FileStore` over a local directory
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    records_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
        }
    }

    /// Create the records directory if missing
    pub async fn ensure_dir(&self) -> Result<(), FileStoreError> {
        tokio::fs::create_dir_all(&self.records_dir)
            .await
            .map_err(|e| FileStoreError::io(&self.records_dir, e))
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Move `from` to `to` by link and unlink; an existing `to` is never replaced
    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), FileStoreError> {
        match tokio::fs::hard_link(from, to).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FileStoreError::AlreadyExists(to.to_path_buf()));
            }
            Err(e) => {
                if !path_exists(from).await {
                    return Err(FileStoreError::NotFound(from.to_path_buf()));
                }
                return Err(FileStoreError::io(to, e));
            }
        }
        if let Err(e) = tokio::fs::remove_file(from).await {
            if let Err(cleanup) = tokio::fs::remove_file(to).await {
                warn!("Failed to remove link {}: {}", to.display(), cleanup);
            }
            return Err(FileStoreError::io(from, e));
        }
        debug!("Moved {} -> {}", from.display(), to.display());
        Ok(())
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn path_to_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn rename(&self, path: &str, new_name: &str) -> Result<String, FileStoreError> {
        validate_name(new_name)?;
        let from = Path::new(path);
        let file_name = match from.extension() {
            Some(ext) => format!("{}.{}", new_name, ext.to_string_lossy()),
            None => new_name.to_string(),
        };
        let to = from.with_file_name(file_name);
        self.move_file(from, &to).await?;
        Ok(path_to_string(to))
    }

    async fn mark_as_deleted(&self, path: &str) -> Result<String, FileStoreError> {
        if is_marked_deleted(path) {
            return Err(FileStoreError::AlreadyMarkedDeleted(PathBuf::from(path)));
        }
        let marked = format!("{}.{}", path, TRASH_MARK_EXTENSION);
        self.move_file(Path::new(path), Path::new(&marked)).await?;
        Ok(marked)
    }

    async fn unmark_as_deleted(&self, path: &str) -> Result<String, FileStoreError> {
        let suffix = format!(".{}", TRASH_MARK_EXTENSION);
        let restored = match path.strip_suffix(&suffix) {
            Some(restored) if !restored.is_empty() => restored.to_string(),
            _ => return Err(FileStoreError::NotMarkedDeleted(PathBuf::from(path))),
        };
        self.move_file(Path::new(path), Path::new(&restored))
            .await?;
        Ok(restored)
    }

    async fn move_to(&self, from: &str, to: &str) -> Result<(), FileStoreError> {
        self.move_file(Path::new(from), Path::new(to)).await
    }

    async fn delete(&self, path: &str) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted file {}", path);
                true
            }
            Err(e) => {
                warn!("Failed to delete file {}: {}", path, e);
                false
            }
        }
    }

    async fn create(&self, name: &str) -> Result<String, FileStoreError> {
        validate_name(name)?;
        let base = Path::new(name);
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let ext = base.extension().map(|e| e.to_string_lossy().into_owned());

        let mut attempt = 0u32;
        loop {
            let candidate = match (attempt, &ext) {
                (0, _) => name.to_string(),
                (n, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
                (n, None) => format!("{}-{}", stem, n),
            };
            let path = self.records_dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok(path_to_string(path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(FileStoreError::io(path, e)),
            }
        }
    }

    async fn exists(&self, path: &str) -> bool {
        path_exists(Path::new(path)).await
    }

    fn available_space(&self) -> Result<u64, FileStoreError> {
        fs2::available_space(&self.records_dir).map_err(|e| FileStoreError::io(&self.records_dir, e))
    }
}
