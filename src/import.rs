//! Import of existing WAV files into the library.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::path::Path;

use crate::audio::read_wav_info;
use crate::constants::WAVEFORM_BUCKETS;
use crate::error::{FileStoreError, ImportError};
use crate::file_store::FileStore;
use crate::models::Record;
use crate::record_store::RecordStore;

/// Copy `source` into the records directory and insert its record.
///
/// The copied file is removed again if the row cannot be inserted.
pub async fn import_wav<S, F>(store: &S, files: &F, source: &Path) -> Result<Record, ImportError>
where
    S: RecordStore,
    F: FileStore,
{
    let is_wav = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    let file_name = source.file_name().map(|n| n.to_string_lossy().into_owned());
    let (file_name, name) = match (is_wav, file_name, source.file_stem()) {
        (true, Some(file_name), Some(stem)) => (file_name, stem.to_string_lossy().into_owned()),
        _ => return Err(ImportError::UnsupportedFormat(source.to_path_buf())),
    };

    let wav_path = source.to_path_buf();
    let info =
        tokio::task::spawn_blocking(move || read_wav_info(&wav_path, WAVEFORM_BUCKETS)).await??;

    let metadata = tokio::fs::metadata(source)
        .await
        .map_err(|e| FileStoreError::io(source, e))?;
    let now = Utc::now().timestamp_millis();
    let created = metadata
        .modified()
        .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
        .unwrap_or(now);

    let dest = files.create(&file_name).await?;
    if let Err(e) = tokio::fs::copy(source, &dest).await {
        files.delete(&dest).await;
        return Err(FileStoreError::io(source, e).into());
    }

    let mut record = Record {
        id: 0,
        name,
        duration: info.duration_ms,
        created,
        added: now,
        removed: 0,
        path: dest.clone(),
        format: "wav".to_string(),
        size: metadata.len() as i64,
        sample_rate: info.sample_rate as i32,
        channel_count: info.channels as i32,
        bitrate: info.bitrate as i32,
        is_bookmarked: false,
        is_waveform_processed: true,
        is_moved_to_recycle: false,
        amps: info.amps,
    };

    match store.insert(&record).await {
        Ok(id) => {
            record.id = id;
            info!("Imported {} as record {} ({})", source.display(), id, dest);
            Ok(record)
        }
        Err(e) => {
            if !files.delete(&dest).await {
                warn!("Failed to remove {} after insert failure", dest);
            }
            Err(e.into())
        }
    }
}
