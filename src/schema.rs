use sea_query::Iden;

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Records table - one row per audio clip
///
/// Column names are camelCase to stay compatible with existing stores.
#[derive(Iden)]
pub enum Records {
    Table,
    Id,
    Name,
    Duration,
    Created,
    Added,
    Removed,
    Path,
    Format,
    Size,
    #[iden = "sampleRate"]
    SampleRate,
    #[iden = "channelCount"]
    ChannelCount,
    Bitrate,
    #[iden = "isBookmarked"]
    IsBookmarked,
    #[iden = "isWaveformProcessed"]
    IsWaveformProcessed,
    #[iden = "isMovedToRecycle"]
    IsMovedToRecycle,
    Amps,
}

/// Record edit journal - one row per in-flight mutation
#[derive(Iden)]
pub enum RecordEdit {
    Table,
    Id,
    #[iden = "recordId"]
    RecordId,
    #[iden = "editOperation"]
    EditOperation,
    #[iden = "renameName"]
    RenameName,
    Created,
    #[iden = "retryCount"]
    RetryCount,
}
