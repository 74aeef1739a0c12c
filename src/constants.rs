use rand::Rng;

/// Expected database schema version
/// All databases must use this version for compatibility
pub const EXPECTED_DB_VERSION: &str = "1";

/// Suffix appended to a file name when its record is moved to the recycle bin
pub const TRASH_MARK_EXTENSION: &str = "deleted";

/// Default number of records returned per listing page
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Default retention for recycled records (in days) before purge deletes them forever
pub const DEFAULT_RECYCLE_RETENTION_DAYS: i64 = 30;

/// Upper bound accepted for the recycle retention (100 years)
pub const MAX_RECYCLE_RETENTION_DAYS: i64 = 36_500;

/// Number of amplitude buckets computed for an imported clip
pub const WAVEFORM_BUCKETS: usize = 200;

/// Generate a unique database ID
pub fn generate_db_unique_id() -> String {
    format!(
        "db_{}",
        rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(12)
            .map(char::from)
            .collect::<String>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_format() {
        let id = generate_db_unique_id();
        assert!(id.starts_with("db_"));
        assert_eq!(id.len(), 15);
        assert_ne!(id, generate_db_unique_id());
    }
}
