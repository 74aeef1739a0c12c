use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use audio_record_store::config::AppConfig;
use audio_record_store::db::open_and_prepare;
use audio_record_store::file_store::{FileStore, LocalFileStore};
use audio_record_store::import::import_wav;
use audio_record_store::journal::SqliteEditJournal;
use audio_record_store::models::Record;
use audio_record_store::record_store::{RecordStore, SqliteRecordStore};
use audio_record_store::recovery::inspect_pending;
use audio_record_store::{MutationOutcome, RecordMutationService};

type DynError = Box<dyn std::error::Error + Send + Sync>;

type Service = RecordMutationService<SqliteRecordStore, LocalFileStore, SqliteEditJournal>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage a library of recorded audio clips")]
struct Args {
    /// Path to config file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a WAV file into the library
    Import {
        /// WAV file to copy into the records directory
        file: PathBuf,
    },
    /// List records
    List {
        /// Show the recycle bin instead of active records
        #[arg(long)]
        recycled: bool,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u64,

        /// Records per page (overrides config file)
        #[arg(long)]
        page_size: Option<u64>,
    },
    /// Rename a record and its file
    Rename { id: i64, name: String },
    /// Move a record to the recycle bin
    Trash { id: i64 },
    /// Restore a record from the recycle bin
    Restore { id: i64 },
    /// Delete a record and its file permanently
    Delete { id: i64 },
    /// Bookmark a record
    Bookmark {
        id: i64,

        /// Remove the bookmark instead
        #[arg(long)]
        off: bool,
    },
    /// Show unfinished mutations left in the edit journal
    Journal {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete recycled records older than the retention period
    Purge,
    /// Show library statistics
    Stats,
}

fn main() -> Result<(), DynError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args.command, config))
}

async fn run(command: Command, config: AppConfig) -> Result<(), DynError> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|e| format!("Failed to create data dir '{}': {}", config.data_dir.display(), e))?;
    let pool = open_and_prepare(&config.database_path()).await?;

    let files = LocalFileStore::new(config.records_dir());
    files.ensure_dir().await?;
    let service: Service = RecordMutationService::new(
        SqliteRecordStore::new(pool.clone()),
        files,
        SqliteEditJournal::new(pool),
    );

    match command {
        Command::Import { file } => {
            let record = import_wav(service.store(), service.files(), &file).await?;
            println!("Imported record {}: {}", record.id, record.path);
            Ok(())
        }
        Command::List {
            recycled,
            page,
            page_size,
        } => list(&service, &config, recycled, page, page_size).await,
        Command::Rename { id, name } => report("Rename", id, service.rename(id, &name).await?),
        Command::Trash { id } => report("Trash", id, service.move_to_recycle(id).await?),
        Command::Restore { id } => report("Restore", id, service.restore_from_recycle(id).await?),
        Command::Delete { id } => report("Delete", id, service.delete_forever(id).await?),
        Command::Bookmark { id, off } => {
            service.store().set_bookmarked(id, !off).await?;
            println!("Record {} bookmark {}", id, if off { "removed" } else { "set" });
            Ok(())
        }
        Command::Journal { json } => journal(&service, json).await,
        Command::Purge => purge(&service, &config).await,
        Command::Stats => stats(&service).await,
    }
}

fn report(action: &str, id: i64, outcome: MutationOutcome) -> Result<(), DynError> {
    match &outcome {
        MutationOutcome::Completed => println!("{} of record {} completed", action, id),
        MutationOutcome::Unchanged => println!("Record {} already has that name", id),
        MutationOutcome::Rejected(reason) => {
            return Err(format!("{} of record {} refused: {:?}", action, id, reason).into());
        }
        MutationOutcome::Failed { transaction_id } => {
            return Err(format!(
                "{} of record {} failed (transaction {}), nothing was changed",
                action, id, transaction_id
            )
            .into());
        }
        MutationOutcome::Stuck { .. } => {}
    }
    outcome.into_legacy()?;
    Ok(())
}

fn format_duration(ms: i64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

fn print_record(record: &Record) {
    println!(
        "{:>6} {} {:<32} {:>10} {}",
        record.id,
        if record.is_bookmarked { "*" } else { " " },
        record.name,
        format_duration(record.duration),
        record.path
    );
}

async fn list(
    service: &Service,
    config: &AppConfig,
    recycled: bool,
    page: u64,
    page_size: Option<u64>,
) -> Result<(), DynError> {
    let records = if recycled {
        service.store().list_recycled().await?
    } else {
        let page_size = page_size.unwrap_or(config.page_size).max(1);
        let offset = page.saturating_sub(1) * page_size;
        service.store().list_page(offset, page_size).await?
    };
    if records.is_empty() {
        println!("No records");
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

async fn journal(service: &Service, json: bool) -> Result<(), DynError> {
    let pending = inspect_pending(service.store(), service.files(), service.journal()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }
    if pending.is_empty() {
        println!("Edit journal is empty");
    }
    for item in &pending {
        println!(
            "tx {:>6} record {:>6} {:<20} retries {} -> {:?}",
            item.edit.id,
            item.edit.record_id,
            item.edit.edit_operation.to_string(),
            item.edit.retry_count,
            item.diagnosis
        );
    }
    Ok(())
}

async fn purge(service: &Service, config: &AppConfig) -> Result<(), DynError> {
    let cutoff_ms = config.recycle_cutoff_ms(Utc::now())?;
    let results = service.purge_recycled_before(cutoff_ms).await?;
    let failed = results.iter().filter(|(_, o)| !o.is_success()).count();
    for (id, outcome) in &results {
        println!("Record {}: {:?}", id, outcome);
    }
    println!(
        "Purged {} recycled records older than {} days ({} failed)",
        results.len() - failed,
        config.recycle_retention_days,
        failed
    );
    Ok(())
}

async fn stats(service: &Service) -> Result<(), DynError> {
    let store = service.store();
    println!("Records:        {}", store.count().await?);
    println!("Recycled:       {}", store.count_recycled().await?);
    println!(
        "Total duration: {}",
        format_duration(store.total_duration().await?)
    );
    println!("Records dir:    {}", service.files().records_dir().display());
    println!(
        "Free space:     {} MB",
        service.files().available_space()? / (1024 * 1024)
    );
    Ok(())
}
