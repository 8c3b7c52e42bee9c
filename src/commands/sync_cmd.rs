//! `henro sync`: load the site table and write one document per row.

use clap::Args;
use henro_core::{prepare, synchronize, RowMapping, StoreError, SyncError, Table, TableError};
use std::path::PathBuf;

use crate::config::{Config, ConfigError};
use crate::firestore::FirestoreStore;

/// Write every row of the input table to Firestore
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Input file (overrides input_path from config)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Print the documents as JSON lines instead of writing them
    #[arg(long)]
    dry_run: bool,
}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), SyncCommandError> {
        let table = self.load_table(config)?;
        let mapping = config.row_mapping()?;

        if self.dry_run {
            return print_documents(&table, &mapping);
        }

        let mut store = FirestoreStore::from_config(&config.firestore)?;
        let report = synchronize(&table, &mapping, &mut store).await?;

        tracing::info!(
            collection = store.collection(),
            "Synchronized {} document(s)",
            report.written
        );
        println!(
            "Wrote {} document(s) to '{}'.",
            report.written,
            store.collection()
        );

        Ok(())
    }

    fn load_table(&self, config: &Config) -> Result<Table, SyncCommandError> {
        let path = self
            .input
            .clone()
            .unwrap_or_else(|| config.input_path.value.clone());
        let delimiter = config.delimiter_byte()?;

        tracing::info!("Loading {}", path.display());
        let table = Table::from_csv_path(&path, delimiter)?;
        tracing::info!(
            "Loaded {} row(s) with {} column(s)",
            table.len(),
            table.columns().len()
        );

        Ok(table)
    }
}

fn print_documents(table: &Table, mapping: &RowMapping) -> Result<(), SyncCommandError> {
    for (key, document) in prepare(table, mapping)? {
        let line = serde_json::json!({ "key": key, "document": document });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

/// Errors from the sync command
#[derive(Debug)]
pub enum SyncCommandError {
    Config(ConfigError),
    Table(TableError),
    Store(StoreError),
    Sync(SyncError),
    Json(serde_json::Error),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::Config(e) => write!(f, "{}", e),
            SyncCommandError::Table(e) => write!(f, "{}", e),
            SyncCommandError::Store(e) => write!(f, "{}", e),
            SyncCommandError::Sync(e) => write!(f, "{}", e),
            SyncCommandError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Config(e) => Some(e),
            SyncCommandError::Table(e) => Some(e),
            SyncCommandError::Store(e) => Some(e),
            SyncCommandError::Sync(e) => Some(e),
            SyncCommandError::Json(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SyncCommandError {
    fn from(e: ConfigError) -> Self {
        SyncCommandError::Config(e)
    }
}

impl From<TableError> for SyncCommandError {
    fn from(e: TableError) -> Self {
        SyncCommandError::Table(e)
    }
}

impl From<StoreError> for SyncCommandError {
    fn from(e: StoreError) -> Self {
        SyncCommandError::Store(e)
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::Sync(e)
    }
}

impl From<serde_json::Error> for SyncCommandError {
    fn from(e: serde_json::Error) -> Self {
        SyncCommandError::Json(e)
    }
}
