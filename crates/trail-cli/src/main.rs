//! `trail` — command-line access to an audit store.
//!
//! Reads `trail.toml` (or the path given with `--config`), opens the SQLite
//! store it names, and runs one command:
//!
//! ```text
//! trail clone <OLD> [NEW]              fork a context (NEW defaults to a UUID)
//! trail counts <CONTEXT>               rows per table
//! trail dump <CONTEXT> [--table T]     rows as JSON lines
//! ```

mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trail_core::{AuditStore, Table, TableCounts};
use trail_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(author, version, about = "Inspect and fork recorded audit contexts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "trail.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Copy every record of OLD into NEW, remapping all references.
  Clone {
    old: String,
    /// Destination context; a fresh UUID when omitted.
    new: Option<String>,
  },
  /// Print the number of rows per table for a context.
  Counts { context: String },
  /// Print the raw rows of a context, one JSON object per line.
  Dump {
    context: String,
    /// Restrict to one table (host, data_source, message, audit).
    #[arg(short, long)]
    table: Option<Table>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so `dump` output stays parseable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = CliConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Clone { old, new } => {
      let new = new.unwrap_or_else(|| Uuid::new_v4().to_string());
      let counts = store
        .clone_context(&old, &new)
        .await
        .with_context(|| format!("failed to clone context {old:?} into {new:?}"))?;
      println!("{new}");
      print_counts(&counts);
    }
    Command::Counts { context } => {
      let counts = store
        .counts(&context)
        .await
        .with_context(|| format!("failed to count rows of {context:?}"))?;
      print_counts(&counts);
    }
    Command::Dump { context, table } => {
      let tables = match table {
        Some(t) => vec![t],
        None => Table::ALL.to_vec(),
      };
      for table in tables {
        for row in store
          .dump(&context, table)
          .await
          .with_context(|| format!("failed to read {table} rows"))?
        {
          let line = serde_json::json!({ "table": table, "row": row });
          println!("{line}");
        }
      }
    }
  }

  Ok(())
}

fn print_counts(counts: &TableCounts) {
  for table in Table::ALL {
    println!("{:<12} {}", table.as_str(), counts.get(table));
  }
}
