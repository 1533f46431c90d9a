//! # todo-history - expired task history
//!
//! Browse the to-do tasks that expired, grouped by the calendar day they were
//! created on.
//!
//! ## Quick Start
//!
//! ```bash
//! # Expired tasks created today
//! todo-history show
//!
//! # ...two days ago, as JSON
//! todo-history show --date "2 days ago" --format json
//!
//! # Which days this month have expired tasks
//! todo-history days --month 2026-10
//! ```
//!
//! ## Data
//!
//! Tasks are read (never written) from `~/.todo-history/<key>.json`, a JSON
//! array of records like:
//!
//! ```json
//! {"id": 1, "text": "Review team updates", "createdAt": "2026-10-14T09:00:00.000Z",
//!  "expiresAt": 1792022399999, "expired": true, "isComplete": false}
//! ```
//!
//! Timestamps may be ISO-8601 strings or epoch milliseconds. A corrupt file is
//! ignored with a warning. Five sample tasks are appended to whatever the
//! store holds unless `--no-samples` is given.

use std::io;

use chrono::Local;
use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod filter;
pub mod render;
pub mod source;
pub mod store;
pub mod task;
pub mod time;

use cli::Cli;
use cmd::*;
use config::{init_logging, Config};
use error::Result;
use store::FileStore;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env(&cli);
    let now = Local::now();
    let today = now.date_naive();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Completions { shell } => {
            cmd_completions(&mut stdout, shell);
            Ok(())
        }
        Commands::Samples => cmd_samples(&mut stdout, now),
        Commands::Show { date, format } => {
            let store = FileStore::new(&config.store_dir);
            tracing::debug!(dir = %store.dir().display(), "using file store");
            let source = build_source(&config, &store, now);
            cmd_show(&mut stdout, &source, date.as_deref(), format, today, &Local)
        }
        Commands::Days { month } => {
            let store = FileStore::new(&config.store_dir);
            let source = build_source(&config, &store, now);
            cmd_days(&mut stdout, &source, month.as_deref(), today, &Local)
        }
    }
}
