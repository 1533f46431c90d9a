use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::DEFAULT_KEY;

/// Browse expired to-do tasks by the day they were created.
/// Tasks are read from <store-dir>/<key>.json and merged with built-in samples.
#[derive(Parser)]
#[command(name = "todo-history", version, about = "Expired task history by calendar day")]
pub struct Cli {
    /// Directory holding the task store (default: ~/.todo-history).
    #[arg(long, global = true, env = "TODO_HISTORY_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Store key the task list is saved under.
    #[arg(long, global = true, env = "TODO_HISTORY_KEY", default_value = DEFAULT_KEY)]
    pub key: String,

    /// Leave out the built-in sample tasks.
    #[arg(long, global = true)]
    pub no_samples: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
