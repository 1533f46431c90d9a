//! Runtime configuration resolved from CLI flags and the environment.

use std::path::PathBuf;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::store::sanitize_key;

pub const DEFAULT_KEY: &str = "todos";
pub const DEFAULT_DIR_NAME: &str = ".todo-history";

/// Where tasks are read from and which providers take part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_dir: PathBuf,
    pub key: String,
    pub include_samples: bool,
}

impl Config {
    /// Resolve against `home`; `--store-dir` wins over `<home>/.todo-history`.
    /// A key with no usable file name characters falls back to `todos`.
    pub fn resolve(cli: &Cli, home: Option<PathBuf>) -> Self {
        let store_dir = cli.store_dir.clone().unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DIR_NAME)
        });
        let key = if sanitize_key(&cli.key).is_empty() {
            warn!(key = %cli.key, "store key has no usable characters, using '{DEFAULT_KEY}'");
            DEFAULT_KEY.to_string()
        } else {
            cli.key.clone()
        };
        Config {
            store_dir,
            key,
            include_samples: !cli.no_samples,
        }
    }

    pub fn from_env(cli: &Cli) -> Self {
        Self::resolve(cli, std::env::var_os("HOME").map(PathBuf::from))
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
