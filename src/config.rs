use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::location::MapCursor;

pub const APP_DIR: &str = "casafinder";
pub const LOG_FILE: &str = "casafinder.log";

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_dir: PathBuf,
    pub output: Option<PathBuf>,
    pub image: Option<PathBuf>,
    pub description: Option<String>,
    pub map: MapCursor,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
        fs::create_dir_all(&log_dir)
            .with_context(|| format!("creating log directory {}", log_dir.display()))?;

        Ok(Self {
            log_dir,
            output: cli.output,
            image: cli.image,
            description: cli.description,
            map: MapCursor::new(cli.center, cli.zoom),
        })
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| {
            let home = env::var("HOME").unwrap_or_else(|_| "~".to_string());
            PathBuf::from(format!("{}/.local/share/{}", home, APP_DIR))
        })
}
