//! Configuration types and constants for the pitchdesk server.

use std::path::PathBuf;

use clap::Parser;

/// Lifetime of an issued session token (24 hours).
pub(crate) const SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Raw byte length of a newly issued session token; clients see it
/// hex-encoded.
pub(crate) const TOKEN_BYTES: usize = 32;

/// Web server for pitchdesk, a self-hosted sales proposal manager.
///
/// Provides a REST API for proposals, their line items, and per-user
/// dashboard statistics, and persists state in SQLite.
///
/// Configuration can be set via CLI arguments or environment variables.
/// CLI arguments take precedence over environment variables.
#[derive(Parser, Debug)]
#[command(name = "pitchdesk", version, about)]
pub struct Cli {
    /// HTTP server bind address [env: PITCHDESK_BIND] [default: 127.0.0.1:3001]
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Data directory for the database [env: PITCHDESK_HOME] [default: ~/.pitchdesk]
    #[arg(long, short = 'd')]
    pub data_dir: Option<PathBuf>,
}

pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_cli_and_env(cli: Cli) -> Self {
        let data_dir = cli
            .data_dir
            .or_else(|| std::env::var("PITCHDESK_HOME").ok().map(PathBuf::from))
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(|h| PathBuf::from(h).join(".pitchdesk"))
                    .unwrap_or_else(|_| PathBuf::from(".pitchdesk"))
            });

        let bind_addr = cli
            .bind
            .or_else(|| std::env::var("PITCHDESK_BIND").ok())
            .unwrap_or_else(|| "127.0.0.1:3001".to_string());

        Self {
            bind_addr,
            data_dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("pitchdesk.db")
    }
}
