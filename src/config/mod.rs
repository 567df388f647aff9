use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{builder::RangedU64ValueParser, Parser};
use reqwest::Url;

use crate::screens::DEFAULT_EVENTS_CAPACITY;

/// Replays a CSV session script against the Aura API and prints one CSV
/// record per action.
#[derive(Debug, Clone, Parser)]
#[command(name = "aura_client", version)]
pub struct Args {
    /// CSV script with header `action,user,arg,amount`.
    pub script: PathBuf,

    #[arg(long, env = "AURA_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: Url,

    /// Use the in-memory fixture API instead of the network.
    #[arg(long)]
    pub fixture: bool,

    /// Start the fixture API disconnected.
    #[arg(long, requires = "fixture")]
    pub offline: bool,

    /// HTTP request timeout.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Address dialled to decide whether the host is online.
    #[arg(long, default_value = "1.1.1.1:53")]
    pub connectivity_addr: SocketAddr,

    /// Budget for the online check that runs after a transport failure.
    #[arg(long, default_value_t = 500)]
    pub connectivity_timeout_ms: u64,

    #[arg(
        long,
        default_value_t = DEFAULT_EVENTS_CAPACITY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub events_capacity: usize,

    #[arg(long, default_value = "output.log")]
    pub log_file: PathBuf,

    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_millis(self.connectivity_timeout_ms)
    }
}
