use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 6379;

/// Server settings, read from the command line with environment variable fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// The port to listen on
    #[arg(short, long, env = "KVDIS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The address to bind to
    #[arg(short, long, env = "KVDIS_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Where snapshots are written to and restored from
    #[arg(long, env = "KVDIS_SNAPSHOT_PATH", default_value = "dump.kvdis")]
    pub snapshot_path: PathBuf,

    /// How often the background saver checks for changes, in milliseconds
    #[arg(long, env = "KVDIS_SAVE_INTERVAL_MS", default_value_t = 1000)]
    pub save_interval_ms: u64,
}

impl Config {
    pub fn save_interval(&self) -> Duration {
        Duration::from_millis(self.save_interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            bind: "127.0.0.1".to_string(),
            snapshot_path: PathBuf::from("dump.kvdis"),
            save_interval_ms: 1000,
        }
    }
}
