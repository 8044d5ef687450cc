use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

/// What to do when the persisted ledger exists but fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionPolicy {
    /// Log and start from an empty ledger (original behavior, silent data loss).
    Reset,
    /// Move the corrupt file aside before starting empty.
    Backup,
    /// Refuse the operation with a storage error.
    Fail,
}

impl FromStr for CorruptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset" => Ok(Self::Reset),
            "backup" => Ok(Self::Backup),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown corruption policy: {other}")),
        }
    }
}

pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub max_pending_tickets: usize,
    pub max_pending_per_user: usize,
    pub admin_domain: String,
    pub corruption_policy: CorruptionPolicy,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "1111"),
            data_dir: PathBuf::from(try_load::<String>("LOTTO_DATA_DIR", "data")),
            max_pending_tickets: try_load("LOTTO_MAX_PENDING", "100"),
            max_pending_per_user: try_load("LOTTO_MAX_PENDING_PER_USER", "5"),
            admin_domain: try_load("LOTTO_ADMIN_DOMAIN", "@admin.lotto"),
            corruption_policy: try_load("LOTTO_CORRUPTION_POLICY", "reset"),
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("lottery.json")
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
