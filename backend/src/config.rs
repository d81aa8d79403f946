//! Runtime configuration, read once at startup from the environment.
//!
//! Every knob has a default suitable for a local demo run; values that fail
//! to parse fall back to the default with a warning rather than aborting.

use log::warn;
use std::env;
use std::path::PathBuf;

/// Which labeling strategy the classification engine runs with.
///
/// `Lookup` reproduces the canned reference dataset deterministically;
/// `Random` covers arbitrary inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Random,
    Lookup,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the user directory and the persisted session.
    pub db_path: PathBuf,
    /// Directory uploaded batches are spooled under, one subdir per batch.
    pub spool_dir: PathBuf,
    /// Directory of static artifacts (heatmap images), served at /assets.
    pub assets_dir: PathBuf,
    pub strategy: StrategyKind,
    /// Delay before the workflow advances from batch-selected to classifying.
    pub stage_delay_ms: u64,
    /// Delay before classification actually runs and buckets appear.
    pub classify_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            host: env_or("NEUROTRIAGE_HOST", "127.0.0.1"),
            port: env_parsed("NEUROTRIAGE_PORT", 8080),
            db_path: PathBuf::from(env_or("NEUROTRIAGE_DB", "neurotriage.sqlite")),
            spool_dir: PathBuf::from(env_or("NEUROTRIAGE_SPOOL_DIR", "./uploads")),
            assets_dir: PathBuf::from(env_or("NEUROTRIAGE_ASSETS_DIR", "./assets")),
            strategy: match env_or("NEUROTRIAGE_STRATEGY", "lookup").as_str() {
                "random" => StrategyKind::Random,
                "lookup" => StrategyKind::Lookup,
                other => {
                    warn!("unknown strategy '{}', defaulting to lookup", other);
                    StrategyKind::Lookup
                }
            },
            stage_delay_ms: env_parsed("NEUROTRIAGE_STAGE_DELAY_MS", 1000),
            classify_delay_ms: env_parsed("NEUROTRIAGE_CLASSIFY_DELAY_MS", 2000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("could not parse {}='{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
