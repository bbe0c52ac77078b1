use std::env;
use std::path::PathBuf;

use once_cell::sync::OnceCell;

const CACHE_DIR: &str = "wc_predictor";
const DEFAULT_USER_ID: u32 = 1;
const DEFAULT_LOG: &str = "info";

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `WC_DB_PATH`. `None` means no usable cache dir; callers fall back to memory.
    pub db_path: Option<PathBuf>,
    /// `WC_MATCHES_FILE`, imported at startup when set.
    pub matches_file: Option<PathBuf>,
    /// `WC_USER_ID`
    pub user_id: u32,
    /// `WC_LOG`, used when `RUST_LOG` is unset.
    pub log: String,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = opt_path_env("WC_DB_PATH")
            .or_else(|| app_cache_dir().map(|dir| dir.join("predictions.sqlite")));
        let user_id = env::var("WC_USER_ID")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_USER_ID);
        let log = env::var("WC_LOG")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG.to_string());
        Self {
            db_path,
            matches_file: opt_path_env("WC_MATCHES_FILE"),
            user_id,
            log,
        }
    }
}

/// Loads `.env.local` then `.env` (first value wins) and freezes the result.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Config::from_env()
    })
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn opt_path_env(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
