use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::utils::AppError;

/// Runtime settings, read from the environment (and `.env` via dotenv)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    /// 64 hex characters; without it sessions are not persisted
    pub session_key: Option<String>,
    pub cache_ttl: Duration,
    pub rate_limit_per_sec: usize,
    pub page_size: u32,
    pub chart_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let api_url = env::var("BAZAAR_API_URL").map_err(|_| {
            AppError::Config("BAZAAR_API_URL not set in environment or .env file".to_string())
        })?;

        Ok(Self {
            api_url,
            session_file: PathBuf::from(try_load::<String>(
                "BAZAAR_SESSION_FILE",
                ".bazaar_session",
            )?),
            session_key: env::var("BAZAAR_SESSION_KEY").ok().filter(|k| !k.trim().is_empty()),
            cache_ttl: Duration::from_secs(try_load("BAZAAR_CACHE_TTL_SECS", "60")?),
            rate_limit_per_sec: try_load("BAZAAR_RATE_LIMIT", "20")?,
            page_size: try_load("BAZAAR_PAGE_SIZE", "10")?,
            chart_dir: env::var("BAZAAR_CHART_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        AppError::Config(format!("Invalid {key} value '{raw}': {e}"))
    })
}
