use crate::errors::ConfigError;
use chrono::{Days, NaiveDate};
use std::{env, path::PathBuf, time::Duration};

pub const STORAGE_NAME: &str = "tracker42";
pub const DEFAULT_TOTAL_DAYS: usize = 42;
pub const DEFAULT_PORT: u16 = 8080;
/// Longest window the tracker accepts, roughly ten years.
pub const MAX_TOTAL_DAYS: usize = 3660;

/// Shape of the body sent with a one-day write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteSchema {
    /// `{day, tasks, note}`
    #[default]
    Canonical,
    /// `{day, tasks}`; notes stay local.
    Legacy,
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub start_date: NaiveDate,
    pub total_days: usize,
    pub cache_path: PathBuf,
    pub remote_url: Option<String>,
    pub remote_schema: RemoteSchema,
    pub remote_timeout: Duration,
    pub shutdown_drain: Duration,
    pub port: u16,
}

impl TrackerConfig {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            start_date: default_start_date(),
            total_days: DEFAULT_TOTAL_DAYS,
            cache_path: cache_path.into(),
            remote_url: None,
            remote_schema: RemoteSchema::Canonical,
            remote_timeout: Duration::from_secs(15),
            shutdown_drain: Duration::from_millis(3000),
            port: DEFAULT_PORT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(resolve_data_path());

        if let Ok(value) = env::var("TRACKER_START_DATE") {
            config.start_date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::InvalidDate {
                    name: "TRACKER_START_DATE",
                    value,
                }
            })?;
        }
        if let Some(days) = env_positive("TRACKER_TOTAL_DAYS")? {
            config.total_days = days as usize;
        }
        config.remote_url = env::var("TRACKER_REMOTE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Ok(value) = env::var("TRACKER_REMOTE_SCHEMA") {
            let schema = match value.trim() {
                "canonical" => Some(RemoteSchema::Canonical),
                "legacy" => Some(RemoteSchema::Legacy),
                _ => None,
            };
            config.remote_schema = schema.ok_or(ConfigError::InvalidSchema {
                name: "TRACKER_REMOTE_SCHEMA",
                value,
            })?;
        }
        if let Some(secs) = env_positive("TRACKER_REMOTE_TIMEOUT_SECS")? {
            config.remote_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_positive("TRACKER_SHUTDOWN_DRAIN_MS")? {
            config.shutdown_drain = Duration::from_millis(ms);
        }
        config.port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        config.check_window()?;
        Ok(config)
    }

    /// Rejects windows that are too long or whose last day has no calendar date.
    pub fn check_window(&self) -> Result<(), ConfigError> {
        let last_day = self
            .total_days
            .checked_sub(1)
            .and_then(|offset| self.start_date.checked_add_days(Days::new(offset as u64)));
        match last_day {
            Some(_) if self.total_days <= MAX_TOTAL_DAYS => Ok(()),
            _ => Err(ConfigError::WindowOutOfRange {
                start: self.start_date,
                total_days: self.total_days,
                max: MAX_TOTAL_DAYS,
            }),
        }
    }

    /// Calendar date of a zero-based day index. Saturates at the last representable date.
    pub fn date_of(&self, index: usize) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(index as u64))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains_day(&self, index: usize) -> bool {
        index < self.total_days
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(format!("data/{STORAGE_NAME}.json"))
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 18).unwrap_or_default()
}

fn env_positive(name: &'static str) -> Result<Option<u64>, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(number) if number > 0 => Ok(Some(number)),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
