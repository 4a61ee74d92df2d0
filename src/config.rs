use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LEAGUE: &str = "ITA-Serie A";
pub const DEFAULT_SEASON: &str = "2023-24";
pub const DEFAULT_DATA_DIR: &str = "data";

const DEFAULT_REQUEST_DELAY_SECS: u64 = 7;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

pub const SCHEDULE_RAW: &str = "schedule.csv";
pub const TEAM_SEASON_RAW: &str = "team_season_stats_standard.csv";
pub const TEAM_MATCH_RAW: &str = "team_match_stats_standard.csv";

pub const TEAM_SEASON_CLEAN: &str = "team_season_clean.csv";
pub const TEAM_MATCH_CLEAN: &str = "team_match_clean.csv";
pub const SCHEDULE_CLEAN: &str = "schedule_clean.csv";

/// Everything one pipeline run needs to know, handed to each stage explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub league: String,
    pub season: String,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub cache_max_age: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

impl PipelineConfig {
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            league: DEFAULT_LEAGUE.to_string(),
            season: DEFAULT_SEASON.to_string(),
            cache_dir: data_dir.join("fbref").join("cache"),
            data_dir,
            request_delay: Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS),
        }
    }

    /// Defaults overridden by `LEAGUE_TRENDS_*` variables. Call `dotenvy` first
    /// if `.env` files should count.
    pub fn from_env() -> Self {
        let data_dir = env_non_empty("LEAGUE_TRENDS_DATA_DIR")
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::with_data_dir(data_dir);
        if let Some(league) = env_non_empty("LEAGUE_TRENDS_LEAGUE") {
            config.league = league;
        }
        if let Some(season) = env_non_empty("LEAGUE_TRENDS_SEASON") {
            config.season = season;
        }
        if let Some(dir) = env_non_empty("LEAGUE_TRENDS_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        config.request_delay = env_secs("LEAGUE_TRENDS_REQUEST_DELAY_SECS", config.request_delay);
        config.request_timeout = env_secs("LEAGUE_TRENDS_REQUEST_TIMEOUT_SECS", config.request_timeout)
            .max(Duration::from_secs(1));
        config.cache_max_age = env_secs("LEAGUE_TRENDS_CACHE_MAX_AGE_SECS", config.cache_max_age);
        config
    }

    /// Moves the data directory; the page cache follows unless it was set elsewhere.
    pub fn set_data_dir(&mut self, data_dir: impl AsRef<Path>) {
        let default_cache = self.data_dir.join("fbref").join("cache");
        self.data_dir = data_dir.as_ref().to_path_buf();
        if self.cache_dir == default_cache {
            self.cache_dir = self.data_dir.join("fbref").join("cache");
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("fbref").join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("fbref").join("processed")
    }

    pub fn raw_path(&self, file: &str) -> PathBuf {
        self.raw_dir().join(file)
    }

    pub fn processed_path(&self, file: &str) -> PathBuf {
        self.processed_dir().join(file)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;
    use std::path::PathBuf;

    #[test]
    fn directories_hang_off_data_dir() {
        let config = PipelineConfig::with_data_dir("/tmp/x");
        assert_eq!(config.raw_dir(), PathBuf::from("/tmp/x/fbref/raw"));
        assert_eq!(
            config.processed_path("schedule_clean.csv"),
            PathBuf::from("/tmp/x/fbref/processed/schedule_clean.csv")
        );
    }

    #[test]
    fn moving_data_dir_moves_default_cache() {
        let mut config = PipelineConfig::default();
        config.set_data_dir("/srv/fb");
        assert_eq!(config.cache_dir, PathBuf::from("/srv/fb/fbref/cache"));

        config.cache_dir = PathBuf::from("/var/cache/fb");
        config.set_data_dir("/srv/other");
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/fb"));
    }
}
