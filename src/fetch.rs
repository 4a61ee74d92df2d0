use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{PipelineConfig, SCHEDULE_RAW, TEAM_MATCH_RAW, TEAM_SEASON_RAW};
use crate::table::Table;

/// A source of the three raw season tables.
pub trait StatsProvider {
    fn read_schedule(&self) -> Result<Table>;
    fn read_team_season_stats(&self) -> Result<Table>;
    fn read_team_match_stats(&self) -> Result<Table>;
}

#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub raw_dir: PathBuf,
    pub schedule_rows: usize,
    pub team_season_rows: usize,
    pub team_match_rows: usize,
}

/// Pulls all three tables and writes them untouched to the raw directory.
/// The first provider error aborts the run.
pub fn fetch_season<P: StatsProvider + ?Sized>(
    provider: &P,
    config: &PipelineConfig,
) -> Result<FetchSummary> {
    let schedule = provider.read_schedule().context("read schedule")?;
    let team_season = provider
        .read_team_season_stats()
        .context("read team season stats")?;
    let team_match = provider
        .read_team_match_stats()
        .context("read team match stats")?;

    let raw_dir = config.raw_dir();
    fs::create_dir_all(&raw_dir).with_context(|| format!("create {}", raw_dir.display()))?;

    schedule.write_csv(&config.raw_path(SCHEDULE_RAW))?;
    team_season.write_csv(&config.raw_path(TEAM_SEASON_RAW))?;
    team_match.write_csv(&config.raw_path(TEAM_MATCH_RAW))?;
    info!("saved FBref raw data to {}", raw_dir.display());

    Ok(FetchSummary {
        raw_dir,
        schedule_rows: schedule.len(),
        team_season_rows: team_season.len(),
        team_match_rows: team_match.len(),
    })
}
