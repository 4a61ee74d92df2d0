use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{
    PipelineConfig, SCHEDULE_CLEAN, SCHEDULE_RAW, TEAM_MATCH_CLEAN, TEAM_MATCH_RAW,
    TEAM_SEASON_CLEAN, TEAM_SEASON_RAW,
};
use crate::table::Table;

static TEAM_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d{4}-\d{4}/([^/]+)-Stats").expect("valid squad url pattern"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

/// File-level failures. Any of these stops the run for the file being cleaned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanError {
    #[error("missing column {0:?}")]
    MissingColumn(String),
    #[error("no teams to assign match rows to")]
    NoTeams,
    #[error("{rows} match rows do not split evenly across {teams} teams")]
    UnevenTeamRows { rows: usize, teams: usize },
    #[error("round label {label:?} has no matchweek number")]
    NoMatchweekDigits { label: String },
    #[error("matchweek number in {label:?} is out of range")]
    MatchweekOutOfRange { label: String },
    #[error("unparseable date {value:?}")]
    InvalidDate { value: String },
}

#[derive(Debug, Clone)]
pub struct CleanSummary {
    pub processed_dir: PathBuf,
    pub team_season_rows: usize,
    pub team_match_rows: usize,
    pub schedule_rows: usize,
}

/// `/en/squads/922493f3/2023-2024/Atalanta-Stats` -> `Atalanta`.
pub fn extract_team_from_url(url: &str) -> Option<String> {
    let caps = TEAM_URL_RE.captures(url)?;
    Some(caps.get(1)?.as_str().replace('-', " "))
}

pub fn points_from_result(code: &str) -> Option<u8> {
    match code {
        "W" => Some(3),
        "D" => Some(1),
        "L" => Some(0),
        _ => None,
    }
}

/// Splits `2–1` style scores. Never fails: anything odd gives `(None, None)`.
pub fn parse_score(score: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(score) = score else {
        return (None, None);
    };
    let normalized = score.replace(['\u{2013}', '\u{2014}'], "-");
    let parts = normalized.split('-').collect::<Vec<_>>();
    let [home, away] = parts.as_slice() else {
        return (None, None);
    };
    match (parse_goal_count(home), parse_goal_count(away)) {
        (Some(home), Some(away)) => (Some(home), Some(away)),
        _ => (None, None),
    }
}

fn parse_goal_count(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First run of digits in a round label, e.g. `Matchweek 12` -> 12.
pub fn extract_matchweek(label: &str) -> Result<u32, CleanError> {
    let digits = DIGITS_RE
        .find(label)
        .ok_or_else(|| CleanError::NoMatchweekDigits {
            label: label.to_string(),
        })?;
    digits
        .as_str()
        .parse::<u32>()
        .map_err(|_| CleanError::MatchweekOutOfRange {
            label: label.to_string(),
        })
}

/// Team label for each of `row_count` rows, assuming rows come in equal
/// contiguous blocks per team in `teams` order.
pub fn assign_teams_by_position(row_count: usize, teams: &[String]) -> Result<Vec<String>, CleanError> {
    if teams.is_empty() {
        return Err(CleanError::NoTeams);
    }
    let per_team = row_count / teams.len();
    if per_team == 0 || row_count % teams.len() != 0 {
        return Err(CleanError::UnevenTeamRows {
            rows: row_count,
            teams: teams.len(),
        });
    }
    Ok(teams
        .iter()
        .flat_map(|team| std::iter::repeat_n(team.clone(), per_team))
        .collect())
}

/// Rewrites a provider date as `YYYY-MM-DD` (keeping a time only when it is not midnight).
pub fn normalize_date(raw: &str) -> Result<Option<String>, CleanError> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date.format("%Y-%m-%d").to_string()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            if dt.time() == NaiveTime::MIN {
                return Ok(Some(dt.format("%Y-%m-%d").to_string()));
            }
            return Ok(Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()));
        }
    }
    Err(CleanError::InvalidDate {
        value: trimmed.to_string(),
    })
}

pub fn format_goals(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.1}"),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn format_optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn require_column<'a>(table: &'a Table, name: &str) -> Result<Vec<&'a str>, CleanError> {
    table
        .column(name)
        .ok_or_else(|| CleanError::MissingColumn(name.to_string()))
}

fn normalize_date_column(table: &mut Table) -> Result<()> {
    let normalized = require_column(table, "date")?
        .into_iter()
        .map(|raw| normalize_date(raw).map(Option::unwrap_or_default))
        .collect::<Result<Vec<_>, _>>()?;
    table.set_column("date", normalized)
}

/// Adds `team` from `url` and drops the rows it can't be recovered for.
pub fn clean_team_season(raw: &Table) -> Result<Table> {
    let teams = require_column(raw, "url")?
        .into_iter()
        .map(|url| extract_team_from_url(url).unwrap_or_default())
        .collect::<Vec<_>>();

    let mut table = raw.clone();
    table.set_column("team", teams)?;
    let team_idx = table
        .column_index("team")
        .ok_or_else(|| CleanError::MissingColumn("team".to_string()))?;
    let before = table.len();
    table.retain_rows(|row| !row[team_idx].is_empty());
    debug!("dropped {} team season metadata rows", before - table.len());
    Ok(table)
}

/// Ordered team list of a cleaned team season table.
pub fn team_names(team_season_clean: &Table) -> Result<Vec<String>> {
    Ok(require_column(team_season_clean, "team")?
        .into_iter()
        .map(|s| s.to_string())
        .collect())
}

/// Adds `team`, `matchweek` and `points` to per-team match rows.
///
/// An existing, fully populated `team` column wins; otherwise rows are
/// labelled by position using `teams`.
pub fn clean_team_match(raw: &Table, teams: &[String]) -> Result<Table> {
    let mut table = raw.clone();
    normalize_date_column(&mut table)?;

    let explicit = table
        .column("team")
        .is_some_and(|col| !col.is_empty() && col.iter().all(|t| !t.trim().is_empty()));
    if explicit {
        debug!("team match rows already carry a team column");
    } else {
        let labels = assign_teams_by_position(table.len(), teams)?;
        table.set_column("team", labels)?;
    }

    if let Some(rounds) = table.column("round") {
        let weeks = rounds
            .into_iter()
            .map(|label| extract_matchweek(label).map(|w| w.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        table.set_column("matchweek", weeks)?;
    }

    let points = require_column(&table, "result")?
        .into_iter()
        .map(|code| format_optional(points_from_result(code)))
        .collect::<Vec<_>>();
    table.set_column("points", points)?;
    Ok(table)
}

/// Adds `home_goals`/`away_goals` from `score`.
pub fn clean_schedule(raw: &Table) -> Result<Table> {
    let mut table = raw.clone();
    normalize_date_column(&mut table)?;

    let (home, away): (Vec<_>, Vec<_>) = require_column(&table, "score")?
        .into_iter()
        .map(|score| {
            let (h, a) = parse_score(Some(score));
            (format_goals(h), format_goals(a))
        })
        .unzip();
    table.set_column("home_goals", home)?;
    table.set_column("away_goals", away)?;
    Ok(table)
}

fn save_processed(config: &PipelineConfig, table: &Table, file: &str, label: &str) -> Result<()> {
    let dir = config.processed_dir();
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let out_path = config.processed_path(file);
    table.write_csv(&out_path)?;
    info!("saved cleaned {label} ({} rows) to {}", table.len(), out_path.display());
    Ok(())
}

pub fn clean_team_season_file(config: &PipelineConfig) -> Result<Table> {
    let raw = Table::read_csv(&config.raw_path(TEAM_SEASON_RAW))?;
    let cleaned = clean_team_season(&raw).context("clean team season stats")?;
    save_processed(config, &cleaned, TEAM_SEASON_CLEAN, "team season stats")?;
    Ok(cleaned)
}

pub fn clean_team_match_file(config: &PipelineConfig, team_season_clean: &Table) -> Result<Table> {
    let teams = team_names(team_season_clean)?;
    let raw = Table::read_csv(&config.raw_path(TEAM_MATCH_RAW))?;
    let cleaned = clean_team_match(&raw, &teams).context("clean team match stats")?;
    save_processed(config, &cleaned, TEAM_MATCH_CLEAN, "team match stats")?;
    Ok(cleaned)
}

pub fn clean_schedule_file(config: &PipelineConfig) -> Result<Table> {
    let raw = Table::read_csv(&config.raw_path(SCHEDULE_RAW))?;
    let cleaned = clean_schedule(&raw).context("clean schedule")?;
    save_processed(config, &cleaned, SCHEDULE_CLEAN, "schedule")?;
    Ok(cleaned)
}

/// Season stats go first: match cleaning needs their team order.
pub fn clean_all(config: &PipelineConfig) -> Result<CleanSummary> {
    let team_season = clean_team_season_file(config)?;
    let team_match = clean_team_match_file(config, &team_season)?;
    let schedule = clean_schedule_file(config)?;
    Ok(CleanSummary {
        processed_dir: config.processed_dir(),
        team_season_rows: team_season.len(),
        team_match_rows: team_match.len(),
        schedule_rows: schedule.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::{format_goals, normalize_date, parse_goal_count};

    #[test]
    fn goals_keep_one_decimal() {
        assert_eq!(format_goals(Some(2.0)), "2.0");
        assert_eq!(format_goals(Some(0.5)), "0.5");
        assert_eq!(format_goals(None), "");
    }

    #[test]
    fn goal_counts_reject_non_finite() {
        assert_eq!(parse_goal_count(" 3 "), Some(3.0));
        assert_eq!(parse_goal_count("NaN"), None);
        assert_eq!(parse_goal_count("inf"), None);
    }

    #[test]
    fn dates_drop_midnight_times() {
        assert_eq!(
            normalize_date("2023-08-19").unwrap(),
            Some("2023-08-19".to_string())
        );
        assert_eq!(
            normalize_date("2023-08-19 00:00:00").unwrap(),
            Some("2023-08-19".to_string())
        );
        assert_eq!(
            normalize_date("2023-08-19T18:30").unwrap(),
            Some("2023-08-19 18:30:00".to_string())
        );
        assert_eq!(normalize_date("  ").unwrap(), None);
        assert!(normalize_date("19/08/2023").is_err());
    }
}
