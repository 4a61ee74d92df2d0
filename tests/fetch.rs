use anyhow::{Result, anyhow};

use league_trends::cleaning::clean_all;
use league_trends::config::{
    PipelineConfig, SCHEDULE_RAW, TEAM_MATCH_CLEAN, TEAM_MATCH_RAW, TEAM_SEASON_RAW,
};
use league_trends::fetch::{StatsProvider, fetch_season};
use league_trends::table::Table;
use league_trends::trends::load_team_matches;

fn csv_table(raw: &str) -> Table {
    Table::from_reader(raw.as_bytes()).expect("inline csv should parse")
}

struct StubProvider;

impl StatsProvider for StubProvider {
    fn read_schedule(&self) -> Result<Table> {
        Ok(csv_table(
            "week,date,home_team,home_xg,score,away_xg,away_team\n\
             1,2023-08-19,A,1.2,2–1,0.8,B\n",
        ))
    }

    fn read_team_season_stats(&self) -> Result<Table> {
        Ok(csv_table(
            "squad,games,url\n\
             A,1,/en/squads/aaaa/2023-2024/A-Stats\n\
             B,1,/en/squads/bbbb/2023-2024/B-Stats\n",
        ))
    }

    fn read_team_match_stats(&self) -> Result<Table> {
        Ok(csv_table(
            "date,round,result,GF,GA,xG\n\
             2023-08-19,Matchweek 1,W,2,1,1.2\n\
             2023-08-19,Matchweek 1,L,1,2,0.8\n",
        ))
    }
}

struct FailingProvider;

impl StatsProvider for FailingProvider {
    fn read_schedule(&self) -> Result<Table> {
        Err(anyhow!("http 429 for schedule"))
    }

    fn read_team_season_stats(&self) -> Result<Table> {
        unreachable!("schedule fails first")
    }

    fn read_team_match_stats(&self) -> Result<Table> {
        unreachable!("schedule fails first")
    }
}

#[test]
fn fetch_writes_raw_files_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::with_data_dir(dir.path());

    let summary = fetch_season(&StubProvider, &config).expect("fetch");
    assert_eq!(summary.schedule_rows, 1);
    assert_eq!(summary.team_season_rows, 2);
    assert_eq!(summary.team_match_rows, 2);

    let schedule = Table::read_csv(&config.raw_path(SCHEDULE_RAW)).expect("schedule raw");
    assert_eq!(schedule, StubProvider.read_schedule().unwrap());
    assert!(config.raw_path(TEAM_SEASON_RAW).exists());
    assert!(config.raw_path(TEAM_MATCH_RAW).exists());
}

#[test]
fn provider_errors_are_fatal_and_write_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::with_data_dir(dir.path());
    let err = fetch_season(&FailingProvider, &config).unwrap_err();
    assert!(format!("{err:#}").contains("429"));
    assert!(!config.raw_dir().exists());
}

#[test]
fn fetched_tables_flow_through_cleaning_to_chart_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::with_data_dir(dir.path());
    fetch_season(&StubProvider, &config).expect("fetch");
    clean_all(&config).expect("clean");

    let records = load_team_matches(&config.processed_path(TEAM_MATCH_CLEAN)).expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].team, "A");
    assert_eq!(records[0].points, Some(3));
    assert_eq!(records[1].team, "B");
    assert_eq!(records[1].matchweek, Some(1));
    assert_eq!(records[1].xg, Some(0.8));
}
