use anyhow::Result;
use tracing_subscriber::EnvFilter;

use league_trends::args::{arg_value, cli_args};
use league_trends::config::PipelineConfig;
use league_trends::fbref::FbrefClient;
use league_trends::fetch::fetch_season;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli_args();
    let mut config = PipelineConfig::from_env();
    if let Some(league) = arg_value(&args, "--league") {
        config.league = league;
    }
    if let Some(season) = arg_value(&args, "--season") {
        config.season = season;
    }
    if let Some(dir) = arg_value(&args, "--data-dir") {
        config.set_data_dir(dir);
    }

    let client = FbrefClient::new(&config)?;
    let summary = fetch_season(&client, &config)?;

    println!("FBref fetch complete");
    println!("League: {} ({})", client.league().id, client.season());
    println!("Raw dir: {}", summary.raw_dir.display());
    println!("Schedule rows: {}", summary.schedule_rows);
    println!("Team season rows: {}", summary.team_season_rows);
    println!("Team match rows: {}", summary.team_match_rows);
    Ok(())
}
