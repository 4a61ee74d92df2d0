use anyhow::Result;
use tracing_subscriber::EnvFilter;

use league_trends::args::{arg_value, cli_args};
use league_trends::cleaning::clean_all;
use league_trends::config::PipelineConfig;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli_args();
    let mut config = PipelineConfig::from_env();
    if let Some(dir) = arg_value(&args, "--data-dir") {
        config.set_data_dir(dir);
    }

    let summary = clean_all(&config)?;

    println!("Cleaning complete");
    println!("Processed dir: {}", summary.processed_dir.display());
    println!("Team season rows: {}", summary.team_season_rows);
    println!("Team match rows: {}", summary.team_match_rows);
    println!("Schedule rows: {}", summary.schedule_rows);
    Ok(())
}
