//! FBref scraping: league/season identifiers, page URLs and HTML stats tables.

use anyhow::{Context, Result, anyhow, bail};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::cleaning::extract_team_from_url;
use crate::config::PipelineConfig;
use crate::fetch::StatsProvider;
use crate::http_cache::PageCache;
use crate::http_client::http_client;
use crate::table::Table;

const FBREF_BASE_URL: &str = "https://fbref.com";

const SCHEDULE_TABLE_PREFIX: &str = "sched_";
const SEASON_STATS_TABLE_ID: &str = "stats_squads_standard_for";
const MATCH_LOG_TABLE_ID: &str = "matchlogs_for";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbrefLeague {
    pub id: &'static str,
    pub comp_id: u32,
    pub slug: &'static str,
}

pub const LEAGUES: [FbrefLeague; 5] = [
    FbrefLeague {
        id: "ENG-Premier League",
        comp_id: 9,
        slug: "Premier-League",
    },
    FbrefLeague {
        id: "ESP-La Liga",
        comp_id: 12,
        slug: "La-Liga",
    },
    FbrefLeague {
        id: "ITA-Serie A",
        comp_id: 11,
        slug: "Serie-A",
    },
    FbrefLeague {
        id: "GER-Bundesliga",
        comp_id: 20,
        slug: "Bundesliga",
    },
    FbrefLeague {
        id: "FRA-Ligue 1",
        comp_id: 13,
        slug: "Ligue-1",
    },
];

pub fn league_by_id(id: &str) -> Result<FbrefLeague> {
    LEAGUES
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(id.trim()))
        .copied()
        .ok_or_else(|| {
            let known = LEAGUES.iter().map(|l| l.id).collect::<Vec<_>>().join(", ");
            anyhow!("unknown league {id:?} (known: {known})")
        })
}

/// Normalizes `2023-24`, `2324`, `2023-2024` or `2023` to FBref's `2023-2024`.
pub fn season_code(raw: &str) -> Result<String> {
    let s = raw.trim();
    let bad = || anyhow!("unrecognized season {raw:?}");
    let all_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());

    let start: u32 = if let Some((first, second)) = s.split_once('-') {
        if !all_digits(first) || !all_digits(second) || first.len() != 4 {
            return Err(bad());
        }
        let start = first.parse::<u32>().map_err(|_| bad())?;
        let end = second.parse::<u32>().map_err(|_| bad())?;
        let matches = match second.len() {
            2 => end == (start + 1) % 100,
            4 => end == start + 1,
            _ => false,
        };
        if !matches {
            return Err(bad());
        }
        start
    } else if s.len() == 4 && all_digits(s) {
        let head = s[..2].parse::<u32>().map_err(|_| bad())?;
        let tail = s[2..].parse::<u32>().map_err(|_| bad())?;
        if tail == (head + 1) % 100 {
            // Two-digit pair like 2324 or 9900.
            let start = if head >= 50 { 1900 + head } else { 2000 + head };
            if head == 19 || head == 20 {
                warn!("season {s:?} is ambiguous, reading it as {}-{}", start, start + 1);
            }
            start
        } else {
            s.parse::<u32>().map_err(|_| bad())?
        }
    } else {
        return Err(bad());
    };
    Ok(format!("{}-{}", start, start + 1))
}

pub fn schedule_url(league: &FbrefLeague, season: &str) -> String {
    format!(
        "{FBREF_BASE_URL}/en/comps/{comp}/{season}/schedule/{season}-{slug}-Scores-and-Fixtures",
        comp = league.comp_id,
        slug = league.slug
    )
}

pub fn season_stats_url(league: &FbrefLeague, season: &str) -> String {
    format!(
        "{FBREF_BASE_URL}/en/comps/{comp}/{season}/stats/{season}-{slug}-Stats",
        comp = league.comp_id,
        slug = league.slug
    )
}

/// `/en/squads/922493f3/2023-2024/Atalanta-Stats` -> the squad's league match log page.
pub fn match_log_url(league: &FbrefLeague, squad_url: &str) -> Option<String> {
    let path = squad_url
        .trim()
        .strip_prefix(FBREF_BASE_URL)
        .unwrap_or(squad_url.trim());
    let (prefix, last) = path.rsplit_once('/')?;
    let team_slug = last.strip_suffix("-Stats")?;
    if prefix.is_empty() || team_slug.is_empty() {
        return None;
    }
    Some(format!(
        "{FBREF_BASE_URL}{prefix}/matchlogs/c{comp}/schedule/{team_slug}-Scores-and-Fixtures-{slug}",
        comp = league.comp_id,
        slug = league.slug
    ))
}

/// Stable column names for FBref `data-stat` keys.
pub fn column_name(stat: &str) -> &str {
    match stat {
        "gameweek" => "week",
        "dayofweek" => "day",
        "start_time" => "time",
        "team" => "squad",
        "goals_for" => "GF",
        "goals_against" => "GA",
        "xg_for" => "xG",
        "xg_against" => "xGA",
        "possession" => "Poss",
        other => other,
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flattens the first `<table>` whose id starts with `table_id` into a [`Table`].
///
/// Columns follow the last header row's `data-stat` keys (renamed through
/// [`column_name`]). When `link_stat` is given, the `href` of that cell's link
/// is added as a trailing `url` column.
pub fn parse_stats_table(html: &str, table_id: &str, link_stat: Option<&str>) -> Result<Table> {
    // Some tables are only shipped inside HTML comments.
    let uncommented = html.replace("<!--", "").replace("-->", "");
    let doc = Html::parse_document(&uncommented);

    let table_sel = selector(&format!("table[id^=\"{table_id}\"]"))?;
    let header_row_sel = selector("thead tr")?;
    let header_cell_sel = selector("th")?;
    let row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;
    let link_sel = selector("a[href]")?;

    let table = doc
        .select(&table_sel)
        .next()
        .with_context(|| format!("no table with id {table_id:?}"))?;

    let header_row = table
        .select(&header_row_sel)
        .last()
        .with_context(|| format!("table {table_id:?} has no header"))?;
    let stats = header_row
        .select(&header_cell_sel)
        .filter_map(|th| th.value().attr("data-stat"))
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    if stats.is_empty() {
        return Err(anyhow!("table {table_id:?} has no data-stat columns"));
    }

    let mut headers = stats
        .iter()
        .map(|s| column_name(s).to_string())
        .collect::<Vec<_>>();
    if link_stat.is_some() {
        headers.push("url".to_string());
    }
    let mut out = Table::new(headers);

    for row in table.select(&row_sel) {
        let class = row.value().attr("class").unwrap_or_default();
        if class.split_whitespace().any(|c| c == "thead" || c == "spacer" || c == "over_header") {
            continue;
        }

        let mut cells = vec![String::new(); stats.len()];
        let mut url = String::new();
        for cell in row.select(&cell_sel) {
            let Some(stat) = cell.value().attr("data-stat") else {
                continue;
            };
            if link_stat == Some(stat)
                && let Some(href) = cell.select(&link_sel).next().and_then(|a| a.value().attr("href"))
            {
                url = href.to_string();
            }
            if let Some(idx) = stats.iter().position(|s| s == stat) {
                cells[idx] = cell_text(&cell);
            }
        }

        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if link_stat.is_some() {
            cells.push(url);
        }
        out.push_row(cells);
    }

    debug!("parsed {} rows from table {table_id}", out.len());
    Ok(out)
}

pub fn parse_schedule_html(html: &str) -> Result<Table> {
    parse_stats_table(html, SCHEDULE_TABLE_PREFIX, None)
}

pub fn parse_season_stats_html(html: &str) -> Result<Table> {
    parse_stats_table(html, SEASON_STATS_TABLE_ID, Some("team"))
}

pub fn parse_match_log_html(html: &str) -> Result<Table> {
    parse_stats_table(html, MATCH_LOG_TABLE_ID, None)
}

/// FBref-backed [`StatsProvider`] for one league season.
pub struct FbrefClient {
    league: FbrefLeague,
    season: String,
    pages: PageCache,
}

impl FbrefClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let league = league_by_id(&config.league)?;
        let season = season_code(&config.season)?;
        let client = http_client(config.request_timeout)?;
        let pages = PageCache::new(
            client,
            config.cache_dir.clone(),
            config.cache_max_age,
            config.request_delay,
        );
        Ok(Self {
            league,
            season,
            pages,
        })
    }

    pub fn league(&self) -> &FbrefLeague {
        &self.league
    }

    pub fn season(&self) -> &str {
        &self.season
    }
}

impl StatsProvider for FbrefClient {
    fn read_schedule(&self) -> Result<Table> {
        let url = schedule_url(&self.league, &self.season);
        let html = self.pages.fetch_text(&url).context("schedule request failed")?;
        parse_schedule_html(&html).context("invalid schedule page")
    }

    fn read_team_season_stats(&self) -> Result<Table> {
        let url = season_stats_url(&self.league, &self.season);
        let html = self
            .pages
            .fetch_text(&url)
            .context("season stats request failed")?;
        parse_season_stats_html(&html).context("invalid season stats page")
    }

    /// Match logs for every squad, concatenated in season-stats order.
    fn read_team_match_stats(&self) -> Result<Table> {
        let season_stats = self.read_team_season_stats()?;
        let squads = squad_match_log_urls(&self.league, &season_stats)?;

        let mut out = Table::default();
        for (idx, (squad_url, url)) in squads.iter().enumerate() {
            info!("match logs {}/{}: {squad_url}", idx + 1, squads.len());
            let html = self
                .pages
                .fetch_text(url)
                .with_context(|| format!("match log request failed for {squad_url}"))?;
            let logs = parse_match_log_html(&html)
                .with_context(|| format!("invalid match log page for {squad_url}"))?;
            out.append(&logs);
        }
        Ok(out)
    }
}

/// `(squad url, match log url)` for each squad row of a season stats table.
///
/// Rows without a link are skipped; the cleaner drops them from the team list
/// too. A link that doesn't name a squad is an error, since the match rows are
/// later labelled by position.
pub fn squad_match_log_urls(league: &FbrefLeague, season_stats: &Table) -> Result<Vec<(String, String)>> {
    let urls = season_stats
        .column("url")
        .context("season stats lack squad urls")?;
    let mut out = Vec::with_capacity(urls.len());
    for (row, squad_url) in urls.into_iter().enumerate() {
        if squad_url.trim().is_empty() {
            debug!("season stats row {row} has no squad link");
            continue;
        }
        let squad = season_stats.get(row, "squad").unwrap_or(squad_url);
        if extract_team_from_url(squad_url).is_none() {
            bail!("squad {squad:?} has an unrecognized link {squad_url:?}");
        }
        let url = match_log_url(league, squad_url)
            .with_context(|| format!("no match log page for squad {squad:?} ({squad_url})"))?;
        out.push((squad_url.to_string(), url));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{column_name, selector};

    #[test]
    fn unknown_stats_keep_their_key() {
        assert_eq!(column_name("goals_for"), "GF");
        assert_eq!(column_name("referee"), "referee");
    }

    #[test]
    fn selectors_report_bad_css() {
        assert!(selector("table[id^=").is_err());
    }
}
