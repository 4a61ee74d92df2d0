//! Per-team aggregates behind the trend charts.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of the processed team match table, reduced to what the charts use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamMatchRecord {
    pub team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub matchweek: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub points: Option<u32>,
    #[serde(rename = "GF", default, deserialize_with = "csv::invalid_option")]
    pub goals_for: Option<f64>,
    #[serde(rename = "GA", default, deserialize_with = "csv::invalid_option")]
    pub goals_against: Option<f64>,
    #[serde(rename = "xG", default, deserialize_with = "csv::invalid_option")]
    pub xg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsSeries {
    pub team: String,
    /// `(matchweek, cumulative points)` in matchweek order.
    pub points: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamTotal {
    pub team: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalsSummary {
    pub scored: Vec<TeamTotal>,
    pub conceded: Vec<TeamTotal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XgPoints {
    pub team: String,
    pub xg: f64,
    pub points: f64,
}

pub fn load_team_matches(path: &Path) -> Result<Vec<TeamMatchRecord>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    reader
        .deserialize::<TeamMatchRecord>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("read team matches from {}", path.display()))
}

/// Distinct team names, alphabetical.
pub fn team_list(records: &[TeamMatchRecord]) -> Vec<String> {
    let mut teams = records.iter().map(|r| r.team.clone()).collect::<Vec<_>>();
    teams.sort();
    teams.dedup();
    teams
}

/// Running points total per team over matchweeks, for `team` only when given.
///
/// Rows are stable-sorted by team then matchweek. A match without points adds
/// nothing and gets no plotted point; rows without a matchweek are ignored.
pub fn cumulative_points(records: &[TeamMatchRecord], team: Option<&str>) -> Vec<PointsSeries> {
    let mut rows = records
        .iter()
        .filter(|r| team.is_none_or(|t| r.team == t))
        .filter_map(|r| r.matchweek.map(|week| (r.team.as_str(), week, r.points)))
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

    let mut out: Vec<PointsSeries> = Vec::new();
    let mut running = 0u32;
    for (name, week, points) in rows {
        if out.last().is_none_or(|s| s.team != name) {
            out.push(PointsSeries {
                team: name.to_string(),
                points: Vec::new(),
            });
            running = 0;
        }
        let Some(points) = points else {
            continue;
        };
        running += points;
        if let Some(series) = out.last_mut() {
            series.points.push((week, running));
        }
    }
    out
}

fn sum_by_team<F>(records: &[TeamMatchRecord], value: F) -> BTreeMap<&str, f64>
where
    F: Fn(&TeamMatchRecord) -> Option<f64>,
{
    let mut totals = BTreeMap::new();
    for r in records {
        let entry = totals.entry(r.team.as_str()).or_insert(0.0);
        if let Some(v) = value(r) {
            *entry += v;
        }
    }
    totals
}

fn sorted_desc(totals: &BTreeMap<&str, f64>) -> Vec<TeamTotal> {
    let mut out = totals
        .iter()
        .map(|(team, value)| TeamTotal {
            team: team.to_string(),
            value: *value,
        })
        .collect::<Vec<_>>();
    // Stable: ties stay alphabetical.
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    out
}

/// Season goals scored and conceded per team, each sorted high to low.
pub fn goals_for_against(records: &[TeamMatchRecord]) -> GoalsSummary {
    GoalsSummary {
        scored: sorted_desc(&sum_by_team(records, |r| r.goals_for)),
        conceded: sorted_desc(&sum_by_team(records, |r| r.goals_against)),
    }
}

/// Season xG against season points, one entry per team in name order.
pub fn xg_vs_points(records: &[TeamMatchRecord]) -> Vec<XgPoints> {
    let xg = sum_by_team(records, |r| r.xg);
    let points = sum_by_team(records, |r| r.points.map(f64::from));
    xg.into_iter()
        .map(|(team, xg)| XgPoints {
            team: team.to_string(),
            xg,
            points: points.get(team).copied().unwrap_or_default(),
        })
        .collect()
}
