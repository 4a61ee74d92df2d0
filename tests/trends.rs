use league_trends::trends::{
    PointsSeries, TeamMatchRecord, cumulative_points, goals_for_against, team_list, xg_vs_points,
};

fn record(
    team: &str,
    matchweek: u32,
    points: Option<u32>,
    goals: (f64, f64),
    xg: Option<f64>,
) -> TeamMatchRecord {
    TeamMatchRecord {
        team: team.to_string(),
        matchweek: Some(matchweek),
        points,
        goals_for: Some(goals.0),
        goals_against: Some(goals.1),
        xg,
    }
}

fn season() -> Vec<TeamMatchRecord> {
    // Deliberately out of matchweek order within a team.
    vec![
        record("Milan", 2, Some(1), (1.0, 1.0), Some(1.1)),
        record("Milan", 1, Some(3), (2.0, 0.0), Some(2.0)),
        record("Inter", 1, Some(3), (3.0, 0.0), Some(2.5)),
        record("Inter", 2, Some(3), (2.0, 1.0), Some(1.5)),
        record("Genoa", 1, Some(0), (0.0, 3.0), Some(0.4)),
        record("Genoa", 2, None, (0.0, 0.0), None),
    ]
}

#[test]
fn cumulative_points_run_per_team_in_matchweek_order() {
    let series = cumulative_points(&season(), None);
    assert_eq!(
        series,
        vec![
            PointsSeries {
                team: "Genoa".to_string(),
                points: vec![(1, 0)],
            },
            PointsSeries {
                team: "Inter".to_string(),
                points: vec![(1, 3), (2, 6)],
            },
            PointsSeries {
                team: "Milan".to_string(),
                points: vec![(1, 3), (2, 4)],
            },
        ]
    );
}

#[test]
fn cumulative_points_for_one_team() {
    let series = cumulative_points(&season(), Some("Milan"));
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].points, vec![(1, 3), (2, 4)]);
    assert!(cumulative_points(&season(), Some("Lazio")).is_empty());
}

#[test]
fn rows_without_matchweek_are_not_plotted() {
    let mut rows = season();
    rows[0].matchweek = None;
    let series = cumulative_points(&rows, Some("Milan"));
    assert_eq!(series[0].points, vec![(1, 3)]);
}

#[test]
fn goals_are_sorted_high_to_low() {
    let summary = goals_for_against(&season());
    let scored = summary
        .scored
        .iter()
        .map(|t| (t.team.as_str(), t.value))
        .collect::<Vec<_>>();
    assert_eq!(scored, vec![("Inter", 5.0), ("Milan", 3.0), ("Genoa", 0.0)]);

    let conceded = summary
        .conceded
        .iter()
        .map(|t| (t.team.as_str(), t.value))
        .collect::<Vec<_>>();
    assert_eq!(conceded, vec![("Genoa", 3.0), ("Inter", 1.0), ("Milan", 1.0)]);
}

#[test]
fn xg_and_points_aggregate_per_team() {
    let rows = xg_vs_points(&season());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].team, "Genoa");
    assert!((rows[0].xg - 0.4).abs() < 1e-9);
    assert_eq!(rows[0].points, 0.0);
    assert_eq!(rows[1].team, "Inter");
    assert!((rows[1].xg - 4.0).abs() < 1e-9);
    assert_eq!(rows[1].points, 6.0);
    assert_eq!(rows[2].points, 4.0);
}

#[test]
fn team_list_is_sorted_and_distinct() {
    assert_eq!(team_list(&season()), vec!["Genoa", "Inter", "Milan"]);
}
