use std::fs;
use std::path::PathBuf;

use league_trends::fbref::{
    league_by_id, match_log_url, parse_match_log_html, parse_schedule_html,
    parse_season_stats_html, schedule_url, season_code, season_stats_url, squad_match_log_urls,
};
use league_trends::table::Table;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn schedule_table_skips_spacer_and_repeated_header_rows() {
    let table = parse_schedule_html(&read_fixture("fbref_schedule.html")).expect("fixture should parse");
    assert_eq!(table.len(), 2);
    assert_eq!(
        &table.headers()[..5],
        &["week", "day", "date", "time", "home_team"]
    );
    assert_eq!(table.get(0, "score"), Some("0–1"));
    assert_eq!(table.get(0, "home_xg"), Some("0.6"));
    assert_eq!(table.get(0, "attendance"), Some("14,232"));
    assert_eq!(table.get(1, "week"), Some("38"));
    assert_eq!(table.get(1, "score"), Some(""));
}

#[test]
fn season_stats_are_read_from_commented_table_with_squad_urls() {
    let table =
        parse_season_stats_html(&read_fixture("fbref_season_stats.html")).expect("fixture should parse");
    assert_eq!(table.len(), 2);
    assert_eq!(table.headers().first().map(String::as_str), Some("squad"));
    assert_eq!(table.headers().last().map(String::as_str), Some("url"));
    assert_eq!(
        table.column("url").unwrap(),
        vec![
            "/en/squads/922493f3/2023-2024/Atalanta-Stats",
            "/en/squads/dc56fe14/2023-2024/Milan-AC-Stats",
        ]
    );
    assert_eq!(table.get(1, "Poss"), Some("55.7"));
}

#[test]
fn match_log_columns_use_short_names() {
    let table = parse_match_log_html(&read_fixture("fbref_match_log.html")).expect("fixture should parse");
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "date"), Some("2023-08-20"));
    assert_eq!(table.get(0, "round"), Some("Matchweek 1"));
    assert_eq!(table.get(0, "result"), Some("W"));
    assert_eq!(table.get(0, "GF"), Some("2"));
    assert_eq!(table.get(1, "xG"), Some("2.3"));
    assert_eq!(table.get(1, "xGA"), Some("0.4"));
    assert!(table.column_index("url").is_none());
}

#[test]
fn squad_links_map_to_match_log_pages_in_table_order() {
    let serie_a = league_by_id("ITA-Serie A").expect("known league");
    let table =
        parse_season_stats_html(&read_fixture("fbref_season_stats.html")).expect("fixture should parse");
    let squads = squad_match_log_urls(&serie_a, &table).expect("links should map");
    assert_eq!(squads.len(), 2);
    assert_eq!(squads[0].0, "/en/squads/922493f3/2023-2024/Atalanta-Stats");
    assert!(squads[1].1.ends_with("/matchlogs/c11/schedule/Milan-AC-Scores-and-Fixtures-Serie-A"));
}

#[test]
fn unmappable_squad_link_fails_instead_of_skipping() {
    let serie_a = league_by_id("ITA-Serie A").expect("known league");
    let headers = vec!["squad".to_string(), "url".to_string()];
    let table = Table::from_rows(
        headers,
        vec![
            vec!["Atalanta".into(), "/en/squads/922493f3/2023-2024/Atalanta-Stats".into()],
            vec!["Milan".into(), "/en/squads/dc56fe14/2023-2024/Milan".into()],
            vec!["".into(), "".into()],
        ],
    );
    let err = squad_match_log_urls(&serie_a, &table).unwrap_err();
    assert!(format!("{err:#}").contains("Milan"));

    let linked_only = Table::from_rows(
        vec!["squad".to_string(), "url".to_string()],
        vec![
            vec!["Atalanta".into(), "/en/squads/922493f3/2023-2024/Atalanta-Stats".into()],
            vec!["League Average".into(), "".into()],
        ],
    );
    assert_eq!(squad_match_log_urls(&serie_a, &linked_only).expect("map").len(), 1);
}

#[test]
fn missing_table_is_an_error() {
    assert!(parse_match_log_html("<html><body><p>rate limited</p></body></html>").is_err());
}

#[test]
fn season_identifiers_normalize() {
    assert_eq!(season_code("2023-24").unwrap(), "2023-2024");
    assert_eq!(season_code("2324").unwrap(), "2023-2024");
    assert_eq!(season_code("2023-2024").unwrap(), "2023-2024");
    assert_eq!(season_code("2023").unwrap(), "2023-2024");
    assert_eq!(season_code("9900").unwrap(), "1999-2000");
    assert_eq!(season_code("1999-00").unwrap(), "1999-2000");
    // Year-like pairs read as two-digit seasons.
    assert_eq!(season_code("2021").unwrap(), "2020-2021");
    assert_eq!(season_code("1920").unwrap(), "2019-2020");
    assert!(season_code("2023-25").is_err());
    assert!(season_code("next").is_err());
    assert!(season_code("").is_err());
}

#[test]
fn league_lookup_and_urls() {
    let serie_a = league_by_id("ITA-Serie A").expect("known league");
    assert_eq!(serie_a.comp_id, 11);
    assert!(league_by_id("NED-Eredivisie").is_err());

    assert_eq!(
        schedule_url(&serie_a, "2023-2024"),
        "https://fbref.com/en/comps/11/2023-2024/schedule/2023-2024-Serie-A-Scores-and-Fixtures"
    );
    assert_eq!(
        season_stats_url(&serie_a, "2023-2024"),
        "https://fbref.com/en/comps/11/2023-2024/stats/2023-2024-Serie-A-Stats"
    );
    assert_eq!(
        match_log_url(&serie_a, "/en/squads/922493f3/2023-2024/Atalanta-Stats").as_deref(),
        Some(
            "https://fbref.com/en/squads/922493f3/2023-2024/matchlogs/c11/schedule/Atalanta-Scores-and-Fixtures-Serie-A"
        )
    );
    assert_eq!(match_log_url(&serie_a, "/en/comps/11/Serie-A"), None);
}
