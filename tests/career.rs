use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use mma_terminal::career::{
    build_career_records, landed_per_minute, totals_by_opponent, CareerRecord,
};
use mma_terminal::dataset::{CareerBaseRow, Dataset, FightRow, SourceConfig};
use mma_terminal::weight_class::resolve_current_classes;

fn fixture_path(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn fixture_dataset() -> Dataset {
    let config = SourceConfig {
        fighters: fixture_path("fighters.csv"),
        career: fixture_path("fighter_career_stats.csv"),
        fights: fixture_path("fight_data.csv"),
        external_ids: fixture_path("external_ids.csv"),
    };
    Dataset::load(&config).expect("fixtures should load")
}

fn record<'a>(records: &'a [CareerRecord], id: &str) -> &'a CareerRecord {
    records
        .iter()
        .find(|r| r.ufcstats_id == id)
        .unwrap_or_else(|| panic!("career record for {id} should exist"))
}

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-9)
}

fn fight(
    id: &str,
    opp: &str,
    event: &str,
    date: &str,
    class: &str,
    winner: bool,
    seconds: f64,
    landed: u32,
    attempted: u32,
    control: f64,
    score: Option<f64>,
) -> FightRow {
    FightRow {
        ufcstats_id: id.to_string(),
        opp_ufcstats_id: opp.to_string(),
        event_name: event.to_string(),
        event_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date"),
        weight_class: class.to_string(),
        opp_name: String::new(),
        fighter_odds: None,
        fighter_winner: winner,
        round: None,
        time: None,
        fight_time_seconds: seconds,
        method: None,
        fighter_new_dk_score: score,
        fighter_old_dk_score: None,
        fighter_total_knockdowns: 0,
        fighter_total_sig_strikes_landed: 0,
        fighter_total_strikes_landed: landed,
        fighter_total_strikes_attempted: attempted,
        fighter_total_takedowns: 0,
        fighter_total_submission_attempts: 0,
        fighter_total_reversals: 0,
        fighter_total_control: control,
    }
}

#[test]
fn two_bout_strike_rate_matches_hand_computation() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    let alpha = record(&records, "f-alpha");
    // bouts of 100 s / 50 landed and 200 s / 40 landed
    assert!(approx(alpha.strikes_landed_per_minute, 18.0));
    assert!(approx(alpha.strike_accuracy, 52.94));
    assert!(approx(alpha.control_percentage, 36.67));
    assert_eq!(alpha.fight_seconds_for, 300.0);
}

#[test]
fn absorbed_rates_come_from_the_opponent_pass() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    let alpha = record(&records, "f-alpha");
    assert!(approx(alpha.strikes_absorbed_per_minute, 10.0));
    assert!(approx(alpha.control_against_percentage, 8.33));
}

#[test]
fn opponent_grouping_agrees_with_direct_filter() {
    let dataset = fixture_dataset();
    let against = totals_by_opponent(&dataset.fights);
    let mut direct: HashMap<String, (u64, f64)> = HashMap::new();
    for row in &dataset.fights {
        let entry = direct.entry(row.opp_ufcstats_id.clone()).or_default();
        entry.0 += u64::from(row.fighter_total_strikes_landed);
        entry.1 += row.fight_time_seconds;
    }
    assert_eq!(against.len(), direct.len());
    for (id, (landed, seconds)) in direct {
        let totals = against.get(&id).expect("grouped totals should exist");
        assert_eq!(totals.strikes_landed, landed);
        assert_eq!(totals.fight_seconds, seconds);
    }
}

#[test]
fn thousands_separated_attempts_flow_into_accuracy() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    let bravo = record(&records, "f-bravo");
    // 190 landed over 1384 attempted, 1234 of them from a "1,234" cell
    assert!(approx(bravo.strike_accuracy, 13.73));
    assert!(approx(bravo.strikes_landed_per_minute, 7.6));
}

#[test]
fn fighter_without_fight_rows_keeps_a_record_with_undefined_rates() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    assert_eq!(records.len(), 5);
    let echo = record(&records, "f-echo");
    assert_eq!(echo.strikes_landed_per_minute, None);
    assert_eq!(echo.strikes_absorbed_per_minute, None);
    assert_eq!(echo.strike_accuracy, None);
    assert_eq!(echo.control_percentage, None);
    assert_eq!(echo.control_against_percentage, None);
    assert_eq!(echo.avg_win_score, None);
    assert_eq!(echo.weight_class, None);
    assert_eq!(echo.fight_seconds_for, 0.0);
    // provider columns survive the join untouched
    assert!(approx(echo.sig_strikes_landed_per_minute, 3.6));
}

#[test]
fn winless_fighter_has_undefined_average_winning_score() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    let delta = record(&records, "f-delta");
    assert_eq!(delta.avg_win_score, None);
    // the row itself is present with the rest of its stats defined
    assert!(approx(delta.strikes_landed_per_minute, 10.0));
}

#[test]
fn average_winning_score_means_only_winning_bouts() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    assert!(approx(record(&records, "f-alpha").avg_win_score, 100.0));
    assert!(approx(record(&records, "f-bravo").avg_win_score, 101.5));
    assert!(approx(record(&records, "f-charlie").avg_win_score, 88.0));
}

#[test]
fn zero_fight_time_makes_every_rate_undefined() {
    let base = vec![CareerBaseRow {
        ufcstats_id: "f-x".to_string(),
        date_of_birth: None,
        sig_strikes_landed_per_minute: None,
        sig_strikes_absorbed_per_minute: None,
        sig_strike_accuracy: None,
        sig_strike_defence: None,
        avg_takedowns_per_15_minutes: None,
        takedown_accuracy: None,
        takedown_defence: None,
        avg_submission_attempts_per_15_minutes: None,
    }];
    let fights = vec![
        fight("f-x", "f-y", "No Contest Night", "2021-02-02", "Flyweight", false, 0.0, 25, 40, 10.0, None),
        fight("f-y", "f-x", "No Contest Night", "2021-02-02", "Flyweight", false, 0.0, 15, 30, 5.0, None),
    ];
    assert_eq!(landed_per_minute(25, 0.0), None);

    let records = build_career_records(&base, &fights);
    assert_eq!(records.len(), 1);
    let x = &records[0];
    assert_eq!(x.strikes_landed_per_minute, None);
    assert_eq!(x.strikes_absorbed_per_minute, None);
    assert_eq!(x.control_percentage, None);
    assert_eq!(x.control_against_percentage, None);
    // attempts were recorded, so accuracy alone stays defined
    assert!(approx(x.strike_accuracy, 62.5));

    let classes = resolve_current_classes(&fights);
    assert_eq!(classes.get("f-x").map(String::as_str), Some("Flyweight"));
}

#[test]
fn current_class_is_the_strictly_later_bout() {
    let dataset = fixture_dataset();
    let records = build_career_records(&dataset.career, &dataset.fights);
    let bravo = record(&records, "f-bravo");
    // Welterweight in 2021, Lightweight title bout in 2022
    assert_eq!(bravo.weight_class.as_deref(), Some("UFC Lightweight Title"));
}

#[test]
fn equal_date_class_resolution_is_deterministic() {
    let fights = vec![
        fight("f-x", "f-y", "Banner Event", "2021-06-06", "Lightweight", true, 300.0, 10, 20, 0.0, None),
        fight("f-x", "f-z", "Apex Event", "2021-06-06", "Welterweight", false, 300.0, 12, 22, 0.0, None),
    ];
    let classes = resolve_current_classes(&fights);
    // same date: event name ascending breaks the tie, so "Apex Event" wins
    assert_eq!(classes.get("f-x").map(String::as_str), Some("Welterweight"));
}
