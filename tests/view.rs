use std::path::PathBuf;

use mma_terminal::charts::{ChartKind, ScatterData};
use mma_terminal::dataset::{Dataset, SourceConfig};
use mma_terminal::view::{DashboardData, FighterView, NO_FIGHTS_NOTICE};

fn fixture_path(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn dashboard() -> DashboardData {
    let config = SourceConfig {
        fighters: fixture_path("fighters.csv"),
        career: fixture_path("fighter_career_stats.csv"),
        fights: fixture_path("fight_data.csv"),
        external_ids: fixture_path("external_ids.csv"),
    };
    DashboardData::from_dataset(Dataset::load(&config).expect("fixtures should load"))
}

fn view(data: &DashboardData, id: &str) -> FighterView {
    data.view(id)
        .unwrap_or_else(|| panic!("view for {id} should exist"))
}

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-9)
}

fn points_of<'a>(scatter: &'a ScatterData) -> Vec<&'a str> {
    scatter
        .points
        .iter()
        .map(|p| p.ufcstats_id.as_str())
        .collect()
}

#[test]
fn roster_is_sorted_by_name() {
    let data = dashboard();
    let names: Vec<String> = data.roster().iter().map(|e| e.full_name.clone()).collect();
    assert_eq!(
        names,
        vec!["Alice Alpha", "Bob Bravo", "Carl Charlie", "Dana Delta", "Evan Echo"]
    );
}

#[test]
fn info_panel_carries_record_and_links() {
    let data = dashboard();
    let alpha = view(&data, "f-alpha");
    assert_eq!(alpha.info.record, "10-2-0");
    assert_eq!(alpha.info.weight_class.as_deref(), Some("Women's Strawweight"));
    assert!(alpha.info.headshot_url.contains("2614933.png"));
    assert_eq!(
        alpha.info.espn_url.as_deref(),
        Some("https://www.espn.com/mma/fighter/_/id/2614933")
    );
    assert!(alpha.info.ufcstats_url.ends_with("f-alpha"));
    assert!(alpha.info.tapology_url.contains("alice+alpha"));
}

#[test]
fn short_or_missing_espn_ids_fall_back_to_placeholder_headshot() {
    let data = dashboard();
    let bravo = view(&data, "f-bravo");
    assert!(bravo.info.headshot_url.contains("Portrait_Placeholder"));
    // the profile link is still built from whatever id exists
    assert!(bravo.info.espn_url.is_some());

    let charlie = view(&data, "f-charlie");
    assert!(charlie.info.headshot_url.contains("Portrait_Placeholder"));
    assert_eq!(charlie.info.espn_url, None);
    assert!(charlie.info.sherdog_url.is_some());
}

#[test]
fn fight_log_is_most_recent_first() {
    let data = dashboard();
    let alpha = view(&data, "f-alpha");
    assert_eq!(alpha.log.len(), 2);
    assert_eq!(alpha.log[0].event, "Title Night 12");
    assert!(alpha.log[0].winner);
    assert_eq!(alpha.log[1].event, "Contender Series 40");
    assert_eq!(alpha.log[1].sig_strikes, 30);
}

#[test]
fn fighter_without_bouts_gets_notice_and_no_charts() {
    let data = dashboard();
    let echo = view(&data, "f-echo");
    assert_eq!(echo.notice.as_deref(), Some(NO_FIGHTS_NOTICE));
    assert!(echo.log.is_empty());
    assert!(echo.charts.is_none());
    // derived stats render as placeholders, provider stats still show
    let slpm = echo.striking.iter().find(|l| l.label == "SLpM").unwrap();
    assert_eq!(slpm.value, "--");
    let sslpm = echo.striking.iter().find(|l| l.label == "SSLpM").unwrap();
    assert_eq!(sslpm.value, "3.60");
}

#[test]
fn class_cohort_uses_substring_containment() {
    let data = dashboard();
    let bravo = view(&data, "f-bravo");
    let charts = bravo.charts.expect("bravo should have charts");
    // stored "UFC Lightweight Title" rows match the normalized "Lightweight"
    let cohort = points_of(charts.get(ChartKind::Control));
    assert!(cohort.contains(&"f-bravo"));
    assert!(cohort.contains(&"f-charlie"));
    assert!(!cohort.contains(&"f-alpha"));
    assert!(!cohort.contains(&"f-delta"));
}

#[test]
fn zero_filters_apply_to_three_charts_only() {
    let data = dashboard();
    let bravo = view(&data, "f-bravo");
    let charts = bravo.charts.expect("bravo should have charts");
    // charlie has zeroed sig-strike and takedown columns
    assert!(!points_of(charts.get(ChartKind::SigStrikes)).contains(&"f-charlie"));
    assert!(!points_of(charts.get(ChartKind::Takedowns)).contains(&"f-charlie"));
    assert!(points_of(charts.get(ChartKind::TotalStrikes)).contains(&"f-charlie"));
    assert!(points_of(charts.get(ChartKind::Control)).contains(&"f-charlie"));
    assert!(points_of(charts.get(ChartKind::AvgWinScore)).contains(&"f-charlie"));
}

#[test]
fn selected_fighter_is_marked_and_ordered_last() {
    let data = dashboard();
    let alpha = view(&data, "f-alpha");
    let charts = alpha.charts.expect("alpha should have charts");
    let sig = charts.get(ChartKind::SigStrikes);
    assert_eq!(sig.points.len(), 2);
    let last = sig.points.last().unwrap();
    assert!(last.selected);
    assert_eq!(last.ufcstats_id, "f-alpha");
    assert!(sig.points.iter().filter(|p| p.selected).count() == 1);
    // mark size scales with career fight seconds (300 s / 15)
    assert!((last.size - 20.0).abs() < 1e-9);
}

#[test]
fn reference_lines_differ_per_chart() {
    let data = dashboard();
    let alpha = view(&data, "f-alpha");
    let charts = alpha.charts.expect("alpha should have charts");

    // sig strikes: cohort medians per axis
    let sig = charts.get(ChartKind::SigStrikes);
    assert!(approx(sig.x_ref, 4.55));
    assert!(approx(sig.y_ref, 3.3));

    // total strikes: class-wide average strike rate on both axes
    let strikes = charts.get(ChartKind::TotalStrikes);
    assert!(approx(strikes.x_ref, 14.0));
    assert!(approx(strikes.y_ref, 14.0));

    // control: cohort medians
    let control = charts.get(ChartKind::Control);
    assert!(approx(control.x_ref, 22.5));
    assert!(approx(control.y_ref, 22.5));

    // takedowns: cohort means
    let takedowns = charts.get(ChartKind::Takedowns);
    assert!(approx(takedowns.x_ref, 27.5));
    assert!(approx(takedowns.y_ref, 75.0));

    // avg winning score: cohort median of the single defined score
    let avg = charts.get(ChartKind::AvgWinScore);
    assert_eq!(avg.points.len(), 1);
    assert!(approx(avg.x_ref, 100.0));
}

#[test]
fn lightweight_class_rate_reference() {
    let data = dashboard();
    let bravo = view(&data, "f-bravo");
    let charts = bravo.charts.expect("bravo should have charts");
    // 160 strikes over 1200 seconds in the Lightweight rows
    let strikes = charts.get(ChartKind::TotalStrikes);
    assert!(approx(strikes.x_ref, 8.0));

    let avg = charts.get(ChartKind::AvgWinScore);
    assert_eq!(avg.points.len(), 2);
    assert!(approx(avg.x_ref, 94.75));
}

#[test]
fn unknown_fighter_id_has_no_view() {
    let data = dashboard();
    assert!(data.view("f-nobody").is_none());
}
