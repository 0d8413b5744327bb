use crate::career::{round2, CareerRecord};
use crate::dataset::FightRow;
use crate::weight_class::class_matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SigStrikes,
    TotalStrikes,
    Control,
    Takedowns,
    AvgWinScore,
}

pub const CHART_ORDER: [ChartKind; 5] = [
    ChartKind::SigStrikes,
    ChartKind::TotalStrikes,
    ChartKind::Control,
    ChartKind::Takedowns,
    ChartKind::AvgWinScore,
];

pub fn chart_label(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::SigStrikes => "Sig. Strikes by Class",
        ChartKind::TotalStrikes => "Total Strikes by Class",
        ChartKind::Control => "Control Percentage by Class",
        ChartKind::Takedowns => "Takedowns by Class",
        ChartKind::AvgWinScore => "Avg. Winning Score by Class",
    }
}

#[derive(Debug, Clone)]
pub struct ChartPoint {
    pub ufcstats_id: String,
    pub x: f64,
    pub y: f64,
    // Mark size follows career cage time.
    pub size: f64,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct ScatterData {
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    // Selected fighter is last so it draws on top of the cohort.
    pub points: Vec<ChartPoint>,
    pub x_ref: Option<f64>,
    pub y_ref: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChartSet {
    pub sig_strikes: ScatterData,
    pub total_strikes: ScatterData,
    pub control: ScatterData,
    pub takedowns: ScatterData,
    pub avg_win_score: ScatterData,
}

impl ChartSet {
    pub fn get(&self, kind: ChartKind) -> &ScatterData {
        match kind {
            ChartKind::SigStrikes => &self.sig_strikes,
            ChartKind::TotalStrikes => &self.total_strikes,
            ChartKind::Control => &self.control,
            ChartKind::Takedowns => &self.takedowns,
            ChartKind::AvgWinScore => &self.avg_win_score,
        }
    }
}

pub fn build_chart_set(
    records: &[CareerRecord],
    fights: &[FightRow],
    selected_id: &str,
    selected_class: &str,
) -> ChartSet {
    let cohort: Vec<&CareerRecord> = records
        .iter()
        .filter(|r| {
            r.weight_class
                .as_deref()
                .is_some_and(|class| class_matches(class, selected_class))
        })
        .collect();

    ChartSet {
        sig_strikes: sig_strikes_chart(&cohort, selected_id),
        total_strikes: total_strikes_chart(&cohort, fights, selected_id, selected_class),
        control: control_chart(&cohort, selected_id),
        takedowns: takedown_chart(&cohort, selected_id),
        avg_win_score: avg_win_score_chart(&cohort, selected_id),
    }
}

// Rows with a zeroed axis are dropped from this cohort.
fn sig_strikes_chart(cohort: &[&CareerRecord], selected_id: &str) -> ScatterData {
    let points = collect_points(
        cohort,
        selected_id,
        |r| pair(r.sig_strikes_landed_per_minute, r.sig_strikes_absorbed_per_minute),
        true,
    );
    let x_ref = median(points.iter().map(|p| p.x));
    let y_ref = median(points.iter().map(|p| p.y));
    ScatterData {
        kind: ChartKind::SigStrikes,
        x_label: "Sig. Strikes Landed Per Minute",
        y_label: "Sig. Strikes Absorbed Per Minute",
        points,
        x_ref,
        y_ref,
    }
}

// No zero filter here; the reference is the class-wide strike rate computed
// from the raw fight table rather than a cohort statistic.
fn total_strikes_chart(
    cohort: &[&CareerRecord],
    fights: &[FightRow],
    selected_id: &str,
    selected_class: &str,
) -> ScatterData {
    let points = collect_points(
        cohort,
        selected_id,
        |r| pair(r.strikes_landed_per_minute, r.strikes_absorbed_per_minute),
        false,
    );
    let class_rate = class_average_strike_rate(fights, selected_class);
    ScatterData {
        kind: ChartKind::TotalStrikes,
        x_label: "Strikes Landed Per Minute",
        y_label: "Strikes Absorbed Per Minute",
        points,
        x_ref: class_rate,
        y_ref: class_rate,
    }
}

fn control_chart(cohort: &[&CareerRecord], selected_id: &str) -> ScatterData {
    let points = collect_points(
        cohort,
        selected_id,
        |r| pair(r.control_percentage, r.control_against_percentage),
        false,
    );
    let x_ref = median(points.iter().map(|p| p.x));
    let y_ref = median(points.iter().map(|p| p.y));
    ScatterData {
        kind: ChartKind::Control,
        x_label: "Control Percentage",
        y_label: "Control Against Percentage",
        points,
        x_ref,
        y_ref,
    }
}

// Reference lines here are cohort means, not medians.
fn takedown_chart(cohort: &[&CareerRecord], selected_id: &str) -> ScatterData {
    let points = collect_points(
        cohort,
        selected_id,
        |r| pair(r.takedown_accuracy, r.takedown_defence),
        true,
    );
    let x_ref = mean(points.iter().map(|p| p.x));
    let y_ref = mean(points.iter().map(|p| p.y));
    ScatterData {
        kind: ChartKind::Takedowns,
        x_label: "Takedown Accuracy (%)",
        y_label: "Takedown Defence (%)",
        points,
        x_ref,
        y_ref,
    }
}

fn avg_win_score_chart(cohort: &[&CareerRecord], selected_id: &str) -> ScatterData {
    let points = collect_points(
        cohort,
        selected_id,
        |r| pair(r.avg_win_score, r.avg_win_score),
        true,
    );
    let score_ref = median(points.iter().map(|p| p.x));
    ScatterData {
        kind: ChartKind::AvgWinScore,
        x_label: "Average Winning Fantasy Score",
        y_label: "Average Winning Fantasy Score",
        points,
        x_ref: score_ref,
        y_ref: score_ref,
    }
}

fn pair(x: Option<f64>, y: Option<f64>) -> Option<(f64, f64)> {
    Some((x?, y?))
}

fn collect_points(
    cohort: &[&CareerRecord],
    selected_id: &str,
    values: impl Fn(&CareerRecord) -> Option<(f64, f64)>,
    drop_zeros: bool,
) -> Vec<ChartPoint> {
    let mut points = Vec::with_capacity(cohort.len());
    let mut selected_point = None;
    for record in cohort {
        let Some((x, y)) = values(record) else {
            continue;
        };
        if drop_zeros && (x <= 0.0 || y <= 0.0) {
            continue;
        }
        let point = ChartPoint {
            ufcstats_id: record.ufcstats_id.clone(),
            x,
            y,
            size: record.fight_seconds_for / 15.0,
            selected: record.ufcstats_id == selected_id,
        };
        if point.selected {
            selected_point = Some(point);
        } else {
            points.push(point);
        }
    }
    if let Some(point) = selected_point {
        points.push(point);
    }
    points
}

pub fn class_average_strike_rate(fights: &[FightRow], selected_class: &str) -> Option<f64> {
    let mut landed = 0u64;
    let mut seconds = 0.0f64;
    for row in fights {
        if !class_matches(&row.weight_class, selected_class) {
            continue;
        }
        landed += u64::from(row.fighter_total_strikes_landed);
        seconds += row.fight_time_seconds;
    }
    if seconds <= 0.0 {
        return None;
    }
    Some(round2(landed as f64 / seconds * 60.0))
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}
