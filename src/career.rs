use std::collections::{HashMap, HashSet};

use crate::dataset::{CareerBaseRow, FightRow};
use crate::weight_class::resolve_current_classes;

// Summable per-fight counts from one side's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FighterTotals {
    pub strikes_landed: u64,
    pub strikes_attempted: u64,
    pub control_seconds: f64,
    pub fight_seconds: f64,
}

impl FighterTotals {
    fn absorb(&mut self, row: &FightRow) {
        self.strikes_landed += u64::from(row.fighter_total_strikes_landed);
        self.strikes_attempted += u64::from(row.fighter_total_strikes_attempted);
        self.control_seconds += row.fighter_total_control;
        self.fight_seconds += row.fight_time_seconds;
    }
}

pub fn totals_by_fighter(fights: &[FightRow]) -> HashMap<String, FighterTotals> {
    let mut totals: HashMap<String, FighterTotals> = HashMap::new();
    for row in fights {
        totals
            .entry(row.ufcstats_id.clone())
            .or_default()
            .absorb(row);
    }
    totals
}

// Each row credits its counts against the opponent: the row's landed strikes
// are what the opponent absorbed, and the row's fight seconds are cage time
// the opponent also served.
pub fn totals_by_opponent(fights: &[FightRow]) -> HashMap<String, FighterTotals> {
    let mut totals: HashMap<String, FighterTotals> = HashMap::new();
    for row in fights {
        totals
            .entry(row.opp_ufcstats_id.clone())
            .or_default()
            .absorb(row);
    }
    totals
}

pub fn landed_per_minute(landed: u64, seconds: f64) -> Option<f64> {
    if seconds <= 0.0 {
        return None;
    }
    Some(round2(landed as f64 / seconds * 60.0))
}

pub fn accuracy_pct(landed: u64, attempted: u64) -> Option<f64> {
    if attempted == 0 {
        return None;
    }
    Some(round2(landed as f64 / attempted as f64 * 100.0))
}

pub fn control_pct(control_seconds: f64, fight_seconds: f64) -> Option<f64> {
    if fight_seconds <= 0.0 {
        return None;
    }
    Some(round2(control_seconds / fight_seconds * 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Mean fantasy score over winning bouts only. A fighter with no wins (or no
// scored wins) stays absent, which surfaces as undefined downstream.
pub fn average_winning_scores(fights: &[FightRow]) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, u32)> = HashMap::new();
    for row in fights {
        if !row.fighter_winner {
            continue;
        }
        let Some(score) = row.fighter_new_dk_score else {
            continue;
        };
        let entry = sums.entry(row.ufcstats_id.clone()).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(id, (sum, count))| (id, round2(sum / f64::from(count))))
        .collect()
}

// One derived row per fighter in the base table.
#[derive(Debug, Clone)]
pub struct CareerRecord {
    pub ufcstats_id: String,
    pub date_of_birth: Option<String>,
    pub weight_class: Option<String>,

    // Provider-computed significant-strike and grappling columns.
    pub sig_strikes_landed_per_minute: Option<f64>,
    pub sig_strikes_absorbed_per_minute: Option<f64>,
    pub sig_strike_accuracy: Option<f64>,
    pub sig_strike_defence: Option<f64>,
    pub avg_takedowns_per_15_minutes: Option<f64>,
    pub takedown_accuracy: Option<f64>,
    pub takedown_defence: Option<f64>,
    pub avg_submission_attempts_per_15_minutes: Option<f64>,

    // Derived from the fight-by-fight table.
    pub strikes_landed_per_minute: Option<f64>,
    pub strikes_absorbed_per_minute: Option<f64>,
    pub strike_accuracy: Option<f64>,
    pub control_percentage: Option<f64>,
    pub control_against_percentage: Option<f64>,
    pub fight_seconds_for: f64,
    pub avg_win_score: Option<f64>,
}

// Joins every derived column onto the base table by fighter id. The join is
// outer-preserving on the base table: a fighter with no fight rows keeps a
// record with undefined derived columns, and nothing is dropped.
pub fn build_career_records(base: &[CareerBaseRow], fights: &[FightRow]) -> Vec<CareerRecord> {
    let for_totals = totals_by_fighter(fights);
    let against_totals = totals_by_opponent(fights);
    let win_scores = average_winning_scores(fights);
    let classes = resolve_current_classes(fights);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::with_capacity(base.len());
    for row in base {
        if !seen.insert(row.ufcstats_id.as_str()) {
            continue;
        }
        let for_t = for_totals.get(&row.ufcstats_id).copied().unwrap_or_default();
        let against_t = against_totals
            .get(&row.ufcstats_id)
            .copied()
            .unwrap_or_default();

        records.push(CareerRecord {
            ufcstats_id: row.ufcstats_id.clone(),
            date_of_birth: row.date_of_birth.clone(),
            weight_class: classes.get(&row.ufcstats_id).cloned(),
            sig_strikes_landed_per_minute: row.sig_strikes_landed_per_minute,
            sig_strikes_absorbed_per_minute: row.sig_strikes_absorbed_per_minute,
            sig_strike_accuracy: row.sig_strike_accuracy,
            sig_strike_defence: row.sig_strike_defence,
            avg_takedowns_per_15_minutes: row.avg_takedowns_per_15_minutes,
            takedown_accuracy: row.takedown_accuracy,
            takedown_defence: row.takedown_defence,
            avg_submission_attempts_per_15_minutes: row.avg_submission_attempts_per_15_minutes,
            strikes_landed_per_minute: landed_per_minute(for_t.strikes_landed, for_t.fight_seconds),
            strikes_absorbed_per_minute: landed_per_minute(
                against_t.strikes_landed,
                against_t.fight_seconds,
            ),
            strike_accuracy: accuracy_pct(for_t.strikes_landed, for_t.strikes_attempted),
            control_percentage: control_pct(for_t.control_seconds, for_t.fight_seconds),
            control_against_percentage: control_pct(
                against_t.control_seconds,
                against_t.fight_seconds,
            ),
            fight_seconds_for: for_t.fight_seconds,
            avg_win_score: win_scores.get(&row.ufcstats_id).copied(),
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_undefined_on_zero_denominators() {
        assert_eq!(landed_per_minute(50, 0.0), None);
        assert_eq!(accuracy_pct(10, 0), None);
        assert_eq!(control_pct(30.0, 0.0), None);
    }

    #[test]
    fn landed_per_minute_rounds_to_two_places() {
        assert_eq!(landed_per_minute(90, 300.0), Some(18.0));
        assert_eq!(landed_per_minute(1, 420.0), Some(0.14));
    }
}
