use std::collections::HashMap;

use chrono::NaiveDate;

use crate::career::{build_career_records, CareerRecord};
use crate::charts::{build_chart_set, ChartSet};
use crate::dataset::{Dataset, DatasetError, FightRow, FighterRow, SourceConfig};
use crate::weight_class::normalize_class;

const ESPN_HEADSHOT_BASE: &str =
    "https://a.espncdn.com/combiner/i?img=/i/headshots/mma/players/full/";
const ESPN_PROFILE_BASE: &str = "https://www.espn.com/mma/fighter/_/id/";
const SHERDOG_PROFILE_BASE: &str = "https://www.sherdog.com/fighter/";
const UFCSTATS_PROFILE_BASE: &str = "http://www.ufcstats.com/fighter-details/";
const PLACEHOLDER_HEADSHOT: &str =
    "https://upload.wikimedia.org/wikipedia/commons/c/cd/Portrait_Placeholder_Square.png";

pub const NO_FIGHTS_NOTICE: &str =
    "This fighter did not compete in the covered period; no fight log or charts to show.";

// All loaded tables plus the derived career table, indexed for selection
// lookups. Immutable after construction.
pub struct DashboardData {
    pub dataset: Dataset,
    pub career: Vec<CareerRecord>,
    career_index: HashMap<String, usize>,
    fighter_index: HashMap<String, usize>,
    espn_ids: HashMap<String, String>,
    sherdog_ids: HashMap<String, String>,
}

impl DashboardData {
    pub fn load(config: &SourceConfig) -> Result<Self, DatasetError> {
        Ok(Self::from_dataset(Dataset::load(config)?))
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let career = build_career_records(&dataset.career, &dataset.fights);
        let career_index = career
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.ufcstats_id.clone(), idx))
            .collect();
        let mut fighter_index = HashMap::with_capacity(dataset.fighters.len());
        for (idx, fighter) in dataset.fighters.iter().enumerate() {
            fighter_index
                .entry(fighter.ufcstats_id.clone())
                .or_insert(idx);
        }
        let mut espn_ids = HashMap::new();
        let mut sherdog_ids = HashMap::new();
        for row in &dataset.external_ids {
            if let Some(id) = &row.espn_id {
                espn_ids.insert(row.ufcstats_id.clone(), id.clone());
            }
            if let Some(id) = &row.sherdog_id {
                sherdog_ids.insert(row.ufcstats_id.clone(), id.clone());
            }
        }
        Self {
            dataset,
            career,
            career_index,
            fighter_index,
            espn_ids,
            sherdog_ids,
        }
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        let mut entries: Vec<RosterEntry> = self
            .dataset
            .fighters
            .iter()
            .map(|f| RosterEntry {
                ufcstats_id: f.ufcstats_id.clone(),
                full_name: f.full_name.clone(),
                nickname: f.nickname.clone(),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.full_name
                .cmp(&b.full_name)
                .then_with(|| a.ufcstats_id.cmp(&b.ufcstats_id))
        });
        entries
    }

    fn fighter(&self, fighter_id: &str) -> Option<&FighterRow> {
        self.fighter_index
            .get(fighter_id)
            .map(|idx| &self.dataset.fighters[*idx])
    }

    fn career_record(&self, fighter_id: &str) -> Option<&CareerRecord> {
        self.career_index
            .get(fighter_id)
            .map(|idx| &self.career[*idx])
    }

    // The whole per-selection pipeline: info + stat panels + log + charts.
    // Returns None only for an id that is not in the fighters table.
    pub fn view(&self, fighter_id: &str) -> Option<FighterView> {
        let fighter = self.fighter(fighter_id)?;
        let record = self.career_record(fighter_id);

        let raw_class = record.and_then(|r| r.weight_class.clone());
        let weight_class = raw_class.as_deref().map(normalize_class);

        let log: Vec<FightLogRow> = self
            .dataset
            .fights
            .iter()
            .filter(|f| f.ufcstats_id == fighter_id)
            .map(FightLogRow::from_fight)
            .collect();

        let charts = match (&weight_class, log.is_empty()) {
            (Some(class), false) => Some(build_chart_set(
                &self.career,
                &self.dataset.fights,
                fighter_id,
                class,
            )),
            _ => None,
        };
        let notice = log.is_empty().then(|| NO_FIGHTS_NOTICE.to_string());

        Some(FighterView {
            info: self.build_info(fighter, record, weight_class),
            striking: striking_lines(record),
            grappling: grappling_lines(record),
            log,
            charts,
            notice,
        })
    }

    fn build_info(
        &self,
        fighter: &FighterRow,
        record: Option<&CareerRecord>,
        weight_class: Option<String>,
    ) -> FighterInfo {
        let espn_id = self.espn_ids.get(&fighter.ufcstats_id);
        let sherdog_id = self.sherdog_ids.get(&fighter.ufcstats_id);

        // Short ESPN ids are provider placeholders, not real profiles.
        let headshot_url = match espn_id {
            Some(id) if id.len() >= 5 => format!("{ESPN_HEADSHOT_BASE}{id}.png"),
            _ => PLACEHOLDER_HEADSHOT.to_string(),
        };
        let tapology_term = fighter.full_name.to_lowercase().replace(' ', "+");

        FighterInfo {
            ufcstats_id: fighter.ufcstats_id.clone(),
            full_name: fighter.full_name.clone(),
            nickname: fighter.nickname.clone(),
            date_of_birth: record.and_then(|r| r.date_of_birth.clone()),
            height: fighter.height.clone(),
            weight: fighter.weight,
            weight_class,
            reach: fighter.reach.clone(),
            stance: fighter.stance.clone(),
            record: format!("{}-{}-{}", fighter.wins, fighter.losses, fighter.draws),
            headshot_url,
            espn_url: espn_id.map(|id| format!("{ESPN_PROFILE_BASE}{id}")),
            sherdog_url: sherdog_id.map(|id| format!("{SHERDOG_PROFILE_BASE}{id}")),
            ufcstats_url: format!("{UFCSTATS_PROFILE_BASE}{}", fighter.ufcstats_id),
            tapology_url: format!(
                "https://www.tapology.com/search?term={tapology_term}&commit=Submit&model%5Bfighters%5D=fightersSearch"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub ufcstats_id: String,
    pub full_name: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FighterInfo {
    pub ufcstats_id: String,
    pub full_name: String,
    pub nickname: Option<String>,
    pub date_of_birth: Option<String>,
    pub height: Option<String>,
    pub weight: Option<f64>,
    pub weight_class: Option<String>,
    pub reach: Option<String>,
    pub stance: Option<String>,
    pub record: String,
    pub headshot_url: String,
    pub espn_url: Option<String>,
    pub sherdog_url: Option<String>,
    pub ufcstats_url: String,
    pub tapology_url: String,
}

#[derive(Debug, Clone)]
pub struct StatLine {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct FightLogRow {
    pub event: String,
    pub date: NaiveDate,
    pub weight_class: String,
    pub opponent: String,
    pub odds: Option<f64>,
    pub winner: bool,
    pub round: Option<String>,
    pub time: Option<String>,
    pub seconds: f64,
    pub method: Option<String>,
    pub new_score: Option<f64>,
    pub old_score: Option<f64>,
    pub knockdowns: u32,
    pub sig_strikes: u32,
    pub strikes: u32,
    pub takedowns: u32,
    pub sub_attempts: u32,
    pub reversals: u32,
    pub control_seconds: f64,
}

impl FightLogRow {
    fn from_fight(row: &FightRow) -> Self {
        Self {
            event: row.event_name.clone(),
            date: row.event_date,
            weight_class: row.weight_class.clone(),
            opponent: row.opp_name.clone(),
            odds: row.fighter_odds,
            winner: row.fighter_winner,
            round: row.round.clone(),
            time: row.time.clone(),
            seconds: row.fight_time_seconds,
            method: row.method.clone(),
            new_score: row.fighter_new_dk_score,
            old_score: row.fighter_old_dk_score,
            knockdowns: row.fighter_total_knockdowns,
            sig_strikes: row.fighter_total_sig_strikes_landed,
            strikes: row.fighter_total_strikes_landed,
            takedowns: row.fighter_total_takedowns,
            sub_attempts: row.fighter_total_submission_attempts,
            reversals: row.fighter_total_reversals,
            control_seconds: row.fighter_total_control,
        }
    }
}

#[derive(Debug)]
pub struct FighterView {
    pub info: FighterInfo,
    pub striking: Vec<StatLine>,
    pub grappling: Vec<StatLine>,
    pub log: Vec<FightLogRow>,
    pub charts: Option<ChartSet>,
    pub notice: Option<String>,
}

fn striking_lines(record: Option<&CareerRecord>) -> Vec<StatLine> {
    vec![
        StatLine {
            label: "SSLpM",
            value: fmt_rate(record.and_then(|r| r.sig_strikes_landed_per_minute)),
        },
        StatLine {
            label: "SSApM",
            value: fmt_rate(record.and_then(|r| r.sig_strikes_absorbed_per_minute)),
        },
        StatLine {
            label: "Sig. Str. Acc",
            value: fmt_pct(record.and_then(|r| r.sig_strike_accuracy)),
        },
        StatLine {
            label: "Sig. Str. Def",
            value: fmt_pct(record.and_then(|r| r.sig_strike_defence)),
        },
        StatLine {
            label: "SLpM",
            value: fmt_rate(record.and_then(|r| r.strikes_landed_per_minute)),
        },
        StatLine {
            label: "SApM",
            value: fmt_rate(record.and_then(|r| r.strikes_absorbed_per_minute)),
        },
        StatLine {
            label: "Str. Acc",
            value: fmt_pct(record.and_then(|r| r.strike_accuracy)),
        },
        StatLine {
            label: "Fight Time (mins)",
            value: match record {
                Some(r) if r.fight_seconds_for > 0.0 => format!("{:.1}", r.fight_seconds_for / 60.0),
                _ => PLACEHOLDER_VALUE.to_string(),
            },
        },
    ]
}

fn grappling_lines(record: Option<&CareerRecord>) -> Vec<StatLine> {
    vec![
        StatLine {
            label: "TD Avg",
            value: fmt_rate(record.and_then(|r| r.avg_takedowns_per_15_minutes)),
        },
        StatLine {
            label: "TD Acc",
            value: fmt_pct(record.and_then(|r| r.takedown_accuracy)),
        },
        StatLine {
            label: "TD Def",
            value: fmt_pct(record.and_then(|r| r.takedown_defence)),
        },
        StatLine {
            label: "Sub. Avg",
            value: fmt_rate(record.and_then(|r| r.avg_submission_attempts_per_15_minutes)),
        },
        StatLine {
            label: "Ctrl. Pct",
            value: fmt_pct(record.and_then(|r| r.control_percentage)),
        },
        StatLine {
            label: "Ctrl. Agt. Pct",
            value: fmt_pct(record.and_then(|r| r.control_against_percentage)),
        },
        StatLine {
            label: "Avg. Win Score",
            value: fmt_rate(record.and_then(|r| r.avg_win_score)),
        },
    ]
}

pub const PLACEHOLDER_VALUE: &str = "--";

pub fn fmt_rate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => PLACEHOLDER_VALUE.to_string(),
    }
}

pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.0}%"),
        None => PLACEHOLDER_VALUE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_stats_render_as_placeholder() {
        assert_eq!(fmt_rate(None), "--");
        assert_eq!(fmt_pct(None), "--");
        assert_eq!(fmt_rate(Some(4.275)), "4.28");
        assert_eq!(fmt_pct(Some(47.6)), "48%");
    }
}
