use std::cmp::Ordering;
use std::collections::HashSet;
use std::env;
use std::fs;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::http_client::http_client;

const DEFAULT_FIGHTERS_URL: &str =
    "https://github.com/mjester93/ufc-data/blob/main/fighters.csv?raw=True";
const DEFAULT_CAREER_URL: &str =
    "https://github.com/mjester93/ufc-data/blob/main/fighter_career_stats.csv?raw=True";
const DEFAULT_FIGHTS_URL: &str =
    "https://github.com/mjester93/ufc-data/blob/main/fight_data.csv?raw=True";
const DEFAULT_EXTERNAL_IDS_URL: &str =
    "https://github.com/mjester93/ufc-data/blob/main/external_ids.csv?raw=True";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },

    #[error("dataset at {location} is malformed: {reason}")]
    Malformed { location: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub fighters: String,
    pub career: String,
    pub fights: String,
    pub external_ids: String,
}

impl SourceConfig {
    pub fn from_env() -> Self {
        Self {
            fighters: env_or_default("MMA_FIGHTERS_URL", DEFAULT_FIGHTERS_URL),
            career: env_or_default("MMA_CAREER_STATS_URL", DEFAULT_CAREER_URL),
            fights: env_or_default("MMA_FIGHT_DATA_URL", DEFAULT_FIGHTS_URL),
            external_ids: env_or_default("MMA_EXTERNAL_IDS_URL", DEFAULT_EXTERNAL_IDS_URL),
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FighterRow {
    pub ufcstats_id: String,
    pub full_name: String,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub reach: Option<String>,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub stance: Option<String>,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub wins: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub losses: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub draws: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerBaseRow {
    pub ufcstats_id: String,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub sig_strikes_landed_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub sig_strikes_absorbed_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub sig_strike_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub sig_strike_defence: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub avg_takedowns_per_15_minutes: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub takedown_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub takedown_defence: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub avg_submission_attempts_per_15_minutes: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FightRow {
    pub ufcstats_id: String,
    pub opp_ufcstats_id: String,
    pub event_name: String,
    #[serde(deserialize_with = "de::naive_date")]
    pub event_date: NaiveDate,
    pub weight_class: String,
    pub opp_name: String,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub fighter_odds: Option<f64>,
    #[serde(default, deserialize_with = "de::py_bool")]
    pub fighter_winner: bool,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub round: Option<String>,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "de::f64_flex")]
    pub fight_time_seconds: f64,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub fighter_new_dk_score: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64_flex")]
    pub fighter_old_dk_score: Option<f64>,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_knockdowns: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_sig_strikes_landed: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_strikes_landed: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_strikes_attempted: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_takedowns: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_submission_attempts: u32,
    #[serde(default, deserialize_with = "de::u32_flex")]
    pub fighter_total_reversals: u32,
    #[serde(default, deserialize_with = "de::f64_flex")]
    pub fighter_total_control: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalIdRow {
    pub ufcstats_id: String,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub espn_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_trimmed")]
    pub sherdog_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub fighters: Vec<FighterRow>,
    pub career: Vec<CareerBaseRow>,
    pub fights: Vec<FightRow>,
    pub external_ids: Vec<ExternalIdRow>,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn load(config: &SourceConfig) -> Result<Self, DatasetError> {
        let fighters = load_table::<FighterRow>(&config.fighters)?;
        let career = load_table::<CareerBaseRow>(&config.career)?;
        let mut fights = load_table::<FightRow>(&config.fights)?;
        let external_ids = load_table::<ExternalIdRow>(&config.external_ids)?;

        fights.rows.sort_by(recency_cmp);

        Ok(Self {
            fighters: fighters.rows,
            career: career.rows,
            fights: fights.rows,
            external_ids: external_ids.rows,
            skipped_rows: fighters.skipped + career.skipped + fights.skipped + external_ids.skipped,
        })
    }

    // Provider data does not guarantee every fight row points at a known
    // fighter on both sides; callers surface the count rather than fail.
    pub fn unresolved_id_count(&self) -> usize {
        let known: HashSet<&str> = self.fighters.iter().map(|f| f.ufcstats_id.as_str()).collect();
        self.fights
            .iter()
            .filter(|f| {
                !known.contains(f.ufcstats_id.as_str())
                    || !known.contains(f.opp_ufcstats_id.as_str())
            })
            .count()
    }
}

// Most recent bout first; event name then opponent id keep equal-date
// ordering deterministic.
pub fn recency_cmp(a: &FightRow, b: &FightRow) -> Ordering {
    b.event_date
        .cmp(&a.event_date)
        .then_with(|| a.event_name.cmp(&b.event_name))
        .then_with(|| a.opp_ufcstats_id.cmp(&b.opp_ufcstats_id))
}

struct ParsedTable<T> {
    rows: Vec<T>,
    skipped: usize,
}

fn load_table<T: DeserializeOwned>(location: &str) -> Result<ParsedTable<T>, DatasetError> {
    let body = fetch_body(location)?;
    parse_rows(&body).map_err(|reason| DatasetError::Malformed {
        location: location.to_string(),
        reason,
    })
}

fn fetch_body(location: &str) -> Result<String, DatasetError> {
    if location.starts_with("http") {
        let client = http_client().map_err(|err| DatasetError::Unavailable {
            location: location.to_string(),
            reason: err.to_string(),
        })?;
        let resp = client
            .get(location)
            .send()
            .map_err(|err| DatasetError::Unavailable {
                location: location.to_string(),
                reason: err.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DatasetError::Unavailable {
                location: location.to_string(),
                reason: format!("http {status}"),
            });
        }
        resp.text().map_err(|err| DatasetError::Unavailable {
            location: location.to_string(),
            reason: err.to_string(),
        })
    } else {
        fs::read_to_string(location).map_err(|err| DatasetError::Unavailable {
            location: location.to_string(),
            reason: err.to_string(),
        })
    }
}

fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<ParsedTable<T>, String> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|err| format!("unreadable header row: {err}"))?
        .clone();
    let expected_len = headers.len();
    if expected_len == 0 {
        return Err("empty header row".to_string());
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let raw: StringRecord = result.map_err(|err| format!("unreadable record: {err}"))?;

        if raw.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if raw.len() != expected_len {
            skipped += 1;
            continue;
        }
        match raw.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }

    if rows.is_empty() {
        return Err("no parsable data rows".to_string());
    }
    Ok(ParsedTable { rows, skipped })
}

mod de {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    // Source dates are ISO-ish but not uniform across files.
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%B %d, %Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    pub fn naive_date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        let trimmed = raw.trim();
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Ok(date);
            }
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(dt.date());
            }
        }
        Err(serde::de::Error::custom(format!("unparseable date {trimmed:?}")))
    }

    pub fn opt_trimmed<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "nan" && s != "NaN"))
    }

    pub fn u32_flex<'de, D>(d: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match clean_number(Option::<String>::deserialize(d)?) {
            None => Ok(0),
            Some(cleaned) => cleaned
                .parse::<f64>()
                .map(|n| n.max(0.0) as u32)
                .map_err(|_| serde::de::Error::custom(format!("unparseable count {cleaned:?}"))),
        }
    }

    pub fn f64_flex<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match clean_number(Option::<String>::deserialize(d)?) {
            None => Ok(0.0),
            Some(cleaned) => cleaned
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("unparseable number {cleaned:?}"))),
        }
    }

    pub fn opt_f64_flex<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match clean_number(Option::<String>::deserialize(d)?) {
            None => Ok(None),
            Some(cleaned) => cleaned
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("unparseable number {cleaned:?}"))),
        }
    }

    pub fn py_bool<'de, D>(d: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        match raw.trim() {
            "True" | "true" | "TRUE" | "1" | "1.0" => Ok(true),
            _ => Ok(false),
        }
    }

    // Strips thousands separators and a leading plus sign; empty and NaN
    // markers become None.
    fn clean_number(raw: Option<String>) -> Option<String> {
        let raw = raw?;
        let cleaned = raw.trim().replace(',', "");
        let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned).to_string();
        if cleaned.is_empty() || cleaned == "nan" || cleaned == "NaN" {
            return None;
        }
        Some(cleaned)
    }
}
