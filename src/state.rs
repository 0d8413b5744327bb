use std::collections::VecDeque;

use crate::charts::{ChartKind, CHART_ORDER};
use crate::view::RosterEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Roster,
    Fighter { fighter_id: String },
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub roster: Vec<RosterEntry>,
    pub selected: usize,
    pub search: String,
    pub search_active: bool,
    pub chart_tab: usize,
    pub log_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(roster: Vec<RosterEntry>) -> Self {
        Self {
            screen: Screen::Roster,
            roster,
            selected: 0,
            search: String::new(),
            search_active: false,
            chart_tab: 0,
            log_scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn filtered_indices(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.matches_search(entry))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn matches_search(&self, entry: &RosterEntry) -> bool {
        if self.search.is_empty() {
            return true;
        }
        contains_ascii_ci(&entry.full_name, &self.search)
            || entry
                .nickname
                .as_deref()
                .is_some_and(|nick| contains_ascii_ci(nick, &self.search))
    }

    pub fn selected_entry(&self) -> Option<&RosterEntry> {
        let filtered = self.filtered_indices();
        filtered
            .get(self.selected)
            .and_then(|idx| self.roster.get(*idx))
    }

    pub fn selected_fighter_id(&self) -> Option<String> {
        match &self.screen {
            Screen::Fighter { fighter_id } => Some(fighter_id.clone()),
            Screen::Roster => self.selected_entry().map(|e| e.ufcstats_id.clone()),
        }
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(total - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(entry) = self.selected_entry() {
            let name = entry.full_name.clone();
            self.screen = Screen::Fighter {
                fighter_id: entry.ufcstats_id.clone(),
            };
            self.chart_tab = 0;
            self.log_scroll = 0;
            self.push_log(format!("[INFO] Opened {name}"));
        }
    }

    pub fn back_to_roster(&mut self) {
        self.screen = Screen::Roster;
        self.log_scroll = 0;
    }

    pub fn chart_kind(&self) -> ChartKind {
        CHART_ORDER[self.chart_tab % CHART_ORDER.len()]
    }

    pub fn cycle_chart_next(&mut self) {
        self.chart_tab = (self.chart_tab + 1) % CHART_ORDER.len();
    }

    pub fn cycle_chart_prev(&mut self) {
        self.chart_tab = (self.chart_tab + CHART_ORDER.len() - 1) % CHART_ORDER.len();
    }

    pub fn scroll_log_down(&mut self, max_scroll: u16) {
        self.log_scroll = self.log_scroll.saturating_add(1).min(max_scroll);
    }

    pub fn scroll_log_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.search.push(ch);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.clamp_selection();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search_active = false;
        self.selected = 0;
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn contains_ascii_ci(haystack: &str, needle: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.len() > h.len() {
        return false;
    }
    if n.is_empty() {
        return true;
    }
    h.windows(n.len())
        .any(|window| window.eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<RosterEntry> {
        vec![
            RosterEntry {
                ufcstats_id: "a1".to_string(),
                full_name: "Alexa Grasso".to_string(),
                nickname: None,
            },
            RosterEntry {
                ufcstats_id: "b2".to_string(),
                full_name: "Max Holloway".to_string(),
                nickname: Some("Blessed".to_string()),
            },
        ]
    }

    #[test]
    fn search_filters_by_name_and_nickname() {
        let mut state = AppState::new(roster());
        state.search = "holloway".to_string();
        assert_eq!(state.filtered_indices(), vec![1]);
        state.search = "blessed".to_string();
        assert_eq!(state.filtered_indices(), vec![1]);
        state.search = "zzz".to_string();
        assert!(state.filtered_indices().is_empty());
    }

    #[test]
    fn selection_clamps_when_filter_shrinks() {
        let mut state = AppState::new(roster());
        state.selected = 1;
        state.search = "grasso".to_string();
        state.clamp_selection();
        assert_eq!(state.selected, 0);
        assert_eq!(state.selected_entry().unwrap().ufcstats_id, "a1");
    }

    #[test]
    fn chart_tabs_wrap_both_ways() {
        let mut state = AppState::new(Vec::new());
        state.cycle_chart_prev();
        assert_eq!(state.chart_kind(), ChartKind::AvgWinScore);
        state.cycle_chart_next();
        assert_eq!(state.chart_kind(), ChartKind::SigStrikes);
    }
}
