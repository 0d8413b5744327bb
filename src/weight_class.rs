use std::collections::HashMap;

use crate::dataset::{recency_cmp, FightRow};

// "Current" weight class is the class of the most recent bout; ordering and
// tie-breaks come from `recency_cmp`.
pub fn resolve_current_classes(fights: &[FightRow]) -> HashMap<String, String> {
    let mut ordered: Vec<&FightRow> = fights.iter().collect();
    ordered.sort_by(|a, b| recency_cmp(a, b));

    let mut classes: HashMap<String, String> = HashMap::new();
    for row in ordered {
        classes
            .entry(row.ufcstats_id.clone())
            .or_insert_with(|| row.weight_class.clone());
    }
    classes
}

// Title-fight class strings carry promotion noise ("UFC Women's Strawweight
// Title"); stripping the tokens leaves the comparable class name.
pub fn normalize_class(raw: &str) -> String {
    raw.replace("UFC", "").replace("Title", "").trim().to_string()
}

// Cohort membership is substring containment, not equality, so a stored
// "UFC Lightweight Title" row matches a selected "Lightweight".
pub fn class_matches(stored: &str, selected: &str) -> bool {
    !selected.is_empty() && stored.contains(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_promotion_tokens() {
        assert_eq!(normalize_class("UFC Women's Strawweight Title"), "Women's Strawweight");
        assert_eq!(normalize_class("Lightweight"), "Lightweight");
    }

    #[test]
    fn substring_matching_is_not_equality() {
        assert!(class_matches("UFC Lightweight Title", "Lightweight"));
        assert!(class_matches("Lightweight", "Lightweight"));
        assert!(!class_matches("Welterweight", "Lightweight"));
        assert!(!class_matches("Welterweight", ""));
    }
}
