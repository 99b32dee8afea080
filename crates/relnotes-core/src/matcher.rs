//! Fuzzy resolution of a free-text title to an epic URL.
//!
//! Tiers, first hit wins: exact key, case-insensitive key, substring
//! containment in either direction, then the best bag-of-words overlap that
//! clears the threshold. No match means the title is rendered without a link.

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Epic title to URL.
pub type EpicUrls = BTreeMap<String, String>;

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpicMatcher {
    threshold: f64,
}

impl Default for EpicMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl EpicMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn find<'a>(&self, title: &str, urls: &'a EpicUrls) -> Option<&'a str> {
        let title = title.trim();
        if title.is_empty() || urls.is_empty() {
            return None;
        }

        if let Some(url) = urls.get(title) {
            return Some(url.as_str());
        }

        let lower = title.to_lowercase();
        if let Some((_, url)) = urls.iter().find(|(epic, _)| epic.trim().to_lowercase() == lower) {
            return Some(url.as_str());
        }

        if let Some((epic, url)) = urls.iter().find(|(epic, _)| {
            let epic_lower = epic.trim().to_lowercase();
            !epic_lower.is_empty() && (epic_lower.contains(&lower) || lower.contains(&epic_lower))
        }) {
            debug!(title, epic = epic.as_str(), "epic matched by containment");
            return Some(url.as_str());
        }

        let query = words(&lower);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(f64, &String, &String)> = None;
        for (epic, url) in urls {
            let candidate = words(&epic.to_lowercase());
            if candidate.is_empty() {
                continue;
            }
            let shared = query.intersection(&candidate).count() as f64;
            let forward = shared / candidate.len() as f64;
            let reverse = shared / query.len() as f64;
            let score = forward.max(reverse);
            if score >= self.threshold && best.map_or(true, |(b, _, _)| score > b) {
                best = Some((score, epic, url));
            }
        }

        match best {
            Some((score, epic, url)) => {
                debug!(title, epic = epic.as_str(), score, "epic matched by word overlap");
                Some(url.as_str())
            }
            None => {
                debug!(title, "no epic match");
                None
            }
        }
    }
}

/// Resolve with the default threshold.
pub fn find_epic_url<'a>(title: &str, urls: &'a EpicUrls) -> Option<&'a str> {
    EpicMatcher::default().find(title, urls)
}

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(pairs: &[(&str, &str)]) -> EpicUrls {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn exact_and_case_insensitive_keys() {
        let map = urls(&[("Audience Builder", "https://t/EP-1")]);
        assert_eq!(find_epic_url("Audience Builder", &map), Some("https://t/EP-1"));
        assert_eq!(find_epic_url("audience builder ", &map), Some("https://t/EP-1"));
    }

    #[test]
    fn substring_in_either_direction() {
        let map = urls(&[("Bid Shading", "https://t/EP-2")]);
        assert_eq!(find_epic_url("Bid Shading v2 rollout", &map), Some("https://t/EP-2"));
        let map = urls(&[("Bid Shading v2 rollout", "https://t/EP-3")]);
        assert_eq!(find_epic_url("bid shading", &map), Some("https://t/EP-3"));
    }

    #[test]
    fn partial_title_matches_by_reverse_ratio() {
        let map = urls(&[(
            "Migration of data pipelines from spring batch to airflow",
            "https://t/EP-4",
        )]);
        assert_eq!(find_epic_url("Migration of pipelines", &map), Some("https://t/EP-4"));
    }

    #[test]
    fn unrelated_title_has_no_link() {
        let map = urls(&[(
            "Migration of data pipelines from spring batch to airflow",
            "https://t/EP-4",
        )]);
        assert_eq!(find_epic_url("Completely unrelated epic", &map), None);
    }

    #[test]
    fn best_scoring_candidate_wins() {
        let map = urls(&[
            ("Reporting dashboard filters", "https://t/weak"),
            ("Reporting dashboard export to csv", "https://t/strong"),
        ]);
        assert_eq!(
            find_epic_url("Dashboard export to csv for reporting teams", &map),
            Some("https://t/strong")
        );
    }

    #[test]
    fn punctuation_does_not_block_word_overlap() {
        let map = urls(&[("Segment sizing, estimates", "https://t/EP-5")]);
        assert_eq!(find_epic_url("Estimates for segment sizing!", &map), Some("https://t/EP-5"));
    }

    #[test]
    fn threshold_is_configurable() {
        let map = urls(&[("Alpha beta gamma delta", "https://t/EP-6")]);
        // 2 of 4 epic words, 2 of 3 query words
        assert_eq!(EpicMatcher::new(0.7).find("alpha beta omega", &map), None);
        assert_eq!(
            EpicMatcher::new(0.6).find("alpha beta omega", &map),
            Some("https://t/EP-6")
        );
    }

    #[test]
    fn empty_inputs_never_match() {
        let map = urls(&[("Anything", "https://t/EP-7")]);
        assert_eq!(find_epic_url("   ", &map), None);
        assert_eq!(find_epic_url("Anything", &EpicUrls::new()), None);
    }
}
