use crate::error::Result;
use crate::matcher::EpicUrls;
use crate::ordering::OTHER;
use crate::types::{Availability, Section};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_RELEASE_VERSION: &str = "Release 1.0";
pub const UNCATEGORIZED: &str = "Uncategorized";

const NOISE_PREFIXES: [&str; 5] = ["[DSP]", "[API]", "[UI]", "[BUG]", "[FEATURE]"];

// ---------------------------------------------------------------------------
// TicketRecord
// ---------------------------------------------------------------------------

/// A ticket as exported from the issue tracker. Nulls read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub issue_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub fix_version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub fix_version_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub epic_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub epic_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub epic_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub components: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub release_type: String,
}

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TicketRecord {
    pub fn is_bug(&self) -> bool {
        self.issue_type.eq_ignore_ascii_case("bug")
    }

    fn is_story_or_task(&self) -> bool {
        self.issue_type.eq_ignore_ascii_case("story") || self.issue_type.eq_ignore_ascii_case("task")
    }
}

/// Where tickets for a release come from.
pub trait TicketSource {
    fn fetch(&self, release_id: &str) -> Result<Vec<TicketRecord>>;
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

static PL_WITH_YEAR_RE: OnceLock<Regex> = OnceLock::new();
static PL_RE: OnceLock<Regex> = OnceLock::new();
static RELEASE_VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn pl_with_year_re() -> &'static Regex {
    PL_WITH_YEAR_RE.get_or_init(|| Regex::new(r"^(.+?)\s*\d{4}:\s*Release").unwrap())
}

fn pl_re() -> &'static Regex {
    PL_RE.get_or_init(|| Regex::new(r"^(.+?):\s*Release").unwrap())
}

fn release_version_re() -> &'static Regex {
    RELEASE_VERSION_RE.get_or_init(|| Regex::new(r"(Release\s*[\d.]+)").unwrap())
}

/// `DSP Core PL1 2026: Release 3.0` -> `DSP Core PL1`.
pub fn parse_product_line(fix_version: &str) -> String {
    pl_with_year_re()
        .captures(fix_version)
        .or_else(|| pl_re().captures(fix_version))
        .map(|caps| caps[1].trim().to_string())
        .filter(|pl| !pl.is_empty())
        .unwrap_or_else(|| OTHER.to_string())
}

/// `DSP Core PL1 2026: Release 3.0` -> `Release 3.0`.
pub fn parse_release_version(fix_version: &str) -> Option<String> {
    release_version_re()
        .captures(fix_version)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
}

/// Release tickets, deployment trackers and hotfix tickets stay out of the
/// notes.
pub fn is_excluded(ticket: &TicketRecord, release_key: Option<&str>) -> bool {
    if release_key.is_some_and(|k| !k.is_empty() && k == ticket.key) {
        return true;
    }
    let issue_type = ticket.issue_type.to_lowercase();
    if issue_type.contains("deployment") && issue_type.contains("tracker") {
        return true;
    }
    if ticket.fix_version.to_lowercase().contains("hotfix") {
        return true;
    }
    let summary = ticket.summary.to_lowercase();
    summary.contains("release") && (summary.contains("deployment") || summary.contains("release notes"))
}

/// Collapse whitespace and drop tracker prefixes like `[API]`.
pub fn clean_summary(text: &str) -> String {
    let mut out = text.split_whitespace().collect::<Vec<_>>().join(" ");
    loop {
        let head = out.as_bytes();
        let Some(prefix) = NOISE_PREFIXES
            .iter()
            .find(|p| head.len() >= p.len() && head[..p.len()].eq_ignore_ascii_case(p.as_bytes()))
        else {
            break;
        };
        out = out[prefix.len()..].trim().to_string();
    }
    out
}

/// Bugs never carry a tag; stories and tasks may get one from labels.
pub fn availability_for(ticket: &TicketRecord) -> Option<Availability> {
    if ticket.is_bug() {
        return None;
    }
    if let Some(tag) = Availability::from_release_type(&ticket.release_type) {
        return Some(tag);
    }
    if !ticket.is_story_or_task() {
        return None;
    }
    ticket.labels.iter().find_map(|label| {
        Availability::from_release_type(label).or_else(|| Availability::from_tracker_label(label))
    })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicBucket {
    pub name: String,
    pub url: Option<String>,
    pub tickets: Vec<TicketRecord>,
}

impl EpicBucket {
    pub fn availability(&self) -> Option<Availability> {
        self.tickets.iter().find_map(availability_for)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLineTickets {
    /// Product line key; may keep a trailing year.
    pub name: String,
    /// First fix version seen for the product line.
    pub fix_version: String,
    pub release_version: String,
    pub release_version_url: Option<String>,
    pub epics: Vec<EpicBucket>,
}

impl ProductLineTickets {
    pub fn ticket_count(&self) -> usize {
        self.epics.iter().map(|e| e.tickets.len()).sum()
    }

    pub fn epic_urls(&self) -> EpicUrls {
        self.epics
            .iter()
            .filter_map(|e| e.url.as_ref().map(|u| (e.name.clone(), u.clone())))
            .collect()
    }

    /// Cleaned, de-duplicated summaries in ticket order.
    pub fn summaries(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.epics
            .iter()
            .flat_map(|e| &e.tickets)
            .map(|t| clean_summary(&t.summary))
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect()
    }

    /// One section per epic straight from ticket summaries.
    pub fn fallback_sections(&self) -> Vec<Section> {
        self.epics
            .iter()
            .map(|epic| {
                let mut section = Section::titled(epic.name.clone());
                section.url = epic.url.clone();
                for ticket in &epic.tickets {
                    let summary = clean_summary(&ticket.summary);
                    if summary.is_empty() {
                        continue;
                    }
                    if ticket.is_bug() {
                        section.bug_bullets.push(summary);
                    } else {
                        section.value_add_bullets.push(summary);
                    }
                }
                section.availability = epic.availability();
                section
            })
            .collect()
    }
}

/// Bucket tickets by product line, then epic, both in first-seen order.
pub fn group_tickets(tickets: &[TicketRecord], release_key: Option<&str>) -> Vec<ProductLineTickets> {
    let mut groups: Vec<ProductLineTickets> = Vec::new();

    for ticket in tickets {
        if is_excluded(ticket, release_key) {
            debug!(key = ticket.key.as_str(), "skipping excluded ticket");
            continue;
        }
        let pl = parse_product_line(&ticket.fix_version);
        let idx = match groups.iter().position(|g| g.name == pl) {
            Some(i) => i,
            None => {
                groups.push(ProductLineTickets {
                    name: pl,
                    fix_version: ticket.fix_version.clone(),
                    release_version: parse_release_version(&ticket.fix_version)
                        .unwrap_or_else(|| DEFAULT_RELEASE_VERSION.to_string()),
                    release_version_url: None,
                    epics: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        if group.release_version_url.is_none() && !ticket.fix_version_url.is_empty() {
            group.release_version_url = Some(ticket.fix_version_url.clone());
        }

        let epic_name = match ticket.epic_name.trim() {
            "" => UNCATEGORIZED,
            name => name,
        };
        let epic = match group.epics.iter().position(|e| e.name == epic_name) {
            Some(i) => &mut group.epics[i],
            None => {
                group.epics.push(EpicBucket {
                    name: epic_name.to_string(),
                    url: None,
                    tickets: Vec::new(),
                });
                let last = group.epics.len() - 1;
                &mut group.epics[last]
            }
        };
        if epic.url.is_none() && !ticket.epic_url.is_empty() {
            epic.url = Some(ticket.epic_url.clone());
        }
        epic.tickets.push(ticket.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(key: &str, fix_version: &str, epic: &str, summary: &str) -> TicketRecord {
        TicketRecord {
            key: key.to_string(),
            summary: summary.to_string(),
            issue_type: "Story".to_string(),
            fix_version: fix_version.to_string(),
            epic_name: epic.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn product_line_from_fix_version() {
        assert_eq!(parse_product_line("DSP Core PL1 2026: Release 3.0"), "DSP Core PL1");
        assert_eq!(parse_product_line("Developer Experience: Release 8.0"), "Developer Experience");
        assert_eq!(parse_product_line("Random version"), "Other");
        assert_eq!(parse_product_line(""), "Other");
    }

    #[test]
    fn release_version_from_fix_version() {
        assert_eq!(
            parse_release_version("DSP Core PL1 2026: Release 3.0").as_deref(),
            Some("Release 3.0")
        );
        assert_eq!(parse_release_version("Media: Release 5.1.2").as_deref(), Some("Release 5.1.2"));
        assert_eq!(parse_release_version("Media"), None);
    }

    #[test]
    fn exclusions() {
        let mut t = ticket("DI-1", "Media: Release 1.0", "", "Normal work");
        assert!(!is_excluded(&t, None));
        assert!(is_excluded(&t, Some("DI-1")));

        t.issue_type = "Deployment Tracker".to_string();
        assert!(is_excluded(&t, None));

        let hotfix = ticket("DI-2", "Media Hotfix: Release 1.1", "", "Patch");
        assert!(is_excluded(&hotfix, None));

        let release = ticket("DI-3", "", "", "Release 5th February 2026 deployment");
        assert!(is_excluded(&release, None));
    }

    #[test]
    fn clean_summary_strips_noise() {
        assert_eq!(clean_summary("  [API]   Faster   export "), "Faster export");
        assert_eq!(clean_summary("[ui][bug] Broken button"), "Broken button");
        assert_eq!(clean_summary("Plain"), "Plain");
    }

    #[test]
    fn clean_summary_leaves_non_ascii_lookalikes_alone() {
        // dotless i and long s uppercase to ASCII but are two bytes wide
        assert_eq!(clean_summary("[uı] Broken button"), "[uı] Broken button");
        assert_eq!(clean_summary("[API] [ſ] Faster export"), "[ſ] Faster export");
        assert_eq!(clean_summary("[Api] ıd sync"), "ıd sync");
    }

    #[test]
    fn availability_rules() {
        let mut story = ticket("DI-1", "", "", "s");
        story.labels = vec!["team-x".into(), "GA".into()];
        assert_eq!(availability_for(&story), Some(Availability::GeneralAvailability));

        let mut bug = story.clone();
        bug.issue_type = "Bug".to_string();
        bug.release_type = "Feature Flag".to_string();
        assert_eq!(availability_for(&bug), None);

        let mut epic = story.clone();
        epic.issue_type = "Epic".to_string();
        epic.labels = vec!["ff".into()];
        assert_eq!(availability_for(&epic), None);
        epic.release_type = "Feature Flag".to_string();
        assert_eq!(availability_for(&epic), Some(Availability::FeatureFlag));
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let mut a = ticket("DI-1", "Media PL1 2026: Release 5.0", "Ops UI", "OA flag");
        a.fix_version_url = "https://t/v/media".to_string();
        a.epic_url = "https://t/e/ops".to_string();
        let b = ticket("DI-2", "DSP: Release 4.0", "Forecasting", "FCAP to API");
        let c = ticket("DI-3", "Media PL1 2026: Release 5.0", "", "Loose ticket");
        let mut d = ticket("DI-4", "Media PL1 2026: Release 5.0", "Ops UI", "OA flag");
        d.issue_type = "Bug".to_string();

        let groups = group_tickets(&[a, b, c, d], None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Media PL1");
        assert_eq!(groups[0].release_version, "Release 5.0");
        assert_eq!(groups[0].release_version_url.as_deref(), Some("https://t/v/media"));
        let epics: Vec<&str> = groups[0].epics.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(epics, vec!["Ops UI", "Uncategorized"]);
        assert_eq!(groups[0].ticket_count(), 3);
        assert_eq!(groups[0].epic_urls().get("Ops UI").map(String::as_str), Some("https://t/e/ops"));
        assert_eq!(groups[0].summaries(), vec!["OA flag", "Loose ticket"]);

        let sections = groups[0].fallback_sections();
        assert_eq!(sections[0].value_add_bullets, vec!["OA flag"]);
        assert_eq!(sections[0].bug_bullets, vec!["OA flag"]);
        assert_eq!(groups[1].name, "DSP");
    }

    #[test]
    fn missing_release_version_defaults() {
        let groups = group_tickets(&[ticket("DI-9", "", "", "Orphan")], None);
        assert_eq!(groups[0].name, "Other");
        assert_eq!(groups[0].release_version, DEFAULT_RELEASE_VERSION);
    }

    #[test]
    fn null_fields_deserialize_as_empty() {
        let json = r#"{"key": "DI-7", "summary": null, "labels": null, "epic_name": null, "issue_type": "Task"}"#;
        let t: TicketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(t.summary, "");
        assert!(t.labels.is_empty());
        assert_eq!(t.issue_type, "Task");
    }
}
