//! Turning grouped tickets into a [`Release`].
//!
//! Prose comes from a [`ProseConsolidator`] (an LLM in production). When it
//! fails, or when no consolidated notes exist for a product line, the
//! deterministic [`FallbackConsolidator`] output is used instead so a release
//! can always be rendered.

use crate::body::BodyParser;
use crate::config::Config;
use crate::error::Result;
use crate::layout::{BUG_FIXES, VALUE_ADD};
use crate::matcher::{EpicMatcher, EpicUrls};
use crate::ordering::clean_pl_name;
use crate::snapshot::ProcessedNotes;
use crate::tickets::{ProductLineTickets, DEFAULT_RELEASE_VERSION};
use crate::types::{ProductLineGroup, Release, Section};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub trait ProseConsolidator {
    /// One-line TL;DR for a product line.
    fn consolidate(&self, group: &ProductLineTickets, summaries: &[String]) -> Result<String>;

    /// Body text in the shape [`BodyParser`] reads.
    fn consolidate_body(&self, group: &ProductLineTickets, sections: &[Section]) -> Result<String>;
}

/// Joins summaries and lists sections verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackConsolidator;

impl ProseConsolidator for FallbackConsolidator {
    fn consolidate(&self, _group: &ProductLineTickets, summaries: &[String]) -> Result<String> {
        Ok(summaries.join("; "))
    }

    fn consolidate_body(&self, _group: &ProductLineTickets, sections: &[Section]) -> Result<String> {
        Ok(sections_to_markdown(sections))
    }
}

pub fn sections_to_markdown(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        match &section.url {
            Some(url) => out.push_str(&format!("#### [{}]({url})\n", section.title)),
            None => out.push_str(&format!("#### {}\n", section.title)),
        }
        for note in &section.notes {
            out.push_str(note);
            out.push('\n');
        }
        if section.has_value_add() {
            match &section.value_add_summary {
                Some(summary) => out.push_str(&format!("{VALUE_ADD} {summary}\n")),
                None => out.push_str(&format!("{VALUE_ADD}\n")),
            }
            for bullet in &section.value_add_bullets {
                out.push_str(&format!("- {bullet}\n"));
            }
        }
        if let Some(tag) = section.availability {
            out.push_str(tag.label());
            out.push('\n');
        }
        if !section.bug_bullets.is_empty() {
            out.push_str(&format!("\n{BUG_FIXES}\n"));
            for bullet in &section.bug_bullets {
                out.push_str(&format!("- {bullet}\n"));
            }
        }
        out.push('\n');
    }
    out
}

fn non_empty(text: Option<&String>) -> Option<&str> {
    text.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Build the release for rendering. Product lines from `notes` come first in
/// their recorded order, then any product line only present in `groups`.
pub fn assemble_release(
    config: &Config,
    title: &str,
    notes: Option<&ProcessedNotes>,
    groups: &[ProductLineTickets],
    consolidator: &dyn ProseConsolidator,
) -> Release {
    let empty = ProcessedNotes::default();
    let notes = notes.unwrap_or(&empty);
    let matcher = EpicMatcher::new(config.layout.match_threshold);

    let mut names: Vec<&str> = notes.product_lines.iter().map(String::as_str).collect();
    for group in groups {
        if !names.contains(&group.name.as_str()) {
            names.push(&group.name);
        }
    }

    let mut release = Release {
        title: title.to_string(),
        key_deployments: BTreeMap::new(),
        groups: Vec::new(),
    };

    for name in names {
        let tickets = groups.iter().find(|g| g.name == name);

        let mut epic_urls: EpicUrls = tickets.map(ProductLineTickets::epic_urls).unwrap_or_default();
        if let Some(recorded) = notes.epic_urls_by_pl.get(name) {
            epic_urls.extend(recorded.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let release_version = non_empty(notes.release_versions.get(name))
            .map(str::to_string)
            .or_else(|| tickets.map(|t| t.release_version.clone()))
            .unwrap_or_else(|| DEFAULT_RELEASE_VERSION.to_string());
        let release_version_url = non_empty(notes.fix_version_urls.get(name))
            .map(str::to_string)
            .or_else(|| tickets.and_then(|t| t.release_version_url.clone()));

        let tldr = match (non_empty(notes.tldr_by_pl.get(name)), tickets) {
            (Some(text), _) => Some(text.to_string()),
            (None, Some(t)) => Some(tldr_for(t, consolidator)),
            (None, None) => None,
        };
        if let Some(tldr) = tldr.filter(|s| !s.trim().is_empty()) {
            release.key_deployments.insert(name.to_string(), tldr);
        }

        let body = match (non_empty(notes.body_by_pl.get(name)), tickets) {
            (Some(text), _) => text.to_string(),
            (None, Some(t)) => body_for(t, consolidator),
            (None, None) => String::new(),
        };

        let sections = BodyParser::new(&epic_urls)
            .with_matcher(matcher)
            .with_product_line(&clean_pl_name(name), &release_version)
            .parse(&body);
        debug!(product_line = name, sections = sections.len(), "assembled product line");

        release.groups.push(ProductLineGroup {
            name: name.to_string(),
            release_version,
            release_version_url,
            epic_urls,
            sections,
        });
    }

    release
}

fn tldr_for(group: &ProductLineTickets, consolidator: &dyn ProseConsolidator) -> String {
    let summaries = group.summaries();
    match consolidator.consolidate(group, &summaries) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => summaries.join("; "),
        Err(e) => {
            warn!(product_line = group.name.as_str(), error = %e, "TL;DR consolidation failed, joining summaries");
            summaries.join("; ")
        }
    }
}

fn body_for(group: &ProductLineTickets, consolidator: &dyn ProseConsolidator) -> String {
    let sections = group.fallback_sections();
    match consolidator.consolidate_body(group, &sections) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => sections_to_markdown(&sections),
        Err(e) => {
            warn!(product_line = group.name.as_str(), error = %e, "body consolidation failed, listing tickets");
            sections_to_markdown(&sections)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelnotesError;
    use crate::tickets::{group_tickets, TicketRecord};
    use crate::types::Availability;

    struct Failing;

    impl ProseConsolidator for Failing {
        fn consolidate(&self, _: &ProductLineTickets, _: &[String]) -> Result<String> {
            Err(RelnotesError::Consolidator("rate limited".into()))
        }

        fn consolidate_body(&self, _: &ProductLineTickets, _: &[Section]) -> Result<String> {
            Err(RelnotesError::Consolidator("rate limited".into()))
        }
    }

    fn tickets() -> Vec<ProductLineTickets> {
        let story = TicketRecord {
            key: "DI-1".into(),
            summary: "[API] FCAP logic moved to API".into(),
            issue_type: "Story".into(),
            fix_version: "DSP 2026: Release 4.0".into(),
            fix_version_url: "https://t/v4".into(),
            epic_name: "Forecasting".into(),
            epic_url: "https://t/EP-9".into(),
            labels: vec!["GA".into()],
            ..Default::default()
        };
        let bug = TicketRecord {
            key: "DI-2".into(),
            summary: "Daily cap rounding".into(),
            issue_type: "Bug".into(),
            fix_version: "DSP 2026: Release 4.0".into(),
            epic_name: "Forecasting".into(),
            ..Default::default()
        };
        group_tickets(&[story, bug], None)
    }

    #[test]
    fn fallback_body_parses_back_into_sections() {
        let groups = tickets();
        let release = assemble_release(&Config::default(), "T", None, &groups, &FallbackConsolidator);
        assert_eq!(release.key_deployments["DSP"], "FCAP logic moved to API; Daily cap rounding");

        let group = &release.groups[0];
        assert_eq!(group.release_version, "Release 4.0");
        assert_eq!(group.release_version_url.as_deref(), Some("https://t/v4"));
        assert_eq!(group.sections.len(), 1);
        let section = &group.sections[0];
        assert_eq!(section.title, "Forecasting");
        assert_eq!(section.url.as_deref(), Some("https://t/EP-9"));
        assert_eq!(section.value_add_bullets, vec!["FCAP logic moved to API"]);
        assert_eq!(section.availability, Some(Availability::GeneralAvailability));
        assert_eq!(section.bug_bullets, vec!["Fixed daily cap rounding"]);
    }

    #[test]
    fn failing_consolidator_falls_back() {
        let groups = tickets();
        let failing = assemble_release(&Config::default(), "T", None, &groups, &Failing);
        let fallback = assemble_release(&Config::default(), "T", None, &groups, &FallbackConsolidator);
        assert_eq!(failing, fallback);
    }

    #[test]
    fn processed_notes_take_precedence() {
        let groups = tickets();
        let mut notes = ProcessedNotes {
            product_lines: vec!["Media PL1".into(), "DSP".into()],
            ..Default::default()
        };
        notes.tldr_by_pl.insert("DSP".into(), "Forecasting faster".into());
        notes.body_by_pl.insert(
            "DSP".into(),
            "DSP - Release 4.0\nForecasting\nValue Add:\nFCAP moved server side.\nGeneral Availability".into(),
        );
        notes.release_versions.insert("Media PL1".into(), "Release 5.0".into());

        let release = assemble_release(&Config::default(), "T", Some(&notes), &groups, &Failing);
        let names: Vec<&str> = release.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Media PL1", "DSP"]);
        assert_eq!(release.key_deployments["DSP"], "Forecasting faster");
        assert!(!release.key_deployments.contains_key("Media PL1"));
        assert_eq!(release.groups[0].release_version, "Release 5.0");
        assert!(release.groups[0].sections.is_empty());

        let dsp = &release.groups[1];
        assert_eq!(dsp.sections.len(), 1);
        assert_eq!(dsp.sections[0].url.as_deref(), Some("https://t/EP-9"));
        assert_eq!(dsp.sections[0].value_add_bullets, vec!["FCAP moved server side."]);
    }

    #[test]
    fn markdown_lists_every_part() {
        let section = Section {
            title: "Ops UI".into(),
            url: None,
            notes: vec!["Context.".into()],
            value_add_summary: None,
            value_add_bullets: vec!["OA flag".into()],
            bug_bullets: vec!["Broken filter".into()],
            availability: Some(Availability::FeatureFlag),
        };
        assert_eq!(
            sections_to_markdown(&[section]),
            "#### Ops UI\nContext.\nValue Add:\n- OA flag\nFeature Flag\n\nBug Fixes:\n- Broken filter\n\n"
        );
    }
}
