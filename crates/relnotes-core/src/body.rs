//! Recover [`Section`]s from consolidated prose.
//!
//! Input is whatever the consolidator produced for one product line: ideally
//! `#### [Epic](url)` headings followed by `Value Add:` and `Bug Fixes:`
//! blocks, but often looser prose. Classification is line by line and
//! best-effort; anything that cannot be placed becomes a plain note rather
//! than an error.
//!
//! Known limitation: a short line with no terminal punctuation is taken as a
//! section title when it starts a block, so a terse one-line note may be
//! promoted to a title.

use crate::matcher::{EpicMatcher, EpicUrls};
use crate::types::{Availability, Section};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const MAX_TITLE_CHARS: usize = 100;

static LINK_LINE_RE: OnceLock<Regex> = OnceLock::new();
static BULLET_RE: OnceLock<Regex> = OnceLock::new();
static INLINE_TAG_RE: OnceLock<Regex> = OnceLock::new();

fn link_line_re() -> &'static Regex {
    LINK_LINE_RE.get_or_init(|| Regex::new(r"^\[([^\]]+)\]\(([^)\s]+)\)\s*:?$").unwrap())
}

fn bullet_re() -> &'static Regex {
    BULLET_RE.get_or_init(|| Regex::new(r"^[●•*\-]\s*").unwrap())
}

fn inline_tag_re() -> &'static Regex {
    INLINE_TAG_RE.get_or_init(|| Regex::new(r"(?i)\s*\[(GA|FF)(?::[^\]]*)?\]\s*$").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Free,
    ValueAdd,
    BugFix,
}

/// Parses one product line's body.
#[derive(Debug, Clone)]
pub struct BodyParser<'a> {
    matcher: EpicMatcher,
    epic_urls: &'a EpicUrls,
    header: Option<(String, String)>,
}

impl<'a> BodyParser<'a> {
    pub fn new(epic_urls: &'a EpicUrls) -> Self {
        Self {
            matcher: EpicMatcher::default(),
            epic_urls,
            header: None,
        }
    }

    pub fn with_matcher(mut self, matcher: EpicMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Skip lines that repeat the product line header, e.g.
    /// `DSP Core PL1 - Release 4.0`.
    pub fn with_product_line(mut self, clean_name: &str, release_version: &str) -> Self {
        let number = release_version.replace("Release", "").trim().to_string();
        self.header = Some((clean_name.to_lowercase(), number));
        self
    }

    fn is_header_echo(&self, line: &str) -> bool {
        let Some((name, number)) = &self.header else {
            return false;
        };
        let lower = line.to_lowercase();
        !number.is_empty()
            && !name.is_empty()
            && lower.contains(name.as_str())
            && lower.contains("release")
            && line.contains(number.as_str())
    }

    pub fn parse(&self, text: &str) -> Vec<Section> {
        let mut state = ParseState::default();
        let mut started = false;

        for raw in text.lines() {
            let trimmed = raw.trim();
            if !started && trimmed.is_empty() {
                continue;
            }
            if self.is_header_echo(trimmed) {
                continue;
            }
            started = true;
            self.classify(&mut state, trimmed);
        }

        state.finish()
    }

    fn classify(&self, st: &mut ParseState, trimmed: &str) {
        if trimmed.is_empty() {
            st.mode = Mode::Free;
            st.at_boundary = true;
            return;
        }

        let unemphasized = trimmed.replace("**", "");
        let mut line = unemphasized.trim();
        let is_heading = line.starts_with('#');
        if is_heading {
            line = line.trim_start_matches('#').trim();
        }
        if line.is_empty() {
            return;
        }

        if let Some(caps) = link_line_re().captures(line) {
            st.start_section(caps[1].trim(), Some(caps[2].to_string()));
            return;
        }
        if is_heading {
            let url = self.matcher.find(line, self.epic_urls).map(str::to_string);
            st.start_section(line, url);
            return;
        }

        let lower = line.to_lowercase();
        if lower.starts_with("value add") {
            st.mode = Mode::ValueAdd;
            st.at_boundary = false;
            if let Some(rest) = after_colon(line) {
                let (rest, tag) = split_inline_tag(rest);
                let section = st.current();
                section.value_add_summary = Some(rest.to_string());
                if section.availability.is_none() {
                    section.availability = tag;
                }
            } else {
                st.current();
            }
            return;
        }
        if lower.starts_with("bug fix") {
            st.mode = Mode::BugFix;
            st.at_boundary = false;
            let first = after_colon(line).map(|rest| normalize_bug_bullet(split_inline_tag(rest).0));
            let section = st.current();
            section.bug_bullets.extend(first);
            return;
        }

        if let Some(tag) = Availability::from_label(line) {
            st.current().availability = Some(tag);
            st.mode = Mode::Free;
            st.at_boundary = false;
            return;
        }

        let bullet = bullet_re().find(line).map(|m| line[m.end()..].trim());
        let content = bullet.unwrap_or(line);

        match st.mode {
            Mode::ValueAdd => {
                let (text, tag) = split_inline_tag(content);
                let section = st.current();
                if !text.is_empty() {
                    section.value_add_bullets.push(text.to_string());
                }
                if section.availability.is_none() {
                    section.availability = tag;
                }
            }
            Mode::BugFix => {
                let (text, _) = split_inline_tag(content);
                if !text.is_empty() {
                    st.current().bug_bullets.push(normalize_bug_bullet(text));
                }
            }
            Mode::Free if bullet.is_some() => {
                let (text, tag) = split_inline_tag(content);
                let section = st.current();
                if !text.is_empty() {
                    section.value_add_bullets.push(text.to_string());
                }
                if section.availability.is_none() {
                    section.availability = tag;
                }
            }
            Mode::Free => {
                if let Some(url) = self.matcher.find(line, self.epic_urls) {
                    st.start_section(line, Some(url.to_string()));
                    return;
                }
                let may_open = st.at_boundary || st.current.as_ref().map_or(true, Section::has_content);
                if may_open && looks_like_title(line) {
                    debug!(line, "treating unlinked line as a section title");
                    st.start_section(line, None);
                    return;
                }
                st.current().notes.push(line.to_string());
            }
        }
        st.at_boundary = false;
    }
}

#[derive(Debug)]
struct ParseState {
    sections: Vec<Section>,
    current: Option<Section>,
    mode: Mode,
    at_boundary: bool,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            current: None,
            mode: Mode::Free,
            at_boundary: true,
        }
    }
}

impl ParseState {
    fn start_section(&mut self, title: &str, url: Option<String>) {
        self.flush();
        let mut section = Section::titled(title);
        section.url = url;
        self.current = Some(section);
        self.mode = Mode::Free;
        self.at_boundary = false;
    }

    /// The open section, creating an untitled one for preamble text.
    fn current(&mut self) -> &mut Section {
        self.current.get_or_insert_with(Section::default)
    }

    fn flush(&mut self) {
        if let Some(section) = self.current.take() {
            if !section.is_empty() {
                self.sections.push(section);
            }
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.sections
    }
}

/// Parse with the default matcher and no header filtering.
pub fn parse_body(text: &str, epic_urls: &EpicUrls) -> Vec<Section> {
    BodyParser::new(epic_urls).parse(text)
}

fn after_colon(line: &str) -> Option<&str> {
    line.split_once(':')
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
}

fn split_inline_tag(text: &str) -> (&str, Option<Availability>) {
    match inline_tag_re().captures(text) {
        Some(caps) => {
            let tag = if caps[1].eq_ignore_ascii_case("GA") {
                Availability::GeneralAvailability
            } else {
                Availability::FeatureFlag
            };
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            (text[..start].trim_end(), Some(tag))
        }
        None => (text, None),
    }
}

fn looks_like_title(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() < MAX_TITLE_CHARS
        && !line.ends_with('.')
        && !line.ends_with(':')
        && !lower.starts_with("http://")
        && !lower.starts_with("https://")
}

/// Make a bug-fix bullet read "Fixed ...".
pub fn normalize_bug_bullet(text: &str) -> String {
    let text = text.trim();
    let Some(first) = text.split_whitespace().next() else {
        return String::new();
    };
    let word = first
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    match word.as_str() {
        "fixed" => text.to_string(),
        "fix" | "fixes" => format!("Fixed{}", &text[first.len()..]),
        _ => {
            let is_acronym = first.chars().count() > 1
                && first
                    .chars()
                    .filter(|c| c.is_alphabetic())
                    .all(|c| c.is_uppercase());
            if is_acronym {
                format!("Fixed {text}")
            } else {
                let mut chars = text.chars();
                let head: String = chars.next().map(|c| c.to_lowercase().collect()).unwrap_or_default();
                format!("Fixed {head}{}", chars.as_str())
            }
        }
    }
}
