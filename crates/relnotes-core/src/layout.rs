//! Offset-tracked layout of a release into document operations.
//!
//! The target document is one flat buffer addressed from offset 1, and every
//! insert shifts everything after it. All text of a pass is therefore inserted
//! through a single forward cursor, and styles are recorded as spans over
//! offsets captured before the cursor advanced. Spans are turned into style
//! operations only after the last insert, starting with a reset over the whole
//! new range so inserted text never keeps the style of its left neighbour.

use crate::config::{LayoutConfig, Palette, RgbColor};
use crate::error::{RelnotesError, Result};
use crate::matcher::EpicMatcher;
use crate::ordering::{self, clean_pl_name, OTHER};
use crate::types::{ProductLineGroup, Release, Section};
use serde::{Deserialize, Serialize};

/// First addressable offset of a document body.
pub const DOCUMENT_START: usize = 1;

pub const BULLET: &str = "• ";
pub const TLDR_DIVIDER: &str = "------------------TL;DR:------------------";
pub const KEY_DEPLOYMENTS: &str = "Key Deployments:";
pub const VALUE_ADD: &str = "Value Add:";
pub const BUG_FIXES: &str = "Bug Fixes:";
pub const SEPARATOR_CHAR: char = '═';

/// Length in document offsets. The document API counts UTF-16 code units.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn category_divider(category: &str) -> String {
    format!("------------------{category}------------------")
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOp {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpanKind {
    Bold,
    Link { url: String },
    Color { color: RgbColor },
    Heading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

/// Character attributes to set. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<RgbColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StyleAction {
    /// Clear bold, underline, link and colour, and return paragraphs to
    /// normal text.
    Reset,
    Text { style: TextStyle },
    Heading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOp {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub action: StyleAction,
}

/// Span of a single insert, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// LayoutBuilder
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LayoutBuilder {
    origin: usize,
    cursor: usize,
    inserts: Vec<InsertOp>,
    spans: Vec<StyleSpan>,
}

impl LayoutBuilder {
    pub fn new(origin: usize) -> Result<Self> {
        if origin < DOCUMENT_START {
            return Err(RelnotesError::OffsetInvariant(format!(
                "origin {origin} is before the document start"
            )));
        }
        Ok(Self {
            origin,
            cursor: origin,
            inserts: Vec::new(),
            spans: Vec::new(),
        })
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert at the cursor and advance it. Empty text is skipped.
    pub fn insert(&mut self, text: &str) -> Result<Inserted> {
        self.insert_at(self.cursor, text)
    }

    /// Insert at an explicit offset, which must equal the cursor.
    pub fn insert_at(&mut self, index: usize, text: &str) -> Result<Inserted> {
        if index != self.cursor {
            return Err(RelnotesError::OffsetInvariant(format!(
                "insert at {index} but cursor is at {}",
                self.cursor
            )));
        }
        let start = self.cursor;
        if text.is_empty() {
            return Ok(Inserted { start, end: start });
        }
        self.inserts.push(InsertOp {
            index: start,
            text: text.to_string(),
        });
        self.cursor += text_len(text);
        Ok(Inserted {
            start,
            end: self.cursor,
        })
    }

    /// Record a style over already inserted text.
    pub fn mark(&mut self, start: usize, end: usize, kind: SpanKind) -> Result<()> {
        if end <= start {
            return Err(RelnotesError::OffsetInvariant(format!(
                "empty or inverted span [{start}, {end})"
            )));
        }
        if start < self.origin || end > self.cursor {
            return Err(RelnotesError::OffsetInvariant(format!(
                "span [{start}, {end}) outside inserted range [{}, {})",
                self.origin, self.cursor
            )));
        }
        self.spans.push(StyleSpan { start, end, kind });
        Ok(())
    }

    /// Insert `text` and style its first `styled_len` offsets.
    fn insert_styled(&mut self, text: &str, styled_len: usize, kinds: Vec<SpanKind>) -> Result<Inserted> {
        let ins = self.insert(text)?;
        if styled_len > 0 {
            for kind in kinds {
                self.mark(ins.start, ins.start + styled_len, kind)?;
            }
        }
        Ok(ins)
    }

    /// Turn the collected spans into ordered style operations.
    pub fn finish(self, link_color: RgbColor) -> Layout {
        let mut styles = Vec::new();
        if self.cursor > self.origin {
            styles.push(StyleOp {
                start: self.origin,
                end: self.cursor,
                action: StyleAction::Reset,
            });
        }

        let links: Vec<&StyleSpan> = self
            .spans
            .iter()
            .filter(|s| matches!(s.kind, SpanKind::Link { .. }))
            .collect();
        let same_range_link = |span: &StyleSpan| {
            links
                .iter()
                .any(|l| l.start == span.start && l.end == span.end)
        };

        for span in &self.spans {
            if span.kind == SpanKind::Bold && !same_range_link(span) {
                styles.push(StyleOp {
                    start: span.start,
                    end: span.end,
                    action: StyleAction::Text {
                        style: TextStyle {
                            bold: Some(true),
                            ..Default::default()
                        },
                    },
                });
            }
        }

        for span in &self.spans {
            if let SpanKind::Link { url } = &span.kind {
                let bold = self
                    .spans
                    .iter()
                    .any(|b| b.kind == SpanKind::Bold && b.start == span.start && b.end == span.end);
                styles.push(StyleOp {
                    start: span.start,
                    end: span.end,
                    action: StyleAction::Text {
                        style: TextStyle {
                            bold: bold.then_some(true),
                            underline: Some(false),
                            link: Some(url.clone()),
                            foreground: Some(link_color),
                        },
                    },
                });
            }
        }

        for span in &self.spans {
            if let SpanKind::Color { color } = span.kind {
                styles.push(StyleOp {
                    start: span.start,
                    end: span.end,
                    action: StyleAction::Text {
                        style: TextStyle {
                            foreground: Some(color),
                            ..Default::default()
                        },
                    },
                });
            }
        }

        for span in &self.spans {
            if span.kind == SpanKind::Heading {
                styles.push(StyleOp {
                    start: span.start,
                    end: span.end,
                    action: StyleAction::Heading,
                });
            }
        }

        Layout {
            origin: self.origin,
            end: self.cursor,
            inserts: self.inserts,
            spans: self.spans,
            styles,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Result of one render pass: inserts to apply first, then styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub origin: usize,
    /// Cursor after the last insert.
    pub end: usize,
    pub inserts: Vec<InsertOp>,
    pub spans: Vec<StyleSpan>,
    pub styles: Vec<StyleOp>,
}

impl Layout {
    /// Concatenated insert text.
    pub fn text(&self) -> String {
        self.inserts.iter().map(|op| op.text.as_str()).collect()
    }

    /// Offsets occupied by the pass.
    pub fn len(&self) -> usize {
        self.end - self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.origin
    }

    /// Re-check the offset bookkeeping of a finished pass.
    pub fn validate(&self) -> Result<()> {
        let mut expected = self.origin;
        for op in &self.inserts {
            if op.index != expected {
                return Err(RelnotesError::OffsetInvariant(format!(
                    "insert at {} expected at {expected}",
                    op.index
                )));
            }
            expected += text_len(&op.text);
        }
        if expected != self.end {
            return Err(RelnotesError::OffsetInvariant(format!(
                "inserts end at {expected} but layout ends at {}",
                self.end
            )));
        }
        for op in &self.styles {
            if op.end <= op.start || op.start < self.origin || op.end > self.end {
                return Err(RelnotesError::OffsetInvariant(format!(
                    "style [{}, {}) outside [{}, {})",
                    op.start, op.end, self.origin, self.end
                )));
            }
        }
        if let Some(first) = self.styles.first() {
            if first.action != StyleAction::Reset
                || first.start != self.origin
                || first.end != self.end
            {
                return Err(RelnotesError::OffsetInvariant(
                    "first style operation must reset the whole inserted range".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Spans whose covered text equals `needle`.
    pub fn spans_over<'a>(&'a self, needle: &str) -> Vec<&'a StyleSpan> {
        let units: Vec<u16> = self.text().encode_utf16().collect();
        self.spans
            .iter()
            .filter(|s| {
                let from = s.start - self.origin;
                let to = s.end - self.origin;
                to <= units.len() && String::from_utf16_lossy(&units[from..to]) == needle
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// LayoutEngine
// ---------------------------------------------------------------------------

/// Renders a [`Release`] in the fixed daily-summary template.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    matcher: EpicMatcher,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let matcher = EpicMatcher::new(config.match_threshold);
        Self { config, matcher }
    }

    fn palette(&self) -> &Palette {
        &self.config.palette
    }

    /// Render at the top of the document.
    pub fn render(&self, release: &Release) -> Result<Layout> {
        self.render_at(DOCUMENT_START, release)
    }

    /// Render starting at `origin`. Never deletes existing text.
    pub fn render_at(&self, origin: usize, release: &Release) -> Result<Layout> {
        let mut b = LayoutBuilder::new(origin)?;

        self.emit_title(&mut b, &release.title)?;
        self.emit_key_deployments(&mut b, release)?;

        let buckets = ordering::group_by_category(
            &release.groups,
            &self.config.categories,
            &self.config.product_line_order,
        );
        for (category, groups) in buckets {
            let divider = category_divider(category);
            b.insert_styled(
                &format!("{divider}\n\n"),
                text_len(&divider),
                vec![SpanKind::Color {
                    color: self.palette().divider,
                }],
            )?;
            for group in groups {
                self.emit_group(&mut b, group)?;
            }
        }

        let rule: String = std::iter::repeat(SEPARATOR_CHAR)
            .take(self.config.separator_width)
            .collect();
        b.insert(&format!("\n{rule}\n\n"))?;

        let layout = b.finish(self.palette().link);
        layout.validate()?;
        Ok(layout)
    }

    fn emit_title(&self, b: &mut LayoutBuilder, title: &str) -> Result<()> {
        let title = title.trim();
        b.insert_styled(
            &format!("{title}\n\n"),
            text_len(title),
            vec![SpanKind::Bold, SpanKind::Heading],
        )?;
        b.insert_styled(
            &format!("{TLDR_DIVIDER}\n\n"),
            text_len(TLDR_DIVIDER),
            vec![SpanKind::Color {
                color: self.palette().divider,
            }],
        )?;
        b.insert_styled(
            &format!("{KEY_DEPLOYMENTS}\n"),
            text_len(KEY_DEPLOYMENTS),
            vec![SpanKind::Bold],
        )?;
        Ok(())
    }

    fn emit_key_deployments(&self, b: &mut LayoutBuilder, release: &Release) -> Result<()> {
        let mut names: Vec<&str> = release.groups.iter().map(|g| g.name.as_str()).collect();
        for name in release.key_deployments.keys() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        let ordered = ordering::order_product_lines(&names, &self.config.product_line_order, |n| *n);

        for name in ordered {
            let Some(summary) = release.key_deployments.get(*name) else {
                continue;
            };
            let clean = clean_pl_name(name);
            if clean == OTHER || summary.trim().is_empty() {
                continue;
            }
            let ins = b.insert(&clean)?;
            b.mark(ins.start, ins.end, SpanKind::Bold)?;
            if let Some(url) = release
                .group(name)
                .and_then(|g| g.release_version_url.as_deref())
                .filter(|u| !u.is_empty())
            {
                b.mark(ins.start, ins.end, SpanKind::Link { url: url.to_string() })?;
            }
            b.insert(&format!(" - {}\n", summary.trim()))?;
        }
        b.insert("\n")?;
        Ok(())
    }

    fn emit_group(&self, b: &mut LayoutBuilder, group: &ProductLineGroup) -> Result<()> {
        let clean = clean_pl_name(&group.name);
        b.insert(&format!("{clean}: "))?;
        let version = if group.release_version.trim().is_empty() {
            "Release 1.0"
        } else {
            group.release_version.trim()
        };
        let ins = b.insert(&format!("{version}\n"))?;
        if let Some(url) = group.release_version_url.as_deref().filter(|u| !u.is_empty()) {
            b.mark(
                ins.start,
                ins.start + text_len(version),
                SpanKind::Link { url: url.to_string() },
            )?;
        }

        for section in &group.sections {
            self.emit_section(b, group, section)?;
        }
        b.insert("\n")?;
        Ok(())
    }

    fn emit_section(&self, b: &mut LayoutBuilder, group: &ProductLineGroup, section: &Section) -> Result<()> {
        let title = section.title.trim();
        if !title.is_empty() {
            let ins = b.insert(&format!("{title}\n"))?;
            let end = ins.start + text_len(title);
            b.mark(ins.start, end, SpanKind::Bold)?;
            let url = section
                .url
                .as_deref()
                .filter(|u| !u.is_empty())
                .or_else(|| self.matcher.find(title, &group.epic_urls));
            if let Some(url) = url {
                b.mark(ins.start, end, SpanKind::Link { url: url.to_string() })?;
            }
        }

        for note in &section.notes {
            b.insert(&format!("{}\n", note.trim()))?;
        }

        if section.has_value_add() {
            let header = match section.value_add_summary.as_deref().map(str::trim) {
                Some(summary) if !summary.is_empty() => format!("{VALUE_ADD} {summary}\n"),
                _ => format!("{VALUE_ADD}\n"),
            };
            b.insert_styled(&header, text_len(VALUE_ADD), vec![SpanKind::Bold])?;
            for bullet in &section.value_add_bullets {
                b.insert(&format!("{BULLET}{}\n", bullet.trim()))?;
            }
        }

        if let Some(tag) = section.availability {
            b.insert_styled(
                &format!("{}\n", tag.label()),
                text_len(tag.label()),
                vec![SpanKind::Color {
                    color: self.palette().status,
                }],
            )?;
        }

        if !section.bug_bullets.is_empty() {
            b.insert_styled(&format!("{BUG_FIXES}\n"), text_len(BUG_FIXES), vec![SpanKind::Bold])?;
            for bullet in &section.bug_bullets {
                b.insert(&format!("{BULLET}{}\n", bullet.trim()))?;
            }
        }

        b.insert("\n")?;
        Ok(())
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DIVIDER_GRAY, LINK_BLUE, STATUS_GREEN};
    use crate::types::Availability;
    use std::collections::BTreeMap;

    fn dsp_release(url: Option<&str>) -> Release {
        Release {
            title: "Daily Deployment Summary: 5th February 2026".to_string(),
            key_deployments: BTreeMap::from([(
                "DSP".to_string(),
                "Forecasting moved to the API".to_string(),
            )]),
            groups: vec![ProductLineGroup {
                name: "DSP".to_string(),
                release_version: "Release 4.0".to_string(),
                release_version_url: url.map(str::to_string),
                epic_urls: BTreeMap::from([(
                    "Forecasting".to_string(),
                    "https://t/EP-9".to_string(),
                )]),
                sections: vec![Section {
                    title: "Forecasting".to_string(),
                    value_add_bullets: vec!["FCAP logic moved to API".to_string()],
                    availability: Some(Availability::GeneralAvailability),
                    ..Default::default()
                }],
            }],
        }
    }

    fn assert_in_order(text: &str, parts: &[&str]) {
        let mut from = 0;
        for part in parts {
            let found = text[from..]
                .find(part)
                .unwrap_or_else(|| panic!("{part:?} not found after byte {from} in:\n{text}"));
            from += found + part.len();
        }
    }

    // -----------------------------------------------------------------------
    // Builder invariants
    // -----------------------------------------------------------------------

    #[test]
    fn builder_advances_cursor_by_utf16_units() {
        let mut b = LayoutBuilder::new(1).unwrap();
        let a = b.insert("ab").unwrap();
        let c = b.insert("═\n").unwrap();
        let d = b.insert("😀").unwrap();
        assert_eq!((a.start, a.end), (1, 3));
        assert_eq!((c.start, c.end), (3, 5));
        assert_eq!((d.start, d.end), (5, 7));
    }

    #[test]
    fn builder_skips_empty_text() {
        let mut b = LayoutBuilder::new(4).unwrap();
        let ins = b.insert("").unwrap();
        assert_eq!((ins.start, ins.end), (4, 4));
        let layout = b.finish(LINK_BLUE);
        assert!(layout.inserts.is_empty());
        assert!(layout.styles.is_empty());
    }

    #[test]
    fn builder_rejects_backward_insert() {
        let mut b = LayoutBuilder::new(1).unwrap();
        b.insert("hello").unwrap();
        let err = b.insert_at(3, "x").unwrap_err();
        assert!(matches!(err, RelnotesError::OffsetInvariant(_)));
    }

    #[test]
    fn builder_rejects_bad_spans() {
        let mut b = LayoutBuilder::new(10).unwrap();
        b.insert("hello").unwrap();
        assert!(b.mark(12, 12, SpanKind::Bold).is_err());
        assert!(b.mark(13, 11, SpanKind::Bold).is_err());
        assert!(b.mark(9, 12, SpanKind::Bold).is_err());
        assert!(b.mark(11, 16, SpanKind::Bold).is_err());
        assert!(b.mark(10, 15, SpanKind::Bold).is_ok());
    }

    #[test]
    fn origin_before_document_start_is_rejected() {
        assert!(matches!(
            LayoutBuilder::new(0),
            Err(RelnotesError::OffsetInvariant(_))
        ));
    }

    #[test]
    fn finish_orders_reset_bold_link_color_heading() {
        let mut b = LayoutBuilder::new(1).unwrap();
        b.insert("Title\nName\nTag\n").unwrap();
        b.mark(1, 6, SpanKind::Heading).unwrap();
        b.mark(12, 15, SpanKind::Color { color: STATUS_GREEN }).unwrap();
        b.mark(7, 11, SpanKind::Link { url: "u".into() }).unwrap();
        b.mark(7, 11, SpanKind::Bold).unwrap();
        b.mark(1, 6, SpanKind::Bold).unwrap();
        let layout = b.finish(LINK_BLUE);

        assert_eq!(layout.styles.len(), 5);
        assert_eq!(layout.styles[0].action, StyleAction::Reset);
        assert_eq!((layout.styles[0].start, layout.styles[0].end), (1, 16));
        // bold on the title only; the linked name is merged
        assert_eq!((layout.styles[1].start, layout.styles[1].end), (1, 6));
        let StyleAction::Text { style } = &layout.styles[2].action else {
            panic!("expected link style");
        };
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.underline, Some(false));
        assert_eq!(style.link.as_deref(), Some("u"));
        assert_eq!(style.foreground, Some(LINK_BLUE));
        assert!(matches!(layout.styles[3].action, StyleAction::Text { .. }));
        assert_eq!(layout.styles[4].action, StyleAction::Heading);
        layout.validate().unwrap();
    }

    // -----------------------------------------------------------------------
    // Engine
    // -----------------------------------------------------------------------

    #[test]
    fn dsp_release_renders_expected_blocks() {
        let layout = LayoutEngine::default()
            .render(&dsp_release(Some("https://t/v4")))
            .unwrap();
        let text = layout.text();
        assert_in_order(
            &text,
            &[
                "Daily Deployment Summary: 5th February 2026\n\n",
                "------------------TL;DR:------------------\n\n",
                "Key Deployments:\n",
                "DSP - Forecasting moved to the API\n",
                "------------------DSP------------------\n\n",
                "DSP: Release 4.0\n",
                "Forecasting\n",
                "Value Add:\n",
                "• FCAP logic moved to API\n",
                "General Availability\n",
            ],
        );
        assert!(text.ends_with(&format!("\n{}\n\n", "═".repeat(60))));

        let version = layout.spans_over("Release 4.0");
        assert!(version
            .iter()
            .any(|s| s.kind == SpanKind::Link { url: "https://t/v4".into() }));
        let epic = layout.spans_over("Forecasting");
        assert!(epic.iter().any(|s| s.kind == SpanKind::Bold));
        assert!(epic
            .iter()
            .any(|s| s.kind == SpanKind::Link { url: "https://t/EP-9".into() }));
        assert!(layout
            .spans_over("Value Add:")
            .iter()
            .any(|s| s.kind == SpanKind::Bold));
        assert!(layout
            .spans_over("General Availability")
            .iter()
            .any(|s| s.kind == SpanKind::Color { color: STATUS_GREEN }));
        assert!(layout
            .spans_over("------------------DSP------------------")
            .iter()
            .any(|s| s.kind == SpanKind::Color { color: DIVIDER_GRAY }));
    }

    #[test]
    fn version_is_plain_without_url() {
        let layout = LayoutEngine::default().render(&dsp_release(None)).unwrap();
        assert!(layout.spans_over("Release 4.0").is_empty());
        // TL;DR name is still bold
        assert!(layout.spans_over("DSP").iter().any(|s| s.kind == SpanKind::Bold));
    }

    #[test]
    fn inserts_are_contiguous_and_styles_follow_text() {
        let layout = LayoutEngine::default()
            .render(&dsp_release(Some("https://t/v4")))
            .unwrap();
        for pair in layout.inserts.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + text_len(&pair[0].text));
        }
        assert!(layout.styles.iter().all(|s| s.end <= layout.end));
        assert_eq!(layout.styles[0].action, StyleAction::Reset);
        assert_eq!(layout.len(), text_len(&layout.text()));
    }

    #[test]
    fn render_at_shifts_every_offset() {
        let engine = LayoutEngine::default();
        let release = dsp_release(Some("https://t/v4"));
        let top = engine.render(&release).unwrap();
        let later = engine.render_at(120, &release).unwrap();
        assert_eq!(top.text(), later.text());
        assert_eq!(later.inserts[0].index, 120);
        for (a, b) in top.styles.iter().zip(&later.styles) {
            assert_eq!(b.start, a.start + 119);
            assert_eq!(b.end, a.end + 119);
        }
    }

    #[test]
    fn other_is_suppressed_in_tldr_but_rendered_last() {
        let mut release = dsp_release(None);
        release.groups.push(ProductLineGroup {
            name: "Other".to_string(),
            release_version: "Release 1.0".to_string(),
            ..Default::default()
        });
        release
            .key_deployments
            .insert("Other".to_string(), "misc".to_string());
        let text = LayoutEngine::default().render(&release).unwrap().text();
        assert!(!text.contains("Other - misc"));
        assert_in_order(
            &text,
            &["------------------DSP------------------", "------------------Other------------------", "Other: Release 1.0\n"],
        );
    }

    #[test]
    fn year_suffix_is_cleaned_in_headings() {
        let release = Release {
            title: "T".into(),
            key_deployments: BTreeMap::from([(
                "Developer Experience 2026".to_string(),
                "Airflow upgrade".to_string(),
            )]),
            groups: vec![ProductLineGroup {
                name: "Developer Experience 2026".to_string(),
                release_version: "Release 8.0".to_string(),
                ..Default::default()
            }],
        };
        let text = LayoutEngine::default().render(&release).unwrap().text();
        assert!(text.contains("Developer Experience - Airflow upgrade\n"));
        assert!(text.contains("Developer Experience: Release 8.0\n"));
        assert!(!text.contains("2026"));
    }

    #[test]
    fn section_parts_render_in_template_order() {
        let release = Release {
            title: "T".into(),
            key_deployments: BTreeMap::new(),
            groups: vec![ProductLineGroup {
                name: "Media PL1".to_string(),
                release_version: "Release 5.0".to_string(),
                sections: vec![Section {
                    title: "Ops UI".to_string(),
                    url: Some("https://t/ops".to_string()),
                    notes: vec!["Context line.".to_string()],
                    value_add_summary: Some("Deal tooling improved.".to_string()),
                    value_add_bullets: vec!["OA flag".to_string()],
                    bug_bullets: vec!["Fixed crash".to_string()],
                    availability: Some(Availability::FeatureFlag),
                }],
                ..Default::default()
            }],
        };
        let layout = LayoutEngine::default().render(&release).unwrap();
        assert_in_order(
            &layout.text(),
            &[
                "Ops UI\n",
                "Context line.\n",
                "Value Add: Deal tooling improved.\n",
                "• OA flag\n",
                "Feature Flag\n",
                "Bug Fixes:\n",
                "• Fixed crash\n",
            ],
        );
        assert!(layout.spans_over("Bug Fixes:").iter().any(|s| s.kind == SpanKind::Bold));
        assert!(layout
            .spans_over("Ops UI")
            .iter()
            .any(|s| s.kind == SpanKind::Link { url: "https://t/ops".into() }));
    }

    #[test]
    fn title_is_bold_heading() {
        let layout = LayoutEngine::default().render(&dsp_release(None)).unwrap();
        let spans = layout.spans_over("Daily Deployment Summary: 5th February 2026");
        assert!(spans.iter().any(|s| s.kind == SpanKind::Bold));
        assert!(spans.iter().any(|s| s.kind == SpanKind::Heading));
        assert_eq!(layout.styles.last().unwrap().action, StyleAction::Heading);
    }
}
