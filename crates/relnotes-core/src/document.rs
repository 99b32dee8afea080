//! The document a release is written into.
//!
//! [`DocumentStore`] is the seam to a real rich-text backend. [`MemoryDocument`]
//! models the parts of one that matter to the layout: a flat 1-indexed buffer
//! of UTF-16 units, per-unit character styles, and text that picks up the style
//! of its neighbour when inserted.

use crate::batch::{BatchUpdate, Request, WireTextStyle, NORMAL_TEXT};
use crate::config::RgbColor;
use crate::error::{RelnotesError, Result};
use crate::layout::DOCUMENT_START;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub trait DocumentStore {
    fn read_all_text(&self) -> Result<String>;

    /// Offset one past the last character.
    fn end_index(&self) -> Result<usize>;

    fn insert(&mut self, index: usize, text: &str) -> Result<()>;

    fn delete_range(&mut self, start: usize, end: usize) -> Result<()>;

    /// Apply `style` to the fields named in `fields`; named fields missing
    /// from `style` revert to their default.
    fn style_range(&mut self, start: usize, end: usize, style: &WireTextStyle, fields: &str) -> Result<()>;

    fn paragraph_style(&mut self, start: usize, end: usize, named_style: &str) -> Result<()>;

    /// Apply every request of a batch in order.
    fn apply(&mut self, batch: &BatchUpdate) -> Result<()> {
        for request in &batch.requests {
            match request {
                Request::InsertText(r) => self.insert(r.location.index, &r.text)?,
                Request::DeleteContentRange(r) => {
                    self.delete_range(r.range.start_index, r.range.end_index)?
                }
                Request::UpdateTextStyle(r) => self.style_range(
                    r.range.start_index,
                    r.range.end_index,
                    &r.text_style,
                    &r.fields,
                )?,
                Request::UpdateParagraphStyle(r) => self.paragraph_style(
                    r.range.start_index,
                    r.range.end_index,
                    &r.paragraph_style.named_style_type,
                )?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CharStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<RgbColor>,
    /// Named paragraph style; `None` is normal text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_style: Option<String>,
}

impl CharStyle {
    pub fn is_heading(&self) -> bool {
        self.named_style
            .as_deref()
            .is_some_and(|s| s.starts_with("HEADING") || s == "TITLE")
    }

    fn patch(&mut self, style: &WireTextStyle, fields: &str) {
        for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match field {
                "bold" => self.bold = style.bold.unwrap_or(false),
                "italic" => self.italic = style.italic.unwrap_or(false),
                "underline" => self.underline = style.underline.unwrap_or(false),
                "link" => self.link = style.link.as_ref().map(|l| l.url.clone()),
                "foregroundColor" => {
                    self.foreground = style.foreground_color.as_ref().map(|c| c.color.rgb_color)
                }
                other => debug!(field = other, "ignoring unsupported text style field"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentFile", into = "DocumentFile")]
pub struct MemoryDocument {
    units: Vec<u16>,
    styles: Vec<CharStyle>,
}

/// A run of identically styled text, `[start, end)` in document offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRun {
    pub start: usize,
    pub end: usize,
    pub style: CharStyle,
}

/// On-disk shape of a [`MemoryDocument`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub text: String,
    #[serde(default)]
    pub runs: Vec<StyleRun>,
}

impl TryFrom<DocumentFile> for MemoryDocument {
    type Error = RelnotesError;

    fn try_from(file: DocumentFile) -> Result<Self> {
        let mut doc = MemoryDocument::from_text(&file.text);
        for run in file.runs {
            doc.check_range(run.start, run.end)?;
            for i in run.start..run.end {
                doc.styles[i - DOCUMENT_START] = run.style.clone();
            }
        }
        Ok(doc)
    }
}

impl From<MemoryDocument> for DocumentFile {
    fn from(doc: MemoryDocument) -> Self {
        DocumentFile {
            text: doc.text(),
            runs: doc.runs(),
        }
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unstyled document holding `text`.
    pub fn from_text(text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        let styles = vec![CharStyle::default(); units.len()];
        Self { units, styles }
    }

    /// Load from a JSON file, or start empty if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)
    }

    pub fn text(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn style_at(&self, index: usize) -> Option<&CharStyle> {
        index
            .checked_sub(DOCUMENT_START)
            .and_then(|i| self.styles.get(i))
    }

    /// Offset of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<usize> {
        let needle: Vec<u16> = needle.encode_utf16().collect();
        if needle.is_empty() || needle.len() > self.units.len() {
            return None;
        }
        self.units
            .windows(needle.len())
            .position(|w| w == needle.as_slice())
            .map(|i| i + DOCUMENT_START)
    }

    /// Styled runs, skipping unstyled text.
    pub fn runs(&self) -> Vec<StyleRun> {
        let mut runs: Vec<StyleRun> = Vec::new();
        for (i, style) in self.styles.iter().enumerate() {
            let offset = i + DOCUMENT_START;
            if let Some(run) = runs.last_mut() {
                if run.end == offset && &run.style == style {
                    run.end += 1;
                    continue;
                }
            }
            if *style != CharStyle::default() {
                runs.push(StyleRun {
                    start: offset,
                    end: offset + 1,
                    style: style.clone(),
                });
            }
        }
        runs
    }

    fn end(&self) -> usize {
        self.units.len() + DOCUMENT_START
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start < DOCUMENT_START || end <= start || end > self.end() {
            return Err(RelnotesError::InvalidRange {
                start,
                end,
                len: self.end(),
            });
        }
        Ok(())
    }
}

/// True when document index `index` falls between the halves of a UTF-16
/// surrogate pair.
pub fn splits_surrogate_pair(units: &[u16], index: usize) -> bool {
    index > DOCUMENT_START
        && units
            .get(index - DOCUMENT_START - 1)
            .is_some_and(|u| (0xD800..=0xDBFF).contains(u))
}

impl DocumentStore for MemoryDocument {
    fn read_all_text(&self) -> Result<String> {
        Ok(self.text())
    }

    fn end_index(&self) -> Result<usize> {
        Ok(self.end())
    }

    fn insert(&mut self, index: usize, text: &str) -> Result<()> {
        if index < DOCUMENT_START || index > self.end() || splits_surrogate_pair(&self.units, index) {
            return Err(RelnotesError::InvalidRange {
                start: index,
                end: index,
                len: self.end(),
            });
        }
        let at = index - DOCUMENT_START;
        // Left neighbour wins; at the very start the text joins what follows.
        let inherited = if at > 0 {
            self.styles[at - 1].clone()
        } else {
            self.styles.first().cloned().unwrap_or_default()
        };
        let new_units: Vec<u16> = text.encode_utf16().collect();
        let count = new_units.len();
        self.units.splice(at..at, new_units);
        self.styles
            .splice(at..at, std::iter::repeat(inherited).take(count));
        Ok(())
    }

    fn delete_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        let (from, to) = (start - DOCUMENT_START, end - DOCUMENT_START);
        self.units.drain(from..to);
        self.styles.drain(from..to);
        Ok(())
    }

    fn style_range(&mut self, start: usize, end: usize, style: &WireTextStyle, fields: &str) -> Result<()> {
        self.check_range(start, end)?;
        for s in &mut self.styles[start - DOCUMENT_START..end - DOCUMENT_START] {
            s.patch(style, fields);
        }
        Ok(())
    }

    fn paragraph_style(&mut self, start: usize, end: usize, named_style: &str) -> Result<()> {
        self.check_range(start, end)?;
        let value = (named_style != NORMAL_TEXT).then(|| named_style.to_string());
        for s in &mut self.styles[start - DOCUMENT_START..end - DOCUMENT_START] {
            s.named_style = value.clone();
        }
        Ok(())
    }
}
