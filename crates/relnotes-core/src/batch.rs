//! `batchUpdate` request bodies for the target document API.
//!
//! A render pass is submitted as two batches: every insert first, then every
//! style. Field masks follow the API rule that a field named in `fields` but
//! absent from the style is reset to its default.

use crate::config::RgbColor;
use crate::layout::{Layout, StyleAction, StyleOp, TextStyle};
use serde::{Deserialize, Serialize};

pub const NORMAL_TEXT: &str = "NORMAL_TEXT";
pub const HEADING_1: &str = "HEADING_1";

/// Every text field the reset clears.
pub const RESET_FIELDS: &str = "bold,italic,underline,link,foregroundColor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub requests: Vec<Request>,
}

impl BatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText(InsertText),
    DeleteContentRange(DeleteContentRange),
    UpdateTextStyle(UpdateTextStyle),
    UpdateParagraphStyle(UpdateParagraphStyle),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize,
}

impl Range {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertText {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContentRange {
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyle {
    pub range: Range,
    pub text_style: WireTextStyle,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParagraphStyle {
    pub range: Range,
    pub paragraph_style: ParagraphStyle,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionalColor {
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub rgb_color: RgbColor,
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl Request {
    pub fn insert(index: usize, text: impl Into<String>) -> Self {
        Request::InsertText(InsertText {
            location: Location { index },
            text: text.into(),
        })
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Request::DeleteContentRange(DeleteContentRange {
            range: Range::new(start, end),
        })
    }

    pub fn named_style(start: usize, end: usize, style: &str) -> Self {
        Request::UpdateParagraphStyle(UpdateParagraphStyle {
            range: Range::new(start, end),
            paragraph_style: ParagraphStyle {
                named_style_type: style.to_string(),
            },
            fields: "namedStyleType".to_string(),
        })
    }

    pub fn reset_text(start: usize, end: usize) -> Self {
        Request::UpdateTextStyle(UpdateTextStyle {
            range: Range::new(start, end),
            text_style: WireTextStyle::default(),
            fields: RESET_FIELDS.to_string(),
        })
    }

    pub fn text_style(start: usize, end: usize, style: &TextStyle) -> Self {
        let mut fields = Vec::new();
        if style.bold.is_some() {
            fields.push("bold");
        }
        if style.link.is_some() {
            fields.push("link");
        }
        if style.foreground.is_some() {
            fields.push("foregroundColor");
        }
        if style.underline.is_some() {
            fields.push("underline");
        }
        Request::UpdateTextStyle(UpdateTextStyle {
            range: Range::new(start, end),
            text_style: WireTextStyle {
                bold: style.bold,
                italic: None,
                underline: style.underline,
                link: style.link.clone().map(|url| Link { url }),
                foreground_color: style.foreground.map(|rgb_color| OptionalColor {
                    color: Color { rgb_color },
                }),
            },
            fields: fields.join(","),
        })
    }
}

fn style_requests(op: &StyleOp) -> Vec<Request> {
    match &op.action {
        StyleAction::Reset => vec![
            Request::reset_text(op.start, op.end),
            Request::named_style(op.start, op.end, NORMAL_TEXT),
        ],
        StyleAction::Text { style } => vec![Request::text_style(op.start, op.end, style)],
        StyleAction::Heading => vec![Request::named_style(op.start, op.end, HEADING_1)],
    }
}

/// All inserts of a pass, in cursor order.
pub fn insert_batch(layout: &Layout) -> BatchUpdate {
    BatchUpdate {
        requests: layout
            .inserts
            .iter()
            .map(|op| Request::insert(op.index, op.text.clone()))
            .collect(),
    }
}

/// All styles of a pass, reset first.
pub fn style_batch(layout: &Layout) -> BatchUpdate {
    BatchUpdate {
        requests: layout.styles.iter().flat_map(style_requests).collect(),
    }
}
