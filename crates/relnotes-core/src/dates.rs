use chrono::{Datelike, NaiveDate};

/// `1` -> `1st`, `12` -> `12th`, `22` -> `22nd`.
pub fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// `5th February 2026`
pub fn release_date(date: NaiveDate) -> String {
    format!("{} {}", ordinal(date.day()), date.format("%B %Y"))
}

/// Date label from a release ticket summary.
pub fn label_from_summary(summary: &str) -> String {
    let trimmed = summary.trim();
    trimmed
        .strip_prefix("Release ")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

pub fn release_title(prefix: &str, date_label: &str) -> String {
    format!("{}: {}", prefix.trim(), date_label.trim())
}
