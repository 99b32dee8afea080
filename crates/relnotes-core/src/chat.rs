//! Review notification posted once a release is in the document.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::ordering::{self, clean_pl_name, OTHER};
use crate::types::Release;

pub trait ChatChannel {
    fn post(&self, text: &str) -> Result<()>;
}

/// Message asking reviewers to check the published notes.
pub fn review_message(release: &Release, release_date: &str, doc_url: Option<&str>, config: &LayoutConfig) -> String {
    let mut lines = vec![
        "*Release Notes Ready for Review*".to_string(),
        String::new(),
        format!("*Release:* {}", release_date.trim()),
    ];
    if let Some(url) = doc_url.filter(|u| !u.trim().is_empty()) {
        lines.push(format!("*Document:* <{}|Open release notes>", url.trim()));
    }

    let names: Vec<&String> = release.key_deployments.keys().collect();
    let ordered = ordering::order_product_lines(&names, &config.product_line_order, |n| n.as_str());
    let mut tldr: Vec<String> = Vec::new();
    for name in ordered {
        let clean = clean_pl_name(name);
        let summary = release.key_deployments[name.as_str()].trim();
        if clean != OTHER && !summary.is_empty() {
            tldr.push(format!("   • {clean}: {summary}"));
        }
    }
    if !tldr.is_empty() {
        lines.push(String::new());
        lines.push("*Key Deployments:*".to_string());
        lines.extend(tldr);
    }
    lines.join("\n")
}
