//! JSON hand-off files between the export, consolidation and publish steps.

use crate::error::{RelnotesError, Result};
use crate::matcher::EpicUrls;
use crate::tickets::{TicketRecord, TicketSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// TicketExport
// ---------------------------------------------------------------------------

/// Tickets linked to one release ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    /// e.g. `Release 5th February 2026`
    pub release_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_key: Option<String>,
    #[serde(default)]
    pub fix_versions: Vec<String>,
    #[serde(default)]
    pub tickets: Vec<TicketRecord>,
}

impl TicketExport {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)
    }
}

impl TicketSource for TicketExport {
    /// Accepts the release key, the release summary, or an empty id.
    fn fetch(&self, release_id: &str) -> Result<Vec<TicketRecord>> {
        let id = release_id.trim();
        let matches = id.is_empty()
            || id == self.release_summary
            || self.release_key.as_deref() == Some(id);
        if !matches {
            return Err(RelnotesError::SnapshotNotFound(format!(
                "export holds '{}', not '{id}'",
                self.release_summary
            )));
        }
        Ok(self.tickets.clone())
    }
}

// ---------------------------------------------------------------------------
// ProcessedNotes
// ---------------------------------------------------------------------------

/// Consolidated prose per product line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedNotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub release_summary: String,
    #[serde(default)]
    pub product_lines: Vec<String>,
    #[serde(default)]
    pub tldr_by_pl: BTreeMap<String, String>,
    #[serde(default)]
    pub body_by_pl: BTreeMap<String, String>,
    #[serde(default)]
    pub release_versions: BTreeMap<String, String>,
    #[serde(default)]
    pub fix_version_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub epic_urls_by_pl: BTreeMap<String, EpicUrls>,
}

impl ProcessedNotes {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(RelnotesError::SnapshotNotFound(path.display().to_string()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
