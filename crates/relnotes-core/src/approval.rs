//! Per-product-line sign-off for a release before it is announced.

use crate::error::{RelnotesError, Result};
use crate::ordering::clean_pl_name;
use crate::types::ProductLineGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Moved to the next release.
    Deferred,
}

impl ApprovalStatus {
    pub fn is_decided(self) -> bool {
        self != ApprovalStatus::Pending
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::Deferred => "deferred",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approve,
    Reject,
    Defer,
}

impl Vote {
    fn status(self) -> ApprovalStatus {
        match self {
            Vote::Approve => ApprovalStatus::Approved,
            Vote::Reject => ApprovalStatus::Rejected,
            Vote::Defer => ApprovalStatus::Deferred,
        }
    }
}

impl FromStr for Vote {
    type Err = RelnotesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Vote::Approve),
            "reject" | "rejected" => Ok(Vote::Reject),
            "defer" | "deferred" | "tomorrow" => Ok(Vote::Defer),
            _ => Err(RelnotesError::InvalidVote(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLineApproval {
    #[serde(default)]
    pub status: ApprovalStatus,
    pub release_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalState {
    /// e.g. `5th February 2026`
    pub release_date: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub per_product_line: BTreeMap<String, ProductLineApproval>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalSummary {
    pub total: usize,
    pub all_decided: bool,
    pub approved: Vec<String>,
    pub rejected: Vec<String>,
    pub deferred: Vec<String>,
    pub pending: Vec<String>,
    /// Everything decided and at least one product line approved.
    pub good_to_announce: bool,
}

impl ApprovalState {
    /// Every product line starts pending. "Other" is not reviewed.
    pub fn from_release(release_date: &str, groups: &[ProductLineGroup], now: DateTime<Utc>) -> Self {
        let per_product_line = groups
            .iter()
            .map(|g| (clean_pl_name(&g.name), g))
            .filter(|(name, _)| name != crate::ordering::OTHER)
            .map(|(name, g)| {
                (
                    name,
                    ProductLineApproval {
                        status: ApprovalStatus::Pending,
                        release_version: g.release_version.clone(),
                        voted_by: None,
                        voted_at: None,
                    },
                )
            })
            .collect();
        Self {
            release_date: release_date.trim().to_string(),
            created_at: now,
            per_product_line,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RelnotesError::NotInitialized);
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)
    }

    /// Record a decision. A decided product line cannot be voted on again.
    pub fn vote(&mut self, product_line: &str, vote: Vote, by: &str, at: DateTime<Utc>) -> Result<ApprovalStatus> {
        let key = clean_pl_name(product_line);
        let entry = self
            .per_product_line
            .get_mut(&key)
            .ok_or_else(|| RelnotesError::UnknownProductLine(product_line.to_string()))?;
        if entry.status.is_decided() {
            return Err(RelnotesError::AlreadyDecided {
                product_line: key,
                status: entry.status.to_string(),
            });
        }
        entry.status = vote.status();
        entry.voted_by = Some(by.to_string());
        entry.voted_at = Some(at);
        info!(product_line = key.as_str(), status = %entry.status, by, "vote recorded");
        Ok(entry.status)
    }

    pub fn summary(&self) -> ApprovalSummary {
        let names_with = |status: ApprovalStatus| -> Vec<String> {
            self.per_product_line
                .iter()
                .filter(|(_, a)| a.status == status)
                .map(|(name, _)| name.clone())
                .collect()
        };
        let approved = names_with(ApprovalStatus::Approved);
        let pending = names_with(ApprovalStatus::Pending);
        let all_decided = pending.is_empty();
        ApprovalSummary {
            total: self.per_product_line.len(),
            all_decided,
            good_to_announce: all_decided && !approved.is_empty(),
            approved,
            rejected: names_with(ApprovalStatus::Rejected),
            deferred: names_with(ApprovalStatus::Deferred),
            pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 5, 9, 0, 0).unwrap()
    }

    fn state() -> ApprovalState {
        let groups = vec![
            ProductLineGroup {
                name: "DSP".into(),
                release_version: "Release 4.0".into(),
                ..Default::default()
            },
            ProductLineGroup {
                name: "Media PL1 2026".into(),
                release_version: "Release 2.1".into(),
                ..Default::default()
            },
            ProductLineGroup {
                name: "Other".into(),
                ..Default::default()
            },
        ];
        ApprovalState::from_release("5th February 2026", &groups, now())
    }

    #[test]
    fn starts_pending_without_other() {
        let state = state();
        assert_eq!(
            state.per_product_line.keys().collect::<Vec<_>>(),
            vec!["DSP", "Media PL1"]
        );
        let summary = state.summary();
        assert_eq!(summary.total, 2);
        assert!(!summary.all_decided);
        assert!(!summary.good_to_announce);
        assert_eq!(summary.pending, vec!["DSP", "Media PL1"]);
    }

    #[test]
    fn votes_decide_once() {
        let mut state = state();
        assert_eq!(
            state.vote("DSP", Vote::Approve, "ana", now()).unwrap(),
            ApprovalStatus::Approved
        );
        let err = state.vote("DSP", Vote::Reject, "bo", now()).unwrap_err();
        assert!(matches!(err, RelnotesError::AlreadyDecided { .. }));
        let err = state.vote("Helix", Vote::Approve, "bo", now()).unwrap_err();
        assert!(matches!(err, RelnotesError::UnknownProductLine(_)));

        state.vote("Media PL1 2026", Vote::Defer, "bo", now()).unwrap();
        let summary = state.summary();
        assert!(summary.all_decided);
        assert!(summary.good_to_announce);
        assert_eq!(summary.approved, vec!["DSP"]);
        assert_eq!(summary.deferred, vec!["Media PL1"]);
        assert_eq!(state.per_product_line["DSP"].voted_by.as_deref(), Some("ana"));
    }

    #[test]
    fn nothing_approved_is_not_announced() {
        let mut state = state();
        state.vote("DSP", Vote::Reject, "ana", now()).unwrap();
        state.vote("Media PL1", Vote::Reject, "ana", now()).unwrap();
        let summary = state.summary();
        assert!(summary.all_decided);
        assert!(!summary.good_to_announce);
    }

    #[test]
    fn vote_parsing() {
        assert_eq!("Approve".parse::<Vote>().unwrap(), Vote::Approve);
        assert_eq!("tomorrow".parse::<Vote>().unwrap(), Vote::Defer);
        assert!(matches!(
            "maybe".parse::<Vote>(),
            Err(RelnotesError::InvalidVote(_))
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("approval_status.json");
        assert!(matches!(
            ApprovalState::load(&path),
            Err(RelnotesError::NotInitialized)
        ));
        let mut state = state();
        state.vote("DSP", Vote::Approve, "ana", now()).unwrap();
        state.save(&path).unwrap();
        assert_eq!(ApprovalState::load(&path).unwrap(), state);
    }
}
