use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::matcher::EpicUrls;

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    GeneralAvailability,
    FeatureFlag,
}

impl Availability {
    /// The literal line rendered under a section's value-add bullets.
    pub fn label(self) -> &'static str {
        match self {
            Availability::GeneralAvailability => "General Availability",
            Availability::FeatureFlag => "Feature Flag",
        }
    }

    /// Matches a standalone tag line such as `General Availability`.
    pub fn from_label(line: &str) -> Option<Self> {
        let lower = line.trim().to_lowercase();
        match lower.as_str() {
            "general availability" => Some(Availability::GeneralAvailability),
            "feature flag" => Some(Availability::FeatureFlag),
            _ => None,
        }
    }

    /// Interprets a free-form tracker field like `General Availability (GA)`.
    pub fn from_release_type(value: &str) -> Option<Self> {
        let lower = value.to_lowercase();
        if lower.contains("general") && lower.contains("availability") {
            Some(Availability::GeneralAvailability)
        } else if lower.contains("feature") && lower.contains("flag") {
            Some(Availability::FeatureFlag)
        } else {
            None
        }
    }

    /// Interprets a tracker label.
    pub fn from_tracker_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "ga" | "general_availability" | "general availability" | "general-availability" => {
                Some(Availability::GeneralAvailability)
            }
            "ff" | "feature_flag" | "featureflag" | "feature flag" | "feature-flag" => {
                Some(Availability::FeatureFlag)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// One epic-level block under a product line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Prose lines that fit no other slot. Rendered unstyled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_add_summary: Option<String>,
    #[serde(default)]
    pub value_add_bullets: Vec<String>,
    #[serde(default)]
    pub bug_bullets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

impl Section {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn has_value_add(&self) -> bool {
        self.value_add_summary.is_some() || !self.value_add_bullets.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.notes.is_empty()
            && !self.has_value_add()
            && self.bug_bullets.is_empty()
            && self.availability.is_none()
    }

    /// True once anything beyond the title has been recorded.
    pub fn has_content(&self) -> bool {
        !self.notes.is_empty()
            || self.has_value_add()
            || !self.bug_bullets.is_empty()
            || self.availability.is_some()
    }
}

// ---------------------------------------------------------------------------
// ProductLineGroup / Release
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductLineGroup {
    /// Raw product line key, possibly with a trailing year.
    pub name: String,
    pub release_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_version_url: Option<String>,
    /// Epic title to URL, used to link section titles that carry no URL.
    #[serde(default)]
    pub epic_urls: EpicUrls,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Everything one render pass writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub title: String,
    /// Product line name to its one-line TL;DR.
    #[serde(default)]
    pub key_deployments: BTreeMap<String, String>,
    #[serde(default)]
    pub groups: Vec<ProductLineGroup>,
}

impl Release {
    pub fn group(&self, name: &str) -> Option<&ProductLineGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}
