use crate::error::{RelnotesError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RgbColor / Palette
// ---------------------------------------------------------------------------

/// Colour channels in the 0.0..=1.0 range used by the document API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RgbColor {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    fn in_range(&self) -> bool {
        [self.red, self.green, self.blue]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

pub const LINK_BLUE: RgbColor = RgbColor::new(0.06, 0.36, 0.7);
pub const STATUS_GREEN: RgbColor = RgbColor::new(0.13, 0.55, 0.13);
pub const DIVIDER_GRAY: RgbColor = RgbColor::new(0.5, 0.5, 0.5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_link")]
    pub link: RgbColor,
    #[serde(default = "default_status")]
    pub status: RgbColor,
    #[serde(default = "default_divider")]
    pub divider: RgbColor,
}

fn default_link() -> RgbColor {
    LINK_BLUE
}

fn default_status() -> RgbColor {
    STATUS_GREEN
}

fn default_divider() -> RgbColor {
    DIVIDER_GRAY
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            link: default_link(),
            status: default_status(),
            divider: default_divider(),
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryRule
// ---------------------------------------------------------------------------

/// A document category and the lowercase substrings that place a product
/// line in it. Categories are emitted in list order. Matching goes by
/// `priority` (lowest first, defaulting to the list position); the first
/// hit wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<usize>,
}

impl CategoryRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: usize) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, product_line: &str) -> bool {
        let lower = product_line.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
    }
}

/// Audiences is checked before Developer Experience but emitted after it.
pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("Media", &["media"]).with_priority(0),
        CategoryRule::new("Developer Experience", &["developer"]).with_priority(2),
        CategoryRule::new("Audiences", &["audience"]).with_priority(1),
        CategoryRule::new("Data Ingress", &["data ingress"]).with_priority(3),
        CategoryRule::new("Data Governance", &["data governance"]).with_priority(4),
        CategoryRule::new("Helix", &["helix"]).with_priority(5),
        CategoryRule::new("DSP", &["dsp"]).with_priority(6),
    ]
}

pub fn default_product_line_order() -> Vec<String> {
    [
        "Media PL1",
        "Media PL2",
        "Media",
        "Audiences PL1",
        "Audiences PL2",
        "Audiences",
        "DSP Core PL1",
        "DSP Core PL2",
        "DSP Core PL3",
        "DSP Core PL5",
        "DSP PL1",
        "DSP PL2",
        "DSP PL3",
        "DSP",
        "Developer Experience",
        "Developer Experience 2026",
        "Data Ingress",
        "Data Ingress 2026",
        "Helix PL3",
        "Helix",
        "Data Governance",
        "Other",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_product_line_order")]
    pub product_line_order: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
    #[serde(default = "default_separator_width")]
    pub separator_width: usize,
    #[serde(default)]
    pub palette: Palette,
}

fn default_match_threshold() -> f64 {
    crate::matcher::DEFAULT_MATCH_THRESHOLD
}

fn default_separator_width() -> usize {
    60
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            product_line_order: default_product_line_order(),
            categories: default_categories(),
            separator_width: default_separator_width(),
            palette: Palette::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ReleaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Link included in review messages. The local document has no URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
}

fn default_title_prefix() -> String {
    "Daily Deployment Summary".to_string()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            title_prefix: default_title_prefix(),
            document_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub release: ReleaseConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            release: ReleaseConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RelnotesError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        crate::io::atomic_write(&path, self.to_yaml()?.as_bytes())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let layout = &self.layout;

        // 1. Threshold must be a usable ratio
        if !(layout.match_threshold > 0.0 && layout.match_threshold <= 1.0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "layout.match_threshold must be in (0, 1], got {}",
                    layout.match_threshold
                ),
            });
        }

        // 2. Duplicate product lines in the preferred order
        let mut seen = HashSet::new();
        for name in &layout.product_line_order {
            if !seen.insert(name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("duplicate product line '{name}' in layout.product_line_order"),
                });
            }
        }

        // 3. Category rules
        let mut names = HashSet::new();
        for rule in &layout.categories {
            if !names.insert(rule.name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("duplicate category '{}'", rule.name),
                });
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("category '{}' has no keywords and never matches", rule.name),
                });
            }
            if rule.name == crate::ordering::OTHER {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "category 'Other' is implicit and should not be listed".to_string(),
                });
            }
        }

        // 4. Colours
        let palette = &layout.palette;
        for (field, color) in [
            ("link", palette.link),
            ("status", palette.status),
            ("divider", palette.divider),
        ] {
            if !color.in_range() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("layout.palette.{field} channels must be within 0.0..=1.0"),
                });
            }
        }

        if layout.separator_width == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "layout.separator_width is 0; releases will run together".to_string(),
            });
        }

        if self.release.title_prefix.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "release.title_prefix must not be empty".to_string(),
            });
        }

        warnings
    }
}
