use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RELNOTES_DIR: &str = ".relnotes";

pub const CONFIG_FILE: &str = ".relnotes/config.yaml";
pub const DOCUMENT_FILE: &str = ".relnotes/document.json";
pub const APPROVAL_FILE: &str = ".relnotes/approval_status.json";
pub const TICKETS_EXPORT_FILE: &str = ".relnotes/tickets_export.json";
pub const PROCESSED_NOTES_FILE: &str = ".relnotes/processed_notes.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn relnotes_dir(root: &Path) -> PathBuf {
    root.join(RELNOTES_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn document_path(root: &Path) -> PathBuf {
    root.join(DOCUMENT_FILE)
}

pub fn approval_path(root: &Path) -> PathBuf {
    root.join(APPROVAL_FILE)
}

pub fn tickets_export_path(root: &Path) -> PathBuf {
    root.join(TICKETS_EXPORT_FILE)
}

pub fn processed_notes_path(root: &Path) -> PathBuf {
    root.join(PROCESSED_NOTES_FILE)
}
