pub mod approval;
pub mod config;
pub mod document;
pub mod init;
pub mod parse_body;
pub mod preview;
pub mod publish;
pub mod render;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use relnotes_core::{
    config::Config,
    consolidate::{assemble_release, FallbackConsolidator},
    dates, paths,
    snapshot::{ProcessedNotes, TicketExport},
    tickets::{group_tickets, TicketSource},
    types::Release,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a release comes from. Defaults to the snapshot files in `.relnotes/`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Ticket export JSON
    #[arg(long)]
    pub tickets: Option<PathBuf>,

    /// Processed notes JSON
    #[arg(long)]
    pub notes: Option<PathBuf>,

    /// Release ticket key or summary the export must hold
    #[arg(long = "release", value_name = "ID", default_value = "")]
    pub release_id: String,

    /// Release date (YYYY-MM-DD); defaults to the snapshot's release summary
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Override the whole title
    #[arg(long)]
    pub title: Option<String>,
}

/// A release ready for layout plus the date label it was titled with.
pub struct LoadedRelease {
    pub config: Config,
    pub release: Release,
    pub date_label: String,
}

pub fn load_release(root: &Path, args: &ReleaseArgs) -> anyhow::Result<LoadedRelease> {
    let config = Config::load(root).context("failed to load config")?;

    let tickets_path = args
        .tickets
        .clone()
        .unwrap_or_else(|| paths::tickets_export_path(root));
    let notes_path = args
        .notes
        .clone()
        .unwrap_or_else(|| paths::processed_notes_path(root));

    let export = if tickets_path.exists() {
        Some(
            TicketExport::load(&tickets_path)
                .with_context(|| format!("failed to read {}", tickets_path.display()))?,
        )
    } else {
        None
    };
    let notes = if notes_path.exists() {
        Some(
            ProcessedNotes::load(&notes_path)
                .with_context(|| format!("failed to read {}", notes_path.display()))?,
        )
    } else {
        None
    };
    if export.is_none() && notes.is_none() {
        bail!(
            "no ticket export or processed notes found (looked for {} and {})",
            tickets_path.display(),
            notes_path.display()
        );
    }

    let groups = match &export {
        Some(export) => {
            let tickets = export.fetch(&args.release_id)?;
            group_tickets(&tickets, export.release_key.as_deref())
        }
        None => Vec::new(),
    };

    let summary = export
        .as_ref()
        .map(|e| e.release_summary.as_str())
        .or_else(|| notes.as_ref().map(|n| n.release_summary.as_str()))
        .filter(|s| !s.trim().is_empty());
    let date_label = match (args.date, summary) {
        (Some(date), _) => dates::release_date(date),
        (None, Some(summary)) => dates::label_from_summary(summary),
        (None, None) => dates::release_date(chrono::Local::now().date_naive()),
    };
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| dates::release_title(&config.release.title_prefix, &date_label));
    debug!(title = title.as_str(), product_lines = groups.len(), "loaded release");

    let release = assemble_release(&config, &title, notes.as_ref(), &groups, &FallbackConsolidator);
    Ok(LoadedRelease {
        config,
        release,
        date_label,
    })
}
