use super::{load_release, ReleaseArgs};
use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use clap::Subcommand;
use relnotes_core::{
    approval::{ApprovalState, Vote},
    paths,
};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ApprovalSubcommand {
    /// Start a review: every product line of the release becomes pending
    Init {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Overwrite an existing review
        #[arg(long)]
        force: bool,
    },

    /// Record a decision for one product line
    Vote {
        /// Product line name
        product_line: String,
        /// approve, reject or defer
        vote: String,
        /// Who decided
        #[arg(long, default_value = "cli")]
        by: String,
    },

    /// Show where the review stands
    Status,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ApprovalSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ApprovalSubcommand::Init { release, force } => init(root, &release, force, json),
        ApprovalSubcommand::Vote {
            product_line,
            vote,
            by,
        } => vote_on(root, &product_line, &vote, &by, json),
        ApprovalSubcommand::Status => status(root, json),
    }
}

fn load_state(path: &Path) -> anyhow::Result<ApprovalState> {
    if !path.exists() {
        bail!("no review in progress; run 'relnotes approval init'");
    }
    ApprovalState::load(path).context("failed to read approval state")
}

fn init(root: &Path, args: &ReleaseArgs, force: bool, json: bool) -> anyhow::Result<()> {
    let path = paths::approval_path(root);
    if path.exists() && !force {
        bail!("a review already exists at {}; pass --force to start over", paths::APPROVAL_FILE);
    }
    let loaded = load_release(root, args)?;
    let state = ApprovalState::from_release(&loaded.date_label, &loaded.release.groups, chrono::Utc::now());
    state.save(&path).context("failed to write approval state")?;

    if json {
        return print_json(&state);
    }
    println!(
        "Review started for {}: {} product lines pending",
        state.release_date,
        state.per_product_line.len()
    );
    Ok(())
}

fn vote_on(root: &Path, product_line: &str, vote: &str, by: &str, json: bool) -> anyhow::Result<()> {
    let path = paths::approval_path(root);
    let mut state = load_state(&path)?;
    let vote: Vote = vote.parse()?;
    let status = state.vote(product_line, vote, by, chrono::Utc::now())?;
    state.save(&path).context("failed to write approval state")?;

    if json {
        let value = serde_json::json!({
            "product_line": product_line,
            "status": status,
            "summary": state.summary(),
        });
        return print_json(&value);
    }
    println!("{product_line}: {status}");
    let summary = state.summary();
    if summary.good_to_announce {
        println!("All product lines decided. Good to announce.");
    }
    Ok(())
}

fn status(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = load_state(&paths::approval_path(root))?;
    let summary = state.summary();

    if json {
        let value = serde_json::json!({
            "release_date": state.release_date,
            "per_product_line": state.per_product_line,
            "summary": summary,
        });
        return print_json(&value);
    }

    println!("Release: {}", state.release_date);
    println!();
    let rows = state
        .per_product_line
        .iter()
        .map(|(name, a)| {
            vec![
                name.clone(),
                a.release_version.clone(),
                a.status.to_string(),
                a.voted_by.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["PRODUCT LINE", "VERSION", "STATUS", "BY"], rows);
    println!();
    println!(
        "approved {}  rejected {}  deferred {}  pending {}",
        summary.approved.len(),
        summary.rejected.len(),
        summary.deferred.len(),
        summary.pending.len()
    );
    if summary.good_to_announce {
        println!("Good to announce.");
    }
    Ok(())
}
