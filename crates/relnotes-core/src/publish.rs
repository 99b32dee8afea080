use crate::batch::{self, BatchUpdate, Request};
use crate::document::{splits_surrogate_pair, DocumentStore};
use crate::error::{RelnotesError, Result};
use crate::layout::{LayoutEngine, DOCUMENT_START, KEY_DEPLOYMENTS, TLDR_DIVIDER};
use crate::types::Release;
use serde::Serialize;
use tracing::info;

/// Where a release goes in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", content = "origin", rename_all = "snake_case")]
pub enum Placement {
    /// Above earlier releases, at the document start.
    #[default]
    Prepend,
    /// Append-only at a caller-supplied offset.
    At(usize),
    /// Clear the document first. Only for a document with no releases yet.
    Replace,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    pub placement: Placement,
    /// Publish even if the title is already in the document.
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub title: String,
    pub placement: Placement,
    pub origin: usize,
    pub end: usize,
    pub deleted: usize,
    pub insert_requests: usize,
    pub style_requests: usize,
}

/// Refuse a second run of the same release unless forced.
pub fn check_duplicate(document_text: &str, title: &str, force: bool) -> Result<()> {
    let title = title.trim();
    if !force && !title.is_empty() && document_text.contains(title) {
        return Err(RelnotesError::DuplicateRelease(title.to_string()));
    }
    Ok(())
}

/// Every rendered release carries the TL;DR divider and the key deployments
/// header, whatever the separator width.
fn holds_release(text: &str) -> bool {
    text.contains(TLDR_DIVIDER) || text.contains(KEY_DEPLOYMENTS)
}

/// Render `release` into `store`: inserts as one batch, then styles as a
/// second.
pub fn publish<S>(
    store: &mut S,
    engine: &LayoutEngine,
    release: &Release,
    options: PublishOptions,
) -> Result<PublishOutcome>
where
    S: DocumentStore + ?Sized,
{
    let existing = store.read_all_text()?;
    check_duplicate(&existing, &release.title, options.force)?;

    let end_index = store.end_index()?;
    let mut inserts = BatchUpdate::default();
    let mut deleted = 0;
    let origin = match options.placement {
        Placement::Prepend => DOCUMENT_START,
        Placement::At(origin) => {
            let units: Vec<u16> = existing.encode_utf16().collect();
            if origin < DOCUMENT_START || origin > end_index || splits_surrogate_pair(&units, origin) {
                return Err(RelnotesError::InvalidRange {
                    start: origin,
                    end: origin,
                    len: end_index,
                });
            }
            origin
        }
        Placement::Replace => {
            if holds_release(&existing) {
                return Err(RelnotesError::DocumentPopulated);
            }
            if end_index > DOCUMENT_START {
                inserts.requests.push(Request::delete(DOCUMENT_START, end_index));
                deleted = end_index - DOCUMENT_START;
            }
            DOCUMENT_START
        }
    };

    let layout = engine.render_at(origin, release)?;
    inserts.requests.extend(batch::insert_batch(&layout).requests);
    let styles = batch::style_batch(&layout);

    store.apply(&inserts)?;
    store.apply(&styles)?;

    info!(
        title = release.title.as_str(),
        origin,
        end = layout.end,
        inserts = inserts.len(),
        styles = styles.len(),
        "published release"
    );

    Ok(PublishOutcome {
        title: release.title.clone(),
        placement: options.placement,
        origin,
        end: layout.end,
        deleted,
        insert_requests: inserts.len(),
        style_requests: styles.len(),
    })
}
