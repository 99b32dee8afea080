use super::{load_release, ReleaseArgs};
use crate::output::print_json;
use anyhow::Context;
use relnotes_core::{
    chat::{review_message, ChatChannel},
    document::MemoryDocument,
    layout::LayoutEngine,
    paths,
    publish::{publish, Placement, PublishOptions},
};
use std::path::Path;

pub struct PublishArgs {
    pub force: bool,
    pub replace: bool,
    pub origin: Option<usize>,
    pub notify: bool,
}

/// Posts to stdout. Stands in for a chat webhook.
struct StdoutChannel;

impl ChatChannel for StdoutChannel {
    fn post(&self, text: &str) -> relnotes_core::Result<()> {
        println!("{text}");
        Ok(())
    }
}

pub fn run(root: &Path, args: &ReleaseArgs, opts: PublishArgs, json: bool) -> anyhow::Result<()> {
    let loaded = load_release(root, args)?;

    let placement = match (opts.replace, opts.origin) {
        (true, _) => Placement::Replace,
        (false, Some(origin)) => Placement::At(origin),
        (false, None) => Placement::Prepend,
    };

    let doc_path = paths::document_path(root);
    let mut doc = MemoryDocument::load(&doc_path)
        .with_context(|| format!("failed to read {}", doc_path.display()))?;

    let engine = LayoutEngine::new(loaded.config.layout.clone());
    let outcome = publish(
        &mut doc,
        &engine,
        &loaded.release,
        PublishOptions {
            placement,
            force: opts.force,
        },
    )?;
    doc.save(&doc_path).context("failed to write document")?;

    let message = opts.notify.then(|| {
        review_message(
            &loaded.release,
            &loaded.date_label,
            loaded.config.release.document_url.as_deref(),
            &loaded.config.layout,
        )
    });

    if json {
        let value = serde_json::json!({
            "outcome": outcome,
            "document": paths::DOCUMENT_FILE,
            "message": message,
        });
        return print_json(&value);
    }

    println!(
        "Published '{}' at [{}, {}) ({} inserts, {} style ops)",
        outcome.title, outcome.origin, outcome.end, outcome.insert_requests, outcome.style_requests
    );
    if outcome.deleted > 0 {
        println!("Cleared {} characters first", outcome.deleted);
    }
    if let Some(message) = message {
        println!();
        StdoutChannel.post(&message)?;
    }
    Ok(())
}
