use super::{load_release, ReleaseArgs};
use crate::output::{print_json, print_table};
use relnotes_core::{
    batch,
    layout::{LayoutEngine, StyleAction},
};
use std::path::Path;

pub fn run(root: &Path, args: &ReleaseArgs, origin: usize, json: bool) -> anyhow::Result<()> {
    let loaded = load_release(root, args)?;
    let engine = LayoutEngine::new(loaded.config.layout);
    let layout = engine.render_at(origin, &loaded.release)?;

    if json {
        let value = serde_json::json!({
            "title": loaded.release.title,
            "origin": layout.origin,
            "end": layout.end,
            "inserts": batch::insert_batch(&layout),
            "styles": batch::style_batch(&layout),
        });
        return print_json(&value);
    }

    println!("{}", loaded.release.title);
    println!(
        "range [{}, {})  {} inserts  {} style ops",
        layout.origin,
        layout.end,
        layout.inserts.len(),
        layout.styles.len()
    );
    println!();

    let rows = layout
        .styles
        .iter()
        .map(|op| {
            let (action, detail) = match &op.action {
                StyleAction::Reset => ("reset", String::new()),
                StyleAction::Heading => ("heading", String::new()),
                StyleAction::Text { style } => {
                    let mut parts = Vec::new();
                    if style.bold == Some(true) {
                        parts.push("bold".to_string());
                    }
                    if let Some(url) = &style.link {
                        parts.push(format!("link {url}"));
                    }
                    if style.foreground.is_some() {
                        parts.push("color".to_string());
                    }
                    ("text", parts.join(", "))
                }
            };
            vec![
                op.start.to_string(),
                op.end.to_string(),
                action.to_string(),
                detail,
            ]
        })
        .collect();
    print_table(&["START", "END", "ACTION", "STYLE"], rows);
    Ok(())
}
