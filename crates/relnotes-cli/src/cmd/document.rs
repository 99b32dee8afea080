use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use relnotes_core::{document::MemoryDocument, paths};
use std::path::Path;

#[derive(Subcommand)]
pub enum DocumentSubcommand {
    /// Print the document text
    Show,

    /// List styled runs
    Styles,
}

pub fn run(root: &Path, subcmd: DocumentSubcommand, json: bool) -> anyhow::Result<()> {
    let path = paths::document_path(root);
    let doc = MemoryDocument::load(&path).with_context(|| format!("failed to read {}", path.display()))?;

    match subcmd {
        DocumentSubcommand::Show => {
            if json {
                let value = serde_json::json!({
                    "length": doc.len(),
                    "text": doc.text(),
                });
                return print_json(&value);
            }
            if doc.is_empty() {
                println!("Document is empty.");
            } else {
                print!("{}", doc.text());
            }
        }
        DocumentSubcommand::Styles => {
            let runs = doc.runs();
            if json {
                return print_json(&runs);
            }
            let rows = runs
                .iter()
                .map(|run| {
                    let s = &run.style;
                    let mut attrs = Vec::new();
                    if s.bold {
                        attrs.push("bold".to_string());
                    }
                    if s.underline {
                        attrs.push("underline".to_string());
                    }
                    if let Some(named) = &s.named_style {
                        attrs.push(named.to_lowercase());
                    }
                    if s.foreground.is_some() {
                        attrs.push("color".to_string());
                    }
                    vec![
                        run.start.to_string(),
                        run.end.to_string(),
                        attrs.join(", "),
                        s.link.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["START", "END", "STYLE", "LINK"], rows);
        }
    }
    Ok(())
}
