use crate::output::{print_json, print_table};
use anyhow::Context;
use relnotes_core::{body::BodyParser, matcher::EpicUrls, ordering::clean_pl_name};
use std::io::Read;
use std::path::Path;

pub fn run(
    file: &Path,
    epic_urls: Option<&Path>,
    product_line: Option<&str>,
    release_version: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
    };

    let urls: EpicUrls = match epic_urls {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&data).with_context(|| format!("invalid epic URL map in {}", path.display()))?
        }
        None => EpicUrls::new(),
    };

    let mut parser = BodyParser::new(&urls);
    if let Some(pl) = product_line {
        parser = parser.with_product_line(&clean_pl_name(pl), release_version.unwrap_or_default());
    }
    let sections = parser.parse(&text);

    if json {
        return print_json(&sections);
    }

    if sections.is_empty() {
        println!("No sections found.");
        return Ok(());
    }
    let rows = sections
        .iter()
        .map(|s| {
            vec![
                s.title.clone(),
                s.url.clone().unwrap_or_else(|| "-".to_string()),
                s.value_add_bullets.len().to_string(),
                s.bug_bullets.len().to_string(),
                s.availability.map(|a| a.label().to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["SECTION", "EPIC", "VALUE", "BUGS", "AVAILABILITY"], rows);
    Ok(())
}
