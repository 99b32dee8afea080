use super::{load_release, ReleaseArgs};
use crate::output::print_json;
use relnotes_core::preview::render_plain;
use std::path::Path;

pub fn run(root: &Path, args: &ReleaseArgs, json: bool) -> anyhow::Result<()> {
    let loaded = load_release(root, args)?;
    let text = render_plain(&loaded.release, &loaded.config.layout);

    if json {
        let value = serde_json::json!({
            "title": loaded.release.title,
            "release": loaded.release,
            "text": text,
        });
        return print_json(&value);
    }

    print!("{text}");
    Ok(())
}
