use anyhow::Context;
use relnotes_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing relnotes in: {}", root.display());

    let dir = paths::relnotes_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let yaml = Config::default().to_yaml()?;
    let created = io::write_if_missing(&paths::config_path(root), yaml.as_bytes())
        .context("failed to write config.yaml")?;
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    println!("\nNext: export tickets to {} and run 'relnotes preview'", paths::TICKETS_EXPORT_FILE);
    Ok(())
}
