//! Plain-text rendering of a release, used for dry runs and for checking
//! that a layout inserts exactly the expected text.

use crate::config::LayoutConfig;
use crate::layout::{category_divider, BUG_FIXES, BULLET, KEY_DEPLOYMENTS, SEPARATOR_CHAR, TLDR_DIVIDER, VALUE_ADD};
use crate::ordering::{self, clean_pl_name, OTHER};
use crate::types::{Release, Section};
use std::fmt::Write;

pub fn render_plain(release: &Release, config: &LayoutConfig) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_release(&mut out, release, config);
    out
}

fn write_release(out: &mut String, release: &Release, config: &LayoutConfig) -> std::fmt::Result {
    writeln!(out, "{}\n", release.title.trim())?;
    writeln!(out, "{TLDR_DIVIDER}\n")?;
    writeln!(out, "{KEY_DEPLOYMENTS}")?;

    let mut names: Vec<&str> = release.groups.iter().map(|g| g.name.as_str()).collect();
    for name in release.key_deployments.keys() {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }
    for name in ordering::order_product_lines(&names, &config.product_line_order, |n| *n) {
        let Some(summary) = release.key_deployments.get(*name) else {
            continue;
        };
        let clean = clean_pl_name(name);
        if clean != OTHER && !summary.trim().is_empty() {
            writeln!(out, "{clean} - {}", summary.trim())?;
        }
    }
    out.push('\n');

    for (category, groups) in
        ordering::group_by_category(&release.groups, &config.categories, &config.product_line_order)
    {
        writeln!(out, "{}\n", category_divider(category))?;
        for group in groups {
            let version = match group.release_version.trim() {
                "" => "Release 1.0",
                v => v,
            };
            writeln!(out, "{}: {version}", clean_pl_name(&group.name))?;
            for section in &group.sections {
                write_section(out, section)?;
            }
            out.push('\n');
        }
    }

    let rule: String = std::iter::repeat(SEPARATOR_CHAR)
        .take(config.separator_width)
        .collect();
    write!(out, "\n{rule}\n\n")
}

fn write_section(out: &mut String, section: &Section) -> std::fmt::Result {
    let title = section.title.trim();
    if !title.is_empty() {
        writeln!(out, "{title}")?;
    }
    for note in &section.notes {
        writeln!(out, "{}", note.trim())?;
    }
    if section.has_value_add() {
        match section.value_add_summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => writeln!(out, "{VALUE_ADD} {summary}")?,
            _ => writeln!(out, "{VALUE_ADD}")?,
        }
        for bullet in &section.value_add_bullets {
            writeln!(out, "{BULLET}{}", bullet.trim())?;
        }
    }
    if let Some(tag) = section.availability {
        writeln!(out, "{}", tag.label())?;
    }
    if !section.bug_bullets.is_empty() {
        writeln!(out, "{BUG_FIXES}")?;
        for bullet in &section.bug_bullets {
            writeln!(out, "{BULLET}{}", bullet.trim())?;
        }
    }
    out.push('\n');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::parse_body;
    use crate::layout::LayoutEngine;
    use crate::types::{Availability, ProductLineGroup};
    use std::collections::BTreeMap;

    fn release() -> Release {
        let epics = BTreeMap::from([("Forecasting".to_string(), "https://t/EP-9".to_string())]);
        Release {
            title: "Daily Deployment Summary: 5th February 2026".into(),
            key_deployments: BTreeMap::from([
                ("DSP".to_string(), "Forecasting moved".to_string()),
                ("Media PL1 2026".to_string(), "Ops UI flags".to_string()),
                ("Other".to_string(), "misc".to_string()),
            ]),
            groups: vec![
                ProductLineGroup {
                    name: "DSP".into(),
                    release_version: "Release 4.0".into(),
                    release_version_url: Some("https://t/v4".into()),
                    sections: parse_body(
                        "#### Forecasting\nValue Add: Faster.\n- FCAP to API [GA]\nBug Fixes:\n- cap rounding",
                        &epics,
                    ),
                    epic_urls: epics.clone(),
                },
                ProductLineGroup {
                    name: "Media PL1 2026".into(),
                    release_version: "".into(),
                    sections: vec![Section {
                        title: "Ops UI Enhancements 😀".into(),
                        notes: vec!["Context.".into()],
                        availability: Some(Availability::FeatureFlag),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                ProductLineGroup {
                    name: "Other".into(),
                    release_version: "Release 2.0".into(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn plain_text_equals_concatenated_inserts() {
        let config = LayoutConfig::default();
        let release = release();
        let layout = LayoutEngine::new(config.clone()).render(&release).unwrap();
        assert_eq!(render_plain(&release, &config), layout.text());
    }

    #[test]
    fn plain_text_reads_like_the_document() {
        let text = render_plain(&release(), &LayoutConfig::default());
        assert!(text.starts_with("Daily Deployment Summary: 5th February 2026\n\n"));
        assert!(text.contains("Key Deployments:\nDSP - Forecasting moved\nMedia PL1 - Ops UI flags\n\n"));
        assert!(!text.contains("Other - misc"));
        assert!(text.contains("Media PL1: Release 1.0\nOps UI Enhancements 😀\nContext.\nFeature Flag\n\n"));
        assert!(text.contains(
            "DSP: Release 4.0\nForecasting\nValue Add: Faster.\n• FCAP to API\nGeneral Availability\nBug Fixes:\n• Fixed cap rounding\n\n\n"
        ));
    }

    #[test]
    fn separator_width_is_configurable() {
        let config = LayoutConfig {
            separator_width: 3,
            ..Default::default()
        };
        assert!(render_plain(&release(), &config).ends_with("\n═══\n\n"));
    }
}
