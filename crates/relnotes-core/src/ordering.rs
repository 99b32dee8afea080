use crate::config::CategoryRule;
use crate::types::ProductLineGroup;
use regex::Regex;
use std::sync::OnceLock;

/// Catch-all category and product line name.
pub const OTHER: &str = "Other";

static YEAR_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();

fn year_suffix_re() -> &'static Regex {
    YEAR_SUFFIX_RE.get_or_init(|| Regex::new(r"\s+20\d{2}$").unwrap())
}

/// Drop a trailing year: `Developer Experience 2026` -> `Developer Experience`.
pub fn clean_pl_name(name: &str) -> String {
    year_suffix_re().replace(name.trim(), "").into_owned()
}

/// Preferred names first, in table order; the rest keep their input order.
pub fn order_product_lines<'a, T, F>(items: &'a [T], preferred: &[String], name: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let mut ordered: Vec<&T> = Vec::with_capacity(items.len());
    let mut taken = vec![false; items.len()];
    for want in preferred {
        for (i, item) in items.iter().enumerate() {
            if !taken[i] && name(item) == want {
                taken[i] = true;
                ordered.push(item);
            }
        }
    }
    for (i, item) in items.iter().enumerate() {
        if !taken[i] {
            ordered.push(item);
        }
    }
    ordered
}

/// First matching rule by priority; ties keep list order.
pub fn category_for<'a>(product_line: &str, rules: &'a [CategoryRule]) -> &'a str {
    let mut ranked: Vec<(usize, &CategoryRule)> = rules
        .iter()
        .enumerate()
        .map(|(i, r)| (r.priority.unwrap_or(i), r))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked
        .into_iter()
        .find(|(_, r)| r.matches(product_line))
        .map(|(_, r)| r.name.as_str())
        .unwrap_or(OTHER)
}

/// Groups bucketed by category in rule order, `Other` last. Empty
/// categories are omitted; within a category the preferred order applies.
pub fn group_by_category<'a>(
    groups: &'a [ProductLineGroup],
    rules: &'a [CategoryRule],
    preferred: &[String],
) -> Vec<(&'a str, Vec<&'a ProductLineGroup>)> {
    let ordered = order_product_lines(groups, preferred, |g| g.name.as_str());
    let mut names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
    if !names.contains(&OTHER) {
        names.push(OTHER);
    }
    let mut out = Vec::new();
    for cat in names {
        let members: Vec<&ProductLineGroup> = ordered
            .iter()
            .copied()
            .filter(|g| category_for(&g.name, rules) == cat)
            .collect();
        if !members.is_empty() {
            out.push((cat, members));
        }
    }
    out
}
