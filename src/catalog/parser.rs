//! Markdown catalog parser
//!
//! Layout of the upstream document:
//!
//! ```text
//! ### 📦 `com.google.android.youtube`
//! <details>
//!
//! | 💊 Patch | 📜 Description | 🏹 Target Version |
//! |:--------:|:--------------:|:-----------------:|
//! | `hide-ads` | Removes ads. | 17.49.37 |
//! ```
//!
//! Every table row with exactly three cells is a rule candidate. The first two
//! candidates of each section are the header and alignment rows and are
//! skipped.

use super::{CatalogError, Rule, RuleCatalog, RuleSet, TargetCategory};
use std::collections::BTreeMap;
use tracing::debug;

pub const SECTION_MARKER: &str = "### 📦 ";

const HEADER_ROWS: usize = 2;

fn clean_cell(cell: &str) -> String {
    cell.replace('`', "").trim().to_string()
}

/// Cells between the outer pipes, if the line is a three-column row
fn row_cells(line: &str) -> Option<[String; 3]> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 2 {
        return None;
    }
    match &parts[1..parts.len() - 1] {
        [name, description, version] => {
            Some([clean_cell(name), clean_cell(description), clean_cell(version)])
        }
        _ => None,
    }
}

fn parse_section(section: &str) -> (String, Vec<Rule>) {
    let app_name = section
        .lines()
        .next()
        .map(|line| line.trim().trim_matches('`').to_string())
        .unwrap_or_default();

    let rules = section
        .lines()
        .filter_map(row_cells)
        .skip(HEADER_ROWS)
        .map(|[name, description, version]| Rule {
            name,
            description,
            target: app_name.clone(),
            version,
        })
        .collect();

    (app_name, rules)
}

/// Parses a catalog document into per-category rule sets
///
/// Sections whose app name matches no category are dropped. Fails with
/// [`CatalogError::ParseMismatch`] when the document has no sections at all.
pub fn parse(document: &str) -> Result<RuleCatalog, CatalogError> {
    let mut sections = document.split(SECTION_MARKER);
    // Everything before the first marker is preamble.
    sections.next();

    let mut sets: BTreeMap<TargetCategory, RuleSet> = BTreeMap::new();
    let mut section_count = 0usize;

    for section in sections {
        section_count += 1;
        let (app_name, rules) = parse_section(section);

        match TargetCategory::classify(&app_name) {
            Some(category) => {
                debug!(app = %app_name, category = %category, rules = rules.len(), "Parsed catalog section");
                let set = sets.entry(category).or_default();
                for rule in rules {
                    set.push(rule);
                }
            }
            None => debug!(app = %app_name, "Dropping catalog section for unsupported app"),
        }
    }

    if section_count == 0 {
        return Err(CatalogError::ParseMismatch(format!(
            "no '{}' section markers found",
            SECTION_MARKER.trim()
        )));
    }

    Ok(RuleCatalog::from_sets(sets))
}
