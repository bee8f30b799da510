//! Index entry validation: required fields, uniqueness, and declared paths.

use crate::knowledge::index::{entry_seq, entry_str, LoadedIndex};
use crate::knowledge::{Finding, FindingKind, RepoLayout};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};

/// The `related_files` groups whose paths must resolve.
const RELATED_FILE_GROUPS: &[&str] = &["common_risks", "domain_knowledge"];

pub(crate) fn validate_index(layout: &RepoLayout, index: &LoadedIndex) -> Vec<Finding> {
    let mut findings = Vec::new();
    let index_path = layout.rel(&index.path);

    let mut seen_domains: HashSet<&str> = HashSet::new();
    // keyword -> most recent owning domain, in entry order
    let mut seen_keywords: HashMap<&str, &str> = HashMap::new();

    for (idx, entry) in index.entries.iter().enumerate() {
        let entry_ref = format!("Entry #{}", idx + 1);

        let Some(domain_name) = entry_str(entry, "domain_name") else {
            findings.push(Finding::error(
                FindingKind::MissingField,
                index_path.clone(),
                format!("{entry_ref}: Missing 'domain_name'"),
            ));
            continue;
        };

        if !seen_domains.insert(domain_name) {
            findings.push(Finding::error(
                FindingKind::DuplicateKey,
                index_path.clone(),
                format!("{entry_ref}: Duplicate domain_name '{domain_name}'"),
            ));
        }

        match entry.get("keywords") {
            None => findings.push(Finding::error(
                FindingKind::MissingField,
                index_path.clone(),
                format!("{entry_ref}: Missing 'keywords'"),
            )),
            Some(value) => match value.as_sequence() {
                None => findings.push(Finding::error(
                    FindingKind::MissingField,
                    index_path.clone(),
                    format!("{entry_ref}: 'keywords' must be a list"),
                )),
                Some(keywords) => {
                    for keyword in keywords.iter().filter_map(Value::as_str) {
                        if let Some(owner) = seen_keywords.get(keyword) {
                            if *owner != domain_name {
                                findings.push(Finding::warning(
                                    FindingKind::DuplicateKey,
                                    index_path.clone(),
                                    format!(
                                        "{entry_ref}: Keyword '{keyword}' already used in '{owner}'"
                                    ),
                                ));
                            }
                        }
                        // Ownership follows the most recent entry, so a
                        // three-way collision names the previous domain each
                        // time, not the first.
                        seen_keywords.insert(keyword, domain_name);
                    }
                }
            },
        }

        match entry.get("related_files") {
            None => findings.push(Finding::error(
                FindingKind::MissingField,
                index_path.clone(),
                format!("{entry_ref}: Missing 'related_files'"),
            )),
            Some(related) => {
                for group in RELATED_FILE_GROUPS {
                    let Some(paths) = entry_seq(related, group) else {
                        continue;
                    };
                    for path in paths.iter().filter_map(Value::as_str) {
                        if !layout.root().join(path).exists() {
                            findings.push(Finding::error(
                                FindingKind::DanglingReference,
                                index_path.clone(),
                                format!("{entry_ref}: File not found: {path}"),
                            ));
                        }
                    }
                }
            }
        }
    }

    findings
}
