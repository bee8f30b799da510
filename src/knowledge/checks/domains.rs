//! Domain folder validation: spec and risk documents.

use crate::knowledge::sections::{
    self, CORE_COMPONENTS_LABELS, COUNTERMEASURES_LABELS, DETAILS_LABELS, OVERVIEW_LABELS,
};
use crate::knowledge::{
    subdirectories_of, Finding, FindingKind, RepoLayout, RISKS_FILE_NAME, SPEC_FILE_NAME,
};
use std::fs;
use std::path::Path;

pub(crate) fn validate_domains(layout: &RepoLayout) -> Vec<Finding> {
    let domains_root = layout.domains_root();
    if !domains_root.is_dir() {
        return vec![Finding::error(
            FindingKind::MissingArtifact,
            layout.rel(&domains_root),
            "domains directory not found",
        )];
    }

    let mut findings = Vec::new();
    for domain_dir in subdirectories_of(&domains_root) {
        let spec_path = domain_dir.join(SPEC_FILE_NAME);
        if spec_path.is_file() {
            findings.extend(validate_spec(layout, &spec_path));
        } else {
            findings.push(Finding::error(
                FindingKind::MissingArtifact,
                layout.rel(&domain_dir),
                format!("Missing {SPEC_FILE_NAME}"),
            ));
        }

        let risks_path = domain_dir.join(RISKS_FILE_NAME);
        if risks_path.is_file() {
            findings.extend(validate_risks(layout, &risks_path));
        } else {
            findings.push(Finding::error(
                FindingKind::MissingArtifact,
                layout.rel(&domain_dir),
                format!("Missing {RISKS_FILE_NAME}"),
            ));
        }
    }

    findings
}

/// Required spec sections with their user-facing alias rendering.
const SPEC_SECTIONS: &[(&[&str], &str)] = &[
    (OVERVIEW_LABELS, "## Overview or ## 概要"),
    (CORE_COMPONENTS_LABELS, "## Core Components or ## コアコンポーネント"),
];

fn validate_spec(layout: &RepoLayout, path: &Path) -> Vec<Finding> {
    let rel = layout.rel(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return vec![Finding::error(
                FindingKind::MissingArtifact,
                rel,
                format!("failed to read {SPEC_FILE_NAME}: {err}"),
            )]
        }
    };

    let mut findings = Vec::new();
    for (aliases, display) in SPEC_SECTIONS {
        if !sections::has_section(&content, aliases) {
            findings.push(Finding::error(
                FindingKind::MissingField,
                rel.clone(),
                format!("Missing required section: {display}"),
            ));
        }
    }
    findings
}

fn validate_risks(layout: &RepoLayout, path: &Path) -> Vec<Finding> {
    let rel = layout.rel(path);
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return vec![Finding::error(
                FindingKind::MissingArtifact,
                rel,
                format!("failed to read {RISKS_FILE_NAME}: {err}"),
            )]
        }
    };

    let risk_sections = sections::scan_sections(&content, 2, 3);
    if risk_sections.is_empty() {
        return vec![Finding::warning(
            FindingKind::MissingField,
            rel,
            "No risk entries found (## or ### headings)",
        )];
    }

    let mut findings = Vec::new();
    for (idx, section) in risk_sections.iter().enumerate() {
        // Positional fallback when a heading carries no usable title.
        let risk_name = if section.title.is_empty() {
            format!("Risk #{}", idx + 1)
        } else {
            section.title.clone()
        };

        if !sections::has_field(&section.body, DETAILS_LABELS) {
            findings.push(Finding::warning(
                FindingKind::MissingField,
                rel.clone(),
                format!("{risk_name}: Missing '**Details**' or '**詳細**' field"),
            ));
        }
        if !sections::has_field(&section.body, COUNTERMEASURES_LABELS) {
            findings.push(Finding::warning(
                FindingKind::MissingField,
                rel.clone(),
                format!("{risk_name}: Missing '**Countermeasures**' or '**対策**' field"),
            ));
        }
    }
    findings
}
