//! Incident document validation.

use crate::knowledge::sections::{
    self, RELATED_RISKS_LABELS, ROOT_CAUSE_LABELS, SUMMARY_LABELS,
};
use crate::knowledge::{markdown_files_in, Finding, FindingKind, RepoLayout};
use std::fs;

/// Required incident sections with their user-facing alias rendering.
const INCIDENT_SECTIONS: &[(&[&str], &str)] = &[
    (SUMMARY_LABELS, "## Summary or ## サマリー"),
    (ROOT_CAUSE_LABELS, "## Root Cause or ## 根本原因"),
    (RELATED_RISKS_LABELS, "## Related Risks or ## 関連リスク"),
];

pub(crate) fn validate_incidents(layout: &RepoLayout) -> Vec<Finding> {
    let mut findings = Vec::new();

    for path in markdown_files_in(&layout.incidents_root()) {
        let rel = layout.rel(&path);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                findings.push(Finding::error(
                    FindingKind::MissingArtifact,
                    rel,
                    format!("failed to read incident: {err}"),
                ));
                continue;
            }
        };

        for (aliases, display) in INCIDENT_SECTIONS {
            if !sections::has_section(&content, aliases) {
                findings.push(Finding::error(
                    FindingKind::MissingField,
                    rel.clone(),
                    format!("Missing required section: {display}"),
                ));
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::checks::fixtures::{cleanup, layout, write};

    #[test]
    fn missing_incidents_directory_yields_no_findings() {
        let layout = layout("incidents-no-dir");
        assert!(validate_incidents(&layout).is_empty());
        cleanup(&layout);
    }

    #[test]
    fn each_missing_section_is_its_own_error() {
        let layout = layout("incidents-sections");
        write(
            &layout,
            "incidents/outage-1.md",
            "# Outage 1\n\n## Summary\n\nBrief.\n",
        );
        let findings = validate_incidents(&layout);
        assert_eq!(findings.len(), 2, "findings: {findings:#?}");
        assert!(findings[0].message.contains("## Root Cause"));
        assert!(findings[1].message.contains("## Related Risks"));
        assert!(findings.iter().all(|f| f.path == "incidents/outage-1.md"));
        cleanup(&layout);
    }

    #[test]
    fn alternate_spellings_satisfy_the_contract() {
        let layout = layout("incidents-ja");
        write(
            &layout,
            "incidents/outage-2.md",
            "# 障害2\n\n## サマリー\n\n概要。\n\n## 根本原因\n\n原因。\n\n## 関連リスク\n\n- なし\n",
        );
        assert!(validate_incidents(&layout).is_empty());
        cleanup(&layout);
    }

    #[test]
    fn every_incident_file_is_scanned() {
        let layout = layout("incidents-multi");
        write(&layout, "incidents/a.md", "# A\n");
        write(&layout, "incidents/b.md", "# B\n");
        let findings = validate_incidents(&layout);
        assert_eq!(findings.len(), 6);
        assert!(findings.iter().take(3).all(|f| f.path == "incidents/a.md"));
        assert!(findings.iter().skip(3).all(|f| f.path == "incidents/b.md"));
        cleanup(&layout);
    }
}
