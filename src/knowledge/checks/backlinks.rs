//! Bidirectional link checking between incidents and risk documents.
//!
//! Two passes share the same reference model. The mirror pass (part of the
//! full validation run) only compares extracted links in both directions and
//! attributes each unmirrored reference to the document that linked outward.
//! The integrity pass (the `check-links` command) additionally requires every
//! link target to exist on disk, and accepts a plain textual mention of the
//! linking document as acknowledgement: any of its file name, its containing
//! directory name, or its full relative path satisfies the check.

use crate::knowledge::index::{entry_seq, entry_str, load_index};
use crate::knowledge::links::{extract_markdown_links, resolve_target, strip_relative_prefix};
use crate::knowledge::{
    markdown_files_in, subdirectories_of, Finding, FindingKind, RepoLayout, RISKS_FILE_NAME,
};
use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;

/// Outgoing references of one corpus side, keyed in scan order.
struct ReferenceMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ReferenceMap {
    fn get(&self, key: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, refs)| refs)
    }
}

/// Mirror-only backlink findings for the full validation pass.
pub(crate) fn mirror_findings(layout: &RepoLayout) -> Vec<Finding> {
    let incidents_root = layout.incidents_root();
    let domains_root = layout.domains_root();
    // Absence of either corpus short-circuits with zero findings.
    if !incidents_root.is_dir() || !domains_root.is_dir() {
        return Vec::new();
    }

    let incident_refs = collect_incident_references(layout);
    let risk_refs = collect_risk_references(layout);
    let incidents_prefix = format!("{}/", layout.rel(&incidents_root));

    let mut findings = Vec::new();

    // Incident -> risk: the incident is the unacknowledged source.
    for (incident_name, risks) in &incident_refs.entries {
        for risk_rel in risks {
            let Some(backrefs) = risk_refs.get(risk_rel) else {
                continue;
            };
            if !backrefs.contains(incident_name) {
                findings.push(Finding::warning(
                    FindingKind::UnmirroredBacklink,
                    format!("{incidents_prefix}{incident_name}"),
                    format!(
                        "Missing backlink: references {risk_rel}, but {risk_rel} doesn't reference this incident"
                    ),
                ));
            }
        }
    }

    // Risk -> incident: the risk document is the unacknowledged source.
    for (risk_rel, incidents) in &risk_refs.entries {
        for incident_name in incidents {
            let Some(outgoing) = incident_refs.get(incident_name) else {
                continue;
            };
            if !outgoing.contains(risk_rel) {
                findings.push(Finding::warning(
                    FindingKind::UnmirroredBacklink,
                    risk_rel.clone(),
                    format!(
                        "Missing backlink: references {incidents_prefix}{incident_name}, but {incidents_prefix}{incident_name} doesn't reference this risk file"
                    ),
                ));
            }
        }
    }

    findings
}

/// Strict link-integrity findings for the `check-links` command.
pub(crate) fn integrity_findings(layout: &RepoLayout) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(index_path_findings(layout));
    findings.extend(incident_link_findings(layout));
    findings.extend(risk_link_findings(layout));
    findings
}

/// Every path declared in the index must exist.
fn index_path_findings(layout: &RepoLayout) -> Vec<Finding> {
    let loaded = match load_index(layout) {
        Ok(loaded) => loaded,
        Err(err) => return vec![err.into_finding(layout)],
    };
    let index_path = layout.rel(&loaded.path);

    let mut findings = Vec::new();
    for (idx, entry) in loaded.entries.iter().enumerate() {
        let domain = entry_str(entry, "domain_name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("Entry #{}", idx + 1));
        let Some(related) = entry.get("related_files") else {
            continue;
        };
        for group in ["common_risks", "domain_knowledge"] {
            let Some(paths) = entry_seq(related, group) else {
                continue;
            };
            for path in paths.iter().filter_map(Value::as_str) {
                if !layout.root().join(path).exists() {
                    findings.push(Finding::error(
                        FindingKind::DanglingReference,
                        index_path.clone(),
                        format!("[{domain}] File not found: {path}"),
                    ));
                }
            }
        }
    }
    findings
}

/// Incident -> risk links: targets must exist, risks must acknowledge the
/// incident by file name.
fn incident_link_findings(layout: &RepoLayout) -> Vec<Finding> {
    let mut findings = Vec::new();

    for incident_file in markdown_files_in(&layout.incidents_root()) {
        let Ok(content) = fs::read_to_string(&incident_file) else {
            continue;
        };
        let incident_rel = layout.rel(&incident_file);
        let incident_name = file_name_of(&incident_file);

        for link in extract_markdown_links(&content) {
            if !link.contains(RISKS_FILE_NAME) {
                continue;
            }
            let target = resolve_target(layout.root(), &incident_file, &link);
            let Ok(risk_content) = fs::read_to_string(&target) else {
                findings.push(Finding::error(
                    FindingKind::DanglingReference,
                    incident_rel.clone(),
                    format!("Broken link {link}: File not found"),
                ));
                continue;
            };
            if !risk_content.contains(&incident_name) {
                let risk_rel = layout.rel(&target);
                findings.push(Finding::warning(
                    FindingKind::UnmirroredBacklink,
                    incident_rel.clone(),
                    format!(
                        "Missing backlink: references {risk_rel}, but {risk_rel} doesn't reference this incident"
                    ),
                ));
            }
        }
    }

    findings
}

/// Risk -> incident links: targets must exist, incidents may acknowledge the
/// risk by any of file name, domain folder name, or full relative path.
fn risk_link_findings(layout: &RepoLayout) -> Vec<Finding> {
    let incidents_rel = layout.rel(&layout.incidents_root());
    let mut findings = Vec::new();

    for risks_file in risk_files(layout) {
        let Ok(content) = fs::read_to_string(&risks_file) else {
            continue;
        };
        let risk_rel = layout.rel(&risks_file);
        let domain_name = risks_file
            .parent()
            .map(file_name_of)
            .unwrap_or_default();

        for link in extract_markdown_links(&content) {
            if !strip_relative_prefix(&link).starts_with(&format!("{incidents_rel}/")) {
                continue;
            }
            let target = resolve_target(layout.root(), &risks_file, &link);
            let Ok(incident_content) = fs::read_to_string(&target) else {
                findings.push(Finding::error(
                    FindingKind::DanglingReference,
                    risk_rel.clone(),
                    format!("Broken link {link}: File not found"),
                ));
                continue;
            };
            let acknowledged = incident_content.contains(&risk_rel)
                || incident_content.contains(RISKS_FILE_NAME)
                || incident_content.contains(&domain_name);
            if !acknowledged {
                let incident_rel = layout.rel(&target);
                findings.push(Finding::warning(
                    FindingKind::UnmirroredBacklink,
                    risk_rel.clone(),
                    format!(
                        "Missing backlink: references {incident_rel}, but {incident_rel} doesn't reference this risk file"
                    ),
                ));
            }
        }
    }

    findings
}

fn collect_incident_references(layout: &RepoLayout) -> ReferenceMap {
    let domains_rel = layout.rel(&layout.domains_root());
    let mut entries = Vec::new();

    for incident_file in markdown_files_in(&layout.incidents_root()) {
        let Ok(content) = fs::read_to_string(&incident_file) else {
            continue;
        };
        let risks: Vec<String> = extract_markdown_links(&content)
            .iter()
            .map(|link| strip_relative_prefix(link).to_string())
            .filter(|link| {
                link.starts_with(&format!("{domains_rel}/"))
                    && link.ends_with(&format!("/{RISKS_FILE_NAME}"))
            })
            .collect();
        entries.push((file_name_of(&incident_file), risks));
    }

    ReferenceMap { entries }
}

fn collect_risk_references(layout: &RepoLayout) -> ReferenceMap {
    let incidents_rel = layout.rel(&layout.incidents_root());
    let incidents_prefix = format!("{incidents_rel}/");
    let mut entries = Vec::new();

    for risks_file in risk_files(layout) {
        let Ok(content) = fs::read_to_string(&risks_file) else {
            continue;
        };
        let incidents: Vec<String> = extract_markdown_links(&content)
            .iter()
            .map(|link| strip_relative_prefix(link).to_string())
            .filter(|link| link.starts_with(&incidents_prefix))
            .map(|link| link[incidents_prefix.len()..].to_string())
            .collect();
        entries.push((layout.rel(&risks_file), incidents));
    }

    ReferenceMap { entries }
}

/// The `risks.md` documents of every domain folder, in scan order.
fn risk_files(layout: &RepoLayout) -> Vec<PathBuf> {
    subdirectories_of(&layout.domains_root())
        .into_iter()
        .map(|dir| dir.join(RISKS_FILE_NAME))
        .filter(|path| path.is_file())
        .collect()
}

fn file_name_of(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::checks::fixtures::{self, cleanup, layout, write};
    use crate::knowledge::Severity;

    #[test]
    fn mirrored_references_produce_no_findings() {
        let layout = layout("backlinks-clean");
        fixtures::well_formed(&layout);
        let findings = mirror_findings(&layout);
        assert!(findings.is_empty(), "findings: {findings:#?}");
        cleanup(&layout);
    }

    #[test]
    fn absent_corpus_short_circuits_with_zero_findings() {
        let layout = layout("backlinks-absent");
        write(&layout, "incidents/outage-1.md", fixtures::OUTAGE_1);
        // No domains/ tree at all.
        assert!(mirror_findings(&layout).is_empty());
        cleanup(&layout);
    }

    #[test]
    fn unmirrored_incident_reference_names_the_incident_as_source() {
        let layout = layout("backlinks-incident-src");
        write(&layout, "domains/auth/risks.md", "# Auth Risks\n\n## Risk 1\n");
        write(
            &layout,
            "incidents/outage-2.md",
            "# Outage 2\n\n- [risk](domains/auth/risks.md)\n",
        );
        let findings = mirror_findings(&layout);
        assert_eq!(findings.len(), 1, "findings: {findings:#?}");
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].kind, FindingKind::UnmirroredBacklink);
        assert_eq!(findings[0].path, "incidents/outage-2.md");
        assert!(findings[0].message.contains("domains/auth/risks.md"));
        cleanup(&layout);
    }

    #[test]
    fn unmirrored_risk_reference_names_the_risk_as_source() {
        let layout = layout("backlinks-risk-src");
        write(
            &layout,
            "domains/auth/risks.md",
            "# Auth Risks\n\n## Risk 1\n\nSee [outage](../../incidents/outage-3.md).\n",
        );
        write(&layout, "incidents/outage-3.md", "# Outage 3\n\nNo links.\n");
        let findings = mirror_findings(&layout);
        assert_eq!(findings.len(), 1, "findings: {findings:#?}");
        assert_eq!(findings[0].path, "domains/auth/risks.md");
        assert!(findings[0].message.contains("incidents/outage-3.md"));
        cleanup(&layout);
    }

    #[test]
    fn reference_to_unscanned_risk_is_skipped_by_the_mirror_pass() {
        let layout = layout("backlinks-unscanned");
        fixtures::mkdir(&layout, "domains/empty");
        write(
            &layout,
            "incidents/outage-4.md",
            "# Outage 4\n\n- [risk](domains/ghost/risks.md)\n",
        );
        // The dangling target is the integrity pass's concern, not the
        // mirror pass's.
        assert!(mirror_findings(&layout).is_empty());
        cleanup(&layout);
    }

    #[test]
    fn integrity_pass_reports_broken_link_targets_as_errors() {
        let layout = layout("backlinks-broken");
        fixtures::well_formed(&layout);
        write(
            &layout,
            "incidents/outage-5.md",
            "# Outage 5\n\n## Summary\n\nx\n\n## Root Cause\n\nx\n\n## Related Risks\n\n- [gone](domains/ghost/risks.md)\n",
        );
        let findings = integrity_findings(&layout);
        let broken: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::DanglingReference)
            .collect();
        assert_eq!(broken.len(), 1, "findings: {findings:#?}");
        assert_eq!(broken[0].path, "incidents/outage-5.md");
        assert!(broken[0].message.contains("File not found"));
        cleanup(&layout);
    }

    #[test]
    fn text_mention_of_the_incident_name_satisfies_the_backlink() {
        let layout = layout("backlinks-textual");
        write(
            &layout,
            "domains/auth/risks.md",
            "# Auth Risks\n\n## Risk 1\n\nObserved during outage-6.md cleanup.\n",
        );
        write(
            &layout,
            "incidents/outage-6.md",
            "# Outage 6\n\n- [risk](domains/auth/risks.md)\n",
        );
        let findings = integrity_findings(&layout);
        assert!(
            !findings
                .iter()
                .any(|f| f.kind == FindingKind::UnmirroredBacklink),
            "findings: {findings:#?}"
        );
        cleanup(&layout);
    }

    #[test]
    fn domain_directory_mention_alone_satisfies_the_reverse_backlink() {
        let layout = layout("backlinks-dirname");
        write(
            &layout,
            "domains/auth/risks.md",
            "# Auth Risks\n\n## Risk 1\n\nSee [outage](../../incidents/outage-7.md).\n",
        );
        // The incident only names the domain folder, not the risk file.
        write(
            &layout,
            "incidents/outage-7.md",
            "# Outage 7\n\nRelated to the auth domain.\n",
        );
        let findings = integrity_findings(&layout);
        assert!(
            !findings
                .iter()
                .any(|f| f.kind == FindingKind::UnmirroredBacklink),
            "findings: {findings:#?}"
        );
        cleanup(&layout);
    }

    #[test]
    fn risk_file_name_mention_alone_satisfies_the_reverse_backlink() {
        let layout = layout("backlinks-filename");
        write(
            &layout,
            "domains/auth/risks.md",
            "# Auth Risks\n\n## Risk 1\n\nSee [outage](../../incidents/outage-10.md).\n",
        );
        write(
            &layout,
            "incidents/outage-10.md",
            "# Outage 10\n\nCaptured in a risks.md file.\n",
        );
        let findings = integrity_findings(&layout);
        assert!(
            !findings
                .iter()
                .any(|f| f.kind == FindingKind::UnmirroredBacklink),
            "findings: {findings:#?}"
        );
        cleanup(&layout);
    }

    #[test]
    fn silent_incident_yields_a_reverse_backlink_warning() {
        let layout = layout("backlinks-silent");
        write(
            &layout,
            "domains/auth/risks.md",
            "# Auth Risks\n\n## Risk 1\n\nSee [outage](../../incidents/outage-8.md).\n",
        );
        write(&layout, "incidents/outage-8.md", "# Outage 8\n\nNothing related.\n");
        let findings = integrity_findings(&layout);
        let backlinks: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::UnmirroredBacklink)
            .collect();
        assert_eq!(backlinks.len(), 1, "findings: {findings:#?}");
        assert_eq!(backlinks[0].path, "domains/auth/risks.md");
        cleanup(&layout);
    }
}
