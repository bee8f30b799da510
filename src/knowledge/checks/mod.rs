//! Validation passes over the knowledge base.
//!
//! Each submodule owns one family of checks and returns findings instead of
//! failing: a defective document becomes a diagnostic and the scan moves on,
//! so one bad file cannot mask problems elsewhere. Orchestration here fixes
//! the discovery order that the report preserves.

mod backlinks;
mod domains;
mod incidents;
mod index;

use crate::knowledge::index::load_index;
use crate::knowledge::{Finding, RepoLayout};

/// Run the full validation pass: index, domain folders, backlink mirroring,
/// and incident documents.
///
/// An unloadable index contributes a single finding; the remaining checks
/// still execute so index corruption never hides corpus defects.
pub fn run_validation(layout: &RepoLayout) -> Vec<Finding> {
    let mut findings = Vec::new();

    match load_index(layout) {
        Ok(loaded) => findings.extend(index::validate_index(layout, &loaded)),
        Err(err) => findings.push(err.into_finding(layout)),
    }

    findings.extend(domains::validate_domains(layout));
    findings.extend(backlinks::mirror_findings(layout));
    findings.extend(incidents::validate_incidents(layout));

    findings
}

/// Run the strict link-integrity pass: index-declared paths, extracted link
/// targets, and permissive backlink acknowledgement.
pub fn run_link_check(layout: &RepoLayout) -> Vec<Finding> {
    backlinks::integrity_findings(layout)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::knowledge::RepoLayout;
    use crate::runtime::config::KbConfig;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn layout(prefix: &str) -> RepoLayout {
        let root = std::env::temp_dir().join(format!(
            "riskkb-{prefix}-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ));
        fs::create_dir_all(&root).expect("create fixture root");
        RepoLayout::new(root, KbConfig::default())
    }

    pub fn write(layout: &RepoLayout, rel: &str, content: &str) {
        let path = layout.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(path, content).expect("write fixture file");
    }

    pub fn cleanup(layout: &RepoLayout) {
        let _ = fs::remove_dir_all(layout.root());
    }

    pub fn mkdir(layout: &RepoLayout, rel: &str) {
        fs::create_dir_all(layout.root().join(rel)).expect("create fixture dir");
    }

    pub const WELL_FORMED_INDEX: &str = "\
- domain_name: Auth
  description: Authentication flows
  keywords: [auth, login]
  related_files:
    common_risks:
      - common-risks/security.md
    domain_knowledge:
      - domains/auth/spec.md
      - domains/auth/risks.md
";

    pub const AUTH_SPEC: &str = "\
# Auth - Feature Specification

## Overview

Login and session handling.

## Core Components

### Session Store

Keeps sessions.
";

    pub const AUTH_RISKS: &str = "\
# Auth - Risk Assessment

## Risk 1: Token Leak

**Details**:
Tokens can leak through logs. See [outage-1](../../incidents/outage-1.md).

**Countermeasures**:
- Redact tokens.
";

    pub const OUTAGE_1: &str = "\
# Outage 1

## Summary

Tokens leaked.

## Root Cause

Verbose logging.

## Related Risks

- [Token leak](domains/auth/risks.md)
";

    /// Populate a fully consistent repository under `layout`.
    pub fn well_formed(layout: &RepoLayout) {
        write(layout, "indexes/knowledge-index.yml", WELL_FORMED_INDEX);
        write(layout, "common-risks/security.md", "# Security\n");
        write(layout, "domains/auth/spec.md", AUTH_SPEC);
        write(layout, "domains/auth/risks.md", AUTH_RISKS);
        write(layout, "incidents/outage-1.md", OUTAGE_1);
    }
}
