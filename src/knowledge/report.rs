//! Diagnostic aggregation and rendering.

use crate::knowledge::{Finding, Severity};
use crate::runtime::error::{KbError, KbResult};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::collections::BTreeMap;

/// A validation run's findings, partitioned by severity.
///
/// Discovery order is preserved within each partition. Warnings never affect
/// the run outcome; one or more errors fail it.
#[derive(Clone, Debug, Default)]
pub struct Report {
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl Report {
    /// Partition findings by severity, preserving discovery order.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        let mut report = Report::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => report.errors.push(finding),
                Severity::Warning => report.warnings.push(finding),
            }
        }
        report
    }

    /// Error findings in discovery order.
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    /// Warning findings in discovery order.
    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    /// Whether the run failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Print the grouped diagnostic listing and summary line to stdout.
    pub fn print(&self) {
        if !self.errors.is_empty() {
            println!("ERRORS:");
            for finding in &self.errors {
                println!("  {finding}");
            }
            println!();
        }

        if !self.warnings.is_empty() {
            println!("WARNINGS:");
            for finding in &self.warnings {
                println!("  {finding}");
            }
            println!();
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("OK");
        } else if self.errors.is_empty() {
            println!("OK: {} warning(s)", self.warnings.len());
        } else {
            println!(
                "FAILED: {} error(s), {} warning(s)",
                self.errors.len(),
                self.warnings.len()
            );
        }
    }

    /// Map the report to the process-level outcome.
    ///
    /// Machine consumers rely solely on the exit code, so the error carries no
    /// detail beyond the failure itself.
    pub fn outcome(&self) -> KbResult<()> {
        if self.has_errors() {
            Err(KbError::validation(format!(
                "validation failed with {} error(s)",
                self.errors.len()
            )))
        } else {
            Ok(())
        }
    }

    /// Machine-readable report payload.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "error_count": self.errors.len(),
            "warning_count": self.warnings.len(),
            "counts_by_kind": self.counts_by_kind(),
            "findings": self
                .errors
                .iter()
                .chain(self.warnings.iter())
                .map(finding_json)
                .collect::<Vec<_>>(),
        })
    }

    fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for finding in self.errors.iter().chain(self.warnings.iter()) {
            *counts.entry(finding.kind.as_str()).or_default() += 1;
        }
        counts
    }
}

fn finding_json(finding: &Finding) -> serde_json::Value {
    json!({
        "severity": finding.severity.to_string(),
        "kind": finding.kind.as_str(),
        "path": finding.path,
        "message": finding.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::FindingKind;

    fn sample_findings() -> Vec<Finding> {
        vec![
            Finding::warning(
                FindingKind::DuplicateKey,
                "indexes/knowledge-index.yml",
                "Entry #2: Keyword 'auth' already used in 'Auth'",
            ),
            Finding::error(
                FindingKind::MissingArtifact,
                "domains/billing",
                "Missing risks.md",
            ),
            Finding::error(
                FindingKind::MissingField,
                "domains/auth/spec.md",
                "Missing required section: ## Overview or ## 概要",
            ),
        ]
    }

    #[test]
    fn partitions_preserve_discovery_order() {
        let report = Report::from_findings(sample_findings());
        assert_eq!(report.errors().len(), 2);
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.errors()[0].path, "domains/billing");
        assert_eq!(report.errors()[1].path, "domains/auth/spec.md");
    }

    #[test]
    fn warnings_alone_do_not_fail_the_run() {
        let report = Report::from_findings(vec![Finding::warning(
            FindingKind::UnmirroredBacklink,
            "incidents/outage-2.md",
            "missing backlink",
        )]);
        assert!(report.outcome().is_ok());
    }

    #[test]
    fn errors_fail_the_run() {
        let report = Report::from_findings(sample_findings());
        let err = report.outcome().expect_err("errors should fail");
        assert!(err.to_string().contains("2 error(s)"));
    }

    #[test]
    fn json_payload_counts_by_kind() {
        let report = Report::from_findings(sample_findings());
        let payload = report.to_json();
        assert_eq!(payload["error_count"], 2);
        assert_eq!(payload["warning_count"], 1);
        assert_eq!(payload["counts_by_kind"]["missing_field"], 1);
        assert_eq!(payload["findings"].as_array().expect("findings").len(), 3);
        assert!(payload["generated_at"].is_string());
    }
}
