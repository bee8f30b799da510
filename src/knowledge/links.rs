//! Markdown link extraction and normalization.
//!
//! Pulls `[label](target)` references out of document text without a full
//! markdown parse. Only local targets ending in the knowledge-base document
//! extension survive; anchors are stripped and absolute URLs are skipped.
//! Malformed markdown never fails extraction; it just yields fewer matches.

use std::path::{Path, PathBuf};

/// Extract ordered local markdown-link targets ending in `.md`.
///
/// Anchors (`#fragment`) are stripped before the extension check, so
/// `risks.md#risk-1` counts. Targets with an `http` scheme prefix are
/// excluded; image links (`![..](..)`) are not.
pub fn extract_markdown_links(text: &str) -> Vec<String> {
    let mut links = Vec::new();
    for line in text.lines() {
        for target in link_targets_in_line(line) {
            let target = strip_anchor(&target);
            if target.starts_with("http") {
                continue;
            }
            if target.ends_with(".md") {
                links.push(target.to_string());
            }
        }
    }
    links
}

/// Strip a trailing `#fragment` from a link target.
pub fn strip_anchor(target: &str) -> &str {
    match target.split_once('#') {
        Some((path, _)) => path,
        None => target,
    }
}

/// Strip leading `./` and `../` segments from a relative target.
///
/// Backlink maps key on root-relative paths, so `../../incidents/a.md` and
/// `incidents/a.md` must normalize to the same entry.
pub fn strip_relative_prefix(target: &str) -> &str {
    let mut rest = target;
    loop {
        if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Resolve a link target against the repository root or the source file.
///
/// Targets beginning with `../` are taken relative to the containing file;
/// everything else is taken relative to the repository root. The result is a
/// plain join; existence is the caller's concern.
pub fn resolve_target(root: &Path, source_file: &Path, target: &str) -> PathBuf {
    if target.starts_with("../") {
        let parent = source_file.parent().unwrap_or(root);
        normalize_dots(&parent.join(target))
    } else {
        normalize_dots(&root.join(strip_relative_prefix(target)))
    }
}

/// Collapse `.` and `..` components lexically, without touching the disk.
fn normalize_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Scan one line for `[label](target)` occurrences, skipping image links.
fn link_targets_in_line(line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'[' || (i > 0 && bytes[i - 1] == b'!') {
            i += 1;
            continue;
        }

        let Some(label_end) = find_byte(bytes, b']', i + 1) else {
            break;
        };
        if bytes.get(label_end + 1) != Some(&b'(') {
            i = label_end + 1;
            continue;
        }
        let Some(target_end) = find_byte(bytes, b')', label_end + 2) else {
            break;
        };

        out.push(line[label_end + 2..target_end].trim().to_string());
        i = target_end + 1;
    }

    out
}

fn find_byte(bytes: &[u8], target: u8, start: usize) -> Option<usize> {
    bytes[start..]
        .iter()
        .position(|b| *b == target)
        .map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_local_markdown_targets_in_order() {
        let text = "\
See [auth risks](domains/auth/risks.md) and [summary](../incidents/outage-1.md).\n\
External: [docs](https://example.com/page.md) stays out.\n\
Also [spec](domains/auth/spec.md#overview) keeps its order.\n";
        assert_eq!(
            extract_markdown_links(text),
            vec![
                "domains/auth/risks.md",
                "../incidents/outage-1.md",
                "domains/auth/spec.md",
            ]
        );
    }

    #[test]
    fn malformed_markdown_yields_empty_sequence() {
        assert!(extract_markdown_links("[broken](no-close").is_empty());
        assert!(extract_markdown_links("no links at all").is_empty());
        assert!(extract_markdown_links("[label] (spaced.md)").is_empty());
    }

    #[test]
    fn image_links_are_skipped() {
        assert!(extract_markdown_links("![diagram](assets/flow.md)").is_empty());
    }

    #[test]
    fn non_markdown_targets_are_skipped() {
        assert!(extract_markdown_links("[chart](assets/flow.png)").is_empty());
    }

    #[test]
    fn strip_relative_prefix_collapses_leading_segments() {
        assert_eq!(
            strip_relative_prefix("../../incidents/outage-1.md"),
            "incidents/outage-1.md"
        );
        assert_eq!(strip_relative_prefix("./risks.md"), "risks.md");
        assert_eq!(strip_relative_prefix("incidents/a.md"), "incidents/a.md");
    }

    #[test]
    fn resolve_target_uses_source_parent_for_parent_relative_links() {
        let root = Path::new("/kb");
        let source = Path::new("/kb/domains/auth/risks.md");
        assert_eq!(
            resolve_target(root, source, "../../incidents/outage-1.md"),
            PathBuf::from("/kb/incidents/outage-1.md")
        );
        assert_eq!(
            resolve_target(root, source, "incidents/outage-1.md"),
            PathBuf::from("/kb/incidents/outage-1.md")
        );
    }
}
