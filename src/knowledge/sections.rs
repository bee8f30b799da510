//! Line-oriented markdown section scanning.
//!
//! The document contract only cares about heading boundaries and bold field
//! labels, so no full markdown grammar is needed: headings are tokenized into
//! (title, body) records and field presence is a substring check over the
//! section body. Every required label accepts a set of alias spellings; the
//! corpus mixes English and Japanese labels and both are interchangeable.

/// Recognized spellings of the spec-document overview section.
pub const OVERVIEW_LABELS: &[&str] = &["Overview", "概要"];
/// Recognized spellings of the spec-document core-components section.
pub const CORE_COMPONENTS_LABELS: &[&str] = &["Core Components", "コアコンポーネント"];
/// Recognized spellings of the incident summary section.
pub const SUMMARY_LABELS: &[&str] = &["Summary", "サマリー"];
/// Recognized spellings of the incident root-cause section.
pub const ROOT_CAUSE_LABELS: &[&str] = &["Root Cause", "根本原因"];
/// Recognized spellings of the incident related-risks section.
pub const RELATED_RISKS_LABELS: &[&str] = &["Related Risks", "関連リスク"];
/// Recognized spellings of the risk-entry details field.
pub const DETAILS_LABELS: &[&str] = &["Details", "詳細"];
/// Recognized spellings of the risk-entry countermeasures field.
pub const COUNTERMEASURES_LABELS: &[&str] = &["Countermeasures", "対策"];

/// A heading-delimited section: heading title, heading level, and body text
/// up to the next heading of an equal-or-shallower scanned level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub body: String,
}

/// Scan `text` into sections delimited by headings of `min_level..=max_level`.
///
/// Content before the first matching heading is discarded. Headings outside
/// the scanned range stay inside the surrounding section body.
pub fn scan_sections(text: &str, min_level: usize, max_level: usize) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, usize, Vec<&str>)> = None;

    for line in text.lines() {
        match parse_heading(line) {
            Some((level, title)) if level >= min_level && level <= max_level => {
                if let Some((title, level, body)) = current.take() {
                    sections.push(Section {
                        title,
                        level,
                        body: body.join("\n"),
                    });
                }
                current = Some((title.trim().to_string(), level, Vec::new()));
            }
            _ => {
                if let Some((_, _, body)) = current.as_mut() {
                    body.push(line);
                }
            }
        }
    }

    if let Some((title, level, body)) = current.take() {
        sections.push(Section {
            title,
            level,
            body: body.join("\n"),
        });
    }

    sections
}

/// Whether `text` contains a level-2 heading spelled as any of `aliases`.
pub fn has_section(text: &str, aliases: &[&str]) -> bool {
    text.lines().any(|line| {
        parse_heading(line)
            .is_some_and(|(level, title)| level == 2 && aliases.contains(&title.trim()))
    })
}

/// Whether a section body carries a field labeled with any of `aliases`.
///
/// Accepts both the bold form (`**Details**`) and the bare colon-suffixed
/// form (`Details:`), matching how risk entries are authored in practice.
pub fn has_field(body: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|label| {
        body.contains(&format!("**{label}**")) || body.contains(&format!("{label}:"))
    })
}

/// Parse an ATX heading line into (level, title).
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let bytes = line.as_bytes();
    let mut count = 0usize;
    while count < bytes.len() && bytes[count] == b'#' {
        count += 1;
    }
    if count == 0 || count > 6 {
        return None;
    }
    if bytes.get(count).copied().map(|b| b.is_ascii_whitespace()) != Some(true) {
        return None;
    }
    Some((count, line[count..].trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISKS_DOC: &str = "\
# Auth - Risk Assessment

## Risk 1: Token Leak

**Details**:
Tokens can leak through logs.

**Countermeasures**:
- Redact tokens.

## Risk 2: Session Fixation

**詳細**:
Session ids survive login.
";

    #[test]
    fn scan_sections_yields_heading_and_body_records() {
        let sections = scan_sections(RISKS_DOC, 2, 3);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Risk 1: Token Leak");
        assert!(sections[0].body.contains("**Countermeasures**"));
        assert_eq!(sections[1].title, "Risk 2: Session Fixation");
        assert!(!sections[1].body.contains("Countermeasures"));
    }

    #[test]
    fn scan_sections_keeps_deeper_headings_in_body() {
        let text = "## Top\n### Nested\nbody\n## Next\n";
        let sections = scan_sections(text, 2, 2);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].body.contains("### Nested"));
    }

    #[test]
    fn has_section_accepts_either_alias_spelling() {
        assert!(has_section("## Overview\n\ntext\n", OVERVIEW_LABELS));
        assert!(has_section("## 概要\n\ntext\n", OVERVIEW_LABELS));
        assert!(!has_section("## Overview of things\n", OVERVIEW_LABELS));
        assert!(!has_section("### Overview\n", OVERVIEW_LABELS));
    }

    #[test]
    fn has_field_accepts_bold_and_colon_forms() {
        assert!(has_field("**Details**:\nbody", DETAILS_LABELS));
        assert!(has_field("詳細: body", DETAILS_LABELS));
        assert!(has_field("Countermeasures: do less", COUNTERMEASURES_LABELS));
        assert!(!has_field("No fields here", DETAILS_LABELS));
    }

    #[test]
    fn parse_heading_rejects_non_headings() {
        assert_eq!(parse_heading("plain text"), None);
        assert_eq!(parse_heading("####### too deep"), None);
        assert_eq!(parse_heading("#nospace"), None);
        assert_eq!(parse_heading("## Risk 1"), Some((2, "Risk 1")));
    }
}
