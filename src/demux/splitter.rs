//! Section splitter.
//!
//! Re-partitions the accumulated final report into named sections by
//! heading lines. The map is always rebuilt from the whole buffer, so
//! calling the splitter on an append-only buffer only ever extends the
//! lines already bound to each section.

use crate::core::{SECTION_HEADINGS, Section};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::OnceLock;

/// Lines of the final report grouped by section.
///
/// Bound lines are the lines under a recognised heading, heading included.
/// Lines before the first recognised heading are kept as the unclaimed
/// prefix. [`SectionMap::display_lines`] applies the Summary fallback on
/// top of the bound lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionMap {
    /// Bound lines, indexed by [`Section::index`].
    sections: [Vec<String>; 5],
    /// Lines that precede any recognised heading.
    unclaimed: Vec<String>,
}

impl SectionMap {
    /// Lines bound to `section` by a heading.
    #[must_use]
    pub fn lines(&self, section: Section) -> &[String] {
        &self.sections[section.index()]
    }

    /// Lines that precede the first recognised heading.
    #[must_use]
    pub fn unclaimed(&self) -> &[String] {
        &self.unclaimed
    }

    /// Lines to display for `section`.
    ///
    /// Summary falls back to the unclaimed prefix while no Summary heading
    /// has bound any lines.
    #[must_use]
    pub fn display_lines(&self, section: Section) -> &[String] {
        let bound = self.lines(section);
        if section == Section::Summary && bound.is_empty() {
            &self.unclaimed
        } else {
            bound
        }
    }

    /// Whether the Summary display currently comes from the unclaimed prefix.
    #[must_use]
    pub fn summary_is_fallback(&self) -> bool {
        self.lines(Section::Summary).is_empty() && !self.unclaimed.is_empty()
    }

    /// Display lines of `section` joined back into markdown, or `None` when
    /// there is nothing but whitespace to display.
    #[must_use]
    pub fn to_markdown(&self, section: Section) -> Option<String> {
        let lines = self.display_lines(section);
        if lines.iter().all(|line| line.trim().is_empty()) {
            return None;
        }
        Some(lines.join("\n"))
    }

    /// Sections with something to display, in table order.
    pub fn renderable(&self) -> impl Iterator<Item = (Section, String)> + '_ {
        Section::ALL
            .into_iter()
            .filter_map(|section| self.to_markdown(section).map(|md| (section, md)))
    }

    /// Whether no line was collected at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unclaimed.is_empty() && self.sections.iter().all(Vec::is_empty)
    }
}

/// Splits a final report into sections.
///
/// # Examples
///
/// ```
/// use fleetmux::core::Section;
/// use fleetmux::demux::splitter::split_sections;
///
/// let map = split_sections("Intro text\n# Study Roadmap\nWeek 1 plan");
/// assert_eq!(map.display_lines(Section::Summary), ["Intro text"]);
/// assert_eq!(map.lines(Section::Schedule), ["# Study Roadmap", "Week 1 plan"]);
/// ```
#[must_use]
pub fn split_sections(report: &str) -> SectionMap {
    let mut map = SectionMap::default();
    let mut current: Option<Section> = None;

    for line in report.split('\n') {
        if let Some(section) = binding_section(line) {
            current = Some(section);
        }
        match current {
            Some(section) => map.sections[section.index()].push(line.to_string()),
            None => map.unclaimed.push(line.to_string()),
        }
    }

    map
}

/// Whether a line is a heading candidate: one or more `#` then whitespace.
#[must_use]
pub fn is_heading_candidate(line: &str) -> bool {
    heading_prefix_len(line).is_some()
}

/// Returns the section a heading line binds to, if any.
///
/// The line must be a heading candidate and its text after the `#` prefix
/// must contain one of the section's phrases, ignoring case. Sections are
/// tried in table order.
#[must_use]
pub fn binding_section(line: &str) -> Option<Section> {
    let prefix = heading_prefix_len(line)?;
    let title = &line[prefix..];
    SECTION_HEADINGS
        .iter()
        .find(|headings| phrase_regex(headings.section).is_match(title))
        .map(|headings| headings.section)
}

fn heading_prefix_len(line: &str) -> Option<usize> {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    let heading = HEADING.get_or_init(|| Regex::new(r"^#+\s+").expect("valid regex"));
    heading.find(line).map(|m| m.end())
}

#[allow(clippy::expect_used)]
fn phrase_regex(section: Section) -> &'static Regex {
    static PHRASES: OnceLock<Vec<Regex>> = OnceLock::new();
    let compiled = PHRASES.get_or_init(|| {
        SECTION_HEADINGS
            .iter()
            .map(|headings| {
                let alternation = headings
                    .phrases()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join("|");
                RegexBuilder::new(&format!("(?:{alternation})"))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped phrases form a valid regex")
            })
            .collect()
    });
    &compiled[section.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_fallback_example() {
        let map = split_sections("Intro text\n# Study Roadmap\nWeek 1 plan");
        assert_eq!(map.display_lines(Section::Summary), ["Intro text"]);
        assert!(map.lines(Section::Summary).is_empty());
        assert!(map.summary_is_fallback());
        assert_eq!(
            map.display_lines(Section::Schedule),
            ["# Study Roadmap", "Week 1 plan"]
        );
    }

    #[test]
    fn test_all_sections() {
        let report = "\
# High-Yield Content Analysis
Key point
## Optimized Roadmap
Day 1
# Active Recall Assessment
Q1?
# External Resource Vault
- [Book](https://example.com)
# Performance Forecasting
Expect 85%";
        let map = split_sections(report);
        assert_eq!(map.lines(Section::Summary), ["# High-Yield Content Analysis", "Key point"]);
        assert_eq!(map.lines(Section::Schedule), ["## Optimized Roadmap", "Day 1"]);
        assert_eq!(map.lines(Section::Quiz), ["# Active Recall Assessment", "Q1?"]);
        assert_eq!(map.lines(Section::Resources).len(), 2);
        assert_eq!(map.lines(Section::Evaluation), ["# Performance Forecasting", "Expect 85%"]);
        assert!(map.unclaimed().is_empty());
        assert!(!map.summary_is_fallback());
    }

    #[test]
    fn test_non_binding_heading_stays_in_current_section() {
        let map = split_sections("# Practice Questions\n## Bonus Round\nQ9");
        assert_eq!(
            map.lines(Section::Quiz),
            ["# Practice Questions", "## Bonus Round", "Q9"]
        );
    }

    #[test]
    fn test_non_binding_heading_before_any_section_is_unclaimed() {
        let map = split_sections("# Welcome\ntext");
        assert_eq!(map.unclaimed(), ["# Welcome", "text"]);
        assert_eq!(map.display_lines(Section::Summary), ["# Welcome", "text"]);
    }

    #[test]
    fn test_bound_summary_suppresses_fallback() {
        let map = split_sections("preface\n# Content Analysis\nbody");
        assert_eq!(map.unclaimed(), ["preface"]);
        assert_eq!(map.display_lines(Section::Summary), ["# Content Analysis", "body"]);
    }

    #[test]
    fn test_empty_sections_not_renderable() {
        let map = split_sections("# Study Roadmap\nweek");
        let rendered: Vec<_> = map.renderable().map(|(s, _)| s).collect();
        assert_eq!(rendered, vec![Section::Schedule]);
        assert_eq!(map.to_markdown(Section::Quiz), None);
        assert_eq!(
            map.to_markdown(Section::Schedule).as_deref(),
            Some("# Study Roadmap\nweek")
        );
    }

    #[test]
    fn test_empty_report() {
        let map = split_sections("");
        assert_eq!(map.unclaimed(), [""]);
        assert!(!map.is_empty());
        assert_eq!(map.renderable().count(), 0);
    }

    #[test]
    fn test_idempotent() {
        let report = "x\n# Study Roadmap\ny\n# Practice Questions\nz\n";
        assert_eq!(split_sections(report), split_sections(report));
        assert_eq!(split_sections(report), split_sections(&format!("{report}{}", "")));
    }

    #[test_case("# Study Roadmap", Some(Section::Schedule) ; "alternate phrase")]
    #[test_case("### optimized roadmap", Some(Section::Schedule) ; "case insensitive")]
    #[test_case("# 2. Optimized Roadmap (Week View)", Some(Section::Schedule) ; "phrase after numbering")]
    #[test_case("#Study Roadmap", None ; "no whitespace after hashes")]
    #[test_case("Study Roadmap", None ; "not a heading")]
    #[test_case("  # Study Roadmap", None ; "indented heading")]
    #[test_case("# Performance Analysis", Some(Section::Evaluation) ; "evaluation alternate")]
    #[test_case("# Recommended Resources", Some(Section::Resources) ; "resources alternate")]
    #[test_case("# Unrelated Heading", None ; "unknown heading")]
    fn test_binding_section(line: &str, expected: Option<Section>) {
        assert_eq!(binding_section(line), expected);
    }

    #[test]
    fn test_heading_candidate() {
        assert!(is_heading_candidate("# Anything"));
        assert!(is_heading_candidate("####\tTabbed"));
        assert!(!is_heading_candidate("#hashtag"));
        assert!(!is_heading_candidate("plain"));
    }
}
