//! Canonical TOC entries and the helpers every classifier shares.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target of a TOC entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Anchor {
    /// In-document fragment, stored without the leading `#`.
    Fragment(String),
    /// Absolute `http(s)` URL.
    External(String),
}

impl Anchor {
    /// Build an anchor from a link target as written in Markdown.
    pub fn from_target(target: &str) -> Self {
        match target.strip_prefix('#') {
            Some(frag) => Anchor::Fragment(frag.to_string()),
            None => Anchor::External(target.to_string()),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Fragment(frag) => write!(f, "#{frag}"),
            Anchor::External(url) => f.write_str(url),
        }
    }
}

/// One reconstructed TOC line.
///
/// Created by exactly one classifier and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Dotted section number with any trailing `.` removed.
    pub section: Option<String>,
    pub title: String,
    pub anchor: Anchor,
    /// The source entry was struck through.
    pub struck: bool,
    /// Number of `.` in `section`; 0 for unnumbered entries.
    pub indent_level: usize,
}

impl TocEntry {
    /// A numbered entry. `section` may carry a trailing dot (`"2.1."`).
    pub fn numbered(section: &str, title: &str, anchor: Anchor, struck: bool) -> Self {
        let section = section.trim().trim_end_matches('.').to_string();
        let indent_level = section_depth(&section);
        Self {
            section: Some(section),
            title: title.trim().to_string(),
            anchor,
            struck,
            indent_level,
        }
    }

    /// An unnumbered entry (figure caption, bare title) at indent 0.
    pub fn plain(title: &str, anchor: Anchor, struck: bool) -> Self {
        Self {
            section: None,
            title: title.trim().to_string(),
            anchor,
            struck,
            indent_level: 0,
        }
    }

    /// Display text: `"<section> <title>"` or the bare title.
    pub fn label(&self) -> String {
        match &self.section {
            Some(section) => format!("{section} {}", self.title),
            None => self.title.clone(),
        }
    }
}

impl fmt::Display for TocEntry {
    /// Renders the Markdown list line, `"  * [1.1 Scope](#scope)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "  ".repeat(self.indent_level);
        if self.struck {
            write!(f, "{indent}* [~~{}~~]({})", self.label(), self.anchor)
        } else {
            write!(f, "{indent}* [{}]({})", self.label(), self.anchor)
        }
    }
}

/// Nesting depth of a dotted section number: `"2.1.3"` → 2.
pub fn section_depth(section: &str) -> usize {
    section.trim_end_matches('.').matches('.').count()
}

/// Slugify a title into a fragment the way the document converter does:
/// lower-case, spaces and en-dashes to `-`, everything that is not a word
/// character or `-` removed.
pub fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '\u{2013}' { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_dots() {
        assert_eq!(section_depth("2"), 0);
        assert_eq!(section_depth("2.1.3"), 2);
        assert_eq!(section_depth("2.1."), 1);
    }

    #[test]
    fn numbered_strips_trailing_dot() {
        let e = TocEntry::numbered("7.", "IP Addressing", Anchor::from_target("#ip"), false);
        assert_eq!(e.section.as_deref(), Some("7"));
        assert_eq!(e.indent_level, 0);
        assert_eq!(e.label(), "7 IP Addressing");
    }

    #[test]
    fn renders_nested_struck_entry() {
        let e = TocEntry::numbered("1.2", "Old", Anchor::from_target("#old"), true);
        assert_eq!(e.to_string(), "  * [~~1.2 Old~~](#old)");
    }

    #[test]
    fn renders_external_anchor() {
        let e = TocEntry::numbered(
            "1",
            "Hardware",
            Anchor::from_target("https://example.org/hw"),
            false,
        );
        assert_eq!(e.anchor, Anchor::External("https://example.org/hw".into()));
        assert_eq!(e.to_string(), "* [1 Hardware](https://example.org/hw)");
    }

    #[test]
    fn slugify_matches_converter() {
        assert_eq!(slugify("Scope and Purpose"), "scope-and-purpose");
        assert_eq!(slugify("Design – Overview"), "design---overview");
        assert_eq!(slugify("IP/MPLS (core)"), "ipmpls-core");
        assert_eq!(slugify("Données"), "données");
    }
}
