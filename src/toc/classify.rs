//! Line classifiers: one recogniser per TOC-entry encoding.
//!
//! Word-processor exports spell the same logical entry many different ways
//! (nested page links, `<span class="mark">` wrappers, bare text with a
//! page number, …). Each recogniser below handles exactly one spelling and
//! is a pure function of the line and its strikethrough flag.
//!
//! [`CASCADE`] fixes the priority order. The first classifier that does not
//! answer [`Classification::NoMatch`] decides the line, so the more specific
//! shapes must come before the permissive ones: classifier 8 accepts any
//! line with a fragment link anywhere and would swallow everything above it.
//!
//! | # | Kind | Shape |
//! |---|------|-------|
//! | 1 | `ExternalUrl`     | `[1 [Title](https://…)](…)` |
//! | 2 | `SpanInLink`      | `[<span>1 Title</span> [7](#a)](#a)` |
//! | 3 | `FigureCaption`   | `[Figure 1: Caption [8](#a)](#a)` |
//! | 4 | `BracketedLink`   | `[1 Title [6](#a)](#a)` |
//! | 5 | `SpanPair`        | `<span>1</span> <span>Title</span> [7](#a)` |
//! | 6 | `PlainLink`       | `1 Title [40](#a)` |
//! | 7 | `PlainText`       | `1 Title 6` (anchor slugified) |
//! | 8 | `LinkInText`      | anything containing `[text](#a)` or `[text](https://…)` |
//! | 9 | `Annex`           | `ANNEX A - Title 42` (anchor slugified) |

use crate::toc::entry::{slugify, Anchor, TocEntry};
use crate::toc::patterns::is_self_reference;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of offering one line to one classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched(TocEntry),
    /// The line has this classifier's shape but names the TOC itself; it is
    /// dropped and the cascade stops.
    SelfReference,
    NoMatch,
}

/// Identifies a classifier in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    ExternalUrl,
    SpanInLink,
    FigureCaption,
    BracketedLink,
    SpanPair,
    PlainLink,
    PlainText,
    LinkInText,
    Annex,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClassifierKind::ExternalUrl => "external-url",
            ClassifierKind::SpanInLink => "span-in-link",
            ClassifierKind::FigureCaption => "figure-caption",
            ClassifierKind::BracketedLink => "bracketed-link",
            ClassifierKind::SpanPair => "span-pair",
            ClassifierKind::PlainLink => "plain-link",
            ClassifierKind::PlainText => "plain-text",
            ClassifierKind::LinkInText => "link-in-text",
            ClassifierKind::Annex => "annex",
        };
        f.pad(s)
    }
}

/// Signature shared by every classifier: cleaned line + strikethrough flag.
pub type ClassifierFn = fn(&str, bool) -> Classification;

/// All classifiers in priority order.
pub const CASCADE: &[(ClassifierKind, ClassifierFn)] = &[
    (ClassifierKind::ExternalUrl, external_url),
    (ClassifierKind::SpanInLink, span_in_link),
    (ClassifierKind::FigureCaption, figure_caption),
    (ClassifierKind::BracketedLink, bracketed_link),
    (ClassifierKind::SpanPair, span_pair),
    (ClassifierKind::PlainLink, plain_link),
    (ClassifierKind::PlainText, plain_text),
    (ClassifierKind::LinkInText, link_in_text),
    (ClassifierKind::Annex, annex),
];

/// Strip strikethrough from `line` and run the cascade.
///
/// Returns the deciding classifier and its verdict, or `None` when no
/// classifier recognised the line.
pub fn classify(line: &str) -> Option<(ClassifierKind, Classification)> {
    let (clean, struck) = strip_strikethrough(line);
    CASCADE
        .iter()
        .find_map(|(kind, classifier)| match classifier(&clean, struck) {
            Classification::NoMatch => None,
            verdict => Some((*kind, verdict)),
        })
}

// ── Shared fragments ─────────────────────────────────────────────────────

static RE_STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<span[^>]*>~~|~~</span>|~~").unwrap());

/// Remove `~~` markers (bare or wrapped in a `<span>`), reporting whether
/// any were present.
pub fn strip_strikethrough(line: &str) -> (String, bool) {
    let struck = line.contains("~~");
    if struck {
        (RE_STRIKETHROUGH.replace_all(line, "").into_owned(), true)
    } else {
        (line.to_string(), false)
    }
}

static RE_PAGE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\[\d+\]\(#[^)]+\)").unwrap());
static RE_SPAN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<span[^>]*>|</span>").unwrap());
static RE_SECTION_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*\.?)\s+(.+)$").unwrap());

fn numbered_or_plain(text: &str, anchor: &str, struck: bool) -> TocEntry {
    match RE_SECTION_TITLE.captures(text) {
        Some(caps) => TocEntry::numbered(&caps[1], &caps[2], Anchor::from_target(anchor), struck),
        None => TocEntry::plain(text, Anchor::from_target(anchor), struck),
    }
}

// ── 1. External URL ──────────────────────────────────────────────────────

static RE_EXTERNAL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+(?:\.\d+)*\.?)\s+\[(.*?)\]\((https?://[^)]+)\)\]\(.*\)$").unwrap()
});

fn external_url(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_EXTERNAL_URL.captures(line) else {
        return Classification::NoMatch;
    };
    Classification::Matched(TocEntry::numbered(
        &caps[1],
        &caps[2],
        Anchor::External(caps[3].to_string()),
        struck,
    ))
}

// ── 2. Span-wrapped text inside a doubly-linked reference ────────────────

static RE_SPAN_IN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\s*<span[^>]*>([^<]+)</span>\s*\[(\d+)\]\((#[^)]+)\)\s*\]\((#[^)]+)\)$")
        .unwrap()
});

fn span_in_link(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_SPAN_IN_LINK.captures(line) else {
        return Classification::NoMatch;
    };
    let text = caps[1].trim();
    if is_self_reference(text) {
        return Classification::SelfReference;
    }
    Classification::Matched(numbered_or_plain(text, &caps[4], struck))
}

// ── 3. Figure / table caption ────────────────────────────────────────────

static RE_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[((?:Figure|Table|Fig\.|Tab\.)\s+\d+:?\s+[^\[]+)\s+\[\d+\]\((#[^)]+)\)\]\((#[^)]+)\)$",
    )
    .unwrap()
});

fn figure_caption(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_FIGURE.captures(line) else {
        return Classification::NoMatch;
    };
    Classification::Matched(TocEntry::plain(
        &caps[1],
        Anchor::from_target(&caps[2]),
        struck,
    ))
}

// ── 4. Whole-line bracketed link, maybe with a nested page link ──────────

static RE_WHOLE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(.*)\]\((#.*)\)$").unwrap());
static RE_SPAN_NUMBER_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<span[^>]*>(\d+(?:\.\d+)*\.?)</span>\s+<span[^>]*>([^<]+)</span>").unwrap()
});
static RE_LEADING_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*\.?)\s+(.*?)$").unwrap());

fn bracketed_link(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_WHOLE_LINK.captures(line) else {
        return Classification::NoMatch;
    };
    let text = &caps[1];
    let anchor = Anchor::from_target(&caps[2]);
    if is_self_reference(text) {
        return Classification::SelfReference;
    }

    let text = RE_PAGE_LINK.replace_all(text, "");
    if let Some(spans) = RE_SPAN_NUMBER_TITLE.captures(&text) {
        return Classification::Matched(TocEntry::numbered(&spans[1], &spans[2], anchor, struck));
    }
    if let Some(section) = RE_LEADING_SECTION.captures(&text) {
        return Classification::Matched(TocEntry::numbered(
            &section[1],
            &section[2],
            anchor,
            struck,
        ));
    }

    let text = RE_SPAN_TAG.replace_all(&text, "");
    if text.trim().is_empty() {
        return Classification::NoMatch;
    }
    Classification::Matched(TocEntry::plain(&text, anchor, struck))
}

// ── 5. Span-wrapped number and title followed by a page link ─────────────

static RE_SPAN_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<span[^>]*>(\d+(?:\.\d+)*\.?)</span>\s+<span[^>]*>([^<]+)</span>\s+\[(\d+)\]\((#[^)]+)\)",
    )
    .unwrap()
});

fn span_pair(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_SPAN_PAIR.captures(line) else {
        return Classification::NoMatch;
    };
    Classification::Matched(TocEntry::numbered(
        &caps[1],
        &caps[2],
        Anchor::from_target(&caps[4]),
        struck,
    ))
}

// ── 6. Numbered text with a trailing page link ───────────────────────────

static RE_PLAIN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*\.?)\s+([^\[]+)\s+\[(\d+)\]\((#[^)]+)\)$").unwrap()
});

fn plain_link(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_PLAIN_LINK.captures(line) else {
        return Classification::NoMatch;
    };
    if is_self_reference(&caps[2]) {
        return Classification::SelfReference;
    }
    Classification::Matched(TocEntry::numbered(
        &caps[1],
        &caps[2],
        Anchor::from_target(&caps[4]),
        struck,
    ))
}

// ── 7. Numbered text, optional page number, no link ──────────────────────

static RE_PLAIN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*\.?)\s+(.+?)(?:\s+(\d+))?$").unwrap());

fn plain_text(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_PLAIN_TEXT.captures(line) else {
        return Classification::NoMatch;
    };
    let title = caps[2].trim();
    if is_self_reference(title) {
        return Classification::SelfReference;
    }
    let slug = slugify(title);
    if slug.is_empty() {
        return Classification::NoMatch;
    }
    Classification::Matched(TocEntry::numbered(
        &caps[1],
        title,
        Anchor::Fragment(slug),
        struck,
    ))
}

// ── 8. Any fragment link anywhere on the line ────────────────────────────

// Also accepts http(s) targets so a rebuilt external entry re-parses.
static RE_FRAGMENT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((#[^)]+|https?://[^)]+)\)").unwrap());
static RE_LINE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:<span[^>]*>)?(\d+(?:\.\d+)*\.?)(?:</span>)?(?:\s+|$)").unwrap()
});
static RE_TEXT_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*\.?)\s+").unwrap());
static RE_TITLE_AFTER_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+(.+)$").unwrap());

fn link_in_text(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_FRAGMENT_LINK.captures(line) else {
        return Classification::NoMatch;
    };
    let text = &caps[1];
    let anchor = Anchor::from_target(&caps[2]);
    if is_self_reference(text) {
        return Classification::SelfReference;
    }

    let text = RE_PAGE_LINK.replace_all(text, "");
    let text = RE_SPAN_TAG.replace_all(&text, "");
    let text = text.trim();
    if text.is_empty() {
        return Classification::NoMatch;
    }

    let section = RE_LINE_SECTION
        .captures(line)
        .map(|c| c[1].to_string())
        .or_else(|| RE_TEXT_SECTION.captures(text).map(|c| c[1].to_string()));

    match section {
        Some(section) => {
            let title = RE_TITLE_AFTER_SECTION
                .captures(text)
                .map_or(text, |c| c.get(1).map_or(text, |m| m.as_str()));
            Classification::Matched(TocEntry::numbered(&section, title, anchor, struck))
        }
        None => Classification::Matched(TocEntry::plain(text, anchor, struck)),
    }
}

// ── 9. Annex / appendix lines ────────────────────────────────────────────

static RE_ANNEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^((?:annex|appendix)\s+[a-z0-9]+)\s*[-\x{2013}:]\s*(.+?)(?:\s+(\d+))?$")
        .unwrap()
});

fn annex(line: &str, struck: bool) -> Classification {
    let Some(caps) = RE_ANNEX.captures(line) else {
        return Classification::NoMatch;
    };
    let title = caps[2].trim();
    if is_self_reference(title) {
        return Classification::SelfReference;
    }
    let slug = slugify(title);
    if slug.is_empty() {
        return Classification::NoMatch;
    }
    Classification::Matched(TocEntry::plain(
        &format!("{} - {title}", &caps[1]),
        Anchor::Fragment(slug),
        struck,
    ))
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_of(line: &str) -> (ClassifierKind, TocEntry) {
        match classify(line) {
            Some((kind, Classification::Matched(entry))) => (kind, entry),
            other => panic!("expected an entry for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn external_url_entry() {
        let (kind, e) =
            entry_of("[1 [QFX5120 switch - Hardware](https://kb.example.org/doc?id=4)](#x)");
        assert_eq!(kind, ClassifierKind::ExternalUrl);
        assert_eq!(
            e.to_string(),
            "* [1 QFX5120 switch - Hardware](https://kb.example.org/doc?id=4)"
        );
    }

    #[test]
    fn span_in_link_entry() {
        let line = "[<span class=\"mark\">7. Preparation to the merge</span> [40](#prep)](#prep)";
        let (kind, e) = entry_of(line);
        assert_eq!(kind, ClassifierKind::SpanInLink);
        assert_eq!(e.to_string(), "* [7 Preparation to the merge](#prep)");
    }

    #[test]
    fn span_in_link_self_reference() {
        let line = "[<span class=\"mark\">Contents</span> [2](#contents)](#contents)";
        assert_eq!(
            classify(line),
            Some((ClassifierKind::SpanInLink, Classification::SelfReference))
        );
    }

    #[test]
    fn figure_caption_entry() {
        let line = "[Figure 1: Physical Architecture [8](#_Toc105709552)](#_Toc105709552)";
        let (kind, e) = entry_of(line);
        assert_eq!(kind, ClassifierKind::FigureCaption);
        assert_eq!(e.indent_level, 0);
        assert!(e.section.is_none());
        assert_eq!(
            e.to_string(),
            "* [Figure 1: Physical Architecture](#_Toc105709552)"
        );
    }

    #[test]
    fn bracketed_link_with_page() {
        let (kind, e) = entry_of("[2.3.1 References [6](#references)](#references)");
        assert_eq!(kind, ClassifierKind::BracketedLink);
        assert_eq!(e.indent_level, 2);
        assert_eq!(e.to_string(), "    * [2.3.1 References](#references)");
    }

    #[test]
    fn bracketed_link_with_spans() {
        let line = "[<span class=\"mark\">3.1</span> <span class=\"mark\">Scope</span> [9](#scope)](#scope)";
        let (kind, e) = entry_of(line);
        assert_eq!(kind, ClassifierKind::BracketedLink);
        assert_eq!(e.to_string(), "  * [3.1 Scope](#scope)");
    }

    #[test]
    fn bracketed_link_untitled() {
        let (_, e) = entry_of("[Glossary [12](#glossary)](#glossary)");
        assert_eq!(e.to_string(), "* [Glossary](#glossary)");
    }

    #[test]
    fn span_pair_entry() {
        let line = "<span class=\"mark\">2</span> <span class=\"mark\">Introduction</span> [7](#introduction)";
        let (kind, e) = entry_of(line);
        assert_eq!(kind, ClassifierKind::SpanPair);
        assert_eq!(e.to_string(), "* [2 Introduction](#introduction)");
    }

    #[test]
    fn plain_link_entry() {
        let (kind, e) = entry_of("7.2. IP Addressing [40](#ip-addressing)");
        assert_eq!(kind, ClassifierKind::PlainLink);
        assert_eq!(e.to_string(), "  * [7.2 IP Addressing](#ip-addressing)");
    }

    #[test]
    fn plain_text_entry_slugifies() {
        let (kind, e) = entry_of("4.1 Design – Overview 12");
        assert_eq!(kind, ClassifierKind::PlainText);
        assert_eq!(e.title, "Design – Overview");
        assert_eq!(e.anchor, Anchor::Fragment("design---overview".into()));
    }

    #[test]
    fn plain_text_contents_is_dropped() {
        assert_eq!(
            classify("1 Contents 2"),
            Some((ClassifierKind::PlainText, Classification::SelfReference))
        );
    }

    #[test]
    fn link_in_text_recovers_section() {
        let (kind, e) = entry_of("<span>5.4</span> see [Routing policy](#routing-policy) p.3");
        assert_eq!(kind, ClassifierKind::LinkInText);
        assert_eq!(e.to_string(), "  * [5.4 Routing policy](#routing-policy)");
    }

    #[test]
    fn link_in_text_reads_canonical_output() {
        let (kind, e) = entry_of("  * [1.1 Scope](#scope)");
        assert_eq!(kind, ClassifierKind::LinkInText);
        assert_eq!(e.to_string(), "  * [1.1 Scope](#scope)");
    }

    #[test]
    fn link_in_text_untitled() {
        let (_, e) = entry_of("* [Glossary](#glossary)");
        assert_eq!(e.section, None);
        assert_eq!(e.to_string(), "* [Glossary](#glossary)");
    }

    #[test]
    fn annex_entry() {
        let (kind, e) = entry_of("ANNEX A - Appendix Title 42");
        assert_eq!(kind, ClassifierKind::Annex);
        assert_eq!(e.to_string(), "* [ANNEX A - Appendix Title](#appendix-title)");
    }

    #[test]
    fn strikethrough_is_recorded() {
        let (kind, e) = entry_of("~~1 Deprecated [7](#deprecated)~~");
        assert_eq!(kind, ClassifierKind::PlainLink);
        assert!(e.struck);
        assert_eq!(e.to_string(), "* [~~1 Deprecated~~](#deprecated)");
    }

    #[test]
    fn span_wrapped_strikethrough() {
        let (clean, struck) =
            strip_strikethrough("<span class=\"mark\">~~2 Old [3](#old)~~</span>");
        assert!(struck);
        assert_eq!(clean, "2 Old [3](#old)");
    }

    #[test]
    fn rebuilt_external_entry_reparses() {
        let (kind, e) = entry_of("* [2.1 Switch guide](https://kb.example.org/switch)");
        assert_eq!(kind, ClassifierKind::LinkInText);
        assert_eq!(
            e.to_string(),
            "  * [2.1 Switch guide](https://kb.example.org/switch)"
        );
    }

    #[test]
    fn noise_is_unmatched() {
        assert_eq!(classify("Some paragraph of body text."), None);
        assert_eq!(classify("Version history"), None);
    }
}
