//! Data tables describing how source documents spell their TOC.
//!
//! New formatting variants are added here, not in the locator or the
//! classifiers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markup that may wrap a TOC title on its header line, as regex
/// fragments `(open, close)`. Order is priority order.
pub const HEADER_WRAPPERS: &[(&str, &str)] = &[
    // Headings and bare lines
    (r"#+[ \t]*", ""),
    ("", ""),
    // Quote
    (r">[ \t]*", ""),
    // Bold
    (r"\*\*", r"\*\*"),
    ("__", "__"),
    // Italic
    (r"\*", r"\*"),
    ("_", "_"),
    // Bold italic
    (r"\*\*\*", r"\*\*\*"),
    ("___", "___"),
    // HTML emphasis
    ("<strong>", "</strong>"),
    ("<b>", "</b>"),
    ("<em>", "</em>"),
    ("<i>", "</i>"),
    ("<u>", "</u>"),
    ("<strong><em>", "</em></strong>"),
    ("<em><strong>", "</strong></em>"),
    ("<b><i>", "</i></b>"),
    ("<i><b>", "</b></i>"),
    ("<u><strong>", "</strong></u>"),
    ("<u><em>", "</em></u>"),
    ("<u><strong><em>", "</em></strong></u>"),
];

/// Spellings of the TOC title, English and French.
pub const TOC_TITLES: &[&str] = &[
    r"table[ \t]*of[ \t]*contents?",
    r"contents?",
    r"table[ \t]*des[ \t]*mati[eè]res?",
];

/// Header patterns in priority order: every wrapper × every title.
///
/// Each pattern matches one whole line (possibly preceded by the `\n` that
/// ends the previous line) and is case-insensitive.
pub static HEADER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    HEADER_WRAPPERS
        .iter()
        .flat_map(|(open, close)| {
            TOC_TITLES.iter().map(move |title| {
                let pattern = format!(r"(?i)(?:^|\n){open}{title}{close}[ \t\r]*(?:\n|$)");
                Regex::new(&pattern).expect("header pattern table is valid")
            })
        })
        .collect()
});

/// Sub-list headers that may follow the main TOC (figures, tables,
/// references). Matched as case-sensitive substrings of a stripped line.
pub const SECONDARY_TOC_HEADERS: &[&str] = &[
    "Table of figures",
    "List of figures",
    "List of tables",
    "Table des figures",
    "Liste des figures",
    "Liste des tableaux",
    "References",
    "references",
    "Reference",
    "reference",
];

/// Whether a stripped line announces a secondary TOC.
pub fn is_secondary_header(line: &str) -> bool {
    SECONDARY_TOC_HEADERS.iter().any(|h| line.contains(h))
}

// ── Self-reference ───────────────────────────────────────────────────────

static RE_PAGE_SUBLINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[\d+\]\([^)]*\)").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_SELF_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:table\s+of\s+content|table\s+des\s+mati[eè]re|contents?$)").unwrap()
});

/// Whether `text` names the TOC itself ("Contents", "Table of Contents",
/// "Table des matières"), ignoring emphasis tags, strikethrough, nested
/// page links, case and surrounding punctuation.
pub fn is_self_reference(text: &str) -> bool {
    let text = RE_PAGE_SUBLINK.replace_all(text, "");
    let text = RE_TAG.replace_all(&text, "");
    let text: String = text.chars().filter(|c| !matches!(c, '*' | '_' | '~')).collect();
    let text = text.trim_matches(|c: char| !c.is_alphanumeric());
    RE_SELF_REFERENCE.is_match(text)
}

/// Remove the emphasis characters the locator ignores when comparing lines.
pub fn strip_emphasis(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, '*' | '_' | '<' | '>' | '/'))
        .collect()
}
