//! Whole-document cleanup run after the new TOC is spliced in.
//!
//! The export defect that produces doubly-nested page links in the TOC
//! (`[Title [7](#a)](#a)`) also leaves the same construct in the document
//! body, where cross references point at figures and sections. These rules
//! unwrap it everywhere, and fold a stray TOC heading that ends up directly
//! below the canonical one. They are unrelated to TOC structure and run as
//! their own pass.
//!
//! Each rule is a pure `&str → String` function; [`clean_document`] applies
//! them in order.

use crate::toc::reconstruct::CANONICAL_HEADING;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the spliced document.
///
/// Rules (applied in order):
/// 1. Fold a `# Contents` / `# Table of Contents` heading that directly
///    follows the canonical TOC heading
/// 2. Unwrap figure/table captions with a nested page link
/// 3. Unwrap section links whose title links to an external URL
/// 4. Unwrap any remaining `[text [n](#a)](#b)` link to `[text](#b)`
pub fn clean_document(input: &str) -> String {
    let s = fold_duplicate_headings(input);
    let s = unwrap_figure_links(&s);
    let s = unwrap_external_links(&s);
    unwrap_nested_page_links(&s)
}

// ── Rule 1: Duplicate TOC headings ───────────────────────────────────────

static RE_DUPLICATE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)## Table of Contents[ \t]*\n\s*#[ \t]*(?:Table[ \t]+of[ \t]+)?Contents?[ \t]*(\n|$)",
    )
    .unwrap()
});

fn fold_duplicate_headings(input: &str) -> String {
    RE_DUPLICATE_HEADING
        .replace_all(input, format!("{CANONICAL_HEADING}${{1}}").as_str())
        .into_owned()
}

// ── Rule 2: Figure captions ──────────────────────────────────────────────

static RE_NESTED_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[((?:Figure|Table|Fig\.|Tab\.)\s+\d+:?\s+[^\[]+)\s+\[\d+\]\((#[^)]+)\)\]\((#[^)]+)\)")
        .unwrap()
});

fn unwrap_figure_links(input: &str) -> String {
    RE_NESTED_FIGURE
        .replace_all(input, "[${1}](${2})")
        .into_owned()
}

// ── Rule 3: External section links ───────────────────────────────────────

static RE_NESTED_EXTERNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+(?:\.\d+)*\.?)\s+\[([^\]\n]*?)\]\((https?://[^)]+)\)\]\([^)\n]*\)").unwrap()
});

fn unwrap_external_links(input: &str) -> String {
    RE_NESTED_EXTERNAL
        .replace_all(input, "[${1} ${2}](${3})")
        .into_owned()
}

// ── Rule 4: Any nested page link ─────────────────────────────────────────

static RE_NESTED_PAGE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]\n]*?)\s+\[\d+\]\((#[^)]+)\)\]\((#[^)]+)\)").unwrap()
});

fn unwrap_nested_page_links(input: &str) -> String {
    RE_NESTED_PAGE_LINK
        .replace_all(input, "[${1}](${3})")
        .into_owned()
}
