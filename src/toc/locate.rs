//! Boundary Locator: where the TOC starts and where it ends.
//!
//! ## Start
//!
//! Every header variant from [`HEADER_PATTERNS`] is tried in priority order
//! against the whole text; the first pattern that matches anywhere wins.
//! When none matches, a probe scan accepts any line mentioning "contents"
//! that is followed closely by fragment links.
//!
//! ## End
//!
//! The first of these that applies:
//! 1. the next top-level heading whose text differs from the header,
//! 2. an HTML `<table` (ending at the blank line before it),
//! 3. a line scan counting entry-shaped lines against runs of other lines.
//!
//! Only the line scan can fail, and it fails when the lines after the header
//! do not look enough like a TOC to be replaced safely.

use crate::config::TocConfig;
use crate::error::TocMiss;
use crate::output::{EndReason, TocRegion};
use crate::toc::patterns::{is_secondary_header, strip_emphasis, HEADER_PATTERNS};
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use tracing::{debug, warn};

/// A located TOC header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocStart {
    /// Byte offset of the header line's first character.
    pub offset: usize,
    /// The header line, trimmed.
    pub header: String,
}

/// Locate the TOC region of `text`.
pub fn locate(text: &str, config: &TocConfig) -> Result<TocRegion, TocMiss> {
    let start = find_start(text, config).ok_or(TocMiss::NoTocFound)?;
    let (end, end_reason) = find_end(text, &start, config)?;
    debug!(
        "TOC region [{}, {}) ended by {:?}",
        start.offset, end, end_reason
    );
    Ok(TocRegion {
        start: start.offset,
        end,
        header: start.header,
        end_reason,
    })
}

// ── Start ────────────────────────────────────────────────────────────────

/// Find the TOC header: the pattern table first, then the probe scan.
pub fn find_start(text: &str, config: &TocConfig) -> Option<TocStart> {
    let found = find_header(text).or_else(|| probe_header(text, config));
    match &found {
        Some(start) => debug!("Found TOC header '{}' at {}", start.header, start.offset),
        None => debug!("No TOC header found"),
    }
    found
}

fn find_header(text: &str) -> Option<TocStart> {
    HEADER_PATTERNS.iter().find_map(|re| {
        let m = re.find(text)?;
        let offset = if text[m.start()..].starts_with('\n') {
            m.start() + 1
        } else {
            m.start()
        };
        Some(TocStart {
            offset,
            header: m.as_str().trim().to_string(),
        })
    })
}

static RE_CONTENTS_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcontents?\b").unwrap());
static RE_FRAGMENT_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*\]\(#.*\)").unwrap());

/// Accept the first line mentioning "contents" when enough of the lines
/// right after it carry fragment links.
fn probe_header(text: &str, config: &TocConfig) -> Option<TocStart> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut offset = 0;
    for (i, line) in lines.iter().enumerate() {
        if RE_CONTENTS_WORD.is_match(&strip_emphasis(line)) {
            let links = lines[i + 1..]
                .iter()
                .take(config.header_probe_window)
                .filter(|l| RE_FRAGMENT_LINK.is_match(l))
                .count();
            if links >= config.header_probe_min_links {
                return Some(TocStart {
                    offset,
                    header: line.trim().to_string(),
                });
            }
        }
        offset += line.len() + 1;
    }
    None
}

// ── End ──────────────────────────────────────────────────────────────────

static RE_TOP_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n#[ \t]+([^\n]+)").unwrap());
static RE_BLANK_BEFORE_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n[ \t]*$").unwrap());
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Heading text reduced for comparison: markup and whitespace removed.
fn heading_key(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '#' | '>' | '*' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the exclusive end offset of the TOC that starts at `start`.
pub fn find_end(
    text: &str,
    start: &TocStart,
    config: &TocConfig,
) -> Result<(usize, EndReason), TocMiss> {
    let rest = &text[start.offset..];
    let header_key = heading_key(&start.header);

    let heading = RE_TOP_HEADING
        .captures_iter(rest)
        .filter(|c| heading_key(&c[1]) != header_key)
        .find_map(|c| c.get(0))
        .map(|m| m.start() + 1);
    let table = rest.find("<table");

    if let Some(h) = heading.filter(|&h| table.is_none_or(|t| h < t)) {
        debug!("TOC ends at next heading (+{h})");
        return Ok((start.offset + h, EndReason::NextHeading));
    }

    match table {
        Some(t) => {
            let end = RE_BLANK_BEFORE_TABLE
                .find(&rest[..t])
                .map_or(t, |m| m.start() + 1);
            debug!("TOC ends at table start (+{end})");
            Ok((start.offset + end, EndReason::TableStart))
        }
        None => {
            let (end, reason) = scan_end(rest, config)?;
            Ok((start.offset + end, reason))
        }
    }
}

/// Lightweight shapes that count as TOC lines during the end scan.
static ENTRY_SHAPES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"^\[.*\]\(#.*\)$",
        r"<span[^>]*>.*</span>.*\[.*\]\(#.*\)",
        r"^\d+(?:\.\d+)*\.?\s+[^\[]+\s+\[.*\]\(#.*\)",
        r"^\d+(?:\.\d+)*\.?\s+.+?(?:\s+\d+)?$",
        r"\[.*\]\(#.*\)",
        r"^\s*\*\s+\[.*\]\((?:#|https?://).*\)",
        r"^>",
        r"(?i)^(?:annex|appendix)\s+[a-z0-9]+\s*[-\x{2013}:]",
    ])
    .unwrap()
});

/// Whether a stripped line looks like a TOC entry.
pub fn is_entry_shaped(line: &str) -> bool {
    ENTRY_SHAPES.is_match(line)
}

#[derive(Debug, Default)]
struct ScanEvidence {
    entries: usize,
    linked: usize,
}

impl ScanEvidence {
    fn is_sufficient(&self, config: &TocConfig) -> bool {
        self.entries >= config.min_entry_lines || self.linked >= config.min_linked_entry_lines
    }
}

/// Line-density scan used when no heading or table bounds the TOC.
///
/// Offsets are relative to `rest`, whose first line is the header.
fn scan_end(rest: &str, config: &TocConfig) -> Result<(usize, EndReason), TocMiss> {
    let lines: Vec<&str> = rest.split('\n').collect();
    let mut evidence = ScanEvidence::default();
    let mut misses = 0usize;
    let mut secondary = false;
    let mut hit_table = false;
    let mut stop_line = None;
    let mut last_entry = 0usize;
    let mut trailing_text = false;

    for (i, raw) in lines.iter().enumerate().skip(1) {
        let line = raw.trim();

        if is_secondary_header(line) {
            secondary = true;
            evidence = ScanEvidence::default();
            misses = 0;
            last_entry = i;
            trailing_text = false;
            continue;
        }
        if line.contains("<table") {
            hit_table = true;
            stop_line = Some(i);
            break;
        }
        if line.is_empty() {
            misses = 0;
            continue;
        }
        if is_entry_shaped(line) {
            evidence.entries += 1;
            if RE_FRAGMENT_LINK.is_match(line) {
                evidence.linked += 1;
            }
            misses = 0;
            last_entry = i;
            trailing_text = false;
            continue;
        }

        misses += 1;
        trailing_text = true;
        if !secondary && misses >= config.max_consecutive_misses && evidence.is_sufficient(config)
        {
            // End before the run of non-entry lines so body text stays put.
            stop_line = Some(i + 1 - misses);
            break;
        }
    }

    if !secondary && !evidence.is_sufficient(config) {
        warn!(
            "Not enough TOC entries found ({} entry-shaped, {} linked)",
            evidence.entries, evidence.linked
        );
        return Err(TocMiss::InsufficientEvidence {
            entries: evidence.entries,
            linked: evidence.linked,
            required: config.min_entry_lines,
        });
    }

    let Some(stop) = stop_line else {
        if secondary || !trailing_text {
            return Ok((rest.len(), EndReason::EndOfText));
        }
        // Unmatched text after the last entry stays in the body. At most one
        // blank line after that entry belongs to the region.
        let mut stop = last_entry + 1;
        if lines.get(stop).is_some_and(|l| l.trim().is_empty()) {
            stop += 1;
        }
        debug!("TOC runs to end of text, keeping trailing lines from {stop}");
        return Ok((line_offset(&lines, stop), EndReason::EndOfText));
    };
    let scan_end = line_offset(&lines, stop).min(rest.len());

    if !hit_table && stop < config.min_region_lines {
        let fallback = short_region_end(rest, config);
        if fallback > scan_end {
            debug!("TOC looks very short ({stop} lines), extending to +{fallback}");
            return Ok((fallback, EndReason::ShortRegionFallback));
        }
    }
    Ok((scan_end, EndReason::LineScan))
}

/// Byte offset of line `index` in the text `lines` was split from.
fn line_offset(lines: &[&str], index: usize) -> usize {
    lines[..index].iter().map(|l| l.len() + 1).sum()
}

/// End for an implausibly short region: the first paragraph break after
/// the lookahead, else a fixed share of the remaining text.
fn short_region_end(rest: &str, config: &TocConfig) -> usize {
    let lookahead = floor_char_boundary(rest, config.short_region_lookahead);
    match RE_PARAGRAPH_BREAK.find(&rest[lookahead..]) {
        Some(m) => lookahead + m.start() + 1,
        None => floor_char_boundary(
            rest,
            (rest.len() as f64 * config.short_region_fraction) as usize,
        ),
    }
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}
