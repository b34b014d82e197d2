//! Reconstructor: locate, classify, re-emit and splice.
//!
//! ```text
//! text ──▶ locate ──▶ region lines ──▶ skip rules ──▶ classify ──▶ render ──▶ splice ──▶ cleanup
//! ```
//!
//! Any miss along the way returns the input untouched with a status.

use crate::config::TocConfig;
use crate::error::TocMiss;
use crate::output::{LineOutcome, LineReport, Reconstruction, SkipReason, TocDiagnosis, TocStatus};
use crate::toc::classify::{classify, Classification};
use crate::toc::entry::TocEntry;
use crate::toc::locate::locate;
use crate::toc::patterns::{is_self_reference, strip_emphasis};
use crate::toc::cleanup;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Heading line of every rebuilt TOC.
pub const CANONICAL_HEADING: &str = "## Table of Contents";

/// Rebuild the table of contents of `input` with the default policy.
///
/// ```rust
/// use docx2md_toc::{reconstruct_toc, TocStatus};
///
/// let out = reconstruct_toc(
///     "# Table of Contents\n1 Introduction [5](#introduction)\n1.1 Scope [6](#scope)\n",
/// );
/// assert_eq!(out.status, TocStatus::Reconstructed);
/// assert!(out.markdown.contains("* [1 Introduction](#introduction)"));
/// assert!(out.markdown.contains("  * [1.1 Scope](#scope)"));
/// ```
pub fn reconstruct_toc(input: &str) -> Reconstruction {
    reconstruct_toc_with(input, &TocConfig::default())
}

/// Rebuild the table of contents of `input`.
///
/// Never fails: when the TOC cannot be located or rebuilt with confidence
/// the input comes back unchanged and `status` says why.
pub fn reconstruct_toc_with(input: &str, config: &TocConfig) -> Reconstruction {
    let region = match locate(input, config) {
        Ok(region) => region,
        Err(miss) => {
            info!("TOC left unchanged: {}", miss);
            return Reconstruction::unchanged(input, miss, None);
        }
    };

    let reports = examine_region(region.slice(input));
    let entries: Vec<TocEntry> = reports
        .iter()
        .filter_map(|r| match &r.outcome {
            LineOutcome::Classified { entry, .. } => Some(entry.clone()),
            _ => None,
        })
        .collect();

    if entries.len() < config.min_entries_emitted {
        let miss = TocMiss::NoEntriesProduced {
            lines_examined: reports.len(),
        };
        info!("TOC left unchanged: {}", miss);
        return Reconstruction::unchanged(input, miss, Some(region));
    }

    let block = render_block(&entries);
    let mut markdown =
        String::with_capacity(input.len() - (region.end - region.start) + block.len());
    markdown.push_str(&input[..region.start]);
    markdown.push_str(&block);
    markdown.push_str(&input[region.end..]);

    if config.document_cleanup {
        markdown = cleanup::clean_document(&markdown);
    }

    info!(
        "Rebuilt TOC '{}': {} entries from {} lines",
        region.header,
        entries.len(),
        reports.len()
    );

    Reconstruction {
        markdown,
        status: TocStatus::Reconstructed,
        region: Some(region),
        entries,
        miss: None,
    }
}

/// Run the locator and the line loop without modifying anything, reporting
/// what happens to every line of the region.
pub fn diagnose(input: &str, config: &TocConfig) -> TocDiagnosis {
    let region = match locate(input, config) {
        Ok(region) => region,
        Err(miss) => {
            return TocDiagnosis {
                status: TocStatus::from(&miss),
                region: None,
                lines: Vec::new(),
            }
        }
    };

    let lines = examine_region(region.slice(input));
    let produced = lines
        .iter()
        .filter(|l| matches!(l.outcome, LineOutcome::Classified { .. }))
        .count();
    let status = if produced >= config.min_entries_emitted {
        TocStatus::Reconstructed
    } else {
        TocStatus::NoEntriesProduced
    };

    TocDiagnosis {
        status,
        region: Some(region),
        lines,
    }
}

/// Render the canonical TOC block: heading, blank line, one line per entry,
/// blank line.
pub fn render_block(entries: &[TocEntry]) -> String {
    let mut block = format!("{CANONICAL_HEADING}\n\n");
    for entry in entries {
        block.push_str(&entry.to_string());
        block.push('\n');
    }
    block.push('\n');
    block
}

// ── Line loop ────────────────────────────────────────────────────────────

static RE_TOC_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)table\s+of\s+content").unwrap());
static RE_CONTENTS_PAGE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:table\s+of\s+contents?|contents?)\s+\[\d+\]").unwrap());
static RE_BODY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s+\d+(?:\.\d+)*\.?\s+").unwrap());

/// Classify every line of the region. Line 0 is the header.
fn examine_region(region: &str) -> Vec<LineReport> {
    let mut leading = true;
    region
        .split('\n')
        .enumerate()
        .map(|(line_no, text)| {
            let outcome = if line_no == 0 {
                LineOutcome::Skipped {
                    reason: SkipReason::Header,
                }
            } else if leading && is_leading_noise(text) {
                LineOutcome::Skipped {
                    reason: SkipReason::LeadingNoise,
                }
            } else {
                leading = false;
                examine_line(text)
            };
            LineReport {
                line_no,
                text: text.to_string(),
                outcome,
            }
        })
        .collect()
}

/// Blank, quoted or header-repeating lines directly below the header.
fn is_leading_noise(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('>') {
        return true;
    }
    let bare = strip_emphasis(line);
    let bare = bare.trim();
    RE_TOC_TITLE.is_match(bare) || bare.eq_ignore_ascii_case("contents") || bare.eq_ignore_ascii_case("content")
}

fn examine_line(raw: &str) -> LineOutcome {
    let mut line = raw.trim();
    if let Some(unquoted) = line.strip_prefix('>') {
        line = unquoted.trim();
    }

    if line.is_empty() {
        return LineOutcome::Skipped {
            reason: SkipReason::Blank,
        };
    }
    if RE_CONTENTS_PAGE_LINK.is_match(line) {
        return LineOutcome::Skipped {
            reason: SkipReason::ContentsPageLink,
        };
    }
    if RE_BODY_HEADING.is_match(line) {
        return LineOutcome::Skipped {
            reason: SkipReason::BodyHeading,
        };
    }

    match classify(line) {
        Some((classifier, Classification::Matched(entry))) => {
            if is_self_reference(&entry.title) {
                debug!("Dropped self-reference '{}'", entry.title);
                LineOutcome::SelfReference { classifier }
            } else {
                LineOutcome::Classified { classifier, entry }
            }
        }
        Some((classifier, Classification::SelfReference)) => {
            debug!("Dropped self-reference line '{}'", line);
            LineOutcome::SelfReference { classifier }
        }
        Some((_, Classification::NoMatch)) | None => {
            debug!("Unmatched TOC line '{}'", line);
            LineOutcome::Unmatched
        }
    }
}
