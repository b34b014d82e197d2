//! Result types returned by the reconstruction core and the file API.

use crate::error::{FileError, TocMiss};
use crate::toc::classify::ClassifierKind;
use crate::toc::entry::TocEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of one reconstruction call.
///
/// Every status other than [`TocStatus::Reconstructed`] guarantees that the
/// returned Markdown is byte-for-byte the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TocStatus {
    /// The TOC was rebuilt and spliced back in.
    Reconstructed,
    /// No TOC header was recognised.
    NoTocFound,
    /// A header was found but the end of the TOC could not be trusted.
    InsufficientEvidence,
    /// The region was located but produced too few entries.
    NoEntriesProduced,
}

impl TocStatus {
    pub fn is_reconstructed(self) -> bool {
        self == TocStatus::Reconstructed
    }
}

impl fmt::Display for TocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TocStatus::Reconstructed => "reconstructed",
            TocStatus::NoTocFound => "no TOC found",
            TocStatus::InsufficientEvidence => "insufficient TOC evidence",
            TocStatus::NoEntriesProduced => "no TOC entries produced",
        };
        f.write_str(s)
    }
}

impl From<&TocMiss> for TocStatus {
    fn from(miss: &TocMiss) -> Self {
        match miss {
            TocMiss::NoTocFound => TocStatus::NoTocFound,
            TocMiss::InsufficientEvidence { .. } => TocStatus::InsufficientEvidence,
            TocMiss::NoEntriesProduced { .. } => TocStatus::NoEntriesProduced,
        }
    }
}

/// How the end of the TOC region was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The next top-level heading that is not the TOC header.
    NextHeading,
    /// An HTML `<table` start.
    TableStart,
    /// The line scan hit a run of non-entry lines or a table line.
    LineScan,
    /// The line scan ran off the end of the text.
    EndOfText,
    /// The scanned region was implausibly short and was extended.
    ShortRegionFallback,
}

/// The located table of contents: byte range `[start, end)` of the text.
///
/// `start` is the first byte of the header line and `start <= end <= len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocRegion {
    pub start: usize,
    pub end: usize,
    /// The header line as matched, trimmed.
    pub header: String,
    pub end_reason: EndReason,
}

impl TocRegion {
    /// Slice of `text` covered by this region.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Result of [`crate::reconstruct_toc`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The output document (the input itself unless `status` is `Reconstructed`).
    pub markdown: String,
    pub status: TocStatus,
    /// The located region, when the locator succeeded.
    pub region: Option<TocRegion>,
    /// Entries emitted into the new TOC, in order.
    pub entries: Vec<TocEntry>,
    /// Why the TOC was kept, for non-`Reconstructed` statuses.
    pub miss: Option<TocMiss>,
}

impl Reconstruction {
    pub(crate) fn unchanged(input: &str, miss: TocMiss, region: Option<TocRegion>) -> Self {
        Self {
            markdown: input.to_string(),
            status: TocStatus::from(&miss),
            region,
            entries: Vec::new(),
            miss: Some(miss),
        }
    }
}

// ── Diagnosis ────────────────────────────────────────────────────────────

/// Why a region line was not offered to the classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The header line itself.
    Header,
    /// Blank, quote-only or header-repeating line right after the header.
    LeadingNoise,
    Blank,
    /// A nested `[Contents [n](#..)` page-link fragment.
    ContentsPageLink,
    /// A heading restating a numbered section; it belongs to the body.
    BodyHeading,
}

/// What happened to one line of the TOC region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LineOutcome {
    Classified {
        classifier: ClassifierKind,
        entry: TocEntry,
    },
    /// The line named the TOC itself and was dropped.
    SelfReference { classifier: ClassifierKind },
    Skipped { reason: SkipReason },
    /// No classifier recognised the line; it is dropped.
    Unmatched,
}

/// One line of the TOC region with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReport {
    /// 0-based line number within the region (0 is the header).
    pub line_no: usize,
    pub text: String,
    #[serde(flatten)]
    pub outcome: LineOutcome,
}

/// Per-line report produced by [`crate::diagnose`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocDiagnosis {
    /// Status a reconstruction with the same config would report.
    pub status: TocStatus,
    pub region: Option<TocRegion>,
    pub lines: Vec<LineReport>,
}

impl TocDiagnosis {
    /// Entries the reconstruction would emit.
    pub fn entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.lines.iter().filter_map(|l| match &l.outcome {
            LineOutcome::Classified { entry, .. } => Some(entry),
            _ => None,
        })
    }
}

// ── File / batch results ─────────────────────────────────────────────────

/// Result for one processed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    /// Where the document was written; `None` when nothing was written.
    pub output: Option<PathBuf>,
    pub status: TocStatus,
    /// Number of entries in the rebuilt TOC.
    pub entries: usize,
    pub bytes_in: usize,
    pub bytes_out: usize,
    pub duration_ms: u64,
}

/// Aggregate statistics for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub reconstructed: usize,
    /// Files read fine but left unchanged (no TOC, low confidence).
    pub unchanged: usize,
    pub failed: usize,
    pub total_entries: usize,
    pub total_duration_ms: u64,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Per-file reports, in input order.
    pub reports: Vec<FileReport>,
    pub errors: Vec<FileError>,
    pub stats: BatchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_miss() {
        assert_eq!(TocStatus::from(&TocMiss::NoTocFound), TocStatus::NoTocFound);
        assert_eq!(
            TocStatus::from(&TocMiss::NoEntriesProduced { lines_examined: 4 }),
            TocStatus::NoEntriesProduced
        );
    }

    #[test]
    fn status_serialises_snake_case() {
        let json = serde_json::to_string(&TocStatus::InsufficientEvidence).unwrap();
        assert_eq!(json, "\"insufficient_evidence\"");
    }

    #[test]
    fn unchanged_keeps_input() {
        let r = Reconstruction::unchanged("abc", TocMiss::NoTocFound, None);
        assert_eq!(r.markdown, "abc");
        assert_eq!(r.status, TocStatus::NoTocFound);
        assert!(r.entries.is_empty());
    }

    #[test]
    fn region_slice() {
        let region = TocRegion {
            start: 2,
            end: 5,
            header: "x".into(),
            end_reason: EndReason::EndOfText,
        };
        assert_eq!(region.slice("0123456"), "234");
    }
}
