//! Configuration types for table-of-contents reconstruction.
//!
//! All reconstruction behaviour is controlled through [`TocConfig`], built
//! via its [`TocConfigBuilder`]. The boundary heuristics are empirically
//! tuned constants; they are exposed here so a caller with an unusual corpus
//! can adjust them without touching the parser.

use crate::error::FixTocError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for a TOC reconstruction.
///
/// Built via [`TocConfig::builder()`] or using [`TocConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2md_toc::TocConfig;
///
/// let config = TocConfig::builder()
///     .min_entry_lines(3)
///     .document_cleanup(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TocConfig {
    /// Entry-shaped lines the end-of-TOC scan must see before it trusts the
    /// region. Default: 5.
    pub min_entry_lines: usize,

    /// Alternative evidence floor: lines carrying a `[..](#..)` fragment
    /// link. Default: 2.
    ///
    /// Linked lines are much stronger evidence than bare numbered lines, so
    /// a short but fully linked TOC is accepted.
    pub min_linked_entry_lines: usize,

    /// Consecutive non-entry lines that end the TOC once the entry floor has
    /// been reached. Default: 3.
    pub max_consecutive_misses: usize,

    /// A scanned region shorter than this many lines is considered
    /// implausibly short. Default: 10.
    pub min_region_lines: usize,

    /// Bytes skipped before searching for a paragraph break when a short
    /// region is extended. Default: 100.
    pub short_region_lookahead: usize,

    /// Share of the remaining text used as the region when no paragraph
    /// break follows the lookahead. Range: (0, 1]. Default: 0.2.
    pub short_region_fraction: f64,

    /// Lines inspected after a candidate header by the fallback header scan.
    /// Default: 5.
    pub header_probe_window: usize,

    /// Linked lines required within the probe window to accept a candidate
    /// header. Default: 2.
    pub header_probe_min_links: usize,

    /// Entries that must be produced before the TOC is replaced. Default: 1.
    pub min_entries_emitted: usize,

    /// Run the whole-document nested-link cleanup after splicing.
    /// Default: true.
    pub document_cleanup: bool,

    /// Documents processed concurrently by the batch API. Default: 4.
    pub concurrency: usize,

    /// Optional per-file progress callback for the batch API.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            min_entry_lines: 5,
            min_linked_entry_lines: 2,
            max_consecutive_misses: 3,
            min_region_lines: 10,
            short_region_lookahead: 100,
            short_region_fraction: 0.2,
            header_probe_window: 5,
            header_probe_min_links: 2,
            min_entries_emitted: 1,
            document_cleanup: true,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TocConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TocConfig")
            .field("min_entry_lines", &self.min_entry_lines)
            .field("min_linked_entry_lines", &self.min_linked_entry_lines)
            .field("max_consecutive_misses", &self.max_consecutive_misses)
            .field("min_region_lines", &self.min_region_lines)
            .field("short_region_lookahead", &self.short_region_lookahead)
            .field("short_region_fraction", &self.short_region_fraction)
            .field("header_probe_window", &self.header_probe_window)
            .field("header_probe_min_links", &self.header_probe_min_links)
            .field("min_entries_emitted", &self.min_entries_emitted)
            .field("document_cleanup", &self.document_cleanup)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl TocConfig {
    /// Create a new builder for `TocConfig`.
    pub fn builder() -> TocConfigBuilder {
        TocConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TocConfig`].
#[derive(Debug)]
pub struct TocConfigBuilder {
    config: TocConfig,
}

impl TocConfigBuilder {
    pub fn min_entry_lines(mut self, n: usize) -> Self {
        self.config.min_entry_lines = n;
        self
    }

    pub fn min_linked_entry_lines(mut self, n: usize) -> Self {
        self.config.min_linked_entry_lines = n;
        self
    }

    pub fn max_consecutive_misses(mut self, n: usize) -> Self {
        self.config.max_consecutive_misses = n;
        self
    }

    pub fn min_region_lines(mut self, n: usize) -> Self {
        self.config.min_region_lines = n;
        self
    }

    pub fn short_region_lookahead(mut self, bytes: usize) -> Self {
        self.config.short_region_lookahead = bytes;
        self
    }

    pub fn short_region_fraction(mut self, fraction: f64) -> Self {
        self.config.short_region_fraction = fraction;
        self
    }

    pub fn header_probe_window(mut self, lines: usize) -> Self {
        self.config.header_probe_window = lines;
        self
    }

    pub fn header_probe_min_links(mut self, n: usize) -> Self {
        self.config.header_probe_min_links = n;
        self
    }

    pub fn min_entries_emitted(mut self, n: usize) -> Self {
        self.config.min_entries_emitted = n.max(1);
        self
    }

    pub fn document_cleanup(mut self, v: bool) -> Self {
        self.config.document_cleanup = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TocConfig, FixTocError> {
        let c = &self.config;
        if c.max_consecutive_misses == 0 {
            return Err(FixTocError::InvalidConfig(
                "max_consecutive_misses must be ≥ 1".into(),
            ));
        }
        if !(c.short_region_fraction > 0.0 && c.short_region_fraction <= 1.0) {
            return Err(FixTocError::InvalidConfig(format!(
                "short_region_fraction must be in (0, 1], got {}",
                c.short_region_fraction
            )));
        }
        if c.header_probe_min_links > c.header_probe_window {
            return Err(FixTocError::InvalidConfig(format!(
                "header_probe_min_links ({}) cannot exceed header_probe_window ({})",
                c.header_probe_min_links, c.header_probe_window
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_policy() {
        let c = TocConfig::default();
        assert_eq!(c.min_entry_lines, 5);
        assert_eq!(c.max_consecutive_misses, 3);
        assert_eq!(c.min_region_lines, 10);
        assert_eq!(c.short_region_lookahead, 100);
        assert!((c.short_region_fraction - 0.2).abs() < f64::EPSILON);
        assert!(c.document_cleanup);
    }

    #[test]
    fn rejects_zero_miss_run() {
        let err = TocConfig::builder()
            .max_consecutive_misses(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_consecutive_misses"));
    }

    #[test]
    fn rejects_fraction_out_of_range() {
        assert!(TocConfig::builder()
            .short_region_fraction(0.0)
            .build()
            .is_err());
        assert!(TocConfig::builder()
            .short_region_fraction(1.5)
            .build()
            .is_err());
    }

    #[test]
    fn rejects_probe_links_above_window() {
        let err = TocConfig::builder()
            .header_probe_window(2)
            .header_probe_min_links(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, FixTocError::InvalidConfig(_)));
    }

    #[test]
    fn concurrency_is_clamped() {
        let c = TocConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn debug_hides_callback() {
        let s = format!("{:?}", TocConfig::default());
        assert!(s.contains("progress_callback: None"));
    }
}
