//! # docx2md-toc
//!
//! Rebuild the table of contents of Markdown produced by word-processor
//! converters.
//!
//! ## What goes wrong
//!
//! When a `.docx` is exported to Markdown the TOC field usually survives as
//! a pile of artefacts: page numbers glued to titles, links nested inside
//! links (`[1 Intro [5](#intro)](#intro)`), `<span class="mark">` wrappers,
//! strikethrough from tracked changes, and no list structure at all. This
//! crate finds that region and replaces it with one clean, nested list:
//!
//! ```text
//! ## Table of Contents
//!
//! * [1 Introduction](#introduction)
//!   * [1.1 Scope](#scope)
//! ```
//!
//! The rest of the document is untouched apart from an optional pass that
//! unwraps the same nested-link defect in body cross references.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Locate     find the TOC header (formatting variants, EN/FR)
//!  ├─ 2. Bound      decide where the TOC ends
//!  ├─ 3. Classify   turn each line into an entry (nine line shapes)
//!  ├─ 4. Splice     replace the region with the canonical list
//!  └─ 5. Cleanup    unwrap nested page links in the body
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use docx2md_toc::{reconstruct_toc, TocStatus};
//!
//! let md = "# Contents\n1 Introduction [5](#introduction)\n1.1 Scope [6](#scope)\n";
//! let out = reconstruct_toc(md);
//! assert_eq!(out.status, TocStatus::Reconstructed);
//! assert!(out.markdown.contains("  * [1.1 Scope](#scope)"));
//! ```
//!
//! Files and directories are handled by the async API in [`convert`] and
//! [`stream`]:
//!
//! ```rust,no_run
//! use docx2md_toc::{fix_toc_files, OutputTarget, TocConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let inputs = vec!["a.md".into(), "b.md".into()];
//!     let out = fix_toc_files(inputs, &OutputTarget::InPlace, &TocConfig::default()).await;
//!     eprintln!("{} rebuilt, {} failed", out.stats.reconstructed, out.stats.failed);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `fixtoc` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docx2md-toc = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod progress;
pub mod stream;
pub mod toc;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{TocConfig, TocConfigBuilder};
pub use convert::{fix_toc_file, fix_toc_file_sync, fix_toc_files, inspect_file, OutputTarget};
pub use error::{FileError, FixTocError, TocMiss};
pub use output::{
    BatchOutput, BatchStats, EndReason, FileReport, LineOutcome, LineReport, Reconstruction,
    SkipReason, TocDiagnosis, TocRegion, TocStatus,
};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{fix_toc_stream, FileStream};
pub use toc::classify::ClassifierKind;
pub use toc::entry::{Anchor, TocEntry};
pub use toc::reconstruct::{diagnose, reconstruct_toc, reconstruct_toc_with, CANONICAL_HEADING};
