//! Table-of-contents reconstruction core.
//!
//! All stages are pure functions over `&str` and never fail; a document whose
//! TOC cannot be rebuilt with confidence is returned unchanged.
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Locate     header pattern table, then probe scan (locate, patterns)
//!  ├─ 2. Bound      next heading, <table>, or line scan with evidence floor
//!  ├─ 3. Classify   nine-classifier cascade per region line (classify)
//!  ├─ 4. Emit       canonical entries with depth indentation (entry)
//!  ├─ 5. Splice     replace the region with the rebuilt block (reconstruct)
//!  └─ 6. Cleanup    unwrap nested page links document-wide (cleanup)
//! ```

pub mod classify;
pub mod cleanup;
pub mod entry;
pub mod locate;
pub mod patterns;
pub mod reconstruct;
