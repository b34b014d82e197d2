//! Scenario and property tests for TOC reconstruction on in-memory text.

use docx2md_toc::toc::patterns::is_self_reference;
use docx2md_toc::{
    diagnose, reconstruct_toc, reconstruct_toc_with, EndReason, LineOutcome, TocConfig,
    TocStatus,
};

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// A TOC as a typical export produces it: one spelling per line.
const EXPORTED: &str = r#"Cover page

**Table of Contents**

[1 Introduction [3](#introduction)](#introduction)

[<span class="mark">2 Network design</span> [4](#network-design)](#network-design)

[2.1 [Switch guide](https://kb.example.org/switch)](#switch-guide)

<span class="mark">2.2</span> <span class="mark">Addressing</span> [6](#addressing)

2.2.1 Subnets [7](#subnets)

[Figure 1: Topology [8](#_Toc1)](#_Toc1)

[Contents [2](#contents)](#contents)

# 1 Introduction

Body text, see [2.1 Switch guide [5](#switch-guide)](#switch-guide-1).
"#;

const EXPORTED_TOC: &str = "## Table of Contents

* [1 Introduction](#introduction)
* [2 Network design](#network-design)
  * [2.1 Switch guide](https://kb.example.org/switch)
  * [2.2 Addressing](#addressing)
    * [2.2.1 Subnets](#subnets)
* [Figure 1: Topology](#_Toc1)

";

/// Inputs that must come back untouched.
const UNTOUCHED: &[&str] = &[
    "",
    "# Intro\nSome body text.\n## Details\nMore.\n",
    "Contents\n1 Intro\n",
    "# Contents\n> Note\n# Body\n",
    "The contents of the box are listed below.\nA hammer.\n",
];

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn nested_numbered_entries() {
    let input = "# Table of Contents\n1 Introduction [5](#introduction)\n1.1 Scope [6](#scope)\n";
    let out = reconstruct_toc(input);

    assert_eq!(out.status, TocStatus::Reconstructed);
    let first = out.markdown.find("* [1 Introduction](#introduction)").unwrap();
    let second = out.markdown.find("  * [1.1 Scope](#scope)").unwrap();
    assert!(first < second);
}

#[test]
fn document_without_toc_is_unchanged() {
    let input = "# Intro\nSome body text.\n## Details\nMore.\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::NoTocFound);
    assert_eq!(out.markdown, input);
    assert!(out.region.is_none());
}

#[test]
fn single_unlinked_entry_is_insufficient() {
    let input = "Contents\n1 Intro\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::InsufficientEvidence);
    assert_eq!(out.markdown, input);
}

#[test]
fn lowered_entry_floor_accepts_short_toc() {
    let config = TocConfig::builder().min_entry_lines(1).build().unwrap();
    let out = reconstruct_toc_with("Contents\n1 Intro\n", &config);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert_eq!(out.markdown, "## Table of Contents\n\n* [1 Intro](#intro)\n\n");
}

#[test]
fn struck_entry_keeps_strikethrough() {
    let input = "# Table of Contents\n1 Overview [3](#overview)\n~~1 Deprecated [7](#deprecated)~~\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out.markdown.contains("* [~~1 Deprecated~~](#deprecated)\n"));
    assert!(out.entries[1].struck);
}

#[test]
fn annex_line_gets_slug_anchor() {
    let input = "# Table of Contents\n\
                 1 Introduction [5](#introduction)\n\
                 2 Scope [9](#scope)\n\
                 ANNEX A - Appendix Title 42\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out
        .markdown
        .contains("* [ANNEX A - Appendix Title](#appendix-title)\n"));
}

#[test]
fn exported_toc_is_rebuilt() {
    let out = reconstruct_toc(EXPORTED);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert_eq!(out.entries.len(), 6);

    let expected = format!("Cover page\n\n{EXPORTED_TOC}# 1 Introduction\n");
    assert!(
        out.markdown.starts_with(&expected),
        "unexpected output:\n{}",
        out.markdown
    );
    let region = out.region.unwrap();
    assert_eq!(region.end_reason, EndReason::NextHeading);
    assert_eq!(region.header, "**Table of Contents**");
}

#[test]
fn body_nested_links_are_unwrapped() {
    let out = reconstruct_toc(EXPORTED);
    assert!(out
        .markdown
        .ends_with("Body text, see [2.1 Switch guide](#switch-guide-1).\n"));
}

#[test]
fn cleanup_can_be_disabled() {
    let config = TocConfig::builder().document_cleanup(false).build().unwrap();
    let out = reconstruct_toc_with(EXPORTED, &config);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out
        .markdown
        .contains("[2.1 Switch guide [5](#switch-guide)](#switch-guide-1)"));
}

#[test]
fn french_header() {
    let input = "## Table des matières\n1 Introduction [2](#introduction)\n2 Portée [3](#portee)\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out.markdown.contains("* [2 Portée](#portee)"));
}

#[test]
fn toc_before_table_keeps_table() {
    let input = "Contents\n\
                 1 Intro [2](#intro)\n\
                 2 Scope [3](#scope)\n\
                 \n\
                 <table><tr><td>Revision</td></tr></table>\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out.markdown.starts_with("## Table of Contents\n\n* [1 Intro](#intro)\n"));
    assert!(out
        .markdown
        .ends_with("<table><tr><td>Revision</td></tr></table>\n"));
}

#[test]
fn body_after_scanned_toc_is_kept() {
    let mut input = String::from("Contents\n");
    for i in 1..=12 {
        input.push_str(&format!("{i} Chapter {i} {}\n", i * 3));
    }
    input.push_str("This guide describes the rollout.\nIt has three phases.\nEach phase is short.\n");

    let out = reconstruct_toc(&input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert_eq!(out.entries.len(), 12);
    assert!(out.markdown.contains("* [12 Chapter 12](#chapter-12)\n\nThis guide"));
}

#[test]
fn secondary_toc_entries_are_kept() {
    let input = "Contents\n\
                 1 Intro [2](#intro)\n\
                 Table of figures\n\
                 [Figure 1: Layout [3](#_Toc9)](#_Toc9)\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert!(out.markdown.contains("* [Figure 1: Layout](#_Toc9)"));
}

#[test]
fn no_entries_produced() {
    let input = "# Contents\n> Note\n# Body\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::NoEntriesProduced);
    assert_eq!(out.markdown, input);
    assert!(out.region.is_some());
}

// ── Properties ───────────────────────────────────────────────────────────────

/// One input per way a region can end.
fn bounded_inputs() -> Vec<(EndReason, String)> {
    let mut scanned = String::from("Contents\n");
    for i in 1..=12 {
        scanned.push_str(&format!("{i} Chapter {i} {}\n", i * 3));
    }
    scanned.push_str("This guide describes the rollout.\nIt has three phases.\nEach phase is short.\n");

    vec![
        (EndReason::NextHeading, EXPORTED.to_string()),
        (
            EndReason::NextHeading,
            "# Table of Contents\n1 Overview [3](#overview)\n~~1.2 Old [7](#old)~~\n\n# Body\n".into(),
        ),
        (
            EndReason::EndOfText,
            "# Table of Contents\n1 Introduction [5](#introduction)\n1.1 Scope [6](#scope)\n".into(),
        ),
        (
            EndReason::EndOfText,
            "Contents\n1 Intro [2](#intro)\nTable of figures\n[Figure 1: Layout [3](#_Toc9)](#_Toc9)\n"
                .into(),
        ),
        (
            EndReason::TableStart,
            "Contents\n1 Intro [2](#intro)\n2 Scope [3](#scope)\n\n<table><tr><td>Revision</td></tr></table>\n"
                .into(),
        ),
        (EndReason::LineScan, scanned),
        (
            EndReason::ShortRegionFallback,
            "Contents\n1 A\n2 B\n3 C\n4 D\n5 E\nbody one\nbody two\nbody three\n\n\
             para two line1\nline2\nline3\n\npara three\nmore\nmore2\n\nend\n"
                .into(),
        ),
    ]
}

#[test]
fn reconstruction_is_idempotent() {
    for (reason, input) in bounded_inputs() {
        let once = reconstruct_toc(&input);
        assert_eq!(once.status, TocStatus::Reconstructed, "{input:?}");
        assert_eq!(once.region.as_ref().unwrap().end_reason, reason, "{input:?}");
        let twice = reconstruct_toc(&once.markdown);
        assert_eq!(twice.markdown, once.markdown, "not idempotent for {input:?}");
    }
}

#[test]
fn short_region_keeps_text_after_paragraph_break() {
    let (_, input) = bounded_inputs().pop().unwrap();
    let once = reconstruct_toc(&input);
    assert!(once.markdown.ends_with("* [5 E](#e)\n\n\nend\n"), "{:?}", once.markdown);

    let twice = reconstruct_toc(&once.markdown);
    assert_eq!(twice.region.unwrap().end_reason, EndReason::EndOfText);
    assert!(twice.markdown.ends_with("\nend\n"));
}

#[test]
fn misses_return_input_verbatim() {
    for input in UNTOUCHED {
        let out = reconstruct_toc(input);
        assert_ne!(out.status, TocStatus::Reconstructed, "{input:?}");
        assert_eq!(out.markdown, *input);
        assert!(out.entries.is_empty());
    }
}

#[test]
fn reconstructed_implies_an_entry() {
    let out = reconstruct_toc(EXPORTED);
    assert!(out.status.is_reconstructed());
    assert!(!out.entries.is_empty());
    assert!(out.markdown.contains("\n* ["));
}

#[test]
fn toc_never_lists_itself() {
    let input = "# Table of Contents\n\
                 [Table of Contents [1](#table-of-contents)](#table-of-contents)\n\
                 [<span class=\"mark\">Contents</span> [1](#contents)](#contents)\n\
                 1 Introduction [2](#introduction)\n\
                 2 **Contents** [3](#contents-2)\n\
                 3 Contents 4\n\
                 * [table of contents.](#toc)\n";
    let out = reconstruct_toc(input);
    assert_eq!(out.status, TocStatus::Reconstructed);
    assert_eq!(out.entries.len(), 1);
    for entry in &out.entries {
        assert!(!is_self_reference(&entry.title), "{entry:?}");
        assert!(!is_self_reference(&entry.label()), "{entry:?}");
    }
}

#[test]
fn indentation_follows_section_depth() {
    let out = reconstruct_toc(EXPORTED);
    for entry in &out.entries {
        let expected = entry
            .section
            .as_deref()
            .map_or(0, |s| s.trim_end_matches('.').matches('.').count());
        assert_eq!(entry.indent_level, expected, "{entry:?}");
        assert!(entry.to_string().starts_with(&"  ".repeat(expected)));
    }
}

// ── Diagnosis ────────────────────────────────────────────────────────────────

#[test]
fn diagnosis_matches_reconstruction() {
    let config = TocConfig::default();
    let d = diagnose(EXPORTED, &config);
    let out = reconstruct_toc_with(EXPORTED, &config);

    assert_eq!(d.status, out.status);
    assert_eq!(d.region, out.region);
    let entries: Vec<_> = d.entries().cloned().collect();
    assert_eq!(entries, out.entries);
    assert!(d
        .lines
        .iter()
        .any(|l| matches!(l.outcome, LineOutcome::Skipped { .. })));
}

#[test]
fn diagnosis_serialises() {
    let d = diagnose(EXPORTED, &TocConfig::default());
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["status"], "reconstructed");
    assert_eq!(json["lines"][0]["outcome"], "skipped");
    assert_eq!(json["lines"][0]["reason"], "header");
}
