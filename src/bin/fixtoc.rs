//! CLI binary for docx2md-toc.
//!
//! A thin shim over the library crate that maps CLI flags to `TocConfig`
//! and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docx2md_toc::{
    fix_toc_file, fix_toc_files, inspect_file, reconstruct_toc_with, BatchProgressCallback,
    LineOutcome, OutputTarget, ProgressCallback, TocConfig, TocDiagnosis, TocStatus,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback for `--batch`: one bar for the whole batch and
/// a log line per file. Files finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>4}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Fixing TOCs");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(path.display().to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path, status: TocStatus) {
        let mark = if status.is_reconstructed() {
            green("✓")
        } else {
            yellow("–")
        };
        self.bar.println(format!(
            "  {} {:>4}/{:<4} {}  {}",
            mark,
            index,
            total,
            path.display(),
            dim(&status.to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>4}/{:<4} {}  {}",
            red("✗"),
            index,
            total,
            path.display(),
            red(error),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, rebuilt_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        eprintln!(
            "{} {}/{} TOCs rebuilt{}",
            if failed == 0 { green("✔") } else { red("⚠") },
            bold(&rebuilt_count.to_string()),
            total_files,
            if failed == 0 {
                String::new()
            } else {
                format!("  ({} failed)", red(&failed.to_string()))
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rebuild the TOC and print the document
  fixtoc guide.md

  # Write to a new file
  fixtoc guide.md guide.fixed.md

  # Fix a file in place
  fixtoc --in-place guide.md

  # Fix many files into another directory
  fixtoc --batch docs/*.md --out-dir fixed/

  # Show how every TOC line is classified
  fixtoc --inspect-only guide.md

  # Same, as JSON
  fixtoc --inspect-only --json guide.md

ENVIRONMENT VARIABLES:
  RUST_LOG                Overrides -v / -q (e.g. RUST_LOG=docx2md_toc=debug)
  FIXTOC_*                Every threshold flag has a FIXTOC_ variable
"#;

/// Rebuild tables of contents in Markdown converted from word-processor
/// documents.
#[derive(Parser, Debug)]
#[command(
    name = "fixtoc",
    version,
    about = "Rebuild tables of contents in Markdown converted from word-processor documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// INPUT [OUTPUT], or the files to process with --batch.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Treat every path as an input file.
    #[arg(long)]
    batch: bool,

    /// Write outputs into this directory.
    #[arg(long, env = "FIXTOC_OUT_DIR", conflicts_with = "in_place")]
    out_dir: Option<PathBuf>,

    /// Overwrite the input files.
    #[arg(long)]
    in_place: bool,

    /// Print the per-line classification report; write nothing.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of Markdown / text.
    #[arg(long, env = "FIXTOC_JSON")]
    json: bool,

    /// Entry-shaped lines needed before a scanned TOC is trusted.
    #[arg(long, env = "FIXTOC_MIN_ENTRY_LINES", default_value_t = 5)]
    min_entry_lines: usize,

    /// Fragment-linked lines that are enough on their own.
    #[arg(long, env = "FIXTOC_MIN_LINKED_ENTRY_LINES", default_value_t = 2)]
    min_linked_entry_lines: usize,

    /// Consecutive non-entry lines that end a scanned TOC.
    #[arg(long, env = "FIXTOC_MAX_CONSECUTIVE_MISSES", default_value_t = 3)]
    max_consecutive_misses: usize,

    /// Scanned regions shorter than this many lines are extended.
    #[arg(long, env = "FIXTOC_MIN_REGION_LINES", default_value_t = 10)]
    min_region_lines: usize,

    /// Entries required before the TOC is replaced.
    #[arg(long, env = "FIXTOC_MIN_ENTRIES", default_value_t = 1)]
    min_entries: usize,

    /// Skip the document-wide nested-link cleanup.
    #[arg(long, env = "FIXTOC_NO_CLEANUP")]
    no_cleanup: bool,

    /// Files processed concurrently with --batch.
    #[arg(short = 'j', long, env = "FIXTOC_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "FIXTOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FIXTOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FIXTOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = cli.batch && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for path in &cli.paths {
            let diagnosis = inspect_file(path, &config)
                .await
                .with_context(|| format!("Failed to inspect {}", path.display()))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&diagnosis)
                        .context("Failed to serialise diagnosis")?
                );
            } else {
                print_diagnosis(path, &diagnosis);
            }
        }
        return Ok(());
    }

    if cli.batch {
        run_batch(&cli, &config).await
    } else {
        run_single(&cli, &config).await
    }
}

async fn run_single(cli: &Cli, config: &TocConfig) -> Result<()> {
    let (input, output) = match cli.paths.as_slice() {
        [input] => (input, None),
        [input, output] => (input, Some(output)),
        _ => bail!("Expected INPUT [OUTPUT]; use --batch for several files"),
    };
    if cli.out_dir.is_some() && output.is_some() {
        bail!("--out-dir cannot be combined with an explicit OUTPUT");
    }

    let output = match (output, &cli.out_dir, cli.in_place) {
        (Some(o), _, _) => Some(o.clone()),
        (None, Some(dir), _) => Some(OutputTarget::Directory(dir.clone()).output_for(input)),
        (None, None, true) => Some(input.clone()),
        (None, None, false) => None,
    };

    if let Some(output) = output {
        let report = fix_toc_file(input, &output, config)
            .await
            .context("Failed to fix TOC")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{}  {}  {} entries  {}ms  →  {}",
                status_mark(report.status),
                report.status,
                report.entries,
                report.duration_ms,
                bold(&output.display().to_string()),
            );
        }
        return Ok(());
    }

    // stdout
    let text = docx2md_toc::convert::read_markdown(input)
        .await
        .context("Failed to read input")?;
    let result = reconstruct_toc_with(&text, config);

    if cli.json {
        let value = serde_json::json!({
            "status": result.status,
            "region": result.region,
            "entries": result.entries,
            "markdown": result.markdown,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialise output")?
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !cli.quiet {
            eprintln!(
                "{}  {}  {} entries",
                status_mark(result.status),
                result.status,
                result.entries.len()
            );
        }
    }
    Ok(())
}

async fn run_batch(cli: &Cli, config: &TocConfig) -> Result<()> {
    let target = match (&cli.out_dir, cli.in_place) {
        (Some(dir), _) => OutputTarget::Directory(dir.clone()),
        (None, true) => OutputTarget::InPlace,
        (None, false) => bail!("--batch needs --out-dir DIR or --in-place"),
    };

    let output = fix_toc_files(cli.paths.clone(), &target, config).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise batch output")?
        );
    } else if !cli.quiet && config.progress_callback.is_none() {
        let s = &output.stats;
        eprintln!(
            "Rebuilt {}/{} TOCs ({} unchanged, {} failed) in {}ms",
            s.reconstructed, s.total_files, s.unchanged, s.failed, s.total_duration_ms
        );
        for e in &output.errors {
            eprintln!("  {} {}", red("✗"), e);
        }
    }

    if output.stats.failed > 0 {
        bail!("{} of {} files failed", output.stats.failed, output.stats.total_files);
    }
    Ok(())
}

/// Map CLI args to `TocConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TocConfig> {
    let mut builder = TocConfig::builder()
        .min_entry_lines(cli.min_entry_lines)
        .min_linked_entry_lines(cli.min_linked_entry_lines)
        .max_consecutive_misses(cli.max_consecutive_misses)
        .min_region_lines(cli.min_region_lines)
        .min_entries_emitted(cli.min_entries)
        .document_cleanup(!cli.no_cleanup)
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn status_mark(status: TocStatus) -> String {
    if status.is_reconstructed() {
        green("✔")
    } else {
        yellow("–")
    }
}

fn print_diagnosis(path: &Path, d: &TocDiagnosis) {
    println!("{}  {}", bold(&path.display().to_string()), d.status);
    let Some(region) = &d.region else {
        return;
    };
    println!(
        "  region [{}, {})  ended by {:?}  header {:?}",
        region.start, region.end, region.end_reason, region.header
    );
    for line in &d.lines {
        let verdict = match &line.outcome {
            LineOutcome::Classified { classifier, entry } => {
                format!("{} {}", green(&format!("{classifier:<15}")), entry)
            }
            LineOutcome::SelfReference { classifier } => {
                yellow(&format!("{classifier:<15} self-reference"))
            }
            LineOutcome::Skipped { reason } => dim(&format!("skipped ({reason:?})")),
            LineOutcome::Unmatched => red("unmatched"),
        };
        println!("  {:>4}  {}", line.line_no, verdict);
        println!("        {}", dim(&line.text));
    }
}
