//! File-level and batch entry points.
//!
//! The reconstruction core in [`crate::toc`] is pure and synchronous. This
//! module wraps it for documents on disk: read as UTF-8, rebuild on the
//! blocking pool, write atomically. Batches run several documents at once
//! (never several stages of one document) and report per-file failures
//! without aborting.
//!
//! Use [`crate::stream::fix_toc_stream`] instead of [`fix_toc_files`] when
//! you want reports as each file finishes.

use crate::config::TocConfig;
use crate::error::{FileError, FixTocError};
use crate::output::{BatchOutput, BatchStats, FileReport, TocDiagnosis};
use crate::toc::reconstruct::{diagnose, reconstruct_toc_with};
use futures::stream::{self, StreamExt};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the batch API writes each rebuilt document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Overwrite each input file.
    InPlace,
    /// Write `<dir>/<input file name>`.
    Directory(PathBuf),
}

impl OutputTarget {
    /// Output path for `input` under this target.
    pub fn output_for(&self, input: &Path) -> PathBuf {
        match self {
            OutputTarget::InPlace => input.to_path_buf(),
            OutputTarget::Directory(dir) => match input.file_name() {
                Some(name) => dir.join(name),
                None => dir.join(input),
            },
        }
    }
}

/// Rebuild the TOC of the Markdown file at `input` and write the result to
/// `output`.
///
/// A document whose TOC was left alone is still written to `output`, so a
/// directory batch always yields a complete set of files. When `output` is
/// `input` nothing is written unless the TOC was rebuilt.
///
/// # Errors
/// Returns `Err(FixTocError)` only when the file cannot be read, is not
/// UTF-8, or the output cannot be written. A document without a usable TOC
/// is not an error; check [`FileReport::status`].
pub async fn fix_toc_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &TocConfig,
) -> Result<FileReport, FixTocError> {
    let started = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref();
    debug!("Fixing TOC: {} -> {}", input.display(), output.display());

    let text = read_markdown(input).await?;
    let bytes_in = text.len();

    let cfg = config.clone();
    let result = tokio::task::spawn_blocking(move || reconstruct_toc_with(&text, &cfg))
        .await
        .map_err(|e| FixTocError::Internal(format!("reconstruction task failed: {e}")))?;

    let written = if !result.status.is_reconstructed() && is_same_file(input, output).await {
        debug!("{}: {}, left in place", input.display(), result.status);
        None
    } else {
        write_atomic(output, &result.markdown).await?;
        Some(output.to_path_buf())
    };

    let report = FileReport {
        input: input.to_path_buf(),
        output: written,
        status: result.status,
        entries: result.entries.len(),
        bytes_in,
        bytes_out: result.markdown.len(),
        duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        "{}: {} ({} entries, {}ms)",
        input.display(),
        report.status,
        report.entries,
        report.duration_ms
    );
    Ok(report)
}

/// Synchronous wrapper around [`fix_toc_file`].
///
/// Creates a temporary tokio runtime internally; do not call it from inside
/// an async context.
pub fn fix_toc_file_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &TocConfig,
) -> Result<FileReport, FixTocError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FixTocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(fix_toc_file(input, output, config))
}

/// Rebuild the TOC of every file in `inputs`, `config.concurrency` files at
/// a time.
///
/// Never fails as a whole: files that cannot be read or written end up in
/// [`BatchOutput::errors`]. Reports come back in input order.
pub async fn fix_toc_files(
    inputs: Vec<PathBuf>,
    target: &OutputTarget,
    config: &TocConfig,
) -> BatchOutput {
    let started = Instant::now();
    let total = inputs.len();
    info!("Starting batch: {} files", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut results: Vec<(usize, Result<FileReport, FileError>)> =
        stream::iter(inputs.into_iter().enumerate().map(|(i, input)| async move {
            (i, process_file(i + 1, total, input, target, config).await)
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;
    results.sort_by_key(|(i, _)| *i);

    let mut reports = Vec::with_capacity(total);
    let mut errors = Vec::new();
    for (_, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => errors.push(e),
        }
    }

    let reconstructed = reports
        .iter()
        .filter(|r| r.status.is_reconstructed())
        .count();
    let stats = BatchStats {
        total_files: total,
        reconstructed,
        unchanged: reports.len() - reconstructed,
        failed: errors.len(),
        total_entries: reports.iter().map(|r| r.entries).sum(),
        total_duration_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} rebuilt, {} failed, {}ms total",
        stats.reconstructed, total, stats.failed, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, reconstructed);
    }

    BatchOutput {
        reports,
        errors,
        stats,
    }
}

/// Locate and classify the TOC of a file without writing anything.
pub async fn inspect_file(
    path: impl AsRef<Path>,
    config: &TocConfig,
) -> Result<TocDiagnosis, FixTocError> {
    let text = read_markdown(path.as_ref()).await?;
    Ok(diagnose(&text, config))
}

/// Read a Markdown file as UTF-8, mapping I/O failures onto [`FixTocError`].
pub async fn read_markdown(path: &Path) -> Result<String, FixTocError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        let path = path.to_path_buf();
        match e.kind() {
            ErrorKind::NotFound => FixTocError::FileNotFound { path },
            ErrorKind::PermissionDenied => FixTocError::PermissionDenied { path },
            _ => FixTocError::ReadFailed { path, source: e },
        }
    })?;
    String::from_utf8(bytes).map_err(|e| FixTocError::NotUtf8 {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// One file of a batch, with progress events. Shared with the stream API.
pub(crate) async fn process_file(
    index: usize,
    total: usize,
    input: PathBuf,
    target: &OutputTarget,
    config: &TocConfig,
) -> Result<FileReport, FileError> {
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_file_start(index, total, &input);
    }

    let output = target.output_for(&input);
    match fix_toc_file(&input, &output, config).await {
        Ok(report) => {
            if let Some(cb) = cb {
                cb.on_file_complete(index, total, &input, report.status);
            }
            Ok(report)
        }
        Err(e) => {
            warn!("File {}/{} failed: {}", index, total, e);
            if let Some(cb) = cb {
                cb.on_file_error(index, total, &input, &e.to_string());
            }
            Err(FileError::from_fatal(input, &e))
        }
    }
}

/// Write via a sibling temp file and rename, so readers never see a partial
/// document.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), FixTocError> {
    let write_err = |source| FixTocError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
