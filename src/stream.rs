//! Streaming batch API: emit file reports as they complete.
//!
//! Unlike the eager [`crate::convert::fix_toc_files`], which returns only
//! after every file finishes, [`fix_toc_stream`] yields each
//! `Result<FileReport, FileError>` as soon as its file is written. Reports
//! arrive in completion order; sort by `input` if order matters.

use crate::config::TocConfig;
use crate::convert::{process_file, OutputTarget};
use crate::error::FileError;
use crate::output::FileReport;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileReport, FileError>> + Send>>;

/// Rebuild the TOC of every file in `inputs`, streaming reports as files
/// finish.
///
/// Per-file progress events fire as in the eager API; the batch-level
/// start/complete events do not, since the caller drives the stream.
///
/// # Example
/// ```rust,no_run
/// use docx2md_toc::{fix_toc_stream, OutputTarget, TocConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() {
/// let inputs = vec!["a.md".into(), "b.md".into()];
/// let mut reports = fix_toc_stream(inputs, OutputTarget::InPlace, &TocConfig::default());
/// while let Some(report) = reports.next().await {
///     match report {
///         Ok(r) => println!("{}: {}", r.input.display(), r.status),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # }
/// ```
pub fn fix_toc_stream(
    inputs: Vec<PathBuf>,
    target: OutputTarget,
    config: &TocConfig,
) -> FileStream {
    let total = inputs.len();
    info!("Starting streaming batch: {} files", total);

    let concurrency = config.concurrency.max(1);
    let target = Arc::new(target);
    let config = Arc::new(config.clone());

    let s = stream::iter(inputs.into_iter().enumerate().map(move |(i, input)| {
        let target = Arc::clone(&target);
        let config = Arc::clone(&config);
        async move { process_file(i + 1, total, input, &target, &config).await }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
