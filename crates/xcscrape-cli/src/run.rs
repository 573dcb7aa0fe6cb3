// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Scraping of captured runner streams
//!
//! The runner's stdout and stderr are read by two concurrent tasks, each
//! feeding its own [`Scraper`] of one shared [`ScrapeContext`].
//!
//! # Example
//!
//! ```no_run
//! use xcscrape_cli::config::Config;
//! use xcscrape_cli::run::run;
//!
//! # async fn example() -> Result<(), xcscrape_cli::run::RunError> {
//! let config = Config::default();
//! let outcome = run(&config, std::io::stdout()).await?;
//! println!("{} tests, {} failed", outcome.summary.total, outcome.summary.failed);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};
use xcscrape::{
    Destination, FanoutSink, JsonLinesSink, ResultSink, ScrapeContext, ScrapeError, Scraper,
    SummarySink, TestRunSummary,
};

use crate::config::{Config, InputSource, OutputFormat};
use crate::report;

/// A runner stream to scrape
pub type BoxedInput = Box<dyn AsyncRead + Unpin + Send>;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that stop a scrape run
#[derive(Debug, Error)]
pub enum RunError {
    /// Opening an input or writing the report failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scraper error
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// A reader task panicked or was cancelled
    #[error("Reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event sink was still referenced after scraping finished
    #[error("Event sink still in use after scraping")]
    SinkInUse,
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters collected while scraping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Lines read from all streams
    pub lines: usize,
    /// Lines the scraper rejected (malformed case lines, unbalanced ends)
    pub rejected: usize,
    /// Suites and cases reported as aborted at the end of input
    pub drained: usize,
    /// First read error, if a stream ended abnormally
    pub read_error: Option<String>,
}

impl ScrapeStats {
    fn merge(&mut self, other: &ScrapeStats) {
        self.lines += other.lines;
        self.rejected += other.rejected;
    }
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Aggregated test results
    pub summary: TestRunSummary,
    /// Scrape counters
    pub stats: ScrapeStats,
}

impl RunOutcome {
    /// Whether the run counts as successful
    #[must_use]
    pub fn succeeded(&self, ignore_failures: bool) -> bool {
        ignore_failures || (self.summary.all_passed() && self.stats.read_error.is_none())
    }
}

// ============================================================================
// Scraping
// ============================================================================

/// Decode one raw line, dropping the line terminator
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the stream.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

async fn feed(scraper: Scraper, input: BoxedInput) -> Result<ScrapeStats, std::io::Error> {
    let destination = scraper.destination();
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let mut stats = ScrapeStats::default();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = decode_line(&buf);
        stats.lines += 1;
        if let Err(err) = scraper.text(&line) {
            warn!(?destination, error = %err, "Rejected line");
            stats.rejected += 1;
        }
    }

    debug!(?destination, lines = stats.lines, "Stream ended");
    Ok(stats)
}

/// Scrape the runner's stdout and optional stderr into `sink`
///
/// Both streams are read concurrently. When a stream fails, every test still
/// open is reported as aborted with the read error as cause. When input ends
/// normally with tests still open, they are reported as aborted only if
/// `drain_open` is set.
///
/// # Errors
///
/// Returns `RunError::Task` if a reader task panics. Read errors are not
/// returned; they end the stream and are recorded in the stats.
pub async fn scrape_streams(
    stdout: BoxedInput,
    stderr: Option<BoxedInput>,
    sink: Arc<dyn ResultSink>,
    drain_open: bool,
) -> Result<ScrapeStats, RunError> {
    let context = ScrapeContext::new(sink);

    let mut tasks = vec![tokio::spawn(feed(
        context.scraper(Destination::StdOut),
        stdout,
    ))];
    if let Some(stderr) = stderr {
        tasks.push(tokio::spawn(feed(
            context.scraper(Destination::StdErr),
            stderr,
        )));
    }

    let mut stats = ScrapeStats::default();
    let mut read_error = None;
    for task in tasks {
        match task.await? {
            Ok(task_stats) => stats.merge(&task_stats),
            Err(err) => {
                warn!(error = %err, "Failed to read runner output");
                if read_error.is_none() {
                    read_error = Some(err);
                }
            }
        }
    }

    let open = context.open_frames();
    stats.drained = open;
    if let Some(err) = read_error {
        stats.read_error = Some(err.to_string());
        context.end_of_stream(Some(&ScrapeError::Io(err)));
    } else if open > 0 && drain_open {
        context.end_of_stream(Some(&ScrapeError::UnexpectedEndOfStream { open }));
    } else {
        stats.drained = 0;
        context.end_of_stream(None);
    }

    Ok(stats)
}

async fn open_input(source: &InputSource) -> Result<BoxedInput, RunError> {
    let input: BoxedInput = match source {
        InputSource::Stdin => Box::new(tokio::io::stdin()),
        InputSource::File(path) => Box::new(tokio::fs::File::open(path).await?),
    };
    Ok(input)
}

/// Run a scrape as configured, writing the report to `out`
///
/// # Errors
///
/// Returns an error if an input cannot be opened, a reader task fails, or
/// the report cannot be written.
pub async fn run<W: Write + Send + 'static>(
    config: &Config,
    out: W,
) -> Result<RunOutcome, RunError> {
    let stdout = open_input(&config.stdout_source()).await?;
    let stderr = match config.stderr_source() {
        Some(source) => Some(open_input(&source).await?),
        None => None,
    };

    run_with_inputs(config.format, config.drain_open(), stdout, stderr, out).await
}

/// Run a scrape over already opened inputs
///
/// # Errors
///
/// See [`run`].
pub async fn run_with_inputs<W: Write + Send + 'static>(
    format: OutputFormat,
    drain_open: bool,
    stdout: BoxedInput,
    stderr: Option<BoxedInput>,
    mut out: W,
) -> Result<RunOutcome, RunError> {
    let summary = Arc::new(SummarySink::new());

    let stats = match format {
        OutputFormat::Events => {
            let events = Arc::new(JsonLinesSink::new(out));
            let sink = FanoutSink::new()
                .with(summary.clone())
                .with(events.clone());
            let stats = scrape_streams(stdout, stderr, Arc::new(sink), drain_open).await?;
            Arc::try_unwrap(events)
                .map_err(|_| RunError::SinkInUse)?
                .finish()?;
            stats
        }
        OutputFormat::Text | OutputFormat::Json => {
            let stats = scrape_streams(stdout, stderr, summary.clone(), drain_open).await?;
            let result = summary.summary();
            if format == OutputFormat::Json {
                serde_json::to_writer_pretty(&mut out, &result)?;
                writeln!(out)?;
            } else {
                report::write_summary(&mut out, &result)?;
            }
            out.flush()?;
            stats
        }
    };

    let summary = summary.summary();
    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        aborted = summary.aborted,
        rejected = stats.rejected,
        "Scrape complete"
    );

    Ok(RunOutcome { summary, stats })
}
