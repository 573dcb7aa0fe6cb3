// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Human-readable run summary

use std::io::{self, Write};

use xcscrape::{DescriptorKind, TestOutcome, TestResult, TestRunSummary};

fn label(outcome: TestOutcome) -> &'static str {
    match outcome {
        TestOutcome::Passed => "PASS",
        TestOutcome::Failed => "FAIL",
        TestOutcome::Aborted => "ABORT",
    }
}

fn qualified_name(result: &TestResult) -> String {
    match result.kind {
        DescriptorKind::Case => format!("{}.{}/{}", result.suite, result.class_name, result.name),
        DescriptorKind::Suite => format!("suite {}", result.name),
    }
}

fn write_result<W: Write>(out: &mut W, result: &TestResult) -> io::Result<()> {
    let duration = match result.outcome {
        TestOutcome::Aborted => String::new(),
        _ => result.duration_display(),
    };
    writeln!(
        out,
        "{:<5} [{:>7}] {}",
        label(result.outcome),
        duration,
        qualified_name(result)
    )?;

    if let Some(failure) = result.failure.as_deref() {
        for line in failure.lines() {
            writeln!(out, "{:16}{}", "", line)?;
        }
    }
    Ok(())
}

/// Write the failing tests and the totals of a run
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_summary<W: Write>(out: &mut W, summary: &TestRunSummary) -> io::Result<()> {
    for result in summary.results.iter().filter(|r| r.failed()) {
        write_result(out, result)?;
    }

    let plural = if summary.total == 1 { "" } else { "s" };
    write!(
        out,
        "Summary: {} test{plural} run: {} passed, {} failed, {} aborted",
        summary.total, summary.passed, summary.failed, summary.aborted
    )?;
    if summary.failed_suites > 0 {
        let plural = if summary.failed_suites == 1 { "" } else { "s" };
        write!(out, " ({} suite{plural} failed)", summary.failed_suites)?;
    }
    writeln!(out, " in {:.3}s", summary.exec_time_secs)
}

/// Render [`write_summary`] into a string
#[must_use]
pub fn render_summary(summary: &TestRunSummary) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_summary(&mut buf, summary);
    String::from_utf8_lossy(&buf).into_owned()
}
