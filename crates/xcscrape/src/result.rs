// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Test result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorKind;

/// Result carried by a completion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultType {
    /// Suite or case passed
    Success,
    /// Suite or case failed
    Failure,
}

/// Final outcome of a suite or case in a run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// The output stream ended abnormally while the test was running
    Aborted,
}

impl From<ResultType> for TestOutcome {
    fn from(result: ResultType) -> Self {
        match result {
            ResultType::Success => Self::Passed,
            ResultType::Failure => Self::Failed,
        }
    }
}

/// Represents a finished suite or case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Suite or case
    pub kind: DescriptorKind,
    /// Owning suite name
    pub suite: String,
    /// Class-like grouping name
    pub class_name: String,
    /// Case name, or the suite name for suites
    pub name: String,
    /// Test outcome
    pub outcome: TestOutcome,
    /// When the test started
    pub started_at: DateTime<Utc>,
    /// When the test completed, `None` for aborted tests
    pub finished_at: Option<DateTime<Utc>>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Failure message (joined assertion messages or the abort cause)
    pub failure: Option<String>,
    /// Output lines attributed to the test
    pub output: Vec<String>,
}

impl TestResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }

    /// Failed or aborted
    #[must_use]
    pub fn failed(&self) -> bool {
        matches!(self.outcome, TestOutcome::Failed | TestOutcome::Aborted)
    }

    /// Human-readable duration: `5ms` below one second, `2.50s` above
    #[must_use]
    pub fn duration_display(&self) -> String {
        if self.duration_ms < 1000 {
            format!("{}ms", self.duration_ms)
        } else {
            format!("{:.2}s", self.duration_ms as f64 / 1000.0)
        }
    }
}

/// Aggregated results from a scraped run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestRunSummary {
    /// Cases that completed or were aborted
    pub total: usize,
    /// Cases passed
    pub passed: usize,
    /// Cases failed
    pub failed: usize,
    /// Cases aborted by an abnormal end of stream
    pub aborted: usize,
    /// Suites that ended with `failed at` or were aborted
    pub failed_suites: usize,
    /// Total case execution time in seconds
    pub exec_time_secs: f64,
    /// Individual suite and case results, in completion order
    pub results: Vec<TestResult>,
}

impl TestRunSummary {
    /// Create an empty summary
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check that no case or suite failed or was aborted
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.aborted == 0 && self.failed_suites == 0
    }

    /// Get failing and aborted cases
    #[must_use]
    pub fn failing_tests(&self) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| r.kind == DescriptorKind::Case && r.failed())
            .collect()
    }
}
