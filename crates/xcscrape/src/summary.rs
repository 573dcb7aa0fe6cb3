// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Aggregation of lifecycle events into a [`TestRunSummary`]

use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::descriptor::{ContextFrame, DescriptorId, DescriptorKind, TestDescriptor};
use crate::event::{TestCompleteEvent, TestFailure, TestOutputEvent, TestStartEvent};
use crate::result::{TestOutcome, TestResult, TestRunSummary};
use crate::scraper::LINE_SEPARATOR;
use crate::sink::ResultSink;

struct Pending {
    descriptor: TestDescriptor,
    started_at: DateTime<Utc>,
    failure: Option<String>,
    output: Vec<String>,
}

#[derive(Default)]
struct SummaryState {
    pending: HashMap<DescriptorId, Pending>,
    // Position of finished descriptors in `summary.results`, for late output
    finished: HashMap<DescriptorId, usize>,
    summary: TestRunSummary,
}

impl SummaryState {
    fn finish(
        &mut self,
        pending: Pending,
        outcome: TestOutcome,
        finished_at: Option<DateTime<Utc>>,
    ) {
        let Pending {
            descriptor,
            started_at,
            failure,
            output,
        } = pending;

        let duration_ms = finished_at
            .map(|end| (end - started_at).num_milliseconds().max(0) as u64)
            .unwrap_or(0);

        let summary = &mut self.summary;
        match descriptor.kind() {
            DescriptorKind::Case => {
                summary.total += 1;
                match outcome {
                    TestOutcome::Passed => summary.passed += 1,
                    TestOutcome::Failed => summary.failed += 1,
                    TestOutcome::Aborted => summary.aborted += 1,
                }
                summary.exec_time_secs += duration_ms as f64 / 1000.0;
            }
            DescriptorKind::Suite => {
                if outcome != TestOutcome::Passed {
                    summary.failed_suites += 1;
                }
            }
        }

        self.finished.insert(descriptor.id(), summary.results.len());
        summary.results.push(TestResult {
            kind: descriptor.kind(),
            suite: descriptor.suite_name().to_string(),
            class_name: descriptor.class_name().to_string(),
            name: descriptor.name().to_string(),
            outcome,
            started_at,
            finished_at,
            duration_ms,
            failure,
            output,
        });
    }
}

/// A sink that builds a [`TestRunSummary`] from the events it receives
pub struct SummarySink {
    state: Mutex<SummaryState>,
    // Start time for descriptors aborted without a recorded start
    clock: Arc<dyn Clock>,
}

impl Default for SummarySink {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl SummarySink {
    /// Create an empty sink using the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that timestamps unknown aborted descriptors with `clock`
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(SummaryState::default()),
            clock,
        }
    }

    /// Snapshot of the summary so far
    ///
    /// Suites and cases that have started but not finished are not included.
    #[must_use]
    pub fn summary(&self) -> TestRunSummary {
        self.lock().summary.clone()
    }

    /// Finalize and return the summary
    #[must_use]
    pub fn into_summary(self) -> TestRunSummary {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .summary
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SummaryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultSink for SummarySink {
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent) {
        self.lock().pending.insert(
            descriptor.id(),
            Pending {
                descriptor: descriptor.clone(),
                started_at: event.start_time,
                failure: None,
                output: Vec::new(),
            },
        );
    }

    fn completed(&self, id: DescriptorId, event: TestCompleteEvent) {
        let mut state = self.lock();
        let Some(pending) = state.pending.remove(&id) else {
            debug!(%id, "Completion for unknown descriptor");
            return;
        };
        state.finish(pending, event.result.into(), Some(event.end_time));
    }

    fn failure(&self, id: DescriptorId, failure: TestFailure) {
        if let Some(pending) = self.lock().pending.get_mut(&id) {
            pending.failure = Some(failure.message);
        }
    }

    fn output(&self, id: DescriptorId, event: TestOutputEvent) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(pending) = state.pending.get_mut(&id) {
            pending.output.push(event.text);
        } else if let Some(&index) = state.finished.get(&id) {
            state.summary.results[index].output.push(event.text);
        }
    }

    fn aborted(&self, frame: ContextFrame, cause: &dyn Error) {
        let (descriptor, mut messages) = frame.into_parts();
        let mut state = self.lock();
        let mut pending = state
            .pending
            .remove(&descriptor.id())
            .unwrap_or_else(|| Pending {
                started_at: self.clock.now(),
                failure: None,
                output: Vec::new(),
                descriptor,
            });

        // Messages captured before the stream ended come first, then the cause
        messages.push(cause.to_string());
        pending.failure = Some(messages.join(LINE_SEPARATOR));
        state.finish(pending, TestOutcome::Aborted, None);
    }
}
