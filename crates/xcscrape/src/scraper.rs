// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! The line-at-a-time scraper
//!
//! A [`ScrapeContext`] owns the stack of open suites and cases. It hands out
//! one [`Scraper`] per output channel; all scrapers of a context share the
//! stack, so stdout and stderr lines of one runner are attributed against the
//! same open tests.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use xcscrape::{Destination, RecordingSink, ScrapeContext};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let context = ScrapeContext::new(sink.clone());
//! let stdout = context.scraper(Destination::StdOut);
//!
//! stdout.text("Test Suite 'Foo' started at 2026-01-01 12:00:00.000").unwrap();
//! stdout.text("Test Suite 'Foo' passed at 2026-01-01 12:00:01.000").unwrap();
//! context.end_of_stream(None);
//!
//! assert_eq!(sink.events().len(), 2);
//! ```

use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::clock::{Clock, IdGenerator, SequentialIdGenerator, SystemClock};
use crate::descriptor::{ContextFrame, DescriptorId, DescriptorKind, TestDescriptor};
use crate::error::ScrapeError;
use crate::event::{Destination, TestCompleteEvent, TestFailure, TestOutputEvent, TestStartEvent};
use crate::grammar::{self, LineKind};
use crate::result::ResultType;
use crate::sink::ResultSink;

/// Separator used to join the failure messages of a case
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Separator used to join the failure messages of a case
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

#[derive(Default)]
struct ContextState {
    stack: Vec<ContextFrame>,
    last_completed: Option<DescriptorId>,
}

impl ContextState {
    /// Pop the innermost frame for an exit line and remember it as last completed
    fn pop_for_exit(&mut self, line: &str) -> Result<ContextFrame, ScrapeError> {
        let frame = self.stack.pop().ok_or_else(|| ScrapeError::UnbalancedExit {
            line: line.to_string(),
        })?;
        self.last_completed = Some(frame.descriptor().id());
        Ok(frame)
    }
}

struct Shared {
    state: Mutex<ContextState>,
    sink: Arc<dyn ResultSink>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

/// Shared test context for the scrapers of one runner invocation
#[derive(Clone)]
pub struct ScrapeContext {
    shared: Arc<Shared>,
}

impl ScrapeContext {
    /// Create a context using the system clock and sequential ids
    #[must_use]
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self::with_services(
            sink,
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(SystemClock),
        )
    }

    /// Create a context with explicit id and time services
    #[must_use]
    pub fn with_services(
        sink: Arc<dyn ResultSink>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ContextState::default()),
                sink,
                ids,
                clock,
            }),
        }
    }

    /// A scraper for lines written to `destination`
    #[must_use]
    pub fn scraper(&self, destination: Destination) -> Scraper {
        Scraper {
            destination,
            context: self.clone(),
        }
    }

    /// Signal the end of the runner's output
    ///
    /// With a `failure`, every frame still open is handed to the sink as
    /// aborted, innermost first. Without one the stack is left as is.
    pub fn end_of_stream(&self, failure: Option<&dyn Error>) {
        let Some(cause) = failure else {
            return;
        };

        let mut state = self.lock();
        if !state.stack.is_empty() {
            warn!(open = state.stack.len(), cause = %cause, "Draining open tests");
        }
        while let Some(frame) = state.stack.pop() {
            self.shared.sink.aborted(frame, cause);
        }
    }

    /// Number of suites and cases currently open
    #[must_use]
    pub fn open_frames(&self) -> usize {
        self.lock().stack.len()
    }

    /// Id of the most recently completed suite or case
    #[must_use]
    pub fn last_completed(&self) -> Option<DescriptorId> {
        self.lock().last_completed
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn process(&self, destination: Destination, line: &str) -> Result<(), ScrapeError> {
        let kind = grammar::classify(line)?;
        let shared = &self.shared;
        let mut guard = self.lock();
        let state = &mut *guard;

        match kind {
            LineKind::SuiteStarted { suite } => {
                let descriptor = TestDescriptor::suite(shared.ids.generate_id(), suite);
                debug!(id = %descriptor.id(), suite = %descriptor.suite_name(), "Suite started");
                shared.sink.started(
                    &descriptor,
                    TestStartEvent {
                        start_time: shared.clock.now(),
                    },
                );
                state.stack.push(ContextFrame::new(descriptor));
            }
            LineKind::SuiteEnded { suite, failed } => {
                let frame = state.pop_for_exit(line)?;
                let descriptor = frame.descriptor();
                if descriptor.kind() != DescriptorKind::Suite || descriptor.suite_name() != suite {
                    warn!(
                        expected = %suite,
                        popped = %descriptor,
                        "Suite end does not match innermost open test"
                    );
                }
                debug!(id = %descriptor.id(), suite = %suite, failed, "Suite ended");
                shared.sink.completed(
                    descriptor.id(),
                    TestCompleteEvent {
                        end_time: shared.clock.now(),
                        result: if failed {
                            ResultType::Failure
                        } else {
                            ResultType::Success
                        },
                    },
                );
            }
            LineKind::SuiteMalformed => {
                trace!(line, "Ignoring test suite line without a suite name");
            }
            LineKind::CaseStarted { name } => {
                let descriptor = TestDescriptor::case(shared.ids.generate_id(), name);
                debug!(id = %descriptor.id(), case = %descriptor, "Case started");
                shared.sink.started(
                    &descriptor,
                    TestStartEvent {
                        start_time: shared.clock.now(),
                    },
                );
                state.stack.push(ContextFrame::new(descriptor));
            }
            LineKind::CaseEnded { name, failed } => {
                let (descriptor, messages) = state.pop_for_exit(line)?.into_parts();
                if !descriptor.is_case(&name) {
                    warn!(
                        expected = %name.case,
                        popped = %descriptor,
                        "Case end does not match innermost open test"
                    );
                }
                debug!(id = %descriptor.id(), case = %descriptor, failed, "Case ended");

                let result = if failed {
                    shared.sink.failure(
                        descriptor.id(),
                        TestFailure {
                            message: messages.join(LINE_SEPARATOR),
                        },
                    );
                    ResultType::Failure
                } else {
                    ResultType::Success
                };
                shared.sink.completed(
                    descriptor.id(),
                    TestCompleteEvent {
                        end_time: shared.clock.now(),
                        result,
                    },
                );
            }
            LineKind::Output => {
                let output = TestOutputEvent {
                    destination,
                    text: line.to_string(),
                };

                if let Some(frame) = state.stack.last_mut() {
                    shared.sink.output(frame.descriptor().id(), output);

                    if let Some(detail) = grammar::parse_failure_detail(line)
                        && frame
                            .descriptor()
                            .is_case(&detail.name)
                    {
                        frame.push_message(detail.message);
                    }
                } else if let Some(id) = state.last_completed {
                    // Output can trail the end line of the test that produced it
                    shared.sink.output(id, output);
                } else {
                    trace!(line, "Dropping output outside of any test");
                }
            }
        }

        Ok(())
    }
}

/// Scraper for a single output channel of the runner
#[derive(Clone)]
pub struct Scraper {
    destination: Destination,
    context: ScrapeContext,
}

impl Scraper {
    /// Process one line of runner output
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::MalformedCaseLine` for a `Test Case` line without
    /// a case name and `ScrapeError::UnbalancedExit` for an end line with no
    /// open test. The context is unchanged in both cases.
    pub fn text(&self, line: &str) -> Result<(), ScrapeError> {
        self.context.process(self.destination, line)
    }

    /// See [`ScrapeContext::end_of_stream`]
    pub fn end_of_stream(&self, failure: Option<&dyn Error>) {
        self.context.end_of_stream(failure);
    }

    /// Channel this scraper attributes its lines to
    #[must_use]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// The context shared with the other channel's scraper
    #[must_use]
    pub fn context(&self) -> &ScrapeContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::event::SinkEvent;
    use crate::sink::RecordingSink;
    use chrono::{Duration, TimeZone, Utc};
    use similar_asserts::assert_eq;

    struct Harness {
        sink: Arc<RecordingSink>,
        clock: Arc<FixedClock>,
        context: ScrapeContext,
        stdout: Scraper,
        stderr: Scraper,
    }

    impl Harness {
        fn new() -> Self {
            let sink = Arc::new(RecordingSink::new());
            let clock = Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            ));
            let context = ScrapeContext::with_services(
                sink.clone(),
                Arc::new(SequentialIdGenerator::new()),
                clock.clone(),
            );
            let stdout = context.scraper(Destination::StdOut);
            let stderr = context.scraper(Destination::StdErr);
            Self {
                sink,
                clock,
                context,
                stdout,
                stderr,
            }
        }

        fn feed(&self, lines: &[&str]) {
            for line in lines {
                self.stdout.text(line).expect("line should be accepted");
            }
        }
    }

    fn output(id: u64, destination: Destination, text: &str) -> SinkEvent {
        SinkEvent::Output {
            id: DescriptorId(id),
            destination,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_failed_case_without_details() {
        let h = Harness::new();
        h.feed(&[
            "Test Suite 'Foo' started at t0",
            "Test Case '-[Foo.Bar baz]' started.",
            "Test Case '-[Foo.Bar baz]' failed (0.001 seconds).",
            "Test Suite 'Foo' failed at t1",
        ]);

        let events = h.sink.events();
        assert_eq!(events.len(), 5);

        let SinkEvent::Started { descriptor, .. } = &events[0] else {
            panic!("expected suite start, got {:?}", events[0]);
        };
        assert_eq!(descriptor.kind(), DescriptorKind::Suite);
        assert_eq!(descriptor.suite_name(), "Foo");

        let SinkEvent::Started { descriptor, .. } = &events[1] else {
            panic!("expected case start, got {:?}", events[1]);
        };
        assert_eq!(descriptor.kind(), DescriptorKind::Case);
        assert_eq!(descriptor.suite_name(), "Foo");
        assert_eq!(descriptor.case_name(), Some("baz"));

        assert_eq!(
            events[2],
            SinkEvent::Failure {
                id: DescriptorId(2),
                message: String::new(),
            }
        );
        assert!(matches!(
            events[3],
            SinkEvent::Completed {
                id: DescriptorId(2),
                result: ResultType::Failure,
                ..
            }
        ));
        assert!(matches!(
            events[4],
            SinkEvent::Completed {
                id: DescriptorId(1),
                result: ResultType::Failure,
                ..
            }
        ));
        assert_eq!(h.context.open_frames(), 0);
    }

    #[test]
    fn test_passing_case_emits_only_completion() {
        let h = Harness::new();
        h.feed(&[
            "Test Case '-[Foo.Bar baz]' started.",
            "Test Case '-[Foo.Bar baz]' passed (0.001 seconds).",
        ]);

        let events = h.sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            SinkEvent::Completed {
                result: ResultType::Success,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_details_are_joined_in_order() {
        let h = Harness::new();
        h.feed(&[
            "Test Case '-[Foo.Bar baz]' started.",
            "/src/BarTests.swift:12: error: -[Foo.Bar baz] : first",
            "/src/BarTests.swift:13: error: -[Foo.Bar baz] : second",
            "Test Case '-[Foo.Bar baz]' failed (0.002 seconds).",
        ]);

        let failure = h
            .sink
            .events()
            .into_iter()
            .find(|e| matches!(e, SinkEvent::Failure { .. }))
            .expect("failure event");
        assert_eq!(
            failure,
            SinkEvent::Failure {
                id: DescriptorId(1),
                message: format!("first{LINE_SEPARATOR}second"),
            }
        );
    }

    #[test]
    fn test_failure_detail_is_also_output() {
        let h = Harness::new();
        let detail = ":12: error: -[Foo.Bar baz] : assertion X failed";
        h.feed(&["Test Case '-[Foo.Bar baz]' started.", detail]);

        let events = h.sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], output(1, Destination::StdOut, detail));
    }

    #[test]
    fn test_failure_detail_for_other_case_is_ignored() {
        let h = Harness::new();
        h.feed(&[
            "Test Case '-[Foo.Bar baz]' started.",
            ":12: error: -[Foo.Bar other] : not ours",
            ":13: error: -[Other.Bar baz] : not ours either",
            ":14: error: -[Foo.Quux baz] : same case name, other class",
            "Test Case '-[Foo.Bar baz]' failed (0.002 seconds).",
        ]);

        assert!(h.sink.events().contains(&SinkEvent::Failure {
            id: DescriptorId(1),
            message: String::new(),
        }));
    }

    #[test]
    fn test_failure_detail_inside_suite_frame_is_not_captured() {
        let h = Harness::new();
        h.feed(&[
            "Test Suite 'Foo' started at t0",
            ":12: error: -[Foo.Foo Foo] : suite level",
        ]);

        h.context.end_of_stream(Some(&ScrapeError::UnexpectedEndOfStream { open: 1 }));
        let events = h.sink.events();
        let SinkEvent::Aborted { frame, .. } = events.last().expect("aborted") else {
            panic!("expected aborted frame");
        };
        assert!(frame.messages().is_empty());
    }

    #[test]
    fn test_output_is_attributed_to_innermost_test() {
        let h = Harness::new();
        h.feed(&["Test Suite 'Foo' started at t0", "suite output"]);
        h.stderr.text("Test Case '-[Foo.Bar baz]' started.").unwrap();
        h.stderr.text("case output").unwrap();

        let events = h.sink.events();
        assert_eq!(events[1], output(1, Destination::StdOut, "suite output"));
        assert_eq!(events[3], output(2, Destination::StdErr, "case output"));
    }

    #[test]
    fn test_late_output_goes_to_last_completed() {
        let h = Harness::new();
        h.feed(&[
            "Test Suite 'Foo' started at t0",
            "Test Case '-[Foo.Bar baz]' started.",
            "Test Case '-[Foo.Bar baz]' passed (0.001 seconds).",
            "Test Suite 'Foo' passed at t1",
        ]);
        h.stderr.text("Fatal error: trailing").unwrap();

        assert_eq!(h.context.last_completed(), Some(DescriptorId(1)));
        assert_eq!(
            h.sink.events().last(),
            Some(&output(1, Destination::StdErr, "Fatal error: trailing"))
        );
    }

    #[test]
    fn test_output_before_any_test_is_dropped() {
        let h = Harness::new();
        h.feed(&["Compiling...", "Test Suite 'Foo.xctest' started at t0"]);
        assert!(h.sink.events().is_empty());
        assert_eq!(h.context.last_completed(), None);
    }

    #[test]
    fn test_malformed_case_line_is_an_error() {
        let h = Harness::new();
        h.feed(&["Test Suite 'Foo' started at t0"]);

        let result = h.stdout.text("Test Case 'nonsense' started.");
        assert!(matches!(result, Err(ScrapeError::MalformedCaseLine { .. })));
        assert_eq!(h.context.open_frames(), 1);
        assert_eq!(h.sink.events().len(), 1);
    }

    #[test]
    fn test_exit_without_start_is_an_error() {
        let h = Harness::new();
        let result = h.stdout.text("Test Suite 'Foo' passed at t1");
        assert!(matches!(result, Err(ScrapeError::UnbalancedExit { .. })));
        assert!(h.sink.events().is_empty());
    }

    #[test]
    fn test_mismatched_exit_pops_innermost_frame() {
        let h = Harness::new();
        h.feed(&[
            "Test Suite 'Foo' started at t0",
            "Test Case '-[Foo.Bar baz]' started.",
            "Test Suite 'Foo' passed at t1",
        ]);

        assert_eq!(h.context.open_frames(), 1);
        assert_eq!(h.context.last_completed(), Some(DescriptorId(2)));
    }

    #[test]
    fn test_end_of_stream_with_failure_drains_innermost_first() {
        let h = Harness::new();
        h.feed(&[
            "Test Suite 'All' started at t0",
            "Test Suite 'Foo' started at t0",
            "Test Case '-[Foo.Bar baz]' started.",
            ":12: error: -[Foo.Bar baz] : crashed",
        ]);
        let cause = ScrapeError::Io(std::io::Error::other("pipe closed"));
        h.context.end_of_stream(Some(&cause));

        let aborted: Vec<(DescriptorId, Vec<String>, String)> = h
            .sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Aborted { frame, cause } => {
                    Some((frame.descriptor().id(), frame.messages().to_vec(), cause))
                }
                _ => None,
            })
            .collect();

        assert_eq!(
            aborted,
            vec![
                (
                    DescriptorId(3),
                    vec!["crashed".to_string()],
                    "IO error: pipe closed".to_string()
                ),
                (DescriptorId(2), vec![], "IO error: pipe closed".to_string()),
                (DescriptorId(1), vec![], "IO error: pipe closed".to_string()),
            ]
        );
        assert_eq!(h.context.open_frames(), 0);
        assert_eq!(h.context.last_completed(), None);
    }

    #[test]
    fn test_end_of_stream_without_failure_keeps_frames() {
        let h = Harness::new();
        h.feed(&["Test Suite 'Foo' started at t0"]);
        h.stdout.end_of_stream(None);

        assert_eq!(h.context.open_frames(), 1);
        assert_eq!(h.sink.events().len(), 1);
    }

    #[test]
    fn test_timestamps_come_from_clock() {
        let h = Harness::new();
        let start = h.clock.now();
        h.feed(&["Test Case '-[Foo.Bar baz]' started."]);
        h.clock.advance(Duration::seconds(2));
        h.feed(&["Test Case '-[Foo.Bar baz]' passed (2.000 seconds)."]);

        let events = h.sink.events();
        assert!(matches!(events[0], SinkEvent::Started { start_time, .. } if start_time == start));
        assert!(matches!(
            events[1],
            SinkEvent::Completed { end_time, .. } if end_time == start + Duration::seconds(2)
        ));
    }
}
