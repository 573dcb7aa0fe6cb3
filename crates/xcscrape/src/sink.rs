// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Result sinks receiving the scraper's lifecycle events
//!
//! The scraper calls into a [`ResultSink`] synchronously while it holds its
//! context lock, so every sink sees events in a single total order.

use std::error::Error;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::descriptor::{ContextFrame, DescriptorId, TestDescriptor};
use crate::error::ScrapeError;
use crate::event::{SinkEvent, TestCompleteEvent, TestFailure, TestOutputEvent, TestStartEvent};

/// Consumer of test lifecycle events
pub trait ResultSink: Send + Sync {
    /// A suite or case started
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent);

    /// A suite or case completed
    fn completed(&self, id: DescriptorId, event: TestCompleteEvent);

    /// A case ended with a failure; always followed by `completed`
    fn failure(&self, id: DescriptorId, failure: TestFailure);

    /// Output attributed to a suite or case
    fn output(&self, id: DescriptorId, event: TestOutputEvent);

    /// A frame left open when the stream ended abnormally
    fn aborted(&self, frame: ContextFrame, cause: &dyn Error);
}

impl<S: ResultSink + ?Sized> ResultSink for Arc<S> {
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent) {
        (**self).started(descriptor, event);
    }

    fn completed(&self, id: DescriptorId, event: TestCompleteEvent) {
        (**self).completed(id, event);
    }

    fn failure(&self, id: DescriptorId, failure: TestFailure) {
        (**self).failure(id, failure);
    }

    fn output(&self, id: DescriptorId, event: TestOutputEvent) {
        (**self).output(id, event);
    }

    fn aborted(&self, frame: ContextFrame, cause: &dyn Error) {
        (**self).aborted(frame, cause);
    }
}

fn to_sink_event_started(descriptor: &TestDescriptor, event: TestStartEvent) -> SinkEvent {
    SinkEvent::Started {
        descriptor: descriptor.clone(),
        start_time: event.start_time,
    }
}

fn to_sink_event_aborted(frame: ContextFrame, cause: &dyn Error) -> SinkEvent {
    SinkEvent::Aborted {
        frame,
        cause: cause.to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording
// ============================================================================

/// A sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        lock(&self.events).clone()
    }

    /// Take the recorded events, leaving the sink empty
    #[must_use]
    pub fn take_events(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    fn record(&self, event: SinkEvent) {
        lock(&self.events).push(event);
    }
}

impl ResultSink for RecordingSink {
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent) {
        self.record(to_sink_event_started(descriptor, event));
    }

    fn completed(&self, id: DescriptorId, event: TestCompleteEvent) {
        self.record(SinkEvent::Completed {
            id,
            end_time: event.end_time,
            result: event.result,
        });
    }

    fn failure(&self, id: DescriptorId, failure: TestFailure) {
        self.record(SinkEvent::Failure {
            id,
            message: failure.message,
        });
    }

    fn output(&self, id: DescriptorId, event: TestOutputEvent) {
        self.record(SinkEvent::Output {
            id,
            destination: event.destination,
            text: event.text,
        });
    }

    fn aborted(&self, frame: ContextFrame, cause: &dyn Error) {
        self.record(to_sink_event_aborted(frame, cause));
    }
}

// ============================================================================
// Fan-out
// ============================================================================

/// Forwards every event to several sinks, in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the end of the forwarding list
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for FanoutSink {
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent) {
        for sink in &self.sinks {
            sink.started(descriptor, event);
        }
    }

    fn completed(&self, id: DescriptorId, event: TestCompleteEvent) {
        for sink in &self.sinks {
            sink.completed(id, event);
        }
    }

    fn failure(&self, id: DescriptorId, failure: TestFailure) {
        for sink in &self.sinks {
            sink.failure(id, failure.clone());
        }
    }

    fn output(&self, id: DescriptorId, event: TestOutputEvent) {
        for sink in &self.sinks {
            sink.output(id, event.clone());
        }
    }

    fn aborted(&self, frame: ContextFrame, cause: &dyn Error) {
        for sink in &self.sinks {
            sink.aborted(frame.clone(), cause);
        }
    }
}

// ============================================================================
// JSON lines
// ============================================================================

struct JsonLinesState<W> {
    writer: W,
    error: Option<io::Error>,
}

/// Streams every event as one line of JSON
///
/// Write errors do not interrupt scraping: the first one is kept and
/// returned from [`JsonLinesSink::finish`], later events are dropped.
pub struct JsonLinesSink<W> {
    state: Mutex<JsonLinesState<W>>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(JsonLinesState {
                writer,
                error: None,
            }),
        }
    }

    /// Flush the writer and hand it back
    ///
    /// # Errors
    ///
    /// Returns the first error hit while writing or flushing.
    pub fn finish(self) -> Result<W, ScrapeError> {
        let mut state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = state.error.take() {
            return Err(ScrapeError::Io(err));
        }
        state.writer.flush()?;
        Ok(state.writer)
    }

    fn emit(&self, event: &SinkEvent) {
        let mut state = lock(&self.state);
        if state.error.is_some() {
            return;
        }

        let result = serde_json::to_writer(&mut state.writer, event)
            .map_err(io::Error::from)
            .and_then(|()| state.writer.write_all(b"\n"));
        if let Err(err) = result {
            warn!(error = %err, "Failed to write event, dropping further events");
            state.error = Some(err);
        }
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn started(&self, descriptor: &TestDescriptor, event: TestStartEvent) {
        self.emit(&to_sink_event_started(descriptor, event));
    }

    fn completed(&self, id: DescriptorId, event: TestCompleteEvent) {
        self.emit(&SinkEvent::Completed {
            id,
            end_time: event.end_time,
            result: event.result,
        });
    }

    fn failure(&self, id: DescriptorId, failure: TestFailure) {
        self.emit(&SinkEvent::Failure {
            id,
            message: failure.message,
        });
    }

    fn output(&self, id: DescriptorId, event: TestOutputEvent) {
        self.emit(&SinkEvent::Output {
            id,
            destination: event.destination,
            text: event.text,
        });
    }

    fn aborted(&self, frame: ContextFrame, cause: &dyn Error) {
        self.emit(&to_sink_event_aborted(frame, cause));
    }
}
