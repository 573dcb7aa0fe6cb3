// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Lifecycle events emitted by the scraper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::{ContextFrame, DescriptorId, TestDescriptor};
use crate::result::ResultType;

/// Channel a line of runner output was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Standard output
    StdOut,
    /// Standard error
    StdErr,
}

/// A suite or case started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStartEvent {
    /// When the start line was scraped
    pub start_time: DateTime<Utc>,
}

/// A suite or case completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCompleteEvent {
    /// When the end line was scraped
    pub end_time: DateTime<Utc>,
    /// Verdict of the end line
    pub result: ResultType,
}

/// Failure reported for a case that ended with `failed (`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFailure {
    /// Captured failure messages joined with the platform line separator
    pub message: String,
}

/// A line of output attributed to a suite or case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutputEvent {
    /// Channel the line was read from
    pub destination: Destination,
    /// The line, without its terminator
    pub text: String,
}

/// Owned record of a single call into a [`ResultSink`](crate::sink::ResultSink)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    /// A suite or case started
    Started {
        descriptor: TestDescriptor,
        start_time: DateTime<Utc>,
    },
    /// A suite or case completed
    Completed {
        id: DescriptorId,
        end_time: DateTime<Utc>,
        result: ResultType,
    },
    /// Failure messages of a failed case, emitted just before its completion
    Failure {
        id: DescriptorId,
        message: String,
    },
    /// A line of output
    Output {
        id: DescriptorId,
        destination: Destination,
        text: String,
    },
    /// A frame drained by an abnormal end of stream
    Aborted {
        frame: ContextFrame,
        cause: String,
    },
}

impl SinkEvent {
    /// Id of the descriptor the event belongs to
    #[must_use]
    pub fn id(&self) -> DescriptorId {
        match self {
            Self::Started { descriptor, .. } => descriptor.id(),
            Self::Completed { id, .. } | Self::Failure { id, .. } | Self::Output { id, .. } => *id,
            Self::Aborted { frame, .. } => frame.descriptor().id(),
        }
    }
}
