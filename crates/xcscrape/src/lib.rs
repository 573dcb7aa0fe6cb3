// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! xcscrape: XCTest console output scraping
//!
//! This library crate turns the line-oriented console output of an XCTest
//! runner into a stream of test lifecycle events (suite and case start,
//! completion, failures and captured output) delivered to a [`ResultSink`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xcscrape::{Destination, ScrapeContext, SummarySink};
//!
//! let summary = Arc::new(SummarySink::new());
//! let context = ScrapeContext::new(summary.clone());
//! let stdout = context.scraper(Destination::StdOut);
//!
//! for line in std::io::stdin().lines() {
//!     stdout.text(&line.unwrap()).unwrap();
//! }
//! context.end_of_stream(None);
//!
//! println!("{} passed", summary.summary().passed);
//! ```

pub mod clock;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod grammar;
pub mod result;
pub mod scraper;
pub mod sink;
pub mod summary;

pub use clock::{Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock};
pub use descriptor::{CaseName, ContextFrame, DescriptorId, DescriptorKind, TestDescriptor};
pub use error::ScrapeError;
pub use event::{
    Destination, SinkEvent, TestCompleteEvent, TestFailure, TestOutputEvent, TestStartEvent,
};
pub use result::{ResultType, TestOutcome, TestResult, TestRunSummary};
pub use scraper::{LINE_SEPARATOR, ScrapeContext, Scraper};
pub use sink::{FanoutSink, JsonLinesSink, RecordingSink, ResultSink};
pub use summary::SummarySink;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ScrapeError;
    pub use crate::event::{Destination, SinkEvent};
    pub use crate::result::{ResultType, TestOutcome, TestRunSummary};
    pub use crate::scraper::{ScrapeContext, Scraper};
    pub use crate::sink::{RecordingSink, ResultSink};
    pub use crate::summary::SummarySink;
}
