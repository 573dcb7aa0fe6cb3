// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Error types for xcscrape

use thiserror::Error;

/// Errors that can occur while scraping runner output
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A `Test Case` line that does not carry a `'-[Suite.Class case]'` name
    #[error("Malformed test case line: {line}")]
    MalformedCaseLine {
        /// The offending line
        line: String,
    },

    /// A suite or case exit line arrived while no frame was open
    #[error("Test exit without a matching start: {line}")]
    UnbalancedExit {
        /// The offending line
        line: String,
    },

    /// The stream ended normally while suites or cases were still open
    #[error("Output stream ended with {open} test(s) still running")]
    UnexpectedEndOfStream {
        /// Number of frames left on the context stack
        open: usize,
    },

    /// Error reading runner output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
