// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Line grammars of XCTest console output
//!
//! Three line shapes are recognized:
//! - suite boundaries: `Test Suite 'Foo' started at ...` / `... passed at ...` / `... failed at ...`
//! - case boundaries: `Test Case '-[Foo.Bar baz]' started.` / `... passed (...)` / `... failed (...)`
//! - failure details: `/path/File.swift:12: error: -[Foo.Bar baz] : XCTAssertTrue failed`
//!
//! Everything else is plain output.
//!
//! # Example
//!
//! ```
//! use xcscrape::grammar::{LineKind, classify};
//!
//! let kind = classify("Test Suite 'Foo' started at 2026-01-01 12:00:00.000").unwrap();
//! assert_eq!(kind, LineKind::SuiteStarted { suite: "Foo".to_string() });
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::descriptor::CaseName;
use crate::error::ScrapeError;

const SUITE_PREFIX: &str = "Test Suite";
const CASE_PREFIX: &str = "Test Case";

static SUITE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([[:alnum:]]+)'").expect("suite name pattern is valid"));

static CASE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'-\[([[:alnum:]]+)\.([[:alnum:]]+) ([[:alnum:]]+)\]'")
        .expect("case name pattern is valid")
});

static FAILURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":[0-9]+: error: -\[([[:alnum:]]+)\.([[:alnum:]]+) ([[:alnum:]]+)\] : (.*)")
        .expect("failure pattern is valid")
});

/// Classification of a single line of runner output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `Test Suite '<suite>' started at ...`
    SuiteStarted {
        /// Suite name
        suite: String,
    },
    /// `Test Suite '<suite>' passed at ...` or `... failed at ...`
    SuiteEnded {
        /// Suite name
        suite: String,
        /// Whether the line reports a failure
        failed: bool,
    },
    /// A `Test Suite` line without a quoted suite name
    SuiteMalformed,
    /// `Test Case '-[Suite.Class case]' started.`
    CaseStarted {
        /// Case identity
        name: CaseName,
    },
    /// `Test Case '-[Suite.Class case]' passed (...)` or `... failed (...)`
    CaseEnded {
        /// Case identity
        name: CaseName,
        /// Whether the line reports a failure
        failed: bool,
    },
    /// Anything else
    Output,
}

/// Message extracted from a failure-detail line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// Case the failure is reported for
    pub name: CaseName,
    /// Assertion message
    pub message: String,
}

/// Classify a line of runner output
///
/// # Errors
///
/// Returns `ScrapeError::MalformedCaseLine` for a `Test Case` line that does
/// not carry a `'-[Suite.Class case]'` name.
pub fn classify(line: &str) -> Result<LineKind, ScrapeError> {
    if line.starts_with(SUITE_PREFIX) {
        let Some(captures) = SUITE_NAME_PATTERN.captures(line) else {
            return Ok(LineKind::SuiteMalformed);
        };
        let suite = captures[1].to_string();

        if line.contains("started at") {
            Ok(LineKind::SuiteStarted { suite })
        } else {
            Ok(LineKind::SuiteEnded {
                suite,
                failed: line.contains("failed at"),
            })
        }
    } else if line.starts_with(CASE_PREFIX) {
        let name = parse_case_name(line).ok_or_else(|| ScrapeError::MalformedCaseLine {
            line: line.to_string(),
        })?;

        if line.contains("started.") {
            Ok(LineKind::CaseStarted { name })
        } else {
            Ok(LineKind::CaseEnded {
                name,
                failed: line.contains("failed ("),
            })
        }
    } else {
        Ok(LineKind::Output)
    }
}

/// Find the first `'-[Suite.Class case]'` token in a line
#[must_use]
pub fn parse_case_name(line: &str) -> Option<CaseName> {
    let captures = CASE_NAME_PATTERN.captures(line)?;
    Some(CaseName {
        suite: captures[1].to_string(),
        class_name: captures[2].to_string(),
        case: captures[3].to_string(),
    })
}

/// Extract the case identity and message of a `:<line>: error: -[...] : <message>` line
#[must_use]
pub fn parse_failure_detail(line: &str) -> Option<FailureDetail> {
    let captures = FAILURE_PATTERN.captures(line)?;
    Some(FailureDetail {
        name: CaseName {
            suite: captures[1].to_string(),
            class_name: captures[2].to_string(),
            case: captures[3].to_string(),
        },
        message: captures[4].to_string(),
    })
}
