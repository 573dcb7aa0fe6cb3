// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Configuration for the xcscrape command line
//!
//! This module provides the command-line configuration: which captured runner
//! streams to read, how to report the result, and logging options.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

/// Path value that selects standard input
pub const STDIN_PATH: &str = "-";

/// xcscrape - turn XCTest console output into test results
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "xcscrape")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Captured standard output of the test runner
    ///
    /// Use `-` (the default) to read it from stdin.
    #[arg(long, env = "XCSCRAPE_STDOUT")]
    pub stdout: Option<PathBuf>,

    /// Captured standard error of the test runner
    ///
    /// Lines from this stream are attributed against the same open tests as
    /// the standard output lines.
    #[arg(long, env = "XCSCRAPE_STDERR")]
    pub stderr: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t, env = "XCSCRAPE_FORMAT")]
    pub format: OutputFormat,

    /// Exit successfully even when tests failed
    #[arg(long, default_value = "false")]
    pub ignore_failures: bool,

    /// Leave tests still open at the end of the input unreported
    ///
    /// By default a suite or case without an end line is reported as aborted.
    #[arg(long, default_value = "false")]
    pub keep_open: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the report.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// How results are written to stdout
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// One JSON object per lifecycle event, streamed while scraping
    Events,
    /// The run summary as a single JSON document
    Json,
}

/// Where a runner stream is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input of this process
    Stdin,
    /// A captured log file
    File(PathBuf),
}

impl InputSource {
    fn from_path(path: &Path) -> Self {
        if path == Path::new(STDIN_PATH) {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

impl Config {
    /// Source of the runner's standard output, stdin if not specified
    #[must_use]
    pub fn stdout_source(&self) -> InputSource {
        self.stdout
            .as_deref()
            .map_or(InputSource::Stdin, InputSource::from_path)
    }

    /// Source of the runner's standard error, if any
    #[must_use]
    pub fn stderr_source(&self) -> Option<InputSource> {
        self.stderr.as_deref().map(InputSource::from_path)
    }

    /// Whether tests left open at a normal end of input are reported as aborted
    #[must_use]
    pub fn drain_open(&self) -> bool {
        !self.keep_open
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input file doesn't exist or is not a file
    /// - Both streams are read from stdin
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stdout = self.stdout_source();
        let stderr = self.stderr_source();

        if stdout == InputSource::Stdin && stderr == Some(InputSource::Stdin) {
            return Err(ConfigError::StdinUsedTwice);
        }

        for source in std::iter::once(stdout).chain(stderr) {
            if let InputSource::File(path) = source {
                if !path.exists() {
                    return Err(ConfigError::InputNotFound(path));
                }
                if !path.is_file() {
                    return Err(ConfigError::InputNotFile(path));
                }
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),

    /// Both streams were asked to come from stdin
    #[error("Only one of --stdout and --stderr can read from stdin")]
    StdinUsedTwice,
}
