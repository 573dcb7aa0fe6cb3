// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! xcscrape: turn captured XCTest console output into test results
//!
//! Reads the runner's stdout (and optionally stderr), reports what ran, and
//! exits non-zero when a test failed or the output ended abnormally.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use xcscrape_cli::config::Config;
use xcscrape_cli::run::run;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .init();

    config.validate().context("Invalid configuration")?;
    info!(format = ?config.format, "Starting xcscrape");

    let outcome = run(&config, std::io::stdout())
        .await
        .context("Failed to scrape test output")?;

    if outcome.succeeded(config.ignore_failures) {
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(read_error) = &outcome.stats.read_error {
        error!(error = %read_error, "Test output ended abnormally");
    }
    error!(
        failed = outcome.summary.failed,
        aborted = outcome.summary.aborted,
        "There were failing tests"
    );
    Ok(ExitCode::FAILURE)
}
