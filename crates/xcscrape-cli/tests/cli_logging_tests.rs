// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! CLI tests for the --verbose / -v and --quiet / -q flags
//!
//! These tests verify the logging level configuration behavior,
//! including flag interactions and level determination.

use clap::Parser;
use tracing::Level;
use xcscrape_cli::config::Config;

// ============================================================================
// --verbose flag tests
// ============================================================================

#[test]
fn test_verbose_short_flag_v() {
    let config = Config::try_parse_from(["xcscrape", "-v"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(!config.quiet);
}

#[test]
fn test_verbose_long_flag() {
    let config = Config::try_parse_from(["xcscrape", "--verbose"]).expect("parse should succeed");
    assert!(config.verbose);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_verbose_flag_value_syntax_not_supported() {
    // Boolean flags are toggled by presence only
    let result = Config::try_parse_from(["xcscrape", "--verbose=true"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

// ============================================================================
// --quiet flag tests
// ============================================================================

#[test]
fn test_quiet_short_flag_q() {
    let config = Config::try_parse_from(["xcscrape", "-q"]).expect("parse should succeed");
    assert!(config.quiet);
    assert!(!config.verbose);
}

#[test]
fn test_quiet_long_flag_sets_warn_level() {
    let config = Config::try_parse_from(["xcscrape", "--quiet"]).expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_quiet_flag_value_false_not_supported() {
    let result = Config::try_parse_from(["xcscrape", "--quiet=false"]);
    assert!(result.is_err(), "Boolean flags don't support =value syntax");
}

// ============================================================================
// Default behavior tests
// ============================================================================

#[test]
fn test_no_flags_means_info_level() {
    let config = Config::try_parse_from(["xcscrape"]).expect("parse should succeed");
    assert!(!config.verbose);
    assert!(!config.quiet);
    assert_eq!(config.log_level(), Level::INFO);
}

// ============================================================================
// Flag interaction tests
// ============================================================================

#[test]
fn test_verbose_and_quiet_both_set_verbose_wins() {
    let config = Config {
        verbose: true,
        quiet: true,
        ..Default::default()
    };
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_combined_vq_flags() {
    let config = Config::try_parse_from(["xcscrape", "-vq"]).expect("parse should succeed");
    assert!(config.verbose);
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_then_verbose_verbose_wins() {
    let config = Config::try_parse_from(["xcscrape", "-q", "-v"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_logging_flags_mix_with_input_flags() {
    let config = Config::try_parse_from(["xcscrape", "-q", "--stdout", "run.log", "-f", "json"])
        .expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.stdout.as_deref(), Some(std::path::Path::new("run.log")));
}
