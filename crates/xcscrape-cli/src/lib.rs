// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! xcscrape-cli library
//!
//! This module exports the command-line front end of xcscrape for use in
//! integration tests and as a library.

pub mod config;
pub mod report;
pub mod run;
