// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Fuzz target for the line grammars

#![no_main]

use libfuzzer_sys::fuzz_target;

use xcscrape::grammar::{classify, parse_failure_detail};

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let _ = classify(line);
        let _ = parse_failure_detail(line);
    }
});
