// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

//! Fuzz target for the scraper
//!
//! Feeds arbitrary text line-by-line through two scrapers sharing one
//! context, then drains whatever is left open.

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;

use xcscrape::{Destination, RecordingSink, ScrapeContext, ScrapeError};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let sink = Arc::new(RecordingSink::new());
        let context = ScrapeContext::new(sink.clone());
        let stdout = context.scraper(Destination::StdOut);
        let stderr = context.scraper(Destination::StdErr);

        // Alternate channels; scraping should never panic
        for (i, line) in input.lines().enumerate() {
            let scraper = if i % 2 == 0 { &stdout } else { &stderr };
            let _ = scraper.text(line);
        }

        let open = context.open_frames();
        context.end_of_stream(Some(&ScrapeError::UnexpectedEndOfStream { open }));
        assert_eq!(context.open_frames(), 0);
    }
});
