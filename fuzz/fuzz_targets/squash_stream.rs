#![no_main]

use libfuzzer_sys::fuzz_target;
use recap_core::log::parse_lines;
use recap_core::{SquashConfig, Squasher, squash};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(records) = parse_lines(text, &Squasher::registry()) else {
        return;
    };
    let end = records.iter().map(|r| r.time).max().unwrap_or(0);
    let (squashed, report) = squash(records.iter().cloned(), end, &SquashConfig::default());
    assert_eq!(report.records_consumed, records.len());
    assert_eq!(report.records_emitted, squashed.len());
    assert!(squashed.iter().all(|r| r.time <= end));
});
