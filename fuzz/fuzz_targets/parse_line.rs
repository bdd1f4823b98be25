#![no_main]

use libfuzzer_sys::fuzz_target;
use recap_core::DecodeRegistry;
use recap_core::log::{ParsedLine, parse_line, to_log_line};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let registry = DecodeRegistry::decode_all();
    if let Ok(ParsedLine::Record(record)) = parse_line(line, &registry) {
        // Anything that parses must write back out and parse to the same record.
        let written = to_log_line(&record).expect("parsed record serializes");
        match parse_line(&written, &registry) {
            Ok(ParsedLine::Record(again)) => assert_eq!(again, record),
            other => panic!("rewritten line did not parse: {other:?}"),
        }
    }
});
