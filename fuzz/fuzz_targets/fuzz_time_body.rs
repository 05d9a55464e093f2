//! Fuzz target: HTTP request-body parsers
//!
//! Drives arbitrary byte sequences into the `/time`-`/alarm` triplet
//! parser and the `/servo` digit parser and asserts that they never
//! panic and that accepted triplets are faithful to the input fields.
//!
//! cargo fuzz run fuzz_time_body

#![no_main]

use libfuzzer_sys::fuzz_target;
use wakebell::server::{parse_servo_body, parse_time_body};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok((h, m, s)) = parse_time_body(body) {
        // An accepted body must re-render to a body that parses to the
        // same triple — the parser cannot invent or reorder fields.
        let canonical = format!("{} {} {}", h, m, s);
        assert_eq!(parse_time_body(&canonical), Ok((h, m, s)));
    }

    let _ = parse_servo_body(body);
});
