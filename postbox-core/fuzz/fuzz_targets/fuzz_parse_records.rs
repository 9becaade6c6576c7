#![no_main]

//! Fuzz target for Postcard::parse_many()
//!
//! Stored records are never validated, so parsing must reject or accept
//! arbitrary input without panicking.
//!
//! Run with: cargo +nightly fuzz run fuzz_parse_records

use libfuzzer_sys::fuzz_target;
use postbox_core::Postcard;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Postcard::parse_many(text);
    }
});
