#![no_main]

//! Fuzz target for Engine::run()
//!
//! The first line is read as a filter state, the rest as a record list.
//! Any records that parse must go through every pipeline stage.
//!
//! Run with: cargo +nightly fuzz run fuzz_query

use libfuzzer_sys::fuzz_target;
use postbox_core::{Engine, FilterState, Postcard};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (state, records) = text.split_once('\n').unwrap_or(("{}", text));

    let Ok(state) = serde_json::from_str::<FilterState>(state) else {
        return;
    };
    let Ok(records) = Postcard::parse_many(records) else {
        return;
    };

    let view = Engine::default().run(&records, &state);
    assert_eq!(view.stats.receive_count + view.stats.send_count, records.len());
    assert!(view.display_cards.len() <= view.total_filtered_count);
});
