//! Fuzz target: `selector::parse`
//!
//! Feeds arbitrary UTF-8 into the channel selector parser and checks that
//! an accepted selector never names a channel outside the bank, and that a
//! rejection points inside the input.
//!
//! cargo fuzz run fuzz_selector

#![no_main]

use blindrelay::channel::ChannelSet;
use blindrelay::selector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, &str)| {
    let (count, text) = input;
    let count = count % 8 + 1;

    match selector::parse(text, count) {
        Ok(mask) => {
            assert!(!mask.is_empty(), "accepted selector must name a channel");
            assert_eq!(mask.difference(ChannelSet::first_n(count)), ChannelSet::EMPTY);
            // Rendering and re-parsing is stable.
            assert_eq!(selector::parse(&mask.to_string(), count), Ok(mask));
        }
        Err(e) => assert!(e.position() <= text.len(), "position past end of input"),
    }
});
