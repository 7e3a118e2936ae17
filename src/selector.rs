//! Channel selector parser.
//!
//! Decodes the `blinds=` request value, a comma-separated list of 1-based
//! channel numbers, into a [`ChannelSet`].  Parsing is all-or-nothing: a
//! single bad token rejects the whole selector.
//!
//! An *absent* selector is not handled here; the request layer substitutes
//! "all channels" before calling into the controller.

use log::{debug, warn};

use crate::channel::{Channel, ChannelSet};
use crate::error::SelectorError;

/// Parse `text` into a channel mask for a bank of `channel_count` channels.
///
/// ```
/// use blindrelay::selector::parse;
/// assert_eq!(parse("1,3,8", 8).unwrap().bits(), 0b1000_0101);
/// assert!(parse("9", 8).is_err());
/// ```
pub fn parse(text: &str, channel_count: u8) -> Result<ChannelSet, SelectorError> {
    let mut mask = ChannelSet::EMPTY;
    let mut position = 0;

    for token in text.split(',') {
        let channel = parse_token(token, position, channel_count).inspect_err(|e| {
            warn!("Selector: rejected '{}': {}", text, e);
        })?;
        mask.insert(channel);
        position += token.len() + 1;
    }

    debug!("Selector: '{}' -> 0b{:08b}", text, mask.bits());
    Ok(mask)
}

fn parse_token(token: &str, position: usize, channel_count: u8) -> Result<Channel, SelectorError> {
    if token.is_empty() {
        return Err(SelectorError::EmptyToken { position });
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectorError::NotNumeric { position });
    }

    // All digits: the only parse failure left is overflow, which is out of range anyway.
    let value: u32 = token
        .parse()
        .map_err(|_| SelectorError::OutOfRange { position })?;
    if value == 0 || value > u32::from(channel_count) {
        return Err(SelectorError::OutOfRange { position });
    }

    Channel::new(value as u8).ok_or(SelectorError::OutOfRange { position })
}
