//! GPIO assignments and relay harness wiring for the BlindRelay board.
//!
//! Single source of truth: drivers and `main` reference this module rather
//! than hard-coding pin numbers or wiring quirks.

use crate::channel::{Channel, Direction};
use crate::encoder::{ChannelEncoder, FrameLayout, RelayLine, WireMapping, WireSwap};

// ---------------------------------------------------------------------------
// Relay bank (two daisy-chained 74HC595, 16 active-low relay lines)
// ---------------------------------------------------------------------------

/// Storage-register clock (RCLK).  Outputs update on its rising edge.
pub const SR_LATCH_GPIO: i32 = 4;
/// Shift-register clock (SRCLK).
pub const SR_CLOCK_GPIO: i32 = 5;
/// Serial data in (SER) of the first register.
pub const SR_DATA_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Status LED (active-low)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Harness wiring
// ---------------------------------------------------------------------------

const fn line(number: u8, direction: Direction) -> RelayLine {
    match Channel::new(number) {
        Some(channel) => RelayLine::new(channel, direction),
        None => panic!("relay line outside the bank"),
    }
}

/// Encoder for the stock board: relay lines are wired straight through.
pub const RELAY_ENCODER: ChannelEncoder =
    ChannelEncoder::new(WireMapping::IDENTITY, FrameLayout::STOCK);

/// Harness variant with the "down" wires of channels 7 and 8 crossed.
pub const CROSSED_7_8_WIRE_SWAPS: [WireSwap; 1] = [WireSwap(
    line(7, Direction::Lower),
    line(8, Direction::Lower),
)];

/// Encoder for boards built with the crossed 7/8 harness.
pub const CROSSED_7_8_ENCODER: ChannelEncoder = ChannelEncoder::new(
    WireMapping::new(&CROSSED_7_8_WIRE_SWAPS),
    FrameLayout::STOCK,
);
