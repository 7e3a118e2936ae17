//! Relay bank driver (two daisy-chained 74HC595 shift registers).
//!
//! Bit-bangs a [`PhysicalFrame`] onto the latch / clock / data lines:
//!
//! ```text
//!  LATCH ‾‾\______________________________________/‾‾‾‾
//!  CLOCK ______/‾\_/‾\_ … _/‾\_/‾\_ … _/‾\__________
//!  DATA  ------< b7 >< b6 > … < byte B … >-----------
//!              byte A (8 bits)   byte B (8 bits)
//! ```
//!
//! Outputs only change on the latch's rising edge, so the relays never see
//! a half-shifted frame.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` output pins: on ESP-IDF these are
//! `PinDriver`s, on host/test any recording pin implementation.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::RelayOutputPort;
use crate::encoder::{BitOrder, PhysicalFrame};
use crate::error::OutputError;

pub struct ShiftRegister<L, C, D> {
    latch: L,
    clock: C,
    data: D,
    last: Option<PhysicalFrame>,
}

impl<L, C, D> ShiftRegister<L, C, D>
where
    L: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    pub fn new(latch: L, clock: C, data: D) -> Self {
        Self {
            latch,
            clock,
            data,
            last: None,
        }
    }

    /// Shift both bytes of `frame` out and latch them.
    pub fn write(&mut self, frame: PhysicalFrame) -> Result<(), OutputError> {
        self.latch.set_low().map_err(|_| OutputError::LatchWriteFailed)?;
        for byte in frame.bytes {
            self.shift_out(byte, frame.bit_order)?;
        }
        self.latch.set_high().map_err(|_| OutputError::LatchWriteFailed)?;
        self.last = Some(frame);
        Ok(())
    }

    fn shift_out(&mut self, byte: u8, order: BitOrder) -> Result<(), OutputError> {
        for i in 0..8 {
            let bit = match order {
                BitOrder::MsbFirst => byte & (0x80 >> i),
                BitOrder::LsbFirst => byte & (0x01 << i),
            };
            self.data
                .set_state(PinState::from(bit != 0))
                .map_err(|_| OutputError::DataWriteFailed)?;
            self.clock.set_high().map_err(|_| OutputError::ClockWriteFailed)?;
            self.clock.set_low().map_err(|_| OutputError::ClockWriteFailed)?;
        }
        Ok(())
    }

    /// Last frame successfully latched.
    pub fn last_frame(&self) -> Option<PhysicalFrame> {
        self.last
    }
}

impl<L, C, D> RelayOutputPort for ShiftRegister<L, C, D>
where
    L: OutputPin,
    C: OutputPin,
    D: OutputPin,
{
    fn write_frame(&mut self, frame: PhysicalFrame) {
        if let Err(e) = self.write(frame) {
            warn!("Relay bank: frame {:04X} not latched: {}", frame.word(), e);
        }
    }
}

// ── Self-test sweep ───────────────────────────────────────────

/// Frames that energise each of the 16 relay lines in turn, then release all.
///
/// Line `n` is bit `15 - n` of the wire-order word, i.e. the first bit
/// shifted out is line 0.
pub fn sweep_frames() -> impl Iterator<Item = PhysicalFrame> {
    (0..16u32)
        .map(|line| {
            let word = !(0x8000u16 >> line);
            PhysicalFrame {
                bytes: word.to_be_bytes(),
                bit_order: BitOrder::MsbFirst,
            }
        })
        .chain(core::iter::once(PhysicalFrame::IDLE))
}
