//! Status LED driver and blink patterns.
//!
//! A single active-low LED signals what the controller is doing:
//!
//! | Pattern   | Meaning                        | Shape                          |
//! |-----------|--------------------------------|--------------------------------|
//! | Booting   | setup in progress              | toggle every 256 ms            |
//! | Busy      | handling a request             | toggle every 50 ms             |
//! | Online    | network reachable              | 256 ms blip every ~4 s         |
//! | Offline   | network lost                   | ~1 s on / ~1 s off             |
//!
//! Patterns are pure functions of the monotonic clock, so the main loop can
//! sample them at any rate.
//!
//! ## Dual-target design
//!
//! Generic over an `embedded-hal` output pin.

use embedded_hal::digital::{OutputPin, PinState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Booting,
    Busy,
    Online,
    Offline,
}

/// Whether the LED is lit for `pattern` at `now_ms`.
pub fn level_at(pattern: LedPattern, now_ms: u64) -> bool {
    match pattern {
        LedPattern::Booting => (now_ms / 256) % 2 == 0,
        LedPattern::Busy => (now_ms / 50) % 2 == 0,
        // One tick ≈ 256 ms; lit only while every masked phase bit is clear.
        LedPattern::Online => (now_ms >> 8) & 0b1111 == 0,
        LedPattern::Offline => (now_ms >> 8) & 0b100 == 0,
    }
}

pub struct StatusLed<P> {
    pin: P,
    lit: Option<bool>,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, lit: None }
    }

    /// Light or darken the LED.  Only touches the pin on change.
    pub fn set(&mut self, lit: bool) {
        if self.lit == Some(lit) {
            return;
        }
        // Active-low: pulling the pin down lights the LED.
        if self.pin.set_state(PinState::from(!lit)).is_ok() {
            self.lit = Some(lit);
        }
    }

    pub fn show(&mut self, pattern: LedPattern, now_ms: u64) {
        self.set(level_at(pattern, now_ms));
    }

    pub fn is_lit(&self) -> bool {
        self.lit.unwrap_or(false)
    }
}
