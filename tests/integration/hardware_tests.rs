//! Integration tests for the hardware adapter over recording GPIO pins.
//!
//! Reconstructs what the 74HC595 chain would latch from the raw pin writes,
//! so the controller → encoder → shift-register path is checked bit for bit.

use std::cell::RefCell;
use std::rc::Rc;

use blindrelay::adapters::hardware::HardwareAdapter;
use blindrelay::app::ports::{IndicatorPort, RelayOutputPort};
use blindrelay::app::service::ChannelController;
use blindrelay::channel::ChannelSet;
use blindrelay::config::SystemConfig;
use blindrelay::drivers::shift_register::{ShiftRegister, sweep_frames};
use blindrelay::drivers::status_led::{LedPattern, StatusLed};
use blindrelay::pins::RELAY_ENCODER;

use crate::mock_hw::{EventLog, PinLog, RecordingPin};

const LATCH: u8 = 0;
const CLOCK: u8 = 1;
const DATA: u8 = 2;
const LED: u8 = 3;

type Adapter = HardwareAdapter<RecordingPin, RecordingPin, RecordingPin, RecordingPin>;

fn make() -> (Adapter, PinLog) {
    let log: PinLog = Rc::new(RefCell::new(Vec::new()));
    let pin = |id| RecordingPin {
        id,
        log: log.clone(),
    };
    let relays = ShiftRegister::new(pin(LATCH), pin(CLOCK), pin(DATA));
    let led = StatusLed::new(pin(LED));
    (HardwareAdapter::new(relays, led), log)
}

/// The 16 bits latched by the last complete latch-low … latch-high cycle,
/// in shift order.
fn latched_word(log: &[(u8, bool)]) -> u16 {
    let mut data = false;
    let mut word = 0u16;
    for &(pin, level) in log {
        match (pin, level) {
            (LATCH, false) => word = 0,
            (DATA, _) => data = level,
            (CLOCK, true) => word = (word << 1) | u16::from(data),
            _ => {}
        }
    }
    word
}

#[test]
fn controller_frame_reaches_the_pins() {
    let (mut hw, log) = make();
    let mut ctl = ChannelController::new(&SystemConfig::default(), RELAY_ENCODER);
    let mut sink = EventLog::new();
    ctl.start(&mut hw, &mut sink);
    assert_eq!(latched_word(&log.borrow()), 0xFFFF);

    ctl.raise(ChannelSet::from_bits(0b0000_0001), 0, &mut hw);
    // Lower byte (all released) first, then raise byte with channel 1 low.
    assert_eq!(latched_word(&log.borrow()), 0xFFFE);
    assert_eq!(hw.last_frame(), Some(ctl.frame()));
}

#[test]
fn sweep_walks_a_single_low_bit() {
    let (mut hw, log) = make();
    for (line, frame) in sweep_frames().take(16).enumerate() {
        hw.write_frame(frame);
        assert_eq!(latched_word(&log.borrow()), !(0x8000u16 >> line));
    }
}

#[test]
fn led_follows_pattern_and_is_active_low() {
    let (mut hw, log) = make();
    hw.show(LedPattern::Online, 0);
    assert!(hw.led_is_lit());
    assert_eq!(log.borrow().last(), Some(&(LED, false)));

    hw.show(LedPattern::Online, 256);
    assert!(!hw.led_is_lit());
    assert_eq!(log.borrow().last(), Some(&(LED, true)));
}
