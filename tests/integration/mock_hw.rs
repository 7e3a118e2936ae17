//! Mock adapters for integration tests.
//!
//! Records every frame and event so tests can assert on the full output
//! history without touching real GPIO.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use blindrelay::app::events::AppEvent;
use blindrelay::app::ports::{ClockPort, ConfigError, ConfigPort, EventSink, RelayOutputPort};
use blindrelay::config::SystemConfig;
use blindrelay::encoder::PhysicalFrame;
use embedded_hal::digital::{ErrorType, OutputPin};

// ── MockRelays ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRelays {
    pub frames: Vec<PhysicalFrame>,
}

#[allow(dead_code)]
impl MockRelays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<PhysicalFrame> {
        self.frames.last().copied()
    }
}

impl RelayOutputPort for MockRelays {
    fn write_frame(&mut self, frame: PhysicalFrame) {
        self.frames.push(frame);
    }
}

// ── EventLog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_stops(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::AutoStopped { .. }))
            .count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub stored: Option<SystemConfig>,
    pub saves: usize,
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self.stored.clone().unwrap_or_default())
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.stored = Some(config.clone());
        self.saves += 1;
        Ok(())
    }
}

// ── Recording GPIO ────────────────────────────────────────────

/// Shared log of `(pin id, level)` writes across several [`RecordingPin`]s.
pub type PinLog = Rc<RefCell<Vec<(u8, bool)>>>;

pub struct RecordingPin {
    pub id: u8,
    pub log: PinLog,
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().push((self.id, true));
        Ok(())
    }
}
