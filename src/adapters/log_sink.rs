//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC via `esp_idf_logger` in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | all relays released");
            }
            AppEvent::CommandApplied { command, state } => {
                info!(
                    "CMD   | {:?} | up={} down={}",
                    command, state.raising, state.lowering
                );
            }
            AppEvent::AutoStopped { channels, state } => {
                info!(
                    "AUTO  | stopped {} | up={} down={}",
                    channels, state.raising, state.lowering
                );
            }
        }
    }
}
