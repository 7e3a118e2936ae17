//! Channel controller: the hexagonal core.
//!
//! [`ChannelController`] owns the logical relay state and the auto-stop
//! scheduler.  Every operation mutates state, renders the new frame to the
//! [`RelayOutputPort`], and updates the scheduler as one unit; nothing
//! outside the controller can observe a half-applied command.
//!
//! ```text
//!  AppCommand ──▶ ┌──────────────────────────────┐ ──▶ RelayOutputPort
//!                 │       ChannelController      │
//!  tick(now)  ──▶ │ RelayState · Encoder · Sched │ ──▶ EventSink
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info};

use crate::channel::{ChannelSet, Direction};
use crate::config::SystemConfig;
use crate::encoder::{ChannelEncoder, PhysicalFrame};
use crate::scheduler::AutoStopScheduler;

use super::commands::AppCommand;
use super::events::{AppEvent, RelayState};
use super::ports::{EventSink, RelayOutputPort};

// ───────────────────────────────────────────────────────────────
// ChannelController
// ───────────────────────────────────────────────────────────────

pub struct ChannelController {
    state: RelayState,
    scheduler: AutoStopScheduler,
    encoder: ChannelEncoder,
    channel_count: u8,
}

impl ChannelController {
    /// Construct the controller from configuration.
    ///
    /// Does **not** touch the relays: call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig, encoder: ChannelEncoder) -> Self {
        Self {
            state: RelayState::default(),
            scheduler: AutoStopScheduler::new(u64::from(config.active_duration_ms)),
            encoder,
            channel_count: config.channel_count,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Release every relay.  Relay state is volatile, so boot always starts idle.
    pub fn start(&mut self, out: &mut impl RelayOutputPort, sink: &mut impl EventSink) {
        self.state = RelayState::default();
        self.render(out);
        sink.emit(&AppEvent::Started);
        info!(
            "ChannelController started ({} channels, auto-stop after {}ms)",
            self.channel_count,
            self.scheduler.active_duration_ms()
        );
    }

    // ── Relay operations ──────────────────────────────────────

    /// Release both relays of `mask` and drop their pending auto-stops.
    pub fn stop(&mut self, mask: ChannelSet, out: &mut impl RelayOutputPort) {
        self.clear(mask);
        self.render(out);
        self.scheduler.cancel(mask);
    }

    /// Drive `mask` upwards and schedule its auto-stop.
    pub fn raise(&mut self, mask: ChannelSet, now_ms: u64, out: &mut impl RelayOutputPort) {
        self.drive(Direction::Raise, mask, now_ms, out);
    }

    /// Drive `mask` downwards and schedule its auto-stop.
    pub fn lower(&mut self, mask: ChannelSet, now_ms: u64, out: &mut impl RelayOutputPort) {
        self.drive(Direction::Lower, mask, now_ms, out);
    }

    /// Force-stop channels whose scheduler entry has expired.
    ///
    /// The entry is already consumed, so the scheduler is not consulted.
    pub fn on_scheduler_expiry(&mut self, mask: ChannelSet, out: &mut impl RelayOutputPort) {
        self.clear(mask);
        self.render(out);
    }

    fn drive(
        &mut self,
        direction: Direction,
        mask: ChannelSet,
        now_ms: u64,
        out: &mut impl RelayOutputPort,
    ) {
        match direction {
            Direction::Raise => {
                self.state.lowering = self.state.lowering.difference(mask);
                self.state.raising = self.state.raising.union(mask);
            }
            Direction::Lower => {
                self.state.raising = self.state.raising.difference(mask);
                self.state.lowering = self.state.lowering.union(mask);
            }
        }
        self.render(out);
        self.scheduler.schedule(mask, now_ms);
    }

    fn clear(&mut self, mask: ChannelSet) {
        self.state.raising = self.state.raising.difference(mask);
        self.state.lowering = self.state.lowering.difference(mask);
    }

    fn render(&self, out: &mut impl RelayOutputPort) {
        let frame = self.frame();
        debug!(
            "Relays: up={} down={} frame={:04X}",
            self.state.raising,
            self.state.lowering,
            frame.word()
        );
        out.write_frame(frame);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external command (from the request handler, button, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        out: &mut impl RelayOutputPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::Raise(mask) => self.raise(mask, now_ms, out),
            AppCommand::Lower(mask) => self.lower(mask, now_ms, out),
            AppCommand::Stop(mask) => self.stop(mask, out),
        }
        sink.emit(&AppEvent::CommandApplied {
            command: cmd,
            state: self.state,
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Expire the oldest due auto-stop, if any.
    ///
    /// Returns the channels that were force-stopped.  An entry whose
    /// channels were all cancelled expires silently.
    pub fn tick(
        &mut self,
        now_ms: u64,
        out: &mut impl RelayOutputPort,
        sink: &mut impl EventSink,
    ) -> Option<ChannelSet> {
        let expired = self.scheduler.tick(now_ms)?;
        if expired.is_empty() {
            return None;
        }

        self.on_scheduler_expiry(expired, out);
        sink.emit(&AppEvent::AutoStopped {
            channels: expired,
            state: self.state,
        });
        Some(expired)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Frame for the current logical state.
    pub fn frame(&self) -> PhysicalFrame {
        self.encoder.render(self.state.raising, self.state.lowering)
    }

    pub fn scheduler(&self) -> &AutoStopScheduler {
        &self.scheduler
    }

    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// Mask used when a request names no channels.
    pub fn all_channels(&self) -> ChannelSet {
        ChannelSet::first_n(self.channel_count)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
