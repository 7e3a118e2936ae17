//! Integration tests for the ChannelController → encoder → relay pipeline.
//!
//! Drive the controller exactly as the control loop does (commands plus a
//! periodic tick against a manual clock) and assert on the frames that
//! would reach the shift register.

use blindrelay::app::commands::AppCommand;
use blindrelay::app::events::AppEvent;
use blindrelay::app::ports::{ClockPort, ConfigPort};
use blindrelay::app::service::ChannelController;
use blindrelay::channel::ChannelSet;
use blindrelay::config::SystemConfig;
use blindrelay::encoder::{ChannelEncoder, FrameLayout, PhysicalFrame, WireMapping};
use blindrelay::pins::{CROSSED_7_8_ENCODER, RELAY_ENCODER};

use crate::mock_hw::{EventLog, ManualClock, MockNvs, MockRelays};

const D: u64 = 30_000;

fn set(bits: u8) -> ChannelSet {
    ChannelSet::from_bits(bits)
}

fn make_with(encoder: ChannelEncoder) -> (ChannelController, MockRelays, EventLog, ManualClock) {
    let config = SystemConfig::default();
    let mut ctl = ChannelController::new(&config, encoder);
    let mut out = MockRelays::new();
    let mut sink = EventLog::new();
    ctl.start(&mut out, &mut sink);
    (ctl, out, sink, ManualClock::default())
}

fn make() -> (ChannelController, MockRelays, EventLog, ManualClock) {
    make_with(ChannelEncoder::new(WireMapping::IDENTITY, FrameLayout::STOCK))
}

// ── Auto-stop end to end ──────────────────────────────────────

#[test]
fn raise_is_stopped_exactly_at_active_duration() {
    let (mut ctl, mut out, mut sink, clock) = make();

    ctl.handle_command(AppCommand::Raise(set(0b10)), clock.now_ms(), &mut out, &mut sink);
    assert_eq!(out.last().unwrap().bytes, [0xFF, !0b10]);
    let writes = out.frames.len();

    clock.set(D - 1);
    assert_eq!(ctl.tick(clock.now_ms(), &mut out, &mut sink), None);
    assert_eq!(out.frames.len(), writes, "early tick must not render");

    clock.set(D);
    assert_eq!(ctl.tick(clock.now_ms(), &mut out, &mut sink), Some(set(0b10)));
    assert_eq!(out.last(), Some(PhysicalFrame::IDLE));
    assert_eq!(sink.auto_stops(), 1);
}

#[test]
fn re_raising_extends_the_deadline() {
    let (mut ctl, mut out, mut sink, clock) = make();
    ctl.raise(set(0b1), clock.now_ms(), &mut out);
    clock.advance(20_000);
    ctl.raise(set(0b1), clock.now_ms(), &mut out);

    // The first entry is now empty and expires silently.
    clock.advance(D - 20_000);
    assert_eq!(ctl.tick(clock.now_ms(), &mut out, &mut sink), None);
    assert_eq!(ctl.state().raising, set(0b1));

    clock.advance(20_000);
    assert_eq!(ctl.tick(clock.now_ms(), &mut out, &mut sink), Some(set(0b1)));
    assert!(ctl.state().is_idle());
}

#[test]
fn reversing_moves_channel_to_newest_entry() {
    let (mut ctl, mut out, _, _) = make();
    ctl.raise(set(0b100), 0, &mut out);
    ctl.lower(set(0b100), 10, &mut out);

    let entries: Vec<_> = ctl.scheduler().entries().collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].mask.is_empty());
    assert_eq!(entries[1].mask, set(0b100));
    assert_eq!(ctl.state().lowering, set(0b100));
    assert!(ctl.state().raising.is_empty());
}

#[test]
fn stale_empty_entry_delays_later_expiry_by_one_tick() {
    let (mut ctl, mut out, mut sink, _) = make();
    ctl.raise(set(0b01), 0, &mut out);
    ctl.stop(set(0b01), &mut out);
    ctl.raise(set(0b10), 0, &mut out);

    // First tick pops the empty entry, the next one the live entry.
    assert_eq!(ctl.tick(D, &mut out, &mut sink), None);
    assert_eq!(ctl.tick(D, &mut out, &mut sink), Some(set(0b10)));
}

#[test]
fn entries_expire_in_fifo_order() {
    let (mut ctl, mut out, mut sink, _) = make();
    ctl.lower(set(0b001), 0, &mut out);
    ctl.raise(set(0b010), 5, &mut out);

    assert_eq!(ctl.tick(D + 5, &mut out, &mut sink), Some(set(0b001)));
    assert_eq!(ctl.tick(D + 5, &mut out, &mut sink), Some(set(0b010)));
    assert_eq!(ctl.tick(D + 5, &mut out, &mut sink), None);
}

// ── Stop semantics ────────────────────────────────────────────

#[test]
fn stop_is_idempotent() {
    let (mut ctl, mut out, _, _) = make();
    ctl.raise(set(0b11), 0, &mut out);
    ctl.stop(set(0b01), &mut out);
    let state = ctl.state();
    let pending: Vec<_> = ctl.scheduler().entries().copied().collect();

    ctl.stop(set(0b01), &mut out);
    assert_eq!(ctl.state(), state);
    assert_eq!(ctl.scheduler().entries().copied().collect::<Vec<_>>(), pending);
    assert_eq!(out.frames[out.frames.len() - 1], out.frames[out.frames.len() - 2]);
}

#[test]
fn stop_all_releases_every_relay() {
    let (mut ctl, mut out, _, _) = make();
    ctl.raise(set(0b0000_1111), 0, &mut out);
    ctl.lower(set(0b1111_0000), 0, &mut out);
    assert_eq!(out.last().unwrap().energised_lines(), 8);

    ctl.stop(ctl.all_channels(), &mut out);
    assert_eq!(out.last(), Some(PhysicalFrame::IDLE));
    assert_eq!(ctl.scheduler().pending(), ChannelSet::EMPTY);
}

// ── Stock board wiring ────────────────────────────────────────

#[test]
fn stock_encoder_drives_channel_seven_down_on_its_own_line() {
    let (mut ctl, mut out, _, _) = make_with(RELAY_ENCODER);
    ctl.lower(set(0b0100_0000), 0, &mut out);
    assert_eq!(out.last().unwrap().bytes, [0xBF, 0xFF]);
}

#[test]
fn crossed_harness_rewires_channel_seven_down() {
    let (mut ctl, mut out, _, _) = make_with(CROSSED_7_8_ENCODER);
    ctl.lower(set(0b0100_0000), 0, &mut out);
    assert_eq!(out.last().unwrap().bytes, [0x7F, 0xFF]);
    // Logical state is untouched by the harness mapping.
    assert_eq!(ctl.state().lowering, set(0b0100_0000));
}

// ── Events ────────────────────────────────────────────────────

#[test]
fn every_command_is_reported_with_resulting_state() {
    let (mut ctl, mut out, mut sink, _) = make();
    ctl.handle_command(AppCommand::Lower(set(0b1)), 0, &mut out, &mut sink);
    ctl.handle_command(AppCommand::Stop(set(0b1)), 1, &mut out, &mut sink);

    assert_eq!(sink.events[0], AppEvent::Started);
    assert!(matches!(
        sink.events[1],
        AppEvent::CommandApplied { state, .. } if state.lowering == set(0b1)
    ));
    assert!(matches!(
        sink.events[2],
        AppEvent::CommandApplied { state, .. } if state.is_idle()
    ));
}

// ── Config persistence feeding the controller ─────────────────

#[test]
fn stored_config_drives_controller() {
    let mut nvs = MockNvs::default();
    let custom = SystemConfig {
        channel_count: 3,
        active_duration_ms: 5_000,
        ..SystemConfig::default()
    };
    nvs.save(&custom).unwrap();
    assert_eq!(nvs.saves, 1);

    let config = nvs.load().unwrap();
    let mut ctl = ChannelController::new(&config, RELAY_ENCODER);
    let mut out = MockRelays::new();
    let mut sink = EventLog::new();
    ctl.start(&mut out, &mut sink);

    assert_eq!(ctl.all_channels(), set(0b111));
    ctl.raise(ctl.all_channels(), 0, &mut out);
    assert_eq!(ctl.tick(5_000, &mut out, &mut sink), Some(set(0b111)));
}
