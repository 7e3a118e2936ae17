//! Integration tests for the HTTP request path.
//!
//! Covers the router against a live controller, and the channel bridge that
//! carries requests from the server task to the control loop.

use std::thread;
use std::time::Duration;

use blindrelay::api::channels;
use blindrelay::api::router::{RequestHandler, Response};
use blindrelay::app::service::ChannelController;
use blindrelay::channel::ChannelSet;
use blindrelay::config::SystemConfig;
use blindrelay::encoder::PhysicalFrame;
use blindrelay::pins::RELAY_ENCODER;

use crate::mock_hw::{EventLog, MockRelays};

struct Rig {
    handler: RequestHandler,
    ctl: ChannelController,
    out: MockRelays,
    sink: EventLog,
}

impl Rig {
    fn new(channel_count: u8) -> Self {
        let config = SystemConfig {
            channel_count,
            ..SystemConfig::default()
        };
        let mut ctl = ChannelController::new(&config, RELAY_ENCODER);
        let mut out = MockRelays::new();
        let mut sink = EventLog::new();
        ctl.start(&mut out, &mut sink);
        Self {
            handler: RequestHandler::new(&config),
            ctl,
            out,
            sink,
        }
    }

    fn get(&mut self, uri: &str, now_ms: u64) -> Response {
        self.handler
            .handle(uri, &mut self.ctl, &mut self.out, &mut self.sink, now_ms)
    }
}

// ── Router ────────────────────────────────────────────────────

#[test]
fn up_then_stop_over_http() {
    let mut rig = Rig::new(8);
    assert_eq!(rig.get("/up?blinds=2", 0), Response::ok());
    assert_eq!(rig.out.last().unwrap().bytes, [0xFF, !0b10]);

    assert_eq!(rig.get("/stop?blinds=2", 100), Response::ok());
    assert_eq!(rig.out.last(), Some(PhysicalFrame::IDLE));
    assert!(rig.ctl.scheduler().pending().is_empty());
}

#[test]
fn malformed_mask_is_400_and_changes_nothing() {
    let mut rig = Rig::new(8);
    rig.get("/down?blinds=1", 0);
    let frames = rig.out.frames.len();
    let state = rig.ctl.state();

    for uri in ["/up?blinds=0,2", "/up?blinds=9", "/up?blinds=a,2", "/stop?blinds="] {
        let r = rig.get(uri, 1);
        assert_eq!(r.status, 400, "{uri}");
        assert_eq!(r.body, "Malformed mask");
    }
    assert_eq!(rig.out.frames.len(), frames);
    assert_eq!(rig.ctl.state(), state);
}

#[test]
fn selector_limited_to_configured_channels() {
    let mut rig = Rig::new(4);
    assert_eq!(rig.get("/up?blinds=5", 0).status, 400);
    assert_eq!(rig.get("/down", 0), Response::ok());
    assert_eq!(rig.ctl.state().lowering, ChannelSet::from_bits(0b1111));
}

#[test]
fn unknown_routes_are_404() {
    let mut rig = Rig::new(8);
    for uri in ["/", "/open", "/up/2", "/Up"] {
        assert_eq!(rig.get(uri, 0).status, 404, "{uri}");
    }
}

#[test]
fn status_reflects_auto_stop() {
    let mut rig = Rig::new(8);
    rig.get("/up?blinds=1,2", 0);
    assert!(rig.get("/status", 0).body.contains(r#""raising":[1,2]"#));

    let mut out = MockRelays::new();
    rig.ctl.tick(30_000, &mut out, &mut rig.sink);
    assert_eq!(
        rig.get("/status", 30_000).body,
        r#"{"raising":[],"lowering":[],"pending_stops":0}"#
    );
}

// ── Channel bridge ────────────────────────────────────────────

#[test]
fn bridge_carries_request_and_reply() {
    let mut rig = Rig::new(8);

    let client = thread::spawn(|| channels::forward("/down?blinds=3%2C4"));

    let mut served = 0;
    for _ in 0..500 {
        served += channels::serve_pending(
            &rig.handler,
            &mut rig.ctl,
            &mut rig.out,
            &mut rig.sink,
            0,
        );
        if served > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(served, 1);

    let response = client.join().unwrap();
    assert_eq!(response, Response::ok());
    assert_eq!(rig.ctl.state().lowering, ChannelSet::from_bits(0b1100));
}

#[test]
fn overlong_target_is_refused_before_queueing() {
    let uri = format!("/up?blinds={}", "1,".repeat(100));
    assert_eq!(channels::forward(&uri).status, 414);
}
