//! Fuzz target: `RequestHandler::handle`
//!
//! Drives arbitrary request targets through the router against a live
//! controller and checks that the relay state invariants survive and every
//! reply is one the server can send.
//!
//! cargo fuzz run fuzz_request_router

#![no_main]

use blindrelay::app::events::AppEvent;
use blindrelay::app::ports::{EventSink, RelayOutputPort};
use blindrelay::app::service::ChannelController;
use blindrelay::api::router::RequestHandler;
use blindrelay::config::SystemConfig;
use blindrelay::encoder::PhysicalFrame;
use blindrelay::pins::RELAY_ENCODER;
use libfuzzer_sys::fuzz_target;

struct LastFrame(Option<PhysicalFrame>);

impl RelayOutputPort for LastFrame {
    fn write_frame(&mut self, frame: PhysicalFrame) {
        self.0 = Some(frame);
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|uris: Vec<&str>| {
    let config = SystemConfig::default();
    let handler = RequestHandler::new(&config);
    let mut ctl = ChannelController::new(&config, RELAY_ENCODER);
    let mut out = LastFrame(None);
    let mut sink = Discard;
    ctl.start(&mut out, &mut sink);

    for (i, uri) in uris.iter().enumerate() {
        let r = handler.handle(uri, &mut ctl, &mut out, &mut sink, i as u64 * 1_000);
        assert!(matches!(r.status, 200 | 400 | 404), "unexpected status {}", r.status);

        let state = ctl.state();
        assert!(!state.raising.intersects(state.lowering));
        assert_eq!(state.active(), ctl.scheduler().pending());
        assert_eq!(out.0, Some(ctl.frame()));
    }
});
