//! BlindRelay Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LogEventSink   NvsAdapter  MonotonicClock │
//! │  (Relays + LED)      (EventSink)    (Config)    (ClockPort)    │
//! │  WifiAdapter         HttpServer ──▶ api::channels              │
//! │  (Connectivity)                                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           ChannelController (pure logic)               │    │
//! │  │  RelayState · ChannelEncoder · AutoStopScheduler       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  LinkMonitor (restart when the network stays down)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use blindrelay::adapters::hardware::EspHardware;
use blindrelay::adapters::http_server::HttpServer;
use blindrelay::adapters::log_sink::LogEventSink;
use blindrelay::adapters::nvs::NvsAdapter;
use blindrelay::adapters::time::MonotonicClock;
use blindrelay::adapters::wifi::{ConnectivityPort, WifiAdapter};
use blindrelay::api::channels;
use blindrelay::api::router::RequestHandler;
use blindrelay::app::ports::{ClockPort, IndicatorPort, RelayOutputPort};
use blindrelay::app::service::ChannelController;
use blindrelay::config::{self, WifiCredentials};
use blindrelay::drivers::shift_register::sweep_frames;
use blindrelay::drivers::status_led::LedPattern;
use blindrelay::drivers::system;
use blindrelay::error::{CommsError, Error};
use blindrelay::link::{LinkMonitor, LinkVerdict};
use blindrelay::pins;

const HTTP_PORT: u16 = 80;

/// How long the LED keeps the busy pattern after a request was served.
const BUSY_INDICATION_MS: u64 = 200;

/// Dwell per line during the relay self-test.
const SELF_TEST_STEP_MS: u32 = 1_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BlindRelay v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Config ─────────────────────────────────────────────
    let mut nvs = NvsAdapter::new(nvs_partition.clone())
        .inspect_err(|e| warn!("NVS unavailable ({}), running with defaults", e))
        .ok();
    let config = config::boot_config(nvs.as_mut(), WifiCredentials::from_build_env());
    info!(
        "Config: host={} channels={} auto-stop={}ms loop={}ms",
        config.hostname,
        config.channel_count,
        config.active_duration_ms,
        config.control_loop_interval_ms
    );

    // ── 3. Hardware + controller ──────────────────────────────
    let clock = MonotonicClock::new();
    let mut hw = EspHardware::take()?;
    let mut sink = LogEventSink::new();
    let mut controller = ChannelController::new(&config, pins::RELAY_ENCODER);
    controller.start(&mut hw, &mut sink);
    hw.show(LedPattern::Booting, clock.now_ms());

    // ── 4. Optional relay self-test ───────────────────────────
    if config.relay_self_test {
        info!("Self-test: walking all 16 relay lines");
        for frame in sweep_frames() {
            hw.write_frame(frame);
            hw.show(LedPattern::Booting, clock.now_ms());
            FreeRtos::delay_ms(SELF_TEST_STEP_MS);
        }
        hw.write_frame(controller.frame());
    }

    // ── 5. Network ────────────────────────────────────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sysloop)?, &config);
    let online = match wifi.connect() {
        Ok(()) => true,
        Err(CommsError::NoCredentials) => {
            error!("No WiFi network configured: build with BLINDRELAY_WIFI_SSID set");
            false
        }
        Err(e) => system::restart(&Error::from(e).to_string()),
    };

    // ── 6. HTTP server ────────────────────────────────────────
    let _http = HttpServer::start(HTTP_PORT)?;
    let handler = RequestHandler::new(&config);
    let mut link = LinkMonitor::new(config.link_timeout_ms, clock.now_ms());
    let mut busy_until_ms = 0;

    info!("Entering control loop");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now_ms();

        if channels::serve_pending(&handler, &mut controller, &mut hw, &mut sink, now) > 0 {
            busy_until_ms = now + BUSY_INDICATION_MS;
        }
        controller.tick(now, &mut hw, &mut sink);

        let verdict = if online {
            wifi.poll(now);
            link.poll(wifi.is_connected(), now)
        } else {
            LinkVerdict::Degraded { down_for_ms: now }
        };
        if verdict == LinkVerdict::Restart {
            system::restart("network unreachable");
        }

        let pattern = if now < busy_until_ms {
            LedPattern::Busy
        } else {
            verdict.led_pattern()
        };
        hw.show(pattern, now);

        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}
