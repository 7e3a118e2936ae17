//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary the control loop uses to
//! join the network and to feed the [`LinkMonitor`](crate::link::LinkMonitor).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: simulation with a controllable link for tests.
//!
//! ## Reconnection policy
//!
//! The first connect blocks until the interface is up.  Afterwards a lost
//! link is retried without blocking, with an exponential backoff (2 s →
//! 4 s → 8 s … capped at 60 s).  Giving up is the link monitor's call.

use log::{info, warn};

use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Join the configured network, blocking until it is reachable.
    fn connect(&mut self) -> Result<(), CommsError>;
    fn is_connected(&self) -> bool;
    /// Drive reconnection; call once per control-loop iteration.
    fn poll(&mut self, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32, next_try_ms: u64 },
}

const INITIAL_BACKOFF_MS: u64 = 2_000;
const MAX_BACKOFF_MS: u64 = 60_000;

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    #[cfg(target_os = "espidf")]
    password: heapless::String<64>,
    hostname: heapless::String<24>,
    backoff_ms: u64,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: link state as seen by the "driver".
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, config: &crate::config::SystemConfig) -> Self {
        Self::with_driver(config, wifi)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &crate::config::SystemConfig) -> Self {
        Self::with_driver(config, false)
    }

    fn with_driver(
        config: &crate::config::SystemConfig,
        #[cfg(target_os = "espidf")] wifi: BlockingWifi<EspWifi<'static>>,
        #[cfg(not(target_os = "espidf"))] sim_link_up: bool,
    ) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: config.wifi_ssid.clone(),
            #[cfg(target_os = "espidf")]
            password: config.wifi_password.clone(),
            hostname: config.hostname.clone(),
            backoff_ms: INITIAL_BACKOFF_MS,
            #[cfg(target_os = "espidf")]
            wifi,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        };

        let fail = |what: &str, e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {} failed: {}", what, e);
            CommsError::WifiConnectFailed
        };
        self.wifi
            .set_configuration(&Configuration::Client(client))
            .map_err(|e| fail("configure", e))?;
        if let Err(e) = self.wifi.wifi_mut().sta_netif_mut().set_hostname(&self.hostname) {
            warn!("WiFi: hostname '{}' not applied: {}", self.hostname, e);
        }
        self.wifi.start().map_err(|e| fail("start", e))?;
        self.wifi.connect().map_err(|e| fail("connect", e))?;
        self.wifi.wait_netif_up().map_err(|e| fail("netif up", e))?;

        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: {} is {}", self.hostname, ip.ip);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.sim_link_up = true;
        info!("WiFi(sim): {} joined '{}'", self.hostname, self.ssid);
        Ok(())
    }

    /// Kick off a reconnect without waiting for the result.
    #[cfg(target_os = "espidf")]
    fn platform_reconnect(&mut self) {
        if let Err(e) = self.wifi.wifi_mut().connect() {
            warn!("WiFi: reconnect request failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_reconnect(&mut self) {}

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    /// Simulation: force the link up or down.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), CommsError> {
        if self.ssid.is_empty() {
            return Err(CommsError::NoCredentials);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.platform_connect()?;
        self.state = WifiState::Connected;
        self.backoff_ms = INITIAL_BACKOFF_MS;
        info!("WiFi: connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn poll(&mut self, now_ms: u64) {
        match self.state {
            WifiState::Connected if !self.platform_is_connected() => {
                warn!("WiFi: connection lost, entering reconnect");
                self.backoff_ms = INITIAL_BACKOFF_MS;
                self.state = WifiState::Reconnecting {
                    attempt: 0,
                    next_try_ms: now_ms,
                };
            }
            WifiState::Reconnecting { .. } if self.platform_is_connected() => {
                info!("WiFi: reconnected");
                self.backoff_ms = INITIAL_BACKOFF_MS;
                self.state = WifiState::Connected;
            }
            WifiState::Reconnecting {
                attempt,
                next_try_ms,
            } if now_ms >= next_try_ms => {
                info!("WiFi: reconnect attempt {} (backoff {}ms)", attempt, self.backoff_ms);
                self.platform_reconnect();
                self.state = WifiState::Reconnecting {
                    attempt: attempt + 1,
                    next_try_ms: now_ms + self.backoff_ms,
                };
                self.backoff_ms = (self.backoff_ms * 2).min(MAX_BACKOFF_MS);
            }
            _ => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
