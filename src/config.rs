//! System configuration parameters
//!
//! All tunable parameters for the BlindRelay controller.
//! Values are loaded from NVS at boot and fall back to the defaults below.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::channel::MAX_CHANNELS;

/// A WiFi network to join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WifiCredentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl WifiCredentials<'static> {
    /// Credentials baked in at build time through `BLINDRELAY_WIFI_SSID` and
    /// `BLINDRELAY_WIFI_PASSWORD`.  `None` when no SSID was given.
    pub const fn from_build_env() -> Option<Self> {
        let Some(ssid) = option_env!("BLINDRELAY_WIFI_SSID") else {
            return None;
        };
        let password = match option_env!("BLINDRELAY_WIFI_PASSWORD") {
            Some(password) => password,
            None => "",
        };
        Some(Self { ssid, password })
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Network ---
    /// Station hostname (also reported by `/version`)
    pub hostname: heapless::String<24>,
    /// WiFi network to join
    pub wifi_ssid: heapless::String<32>,
    /// WPA2 passphrase (empty for open networks)
    pub wifi_password: heapless::String<64>,

    // --- Relays ---
    /// Number of wired blind channels (1-8)
    pub channel_count: u8,
    /// Maximum continuous motor run before the auto-stop fires (milliseconds)
    pub active_duration_ms: u32,
    /// Walk every relay line once at boot
    pub relay_self_test: bool,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Restart after the network has been unreachable this long (milliseconds)
    pub link_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut hostname = heapless::String::new();
        let _ = hostname.push_str("blindrelay");

        Self {
            // Network
            hostname,
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),

            // Relays
            channel_count: MAX_CHANNELS,
            active_duration_ms: 30_000, // full travel of the slowest blind
            relay_self_test: false,

            // Timing
            control_loop_interval_ms: 10,
            link_timeout_ms: 2 * 60 * 1000,
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

impl SystemConfig {
    pub fn has_wifi_credentials(&self) -> bool {
        !self.wifi_ssid.is_empty()
    }

    /// Replace the WiFi credentials.  Leaves `self` untouched when the
    /// result would not validate.
    pub fn set_wifi_credentials(&mut self, credentials: WifiCredentials<'_>) -> Result<(), ConfigError> {
        let mut next = self.clone();
        next.wifi_ssid.clear();
        next.wifi_ssid
            .push_str(credentials.ssid)
            .map_err(|()| ConfigError::ValidationFailed("wifi_ssid must be at most 32 bytes"))?;
        next.wifi_password.clear();
        next.wifi_password
            .push_str(credentials.password)
            .map_err(|()| ConfigError::ValidationFailed("wifi_password must be empty or 8–64 bytes"))?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.is_empty() || !is_printable_ascii(&self.hostname) {
            return Err(ConfigError::ValidationFailed(
                "hostname must be 1–24 printable ASCII characters",
            ));
        }
        if !is_printable_ascii(&self.wifi_ssid) {
            return Err(ConfigError::ValidationFailed(
                "wifi_ssid must be printable ASCII",
            ));
        }
        if !self.wifi_password.is_empty() && self.wifi_password.len() < 8 {
            return Err(ConfigError::ValidationFailed(
                "wifi_password must be empty or 8–64 bytes",
            ));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channel_count) {
            return Err(ConfigError::ValidationFailed("channel_count must be 1–8"));
        }
        if !(1_000..=600_000).contains(&self.active_duration_ms) {
            return Err(ConfigError::ValidationFailed(
                "active_duration_ms must be 1000–600000",
            ));
        }
        if !(1..=1_000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 1–1000",
            ));
        }
        if !(10_000..=3_600_000).contains(&self.link_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "link_timeout_ms must be 10000–3600000",
            ));
        }
        Ok(())
    }
}

/// Configuration to boot with.
///
/// Reads the stored config (defaults when storage is missing, unreadable or
/// invalid).  A config without WiFi credentials is provisioned from
/// `credentials` and written back, so later boots find it in storage.
pub fn boot_config<P: ConfigPort>(
    mut store: Option<&mut P>,
    credentials: Option<WifiCredentials<'_>>,
) -> SystemConfig {
    let mut config = match store.as_deref().map(|s| s.load()) {
        None => SystemConfig::default(),
        Some(Err(e)) => {
            warn!("Config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
        Some(Ok(stored)) => match stored.validate() {
            Ok(()) => stored,
            Err(e) => {
                warn!("Stored config rejected ({}), using defaults", e);
                SystemConfig::default()
            }
        },
    };

    if config.has_wifi_credentials() {
        return config;
    }
    let Some(credentials) = credentials else {
        return config;
    };
    if let Err(e) = config.set_wifi_credentials(credentials) {
        warn!("Build-time WiFi credentials rejected: {}", e);
        return config;
    }
    info!("Provisioned WiFi network '{}'", config.wifi_ssid);
    if let Some(store) = store.as_deref_mut() {
        if let Err(e) = store.save(&config) {
            warn!("Provisioned config not saved: {}", e);
        }
    }
    config
}
