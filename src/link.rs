//! Connectivity watchdog.
//!
//! Watches the station link and asks for a restart once the network has
//! been unreachable for longer than the configured timeout.  It never
//! touches relay or scheduler state; a restart releases every relay anyway.
//!
//! ```text
//!   connected ──▶ Healthy ──(link lost)──▶ Degraded ──(> timeout)──▶ Restart
//!       ▲                                     │
//!       └────────────(link back)──────────────┘
//! ```

use log::{info, warn};

use crate::drivers::status_led::LedPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkVerdict {
    /// Link is up.
    Healthy,
    /// Link is down, still within the grace period.
    Degraded { down_for_ms: u64 },
    /// Link has been down too long; restart the device.
    Restart,
}

impl LinkVerdict {
    /// Status LED pattern reflecting the link.
    pub fn led_pattern(self) -> LedPattern {
        match self {
            Self::Healthy => LedPattern::Online,
            Self::Degraded { .. } | Self::Restart => LedPattern::Offline,
        }
    }
}

pub struct LinkMonitor {
    timeout_ms: u64,
    last_connected_ms: u64,
    last_status: Option<bool>,
}

impl LinkMonitor {
    /// `now_ms` counts as the last time the link was seen up.
    pub fn new(timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            timeout_ms: u64::from(timeout_ms),
            last_connected_ms: now_ms,
            last_status: None,
        }
    }

    /// Feed the current link status.
    pub fn poll(&mut self, connected: bool, now_ms: u64) -> LinkVerdict {
        if self.last_status != Some(connected) {
            if connected {
                info!("Link: connected");
            } else {
                warn!("Link: disconnected");
            }
            self.last_status = Some(connected);
        }

        if connected {
            self.last_connected_ms = now_ms;
            return LinkVerdict::Healthy;
        }

        let down_for_ms = now_ms.saturating_sub(self.last_connected_ms);
        if down_for_ms > self.timeout_ms {
            warn!("Link: down for {}ms (limit {}ms)", down_for_ms, self.timeout_ms);
            LinkVerdict::Restart
        } else {
            LinkVerdict::Degraded { down_for_ms }
        }
    }
}
