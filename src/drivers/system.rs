//! Chip-level control: restart.
//!
//! On ESP-IDF this performs a software reset; relays drop to their
//! de-energised state with the shift registers.  On host targets the
//! process exits so supervisors (or the developer) see the restart.

use log::warn;

#[cfg(target_os = "espidf")]
pub fn restart(reason: &str) -> ! {
    warn!("Restarting: {}", reason);
    esp_idf_hal::reset::restart()
}

#[cfg(not(target_os = "espidf"))]
pub fn restart(reason: &str) -> ! {
    warn!("Restart(sim): {}", reason);
    std::process::exit(1)
}
