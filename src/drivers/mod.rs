//! Relay bank, status LED, and chip-level helpers.

pub mod shift_register;
pub mod status_led;
pub mod system;
