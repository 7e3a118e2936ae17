//! BlindRelay firmware library.
//!
//! Relay-driven window blind controller: a bank of up to eight blinds, each
//! with a "raise" and a "lower" relay behind two 74HC595 shift registers.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, so everything else builds and tests on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod channel;
pub mod config;
pub mod encoder;
pub mod error;
pub mod link;
pub mod scheduler;
pub mod selector;

pub mod adapters;
pub mod api;
pub mod drivers;
pub mod pins;

mod critical_section_impl;
