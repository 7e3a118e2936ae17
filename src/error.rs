//! Unified error types for the BlindRelay firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! pass through the request path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A channel selector in a request could not be parsed.
    Selector(SelectorError),
    /// Writing a frame to the relay bank failed.
    Output(OutputError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(e) => write!(f, "selector: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Selector errors
// ---------------------------------------------------------------------------

/// Why a comma-separated channel list was rejected.
///
/// `position` is the byte offset of the offending token in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorError {
    /// Zero-length token (empty input, leading/trailing or doubled comma).
    EmptyToken { position: usize },
    /// Token contains something other than decimal digits.
    NotNumeric { position: usize },
    /// Token is a number outside `1..=channel_count`.
    OutOfRange { position: usize },
}

impl SelectorError {
    pub const fn position(self) -> usize {
        match self {
            Self::EmptyToken { position }
            | Self::NotNumeric { position }
            | Self::OutOfRange { position } => position,
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken { position } => write!(f, "empty channel at char {position}"),
            Self::NotNumeric { position } => write!(f, "non-numeric channel at char {position}"),
            Self::OutOfRange { position } => write!(f, "channel out of range at char {position}"),
        }
    }
}

impl core::error::Error for SelectorError {}

impl From<SelectorError> for Error {
    fn from(e: SelectorError) -> Self {
        Self::Selector(e)
    }
}

// ---------------------------------------------------------------------------
// Relay output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// Driving the latch line failed.
    LatchWriteFailed,
    /// Driving the shift clock failed.
    ClockWriteFailed,
    /// Driving the serial data line failed.
    DataWriteFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatchWriteFailed => write!(f, "latch write failed"),
            Self::ClockWriteFailed => write!(f, "clock write failed"),
            Self::DataWriteFailed => write!(f, "data write failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// No SSID configured.
    NoCredentials,
    WifiConnectFailed,
    /// The control loop did not accept a forwarded request.
    RequestQueueFull,
    /// Request target longer than the bridge buffer.
    RequestTooLong,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::RequestQueueFull => write!(f, "request queue full"),
            Self::RequestTooLong => write!(f, "request target too long"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
