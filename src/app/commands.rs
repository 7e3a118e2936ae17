//! Inbound commands to the channel controller.
//!
//! These represent actions requested by the outside world (HTTP request
//! handler, button, serial) that the
//! [`ChannelController`](super::service::ChannelController) applies.

use crate::channel::{ChannelSet, Direction};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Drive the channels upwards until stopped or the auto-stop fires.
    Raise(ChannelSet),
    /// Drive the channels downwards until stopped or the auto-stop fires.
    Lower(ChannelSet),
    /// Release both relays of the channels.
    Stop(ChannelSet),
}

impl AppCommand {
    /// Command driving `mask` in `direction`.
    pub fn drive(direction: Direction, mask: ChannelSet) -> Self {
        match direction {
            Direction::Raise => Self::Raise(mask),
            Direction::Lower => Self::Lower(mask),
        }
    }

    pub fn mask(self) -> ChannelSet {
        match self {
            Self::Raise(m) | Self::Lower(m) | Self::Stop(m) => m,
        }
    }
}
