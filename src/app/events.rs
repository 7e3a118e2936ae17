//! Outbound application events.
//!
//! The [`ChannelController`](super::service::ChannelController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to serial, count them in
//! tests, and so on.

use serde::Serialize;

use super::commands::AppCommand;
use crate::channel::ChannelSet;

/// Logical relay state: which channels are being driven, and which way.
///
/// Invariant: `raising` and `lowering` are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RelayState {
    pub raising: ChannelSet,
    pub lowering: ChannelSet,
}

impl RelayState {
    pub fn active(&self) -> ChannelSet {
        self.raising.union(self.lowering)
    }

    pub fn is_idle(&self) -> bool {
        self.active().is_empty()
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started and released every relay.
    Started,

    /// A command was applied; carries the resulting state.
    CommandApplied { command: AppCommand, state: RelayState },

    /// The auto-stop fired for these channels.
    AutoStopped { channels: ChannelSet, state: RelayState },
}
