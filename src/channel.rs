//! Channel addressing.
//!
//! A channel is one blind: a pair of relays (raise / lower) addressed by a
//! 1-based index.  Sets of channels are carried as a fixed-width bitset so
//! every mask operation is a single register op on the target.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Highest channel count supported by the relay bank (one byte per direction).
pub const MAX_CHANNELS: u8 = 8;

/// Direction a channel's motor is driven in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Raise,
    Lower,
}

/// A single channel, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Build a channel from its 1-based number.  `None` outside `1..=8`.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= MAX_CHANNELS {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// Bit position of this channel within a [`ChannelSet`].
    pub const fn bit(self) -> u8 {
        self.0 - 1
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of channels, bit `n - 1` for channel `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0xFF);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The first `n` channels (`n` clamped to [`MAX_CHANNELS`]).
    pub const fn first_n(n: u8) -> Self {
        if n >= MAX_CHANNELS {
            Self::ALL
        } else {
            Self((1u8 << n) - 1)
        }
    }

    pub const fn single(channel: Channel) -> Self {
        Self(1 << channel.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & (1 << channel.bit()) != 0
    }

    pub fn insert(&mut self, channel: Channel) {
        self.0 |= 1 << channel.bit();
    }

    pub fn remove(&mut self, channel: Channel) {
        self.0 &= !(1 << channel.bit());
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Channels in `self` that are not in `other`.
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate the contained channels in ascending order.
    pub fn iter(self) -> impl Iterator<Item = Channel> {
        (1..=MAX_CHANNELS)
            .filter_map(Channel::new)
            .filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for ChannelSet {
    /// Comma-separated channel numbers, the same shape the selector parser accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl From<Channel> for ChannelSet {
    fn from(channel: Channel) -> Self {
        Self::single(channel)
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for c in iter {
            set.insert(c);
        }
        set
    }
}
