//! Logical → physical relay encoding.
//!
//! Turns the controller's `(raising, lowering)` masks into the two bytes
//! shifted out to the relay bank:
//!
//! ```text
//!  raising ─┐    ┌──────────┐   ┌────────────┐   ┌──────────┐
//!           ├──▶ │ conflict │──▶│ wire swaps │──▶│ invert + │──▶ [byte A, byte B]
//!  lowering ┘    │  clear   │   │            │   │  order   │
//!                └──────────┘   └────────────┘   └──────────┘
//! ```
//!
//! Nothing here touches hardware or controller state, so every step is
//! unit-testable in isolation.

use crate::channel::{Channel, ChannelSet, Direction};

// ═══════════════════════════════════════════════════════════════
//  Wire mapping
// ═══════════════════════════════════════════════════════════════

/// One relay line: a channel driven in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLine {
    pub channel: Channel,
    pub direction: Direction,
}

impl RelayLine {
    pub const fn new(channel: Channel, direction: Direction) -> Self {
        Self { channel, direction }
    }
}

/// Two relay lines whose harness wiring is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSwap(pub RelayLine, pub RelayLine);

/// A set of disjoint transpositions correcting for the physical harness.
///
/// Applied only when rendering; logical state never sees it.
#[derive(Debug, Clone, Copy)]
pub struct WireMapping {
    swaps: &'static [WireSwap],
}

impl WireMapping {
    /// Harness wired straight through.
    pub const IDENTITY: Self = Self { swaps: &[] };

    pub const fn new(swaps: &'static [WireSwap]) -> Self {
        Self { swaps }
    }

    /// Exchange the bits of every swap pair.
    ///
    /// Both bits of a pair are read before either is written, so each swap is
    /// an independent, self-inverse transposition.
    pub fn apply(&self, raising: ChannelSet, lowering: ChannelSet) -> (ChannelSet, ChannelSet) {
        let mut lines = LineBits { raising, lowering };
        for WireSwap(a, b) in self.swaps {
            let bit_a = lines.get(*a);
            let bit_b = lines.get(*b);
            lines.set(*a, bit_b);
            lines.set(*b, bit_a);
        }
        (lines.raising, lines.lowering)
    }
}

struct LineBits {
    raising: ChannelSet,
    lowering: ChannelSet,
}

impl LineBits {
    fn slot(&mut self, direction: Direction) -> &mut ChannelSet {
        match direction {
            Direction::Raise => &mut self.raising,
            Direction::Lower => &mut self.lowering,
        }
    }

    fn get(&mut self, line: RelayLine) -> bool {
        self.slot(line.direction).contains(line.channel)
    }

    fn set(&mut self, line: RelayLine, on: bool) {
        let slot = self.slot(line.direction);
        if on {
            slot.insert(line.channel);
        } else {
            slot.remove(line.channel);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Frame layout
// ═══════════════════════════════════════════════════════════════

/// Order in which bits of a byte leave the data pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Deployment-fixed transmission layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Direction whose byte is shifted out first (ends up in the far register).
    pub first: Direction,
    pub bit_order: BitOrder,
}

impl FrameLayout {
    /// Stock board: lower byte first, then raise byte, MSB first.
    pub const STOCK: Self = Self {
        first: Direction::Lower,
        bit_order: BitOrder::MsbFirst,
    };
}

/// The two bytes written to the relay bank, in transmission order.
///
/// Outputs are active-low: a `0` bit energises the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalFrame {
    pub bytes: [u8; 2],
    pub bit_order: BitOrder,
}

impl PhysicalFrame {
    /// Every relay released.
    pub const IDLE: Self = Self {
        bytes: [0xFF, 0xFF],
        bit_order: BitOrder::MsbFirst,
    };

    /// Bits shifted out, in wire order, as a 16-bit word (first byte high).
    pub fn word(&self) -> u16 {
        u16::from_be_bytes(self.bytes)
    }

    /// Number of energised relay lines.
    pub fn energised_lines(&self) -> u32 {
        self.bytes[0].count_zeros() + self.bytes[1].count_zeros()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Encoder
// ═══════════════════════════════════════════════════════════════

/// Stateless renderer from logical masks to a [`PhysicalFrame`].
#[derive(Debug, Clone, Copy)]
pub struct ChannelEncoder {
    mapping: WireMapping,
    layout: FrameLayout,
}

impl ChannelEncoder {
    pub const fn new(mapping: WireMapping, layout: FrameLayout) -> Self {
        Self { mapping, layout }
    }

    /// Render logical masks into the frame written to the shift register.
    pub fn render(&self, raising: ChannelSet, lowering: ChannelSet) -> PhysicalFrame {
        // A channel asked to go both ways goes nowhere.
        let conflict = raising.intersection(lowering);
        let raising = raising.difference(conflict);
        let lowering = lowering.difference(conflict);

        let (raising, lowering) = self.mapping.apply(raising, lowering);

        let raise_byte = !raising.bits();
        let lower_byte = !lowering.bits();
        let bytes = match self.layout.first {
            Direction::Lower => [lower_byte, raise_byte],
            Direction::Raise => [raise_byte, lower_byte],
        };

        PhysicalFrame {
            bytes,
            bit_order: self.layout.bit_order,
        }
    }
}
