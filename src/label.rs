//! ARINC 429 label identifiers.
//!
//! A label is printed in octal (e.g. `320` for magnetic heading) but is
//! transmitted most-significant-digit first, so on the wire the eight label
//! bits arrive in the reverse of their printed order. The transceiver
//! hardware hands words up exactly as received, which means every lookup key
//! in this crate is the *wire-order* byte. The conversion from printed octal
//! to wire order happens once, at table-build time, never on the hot path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit ARINC 429 label in wire order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(u8);

impl Label {
    /// Builds a label from its printed octal form, e.g.
    /// `Label::from_octal(0o320)`.
    pub const fn from_octal(octal: u8) -> Self {
        Label(octal.reverse_bits())
    }

    /// Builds a label from the byte as it appears on the wire.
    pub const fn from_wire(wire: u8) -> Self {
        Label(wire)
    }

    /// Extracts the label field (bits 0..7) of a received word.
    pub const fn from_word(word: u32) -> Self {
        Label((word & 0xFF) as u8)
    }

    /// The wire-order byte, suitable for ORing into an outgoing word.
    pub const fn wire(self) -> u8 {
        self.0
    }

    /// The printed octal value.
    pub const fn octal(self) -> u8 {
        self.0.reverse_bits()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03o}", self.octal())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({:03o})", self.octal())
    }
}

/// Data encoding carried by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    /// Two's-complement binary.
    Bnr,
    /// Binary-coded decimal, up to 5 digits.
    Bcd,
    /// Bit field with no numeric interpretation.
    Discrete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octal_round_trips_through_wire_order() {
        for octal in [0o012u8, 0o177, 0o235, 0o272, 0o320, 0o377] {
            let label = Label::from_octal(octal);
            assert_eq!(label.octal(), octal);
            assert_eq!(Label::from_wire(label.wire()), label);
        }
    }

    #[test]
    fn known_wire_forms() {
        // 272 octal is 0xBA; reversed within the byte that is 0x5D.
        assert_eq!(Label::from_octal(0o272).wire(), 0x5D);
        assert_eq!(Label::from_octal(0o274).wire(), 0x3D);
        assert_eq!(Label::from_octal(0o275).wire(), 0xBD);
        assert_eq!(Label::from_octal(0o177).wire(), 0xFE);
    }

    #[test]
    fn word_extraction_uses_low_byte() {
        let word = 0x6000_0C5D;
        assert_eq!(Label::from_word(word), Label::from_octal(0o272));
    }

    #[test]
    fn display_is_three_digit_octal() {
        assert_eq!(Label::from_octal(0o012).to_string(), "012");
        assert_eq!(Label::from_octal(0o320).to_string(), "320");
    }
}
