//! Canonical IPv4 address encoding.
//!
//! Every caller and query address enters the system as text and is folded
//! into a single canonical form: the four octets packed big-endian into a
//! `u32` (octet one is the most significant byte). The canonical form is
//! what counter keys and reserved-range tests operate on, so two spellings
//! of the same address always share one quota counter and one
//! classification.
//!
//! Parsing is strict: anything that is not a well-formed dotted quad fails
//! with [`AddressFormatError`] instead of being coerced. In particular,
//! zero-padded octets ("010") are rejected, because they would break the
//! parse/display round trip that canonicalization relies on.

use std::fmt;
use std::str::FromStr;

/// Canonical form of an IPv4 address: the four octets packed big-endian
/// into an unsigned 32-bit value.
///
/// `Address` is `Copy` and totally ordered by numeric value, which matches
/// the natural ordering of IPv4 space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(u32);

/// Error returned when a textual address is not a well-formed dotted quad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFormatError {
    /// The input did not contain exactly four dot-separated octets.
    OctetCount(usize),
    /// An octet (1-based position) was empty, non-numeric, zero-padded,
    /// or outside 0-255.
    InvalidOctet(usize),
}

impl fmt::Display for AddressFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFormatError::OctetCount(found) => {
                write!(f, "expected 4 dot-separated octets, found {}", found)
            }
            AddressFormatError::InvalidOctet(position) => {
                write!(f, "octet {} is not a decimal value in 0-255", position)
            }
        }
    }
}

impl std::error::Error for AddressFormatError {}

impl Address {
    /// Parse a dotted-quad IPv4 string into its canonical form.
    ///
    /// Accepts exactly the canonical spellings: four dot-separated decimal
    /// octets in 0-255, no signs, no padding, no surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`AddressFormatError`] for wrong octet counts, empty or
    /// non-numeric components, out-of-range values, and zero-padded octets.
    pub fn parse(text: &str) -> Result<Self, AddressFormatError> {
        let count = text.split('.').count();
        if count != 4 {
            return Err(AddressFormatError::OctetCount(count));
        }

        let mut octets = [0u8; 4];
        for (index, part) in text.split('.').enumerate() {
            octets[index] =
                parse_octet(part).ok_or(AddressFormatError::InvalidOctet(index + 1))?;
        }
        Ok(Address(u32::from_be_bytes(octets)))
    }

    /// Build an address from four octets, most significant first.
    ///
    /// `const` so reserved-range tables can live in static data.
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Address(u32::from_be_bytes(octets))
    }

    /// The canonical 32-bit value. This is what counter keys are derived
    /// from and what netmask arithmetic operates on.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The four octets, most significant first.
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

fn parse_octet(part: &str) -> Option<u8> {
    let bytes = part.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    // "0" is canonical; "00" or "010" is not.
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    if bytes.len() > 3 {
        return None;
    }
    let value: u16 = part.parse().ok()?;
    u8::try_from(value).ok()
}

impl FromStr for Address {
    type Err = AddressFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Address(value)
    }
}

impl From<Address> for u32 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl From<[u8; 4]> for Address {
    fn from(octets: [u8; 4]) -> Self {
        Address::from_octets(octets)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}
