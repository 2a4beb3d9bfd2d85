//! Reserved IPv4 range classification.
//!
//! Addresses in IANA special-use blocks (private networks, loopback,
//! link-local, multicast, documentation blocks, ...) are not meaningful to
//! geolocate: they either never appear on the public internet or say
//! nothing about where the client is. The lookup layer consults this table
//! before spending a database query on such an address.
//!
//! The table is plain constant data. Membership is a linear scan over
//! (network, netmask) pairs; the ranges are non-overlapping, so scan order
//! does not affect the outcome.

use crate::domain::address::Address;
use std::borrow::Cow;

/// A reserved block expressed as a (network, netmask) pair.
///
/// An address belongs to the block when `address & netmask == network`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedRange {
    network: Address,
    netmask: Address,
}

impl ReservedRange {
    /// Build a range from network and netmask octets.
    pub const fn new(network: [u8; 4], netmask: [u8; 4]) -> Self {
        Self {
            network: Address::from_octets(network),
            netmask: Address::from_octets(netmask),
        }
    }

    /// The network base of this block.
    pub const fn network(&self) -> Address {
        self.network
    }

    /// The netmask of this block.
    pub const fn netmask(&self) -> Address {
        self.netmask
    }

    /// Whether `address` falls inside this block.
    pub const fn contains(&self, address: Address) -> bool {
        address.as_u32() & self.netmask.as_u32() == self.network.as_u32()
    }
}

/// The special-use blocks the service treats as reserved, in table order:
/// this-network, private-use (RFC 1918), shared address space (RFC 6598),
/// loopback, link-local, benchmark/testing and documentation blocks,
/// 6to4 relay anycast, multicast, reserved-for-future-use, and the limited
/// broadcast address.
///
/// The set and masks are part of the service's externally visible
/// classification behavior and must not be edited casually; deployments
/// that want a different set pass one to [`ReservedRanges::from_ranges`].
const IANA_RESERVED: [ReservedRange; 16] = [
    ReservedRange::new([0, 0, 0, 0], [255, 0, 0, 0]),
    ReservedRange::new([10, 0, 0, 0], [255, 0, 0, 0]),
    ReservedRange::new([100, 64, 0, 0], [255, 192, 0, 0]),
    ReservedRange::new([127, 0, 0, 0], [255, 0, 0, 0]),
    ReservedRange::new([169, 254, 0, 0], [255, 255, 0, 0]),
    ReservedRange::new([172, 16, 0, 0], [255, 240, 0, 0]),
    ReservedRange::new([192, 0, 0, 0], [255, 255, 255, 248]),
    ReservedRange::new([192, 0, 2, 0], [255, 255, 255, 0]),
    ReservedRange::new([192, 88, 99, 0], [255, 255, 255, 0]),
    ReservedRange::new([192, 168, 0, 0], [255, 255, 0, 0]),
    ReservedRange::new([192, 18, 0, 0], [255, 254, 0, 0]),
    ReservedRange::new([198, 51, 100, 0], [255, 255, 255, 0]),
    ReservedRange::new([203, 0, 113, 0], [255, 255, 255, 0]),
    ReservedRange::new([224, 0, 0, 0], [240, 0, 0, 0]),
    ReservedRange::new([240, 0, 0, 0], [240, 0, 0, 0]),
    ReservedRange::new([255, 255, 255, 255], [255, 255, 255, 255]),
];

/// An immutable, ordered set of reserved ranges.
///
/// Construct once at process start ([`ReservedRanges::iana`] for the
/// default set) and share by reference; there is no interior mutability
/// and no global state.
#[derive(Debug, Clone)]
pub struct ReservedRanges {
    ranges: Cow<'static, [ReservedRange]>,
}

impl ReservedRanges {
    /// The default table of IANA special-use blocks.
    ///
    /// Borrows static data; construction allocates nothing.
    pub fn iana() -> Self {
        Self {
            ranges: Cow::Borrowed(&IANA_RESERVED),
        }
    }

    /// A custom range set, for deployments that classify differently.
    pub fn from_ranges(ranges: Vec<ReservedRange>) -> Self {
        Self {
            ranges: Cow::Owned(ranges),
        }
    }

    /// Whether `address` falls inside any reserved block.
    ///
    /// Linear scan, true on first match. Pure; safe to call concurrently.
    pub fn is_reserved(&self, address: Address) -> bool {
        self.ranges.iter().any(|range| range.contains(address))
    }

    /// The ranges in table order.
    pub fn ranges(&self) -> &[ReservedRange] {
        &self.ranges
    }
}

impl Default for ReservedRanges {
    fn default() -> Self {
        Self::iana()
    }
}
