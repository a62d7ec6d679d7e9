use crate::error::{IoResult, Result};
use crate::layout::{LinkLayer, NetworkLayer};
use riptide_packet::ethernet::MacAddr;
use std::net::{Ipv4Addr, Ipv6Addr};

pub mod socket;

/// A sink for fully built layer 2 frames.
///
/// Typically backed by a packet capture injection handle.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink {
    /// The layer 2 encapsulation frames must carry.
    ///
    /// Fails for sinks whose datalink type is not supported.
    fn link_layer(&self) -> Result<LinkLayer>;

    /// Inject one frame onto the wire.
    fn inject(&mut self, frame: &[u8]) -> IoResult<()>;
}

/// Resolves the addressing a sender needs from the host.
///
/// Queried once at construction, resolution failures are fatal.
#[cfg_attr(test, mockall::automock)]
pub trait AddressResolver {
    /// The hardware address of the named interface.
    fn interface_mac(&self, interface: &str) -> Result<MacAddr>;

    /// The hardware address of the next hop gateway for the given family.
    fn gateway_mac(&self, interface: &str, network: NetworkLayer) -> Result<MacAddr>;

    /// The source `IPv4` address of the named interface.
    fn source_ipv4(&self, interface: &str) -> Result<Ipv4Addr>;

    /// The source `IPv6` address of the named interface.
    fn source_ipv6(&self, interface: &str) -> Result<Ipv6Addr>;
}
