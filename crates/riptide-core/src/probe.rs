use crate::config::Protocol;
use crate::error::{Error, Result};
use crate::layout::NetworkLayer;
use crate::types::{FlowLabel, Port, TimeToLive};
use std::net::IpAddr;

/// A single probe specification.
///
/// Probes are stateless, everything needed to match the eventual reply is
/// encoded into the probe packet itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// The destination address of the probe.
    pub dest_addr: IpAddr,
    /// The time to live (hop limit for `IPv6`) of the probe.
    pub ttl: TimeToLive,
    /// The source port of the probe.
    ///
    /// Used as the echo request identifier for `ICMP` probes.
    pub src_port: Port,
    /// The destination port of the probe.
    ///
    /// Ignored for `ICMP` probes.
    pub dest_port: Port,
    /// The transport protocol of the probe.
    pub protocol: Protocol,
    /// The flow label for `IPv6` probes.
    pub flow_label: FlowLabel,
}

impl Probe {
    /// The network layer implied by the destination address.
    #[must_use]
    pub const fn network_layer(&self) -> NetworkLayer {
        match self.dest_addr {
            IpAddr::V4(_) => NetworkLayer::Ipv4,
            IpAddr::V6(_) => NetworkLayer::Ipv6,
        }
    }

    /// Check the protocol is valid for the destination address family.
    pub fn validate(&self) -> Result<()> {
        if self.protocol.supports(self.dest_addr) {
            Ok(())
        } else {
            Err(Error::IncompatibleProtocol {
                protocol: self.protocol,
                dest_addr: self.dest_addr,
            })
        }
    }
}
