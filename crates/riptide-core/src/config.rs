use crate::types::{InstanceId, PacketsPerSecond};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

/// Default values for configuration.
pub mod defaults {
    use crate::types::PacketsPerSecond;

    /// The default value for `packets_per_second`.
    pub const DEFAULT_PACKETS_PER_SECOND: PacketsPerSecond = PacketsPerSecond(100);

    /// The default value for `instance_id`.
    pub const DEFAULT_INSTANCE_ID: u16 = 0;
}

/// The probe transport protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// Internet Control Message Protocol for `IPv4`.
    Icmp,
    /// Internet Control Message Protocol for `IPv6`.
    IcmpV6,
    /// User Datagram Protocol.
    Udp,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icmp => write!(f, "icmp"),
            Self::IcmpV6 => write!(f, "icmpv6"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

impl Protocol {
    /// Is this protocol valid for a destination of the given address family?
    #[must_use]
    pub const fn supports(self, dest_addr: IpAddr) -> bool {
        match self {
            Self::Icmp => dest_addr.is_ipv4(),
            Self::IcmpV6 => dest_addr.is_ipv6(),
            Self::Udp => true,
        }
    }
}

/// Configuration for a raw frame `Sender`.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// The name of the network interface to send from.
    pub interface: String,
    /// The identifier of this prober instance.
    ///
    /// Encoded into every probe so that replies elicited by other instances
    /// can be discarded.
    pub instance_id: InstanceId,
    /// The source `IPv4` address override.
    ///
    /// Discovered from the interface when not given.
    pub source_ipv4: Option<Ipv4Addr>,
    /// The source `IPv6` address override.
    ///
    /// Discovered from the interface when not given.
    pub source_ipv6: Option<Ipv6Addr>,
    /// The target probing rate.
    pub packets_per_second: PacketsPerSecond,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            instance_id: InstanceId(defaults::DEFAULT_INSTANCE_ID),
            source_ipv4: None,
            source_ipv6: None,
            packets_per_second: defaults::DEFAULT_PACKETS_PER_SECOND,
        }
    }
}

/// Configuration for a `ClassicSender`.
#[derive(Debug, Clone)]
pub struct ClassicConfig {
    /// The probe transport protocol.
    pub protocol: Protocol,
    /// The name of the network interface to send from.
    pub interface: String,
    /// The source address override.
    ///
    /// Discovered from the interface when not given.  The address family
    /// fixes the family of every probe sent.
    pub source_addr: Option<IpAddr>,
    /// Whether to probe over `IPv6` when no source address is given.
    pub ipv6: bool,
    /// The target probing rate.
    pub packets_per_second: PacketsPerSecond,
    /// The file to record the reference send time to, if any.
    pub time_log: Option<PathBuf>,
}

impl Default for ClassicConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Udp,
            interface: String::new(),
            source_addr: None,
            ipv6: false,
            packets_per_second: defaults::DEFAULT_PACKETS_PER_SECOND,
            time_log: None,
        }
    }
}
