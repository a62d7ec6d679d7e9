use crate::config::Protocol;
use crate::error::{Error, Result};

/// The layer 2 encapsulation of an injection handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkLayer {
    /// `Ethernet` II framing.
    Ethernet,
    /// The `BSD` loopback encapsulation, a 4 byte host order address family tag.
    BsdLoopback,
    /// No layer 2 framing, the frame starts at the network header.
    None,
}

impl LinkLayer {
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Ethernet => 14,
            Self::BsdLoopback => 4,
            Self::None => 0,
        }
    }
}

/// The network layer of a probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NetworkLayer {
    Ipv4,
    Ipv6,
}

impl NetworkLayer {
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Ipv4 => 20,
            Self::Ipv6 => 40,
        }
    }
}

impl Protocol {
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Icmp | Self::IcmpV6 | Self::Udp => 8,
        }
    }
}

/// A probe frame under construction.
///
/// Partitions a caller owned buffer into contiguous link, network, transport
/// and payload regions for the requested encapsulation and zeroes the whole
/// frame, so that layer encoders may be applied in any order and untouched
/// bytes are never leaked onto the wire.
///
/// The network and transport regions extend to the end of the frame as the
/// `IPv4` total length and the `UDP` checksum are computed over the headers
/// and everything that follows them.
#[derive(Debug)]
pub struct Frame<'a> {
    buf: &'a mut [u8],
    link: LinkLayer,
    network: NetworkLayer,
    transport: Protocol,
    network_offset: usize,
    transport_offset: usize,
    payload_offset: usize,
    len: usize,
}

impl<'a> Frame<'a> {
    /// Partition `buf` for a probe with `payload_size` bytes of payload.
    ///
    /// Fails with [`Error::FrameTooLarge`] if the frame does not fit.
    pub fn new(
        buf: &'a mut [u8],
        link: LinkLayer,
        network: NetworkLayer,
        transport: Protocol,
        payload_size: usize,
    ) -> Result<Self> {
        let network_offset = link.header_size();
        let transport_offset = network_offset + network.header_size();
        let payload_offset = transport_offset + transport.header_size();
        let len = payload_offset + payload_size;
        if len > buf.len() {
            return Err(Error::FrameTooLarge {
                required: len,
                capacity: buf.len(),
            });
        }
        buf[..len].fill(0);
        Ok(Self {
            buf,
            link,
            network,
            transport,
            network_offset,
            transport_offset,
            payload_offset,
            len,
        })
    }

    #[must_use]
    pub const fn link(&self) -> LinkLayer {
        self.link
    }

    #[must_use]
    pub const fn network(&self) -> NetworkLayer {
        self.network
    }

    #[must_use]
    pub const fn transport(&self) -> Protocol {
        self.transport
    }

    /// The total size of the frame in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size of the network header and everything after it.
    #[must_use]
    pub const fn network_size(&self) -> usize {
        self.len - self.network_offset
    }

    /// The size of the transport header and everything after it.
    #[must_use]
    pub const fn transport_size(&self) -> usize {
        self.len - self.transport_offset
    }

    /// The size of the payload.
    #[must_use]
    pub const fn payload_size(&self) -> usize {
        self.len - self.payload_offset
    }

    /// The link layer region.
    pub fn link_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.network_offset]
    }

    /// The network header and everything after it.
    pub fn network_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.network_offset..self.len]
    }

    /// The transport header and everything after it.
    pub fn transport_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.transport_offset..self.len]
    }

    /// The network header and everything after it.
    #[must_use]
    pub fn network_bytes(&self) -> &[u8] {
        &self.buf[self.network_offset..self.len]
    }

    /// The transport header and everything after it.
    #[must_use]
    pub fn transport_bytes(&self) -> &[u8] {
        &self.buf[self.transport_offset..self.len]
    }

    /// The complete frame, ready for injection.
    #[must_use]
    pub fn frame_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
