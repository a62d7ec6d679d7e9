use crate::buffer::Buffer;
use crate::error::{Error, Result};
use std::fmt::{Debug, Formatter};

const FAMILY_OFFSET: usize = 0;

/// The `AF_INET` address family tag (BSD).
pub const FAMILY_IPV4: u32 = 2;

/// The `AF_INET6` address family tag (BSD).
pub const FAMILY_IPV6: u32 = 30;

/// Represents a BSD loopback (`DLT_NULL`) frame header.
///
/// The header is a single 32-bit address family tag held in the byte order
/// of the sending host, not network byte order.
pub struct LoopbackPacket<'a> {
    buf: Buffer<'a>,
}

impl<'a> LoopbackPacket<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Mutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("LoopbackPacket"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Immutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("LoopbackPacket"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        4
    }

    #[must_use]
    pub fn get_family(&self) -> u32 {
        u32::from_ne_bytes(self.buf.get_bytes(FAMILY_OFFSET))
    }

    pub fn set_family(&mut self, val: u32) {
        self.buf.set_bytes(FAMILY_OFFSET, val.to_ne_bytes());
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }
}

impl Debug for LoopbackPacket<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackPacket")
            .field("family", &self.get_family())
            .finish()
    }
}
