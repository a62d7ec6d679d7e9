use crate::buffer::Buffer;
use crate::error::{Error, Result};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

const DESTINATION_OFFSET: usize = 0;
const SOURCE_OFFSET: usize = 6;
const ETHERTYPE_OFFSET: usize = 12;

/// A media access control address.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    #[must_use]
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut octets = [0_u8; 6];
        let mut parts = s.split(':');
        for octet in &mut octets {
            let part = parts.next().ok_or_else(|| format!("invalid MAC: {s}"))?;
            *octet = u8::from_str_radix(part, 16).map_err(|_| format!("invalid MAC: {s}"))?;
        }
        if parts.next().is_some() {
            return Err(format!("invalid MAC: {s}"));
        }
        Ok(Self(octets))
    }
}

/// The Ethernet frame payload protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EtherType {
    Ipv4,
    Ipv6,
    Other(u16),
}

impl EtherType {
    #[must_use]
    pub const fn id(self) -> u16 {
        match self {
            Self::Ipv4 => 0x0800,
            Self::Ipv6 => 0x86DD,
            Self::Other(id) => id,
        }
    }
}

impl From<u16> for EtherType {
    fn from(id: u16) -> Self {
        match id {
            0x0800 => Self::Ipv4,
            0x86DD => Self::Ipv6,
            p => Self::Other(p),
        }
    }
}

/// Represents an Ethernet frame header.
///
/// The internal representation is held in network byte order (big-endian) and all accessor methods
/// take and return data in host byte order, converting as necessary for the given architecture.
pub struct EthernetPacket<'a> {
    buf: Buffer<'a>,
}

impl<'a> EthernetPacket<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        if packet.len() >= Self::minimum_packet_size() {
            Ok(Self {
                buf: Buffer::Mutable(packet),
            })
        } else {
            Err(Error::InsufficientPacketBuffer(
                String::from("EthernetPacket"),
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
                String::from("EthernetPacket"),
                Self::minimum_packet_size(),
                packet.len(),
            ))
        }
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        14
    }

    #[must_use]
    pub fn get_destination(&self) -> MacAddr {
        MacAddr(self.buf.get_bytes(DESTINATION_OFFSET))
    }

    #[must_use]
    pub fn get_source(&self) -> MacAddr {
        MacAddr(self.buf.get_bytes(SOURCE_OFFSET))
    }

    #[must_use]
    pub fn get_ether_type(&self) -> EtherType {
        EtherType::from(u16::from_be_bytes(self.buf.get_bytes(ETHERTYPE_OFFSET)))
    }

    pub fn set_destination(&mut self, val: MacAddr) {
        self.buf.set_bytes(DESTINATION_OFFSET, val.octets());
    }

    pub fn set_source(&mut self, val: MacAddr) {
        self.buf.set_bytes(SOURCE_OFFSET, val.octets());
    }

    pub fn set_ether_type(&mut self, val: EtherType) {
        self.buf.set_bytes(ETHERTYPE_OFFSET, val.id().to_be_bytes());
    }

    #[must_use]
    pub fn packet(&self) -> &[u8] {
        self.buf.as_slice()
    }
}

impl Debug for EthernetPacket<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthernetPacket")
            .field("destination", &self.get_destination())
            .field("source", &self.get_source())
            .field("ether_type", &self.get_ether_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_addr_display() {
        let mac = MacAddr([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
        assert_eq!("00:1b:63:84:45:e6", mac.to_string());
    }

    #[test]
    fn test_mac_addr_from_str() {
        let mac = MacAddr::from_str("00:1b:63:84:45:e6").unwrap();
        assert_eq!(MacAddr([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]), mac);
        assert!(MacAddr::from_str("00:1b:63:84:45").is_err());
        assert!(MacAddr::from_str("00:1b:63:84:45:e6:ff").is_err());
        assert!(MacAddr::from_str("not:a:mac:ad:dr:00").is_err());
    }

    #[test]
    fn test_destination() {
        let mut buf = [0_u8; EthernetPacket::minimum_packet_size()];
        let mut packet = EthernetPacket::new(&mut buf).unwrap();
        packet.set_destination(MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
        assert_eq!(
            MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            packet.get_destination()
        );
        assert_eq!([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff], packet.packet()[..6]);
    }

    #[test]
    fn test_source() {
        let mut buf = [0_u8; EthernetPacket::minimum_packet_size()];
        let mut packet = EthernetPacket::new(&mut buf).unwrap();
        packet.set_source(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert_eq!(
            MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            packet.get_source()
        );
        assert_eq!([0x00, 0x11, 0x22, 0x33, 0x44, 0x55], packet.packet()[6..12]);
    }

    #[test]
    fn test_ether_type() {
        let mut buf = [0_u8; EthernetPacket::minimum_packet_size()];
        let mut packet = EthernetPacket::new(&mut buf).unwrap();
        packet.set_ether_type(EtherType::Ipv4);
        assert_eq!(EtherType::Ipv4, packet.get_ether_type());
        assert_eq!([0x08, 0x00], packet.packet()[12..14]);
        packet.set_ether_type(EtherType::Ipv6);
        assert_eq!(EtherType::Ipv6, packet.get_ether_type());
        assert_eq!([0x86, 0xDD], packet.packet()[12..14]);
        packet.set_ether_type(EtherType::Other(0x0806));
        assert_eq!(EtherType::Other(0x0806), packet.get_ether_type());
        assert_eq!([0x08, 0x06], packet.packet()[12..14]);
    }

    #[test]
    fn test_new_insufficient_buffer() {
        const SIZE: usize = EthernetPacket::minimum_packet_size();
        let mut buf = [0_u8; SIZE - 1];
        let err = EthernetPacket::new(&mut buf).unwrap_err();
        assert_eq!(
            Error::InsufficientPacketBuffer(String::from("EthernetPacket"), SIZE, SIZE - 1),
            err
        );
    }
}
