//! Checksum implementations for IPv4, ICMP & UDP over IPv4 and IPv6.
//!
//! All checksums are computed over packet bytes in which the checksum field
//! itself has been zeroed, which is always the case for packets under
//! construction. Recomputing a checksum over a finished packet (checksum
//! field included) therefore yields zero.

use crate::IpProtocol;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Calculate the checksum for an `IPv4` header.
#[must_use]
pub fn ipv4_header_checksum(data: &[u8]) -> u16 {
    checksum(data)
}

/// Calculate the checksum for an `IPv4` `ICMP` packet.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    checksum(data)
}

/// Calculate the checksum for an `IPv6` `ICMPv6` packet.
#[must_use]
pub fn icmp_ipv6_checksum(data: &[u8], src_addr: Ipv6Addr, dest_addr: Ipv6Addr) -> u16 {
    ipv6_checksum(data, src_addr, dest_addr, IpProtocol::IcmpV6)
}

/// Calculate the checksum for an `IPv4` `UDP` packet.
#[must_use]
pub fn udp_ipv4_checksum(data: &[u8], src_addr: Ipv4Addr, dest_addr: Ipv4Addr) -> u16 {
    ipv4_checksum(data, src_addr, dest_addr, IpProtocol::Udp)
}

/// Calculate the checksum for an `IPv6` `UDP` packet.
#[must_use]
pub fn udp_ipv6_checksum(data: &[u8], src_addr: Ipv6Addr, dest_addr: Ipv6Addr) -> u16 {
    ipv6_checksum(data, src_addr, dest_addr, IpProtocol::Udp)
}

/// The 16-bit word which forces a checksum to a chosen value.
///
/// Given the checksum `current` of a packet in which a pair of adjacent,
/// 16-bit aligned payload bytes are zero, returns the word to write into
/// those bytes such that the checksum of the resulting packet equals
/// `target`. This is how a compressed timestamp is smuggled into the `UDP`
/// checksum field while keeping the checksum valid.
#[must_use]
pub fn checksum_tweak(current: u16, target: u16) -> u16 {
    ones_complement_sub(!target, !current)
}

fn checksum(data: &[u8]) -> u16 {
    if data.is_empty() {
        return 0;
    }
    finalize_checksum(sum_be_words(data))
}

fn ipv4_checksum(
    data: &[u8],
    source: Ipv4Addr,
    destination: Ipv4Addr,
    next_level_protocol: IpProtocol,
) -> u16 {
    let mut sum = 0u32;
    sum += ipv4_word_sum(source);
    sum += ipv4_word_sum(destination);
    sum += u32::from(next_level_protocol.id());
    sum += data.len() as u32;
    sum += sum_be_words(data);
    finalize_checksum(sum)
}

fn ipv4_word_sum(ip: Ipv4Addr) -> u32 {
    let octets = ip.octets();
    (((u32::from(octets[0])) << 8) | u32::from(octets[1]))
        + (((u32::from(octets[2])) << 8) | u32::from(octets[3]))
}

fn ipv6_checksum(
    data: &[u8],
    source: Ipv6Addr,
    destination: Ipv6Addr,
    next_level_protocol: IpProtocol,
) -> u16 {
    let mut sum = 0u32;
    sum += ipv6_word_sum(source);
    sum += ipv6_word_sum(destination);
    sum += u32::from(next_level_protocol.id());
    sum += data.len() as u32;
    sum += sum_be_words(data);
    finalize_checksum(sum)
}

fn ipv6_word_sum(ip: Ipv6Addr) -> u32 {
    ip.segments().iter().map(|x| u32::from(*x)).sum()
}

fn sum_be_words(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = data.chunks_exact(2);
    for word in chunks.by_ref() {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u32::from(*last) << 8;
    }
    sum
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}

/// Subtraction modulo 2^16 - 1 (one's complement arithmetic).
const fn ones_complement_sub(a: u16, b: u16) -> u16 {
    let res = a as i32 - b as i32;
    if res <= 0 {
        (res + 0xFFFF) as u16
    } else {
        res as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::str::FromStr;

    #[test]
    fn test_empty_checksum() {
        let src_addr = Ipv4Addr::from_str("192.168.1.201").unwrap();
        let dest_addr = Ipv4Addr::from_str("142.250.66.46").unwrap();
        assert_eq!(0, ipv4_header_checksum(&[]));
        assert_eq!(0, icmp_ipv4_checksum(&[]));
        assert_eq!(27732, udp_ipv4_checksum(&[], src_addr, dest_addr));
        let src_addr = Ipv6Addr::from_str("fe80::811:3f6:7601:6c3f").unwrap();
        let dest_addr = Ipv6Addr::from_str("fe80::1c8d:7d69:d0b6:8182").unwrap();
        assert_eq!(10316, icmp_ipv6_checksum(&[], src_addr, dest_addr));
    }

    #[test]
    fn test_odd_length() {
        assert_eq!(0xffff, ipv4_header_checksum(&[0x00]));
    }

    #[test]
    fn test_ipv4_header_checksum() {
        let bytes = hex!("45 00 0f fc 38 c0 00 00 40 01 00 00 0a 00 00 02 0a 00 00 01");
        assert_eq!(0x1e3f, ipv4_header_checksum(&bytes));
    }

    #[test]
    fn test_ipv4_header_checksum_verifies_as_zero() {
        let bytes = hex!("45 00 0f fc 38 c0 00 00 40 01 1e 3f 0a 00 00 02 0a 00 00 01");
        assert_eq!(0, ipv4_header_checksum(&bytes));
    }

    #[test]
    fn test_icmp_ipv4_checksum() {
        let bytes = hex!("08 00 00 00 04 d2 00 0a");
        assert_eq!(0xf323, icmp_ipv4_checksum(&bytes));
    }

    #[test]
    fn test_icmp_ipv6_checksum() {
        let src_addr = Ipv6Addr::from_str("fe80::811:3f6:7601:6c3f").unwrap();
        let dest_addr = Ipv6Addr::from_str("fe80::1c8d:7d69:d0b6:8182").unwrap();
        let bytes = hex!(
            "88 00 00 00 40 00 00 00 fe 80 00 00 00 00 00 00 08 11 03 f6 76 01 6c 3f"
        );
        assert_eq!(29546, icmp_ipv6_checksum(&bytes, src_addr, dest_addr));
    }

    #[test]
    fn test_udp_ipv4_checksum() {
        let src_addr = Ipv4Addr::from_str("192.168.1.201").unwrap();
        let dest_addr = Ipv4Addr::from_str("142.250.66.46").unwrap();
        let mut bytes = [0_u8; 64];
        bytes[..8].copy_from_slice(&hex!("62 57 81 a8 00 40 00 00"));
        assert_eq!(34772, udp_ipv4_checksum(&bytes, src_addr, dest_addr));
    }

    #[test]
    fn test_udp_ipv6_checksum() {
        let src_addr = Ipv6Addr::from_str("2406:da18:599:2d01:fa25:98be:5ab1:87a5").unwrap();
        let dest_addr = Ipv6Addr::from_str("2404:6800:4003:c02::8b").unwrap();
        let mut bytes = [0_u8; 44];
        bytes[..8].copy_from_slice(&hex!("10 13 80 eb 00 2c 00 00"));
        assert_eq!(61454, udp_ipv6_checksum(&bytes, src_addr, dest_addr));
    }

    #[test]
    fn test_checksum_tweak() {
        let src_addr = Ipv4Addr::from_str("192.168.1.201").unwrap();
        let dest_addr = Ipv4Addr::from_str("142.250.66.46").unwrap();
        for target in [0x0001_u16, 0x1234, 0x8000, 0xcafe, 0xfffe] {
            let mut bytes = [0_u8; 16];
            bytes[..8].copy_from_slice(&hex!("5d c0 82 9a 00 10 00 00"));
            let current = udp_ipv4_checksum(&bytes, src_addr, dest_addr);
            let tweak = checksum_tweak(current, target);
            bytes[8..10].copy_from_slice(&tweak.to_be_bytes());
            assert_eq!(target, udp_ipv4_checksum(&bytes, src_addr, dest_addr));
        }
    }
}
