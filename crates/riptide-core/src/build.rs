//! Layer encoders.
//!
//! Each encoder writes one layer of a [`Frame`] in place.  Encoders assume
//! the frame was freshly zeroed and only set the fields a probe needs, the
//! checksum of each layer is computed last over the finished bytes.

use crate::config::Protocol;
use crate::error::Result;
use crate::layout::{Frame, NetworkLayer};
use crate::types::{FlowLabel, Port, TimeToLive};
use riptide_packet::checksum::{
    checksum_tweak, icmp_ipv4_checksum, icmp_ipv6_checksum, ipv4_header_checksum,
    udp_ipv4_checksum, udp_ipv6_checksum,
};
use riptide_packet::ethernet::{EtherType, EthernetPacket, MacAddr};
use riptide_packet::loopback::{LoopbackPacket, FAMILY_IPV4, FAMILY_IPV6};
use riptide_packet::udp::UdpPacket;
use riptide_packet::{icmpv4, icmpv6, ipv4, ipv6, IpProtocol};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Encode an `Ethernet` II header.
pub fn ethernet(frame: &mut Frame<'_>, src_mac: MacAddr, dest_mac: MacAddr) -> Result<()> {
    let ether_type = match frame.network() {
        NetworkLayer::Ipv4 => EtherType::Ipv4,
        NetworkLayer::Ipv6 => EtherType::Ipv6,
    };
    let mut packet = EthernetPacket::new(frame.link_bytes_mut())?;
    packet.set_destination(dest_mac);
    packet.set_source(src_mac);
    packet.set_ether_type(ether_type);
    Ok(())
}

/// Encode a `BSD` loopback address family tag.
pub fn bsd_loopback(frame: &mut Frame<'_>) -> Result<()> {
    let family = match frame.network() {
        NetworkLayer::Ipv4 => FAMILY_IPV4,
        NetworkLayer::Ipv6 => FAMILY_IPV6,
    };
    let mut packet = LoopbackPacket::new(frame.link_bytes_mut())?;
    packet.set_family(family);
    Ok(())
}

/// Encode an `IPv4` header.
///
/// The `identification` field carries the instance signature of the probe,
/// see [`probe_signature`](crate::signature::probe_signature).
pub fn ipv4(
    frame: &mut Frame<'_>,
    src_addr: Ipv4Addr,
    dest_addr: Ipv4Addr,
    ttl: TimeToLive,
    identification: u16,
) -> Result<()> {
    let total_length = frame.network_size() as u16;
    let protocol = ip_protocol(frame.transport());
    let mut packet = ipv4::Ipv4Packet::new(frame.network_bytes_mut())?;
    packet.set_version(4);
    packet.set_header_length(5);
    packet.set_total_length(total_length);
    packet.set_identification(identification);
    packet.set_ttl(ttl.0);
    packet.set_protocol(protocol);
    packet.set_source(src_addr);
    packet.set_destination(dest_addr);
    packet.set_checksum(ipv4_header_checksum(packet.header()));
    Ok(())
}

/// Encode an `IPv6` header.
pub fn ipv6(
    frame: &mut Frame<'_>,
    src_addr: Ipv6Addr,
    dest_addr: Ipv6Addr,
    hop_limit: TimeToLive,
    flow_label: FlowLabel,
) -> Result<()> {
    let payload_length = frame.transport_size() as u16;
    let next_header = ip_protocol(frame.transport());
    let mut packet = ipv6::Ipv6Packet::new(frame.network_bytes_mut())?;
    packet.set_version(6);
    packet.set_flow_label(flow_label.0);
    packet.set_payload_length(payload_length);
    packet.set_next_header(next_header);
    packet.set_hop_limit(hop_limit.0);
    packet.set_source_address(src_addr);
    packet.set_destination_address(dest_addr);
    Ok(())
}

/// Encode an `ICMPv4` echo request.
///
/// The identifier carries the probe source port and the sequence carries the
/// encoded send timestamp.
pub fn icmp(frame: &mut Frame<'_>, identifier: Port, sequence: u16) -> Result<()> {
    let mut packet = icmpv4::EchoRequestPacket::new(frame.transport_bytes_mut())?;
    packet.set_icmp_type(icmpv4::IcmpType::EchoRequest);
    packet.set_icmp_code(icmpv4::IcmpCode(0));
    packet.set_identifier(identifier.0);
    packet.set_sequence(sequence);
    packet.set_checksum(icmp_ipv4_checksum(packet.packet()));
    Ok(())
}

/// Encode an `ICMPv6` echo request.
pub fn icmpv6(
    frame: &mut Frame<'_>,
    src_addr: Ipv6Addr,
    dest_addr: Ipv6Addr,
    identifier: Port,
    sequence: u16,
) -> Result<()> {
    let mut packet = icmpv6::EchoRequestPacket::new(frame.transport_bytes_mut())?;
    packet.set_icmp_type(icmpv6::IcmpType::EchoRequest);
    packet.set_icmp_code(icmpv6::IcmpCode(0));
    packet.set_identifier(identifier.0);
    packet.set_sequence(sequence);
    packet.set_checksum(icmp_ipv6_checksum(packet.packet(), src_addr, dest_addr));
    Ok(())
}

/// Encode a `UDP` header over `IPv4`.
///
/// When the payload has room for the compensating word the checksum is
/// forced to `checksum_target`, the encoded send timestamp, by writing the
/// complementary value into the first two payload bytes.  Shorter payloads
/// get an ordinary checksum instead.
pub fn udp_ipv4(
    frame: &mut Frame<'_>,
    src_addr: Ipv4Addr,
    dest_addr: Ipv4Addr,
    src_port: Port,
    dest_port: Port,
    checksum_target: u16,
) -> Result<()> {
    let mut packet = udp_common(frame, src_port, dest_port)?;
    let current = udp_ipv4_checksum(packet.packet(), src_addr, dest_addr);
    finish_udp(&mut packet, current, checksum_target);
    Ok(())
}

/// Encode a `UDP` header over `IPv6`.
pub fn udp_ipv6(
    frame: &mut Frame<'_>,
    src_addr: Ipv6Addr,
    dest_addr: Ipv6Addr,
    src_port: Port,
    dest_port: Port,
    checksum_target: u16,
) -> Result<()> {
    let mut packet = udp_common(frame, src_port, dest_port)?;
    let current = udp_ipv6_checksum(packet.packet(), src_addr, dest_addr);
    finish_udp(&mut packet, current, checksum_target);
    Ok(())
}

fn udp_common<'a>(
    frame: &'a mut Frame<'_>,
    src_port: Port,
    dest_port: Port,
) -> Result<UdpPacket<'a>> {
    let length = frame.transport_size() as u16;
    let mut packet = UdpPacket::new(frame.transport_bytes_mut())?;
    packet.set_source(src_port.0);
    packet.set_destination(dest_port.0);
    packet.set_length(length);
    Ok(packet)
}

fn finish_udp(packet: &mut UdpPacket<'_>, current: u16, checksum_target: u16) {
    if packet.payload().len() >= usize::from(crate::constants::PAYLOAD_TWEAK_BYTES) {
        packet.set_payload_tweak(checksum_tweak(current, checksum_target));
        packet.set_checksum(checksum_target);
    } else {
        packet.set_checksum(current);
    }
}

const fn ip_protocol(protocol: Protocol) -> IpProtocol {
    match protocol {
        Protocol::Icmp => IpProtocol::Icmp,
        Protocol::IcmpV6 => IpProtocol::IcmpV6,
        Protocol::Udp => IpProtocol::Udp,
    }
}
