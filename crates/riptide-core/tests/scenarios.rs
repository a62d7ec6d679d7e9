//! End to end probe building and sending scenarios.

use riptide_core::net::socket::Socket;
use riptide_core::net::{AddressResolver, FrameSink};
use riptide_core::{
    build, signature, ClassicConfig, ClassicSender, Error, Frame, FlowLabel, InstanceId, IoResult,
    LinkLayer, NetworkLayer, PacketsPerSecond, Port, Probe, Protocol, Result, Sender,
    SenderConfig, TimeToLive,
};
use riptide_packet::checksum::ipv4_header_checksum;
use riptide_packet::ethernet::MacAddr;
use riptide_packet::ipv4::Ipv4Packet;
use riptide_packet::ipv6::Ipv6Packet;
use riptide_packet::IpProtocol;
use std::cell::RefCell;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime};

const SRC_V4: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 1);
const SRC_V6: Ipv6Addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);

struct RecordingSink {
    link_layer: LinkLayer,
    frames: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl FrameSink for RecordingSink {
    fn link_layer(&self) -> Result<LinkLayer> {
        Ok(self.link_layer)
    }

    fn inject(&mut self, frame: &[u8]) -> IoResult<()> {
        self.frames.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}

struct StaticResolver;

impl AddressResolver for StaticResolver {
    fn interface_mac(&self, _interface: &str) -> Result<MacAddr> {
        Ok(MacAddr([0x02, 0, 0, 0, 0, 0x01]))
    }

    fn gateway_mac(&self, _interface: &str, _network: NetworkLayer) -> Result<MacAddr> {
        Ok(MacAddr([0x02, 0, 0, 0, 0, 0x02]))
    }

    fn source_ipv4(&self, _interface: &str) -> Result<Ipv4Addr> {
        Ok(SRC_V4)
    }

    fn source_ipv6(&self, _interface: &str) -> Result<Ipv6Addr> {
        Ok(SRC_V6)
    }
}

fn sender(link_layer: LinkLayer) -> (Sender<RecordingSink>, Rc<RefCell<Vec<Vec<u8>>>>) {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let sink = RecordingSink {
        link_layer,
        frames: Rc::clone(&frames),
    };
    let config = SenderConfig {
        interface: String::from("en0"),
        instance_id: InstanceId(1),
        source_ipv4: None,
        source_ipv6: None,
        packets_per_second: PacketsPerSecond(0),
    };
    let sender = Sender::new(&config, &StaticResolver, sink).unwrap();
    (sender, frames)
}

#[test]
fn test_ethernet_ipv4_udp_frame_layout() {
    let mut buf = [0_u8; riptide_core::MAX_FRAME_SIZE];
    let mut frame = Frame::new(
        &mut buf,
        LinkLayer::Ethernet,
        NetworkLayer::Ipv4,
        Protocol::Udp,
        7,
    )
    .unwrap();
    let dest_addr = Ipv4Addr::new(8, 8, 8, 8);
    build::ethernet(
        &mut frame,
        MacAddr([0x02, 0, 0, 0, 0, 0x01]),
        MacAddr([0x02, 0, 0, 0, 0, 0x02]),
    )
    .unwrap();
    build::ipv4(&mut frame, SRC_V4, dest_addr, TimeToLive(5), 0).unwrap();
    build::udp_ipv4(&mut frame, SRC_V4, dest_addr, Port(24000), Port(33434), 7).unwrap();
    assert_eq!(49, frame.len());
    let ipv4 = Ipv4Packet::new_view(frame.network_bytes()).unwrap();
    assert_eq!(0, ipv4_header_checksum(ipv4.header()));
    assert_eq!(5, ipv4.get_ttl());
}

#[test]
fn test_ipv6_icmpv6_flow_label_preserved() {
    let (mut sender, frames) = sender(LinkLayer::None);
    let probe = Probe {
        dest_addr: IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2)),
        ttl: TimeToLive(1),
        src_port: Port(24000),
        dest_port: Port(33434),
        protocol: Protocol::IcmpV6,
        flow_label: FlowLabel(0x1234),
    };
    sender.send(&probe).unwrap();
    let frames = frames.borrow();
    let ipv6 = Ipv6Packet::new_view(&frames[0]).unwrap();
    assert_eq!(IpProtocol::IcmpV6, ipv6.get_next_header());
    assert_eq!(1, ipv6.get_hop_limit());
    assert_eq!(0x1234, ipv6.get_flow_label());
}

#[test]
fn test_frame_size_encodes_ttl() {
    let (mut sender, frames) = sender(LinkLayer::Ethernet);
    for ttl in [1_u8, 8, 32] {
        let probe = Probe {
            dest_addr: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            ttl: TimeToLive(ttl),
            src_port: Port(24000),
            dest_port: Port(33434),
            protocol: Protocol::Udp,
            flow_label: FlowLabel(0),
        };
        sender.send(&probe).unwrap();
    }
    let frames = frames.borrow();
    for (frame, ttl) in frames.iter().zip([1_usize, 8, 32]) {
        assert_eq!(14 + 20 + 8 + ttl + 2, frame.len());
    }
}

#[test]
fn test_signature_recovers_instance_and_timestamp() {
    let (mut sender, frames) = sender(LinkLayer::None);
    let probe = Probe {
        dest_addr: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        ttl: TimeToLive(4),
        src_port: Port(24000),
        dest_port: Port(33434),
        protocol: Protocol::Udp,
        flow_label: FlowLabel(0),
    };
    sender.send(&probe).unwrap();
    let frames = frames.borrow();
    let ipv4 = Ipv4Packet::new_view(&frames[0]).unwrap();
    let expected = signature::probe_signature(
        InstanceId(1),
        probe.dest_addr,
        probe.src_port,
        probe.dest_port,
    );
    assert_eq!(expected, ipv4.get_identification());
    let other = signature::probe_signature(
        InstanceId(2),
        probe.dest_addr,
        probe.src_port,
        probe.dest_port,
    );
    assert_ne!(other, ipv4.get_identification());

    // The UDP checksum carries the send time in tenths of a millisecond.
    let checksum = u16::from_be_bytes([frames[0][26], frames[0][27]]);
    let now = signature::tenth_ms(SystemTime::now());
    let sent = signature::decode_timestamp(checksum, now);
    assert!(now - sent < signature::TENTH_MS_PER_SECOND);
}

struct NullSocket;

impl Socket for NullSocket {
    fn new_udp_dgram_socket_ipv4() -> IoResult<Self> {
        Ok(Self)
    }
    fn new_udp_dgram_socket_ipv6() -> IoResult<Self> {
        Ok(Self)
    }
    fn new_icmp_dgram_socket_ipv4() -> IoResult<Self> {
        Ok(Self)
    }
    fn new_icmp_dgram_socket_ipv6() -> IoResult<Self> {
        Ok(Self)
    }
    fn bind(&mut self, _address: SocketAddr) -> IoResult<()> {
        Ok(())
    }
    fn set_ttl(&mut self, _ttl: u32) -> IoResult<()> {
        Ok(())
    }
    fn set_unicast_hops_v6(&mut self, _hops: u32) -> IoResult<()> {
        Ok(())
    }
    fn send_to(&mut self, _buf: &[u8], _addr: SocketAddr) -> IoResult<()> {
        Ok(())
    }
}

#[test]
fn test_classic_sender_is_rate_limited() {
    let config = ClassicConfig {
        protocol: Protocol::Udp,
        interface: String::from("en0"),
        source_addr: Some(IpAddr::V4(SRC_V4)),
        ipv6: false,
        packets_per_second: PacketsPerSecond(100),
        time_log: None,
    };
    let mut sender: ClassicSender<NullSocket> =
        ClassicSender::new(&config, &StaticResolver).unwrap();
    let start = Instant::now();
    sender
        .send(
            10,
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            TimeToLive(5),
            Port(24000),
            Port(33434),
        )
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(90));
}

#[test]
fn test_sender_remains_usable_after_send_failure() {
    struct FlakySink {
        failed: bool,
    }
    impl FrameSink for FlakySink {
        fn link_layer(&self) -> Result<LinkLayer> {
            Ok(LinkLayer::None)
        }
        fn inject(&mut self, _frame: &[u8]) -> IoResult<()> {
            if self.failed {
                Ok(())
            } else {
                self.failed = true;
                Err(riptide_core::IoError::Inject(std::io::Error::from(
                    std::io::ErrorKind::WouldBlock,
                )))
            }
        }
    }
    let config = SenderConfig {
        interface: String::from("en0"),
        instance_id: InstanceId(1),
        source_ipv4: Some(SRC_V4),
        source_ipv6: Some(SRC_V6),
        packets_per_second: PacketsPerSecond(0),
    };
    let sink = FlakySink { failed: false };
    let mut sender = Sender::new(&config, &StaticResolver, sink).unwrap();
    let probe = Probe {
        dest_addr: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        ttl: TimeToLive(2),
        src_port: Port(24000),
        dest_port: Port(33434),
        protocol: Protocol::Udp,
        flow_label: FlowLabel(0),
    };
    let err = sender.send(&probe).unwrap_err();
    assert!(matches!(err, Error::ProbeFailed(_)));
    sender.send(&probe).unwrap();
}
