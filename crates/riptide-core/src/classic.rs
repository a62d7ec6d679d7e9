use crate::config::{ClassicConfig, Protocol};
use crate::error::{Error, IoError, IoOperation, Result};
use crate::limiter::RateLimiter;
use crate::net::socket::Socket;
use crate::net::AddressResolver;
use crate::signature;
use crate::types::{Port, TimeToLive};
use riptide_packet::checksum::icmp_ipv4_checksum;
use riptide_packet::{icmpv4, icmpv6};
use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::instrument;

/// A simplified sender over ordinary datagram sockets.
///
/// Probes are sent without raw frame injection and so need no elevated
/// privileges for `UDP`, at the cost of losing control of the `IP` header.
/// The wall clock reference start time is recorded on first use so that
/// round trip times can be reconstructed after the encoded 16 bit timestamp
/// wraps.
#[derive(Debug)]
pub struct ClassicSender<S> {
    protocol: Protocol,
    src_addr: IpAddr,
    limiter: RateLimiter,
    time_log: Option<PathBuf>,
    start_time: Option<SystemTime>,
    _socket: PhantomData<S>,
}

impl<S: Socket> ClassicSender<S> {
    /// Create a `ClassicSender`.
    ///
    /// The source address fixes the family of every probe sent and is
    /// validated by binding a scratch socket to it.
    #[instrument(skip(resolver), level = "debug")]
    pub fn new<R: AddressResolver>(config: &ClassicConfig, resolver: &R) -> Result<Self> {
        let src_addr = match config.source_addr {
            Some(addr) => addr,
            None if config.ipv6 => IpAddr::V6(resolver.source_ipv6(&config.interface)?),
            None => IpAddr::V4(resolver.source_ipv4(&config.interface)?),
        };
        if !config.protocol.supports(src_addr) {
            return Err(Error::InvalidSourceAddr(src_addr));
        }
        validate_source_addr::<S>(src_addr)?;
        tracing::info!(
            protocol = %config.protocol,
            %src_addr,
            packets_per_second = config.packets_per_second.0,
            "classic sender ready"
        );
        Ok(Self {
            protocol: config.protocol,
            src_addr,
            limiter: RateLimiter::new(config.packets_per_second),
            time_log: config.time_log.clone(),
            start_time: None,
            _socket: PhantomData,
        })
    }

    /// The reference start time of this sender, once a probe has been sent.
    #[must_use]
    pub const fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    /// Send `count` identical probes to `dest_addr`.
    ///
    /// A fresh socket is created per call, bound to the source address and
    /// port, with the time to live applied before any probe is sent.
    #[instrument(skip(self), level = "trace")]
    pub fn send(
        &mut self,
        count: usize,
        dest_addr: IpAddr,
        ttl: TimeToLive,
        src_port: Port,
        dest_port: Port,
    ) -> Result<()> {
        if dest_addr.is_ipv4() != self.src_addr.is_ipv4() {
            return Err(Error::IncompatibleProtocol {
                protocol: self.protocol,
                dest_addr,
            });
        }
        self.record_start_time()?;
        let mut socket = self.make_socket(src_port)?;
        match dest_addr {
            IpAddr::V4(_) => socket.set_ttl(u32::from(ttl.0)).map_err(Error::Io)?,
            IpAddr::V6(_) => socket
                .set_unicast_hops_v6(u32::from(ttl.0))
                .map_err(Error::Io)?,
        }
        for _ in 0..count {
            self.limiter.acquire();
            let timestamp_enc =
                signature::encode_timestamp(signature::tenth_ms(SystemTime::now()));
            match self.protocol {
                Protocol::Udp => {
                    let remote_addr = SocketAddr::new(dest_addr, dest_port.0);
                    socket
                        .send_to(&timestamp_enc.to_be_bytes(), remote_addr)
                        .map_err(Error::ProbeFailed)?;
                }
                Protocol::Icmp => {
                    let mut buf = [0_u8; 8];
                    let mut packet = icmpv4::EchoRequestPacket::new(&mut buf)?;
                    packet.set_icmp_type(icmpv4::IcmpType::EchoRequest);
                    packet.set_icmp_code(icmpv4::IcmpCode(0));
                    packet.set_identifier(src_port.0);
                    packet.set_sequence(timestamp_enc);
                    packet.set_checksum(icmp_ipv4_checksum(packet.packet()));
                    let remote_addr = SocketAddr::new(dest_addr, 0);
                    socket
                        .send_to(&buf, remote_addr)
                        .map_err(Error::ProbeFailed)?;
                }
                Protocol::IcmpV6 => {
                    // The kernel fills in the checksum for ICMPv6 datagram sockets.
                    let mut buf = [0_u8; 8];
                    let mut packet = icmpv6::EchoRequestPacket::new(&mut buf)?;
                    packet.set_icmp_type(icmpv6::IcmpType::EchoRequest);
                    packet.set_icmp_code(icmpv6::IcmpCode(0));
                    packet.set_identifier(src_port.0);
                    packet.set_sequence(timestamp_enc);
                    let remote_addr = SocketAddr::new(dest_addr, 0);
                    socket
                        .send_to(&buf, remote_addr)
                        .map_err(Error::ProbeFailed)?;
                }
            }
        }
        Ok(())
    }

    /// Record the measurement epoch origin once, before the first probe.
    ///
    /// This is the external anchor which disambiguates the 16 bit timestamp
    /// wrap for replies gathered after the fact.
    fn record_start_time(&mut self) -> Result<()> {
        if self.start_time.is_some() {
            return Ok(());
        }
        let start_time = SystemTime::now();
        if let Some(path) = &self.time_log {
            dump_reference_time(path, start_time)?;
        }
        let since_epoch = start_time.duration_since(UNIX_EPOCH).unwrap_or_default();
        tracing::info!(
            start_time = format!("{}.{:06}", since_epoch.as_secs(), since_epoch.subsec_micros()),
            "reference start time"
        );
        self.start_time = Some(start_time);
        Ok(())
    }

    fn make_socket(&self, src_port: Port) -> Result<S> {
        let mut socket = match (self.protocol, self.src_addr) {
            (Protocol::Udp, IpAddr::V4(_)) => S::new_udp_dgram_socket_ipv4(),
            (Protocol::Udp, IpAddr::V6(_)) => S::new_udp_dgram_socket_ipv6(),
            (Protocol::Icmp, _) => S::new_icmp_dgram_socket_ipv4(),
            (Protocol::IcmpV6, _) => S::new_icmp_dgram_socket_ipv6(),
        }
        .map_err(Error::Io)?;
        let bind_port = match self.protocol {
            Protocol::Udp => src_port.0,
            Protocol::Icmp | Protocol::IcmpV6 => 0,
        };
        let bind_addr = SocketAddr::new(self.src_addr, bind_port);
        socket.bind(bind_addr).map_err(|err| match err {
            IoError::Bind(ref io_error, _) if io_error.kind() == std::io::ErrorKind::AddrInUse => {
                Error::AddressInUse(bind_addr)
            }
            other => Error::Io(other),
        })?;
        Ok(socket)
    }
}

/// Check the source address is bindable before any probe is sent.
fn validate_source_addr<S: Socket>(src_addr: IpAddr) -> Result<()> {
    let mut socket = match src_addr {
        IpAddr::V4(_) => S::new_udp_dgram_socket_ipv4(),
        IpAddr::V6(_) => S::new_udp_dgram_socket_ipv6(),
    }
    .map_err(Error::Io)?;
    socket
        .bind(SocketAddr::new(src_addr, 0))
        .map_err(|_| Error::InvalidSourceAddr(src_addr))
}

/// Record the reference start time as fractional seconds since the epoch.
fn dump_reference_time(path: &Path, start_time: SystemTime) -> Result<()> {
    let since_epoch = start_time.duration_since(UNIX_EPOCH).unwrap_or_default();
    let line = format!(
        "{}.{:06}\n",
        since_epoch.as_secs(),
        since_epoch.subsec_micros()
    );
    std::fs::write(path, line)
        .map_err(|err| Error::Io(IoError::Other(err, IoOperation::WriteTimeLog)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoResult;
    use crate::net::MockAddressResolver;
    use crate::types::PacketsPerSecond;
    use std::cell::RefCell;
    use std::net::Ipv4Addr;

    thread_local! {
        static SENT: RefCell<Vec<(Vec<u8>, SocketAddr)>> = RefCell::new(Vec::new());
        static BOUND: RefCell<Vec<SocketAddr>> = RefCell::new(Vec::new());
        static TTL: RefCell<Option<u32>> = const { RefCell::new(None) };
    }

    #[derive(Debug)]
    struct FakeSocket;

    impl Socket for FakeSocket {
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
        fn bind(&mut self, address: SocketAddr) -> IoResult<()> {
            BOUND.with_borrow_mut(|bound| bound.push(address));
            Ok(())
        }
        fn set_ttl(&mut self, ttl: u32) -> IoResult<()> {
            TTL.with_borrow_mut(|t| *t = Some(ttl));
            Ok(())
        }
        fn set_unicast_hops_v6(&mut self, hops: u32) -> IoResult<()> {
            TTL.with_borrow_mut(|t| *t = Some(hops));
            Ok(())
        }
        fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
            SENT.with_borrow_mut(|sent| sent.push((buf.to_vec(), addr)));
            Ok(())
        }
    }

    fn reset() {
        SENT.with_borrow_mut(Vec::clear);
        BOUND.with_borrow_mut(Vec::clear);
        TTL.with_borrow_mut(|t| *t = None);
    }

    fn config(protocol: Protocol) -> ClassicConfig {
        ClassicConfig {
            protocol,
            interface: String::new(),
            source_addr: Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))),
            ipv6: false,
            packets_per_second: PacketsPerSecond(0),
            time_log: None,
        }
    }

    #[test]
    fn test_send_udp_probes() {
        reset();
        let resolver = MockAddressResolver::new();
        let mut sender: ClassicSender<FakeSocket> =
            ClassicSender::new(&config(Protocol::Udp), &resolver).unwrap();
        let dest_addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        sender
            .send(3, dest_addr, TimeToLive(5), Port(24000), Port(33434))
            .unwrap();
        assert_eq!(Some(5), TTL.with_borrow(|t| *t));
        BOUND.with_borrow(|bound| {
            // One scratch bind at construction, then the probe socket.
            assert_eq!(2, bound.len());
            assert_eq!(0, bound[0].port());
            assert_eq!(24000, bound[1].port());
        });
        SENT.with_borrow(|sent| {
            assert_eq!(3, sent.len());
            for (payload, addr) in sent {
                assert_eq!(2, payload.len());
                assert_eq!(SocketAddr::new(dest_addr, 33434), *addr);
            }
        });
    }

    #[test]
    fn test_send_icmp_probes() {
        reset();
        let resolver = MockAddressResolver::new();
        let mut sender: ClassicSender<FakeSocket> =
            ClassicSender::new(&config(Protocol::Icmp), &resolver).unwrap();
        let dest_addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        sender
            .send(1, dest_addr, TimeToLive(8), Port(24000), Port(0))
            .unwrap();
        BOUND.with_borrow(|bound| assert_eq!(0, bound[1].port()));
        SENT.with_borrow(|sent| {
            assert_eq!(1, sent.len());
            let (payload, addr) = &sent[0];
            assert_eq!(0, addr.port());
            let packet = icmpv4::EchoRequestPacket::new_view(payload).unwrap();
            assert_eq!(icmpv4::IcmpType::EchoRequest, packet.get_icmp_type());
            assert_eq!(24000, packet.get_identifier());
            assert_eq!(0, icmp_ipv4_checksum(packet.packet()));
        });
    }

    #[test]
    fn test_family_mismatch() {
        reset();
        let resolver = MockAddressResolver::new();
        let mut sender: ClassicSender<FakeSocket> =
            ClassicSender::new(&config(Protocol::Udp), &resolver).unwrap();
        let dest_addr = IpAddr::V6(std::net::Ipv6Addr::LOCALHOST);
        let err = sender
            .send(1, dest_addr, TimeToLive(1), Port(24000), Port(33434))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleProtocol { .. }));
    }

    #[test]
    fn test_icmpv6_requires_ipv6_source() {
        let resolver = MockAddressResolver::new();
        let err =
            ClassicSender::<FakeSocket>::new(&config(Protocol::IcmpV6), &resolver).unwrap_err();
        assert!(matches!(err, Error::InvalidSourceAddr(_)));
    }

    #[test]
    fn test_reference_time_log_on_first_send() {
        reset();
        let resolver = MockAddressResolver::new();
        let dir = std::env::temp_dir().join("riptide-classic-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("start_time.txt");
        let mut config = config(Protocol::Udp);
        config.time_log = Some(path.clone());
        let mut sender: ClassicSender<FakeSocket> =
            ClassicSender::new(&config, &resolver).unwrap();
        assert!(sender.start_time().is_none());
        let dest_addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        sender
            .send(1, dest_addr, TimeToLive(5), Port(24000), Port(33434))
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let logged: f64 = contents.trim().parse().unwrap();
        let start = sender
            .start_time()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs_f64();
        assert!((logged - start).abs() < 1e-3);
        // Sending again must not move the epoch.
        sender
            .send(1, dest_addr, TimeToLive(5), Port(24000), Port(33434))
            .unwrap();
        assert_eq!(contents, std::fs::read_to_string(&path).unwrap());
        std::fs::remove_file(&path).unwrap();
    }
}
