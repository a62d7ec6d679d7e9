use crate::error::{IoError, IoOperation, IoResult};
use socket2::{Domain, SockAddr, Type};
use std::net::SocketAddr;
use tracing::instrument;

/// A datagram socket for probes which do not use raw frame injection.
#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create an `IPv4/UDP` datagram socket.
    fn new_udp_dgram_socket_ipv4() -> IoResult<Self>;
    /// Create an `IPv6/UDP` datagram socket.
    fn new_udp_dgram_socket_ipv6() -> IoResult<Self>;
    /// Create an `IPv4/ICMP` datagram socket.
    fn new_icmp_dgram_socket_ipv4() -> IoResult<Self>;
    /// Create an `IPv6/ICMP` datagram socket.
    fn new_icmp_dgram_socket_ipv6() -> IoResult<Self>;
    fn bind(&mut self, address: SocketAddr) -> IoResult<()>;
    fn set_ttl(&mut self, ttl: u32) -> IoResult<()>;
    fn set_unicast_hops_v6(&mut self, hops: u32) -> IoResult<()>;
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()>;
}

/// A network socket.
pub struct SocketImpl {
    inner: socket2::Socket,
}

impl SocketImpl {
    fn new_dgram(domain: Domain, protocol: socket2::Protocol) -> IoResult<Self> {
        Ok(Self {
            inner: socket2::Socket::new(domain, Type::DGRAM, Some(protocol))
                .map_err(|err| IoError::Other(err, IoOperation::NewSocket))?,
        })
    }
}

impl Socket for SocketImpl {
    #[instrument(level = "trace")]
    fn new_udp_dgram_socket_ipv4() -> IoResult<Self> {
        Self::new_dgram(Domain::IPV4, socket2::Protocol::UDP)
    }
    #[instrument(level = "trace")]
    fn new_udp_dgram_socket_ipv6() -> IoResult<Self> {
        Self::new_dgram(Domain::IPV6, socket2::Protocol::UDP)
    }
    #[instrument(level = "trace")]
    fn new_icmp_dgram_socket_ipv4() -> IoResult<Self> {
        Self::new_dgram(Domain::IPV4, socket2::Protocol::ICMPV4)
    }
    #[instrument(level = "trace")]
    fn new_icmp_dgram_socket_ipv6() -> IoResult<Self> {
        Self::new_dgram(Domain::IPV6, socket2::Protocol::ICMPV6)
    }
    #[instrument(skip(self), level = "trace")]
    fn bind(&mut self, address: SocketAddr) -> IoResult<()> {
        self.inner
            .bind(&SockAddr::from(address))
            .map_err(|err| IoError::Bind(err, address))
    }
    #[instrument(skip(self), level = "trace")]
    fn set_ttl(&mut self, ttl: u32) -> IoResult<()> {
        self.inner
            .set_ttl(ttl)
            .map_err(|err| IoError::Other(err, IoOperation::SetTtl))
    }
    #[instrument(skip(self), level = "trace")]
    fn set_unicast_hops_v6(&mut self, hops: u32) -> IoResult<()> {
        self.inner
            .set_unicast_hops_v6(hops)
            .map_err(|err| IoError::Other(err, IoOperation::SetUnicastHopsV6))
    }
    #[instrument(skip(self, buf), level = "trace")]
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()> {
        self.inner
            .send_to(buf, &SockAddr::from(addr))
            .map_err(|err| IoError::SendTo(err, addr))?;
        Ok(())
    }
}
