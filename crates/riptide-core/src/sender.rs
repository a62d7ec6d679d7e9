use crate::build;
use crate::config::{Protocol, SenderConfig};
use crate::constants::{MAX_FRAME_SIZE, PAYLOAD_TWEAK_BYTES};
use crate::error::{Error, Result};
use crate::layout::{Frame, LinkLayer, NetworkLayer};
use crate::limiter::RateLimiter;
use crate::net::{AddressResolver, FrameSink};
use crate::probe::Probe;
use crate::signature;
use crate::types::InstanceId;
use riptide_packet::ethernet::MacAddr;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::SystemTime;
use tracing::instrument;

/// A stateless probe sender over a raw frame sink.
///
/// Addressing is resolved once at construction and every call to
/// [`Sender::send`] builds and injects a single probe frame.  Nothing about
/// a probe is retained after injection, replies are matched from the fields
/// the probe itself carries.
#[derive(Debug)]
pub struct Sender<S> {
    sink: S,
    link_layer: LinkLayer,
    src_mac: MacAddr,
    gateway_mac_ipv4: MacAddr,
    gateway_mac_ipv6: MacAddr,
    src_ipv4: Ipv4Addr,
    src_ipv6: Ipv6Addr,
    instance_id: InstanceId,
    limiter: RateLimiter,
    buf: [u8; MAX_FRAME_SIZE],
}

impl<S: FrameSink> Sender<S> {
    /// Create a `Sender` over the given sink.
    ///
    /// Hardware addresses are only resolved when the sink requires
    /// `Ethernet` framing.  Any resolution failure is fatal.
    #[instrument(skip(resolver, sink), level = "debug")]
    pub fn new<R: AddressResolver>(config: &SenderConfig, resolver: &R, sink: S) -> Result<Self> {
        let link_layer = sink.link_layer()?;
        let (src_mac, gateway_mac_ipv4, gateway_mac_ipv6) = if link_layer == LinkLayer::Ethernet {
            (
                resolver.interface_mac(&config.interface)?,
                resolver.gateway_mac(&config.interface, NetworkLayer::Ipv4)?,
                resolver.gateway_mac(&config.interface, NetworkLayer::Ipv6)?,
            )
        } else {
            (MacAddr::default(), MacAddr::default(), MacAddr::default())
        };
        let src_ipv4 = match config.source_ipv4 {
            Some(addr) => addr,
            None => resolver.source_ipv4(&config.interface)?,
        };
        let src_ipv6 = match config.source_ipv6 {
            Some(addr) => addr,
            None => resolver.source_ipv6(&config.interface)?,
        };
        tracing::info!(
            interface = %config.interface,
            ?link_layer,
            %src_mac,
            %gateway_mac_ipv4,
            %gateway_mac_ipv6,
            %src_ipv4,
            %src_ipv6,
            instance_id = config.instance_id.0,
            packets_per_second = config.packets_per_second.0,
            "sender ready"
        );
        Ok(Self {
            sink,
            link_layer,
            src_mac,
            gateway_mac_ipv4,
            gateway_mac_ipv6,
            src_ipv4,
            src_ipv6,
            instance_id: config.instance_id,
            limiter: RateLimiter::new(config.packets_per_second),
            buf: [0; MAX_FRAME_SIZE],
        })
    }

    /// Build and inject a single probe.
    ///
    /// Blocks until the rate limiter releases a token.  The probe payload is
    /// `ttl` bytes plus the checksum compensating word, so the emitted frame
    /// size reveals the original time to live to a reply parser even after
    /// the header `ttl` has been decremented in flight.
    #[instrument(skip(self), level = "trace")]
    pub fn send(&mut self, probe: &Probe) -> Result<()> {
        probe.validate()?;
        self.limiter.acquire();
        let now = signature::tenth_ms(SystemTime::now());
        let timestamp_enc = signature::encode_timestamp(now);
        let payload_size = usize::from(probe.ttl.0) + usize::from(PAYLOAD_TWEAK_BYTES);
        let mut frame = Frame::new(
            &mut self.buf,
            self.link_layer,
            probe.network_layer(),
            probe.protocol,
            payload_size,
        )?;
        match self.link_layer {
            LinkLayer::Ethernet => {
                let gateway_mac = match probe.network_layer() {
                    NetworkLayer::Ipv4 => self.gateway_mac_ipv4,
                    NetworkLayer::Ipv6 => self.gateway_mac_ipv6,
                };
                build::ethernet(&mut frame, self.src_mac, gateway_mac)?;
            }
            LinkLayer::BsdLoopback => build::bsd_loopback(&mut frame)?,
            LinkLayer::None => {}
        }
        match probe.dest_addr {
            IpAddr::V4(dest_addr) => {
                let identification = signature::probe_signature(
                    self.instance_id,
                    probe.dest_addr,
                    probe.src_port,
                    probe.dest_port,
                );
                build::ipv4(&mut frame, self.src_ipv4, dest_addr, probe.ttl, identification)?;
            }
            IpAddr::V6(dest_addr) => {
                build::ipv6(
                    &mut frame,
                    self.src_ipv6,
                    dest_addr,
                    probe.ttl,
                    probe.flow_label,
                )?;
            }
        }
        match (probe.protocol, probe.dest_addr) {
            (Protocol::Icmp, _) => build::icmp(&mut frame, probe.src_port, timestamp_enc)?,
            (Protocol::IcmpV6, IpAddr::V6(dest_addr)) => build::icmpv6(
                &mut frame,
                self.src_ipv6,
                dest_addr,
                probe.src_port,
                timestamp_enc,
            )?,
            (Protocol::Udp, IpAddr::V4(dest_addr)) => build::udp_ipv4(
                &mut frame,
                self.src_ipv4,
                dest_addr,
                probe.src_port,
                probe.dest_port,
                timestamp_enc,
            )?,
            (Protocol::Udp, IpAddr::V6(dest_addr)) => build::udp_ipv6(
                &mut frame,
                self.src_ipv6,
                dest_addr,
                probe.src_port,
                probe.dest_port,
                timestamp_enc,
            )?,
            (Protocol::IcmpV6, IpAddr::V4(_)) => unreachable!("probe validated"),
        }
        tracing::trace!(len = frame.len(), "inject");
        self.sink.inject(frame.frame_bytes()).map_err(Error::ProbeFailed)
    }
}
