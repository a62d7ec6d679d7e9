//! Riptide - a stateless Internet probing library.
//!
//! This crate builds and transmits large volumes of traceroute style probe
//! packets without keeping any per-probe state.  Everything needed to match
//! and time a reply, the send timestamp and the prober instance identity, is
//! encoded into header fields which routers quote back in `ICMP` error
//! replies.
//!
//! Probes are built layer by layer into a caller owned buffer and handed to
//! a [`FrameSink`](net::FrameSink) for raw link layer injection by
//! [`Sender`], or sent over ordinary datagram sockets by [`ClassicSender`].
//! A token bucket [`RateLimiter`] paces transmission in both cases.
//!
//! # Example
//!
//! The following example builds a rate limited `IPv4/UDP` probe frame by
//! hand, without a network:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use riptide_core::{build, signature, Frame, LinkLayer, NetworkLayer, Port, Protocol, TimeToLive};
//! use std::net::Ipv4Addr;
//! use std::time::SystemTime;
//!
//! let mut buf = [0_u8; riptide_core::MAX_FRAME_SIZE];
//! let mut frame = Frame::new(
//!     &mut buf,
//!     LinkLayer::None,
//!     NetworkLayer::Ipv4,
//!     Protocol::Udp,
//!     2,
//! )?;
//! let src_addr = Ipv4Addr::new(192, 0, 2, 1);
//! let dest_addr = Ipv4Addr::new(10, 0, 0, 1);
//! let timestamp = signature::encode_timestamp(signature::tenth_ms(SystemTime::now()));
//! build::ipv4(&mut frame, src_addr, dest_addr, TimeToLive(8), 0)?;
//! build::udp_ipv4(&mut frame, src_addr, dest_addr, Port(24000), Port(33434), timestamp)?;
//! assert_eq!(30, frame.len());
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]
#![deny(unsafe_code)]

mod classic;
mod config;
mod constants;
mod error;
mod layout;
mod limiter;
mod probe;
mod sender;
mod types;

/// Layer encoders.
pub mod build;

/// Sink, resolver and socket abstractions.
pub mod net;

/// Stateless probe signatures.
pub mod signature;

pub use classic::ClassicSender;
pub use config::{defaults, ClassicConfig, Protocol, SenderConfig};
pub use constants::{MAX_FRAME_SIZE, PAYLOAD_TWEAK_BYTES};
pub use error::{Error, IoError, IoOperation, IoResult, Result};
pub use layout::{Frame, LinkLayer, NetworkLayer};
pub use limiter::RateLimiter;
pub use probe::Probe;
pub use sender::Sender;
pub use types::{FlowLabel, InstanceId, PacketsPerSecond, Port, TimeToLive};
