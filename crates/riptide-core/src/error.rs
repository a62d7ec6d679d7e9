use crate::config::Protocol;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

/// A probe sender result.
pub type Result<T> = std::result::Result<T, Error>;

/// A probe sender error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid source IP address: {0}")]
    InvalidSourceAddr(IpAddr),
    #[error("invalid packet: {0}")]
    Packet(#[from] riptide_packet::error::Error),
    #[error("frame of {required} bytes exceeds the buffer capacity of {capacity} bytes")]
    FrameTooLarge { required: usize, capacity: usize },
    #[error("unsupported link layer: {0}")]
    UnsupportedLinkLayer(String),
    #[error("probe {protocol} cannot be sent to {dest_addr}")]
    IncompatibleProtocol {
        protocol: Protocol,
        dest_addr: IpAddr,
    },
    #[error("failed to resolve {0}: {1}")]
    AddressResolution(&'static str, String),
    #[error("probe failed to send: {0}")]
    ProbeFailed(#[source] IoError),
    #[error("IO error: {0}")]
    Io(#[from] IoError),
    #[error("address {0} in use")]
    AddressInUse(SocketAddr),
}

/// An IO result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// An IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(#[source] std::io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(#[source] std::io::Error, SocketAddr),
    #[error("Inject error: {0}")]
    Inject(#[source] std::io::Error),
    #[error("Error {1}: {0}")]
    Other(#[source] std::io::Error, IoOperation),
}

impl IoError {
    #[must_use]
    pub fn kind(&self) -> std::io::ErrorKind {
        match self {
            Self::Bind(io_error, _)
            | Self::SendTo(io_error, _)
            | Self::Inject(io_error)
            | Self::Other(io_error, _) => io_error.kind(),
        }
    }
}

/// An IO operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoOperation {
    NewSocket,
    SetTtl,
    SetUnicastHopsV6,
    WriteTimeLog,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create socket"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::SetUnicastHopsV6 => write!(f, "set unicast hops v6"),
            Self::WriteTimeLog => write!(f, "write time log"),
        }
    }
}
