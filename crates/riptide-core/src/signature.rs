//! Stateless probe signatures.
//!
//! No per-probe state is retained between send and reply.  Instead the send
//! timestamp and the prober instance identity are folded into header fields
//! which routers quote back in `ICMP` error replies, so that a reply can be
//! attributed and timed from its bytes alone.
//!
//! Timestamps are expressed in tenths of a millisecond since the `UNIX`
//! epoch and truncated to 16 bits, which wraps every ~6.55 seconds.  A
//! receiver recovers the full timestamp from the low 16 bits and its own
//! clock, so send and receive clocks must agree to well under half a wrap.

use crate::types::{InstanceId, Port};
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// The number of timestamp units per second.
pub const TENTH_MS_PER_SECOND: u64 = 10_000;

/// The modulus of an encoded timestamp.
pub const TIMESTAMP_MODULO: u64 = 1 << 16;

/// The time `t` in tenths of a millisecond since the `UNIX` epoch.
///
/// Times before the epoch are reported as zero.
#[must_use]
pub fn tenth_ms(t: SystemTime) -> u64 {
    let since_epoch = t.duration_since(UNIX_EPOCH).unwrap_or_default();
    (since_epoch.as_micros() / 100) as u64
}

/// Truncate a tenth-of-a-millisecond timestamp to its wire form.
#[must_use]
pub const fn encode_timestamp(tenth_ms: u64) -> u16 {
    (tenth_ms % TIMESTAMP_MODULO) as u16
}

/// Recover the full timestamp for an encoded value observed at `now`.
///
/// Returns the most recent timestamp at or before `now` whose low 16 bits
/// equal `encoded`.  Correct provided less than one wrap (~6.55 seconds)
/// elapsed between the send and `now`.
#[must_use]
pub const fn decode_timestamp(encoded: u16, now: u64) -> u64 {
    let candidate = (now & !(TIMESTAMP_MODULO - 1)) | encoded as u64;
    if candidate > now {
        candidate.saturating_sub(TIMESTAMP_MODULO)
    } else {
        candidate
    }
}

/// The instance signature of a probe.
///
/// A 16 bit one's complement checksum over the instance identifier, the
/// destination address and the ports.  Carried in the `IPv4` identification
/// field and quoted back by routers, which lets concurrent prober instances
/// share a capture point and discard each other's replies.
///
/// The time to live is deliberately not included so that the signature is
/// constant across the probes of a traceroute flow.
#[must_use]
pub fn probe_signature(
    instance_id: InstanceId,
    dest_addr: IpAddr,
    src_port: Port,
    dest_port: Port,
) -> u16 {
    let mut sum = u64::from(instance_id.0);
    match dest_addr {
        IpAddr::V4(addr) => {
            for chunk in addr.octets().chunks_exact(2) {
                sum += u64::from(u16::from_be_bytes([chunk[0], chunk[1]]));
            }
        }
        IpAddr::V6(addr) => {
            for segment in addr.segments() {
                sum += u64::from(segment);
            }
        }
    }
    sum += u64::from(src_port.0);
    sum += u64::from(dest_port.0);
    finalize(sum)
}

fn finalize(mut sum: u64) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
