/// The maximum size of a probe frame we allow.
pub const MAX_FRAME_SIZE: usize = 1024;

/// The number of payload bytes reserved for forcing the `UDP` checksum.
///
/// Downstream reply matching depends on this value, do not change it.
pub const PAYLOAD_TWEAK_BYTES: u8 = 2;
