use derive_more::{Add, AddAssign, Sub};

/// `TimeToLive` (ttl) newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, Sub, AddAssign)]
pub struct TimeToLive(pub u8);

/// Port newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct Port(pub u16);

/// `IPv6` flow label newtype.
///
/// Only the low 20 bits are significant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct FlowLabel(pub u32);

/// Prober instance identifier newtype.
///
/// Distinguishes probes sent by concurrent prober instances which share a
/// reply capture point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct InstanceId(pub u16);

/// Target probing rate newtype.
///
/// A rate of zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PacketsPerSecond(pub u32);

impl PacketsPerSecond {
    /// Is this rate unlimited?
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}
