//! DHCP message hardware type module.

use std::fmt;

/// ARP hardware type as carried in `htype`.
///
/// Unknown values survive the round trip through `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareType {
    Ethernet,
    TokenRing,
    Fddi,
    Other(u8),
}

impl From<u8> for HardwareType {
    fn from(value: u8) -> Self {
        use self::HardwareType::*;
        match value {
            1 => Ethernet,
            6 => TokenRing,
            8 => Fddi,

            other => Other(other),
        }
    }
}

impl From<HardwareType> for u8 {
    fn from(value: HardwareType) -> Self {
        use self::HardwareType::*;
        match value {
            Ethernet => 1,
            TokenRing => 6,
            Fddi => 8,

            Other(other) => other,
        }
    }
}

impl fmt::Display for HardwareType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::HardwareType::*;
        match self {
            Ethernet => write!(f, "ethernet"),
            TokenRing => write!(f, "token-ring"),
            Fddi => write!(f, "fddi"),

            Other(value) => write!(f, "unknown-{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_values_round_trip() {
        assert_eq!(HardwareType::from(1), HardwareType::Ethernet);
        assert_eq!(u8::from(HardwareType::from(32)), 32);
        assert_eq!(HardwareType::Other(32).to_string(), "unknown-32");
    }
}
