//! DHCP option overload module.

use std::fmt;

/// DHCP option overload values.
///
/// RFC 2132 §9.3: bit 0 means the `file` field carries options, bit 1 the `sname` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overload {
    Undefined = 0,
    File,
    Sname,
    Both,
}

impl Overload {
    /// Whether the `file` field carries options.
    pub fn file(self) -> bool {
        (self as u8) & 1 != 0
    }

    /// Whether the `sname` field carries options.
    pub fn sname(self) -> bool {
        (self as u8) & 2 != 0
    }

    /// Builds the value from the two field flags.
    pub fn from_fields(file: bool, sname: bool) -> Self {
        Overload::from((file as u8) | ((sname as u8) << 1))
    }
}

impl Default for Overload {
    fn default() -> Self {
        Overload::Undefined
    }
}

impl fmt::Display for Overload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Overload::*;
        match self {
            File => write!(f, "FILE"),
            Sname => write!(f, "SNAME"),
            Both => write!(f, "BOTH"),

            Undefined => write!(f, "UNDEFINED"),
        }
    }
}

impl From<u8> for Overload {
    fn from(value: u8) -> Self {
        use self::Overload::*;
        match value & 3 {
            1 => File,
            2 => Sname,
            3 => Both,

            _ => Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_bits() {
        assert!(Overload::File.file());
        assert!(!Overload::File.sname());
        assert!(Overload::Both.file() && Overload::Both.sname());
        assert_eq!(Overload::from_fields(false, true), Overload::Sname);
        assert_eq!(Overload::from(7), Overload::Both);
    }
}
