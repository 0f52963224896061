//! DHCP message constants.

/// `chaddr` size in bytes.
pub const SIZE_HARDWARE_ADDRESS: usize = 16;

/// `sname` size in bytes.
pub const SIZE_SERVER_NAME: usize = 64;

/// `file` size in bytes.
pub const SIZE_BOOT_FILENAME: usize = 128;

/// The `chaddr` field offset in bytes.
pub const OFFSET_HARDWARE_ADDRESS: usize = 28;

/// The `sname` field offset in bytes.
pub const OFFSET_SERVER_NAME: usize = OFFSET_HARDWARE_ADDRESS + SIZE_HARDWARE_ADDRESS;

/// The `file` field offset in bytes.
pub const OFFSET_BOOT_FILENAME: usize = OFFSET_SERVER_NAME + SIZE_SERVER_NAME;

/// The options area offset in bytes. The area starts with the magic cookie.
pub const OFFSET_OPTIONS: usize = OFFSET_BOOT_FILENAME + SIZE_BOOT_FILENAME;

/// The magic number before the DHCP options.
pub const MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

/// The size of the IP header.
pub const SIZE_HEADER_IP: usize = 20;

/// The size of the UDP header.
pub const SIZE_HEADER_UDP: usize = 8;

/// The fixed BOOTP header without the options area.
pub const DHCP_FIXED_NON_UDP: usize = OFFSET_OPTIONS;

/// The fixed BOOTP header together with the IP and UDP headers.
pub const DHCP_FIXED_LEN: usize = DHCP_FIXED_NON_UDP + SIZE_HEADER_IP + SIZE_HEADER_UDP;

/// The minimal message size the client MUST be able to accept.
pub const DHCP_MTU_MIN: usize = 576;

/// The Ethernet-derived ceiling of a whole DHCP datagram.
pub const DHCP_MTU_MAX: usize = 1500;

/// The options area of a minimal message, cookie included.
pub const DHCP_MIN_OPTION_LEN: usize = DHCP_MTU_MIN - DHCP_FIXED_LEN;

/// The options area of a maximal message, cookie included.
pub const DHCP_MAX_OPTION_LEN: usize = DHCP_MTU_MAX - DHCP_FIXED_LEN;

/// BOOTP replies are never shorter than this.
pub const BOOTP_MIN_LEN: usize = 300;
