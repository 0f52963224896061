//! The raw BOOTP/DHCP message.
//!
//! Only the fixed header is interpreted here. The options area is kept as
//! bytes, since decoding it needs the option space registry.

mod deserializer;
mod serializer;

use std::net::Ipv4Addr;

use eui48::{MacAddress, EUI48LEN};

use crate::{constants::*, hardware_type::HardwareType, operation_code::OperationCode};

/// Fixed header fields plus the untouched `sname`, `file` and options areas.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPacket {
    pub operation_code: OperationCode,
    pub hardware_type: HardwareType,
    pub hardware_address_length: u8,
    pub hops: u8,
    pub transaction_id: u32,
    pub seconds: u16,
    pub flags: u16,
    pub client_ip_address: Ipv4Addr,
    pub your_ip_address: Ipv4Addr,
    pub server_ip_address: Ipv4Addr,
    pub gateway_ip_address: Ipv4Addr,
    /// Always `SIZE_HARDWARE_ADDRESS` bytes.
    pub client_hardware_address: Vec<u8>,
    /// Always `SIZE_SERVER_NAME` bytes.
    pub server_name: Vec<u8>,
    /// Always `SIZE_BOOT_FILENAME` bytes.
    pub boot_filename: Vec<u8>,
    /// The options area, magic cookie included.
    pub options: Vec<u8>,
}

impl RawPacket {
    /// An empty message with zeroed fields.
    pub fn new(operation_code: OperationCode) -> Self {
        RawPacket {
            operation_code,
            hardware_type: HardwareType::Ethernet,
            hardware_address_length: EUI48LEN as u8,
            hops: 0,
            transaction_id: 0,
            seconds: 0,
            flags: 0,
            client_ip_address: Ipv4Addr::UNSPECIFIED,
            your_ip_address: Ipv4Addr::UNSPECIFIED,
            server_ip_address: Ipv4Addr::UNSPECIFIED,
            gateway_ip_address: Ipv4Addr::UNSPECIFIED,
            client_hardware_address: vec![0u8; SIZE_HARDWARE_ADDRESS],
            server_name: vec![0u8; SIZE_SERVER_NAME],
            boot_filename: vec![0u8; SIZE_BOOT_FILENAME],
            options: Vec::new(),
        }
    }

    /// Whether the options area starts with the DHCP magic cookie.
    ///
    /// A message without one is a plain BOOTP message.
    pub fn has_magic_cookie(&self) -> bool {
        self.options.len() >= MAGIC_COOKIE.len() && self.options[..MAGIC_COOKIE.len()] == MAGIC_COOKIE
    }

    /// The options area following the cookie.
    pub fn options_area(&self) -> &[u8] {
        if self.has_magic_cookie() {
            &self.options[MAGIC_COOKIE.len()..]
        } else {
            &[]
        }
    }

    /// The client's MAC-48 address, if the header says it carries one.
    pub fn client_mac_address(&self) -> Option<MacAddress> {
        if self.hardware_address_length as usize != EUI48LEN {
            return None;
        }
        MacAddress::from_bytes(&self.client_hardware_address[..EUI48LEN]).ok()
    }

    /// Sets `chaddr` to a MAC-48 address.
    pub fn set_client_mac_address(&mut self, address: MacAddress) {
        self.hardware_type = HardwareType::Ethernet;
        self.hardware_address_length = EUI48LEN as u8;
        self.client_hardware_address = vec![0u8; SIZE_HARDWARE_ADDRESS];
        self.client_hardware_address[..EUI48LEN].copy_from_slice(address.as_bytes());
    }

    /// The wire length of the message.
    pub fn len(&self) -> usize {
        DHCP_FIXED_NON_UDP + self.options.len()
    }

    /// Never true, the fixed header is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}
