//! DHCP message deserialization module.

use std::{io, net::Ipv4Addr};

use bytes::Buf;

use super::RawPacket;
use crate::constants::*;

/// Checks if there is enough space in buffer to get a value.
macro_rules! check_remaining(
    ($cursor:expr, $length:expr) => (
        if $cursor.remaining() < $length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Buffer is too small for the fixed header",
            ));
        }
    );
);

impl RawPacket {
    /// DHCP message deserialization.
    ///
    /// Everything after the `file` field is kept as the options area.
    ///
    /// # Errors
    /// `io::Error` if the packet is shorter than the fixed header.
    pub fn from_bytes(src: &[u8]) -> io::Result<Self> {
        let mut cursor = src;
        check_remaining!(cursor, DHCP_FIXED_NON_UDP);

        let operation_code = cursor.get_u8().into();
        let hardware_type = cursor.get_u8().into();
        let hardware_address_length = cursor.get_u8();
        let hops = cursor.get_u8();
        let transaction_id = cursor.get_u32();
        let seconds = cursor.get_u16();
        let flags = cursor.get_u16();
        let client_ip_address = Ipv4Addr::from(cursor.get_u32());
        let your_ip_address = Ipv4Addr::from(cursor.get_u32());
        let server_ip_address = Ipv4Addr::from(cursor.get_u32());
        let gateway_ip_address = Ipv4Addr::from(cursor.get_u32());

        let client_hardware_address = cursor[..SIZE_HARDWARE_ADDRESS].to_vec();
        cursor.advance(SIZE_HARDWARE_ADDRESS);
        let server_name = cursor[..SIZE_SERVER_NAME].to_vec();
        cursor.advance(SIZE_SERVER_NAME);
        let boot_filename = cursor[..SIZE_BOOT_FILENAME].to_vec();
        cursor.advance(SIZE_BOOT_FILENAME);

        Ok(RawPacket {
            operation_code,
            hardware_type,
            hardware_address_length,
            hops,
            transaction_id,
            seconds,
            flags,
            client_ip_address,
            your_ip_address,
            server_ip_address,
            gateway_ip_address,
            client_hardware_address,
            server_name,
            boot_filename,
            options: cursor.to_vec(),
        })
    }
}
