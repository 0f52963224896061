//! DHCP message serialization module.

use std::io;

use bytes::BufMut;

use super::RawPacket;
use crate::constants::*;

/// Checks if there is enough space in buffer to put a value.
macro_rules! check_remaining(
    ($cursor:expr, $distance:expr) => (
        if $cursor.remaining_mut() < $distance {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Buffer is too small"));
        }
    )
);

/// Writes a fixed-size field, zero padded or truncated to `size`.
fn put_field(cursor: &mut &mut [u8], field: &[u8], size: usize) {
    let length = field.len().min(size);
    cursor.put_slice(&field[..length]);
    cursor.put_bytes(0, size - length);
}

impl RawPacket {
    /// DHCP message serialization.
    ///
    /// # Errors
    /// `io::Error` if the buffer is too small.
    pub fn to_bytes(&self, dst: &mut [u8]) -> io::Result<usize> {
        let total = dst.len();
        let mut cursor = dst;
        check_remaining!(cursor, DHCP_FIXED_NON_UDP + self.options.len());

        cursor.put_u8(self.operation_code as u8);
        cursor.put_u8(self.hardware_type.into());
        cursor.put_u8(self.hardware_address_length);
        cursor.put_u8(self.hops);
        cursor.put_u32(self.transaction_id);
        cursor.put_u16(self.seconds);
        cursor.put_u16(self.flags);
        cursor.put_u32(u32::from(self.client_ip_address));
        cursor.put_u32(u32::from(self.your_ip_address));
        cursor.put_u32(u32::from(self.server_ip_address));
        cursor.put_u32(u32::from(self.gateway_ip_address));
        put_field(&mut cursor, &self.client_hardware_address, SIZE_HARDWARE_ADDRESS);
        put_field(&mut cursor, &self.server_name, SIZE_SERVER_NAME);
        put_field(&mut cursor, &self.boot_filename, SIZE_BOOT_FILENAME);
        cursor.put_slice(&self.options);

        Ok(total - cursor.remaining_mut())
    }
}
