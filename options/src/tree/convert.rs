//! Number conversions behind `binary-to-ascii` and `reverse`.

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Formats `number` in `base`, lowercase, without leading zeros.
///
/// Bases outside 2..=16 give `None`.
pub fn to_base(mut number: u32, base: u32) -> Option<String> {
    if base < 2 || base > 16 {
        return None;
    }
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8(digits).ok()
}

/// Reads `buffer` as big-endian numbers of `width` bits each and joins their
/// `base` representations with `separator`.
///
/// The width must be 8, 16 or 32 and the buffer a whole number of them.
pub fn binary_to_ascii(buffer: &[u8], base: u32, width: u32, separator: &[u8]) -> Option<Vec<u8>> {
    let size = match width {
        8 => 1,
        16 => 2,
        32 => 4,
        _ => return None,
    };
    if buffer.len() % size != 0 {
        return None;
    }
    let mut out = Vec::new();
    for (i, chunk) in buffer.chunks(size).enumerate() {
        if i > 0 {
            out.extend_from_slice(separator);
        }
        let number = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        out.extend_from_slice(to_base(number, base)?.as_bytes());
    }
    Some(out)
}

/// Reverses the order of `width`-byte groups in `buffer`.
pub fn reverse(buffer: &[u8], width: usize) -> Option<Vec<u8>> {
    if width == 0 || buffer.len() % width != 0 {
        return None;
    }
    Some(buffer.chunks(width).rev().flatten().cloned().collect())
}
