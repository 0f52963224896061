//! Shared byte buffers and the views the rest of the crate passes around.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// A view into a shared, immutable byte buffer.
///
/// Cloning shares the buffer. When `terminated` is set, a NUL byte follows
/// the last byte of the view inside the buffer.
#[derive(Clone, Default)]
pub struct DataString {
    buffer: Bytes,
    start: usize,
    end: usize,
    terminated: bool,
}

impl DataString {
    /// An empty value.
    pub fn new() -> Self {
        DataString::default()
    }

    /// Takes ownership of `bytes` as a fresh buffer.
    pub fn from_buffer(buffer: Bytes) -> Self {
        let end = buffer.len();
        DataString {
            buffer,
            start: 0,
            end,
            terminated: false,
        }
    }

    /// Copies `text` into a new buffer followed by a NUL byte.
    pub fn terminated(text: &[u8]) -> Self {
        let mut buffer = BytesMut::with_capacity(text.len() + 1);
        buffer.put_slice(text);
        buffer.put_u8(0);
        DataString {
            buffer: buffer.freeze(),
            start: 0,
            end: text.len(),
            terminated: true,
        }
    }

    /// The bytes of the view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    /// The bytes of the view with the trailing NUL, if the value is terminated.
    pub fn as_bytes_with_nul(&self) -> Option<&[u8]> {
        if self.terminated {
            Some(&self.buffer[self.start..=self.end])
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The buffer backing the view.
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// At most `length` bytes starting at `offset`, sharing the buffer.
    ///
    /// An offset past the end yields an empty value.
    pub fn substring(&self, offset: usize, length: usize) -> DataString {
        if offset >= self.len() {
            return DataString::new();
        }
        let start = self.start + offset;
        let end = start + length.min(self.end - start);
        DataString {
            buffer: self.buffer.clone(),
            start,
            end,
            terminated: self.terminated && end == self.end,
        }
    }

    /// The last `length` bytes, or the whole value if it is not longer than that.
    pub fn suffix(&self, length: usize) -> DataString {
        if self.len() <= length {
            return self.clone();
        }
        DataString {
            buffer: self.buffer.clone(),
            start: self.end - length,
            end: self.end,
            terminated: self.terminated,
        }
    }

    /// Joins two values. If either side is empty the other one is returned as is.
    pub fn concat(&self, other: &DataString) -> DataString {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let length = self.len() + other.len();
        let mut buffer = BytesMut::with_capacity(length + other.terminated as usize);
        buffer.put_slice(self.as_bytes());
        buffer.put_slice(other.as_bytes());
        if other.terminated {
            buffer.put_u8(0);
        }
        DataString {
            buffer: buffer.freeze(),
            start: 0,
            end: length,
            terminated: other.terminated,
        }
    }

    /// The value as text, cut at the first NUL.
    pub fn to_text(&self) -> String {
        let bytes = self.as_bytes();
        let length = bytes.iter().position(|&b| b == 0).unwrap_or_else(|| bytes.len());
        String::from_utf8_lossy(&bytes[..length]).into_owned()
    }
}

impl PartialEq for DataString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for DataString {}

impl AsRef<[u8]> for DataString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for DataString {
    fn from(value: Vec<u8>) -> Self {
        DataString::from_buffer(Bytes::from(value))
    }
}

impl From<&[u8]> for DataString {
    fn from(value: &[u8]) -> Self {
        DataString::from_buffer(Bytes::copy_from_slice(value))
    }
}

impl From<&str> for DataString {
    fn from(value: &str) -> Self {
        DataString::from(value.as_bytes())
    }
}

impl fmt::Debug for DataString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.as_bytes();
        if !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "{:?}", String::from_utf8_lossy(bytes))
        } else {
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    write!(f, ":")?;
                }
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_clamps_to_the_value() {
        let value = DataString::from("abcdef");
        assert_eq!(value.substring(2, 3).as_bytes(), b"cde");
        assert_eq!(value.substring(4, 10).as_bytes(), b"ef");
        assert!(value.substring(6, 1).is_empty());
        assert!(value.substring(100, 1).is_empty());
    }

    #[test]
    fn suffix_returns_whole_short_values() {
        let value = DataString::from("abc");
        assert_eq!(value.suffix(5).as_bytes(), b"abc");
        assert_eq!(value.suffix(2).as_bytes(), b"bc");
    }

    #[test]
    fn concat_short_circuits_empty_sides() {
        let value = DataString::from("abc");
        let joined = DataString::new().concat(&value);
        assert_eq!(joined.buffer().as_ptr(), value.buffer().as_ptr());
        let joined = value.concat(&DataString::new());
        assert_eq!(joined.buffer().as_ptr(), value.buffer().as_ptr());
        assert_eq!(value.concat(&DataString::from("de")).as_bytes(), b"abcde");
    }

    #[test]
    fn terminated_values_keep_their_nul() {
        let value = DataString::terminated(b"host");
        assert_eq!(value.as_bytes(), b"host");
        assert_eq!(value.as_bytes_with_nul(), Some(&b"host\0"[..]));
        assert!(value.substring(1, 10).is_terminated());
        assert!(!value.substring(0, 2).is_terminated());
        assert_eq!(value.to_text(), "host");
    }
}
