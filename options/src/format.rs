//! Option format strings.
//!
//! Every option carries a format string describing its payload, one letter
//! per field:
//!
//! * `I` IPv4 address, `l`/`L` signed/unsigned 32-bit, `s`/`S` 16-bit, `b`/`B` 8-bit
//! * `f` flag byte, `t` text to the end, `X` opaque bytes to the end
//! * `A` repeats the whole field list, `a` repeats the last field, `o` marks it optional
//! * `E<space>.` the payload is the encoding of another option space, `e` likewise
//!   with the space implied by the surrounding configuration

use std::{fmt::Write, net::Ipv4Addr};

/// A single field of an option payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    IpAddress,
    Int32,
    UInt32,
    Int16,
    UInt16,
    Int8,
    UInt8,
    Flag,
    Text,
    Data,
}

impl Field {
    /// Fixed width in bytes, `None` for fields that run to the end.
    pub fn width(self) -> Option<usize> {
        use self::Field::*;
        match self {
            IpAddress | Int32 | UInt32 => Some(4),
            Int16 | UInt16 => Some(2),
            Int8 | UInt8 | Flag => Some(1),
            Text | Data => None,
        }
    }
}

/// How the field list repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    All,
    Last,
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    source: String,
    fields: Vec<Field>,
    repeat: Repeat,
    encapsulation: Option<String>,
    encapsulation_only: bool,
    implicit: bool,
}

impl Format {
    /// Parses a format string. Unknown letters are ignored.
    pub fn parse(source: &str) -> Self {
        let mut fields = Vec::new();
        let mut repeat = Repeat::Once;
        let mut encapsulation = None;
        let mut implicit = false;
        let mut chars = source.char_indices();

        while let Some((index, c)) = chars.next() {
            let field = match c {
                'I' => Field::IpAddress,
                'l' => Field::Int32,
                'L' => Field::UInt32,
                's' => Field::Int16,
                'S' => Field::UInt16,
                'b' => Field::Int8,
                'B' => Field::UInt8,
                'f' => Field::Flag,
                't' => Field::Text,
                'X' => Field::Data,
                'A' => {
                    repeat = Repeat::All;
                    continue;
                }
                'a' => {
                    repeat = Repeat::Last;
                    continue;
                }
                'o' => continue,
                'e' => {
                    implicit = true;
                    encapsulation = Some(String::new());
                    break;
                }
                'E' => {
                    let rest = &source[index + 1..];
                    let name = match rest.find('.') {
                        Some(end) => &rest[..end],
                        None => rest,
                    };
                    encapsulation = Some(name.to_owned());
                    break;
                }
                other => {
                    warn!("unknown format letter {} in {}", other, source);
                    continue;
                }
            };
            fields.push(field);
        }

        let encapsulation_only = source.starts_with('E') || source.starts_with('e');
        Format {
            source: source.to_owned(),
            fields,
            repeat,
            encapsulation,
            encapsulation_only,
            implicit,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The option space the payload encapsulates, if any.
    ///
    /// An empty name means the space is chosen by the caller.
    pub fn encapsulation(&self) -> Option<&str> {
        self.encapsulation.as_deref()
    }

    /// Whether the payload is nothing but the encapsulated space.
    ///
    /// Such options drop their raw bytes once the nested options decode.
    pub fn is_encapsulation_only(&self) -> bool {
        self.encapsulation_only
    }

    pub fn is_implicit_encapsulation(&self) -> bool {
        self.implicit
    }

    /// Whether the first field is text, which is NUL terminated on request.
    pub fn is_text(&self) -> bool {
        self.fields.first() == Some(&Field::Text)
    }
}

/// Renders an option payload for humans.
///
/// Records are separated by `, `, fields within a record by a space.
pub fn pretty_print(format: &Format, data: &[u8]) -> String {
    let mut out = String::new();
    if format.fields.is_empty() || (format.encapsulation.is_some() && format.encapsulation_only) {
        write_hex(&mut out, data);
        return out;
    }

    let mut offset = 0;
    let mut record = 0;
    'records: while offset < data.len() {
        let fields: &[Field] = match (record, format.repeat) {
            (0, _) | (_, Repeat::All) => &format.fields,
            (_, Repeat::Last) => &format.fields[format.fields.len() - 1..],
            (_, Repeat::Once) => break,
        };
        if record > 0 {
            out.push_str(if format.repeat == Repeat::All { ", " } else { " " });
        }
        for (i, field) in fields.iter().enumerate() {
            let width = field.width().unwrap_or(data.len() - offset);
            if offset + width > data.len() {
                break 'records;
            }
            if i > 0 {
                out.push(' ');
            }
            write_field(&mut out, *field, &data[offset..offset + width]);
            offset += width;
        }
        record += 1;
    }

    if offset < data.len() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str("<extra ");
        write_hex(&mut out, &data[offset..]);
        out.push('>');
    }
    out
}

fn write_field(out: &mut String, field: Field, bytes: &[u8]) {
    let _ = match field {
        Field::IpAddress => write!(out, "{}", Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3])),
        Field::Int32 => write!(out, "{}", i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        Field::UInt32 => write!(out, "{}", u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        Field::Int16 => write!(out, "{}", i16::from_be_bytes([bytes[0], bytes[1]])),
        Field::UInt16 => write!(out, "{}", u16::from_be_bytes([bytes[0], bytes[1]])),
        Field::Int8 => write!(out, "{}", bytes[0] as i8),
        Field::UInt8 => write!(out, "{}", bytes[0]),
        Field::Flag => write!(out, "{}", if bytes[0] != 0 { "true" } else { "false" }),
        Field::Text => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or_else(|| bytes.len());
            write!(out, "{:?}", String::from_utf8_lossy(&bytes[..end]))
        }
        Field::Data => {
            write_hex(out, bytes);
            Ok(())
        }
    };
}

fn write_hex(out: &mut String, bytes: &[u8]) {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:x}", b);
    }
}
