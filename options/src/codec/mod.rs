//! The option wire codec.
//!
//! RFC 2132 options are `code, length, value` triples; PAD and END stand
//! alone. Values longer than 255 bytes travel as consecutive triples of the
//! same code (RFC 3396). When the options area is full, the `file` and
//! `sname` header fields carry more of them (RFC 2132 §9.3).

mod decode;
mod encode;

pub use self::{
    decode::{parse_encapsulated_suboptions, parse_option_buffer, parse_options},
    encode::{
        cons_options, option_space_encapsulate, store_options, EncodeParams, StoreLimits,
        PRIORITY_COUNT,
    },
};

/// Single byte padding.
pub const DHO_PAD: u8 = 0;

/// End of an options area.
pub const DHO_END: u8 = 255;
