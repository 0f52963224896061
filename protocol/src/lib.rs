//! DHCP wire vocabulary shared by the option codec and the evaluator.
//!
//! The fixed BOOTP header, the option area layout and the well-known codes.

pub mod constants;
pub mod hardware_type;
pub mod message_type;
pub mod operation_code;
pub mod option_tag;
pub mod overload;
pub mod packet;

pub use self::{
    constants::*,
    hardware_type::HardwareType,
    message_type::MessageType,
    operation_code::OperationCode,
    option_tag::OptionTag,
    overload::Overload,
    packet::RawPacket,
};
